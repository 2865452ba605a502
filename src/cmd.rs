use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use crate::app::batch::{collect_input_files, process_documents, BatchOptions, DEFAULT_JOBS};
use crate::app::outfmt::model::{new_writer, OutputFormat, COLUMNS};
use crate::peripheral::pdftotext::{
    DispatchingExtractor, PdfToText, TextExtractor, PDFTOTEXT_BIN_ENV_VAR,
};
use crate::util::date::today_local;
use crate::util::rw::WriteHandle;
use crate::write_errln;

const ABOUT: &str = "Extracts transactions from bank statement PDFs";

fn get_long_about() -> String {
    format!(
        "\
Extracts the transactions from credit card and bank statements, using the
layout text produced by pdftotext (poppler).

Output has the columns:
{}

Dates without a year take the year closest to the statement date. Credits
(marked CR or in parentheses) are negative. Foreign currency amounts are taken
from the line or two below a transaction.

The input may be a single statement or a directory. Only .pdf and .txt files
directly inside a directory are used. .txt files are read as already-extracted
text (see stmt-text).

pdftotext is found with --pdftotext-bin, then ${}, then PATH.
Set TRACE (eg. TRACE=bankstmt=debug) for diagnostic logging.",
        COLUMNS.join(", "),
        PDFTOTEXT_BIN_ENV_VAR,
    )
}

#[derive(Parser, Debug)]
#[command(version = crate::app::APP_VERSION,
          about = ABOUT, long_about = get_long_about())]
pub struct Args {
    /// A statement PDF (or .txt), or a directory of them
    #[arg(required = true)]
    pub input: PathBuf,

    /// Write output to this file instead of stdout
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Csv)]
    pub format: OutputFormat,

    /// Password for encrypted statements. Used for every document.
    #[arg(long)]
    pub password: Option<String>,

    /// Path to the pdftotext executable
    #[arg(long)]
    pub pdftotext_bin: Option<PathBuf>,

    /// Give up on a document if extraction takes longer than this
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// How many documents to extract at once
    #[arg(short = 'j', long, default_value_t = DEFAULT_JOBS)]
    pub jobs: usize,

    /// Stop at the first document that fails, instead of skipping it
    #[arg(long, default_value_t = false)]
    pub fail_fast: bool,

    /// Leave the source column empty
    #[arg(long, default_value_t = false)]
    pub no_source: bool,

    /// Turn on debug logging for this tool (in addition to TRACE)
    #[arg(long, default_value_t = false)]
    pub debug: bool,
}

impl Args {
    pub fn for_input(input: PathBuf) -> Args {
        Args {
            input,
            output: None,
            format: OutputFormat::Csv,
            password: None,
            pdftotext_bin: None,
            timeout_secs: None,
            jobs: DEFAULT_JOBS,
            fail_fast: false,
            no_source: false,
            debug: false,
        }
    }
}

pub fn run() -> Result<(), ()> {
    let args = Args::parse();
    run_with_args(
        args,
        WriteHandle::stdout_write_handle(),
        WriteHandle::stderr_write_handle(),
    )
}

/// Processes every input document and writes the rows of the ones that
/// succeed. Failures are reported on err_w, and make the result Err.
pub fn run_with_args(
    args: Args,
    out_w: WriteHandle,
    mut err_w: WriteHandle,
) -> Result<(), ()> {
    if args.debug {
        crate::tracing::enable_trace_env("bankstmt=debug");
    }
    crate::tracing::setup_tracing();

    let files =
        collect_input_files(&args.input).map_err(|e| write_errln!(err_w, "Error: {}", e))?;
    if files.is_empty() {
        write_errln!(err_w, "Warning: No .pdf or .txt files found in {:?}", args.input);
    }

    let out_w = match &args.output {
        Some(path) => File::create(path)
            .map(WriteHandle::file_write_handle)
            .map_err(|e| write_errln!(err_w, "Error: Failed to create {:?}: {}", path, e))?,
        None => out_w,
    };

    let pdf = PdfToText::locate(args.pdftotext_bin.clone())
        .with_timeout(args.timeout_secs.map(Duration::from_secs));
    let extractor: Arc<dyn TextExtractor> = Arc::new(DispatchingExtractor::new(pdf));
    let options = BatchOptions {
        password: args.password.clone(),
        jobs: args.jobs.max(1),
        fail_fast: args.fail_fast,
        include_source: !args.no_source,
        today: today_local(),
    };

    let outcomes = async_std::task::block_on(process_documents(extractor, &files, &options));
    let n_processed = outcomes.len();

    let mut writer = new_writer(args.format, out_w);
    let mut n_failed = 0;
    for outcome in outcomes {
        let name = outcome.name();
        match outcome.result {
            Ok(txs) => {
                if txs.is_empty() {
                    write_errln!(err_w, "Warning: No transactions found in {}", name);
                }
                writer
                    .write_transactions(&txs)
                    .map_err(|e| write_errln!(err_w, "Error: {}", e))?;
            }
            Err(e) => {
                n_failed += 1;
                write_errln!(err_w, "Error: {}: {}", name, e);
            }
        }
    }
    writer.finish().map_err(|e| write_errln!(err_w, "Error: {}", e))?;

    if n_failed > 0 {
        if n_processed < files.len() {
            write_errln!(
                err_w,
                "Stopped after the first failure. {} of {} documents were not processed",
                files.len() - n_processed,
                files.len()
            );
        }
        write_errln!(err_w, "{} of {} documents failed", n_failed, files.len());
        return Err(());
    }
    Ok(())
}
