use std::{io::Write, path::PathBuf, time::Duration};

use clap::Parser;

use bankstmt::peripheral::pdftotext::{PdfToText, TextExtractor};

/// Dumps the layout text of a statement, as the transaction parser sees it.
///
/// Use this to generate test files for the statement parser. Contributors
/// should sanitize account numbers, names and addresses before committing
/// the text to the repo.
#[derive(Parser, Debug)]
#[command(author, about, long_about = None)]
struct Args {
    /// Statement PDF
    #[arg(required = true)]
    pub input: PathBuf,

    #[arg(long)]
    pub password: Option<String>,

    /// Path to the pdftotext executable
    #[arg(long)]
    pub pdftotext_bin: Option<PathBuf>,

    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Prefix each line with its (zero-based) index
    #[arg(short = 'n', long)]
    pub line_numbers: bool,
}

fn main() -> Result<(), ()> {
    let args = Args::parse();
    bankstmt::tracing::setup_tracing();

    let extractor = PdfToText::locate(args.pdftotext_bin)
        .with_timeout(args.timeout_secs.map(Duration::from_secs));
    let text = async_std::task::block_on(
        extractor.extract_text(&args.input, args.password.as_deref()),
    )
    .map_err(|e| eprintln!("Error: {:?}: {}", args.input, e))?;

    let mut out = std::io::stdout().lock();
    if args.line_numbers {
        for (i, line) in text.split('\n').enumerate() {
            let _ = writeln!(out, "{:>4}: {}", i, line.trim_end_matches('\r'));
        }
    } else {
        let _ = write!(out, "{}", text);
    }
    let _ = out.flush();
    Ok(())
}
