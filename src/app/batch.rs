use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use time::Date;

use crate::peripheral::pdftotext::{ExtractError, TextExtractor};
use crate::statement::{ParseOptions, StatementDocument, StatementParser, Transaction};
use crate::util::date::today_local;

pub type Error = String;

pub const DEFAULT_JOBS: usize = 4;

/// File extensions picked up when the input is a directory.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["pdf", "txt"];

/// A statement to process: a file on disk, or the contents of one that
/// was received some other way.
#[derive(Clone, Debug)]
pub enum DocumentSource {
    Path(PathBuf),
    Bytes { name: String, data: Vec<u8> },
}

impl DocumentSource {
    pub fn name(&self) -> String {
        match self {
            DocumentSource::Path(p) => get_filename(p),
            DocumentSource::Bytes { name, .. } => name.clone(),
        }
    }
}

pub fn get_filename(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "<unnamed file>".to_string())
}

// Extractors work on paths, so in-memory documents get a temp file. The
// extension is kept so they are dispatched the same way as the original.
fn write_temp_document(name: &str, data: &[u8]) -> Result<tempfile::NamedTempFile, ExtractError> {
    let io_err = |e| ExtractError::Io { path: PathBuf::from(name), source: e };
    let suffix = Path::new(name)
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    let mut f = tempfile::Builder::new()
        .prefix("bankstmt-")
        .suffix(&suffix)
        .tempfile()
        .map_err(io_err)?;
    f.write_all(data).map_err(io_err)?;
    f.flush().map_err(io_err)?;
    Ok(f)
}

/// Extracts and parses a single statement.
///
/// Extraction failures (including a wrong password) are returned as errors
/// and nothing is parsed. A document that extracts but has no transactions
/// is not an error.
pub async fn process_document(
    extractor: &dyn TextExtractor,
    source: &DocumentSource,
    password: Option<&str>,
    options: &ParseOptions,
) -> Result<Vec<Transaction>, ExtractError> {
    let text = match source {
        DocumentSource::Path(path) => extractor.extract_text(path, password).await?,
        DocumentSource::Bytes { name, data } => {
            let tmp = write_temp_document(name, data)?;
            extractor.extract_text(tmp.path(), password).await?
        }
    };

    let doc = StatementDocument::from_text(&text);
    let txs = StatementParser::default().parse(&doc, options);
    tracing::debug!("{}: {} transactions", source.name(), txs.len());
    Ok(txs)
}

#[derive(Clone, Debug)]
pub struct BatchOptions {
    pub password: Option<String>,
    /// How many documents are extracted at once. At least 1.
    pub jobs: usize,
    /// Stop at the first failed document instead of skipping it.
    pub fail_fast: bool,
    /// Record the document name on each row.
    pub include_source: bool,
    pub today: Date,
}

impl Default for BatchOptions {
    fn default() -> Self {
        BatchOptions {
            password: None,
            jobs: DEFAULT_JOBS,
            fail_fast: false,
            include_source: true,
            today: today_local(),
        }
    }
}

#[derive(Debug)]
pub struct DocumentOutcome {
    pub path: PathBuf,
    pub result: Result<Vec<Transaction>, ExtractError>,
}

impl DocumentOutcome {
    pub fn name(&self) -> String {
        get_filename(&self.path)
    }
}

async fn process_path(
    extractor: &dyn TextExtractor,
    path: &Path,
    options: &BatchOptions,
) -> DocumentOutcome {
    let parse_options = ParseOptions {
        source: options.include_source.then(|| get_filename(path)),
        today: options.today,
    };
    let source = DocumentSource::Path(path.to_path_buf());
    let result =
        process_document(extractor, &source, options.password.as_deref(), &parse_options).await;
    DocumentOutcome { path: path.to_path_buf(), result }
}

/// Processes documents with up to `options.jobs` running at a time.
///
/// Each worker takes the next unstarted document as soon as it is free, so
/// one slow document only occupies one worker. Outcomes come back in the
/// order of `paths`, no matter which finished first. With `fail_fast`, no
/// new documents are started after a failure, and nothing after the first
/// failure is returned.
pub async fn process_documents(
    extractor: Arc<dyn TextExtractor>,
    paths: &[PathBuf],
    options: &BatchOptions,
) -> Vec<DocumentOutcome> {
    let start = std::time::Instant::now();
    let n_workers = options.jobs.max(1).min(paths.len().max(1));
    let paths = Arc::new(paths.to_vec());
    let next_index = Arc::new(AtomicUsize::new(0));
    let stop = Arc::new(AtomicBool::new(false));

    let workers: Vec<_> = (0..n_workers)
        .map(|_| {
            let extractor = extractor.clone();
            let paths = paths.clone();
            let next_index = next_index.clone();
            let stop = stop.clone();
            let options = options.clone();
            async_std::task::spawn(async move {
                let mut done = Vec::new();
                while !stop.load(Ordering::SeqCst) {
                    let i = next_index.fetch_add(1, Ordering::SeqCst);
                    let Some(path) = paths.get(i) else {
                        break;
                    };
                    let outcome = process_path(extractor.as_ref(), path, &options).await;
                    if options.fail_fast && outcome.result.is_err() {
                        stop.store(true, Ordering::SeqCst);
                    }
                    done.push((i, outcome));
                }
                done
            })
        })
        .collect();

    // Indexes are handed out in order, so the finished ones always form a
    // prefix of paths.
    let mut indexed = Vec::with_capacity(paths.len());
    for worker in workers {
        indexed.extend(worker.await);
    }
    indexed.sort_by_key(|(i, _)| *i);
    let mut outcomes: Vec<DocumentOutcome> = indexed.into_iter().map(|(_, o)| o).collect();

    if options.fail_fast {
        if let Some(i) = outcomes.iter().position(|o| o.result.is_err()) {
            tracing::debug!("Stopping batch after failure of {:?}", outcomes[i].path);
            outcomes.truncate(i + 1);
        }
    }

    tracing::debug!("process_documents took {:?}", start.elapsed());
    outcomes
}

/// The documents to process for an input path.
///
/// A directory yields its .pdf and .txt files (not recursive), sorted by
/// name. Anything else is taken as a single document.
pub fn collect_input_files(input: &Path) -> Result<Vec<PathBuf>, Error> {
    if !input.is_dir() {
        if !input.exists() {
            return Err(format!("{:?} does not exist", input));
        }
        return Ok(vec![input.to_path_buf()]);
    }

    let entries =
        std::fs::read_dir(input).map_err(|e| format!("Failed to read {:?}: {}", input, e))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| format!("Failed to read {:?}: {}", input, e))?.path();
        let supported = path.is_file()
            && path
                .extension()
                .map(|e| {
                    let e = e.to_string_lossy();
                    SUPPORTED_EXTENSIONS.iter().any(|s| e.eq_ignore_ascii_case(s))
                })
                .unwrap_or(false);
        if supported {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use rust_decimal_macros::dec;

    use crate::peripheral::pdftotext::{ExtractError, TextExtractor};
    use crate::statement::ParseOptions;
    use crate::util::date::pub_testlib::ymd;

    use super::{process_document, process_documents, BatchOptions, DocumentSource};

    const STATEMENT: &str = "Statement Date 01/04/2016\n24/03   SHOP   12.30\n";

    // Serves canned text by file name. Names containing "locked" need the
    // password "123abc", and "broken" ones always fail.
    struct CannedExtractor;

    #[async_trait::async_trait]
    impl TextExtractor for CannedExtractor {
        async fn extract_text(
            &self,
            path: &Path,
            password: Option<&str>,
        ) -> Result<String, ExtractError> {
            let name = path.to_string_lossy();
            if name.contains("broken") {
                return Err(ExtractError::ExtractionFailed {
                    status: "exit status: 1".to_string(),
                    stderr: "Syntax Error".to_string(),
                });
            }
            if name.contains("locked") && password != Some("123abc") {
                return Err(ExtractError::WrongPassword);
            }
            Ok(STATEMENT.to_string())
        }
    }

    // "slow" documents only finish once all the others have been extracted.
    // Tracks how many extractions overlap.
    struct WaitingExtractor {
        n_others: usize,
        others_done: AtomicUsize,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl WaitingExtractor {
        fn new(n_others: usize) -> WaitingExtractor {
            WaitingExtractor {
                n_others,
                others_done: AtomicUsize::new(0),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait::async_trait]
    impl TextExtractor for WaitingExtractor {
        async fn extract_text(
            &self,
            path: &Path,
            _password: Option<&str>,
        ) -> Result<String, ExtractError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            let res = if path.to_string_lossy().contains("slow") {
                let wait_for_others = async {
                    while self.others_done.load(Ordering::SeqCst) < self.n_others {
                        async_std::task::sleep(Duration::from_millis(5)).await;
                    }
                };
                async_std::future::timeout(Duration::from_secs(5), wait_for_others)
                    .await
                    .map(|_| STATEMENT.to_string())
                    .map_err(|_| ExtractError::TimedOut { secs: 5 })
            } else {
                async_std::task::sleep(Duration::from_millis(5)).await;
                self.others_done.fetch_add(1, Ordering::SeqCst);
                Ok(STATEMENT.to_string())
            };

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            res
        }
    }

    fn opts() -> BatchOptions {
        BatchOptions { today: ymd(2020, 1, 1), ..Default::default() }
    }

    fn paths(v: &[&str]) -> Vec<PathBuf> {
        v.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn test_process_document() {
        let txs = async_std::task::block_on(process_document(
            &CannedExtractor,
            &DocumentSource::Path(PathBuf::from("a.pdf")),
            None,
            &ParseOptions::default(),
        ))
        .unwrap();
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].amount, Some(dec!(12.30)));
        assert_eq!(txs[0].date, ymd(2016, 3, 24));
    }

    #[test]
    fn test_process_document_password() {
        let source = DocumentSource::Path(PathBuf::from("locked.pdf"));
        let res = async_std::task::block_on(process_document(
            &CannedExtractor,
            &source,
            Some("123"),
            &ParseOptions::default(),
        ));
        assert!(matches!(res, Err(ExtractError::WrongPassword)));

        let res = async_std::task::block_on(process_document(
            &CannedExtractor,
            &source,
            Some("123abc"),
            &ParseOptions::default(),
        ));
        assert_eq!(res.unwrap().len(), 1);
    }

    #[test]
    fn test_process_bytes_document() {
        let source = DocumentSource::Bytes {
            name: "upload.txt".to_string(),
            data: STATEMENT.as_bytes().to_vec(),
        };
        assert_eq!(source.name(), "upload.txt");
        let txs = async_std::task::block_on(process_document(
            &crate::peripheral::pdftotext::PlainTextExtractor,
            &source,
            None,
            &ParseOptions::default().with_source("upload.txt"),
        ))
        .unwrap();
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].source.as_deref(), Some("upload.txt"));
    }

    #[test]
    fn test_process_documents_keeps_order_and_skips_failures() {
        let options = BatchOptions { jobs: 2, ..opts() };
        let outcomes = async_std::task::block_on(process_documents(
            Arc::new(CannedExtractor),
            &paths(&["d/a.pdf", "d/broken.pdf", "d/c.pdf", "d/locked.pdf", "d/e.pdf"]),
            &options,
        ));
        let names: Vec<String> = outcomes.iter().map(|o| o.name()).collect();
        assert_eq!(names, vec!["a.pdf", "broken.pdf", "c.pdf", "locked.pdf", "e.pdf"]);
        assert!(outcomes[0].result.is_ok());
        assert!(matches!(outcomes[1].result, Err(ExtractError::ExtractionFailed { .. })));
        assert!(outcomes[2].result.is_ok());
        assert!(matches!(outcomes[3].result, Err(ExtractError::WrongPassword)));

        let e_txs = outcomes[4].result.as_ref().unwrap();
        assert_eq!(e_txs[0].source.as_deref(), Some("e.pdf"));
    }

    #[test]
    fn test_process_documents_slow_document_does_not_block_others() {
        let extractor = Arc::new(WaitingExtractor::new(4));
        let options = BatchOptions { jobs: 2, ..opts() };
        let outcomes = async_std::task::block_on(process_documents(
            extractor.clone(),
            &paths(&["slow.pdf", "a.pdf", "b.pdf", "c.pdf", "d.pdf"]),
            &options,
        ));
        let names: Vec<String> = outcomes.iter().map(|o| o.name()).collect();
        assert_eq!(names, vec!["slow.pdf", "a.pdf", "b.pdf", "c.pdf", "d.pdf"]);
        for o in &outcomes {
            assert!(o.result.is_ok(), "{}: {:?}", o.name(), o.result);
        }
        assert_eq!(extractor.max_in_flight.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_process_documents_fail_fast() {
        for jobs in [1, 2, 8] {
            let options = BatchOptions { jobs, fail_fast: true, ..opts() };
            let outcomes = async_std::task::block_on(process_documents(
                Arc::new(CannedExtractor),
                &paths(&["a.pdf", "broken.pdf", "c.pdf", "d.pdf"]),
                &options,
            ));
            assert_eq!(outcomes.len(), 2, "jobs = {jobs}");
            assert!(outcomes[1].result.is_err());
        }
    }

    #[test]
    fn test_process_documents_no_source() {
        let options = BatchOptions { include_source: false, jobs: 0, ..opts() };
        let outcomes = async_std::task::block_on(process_documents(
            Arc::new(CannedExtractor),
            &paths(&["a.pdf"]),
            &options,
        ));
        assert_eq!(outcomes[0].result.as_ref().unwrap()[0].source, None);
    }
}
