use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_std::process::{Command, Stdio};

/// What pdftotext prints on stderr when the password is wrong or missing.
pub const INCORRECT_PASSWORD_DIAGNOSTIC: &str = "Incorrect password";

pub const PDFTOTEXT_BIN_ENV_VAR: &str = "PDFTOTEXT_BIN";

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("Incorrect password")]
    WrongPassword,
    #[error("Text extraction failed ({status}): {stderr}")]
    ExtractionFailed { status: String, stderr: String },
    #[error("Text extraction timed out after {secs}s")]
    TimedOut { secs: u64 },
    #[error("Failed to run {bin:?}: {source}")]
    Spawn {
        bin: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Produces the layout-preserving text of a statement document.
#[async_trait::async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract_text(
        &self,
        path: &Path,
        password: Option<&str>,
    ) -> Result<String, ExtractError>;
}

/// Runs poppler's `pdftotext -layout`.
#[derive(Clone, Debug)]
pub struct PdfToText {
    pub bin: PathBuf,
    pub timeout: Option<Duration>,
}

impl PdfToText {
    pub fn new(bin: PathBuf) -> PdfToText {
        PdfToText { bin, timeout: None }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Uses `bin` if given, then $PDFTOTEXT_BIN, then pdftotext from PATH.
    ///
    /// If none can be found this still returns an extractor, which will
    /// fail to spawn when used. Text-only batches never need it.
    pub fn locate(bin: Option<PathBuf>) -> PdfToText {
        let bin = bin
            .or_else(|| {
                crate::util::sys::env_var_if_non_empty(PDFTOTEXT_BIN_ENV_VAR).map(PathBuf::from)
            })
            .or_else(|| which::which("pdftotext").ok())
            .unwrap_or_else(|| PathBuf::from("pdftotext"));
        tracing::debug!("Using pdftotext at {:?}", bin);
        PdfToText::new(bin)
    }

    /// `-layout [-upw <password>] <file> -`
    pub fn command_args(path: &Path, password: Option<&str>) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["-layout".into()];
        if let Some(pw) = password {
            args.push("-upw".into());
            args.push(pw.into());
        }
        args.push(path.as_os_str().to_owned());
        args.push("-".into());
        args
    }
}

#[async_trait::async_trait]
impl TextExtractor for PdfToText {
    async fn extract_text(
        &self,
        path: &Path,
        password: Option<&str>,
    ) -> Result<String, ExtractError> {
        tracing::debug!("Extracting text from {:?}", path);
        let mut cmd = Command::new(&self.bin);
        cmd.args(Self::command_args(path, password))
            .stdin(Stdio::null())
            .kill_on_drop(true);

        // Dropping the output future on timeout kills the child.
        let output = match self.timeout {
            Some(timeout) => async_std::future::timeout(timeout, cmd.output())
                .await
                .map_err(|_| ExtractError::TimedOut { secs: timeout.as_secs() })?,
            None => cmd.output().await,
        }
        .map_err(|e| ExtractError::Spawn { bin: self.bin.clone(), source: e })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            if stderr.contains(INCORRECT_PASSWORD_DIAGNOSTIC) {
                return Err(ExtractError::WrongPassword);
            }
            return Err(ExtractError::ExtractionFailed {
                status: output.status.to_string(),
                stderr,
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Reads text that was already extracted (eg. with stmt-text).
/// The password is ignored.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlainTextExtractor;

#[async_trait::async_trait]
impl TextExtractor for PlainTextExtractor {
    async fn extract_text(
        &self,
        path: &Path,
        _password: Option<&str>,
    ) -> Result<String, ExtractError> {
        tracing::trace!("Getting raw text from {:?}", path);
        async_std::fs::read_to_string(path)
            .await
            .map_err(|e| ExtractError::Io { path: path.to_path_buf(), source: e })
    }
}

/// Picks the extractor by file extension: .txt files are read as-is,
/// everything else goes through pdftotext.
#[derive(Clone, Debug)]
pub struct DispatchingExtractor {
    pub pdf: PdfToText,
    pub text: PlainTextExtractor,
}

impl DispatchingExtractor {
    pub fn new(pdf: PdfToText) -> DispatchingExtractor {
        DispatchingExtractor { pdf, text: PlainTextExtractor }
    }
}

pub fn is_text_file(path: &Path) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().eq_ignore_ascii_case("txt"))
        .unwrap_or(false)
}

#[async_trait::async_trait]
impl TextExtractor for DispatchingExtractor {
    async fn extract_text(
        &self,
        path: &Path,
        password: Option<&str>,
    ) -> Result<String, ExtractError> {
        if is_text_file(path) {
            self.text.extract_text(path, password).await
        } else {
            self.pdf.extract_text(path, password).await
        }
    }
}
