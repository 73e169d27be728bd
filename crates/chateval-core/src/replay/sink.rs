//! Append-only result file for scripted replays

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, warn};

use super::naming::disambiguated;
use crate::error::{ChatEvalError, ChatEvalResult};

/// Upper bound on `_n` suffixes tried when the result name is taken
const MAX_NAME_ATTEMPTS: usize = 1000;

/// Result file that receives one recorded reply per line
///
/// The sink never overwrites: it is created with create-new semantics and
/// moves to `{stem}_{n}.txt` when the derived name already exists.
/// [`OutputSink::close`] consumes the sink so it can only be closed once.
#[derive(Debug)]
pub struct OutputSink {
    path: PathBuf,
    writer: BufWriter<File>,
    lines_written: usize,
}

impl OutputSink {
    /// Create the result file at `base`, or at the first free suffixed name
    pub async fn create(base: impl AsRef<Path>) -> ChatEvalResult<Self> {
        let base = base.as_ref();
        if let Some(parent) = base.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ChatEvalError::io(format!("creating {}", parent.display()), e))?;
        }

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let path = if attempt == 0 {
                base.to_path_buf()
            } else {
                disambiguated(base, attempt)
            };

            match OpenOptions::new().write(true).create_new(true).open(&path).await {
                Ok(file) => {
                    if attempt > 0 {
                        warn!(
                            "{} already exists, writing results to {}",
                            base.display(),
                            path.display()
                        );
                    }
                    debug!("Opened result file {}", path.display());
                    return Ok(Self {
                        path,
                        writer: BufWriter::new(file),
                        lines_written: 0,
                    });
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => {
                    return Err(ChatEvalError::io(format!("creating {}", path.display()), e));
                }
            }
        }

        Err(ChatEvalError::config(format!(
            "no free result file name next to {} after {} attempts",
            base.display(),
            MAX_NAME_ATTEMPTS
        )))
    }

    /// Append one reply followed by a newline
    pub async fn write_line(&mut self, text: &str) -> ChatEvalResult<()> {
        self.writer
            .write_all(text.as_bytes())
            .await
            .map_err(|e| ChatEvalError::io(format!("writing {}", self.path.display()), e))?;
        self.writer
            .write_all(b"\n")
            .await
            .map_err(|e| ChatEvalError::io(format!("writing {}", self.path.display()), e))?;
        self.lines_written += 1;
        Ok(())
    }

    /// Flush buffered replies and release the file
    pub async fn close(mut self) -> ChatEvalResult<PathBuf> {
        self.writer
            .shutdown()
            .await
            .map_err(|e| ChatEvalError::io(format!("closing {}", self.path.display()), e))?;
        debug!(
            "Closed result file {} ({} lines)",
            self.path.display(),
            self.lines_written
        );
        Ok(self.path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn lines_written(&self) -> usize {
        self.lines_written
    }
}
