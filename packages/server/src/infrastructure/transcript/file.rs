//! File-backed transcript store.
//!
//! One broadcast line per record, `\n`-terminated, oldest first. Persisting
//! writes a sibling temp file and renames it over the transcript, so a crash
//! mid-write never leaves a truncated transcript behind.

use std::{io::ErrorKind, path::PathBuf};

use async_trait::async_trait;
use tokio::{fs, io::AsyncWriteExt};

use crate::domain::{ChatLine, TranscriptError, TranscriptStore};

pub struct FileTranscriptStore {
    path: PathBuf,
}

impl FileTranscriptStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "transcript".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn write_error(&self, source: std::io::Error) -> TranscriptError {
        TranscriptError::Write {
            path: self.path.clone(),
            source,
        }
    }
}

#[async_trait]
impl TranscriptStore for FileTranscriptStore {
    async fn load(&self) -> Result<Vec<ChatLine>, TranscriptError> {
        let contents = match fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("No transcript at {}, starting empty", self.path.display());
                return Ok(Vec::new());
            }
            Err(source) => {
                return Err(TranscriptError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        Ok(contents
            .lines()
            .filter(|line| !line.is_empty())
            .map(ChatLine::from_record)
            .collect())
    }

    async fn persist(&self, lines: &[ChatLine]) -> Result<(), TranscriptError> {
        let mut buf = String::new();
        for line in lines {
            buf.push_str(line.as_str());
            buf.push('\n');
        }

        let temp = self.temp_path();
        let mut file = fs::File::create(&temp)
            .await
            .map_err(|e| self.write_error(e))?;
        file.write_all(buf.as_bytes())
            .await
            .map_err(|e| self.write_error(e))?;
        file.sync_all().await.map_err(|e| self.write_error(e))?;
        drop(file);

        fs::rename(&temp, &self.path)
            .await
            .map_err(|e| self.write_error(e))?;

        tracing::info!(
            "Persisted {} transcript line(s) to {}",
            lines.len(),
            self.path.display()
        );
        Ok(())
    }
}
