//! History log: the ordered, append-only record of broadcast lines.

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

use crate::domain::{ChatLine, TranscriptError, TranscriptStore};

/// Shared, append-only log of every broadcast line, backed by a transcript store.
pub struct HistoryLog {
    lines: Mutex<Vec<ChatLine>>,
    store: Arc<dyn TranscriptStore>,
}

impl HistoryLog {
    /// Create an empty log that persists into `store`.
    pub fn new(store: Arc<dyn TranscriptStore>) -> Self {
        Self {
            lines: Mutex::new(Vec::new()),
            store,
        }
    }

    /// Create a log seeded with whatever `store` already holds.
    pub async fn restore(store: Arc<dyn TranscriptStore>) -> Result<Self, TranscriptError> {
        let lines = store.load().await?;
        tracing::info!("Restored {} transcript line(s)", lines.len());
        Ok(Self {
            lines: Mutex::new(lines),
            store,
        })
    }

    /// Exclusive access for callers that must order another step against appends.
    ///
    /// Lock order: the history lock is always taken before the registry lock.
    pub async fn lock(&self) -> HistoryGuard<'_> {
        HistoryGuard {
            lines: self.lines.lock().await,
        }
    }

    /// Append one line. Returns its 1-based position in the log.
    pub async fn append(&self, line: ChatLine) -> usize {
        self.lock().await.push(line)
    }

    pub async fn lines(&self) -> Vec<ChatLine> {
        self.lines.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.lines.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.lines.lock().await.is_empty()
    }

    /// Persist the full log. Appends wait until the write finishes.
    pub async fn flush(&self) -> Result<usize, TranscriptError> {
        let lines = self.lines.lock().await;
        self.store.persist(&lines).await?;
        Ok(lines.len())
    }
}

/// Held lock on the history log.
pub struct HistoryGuard<'a> {
    lines: MutexGuard<'a, Vec<ChatLine>>,
}

impl HistoryGuard<'_> {
    pub fn push(&mut self, line: ChatLine) -> usize {
        self.lines.push(line);
        self.lines.len()
    }

    pub fn lines(&self) -> &[ChatLine] {
        &self.lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DisplayName, MockTranscriptStore};
    use std::path::PathBuf;

    fn line(text: &str) -> ChatLine {
        ChatLine::from_record(text)
    }

    #[tokio::test]
    async fn test_append_returns_positions_in_order() {
        // Test: appends are numbered in the order they happen
        // given (preconditions):
        let history = HistoryLog::new(Arc::new(MockTranscriptStore::new()));
        let alice = DisplayName::new("alice").unwrap();

        // when (action):
        let first = history.append(ChatLine::compose(&alice, "one")).await;
        let second = history.append(ChatLine::compose(&alice, "two")).await;

        // then (expected):
        assert_eq!((first, second), (1, 2));
        assert_eq!(history.lines().await, vec![line("alice: one"), line("alice: two")]);
    }

    #[tokio::test]
    async fn test_restore_seeds_from_store() {
        // Test: a restored log starts with the persisted transcript
        // given (preconditions):
        let mut store = MockTranscriptStore::new();
        store
            .expect_load()
            .times(1)
            .returning(|| Ok(vec![ChatLine::from_record("bob: earlier")]));

        // when (action):
        let history = HistoryLog::restore(Arc::new(store)).await.unwrap();
        history.append(line("alice: later")).await;

        // then (expected):
        assert_eq!(
            history.lines().await,
            vec![line("bob: earlier"), line("alice: later")]
        );
    }

    #[tokio::test]
    async fn test_flush_persists_every_line_in_order() {
        // Test: flush hands the whole ordered log to the store
        // given (preconditions):
        let mut store = MockTranscriptStore::new();
        store
            .expect_persist()
            .withf(|lines: &[ChatLine]| {
                lines == [ChatLine::from_record("a: 1"), ChatLine::from_record("b: 2")]
            })
            .times(1)
            .returning(|_| Ok(()));
        let history = HistoryLog::new(Arc::new(store));
        history.append(line("a: 1")).await;
        history.append(line("b: 2")).await;

        // when (action):
        let persisted = history.flush().await;

        // then (expected):
        assert_eq!(persisted.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_flush_failure_is_reported() {
        // Test: a store failure surfaces as a TranscriptError and keeps the log intact
        // given (preconditions):
        let mut store = MockTranscriptStore::new();
        store.expect_persist().returning(|_| {
            Err(TranscriptError::Write {
                path: PathBuf::from("/nonexistent/history.txt"),
                source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
            })
        });
        let history = HistoryLog::new(Arc::new(store));
        history.append(line("a: 1")).await;

        // when (action):
        let result = history.flush().await;

        // then (expected):
        assert!(matches!(result, Err(TranscriptError::Write { .. })));
        assert_eq!(history.len().await, 1);
    }

    #[tokio::test]
    async fn test_concurrent_appends_preserve_per_sender_order() {
        // Test: concurrent appenders interleave but each keeps its own order
        // given (preconditions):
        let history = Arc::new(HistoryLog::new(Arc::new(MockTranscriptStore::new())));

        // when (action):
        let mut tasks = Vec::new();
        for sender in ["alice", "bob", "carol"] {
            let history = history.clone();
            tasks.push(tokio::spawn(async move {
                for i in 0..50 {
                    history
                        .append(ChatLine::from_record(format!("{sender}: {i}")))
                        .await;
                    tokio::task::yield_now().await;
                }
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        // then (expected):
        let lines = history.lines().await;
        assert_eq!(lines.len(), 150);
        for sender in ["alice", "bob", "carol"] {
            let prefix = format!("{sender}: ");
            let own: Vec<usize> = lines
                .iter()
                .filter_map(|l| l.as_str().strip_prefix(&prefix))
                .map(|n| n.parse().unwrap())
                .collect();
            assert_eq!(own, (0..50).collect::<Vec<_>>());
        }
    }
}
