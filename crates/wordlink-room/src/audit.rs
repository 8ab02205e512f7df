//! Append-only audit trail of accepted words.
//!
//! Room actors never wait on storage. They push a [`WordRecord`] into an
//! unbounded channel and move on; a single writer task drains it into an
//! [`AuditSink`], retrying a few times before giving up and logging. The
//! room's in-memory state stays authoritative either way.

use std::future::Future;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use wordlink_protocol::{GameId, PlayerId};

/// Attempts per record before it is dropped.
const MAX_ATTEMPTS: u32 = 3;

/// Base delay between attempts; grows linearly.
const RETRY_BACKOFF: Duration = Duration::from_millis(100);

/// One accepted word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordRecord {
    pub game_id: GameId,
    pub word: String,
    pub previous_word: String,
    pub points: u32,
    pub player_id: PlayerId,
    /// Unix milliseconds.
    pub timestamp: u64,
}

/// Errors a sink can report.
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("audit write failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("audit encode failed: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Durable destination for word records.
///
/// Write-only from the game's point of view. Implementations may be slow or
/// flaky; the writer task absorbs both.
pub trait AuditSink: Send + Sync + 'static {
    fn append(&self, record: &WordRecord) -> impl Future<Output = Result<(), AuditError>> + Send;
}

/// Keeps records in memory. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct MemoryAuditSink {
    records: Arc<Mutex<Vec<WordRecord>>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of everything appended so far.
    pub fn records(&self) -> Vec<WordRecord> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }
}

impl AuditSink for MemoryAuditSink {
    async fn append(&self, record: &WordRecord) -> Result<(), AuditError> {
        if let Ok(mut records) = self.records.lock() {
            records.push(record.clone());
        }
        Ok(())
    }
}

/// Appends one JSON object per line to a file.
#[derive(Debug, Clone)]
pub struct JsonLinesAuditSink {
    path: PathBuf,
}

impl JsonLinesAuditSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl AuditSink for JsonLinesAuditSink {
    async fn append(&self, record: &WordRecord) -> Result<(), AuditError> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(&line).await?;
        file.flush().await?;
        Ok(())
    }
}

/// Cheap, cloneable handle room actors use to enqueue records.
#[derive(Debug, Clone, Default)]
pub struct AuditLog {
    sender: Option<mpsc::UnboundedSender<WordRecord>>,
}

impl AuditLog {
    /// A log that discards everything.
    pub fn disabled() -> Self {
        Self { sender: None }
    }

    /// Starts the writer task for `sink` and returns the handle feeding it.
    ///
    /// The task exits once every clone of the handle is dropped and the
    /// queue is drained.
    pub fn spawn<S: AuditSink>(sink: S) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run_writer(sink, rx));
        (Self { sender: Some(tx) }, task)
    }

    /// Enqueues a record. Never blocks and never fails the caller.
    pub fn record(&self, record: WordRecord) {
        let Some(sender) = &self.sender else {
            return;
        };
        if let Err(e) = sender.send(record) {
            tracing::warn!(
                game_id = %e.0.game_id,
                word = %e.0.word,
                "audit writer gone, dropping record"
            );
        }
    }
}

async fn run_writer<S: AuditSink>(sink: S, mut rx: mpsc::UnboundedReceiver<WordRecord>) {
    tracing::debug!("audit writer started");
    while let Some(record) = rx.recv().await {
        write_with_retry(&sink, &record).await;
    }
    tracing::debug!("audit writer stopped");
}

async fn write_with_retry<S: AuditSink>(sink: &S, record: &WordRecord) {
    for attempt in 1..=MAX_ATTEMPTS {
        match sink.append(record).await {
            Ok(()) => return,
            Err(e) if attempt < MAX_ATTEMPTS => {
                tracing::warn!(
                    game_id = %record.game_id,
                    word = %record.word,
                    attempt,
                    error = %e,
                    "audit write failed, retrying"
                );
                tokio::time::sleep(RETRY_BACKOFF * attempt).await;
            }
            Err(e) => {
                tracing::error!(
                    game_id = %record.game_id,
                    word = %record.word,
                    player_id = %record.player_id,
                    points = record.points,
                    error = %e,
                    "audit write failed, record dropped"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    fn record(word: &str) -> WordRecord {
        WordRecord {
            game_id: GameId(1),
            word: word.into(),
            previous_word: "tree".into(),
            points: 1,
            player_id: PlayerId(1),
            timestamp: 0,
        }
    }

    /// Fails the first `failures` appends, then delegates to memory.
    struct FlakySink {
        failures: u32,
        calls: AtomicU32,
        inner: MemoryAuditSink,
    }

    impl AuditSink for FlakySink {
        async fn append(&self, record: &WordRecord) -> Result<(), AuditError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                return Err(std::io::Error::other("disk on fire").into());
            }
            self.inner.append(record).await
        }
    }

    #[tokio::test]
    async fn test_records_reach_the_sink_in_order() {
        let sink = MemoryAuditSink::new();
        let (log, task) = AuditLog::spawn(sink.clone());

        log.record(record("leaf"));
        log.record(record("bush"));
        drop(log);
        task.await.unwrap();

        let words: Vec<_> = sink.records().into_iter().map(|r| r.word).collect();
        assert_eq!(words, vec!["leaf", "bush"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_failures_are_retried() {
        let inner = MemoryAuditSink::new();
        let sink = FlakySink {
            failures: 2,
            calls: AtomicU32::new(0),
            inner: inner.clone(),
        };
        let (log, task) = AuditLog::spawn(sink);

        log.record(record("leaf"));
        drop(log);
        task.await.unwrap();

        assert_eq!(inner.records().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_persistent_failure_drops_record_and_continues() {
        let inner = MemoryAuditSink::new();
        let sink = FlakySink {
            failures: MAX_ATTEMPTS,
            calls: AtomicU32::new(0),
            inner: inner.clone(),
        };
        let (log, task) = AuditLog::spawn(sink);

        log.record(record("leaf"));
        log.record(record("bush"));
        drop(log);
        task.await.unwrap();

        let words: Vec<_> = inner.records().into_iter().map(|r| r.word).collect();
        assert_eq!(words, vec!["bush"]);
    }

    #[test]
    fn test_disabled_log_accepts_records() {
        AuditLog::disabled().record(record("leaf"));
    }

    #[tokio::test]
    async fn test_json_lines_sink_appends() {
        let path = std::env::temp_dir().join(format!(
            "wordlink-audit-{}-{}.jsonl",
            std::process::id(),
            line!()
        ));
        let _ = tokio::fs::remove_file(&path).await;
        let sink = JsonLinesAuditSink::new(&path);

        sink.append(&record("leaf")).await.unwrap();
        sink.append(&record("bush")).await.unwrap();

        let contents = tokio::fs::read_to_string(&path).await.unwrap();
        let lines: Vec<WordRecord> = contents
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines, vec![record("leaf"), record("bush")]);
        let _ = tokio::fs::remove_file(&path).await;
    }
}
