//! Event Store - append-only editing log
//!
//! Records are appended as received to `events.jsonl` and indexed in memory
//! per workspace, ordered by `(timestamp, sequence)`. The sequence is the
//! record's line number in the log, so reloading reproduces the same order.

use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::error::{TimelineError, TimelineResult};
use crate::validation::{classify, validate_envelope, Classification, Envelope};

/// Default number of content edits per page
pub const DEFAULT_PAGE_SIZE: usize = 500;

/// Upper bound on the page size
pub const MAX_PAGE_SIZE: usize = 5000;

/// Configuration for the EventStore
#[derive(Debug, Clone)]
pub struct EventStoreConfig {
    /// Directory holding `events.jsonl`; `None` keeps the log in memory only
    pub data_dir: Option<PathBuf>,
    /// Content edits returned per page
    pub page_size: usize,
    /// fsync after every append batch
    pub sync_writes: bool,
}

impl Default for EventStoreConfig {
    fn default() -> Self {
        Self {
            data_dir: Some(PathBuf::from("data")),
            page_size: DEFAULT_PAGE_SIZE,
            sync_writes: true,
        }
    }
}

impl EventStoreConfig {
    /// Create config with custom data directory
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: Some(data_dir.as_ref().to_path_buf()),
            ..Default::default()
        }
    }

    /// Config for a store that never touches disk
    pub fn in_memory() -> Self {
        Self {
            data_dir: None,
            ..Default::default()
        }
    }

    /// Set the page size, clamped to `1..=MAX_PAGE_SIZE`
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    /// Get the data directory path
    pub fn data_dir(&self) -> Option<&Path> {
        self.data_dir.as_deref()
    }

    /// Get path to events.jsonl
    pub fn events_path(&self) -> Option<PathBuf> {
        self.data_dir.as_ref().map(|dir| dir.join("events.jsonl"))
    }
}

/// Sort key of a stored record within its workspace
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct EventKey {
    pub timestamp: i64,
    pub sequence: u64,
}

impl EventKey {
    /// Largest key at `timestamp`
    pub fn upper(timestamp: i64) -> Self {
        Self {
            timestamp,
            sequence: u64::MAX,
        }
    }
}

/// A record as received, plus its classification
#[derive(Debug, Clone)]
pub(crate) struct StoredRecord {
    pub raw: Value,
    pub classification: Classification,
}

/// One workspace's partition of the log
#[derive(Debug, Default)]
pub(crate) struct WorkspaceLog {
    pub records: BTreeMap<EventKey, StoredRecord>,
}

/// Record refused at the ingest boundary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedRecord {
    /// Position of the record in the submitted batch
    pub index: usize,
    pub reason: String,
}

/// Outcome of an append batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub accepted: usize,
    pub rejected: Vec<RejectedRecord>,
}

/// The EventStore manages the append-only log and its per-workspace index
pub struct EventStore {
    config: EventStoreConfig,
    pub(crate) index: RwLock<HashMap<String, WorkspaceLog>>,
    /// Open log file; also serializes appends so sequence == line order
    writer: Mutex<Option<File>>,
    next_sequence: AtomicU64,
}

impl EventStore {
    /// Open (or create) the log described by `config` and rebuild the index
    pub fn open(config: EventStoreConfig) -> TimelineResult<Self> {
        let mut index: HashMap<String, WorkspaceLog> = HashMap::new();
        let mut next_sequence = 0u64;
        let mut writer = None;

        if let Some(events_path) = config.events_path() {
            if let Some(parent) = events_path.parent() {
                fs::create_dir_all(parent)?;
            }

            let mut needs_newline = false;
            if events_path.exists() {
                let content = fs::read_to_string(&events_path)?;
                needs_newline = !content.is_empty() && !content.ends_with('\n');

                for (line_num, line) in content.lines().enumerate() {
                    next_sequence = line_num as u64 + 1;
                    if line.trim().is_empty() {
                        continue;
                    }

                    let record: Value = match serde_json::from_str(line) {
                        Ok(record) => record,
                        Err(e) => {
                            warn!(line = line_num + 1, error = %e, "skipping unparseable log line");
                            continue;
                        }
                    };

                    match validate_envelope(&record) {
                        Ok(envelope) => {
                            Self::index_record(&mut index, envelope, line_num as u64, record)
                        }
                        Err(reason) => {
                            warn!(line = line_num + 1, %reason, "skipping log line without envelope");
                        }
                    }
                }
            }

            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&events_path)?;
            if needs_newline {
                // terminate a torn last line so the next append starts cleanly
                writeln!(file)?;
            }
            writer = Some(file);

            info!(
                path = %events_path.display(),
                records = next_sequence,
                workspaces = index.len(),
                "event log loaded"
            );
        }

        Ok(Self {
            config,
            index: RwLock::new(index),
            writer: Mutex::new(writer),
            next_sequence: AtomicU64::new(next_sequence),
        })
    }

    /// Store that keeps everything in memory
    pub fn in_memory() -> Self {
        Self {
            config: EventStoreConfig::in_memory(),
            index: RwLock::new(HashMap::new()),
            writer: Mutex::new(None),
            next_sequence: AtomicU64::new(0),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &EventStoreConfig {
        &self.config
    }

    /// Sequence number the next appended record will receive
    pub fn next_sequence(&self) -> u64 {
        self.next_sequence.load(Ordering::SeqCst)
    }

    fn index_record(
        index: &mut HashMap<String, WorkspaceLog>,
        envelope: Envelope,
        sequence: u64,
        record: Value,
    ) {
        let classification = classify(&record, sequence);
        if let Classification::NonConforming(reason) = &classification {
            debug!(
                workspace = %envelope.workspace_id,
                sequence,
                %reason,
                "non-conforming record excluded from replay"
            );
        }

        index
            .entry(envelope.workspace_id)
            .or_default()
            .records
            .insert(
                EventKey {
                    timestamp: envelope.timestamp,
                    sequence,
                },
                StoredRecord {
                    raw: record,
                    classification,
                },
            );
    }

    /// Append a batch of raw records
    ///
    /// Records without a usable envelope are rejected and reported; every
    /// other record is written as-is, even when replay will later skip it.
    pub fn append_batch(&self, records: Vec<Value>) -> TimelineResult<IngestReport> {
        let mut report = IngestReport::default();
        let mut accepted = Vec::with_capacity(records.len());

        for (index, record) in records.into_iter().enumerate() {
            match validate_envelope(&record) {
                Ok(envelope) => accepted.push((envelope, record)),
                Err(reason) => {
                    warn!(index, %reason, "rejecting record at ingest");
                    report.rejected.push(RejectedRecord { index, reason });
                }
            }
        }

        if !accepted.is_empty() {
            report.accepted = accepted.len();
            self.persist(accepted)?;
        }

        debug!(
            accepted = report.accepted,
            rejected = report.rejected.len(),
            "append batch"
        );
        Ok(report)
    }

    /// Append one raw record, returning its sequence number
    pub fn append(&self, record: Value) -> TimelineResult<u64> {
        let envelope = validate_envelope(&record).map_err(TimelineError::InvalidRecord)?;
        let sequences = self.persist(vec![(envelope, record)])?;
        Ok(sequences.start)
    }

    /// Write records to the log, then index them; returns their sequences
    ///
    /// A failed write is truncated away so the log never holds lines the
    /// index has not numbered.
    fn persist(&self, records: Vec<(Envelope, Value)>) -> TimelineResult<Range<u64>> {
        let mut writer = self.writer.lock();

        if let Some(file) = writer.as_mut() {
            let mut lines = String::new();
            for (_, record) in &records {
                lines.push_str(&serde_json::to_string(record)?);
                lines.push('\n');
            }

            let committed_len = file.metadata()?.len();
            if let Err(e) = write_lines(file, lines.as_bytes(), self.config.sync_writes) {
                match file.set_len(committed_len) {
                    Ok(()) => warn!(error = %e, records = records.len(), "append failed, log rolled back"),
                    Err(truncate_err) => error!(
                        error = %e,
                        truncate_error = %truncate_err,
                        "append failed and the log could not be rolled back"
                    ),
                }
                return Err(e.into());
            }
        }

        let first = self.next_sequence.load(Ordering::SeqCst);
        let mut index = self.index.write();
        for (envelope, record) in records {
            let sequence = self.next_sequence.fetch_add(1, Ordering::SeqCst);
            Self::index_record(&mut index, envelope, sequence, record);
        }
        Ok(first..self.next_sequence.load(Ordering::SeqCst))
    }
}

fn write_lines(file: &mut File, bytes: &[u8], sync: bool) -> std::io::Result<()> {
    file.write_all(bytes)?;
    if sync {
        file.sync_all()?;
    }
    Ok(())
}
