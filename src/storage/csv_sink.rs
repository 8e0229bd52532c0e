//! Append-only CSV recorder. Every row is written and synced before `emit` returns,
//! so a reader tailing the file sees it immediately and an abrupt exit loses nothing.

use chrono::{DateTime, Local};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

pub const HEADER: [&str; 5] = [
    "timestamp",
    "millisSinceUnixEpoch",
    "quantity",
    "value",
    "unit",
];

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f %z";

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("sink I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv encoding failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("recorder already closed")]
    Closed,
    #[error("recorder lock poisoned")]
    Poisoned,
}

/// One measured fact. `unit` is `-` for dimensionless values.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub captured_at: DateTime<Local>,
    pub quantity: String,
    pub value: String,
    pub unit: String,
}

impl Record {
    pub fn new(
        captured_at: DateTime<Local>,
        quantity: impl Into<String>,
        value: impl Into<String>,
        unit: impl Into<String>,
    ) -> Self {
        Self {
            captured_at,
            quantity: quantity.into(),
            value: value.into(),
            unit: unit.into(),
        }
    }

    pub fn millis_since_epoch(&self) -> i64 {
        self.captured_at.timestamp_millis()
    }

    fn fields(&self) -> [String; 5] {
        [
            self.captured_at.format(TIMESTAMP_FORMAT).to_string(),
            self.millis_since_epoch().to_string(),
            self.quantity.clone(),
            self.value.clone(),
            self.unit.clone(),
        ]
    }
}

/// Encode rows into one CSV chunk. Nothing is kept between calls, so a row
/// whose write fails is never replayed by a later flush.
fn encode<I>(rows: I) -> Result<Vec<u8>, RecordError>
where
    I: IntoIterator,
    I::Item: IntoIterator,
    <I::Item as IntoIterator>::Item: AsRef<[u8]>,
{
    let mut encoder = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    for row in rows {
        encoder.write_record(row)?;
    }
    encoder
        .into_inner()
        .map_err(|e| RecordError::Io(e.into_error()))
}

struct Sink {
    file: File,
    header_written: bool,
}

impl Sink {
    /// Write one chunk (with the header in front if it is still missing) and
    /// sync it. A failed `write_all` may leave a partial row in the file.
    fn append(&mut self, fields: Option<[String; 5]>) -> Result<(), RecordError> {
        let header = (!self.header_written).then(|| HEADER.map(String::from));
        if header.is_none() && fields.is_none() {
            return Ok(());
        }
        let chunk = encode(header.iter().chain(fields.iter()))?;
        self.file.write_all(&chunk)?;
        self.header_written = true;
        self.persist()
    }

    fn persist(&mut self) -> Result<(), RecordError> {
        self.file.flush()?;
        self.file.sync_data()?;
        Ok(())
    }
}

/// Shared writer for one output file. All rows go through a single lock, so
/// rows from different callers never interleave.
pub struct Recorder {
    path: PathBuf,
    sink: Mutex<Option<Sink>>,
    rows: AtomicU64,
}

impl Recorder {
    /// Create (truncating) the output file.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, RecordError> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path)?;
        Ok(Self {
            path,
            sink: Mutex::new(Some(Sink {
                file,
                header_written: false,
            })),
            rows: AtomicU64::new(0),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Data rows written so far (header excluded). Failed writes are not counted.
    pub fn rows_written(&self) -> u64 {
        self.rows.load(Ordering::Relaxed)
    }

    /// Write the header row. Only the first successful call writes anything; a
    /// data row emitted first writes the header itself.
    pub fn write_header(&self) -> Result<(), RecordError> {
        let mut guard = self.lock()?;
        let sink = guard.as_mut().ok_or(RecordError::Closed)?;
        sink.append(None)
    }

    /// Record a fact stamped with the current time.
    pub fn emit(&self, quantity: &str, value: &str, unit: &str) -> Result<(), RecordError> {
        self.emit_at(Local::now(), quantity, value, unit)
    }

    /// Record a fact with an explicit capture time, so a batch shares one instant.
    pub fn emit_at(
        &self,
        captured_at: DateTime<Local>,
        quantity: &str,
        value: &str,
        unit: &str,
    ) -> Result<(), RecordError> {
        self.write(&Record::new(captured_at, quantity, value, unit))
    }

    pub fn write(&self, record: &Record) -> Result<(), RecordError> {
        let mut guard = self.lock()?;
        let sink = guard.as_mut().ok_or(RecordError::Closed)?;
        sink.append(Some(record.fields()))?;
        self.rows.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Flush and sync the file. Safe to call repeatedly.
    pub fn flush(&self) -> Result<(), RecordError> {
        let mut guard = self.lock()?;
        match guard.as_mut() {
            Some(sink) => sink.persist(),
            None => Ok(()),
        }
    }

    /// Flush, sync and close the file. Later writes fail with [`RecordError::Closed`];
    /// closing again does nothing.
    pub fn close(&self) -> Result<(), RecordError> {
        let mut guard = self.lock()?;
        let Some(mut sink) = guard.take() else {
            return Ok(());
        };
        sink.file.flush()?;
        sink.file.sync_all()?;
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.sink.lock().map(|g| g.is_none()).unwrap_or(true)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Option<Sink>>, RecordError> {
        self.sink.lock().map_err(|_| RecordError::Poisoned)
    }
}
