//! Recorder writing to the log.
use junction_core::record::{AggregateRecorder, Record, RecordStorage, RecordValue, Recorder};
use log::info;

/// Writes records to the log at `info` level.
///
/// Stored records are aggregated with [`RecordStorage`] and written on flush.
pub struct LogRecorder {
    name: String,
    storage: RecordStorage,
}

impl LogRecorder {
    /// Constructs a recorder prefixing its lines with `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            storage: RecordStorage::new(),
        }
    }
}

/// Formats a record as `key=value` pairs sorted by key.
pub(crate) fn format_record(record: &Record) -> String {
    let mut items: Vec<(&String, &RecordValue)> = record.iter().collect();
    items.sort_by(|a, b| a.0.cmp(b.0));
    items
        .iter()
        .map(|(k, v)| match v {
            RecordValue::Scalar(v) => format!("{}={:.3}", k, v),
            RecordValue::DateTime(v) => format!("{}={}", k, v.format("%Y-%m-%d %H:%M:%S")),
            RecordValue::Array1(v) => format!("{}={:?}", k, v),
            RecordValue::String(v) => format!("{}={}", k, v),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

impl Recorder for LogRecorder {
    fn write(&mut self, record: Record) {
        info!("[{}] {}", self.name, format_record(&record));
    }
}

impl AggregateRecorder for LogRecorder {
    fn store(&mut self, record: Record) {
        self.storage.store(record);
    }

    fn flush(&mut self, step: i64) {
        if !self.storage.is_empty() {
            let record = self.storage.aggregate();
            info!("[{}] tick {}: {}", self.name, step, format_record(&record));
        }
    }
}
