//! Types and traits for recording the progress of a control run.
//!
//! A [`Record`] is a set of named values produced at some point of a run,
//! for example the reward and the applied phase of a tick. Records are
//! handed to a [`Recorder`]; an [`AggregateRecorder`] additionally keeps them
//! and writes aggregated values when flushed.
//!
//! ```rust
//! use junction_core::record::{Record, RecordValue};
//!
//! let mut record = Record::empty();
//! record.insert("tick", RecordValue::Scalar(1.0));
//! record.insert("reward", RecordValue::Scalar(-3.0));
//! record.insert("cause", RecordValue::String("policy".to_string()));
//! ```
mod base;
mod buffered_recorder;
mod null_recorder;
mod recorder;
mod storage;

pub use base::{Record, RecordValue};
pub use buffered_recorder::BufferedRecorder;
pub use null_recorder::NullRecorder;
pub use recorder::{AggregateRecorder, Recorder};
pub use storage::RecordStorage;
