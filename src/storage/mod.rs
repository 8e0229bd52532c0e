//! Durable CSV sink for recorded metrics.

mod csv_sink;

pub use csv_sink::{Record, RecordError, Recorder, HEADER};
