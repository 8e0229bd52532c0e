//! Operator-facing logging. Recorded metrics never go through here.

mod format;

pub use format::StructuredLogger;
