//! Log lines to stderr, either human-readable or one JSON object per line.

use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

pub struct StructuredLogger;

impl StructuredLogger {
    /// Install global subscriber: level from RUST_LOG, else `default_level`.
    ///
    /// Calling this twice is harmless; the second install is ignored.
    pub fn init(json: bool, default_level: &str) {
        let filter = Self::filter(default_level);
        let result = if json {
            let fmt = tracing_subscriber::fmt::layer()
                .json()
                .with_span_events(FmtSpan::NONE)
                .with_writer(std::io::stderr);
            tracing_subscriber::registry().with(filter).with(fmt).try_init()
        } else {
            let fmt = tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr);
            tracing_subscriber::registry().with(filter).with(fmt).try_init()
        };
        if let Err(e) = result {
            eprintln!("logging already initialised: {e}");
        }
    }

    fn filter(default_level: &str) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(default_level))
            .unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_twice_does_not_panic() {
        StructuredLogger::init(false, "debug");
        StructuredLogger::init(true, "not a level ===");
    }
}
