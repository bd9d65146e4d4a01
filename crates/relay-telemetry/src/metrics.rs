//! Metric names and recording helpers for the relay pipeline

use std::time::Instant;

use opentelemetry::{
    KeyValue, global,
    metrics::{Counter, Histogram},
};

pub const RELAY_REQUEST_COUNT: &str = "relay.request.count";
pub const RELAY_REQUEST_DURATION: &str = "relay.request.duration";
pub const RELAY_DOWNLOAD_BYTES: &str = "relay.download.bytes";

/// Instruments recorded once per relayed request
#[derive(Clone)]
pub struct RelayMetrics {
    requests: Counter<u64>,
    duration: Histogram<f64>,
    downloaded: Histogram<u64>,
}

impl RelayMetrics {
    /// Create instruments on the globally installed meter provider
    ///
    /// Falls back to no-op instruments when telemetry export is disabled.
    pub fn new() -> Self {
        let meter = global::meter("transcription-relay");

        Self {
            requests: meter
                .u64_counter(RELAY_REQUEST_COUNT)
                .with_description("Relayed transcription requests by outcome")
                .build(),
            duration: meter
                .f64_histogram(RELAY_REQUEST_DURATION)
                .with_description("End-to-end relay duration")
                .with_unit("s")
                .build(),
            downloaded: meter
                .u64_histogram(RELAY_DOWNLOAD_BYTES)
                .with_description("Size of downloaded source media")
                .with_unit("By")
                .build(),
        }
    }

    /// Record a finished request
    pub fn record_request(&self, outcome: &'static str, start: Instant) {
        let attributes = [KeyValue::new("outcome", outcome)];
        self.requests.add(1, &attributes);
        self.duration.record(start.elapsed().as_secs_f64(), &attributes);
    }

    /// Record the size of a completed download
    pub fn record_download(&self, bytes: u64) {
        self.downloaded.record(bytes, &[]);
    }
}

impl Default for RelayMetrics {
    fn default() -> Self {
        Self::new()
    }
}
