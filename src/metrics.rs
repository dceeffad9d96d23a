//! Observability metrics: query latency and operation counters.

use std::time::Duration;

/// Collects runtime metrics for the text-matching service.
#[derive(Debug)]
pub struct MetricsCollector {
    query_latencies_us: Vec<f64>,
    total_queries: u64,
    total_adds: u64,
    total_deletes: u64,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            query_latencies_us: Vec::new(),
            total_queries: 0,
            total_adds: 0,
            total_deletes: 0,
        }
    }

    /// Record a query with its duration.
    pub fn record_query(&mut self, duration: Duration) {
        self.total_queries += 1;
        self.query_latencies_us.push(duration.as_micros() as f64);
    }

    /// Record an add operation.
    pub fn record_add(&mut self) {
        self.total_adds += 1;
    }

    /// Record a delete operation.
    pub fn record_delete(&mut self) {
        self.total_deletes += 1;
    }

    pub fn total_queries(&self) -> u64 {
        self.total_queries
    }

    pub fn total_adds(&self) -> u64 {
        self.total_adds
    }

    pub fn total_deletes(&self) -> u64 {
        self.total_deletes
    }

    /// Average query latency in microseconds.
    pub fn avg_query_latency_us(&self) -> f64 {
        if self.query_latencies_us.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.query_latencies_us.iter().sum();
        sum / self.query_latencies_us.len() as f64
    }

    /// Get a percentile of query latency (e.g., 50.0, 95.0, 99.0).
    pub fn percentile_query_latency_us(&self, percentile: f64) -> f64 {
        if self.query_latencies_us.is_empty() {
            return 0.0;
        }

        let mut sorted = self.query_latencies_us.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let index = ((percentile / 100.0) * (sorted.len() - 1) as f64).round() as usize;
        sorted[index.min(sorted.len() - 1)]
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}
