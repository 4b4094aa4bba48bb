use parking_lot::Mutex;
use serde::Serialize;

use crate::domain::error::ErrorCode;

/// 保持するレイテンシ記録の上限
const MAX_LATENCY_RECORDS: usize = 200;

/// ローカルメトリクス収集器
pub struct Metrics {
    counters: Mutex<MetricsCounters>,
    latencies: Mutex<Vec<LatencyRecord>>,
}

#[derive(Debug, Default)]
struct MetricsCounters {
    logins: u64,
    rewrites_requested: u64,
    rewrites_succeeded: u64,
    rewrites_failed: u64,
    images_uploaded: u64,
    images_inserted: u64,
    errors_validation: u64,
    errors_auth: u64,
    errors_network: u64,
    errors_server: u64,
    errors_internal: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LatencyRecord {
    pub phase: String,
    pub duration_ms: u64,
    pub timestamp: String,
}

/// メトリクスサマリー
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSummary {
    pub logins: u64,
    pub rewrites_requested: u64,
    pub rewrites_succeeded: u64,
    pub rewrites_failed: u64,
    pub images_uploaded: u64,
    pub images_inserted: u64,
    pub error_counts: ErrorCounts,
    pub avg_latency_ms: AvgLatency,
    pub recent_latencies: Vec<LatencyRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorCounts {
    pub validation: u64,
    pub auth: u64,
    pub network: u64,
    pub server: u64,
    pub internal: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AvgLatency {
    pub rewrite: Option<f64>,
    pub upload: Option<f64>,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            counters: Mutex::new(MetricsCounters::default()),
            latencies: Mutex::new(Vec::new()),
        }
    }

    pub fn inc_logins(&self) {
        self.counters.lock().logins += 1;
    }

    pub fn inc_rewrites_requested(&self) {
        self.counters.lock().rewrites_requested += 1;
    }

    pub fn inc_rewrites_succeeded(&self) {
        self.counters.lock().rewrites_succeeded += 1;
    }

    pub fn inc_rewrites_failed(&self) {
        self.counters.lock().rewrites_failed += 1;
    }

    pub fn inc_images_uploaded(&self) {
        self.counters.lock().images_uploaded += 1;
    }

    pub fn inc_images_inserted(&self) {
        self.counters.lock().images_inserted += 1;
    }

    pub fn inc_error(&self, code: ErrorCode) {
        let mut c = self.counters.lock();
        match code {
            ErrorCode::Validation | ErrorCode::Locked | ErrorCode::InvalidState => {
                c.errors_validation += 1
            }
            ErrorCode::Unauthorized | ErrorCode::Expired => c.errors_auth += 1,
            ErrorCode::Network | ErrorCode::Timeout => c.errors_network += 1,
            ErrorCode::Server | ErrorCode::Rewrite => c.errors_server += 1,
            ErrorCode::Storage | ErrorCode::Output | ErrorCode::Internal => {
                c.errors_internal += 1
            }
        }
    }

    pub fn record_latency(&self, phase: &str, duration_ms: u64) {
        let record = LatencyRecord {
            phase: phase.to_string(),
            duration_ms,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };
        let mut latencies = self.latencies.lock();
        latencies.push(record);
        if latencies.len() > MAX_LATENCY_RECORDS {
            let overflow = latencies.len() - MAX_LATENCY_RECORDS;
            latencies.drain(..overflow);
        }
    }

    pub fn summary(&self) -> MetricsSummary {
        let c = self.counters.lock();
        let latencies = self.latencies.lock();

        MetricsSummary {
            logins: c.logins,
            rewrites_requested: c.rewrites_requested,
            rewrites_succeeded: c.rewrites_succeeded,
            rewrites_failed: c.rewrites_failed,
            images_uploaded: c.images_uploaded,
            images_inserted: c.images_inserted,
            error_counts: ErrorCounts {
                validation: c.errors_validation,
                auth: c.errors_auth,
                network: c.errors_network,
                server: c.errors_server,
                internal: c.errors_internal,
            },
            avg_latency_ms: AvgLatency {
                rewrite: avg_for_phase(&latencies, "rewrite"),
                upload: avg_for_phase(&latencies, "upload"),
            },
            recent_latencies: latencies.iter().rev().take(20).cloned().collect(),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

fn avg_for_phase(records: &[LatencyRecord], phase: &str) -> Option<f64> {
    let values: Vec<u64> = records
        .iter()
        .filter(|r| r.phase == phase)
        .map(|r| r.duration_ms)
        .collect();
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<u64>() as f64 / values.len() as f64)
    }
}
