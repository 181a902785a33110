//! Metrics collection for observability
//!
//! Prometheus metrics for issuance and redemption.
//!
//! # Metrics
//!
//! - `gatepass_credentials_issued_total` - Credentials successfully issued
//! - `gatepass_issuance_rejected_total` - Issuance attempts rejected
//! - `gatepass_scans_total` - Redemption attempts, all outcomes
//! - `gatepass_scans_valid_total` / `_invalid_total` / `_expired_total` /
//!   `_duplicate_total` - Redemption attempts by outcome
//! - `gatepass_validation_duration_seconds` - Validation latency

use prometheus::{Histogram, HistogramOpts, IntCounter, Registry};
use std::sync::Arc;

/// Metrics collector
#[derive(Debug, Clone)]
pub struct Metrics {
    /// Credentials successfully issued
    pub credentials_issued_total: IntCounter,

    /// Issuance attempts rejected (full, deadline, duplicate, failure)
    pub issuance_rejected_total: IntCounter,

    /// Redemption attempts, all outcomes
    pub scans_total: IntCounter,

    /// Accepted redemptions
    pub scans_valid_total: IntCounter,

    /// Rejected: invalid payloads/signatures/lookups
    pub scans_invalid_total: IntCounter,

    /// Rejected: expired credentials
    pub scans_expired_total: IntCounter,

    /// Rejected: duplicate check-ins
    pub scans_duplicate_total: IntCounter,

    /// Validation latency histogram
    pub validation_duration: Histogram,

    /// Prometheus registry
    pub registry: Arc<Registry>,
}

impl Metrics {
    /// Create new metrics collector with its own registry
    pub fn new() -> prometheus::Result<Self> {
        let registry = Arc::new(Registry::new());

        let credentials_issued_total = IntCounter::new(
            "gatepass_credentials_issued_total",
            "Credentials successfully issued",
        )?;
        registry.register(Box::new(credentials_issued_total.clone()))?;

        let issuance_rejected_total = IntCounter::new(
            "gatepass_issuance_rejected_total",
            "Issuance attempts rejected",
        )?;
        registry.register(Box::new(issuance_rejected_total.clone()))?;

        let scans_total =
            IntCounter::new("gatepass_scans_total", "Redemption attempts, all outcomes")?;
        registry.register(Box::new(scans_total.clone()))?;

        let scans_valid_total =
            IntCounter::new("gatepass_scans_valid_total", "Accepted redemptions")?;
        registry.register(Box::new(scans_valid_total.clone()))?;

        let scans_invalid_total = IntCounter::new(
            "gatepass_scans_invalid_total",
            "Rejected redemptions: invalid",
        )?;
        registry.register(Box::new(scans_invalid_total.clone()))?;

        let scans_expired_total = IntCounter::new(
            "gatepass_scans_expired_total",
            "Rejected redemptions: expired",
        )?;
        registry.register(Box::new(scans_expired_total.clone()))?;

        let scans_duplicate_total = IntCounter::new(
            "gatepass_scans_duplicate_total",
            "Rejected redemptions: duplicate",
        )?;
        registry.register(Box::new(scans_duplicate_total.clone()))?;

        let validation_duration = Histogram::with_opts(
            HistogramOpts::new(
                "gatepass_validation_duration_seconds",
                "Validation latency",
            )
            .buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1]),
        )?;
        registry.register(Box::new(validation_duration.clone()))?;

        Ok(Self {
            credentials_issued_total,
            issuance_rejected_total,
            scans_total,
            scans_valid_total,
            scans_invalid_total,
            scans_expired_total,
            scans_duplicate_total,
            validation_duration,
            registry,
        })
    }
}
