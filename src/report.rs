//! Presentation helpers for the CLI
//!
//! Formatting and derived comparison values. Nothing here feeds back into
//! the runner.

use crate::bench::BenchmarkSeries;
use crate::error::BenchError;
use crate::types::SubmissionOutcome;
use ethers::types::{TxHash, U256};
use ethers::utils::format_ether;
use std::fmt::Write;

/// Below this balance the funding hint is shown
pub const LOW_BALANCE_WEI: u64 = 10_000_000_000_000_000; // 0.01

/// Milliseconds rendered as seconds with three decimals
pub fn format_secs(ms: f64) -> String {
    format!("{:.3}s", ms / 1000.0)
}

pub fn explorer_tx_url(explorer: &str, tx_hash: &TxHash) -> String {
    format!("{}/tx/{:?}", explorer.trim_end_matches('/'), tx_hash)
}

/// Human readable message for a failed run
pub fn describe_error(err: &BenchError, native_symbol: &str) -> String {
    let message = err.to_string();
    let lower = message.to_lowercase();
    if lower.contains("insufficient funds") || lower.contains("exceeds the balance") {
        return format!("Insufficient funds. Send {} to this wallet to run the demo.", native_symbol);
    }
    message
}

pub fn is_low_balance(balance: U256) -> bool {
    balance < U256::from(LOW_BALANCE_WEI)
}

pub fn format_balance(balance: U256, native_symbol: &str) -> String {
    format!("{} {}", format_ether(balance), native_symbol)
}

/// Traditional versus synchronous latency, both in milliseconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Comparison {
    pub traditional_ms: f64,
    pub sync_ms: f64,
}

impl Comparison {
    /// `None` unless both sides hold a real (positive) measurement
    pub fn between(traditional_ms: f64, sync_ms: f64) -> Option<Self> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        (valid(traditional_ms) && valid(sync_ms)).then_some(Self { traditional_ms, sync_ms })
    }

    pub fn of_outcomes(traditional: &SubmissionOutcome, sync: &SubmissionOutcome) -> Option<Self> {
        Self::between(traditional.network_time_ms, sync.network_time_ms)
    }

    /// Compares series averages
    pub fn of_series(traditional: &BenchmarkSeries, sync: &BenchmarkSeries) -> Option<Self> {
        Self::between(traditional.average(), sync.average())
    }

    pub fn time_saved_ms(&self) -> f64 {
        self.traditional_ms - self.sync_ms
    }

    pub fn speedup(&self) -> f64 {
        self.traditional_ms / self.sync_ms
    }

    pub fn sync_is_faster(&self) -> bool {
        self.traditional_ms > self.sync_ms
    }
}

pub fn render_outcome(outcome: &SubmissionOutcome, explorer: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", outcome.method);
    let _ = writeln!(
        out,
        "  {:<14} {}",
        outcome.method.calls(),
        format_secs(outcome.network_time_ms)
    );
    if let Some(hash) = &outcome.confirmation_reference {
        let _ = writeln!(out, "  view tx        {}", explorer_tx_url(explorer, hash));
    }
    out
}

pub fn render_comparison(comparison: &Comparison, label: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", label);
    let _ = writeln!(
        out,
        "  traditional: {}   sync: {}",
        format_secs(comparison.traditional_ms),
        format_secs(comparison.sync_ms)
    );
    if comparison.sync_is_faster() {
        let _ = writeln!(
            out,
            "  saved {}   speedup {:.2}x",
            format_secs(comparison.time_saved_ms()),
            comparison.speedup()
        );
    }
    out
}

pub fn render_series(series: &BenchmarkSeries) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", series.method());
    let _ = writeln!(out, "  avg {}", format_secs(series.average()));
    let _ = writeln!(out, "  min {}", format_secs(series.minimum()));
    let _ = writeln!(out, "  max {}", format_secs(series.maximum()));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MethodIdentity;
    use std::time::Duration;

    #[test]
    fn test_format_secs() {
        assert_eq!(format_secs(1234.5678), "1.235s");
        assert_eq!(format_secs(50.0), "0.050s");
    }

    #[test]
    fn test_explorer_url() {
        let hash = TxHash::from_low_u64_be(1);
        let url = explorer_tx_url("https://explorer.monad.xyz/", &hash);
        assert_eq!(
            url,
            "https://explorer.monad.xyz/tx/0x0000000000000000000000000000000000000000000000000000000000000001"
        );
    }

    #[test]
    fn test_insufficient_funds_message() {
        let err = BenchError::Submission("(code: -32000, message: Insufficient funds for gas * price + value)".into());
        assert_eq!(
            describe_error(&err, "MON"),
            "Insufficient funds. Send MON to this wallet to run the demo."
        );

        let err = BenchError::Submission("gas required exceeds the balance".into());
        assert!(describe_error(&err, "MON").starts_with("Insufficient funds"));

        let err = BenchError::Timeout(Duration::from_secs(60));
        assert_eq!(describe_error(&err, "MON"), "no confirmation within 60s");
    }

    #[test]
    fn test_comparison() {
        let comparison = Comparison::between(500.0, 50.0).unwrap();
        assert_eq!(comparison.speedup(), 10.0);
        assert_eq!(comparison.time_saved_ms(), 450.0);
        assert!(comparison.sync_is_faster());

        let rendered = render_comparison(&comparison, "comparison");
        assert!(rendered.contains("saved 0.450s"));
        assert!(rendered.contains("speedup 10.00x"));
    }

    #[test]
    fn test_zero_sync_is_no_result() {
        assert!(Comparison::between(500.0, 0.0).is_none());
        assert!(Comparison::between(0.0, 50.0).is_none());
    }

    #[test]
    fn test_slower_sync_hides_savings() {
        let comparison = Comparison::between(40.0, 60.0).unwrap();
        let rendered = render_comparison(&comparison, "comparison");
        assert!(!rendered.contains("speedup"));
    }

    #[test]
    fn test_render_outcome() {
        let outcome = SubmissionOutcome {
            method: MethodIdentity::Synchronous,
            network_time_ms: 812.0,
            confirmation_reference: Some(TxHash::from_low_u64_be(9)),
        };
        let rendered = render_outcome(&outcome, "https://explorer.monad.xyz");
        assert!(rendered.contains("sendSync"));
        assert!(rendered.contains("0.812s"));
        assert!(rendered.contains("/tx/0x"));
    }

    #[test]
    fn test_low_balance() {
        assert!(is_low_balance(U256::from(LOW_BALANCE_WEI - 1)));
        assert!(!is_low_balance(U256::exp10(17)));
        assert_eq!(format_balance(U256::exp10(17), "MON"), "0.100000000000000000 MON");
    }
}
