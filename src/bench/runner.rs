//! Timed execution of submission methods
//!
//! Only the network-bound portion of an attempt is measured: the payload is
//! prepared and signed before the clock starts. Attempts run strictly one after
//! another since every attempt consumes the account's next nonce.

use super::stats::BenchmarkSeries;
use crate::error::{BenchError, Result};
use crate::submitter::TransactionSubmitter;
use crate::types::{MethodIdentity, Progress, SignedPayload, SubmissionOutcome};
use ethers::types::TxHash;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Runs single attempts, comparisons and series against a submitter.
///
/// Every attempt submits one real, state-changing transaction. Nothing here
/// retries: a failed attempt surfaces its original error to the caller.
#[derive(Debug, Clone, Default)]
pub struct BenchmarkRunner {
    cancel: CancellationToken,
}

impl BenchmarkRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop starting new attempts once `cancel` fires. An attempt already in
    /// flight is allowed to settle.
    pub fn with_cancellation(cancel: CancellationToken) -> Self {
        Self { cancel }
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Submit one transaction with `method` and time the network calls
    pub async fn run_single<S>(&self, method: MethodIdentity, submitter: &S) -> Result<SubmissionOutcome>
    where
        S: TransactionSubmitter + ?Sized,
    {
        if self.cancel.is_cancelled() {
            return Err(BenchError::Cancelled);
        }

        let payload = submitter.prepare_and_sign().await?;

        let start = Instant::now();
        let result = submit(method, submitter, &payload).await;
        let network_time_ms = start.elapsed().as_secs_f64() * 1000.0;

        metrics::counter!("txsync_attempts_total", "method" => method.as_str()).increment(1);

        match result {
            Ok(reference) => {
                metrics::histogram!("txsync_network_time_ms", "method" => method.as_str())
                    .record(network_time_ms);
                debug!(%method, nonce = payload.nonce, tx_hash = ?reference, network_time_ms, "Attempt confirmed");

                Ok(SubmissionOutcome {
                    method,
                    network_time_ms,
                    confirmation_reference: Some(reference),
                })
            }
            Err(e) => {
                metrics::counter!("txsync_attempt_failures_total", "method" => method.as_str())
                    .increment(1);
                warn!(%method, nonce = payload.nonce, network_time_ms, error = %e, "Attempt failed");
                Err(e)
            }
        }
    }

    /// One traditional attempt followed by one synchronous attempt. The
    /// synchronous submitter is never touched if the first attempt fails.
    pub async fn run_comparison<T, S>(
        &self,
        traditional: &T,
        sync: &S,
    ) -> Result<(SubmissionOutcome, SubmissionOutcome)>
    where
        T: TransactionSubmitter + ?Sized,
        S: TransactionSubmitter + ?Sized,
    {
        let first = self.run_single(MethodIdentity::Traditional, traditional).await?;
        let second = self.run_single(MethodIdentity::Synchronous, sync).await?;
        Ok((first, second))
    }

    pub async fn run_series<S>(
        &self,
        method: MethodIdentity,
        iterations: usize,
        submitter: &S,
    ) -> Result<BenchmarkSeries>
    where
        S: TransactionSubmitter + ?Sized,
    {
        self.run_series_with_progress(method, iterations, submitter, |_| {}).await
    }

    /// Run `iterations` sequential attempts and summarize them.
    ///
    /// `on_progress` fires after each successful attempt with the 1-based count.
    /// Any failure aborts the series and discards the samples collected so far.
    pub async fn run_series_with_progress<S, F>(
        &self,
        method: MethodIdentity,
        iterations: usize,
        submitter: &S,
        mut on_progress: F,
    ) -> Result<BenchmarkSeries>
    where
        S: TransactionSubmitter + ?Sized,
        F: FnMut(Progress),
    {
        if iterations == 0 {
            return Err(BenchError::InvalidArgument(
                "iterations must be a positive integer".to_string(),
            ));
        }

        info!(%method, iterations, "Starting series");

        let mut samples = Vec::with_capacity(iterations);
        for attempt in 1..=iterations {
            let outcome = match self.run_single(method, submitter).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!(%method, attempt, iterations, kind = e.kind(), "Series aborted");
                    return Err(e);
                }
            };

            samples.push(outcome.network_time_ms);
            on_progress(Progress {
                completed: attempt,
                total: iterations,
                method,
            });
        }

        let series = BenchmarkSeries::from_samples(method, samples)?;
        info!(
            %method,
            avg_ms = series.average(),
            min_ms = series.minimum(),
            max_ms = series.maximum(),
            "Series complete"
        );
        Ok(series)
    }

    /// Traditional series followed by a synchronous series of the same length.
    ///
    /// Each finished series is handed to `on_series` before the next one
    /// starts, so a failure in the synchronous half still leaves the caller
    /// holding the traditional results.
    pub async fn run_benchmark<S, F, G>(
        &self,
        iterations: usize,
        submitter: &S,
        mut on_progress: F,
        mut on_series: G,
    ) -> Result<(BenchmarkSeries, BenchmarkSeries)>
    where
        S: TransactionSubmitter + ?Sized,
        F: FnMut(Progress),
        G: FnMut(&BenchmarkSeries),
    {
        let traditional = self
            .run_series_with_progress(MethodIdentity::Traditional, iterations, submitter, &mut on_progress)
            .await?;
        on_series(&traditional);

        let sync = self
            .run_series_with_progress(MethodIdentity::Synchronous, iterations, submitter, &mut on_progress)
            .await?;
        on_series(&sync);

        Ok((traditional, sync))
    }
}

async fn submit<S>(method: MethodIdentity, submitter: &S, payload: &SignedPayload) -> Result<TxHash>
where
    S: TransactionSubmitter + ?Sized,
{
    match method {
        MethodIdentity::Traditional => {
            let reference = submitter.dispatch_traditional(payload).await?;
            submitter.await_confirmation(&reference).await?;
            Ok(reference)
        }
        MethodIdentity::Synchronous => {
            let confirmation = submitter.dispatch_synchronous(payload).await?;
            Ok(confirmation.tx_hash)
        }
    }
}
