//! Scripted submitter for runner tests
//!
//! Each call to a network operation advances the paused tokio clock by the
//! scripted latency, so measured network times are exact.

use super::TransactionSubmitter;
use crate::error::{BenchError, Result};
use crate::types::{Confirmation, PendingReference, SignedPayload};
use async_trait::async_trait;
use ethers::types::{Bytes, H256};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// What one network attempt should do
#[derive(Debug, Clone)]
pub enum Step {
    /// Succeed after this many milliseconds
    Ok(u64),
    /// Dispatch fails after this many milliseconds
    RejectDispatch(u64, &'static str),
    /// Dispatch succeeds, confirmation times out after this many milliseconds
    TimeoutConfirmation(u64),
}

#[derive(Default)]
pub struct ScriptedSubmitter {
    steps: Mutex<VecDeque<Step>>,
    /// Time added by `prepare_and_sign`, which must never show up in samples
    pub signing_ms: u64,
    nonce: AtomicU64,
    pub prepared: AtomicUsize,
    pub dispatched: AtomicUsize,
    pub confirmations_awaited: AtomicUsize,
    pub sync_dispatched: AtomicUsize,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    pending: Mutex<Option<Step>>,
}

impl ScriptedSubmitter {
    pub fn new(steps: impl IntoIterator<Item = Step>) -> Self {
        Self {
            steps: Mutex::new(steps.into_iter().collect()),
            ..Default::default()
        }
    }

    pub fn with_latencies(latencies: &[u64]) -> Self {
        Self::new(latencies.iter().map(|ms| Step::Ok(*ms)))
    }

    pub fn with_signing_ms(mut self, ms: u64) -> Self {
        self.signing_ms = ms;
        self
    }

    pub fn calls(&self) -> usize {
        self.dispatched.load(Ordering::SeqCst) + self.sync_dispatched.load(Ordering::SeqCst)
    }

    fn next_step(&self) -> Step {
        self.steps
            .lock()
            .unwrap()
            .pop_front()
            .expect("submitter called more times than scripted")
    }

    fn enter(&self) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
    }

    fn exit(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }

    fn hash_for(nonce: u64) -> H256 {
        H256::from_low_u64_be(nonce + 1)
    }
}

async fn elapse(ms: u64) {
    tokio::time::advance(Duration::from_millis(ms)).await;
}

#[async_trait]
impl TransactionSubmitter for ScriptedSubmitter {
    async fn prepare_and_sign(&self) -> Result<SignedPayload> {
        self.prepared.fetch_add(1, Ordering::SeqCst);
        elapse(self.signing_ms).await;
        let nonce = self.nonce.fetch_add(1, Ordering::SeqCst);
        Ok(SignedPayload {
            raw: Bytes::from(nonce.to_be_bytes().to_vec()),
            tx_hash: Self::hash_for(nonce),
            nonce,
        })
    }

    async fn dispatch_traditional(&self, payload: &SignedPayload) -> Result<PendingReference> {
        self.dispatched.fetch_add(1, Ordering::SeqCst);
        self.enter();
        let step = self.next_step();
        let result = match &step {
            Step::RejectDispatch(ms, reason) => {
                elapse(*ms).await;
                Err(BenchError::Submission(reason.to_string()))
            }
            _ => Ok(payload.tx_hash),
        };
        *self.pending.lock().unwrap() = Some(step);
        if result.is_err() {
            self.exit();
        }
        result
    }

    async fn await_confirmation(&self, reference: &PendingReference) -> Result<Confirmation> {
        self.confirmations_awaited.fetch_add(1, Ordering::SeqCst);
        let step = self.pending.lock().unwrap().take().expect("confirmation without dispatch");
        let result = match step {
            Step::Ok(ms) => {
                elapse(ms).await;
                Ok(Confirmation { tx_hash: *reference, block_number: Some(1), succeeded: Some(true) })
            }
            Step::TimeoutConfirmation(ms) => {
                elapse(ms).await;
                Err(BenchError::Timeout(Duration::from_millis(ms)))
            }
            Step::RejectDispatch(..) => unreachable!("rejected dispatch has no confirmation"),
        };
        self.exit();
        result
    }

    async fn dispatch_synchronous(&self, payload: &SignedPayload) -> Result<Confirmation> {
        self.sync_dispatched.fetch_add(1, Ordering::SeqCst);
        self.enter();
        let result = match self.next_step() {
            Step::Ok(ms) => {
                elapse(ms).await;
                Ok(Confirmation { tx_hash: payload.tx_hash, block_number: Some(1), succeeded: Some(true) })
            }
            Step::RejectDispatch(ms, reason) => {
                elapse(ms).await;
                Err(BenchError::Submission(reason.to_string()))
            }
            Step::TimeoutConfirmation(ms) => {
                elapse(ms).await;
                Err(BenchError::Timeout(Duration::from_millis(ms)))
            }
        };
        self.exit();
        result
    }
}
