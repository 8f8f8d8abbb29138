//! Transaction submission capability
//!
//! The runner only ever talks to a [`TransactionSubmitter`]. The submitter owns
//! key material, the account nonce, and every RPC round-trip including the
//! receipt polling loop and its timeout.

pub mod rpc;

#[cfg(test)]
pub(crate) mod scripted;

pub use rpc::RpcSubmitter;

use crate::error::Result;
use crate::types::{Confirmation, PendingReference, SignedPayload};
use async_trait::async_trait;

#[async_trait]
pub trait TransactionSubmitter: Send + Sync {
    /// Build and sign the next transaction. Never timed.
    async fn prepare_and_sign(&self) -> Result<SignedPayload>;

    /// Send the payload and return without waiting for inclusion
    async fn dispatch_traditional(&self, payload: &SignedPayload) -> Result<PendingReference>;

    /// Poll until a receipt for `reference` is observed
    async fn await_confirmation(&self, reference: &PendingReference) -> Result<Confirmation>;

    /// Send the payload and wait for the receipt in a single call
    async fn dispatch_synchronous(&self, payload: &SignedPayload) -> Result<Confirmation>;
}
