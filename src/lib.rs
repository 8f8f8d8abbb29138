//! Transaction Confirmation Latency Bench
//!
//! Compares two ways of getting a transaction confirmed:
//! - Traditional: `eth_sendRawTransaction`, then poll `eth_getTransactionReceipt`
//! - Synchronous: `eth_sendRawTransactionSync`, receipt in the response
//!
//! ## Architecture
//! - Submitter: signing, nonce handling and every RPC round-trip
//! - Bench: timed attempts, sequential series, latency statistics
//! - Keystore: explicit load/save of the demo wallet key
//! - Report: formatting and derived comparison values for the CLI

pub mod bench;
pub mod config;
pub mod error;
pub mod keystore;
pub mod logging;
pub mod report;
pub mod submitter;
pub mod types;

pub use bench::{BenchmarkRunner, BenchmarkSeries};
pub use config::Config;
pub use error::{BenchError, Result};
pub use keystore::{FileKeyStore, KeyStore, MemoryKeyStore};
pub use report::Comparison;
pub use submitter::{RpcSubmitter, TransactionSubmitter};
pub use types::{Confirmation, MethodIdentity, Progress, SignedPayload, SubmissionOutcome};
