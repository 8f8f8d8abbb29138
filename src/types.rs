//! Core types shared by the runner, the submitters and the CLI

use ethers::types::{Bytes, TxHash};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which submission strategy an attempt uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MethodIdentity {
    /// `eth_sendRawTransaction`, then poll for the receipt
    Traditional,
    /// `eth_sendRawTransactionSync`, receipt in the response
    #[serde(rename = "sync")]
    Synchronous,
}

impl MethodIdentity {
    pub fn as_str(&self) -> &'static str {
        match self {
            MethodIdentity::Traditional => "traditional",
            MethodIdentity::Synchronous => "sync",
        }
    }

    /// Short description of the network calls made
    pub fn calls(&self) -> &'static str {
        match self {
            MethodIdentity::Traditional => "send + poll",
            MethodIdentity::Synchronous => "sendSync",
        }
    }
}

impl fmt::Display for MethodIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MethodIdentity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "traditional" | "trad" => Ok(MethodIdentity::Traditional),
            "sync" | "synchronous" => Ok(MethodIdentity::Synchronous),
            other => Err(format!("unknown method `{other}` (expected traditional or sync)")),
        }
    }
}

/// A signed transaction, ready to dispatch
#[derive(Debug, Clone)]
pub struct SignedPayload {
    pub raw: Bytes,
    pub tx_hash: TxHash,
    pub nonce: u64,
}

/// Hash returned by a plain dispatch, used to poll for the receipt
pub type PendingReference = TxHash;

/// Receipt data the benchmark cares about
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    pub tx_hash: TxHash,
    pub block_number: Option<u64>,
    /// `None` when the node did not report a status
    pub succeeded: Option<bool>,
}

/// Result of one timed attempt
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionOutcome {
    pub method: MethodIdentity,
    /// Network-bound portion only, signing excluded
    pub network_time_ms: f64,
    pub confirmation_reference: Option<TxHash>,
}

/// Progress notification emitted after each successful attempt of a series
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
    pub method: MethodIdentity,
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}/{}", self.method, self.completed, self.total)
    }
}
