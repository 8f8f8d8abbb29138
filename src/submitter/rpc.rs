// JSON-RPC transaction submitter
// Signs locally, sends over HTTP, polls or waits synchronously for receipts

use super::TransactionSubmitter;
use crate::config::{NetworkConfig, SubmissionConfig};
use crate::error::{BenchError, Result};
use crate::types::{Confirmation, PendingReference, SignedPayload};
use async_trait::async_trait;
use ethers::{
    providers::{Http, JsonRpcClient, Middleware, Provider, ProviderError, RpcError},
    signers::{LocalWallet, Signer},
    types::{
        transaction::eip2718::TypedTransaction, Address, BlockNumber, Eip1559TransactionRequest,
        TransactionReceipt, U256,
    },
};
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

/// JSON-RPC error code used by `eth_sendRawTransactionSync` when the node
/// gives up waiting for the receipt
pub const SYNC_TIMEOUT_CODE: i64 = 4;

const SEND_RAW_TRANSACTION_SYNC: &str = "eth_sendRawTransactionSync";

/// Submitter backed by a single JSON-RPC endpoint and a local key
pub struct RpcSubmitter<P = Http> {
    provider: Provider<P>,
    wallet: LocalWallet,
    config: SubmissionConfig,
}

impl RpcSubmitter<Http> {
    /// Connect and verify the endpoint serves the configured chain
    pub async fn connect(
        network: &NetworkConfig,
        config: SubmissionConfig,
        wallet: LocalWallet,
    ) -> Result<Self> {
        let provider = Provider::<Http>::try_from(network.rpc_url.as_str()).map_err(|e| {
            BenchError::InvalidArgument(format!("invalid rpc url {}: {}", network.rpc_url, e))
        })?;

        let chain_id = provider
            .get_chainid()
            .await
            .map_err(BenchError::submission)?
            .as_u64();

        if chain_id != network.chain_id {
            return Err(BenchError::InvalidArgument(format!(
                "endpoint {} serves chain {} but {} ({}) is configured",
                network.rpc_url, chain_id, network.name, network.chain_id
            )));
        }

        info!(
            rpc_url = %network.rpc_url,
            chain_id,
            address = ?wallet.address(),
            "Connected submitter"
        );

        Ok(Self::new(provider, wallet.with_chain_id(chain_id), config))
    }
}

impl<P: JsonRpcClient> RpcSubmitter<P> {
    /// Wrap an existing provider. The wallet's chain id is used as is.
    pub fn new(provider: Provider<P>, wallet: LocalWallet, config: SubmissionConfig) -> Self {
        Self {
            provider,
            wallet,
            config,
        }
    }

    pub fn address(&self) -> Address {
        self.wallet.address()
    }

    /// Account balance in wei
    pub async fn balance(&self) -> Result<U256> {
        self.provider
            .get_balance(self.wallet.address(), None)
            .await
            .map_err(BenchError::submission)
    }

    /// Limit the node applies to `eth_sendRawTransactionSync`
    fn sync_limit(&self) -> Duration {
        self.config
            .sync_timeout_ms
            .map(Duration::from_millis)
            .unwrap_or_else(|| self.config.confirmation_timeout())
    }
}

#[async_trait]
impl<P: JsonRpcClient + 'static> TransactionSubmitter for RpcSubmitter<P> {
    async fn prepare_and_sign(&self) -> Result<SignedPayload> {
        let address = self.wallet.address();

        let nonce = self
            .provider
            .get_transaction_count(address, Some(BlockNumber::Pending.into()))
            .await
            .map_err(BenchError::submission)?;

        let (max_fee, priority_fee) = self
            .provider
            .estimate_eip1559_fees(None)
            .await
            .map_err(BenchError::submission)?;

        let fees = FeeParams {
            max_fee_per_gas: max_fee,
            max_priority_fee_per_gas: priority_fee,
            gas_limit: self.config.gas_limit,
        };

        sign_self_transfer(&self.wallet, nonce, &fees)
    }

    async fn dispatch_traditional(&self, payload: &SignedPayload) -> Result<PendingReference> {
        let limit = self.config.confirmation_timeout();
        let pending = timeout(limit, self.provider.send_raw_transaction(payload.raw.clone()))
            .await
            .map_err(|_| BenchError::Timeout(limit))?
            .map_err(BenchError::submission)?;

        let tx_hash = pending.tx_hash();
        debug!(?tx_hash, nonce = payload.nonce, "Transaction sent");
        Ok(tx_hash)
    }

    async fn await_confirmation(&self, reference: &PendingReference) -> Result<Confirmation> {
        let limit = self.config.confirmation_timeout();
        let interval = self.config.poll_interval();
        let mut polls = 0u32;

        let receipt = timeout(limit, async {
            loop {
                polls += 1;
                if let Some(receipt) = self
                    .provider
                    .get_transaction_receipt(*reference)
                    .await
                    .map_err(BenchError::submission)?
                {
                    return Ok::<_, BenchError>(receipt);
                }
                sleep(interval).await;
            }
        })
        .await
        .map_err(|_| BenchError::Timeout(limit))??;

        debug!(tx_hash = ?reference, polls, "Receipt observed");
        Ok(to_confirmation(&receipt))
    }

    async fn dispatch_synchronous(&self, payload: &SignedPayload) -> Result<Confirmation> {
        let node_limit = self.sync_limit();
        // never give up before the node does
        let limit = node_limit.max(self.config.confirmation_timeout());
        let params = match self.config.sync_timeout_ms {
            Some(ms) => serde_json::json!([payload.raw, ms]),
            None => serde_json::json!([payload.raw]),
        };

        let call = self
            .provider
            .request::<_, Option<TransactionReceipt>>(SEND_RAW_TRANSACTION_SYNC, params);

        let receipt = timeout(limit, call)
            .await
            .map_err(|_| BenchError::Timeout(limit))?
            .map_err(|e| classify_sync_error(e, node_limit))?
            .ok_or(BenchError::Timeout(node_limit))?;

        debug!(tx_hash = ?receipt.transaction_hash, nonce = payload.nonce, "Receipt returned with send");
        Ok(to_confirmation(&receipt))
    }
}

/// Fee and gas settings for one transaction
#[derive(Debug, Clone)]
pub struct FeeParams {
    pub max_fee_per_gas: U256,
    pub max_priority_fee_per_gas: U256,
    pub gas_limit: u64,
}

/// Zero-value EIP-1559 transfer from the wallet to itself
pub fn sign_self_transfer(wallet: &LocalWallet, nonce: U256, fees: &FeeParams) -> Result<SignedPayload> {
    let address = wallet.address();

    let request = Eip1559TransactionRequest::new()
        .from(address)
        .to(address)
        .value(U256::zero())
        .nonce(nonce)
        .gas(fees.gas_limit)
        .max_fee_per_gas(fees.max_fee_per_gas)
        .max_priority_fee_per_gas(fees.max_priority_fee_per_gas)
        .chain_id(wallet.chain_id());

    let tx: TypedTransaction = request.into();
    let signature = wallet
        .sign_transaction_sync(&tx)
        .map_err(|e| BenchError::Submission(format!("signing failed: {}", e)))?;

    Ok(SignedPayload {
        raw: tx.rlp_signed(&signature),
        tx_hash: tx.hash(&signature),
        nonce: nonce.as_u64(),
    })
}

fn to_confirmation(receipt: &TransactionReceipt) -> Confirmation {
    let succeeded = receipt.status.map(|status| status.as_u64() == 1);
    if succeeded == Some(false) {
        warn!(tx_hash = ?receipt.transaction_hash, "Transaction reverted");
    }

    Confirmation {
        tx_hash: receipt.transaction_hash,
        block_number: receipt.block_number.map(|n| n.as_u64()),
        succeeded,
    }
}

fn classify_sync_error(err: ProviderError, limit: Duration) -> BenchError {
    match err.as_error_response() {
        Some(response) if response.code == SYNC_TIMEOUT_CODE => BenchError::Timeout(limit),
        _ => BenchError::submission(err),
    }
}
