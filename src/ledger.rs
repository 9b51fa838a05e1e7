//! On-chain anchoring of repository content fingerprints.
//!
//! Builds, signs and submits a `registerRepository(string, bytes32, address)`
//! call on the registry contract from a server-held key. Submission is
//! fire-and-forget: the transaction hash is returned as soon as the node
//! accepts it, and no receipt is awaited. There is no automatic retry and no
//! cancellation; callers re-invoke explicitly on `LedgerUnavailable`.

use alloy::network::EthereumWallet;
use alloy::primitives::{Address, B256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::signers::local::PrivateKeySigner;
use alloy::sol;
use alloy::transports::RpcError;
use thiserror::Error;

use crate::config::LedgerConfig;

sol! {
    #[sol(rpc)]
    contract RepositoryRegistry {
        function registerRepository(string repoId, bytes32 hash, address owner) external;
    }
}

#[derive(Debug, Error)]
pub enum LedgerError {
    /// Bad contract address, key, or RPC URL at startup. Fatal for the
    /// anchoring feature only — the rest of the service runs without it.
    #[error("registry contract unavailable: {0}")]
    ContractUnavailable(String),
    /// Node unreachable. Retryable by the caller.
    #[error("ledger node unreachable: {0}")]
    LedgerUnavailable(String),
    /// The node accepted the connection but refused the transaction.
    #[error("transaction rejected: {0}")]
    TransactionRejected(String),
    #[error("invalid anchor input: {0}")]
    InvalidInput(String),
}

pub struct RegistryClient {
    contract_address: Address,
    provider: DynProvider,
}

impl RegistryClient {
    pub fn new(config: &LedgerConfig) -> Result<Self, LedgerError> {
        let contract_address: Address = config
            .contract_address
            .parse()
            .map_err(|e| LedgerError::ContractUnavailable(format!("contract address: {}", e)))?;

        let signer: PrivateKeySigner = config
            .private_key
            .parse()
            .map_err(|e| LedgerError::ContractUnavailable(format!("server key: {}", e)))?;
        let wallet = EthereumWallet::from(signer);

        let rpc_url = config
            .rpc_url
            .parse()
            .map_err(|e| LedgerError::ContractUnavailable(format!("rpc url: {}", e)))?;

        let provider = ProviderBuilder::new()
            .wallet(wallet)
            .connect_http(rpc_url)
            .erased();

        Ok(Self {
            contract_address,
            provider,
        })
    }

    /// Submit the registration transaction and return its hash once the node
    /// accepts it. Confirmation is not awaited.
    pub async fn register(
        &self,
        repo_id: &str,
        hash_hex: &str,
        owner_address: &str,
    ) -> Result<String, LedgerError> {
        let hash = parse_hash(hash_hex)?;
        let owner: Address = owner_address
            .parse()
            .map_err(|e| LedgerError::InvalidInput(format!("owner address: {}", e)))?;

        let contract = RepositoryRegistry::new(self.contract_address, &self.provider);
        let pending = contract
            .registerRepository(repo_id.to_string(), hash, owner)
            .send()
            .await
            .map_err(classify_send_error)?;

        let tx_hash = pending.tx_hash().to_string();
        tracing::info!("anchored repo {} with tx {}", repo_id, tx_hash);
        Ok(tx_hash)
    }
}

fn parse_hash(hash_hex: &str) -> Result<B256, LedgerError> {
    let raw = hash_hex.strip_prefix("0x").unwrap_or(hash_hex);
    let bytes = hex::decode(raw)
        .map_err(|_| LedgerError::InvalidInput("hash is not hex".to_string()))?;
    if bytes.len() != 32 {
        return Err(LedgerError::InvalidInput(format!(
            "hash must be 32 bytes, got {}",
            bytes.len()
        )));
    }
    Ok(B256::from_slice(&bytes))
}

fn classify_send_error(e: alloy::contract::Error) -> LedgerError {
    match &e {
        alloy::contract::Error::TransportError(RpcError::Transport(kind)) => {
            LedgerError::LedgerUnavailable(kind.to_string())
        }
        _ => LedgerError::TransactionRejected(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> LedgerConfig {
        LedgerConfig {
            enabled: true,
            rpc_url: "http://localhost:8545".to_string(),
            contract_address: "0x5FbDB2315678afecb367f032d93F642f64180aa3".to_string(),
            // Well-known anvil/hardhat dev key #0
            private_key: "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80"
                .to_string(),
        }
    }

    #[test]
    fn test_client_creation() {
        assert!(RegistryClient::new(&config()).is_ok());
    }

    #[test]
    fn test_invalid_contract_address_is_fatal() {
        let mut cfg = config();
        cfg.contract_address = "not-an-address".to_string();
        assert!(matches!(
            RegistryClient::new(&cfg),
            Err(LedgerError::ContractUnavailable(_))
        ));
    }

    #[test]
    fn test_invalid_private_key_is_fatal() {
        let mut cfg = config();
        cfg.private_key = "0x1234".to_string();
        assert!(matches!(
            RegistryClient::new(&cfg),
            Err(LedgerError::ContractUnavailable(_))
        ));
    }

    #[test]
    fn test_parse_hash_accepts_digests() {
        let digest = crate::fingerprint::digest(b"content");
        assert!(parse_hash(&digest).is_ok());
    }

    #[test]
    fn test_parse_hash_rejects_bad_input() {
        assert!(parse_hash("0x1234").is_err());
        assert!(parse_hash("zz").is_err());
    }
}
