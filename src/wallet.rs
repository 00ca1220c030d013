//! # Wallet Provider & Login Challenge Signer
//!
//! Wraps key custody behind a capability interface and produces the
//! domain-bound EIP-712 signature the backend verifies at sign-in. The
//! signing domain and the `SignIn` field schema are a fixed contract
//! shared with the backend; nothing here may vary them per call.

use std::time::{SystemTime, UNIX_EPOCH};

use alloy_primitives::{Address, B256, U256};
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;
use alloy_sol_types::{eip712_domain, sol, Eip712Domain, SolStruct};
use parking_lot::RwLock;
use tracing::info;

use crate::error::ClientError;

sol! {
    /// Typed sign-in payload. Field names and order are part of the
    /// contract with the verifying backend.
    struct SignIn {
        address walletAddress;
        uint256 timestamp;
    }
}

/// The fixed signing domain shared with the backend verifier.
pub static SIGNING_DOMAIN: Eip712Domain = eip712_domain! {
    name: "Avalanche Airdrop App",
    version: "1",
    chain_id: 1,
};

/// A signable challenge over the connected address and the Unix time (in
/// seconds) captured when the challenge was constructed — client time,
/// not server time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginChallenge {
    pub wallet_address: Address,
    pub timestamp: u64,
}

impl LoginChallenge {
    pub fn new(wallet_address: Address) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self {
            wallet_address,
            timestamp,
        }
    }

    pub fn at(wallet_address: Address, timestamp: u64) -> Self {
        Self {
            wallet_address,
            timestamp,
        }
    }

    /// The EIP-712 signing hash of this challenge under the fixed domain.
    pub fn signing_hash(&self) -> B256 {
        let message = SignIn {
            walletAddress: self.wallet_address,
            timestamp: U256::from(self.timestamp),
        };
        message.eip712_signing_hash(&SIGNING_DOMAIN)
    }
}

/// Injected wallet capability. The session layer depends on this trait,
/// never on a concrete wallet, so tests can substitute a double.
pub trait WalletProvider: Send + Sync {
    /// The currently connected address, if any.
    fn current_address(&self) -> Option<Address>;

    /// Unlocks the wallet and returns its address.
    fn connect(&self) -> Result<Address, ClientError>;

    /// Tears down the local connection. Infallible and idempotent.
    fn disconnect(&self);

    /// Produces a `0x`-hex 65-byte signature over the challenge. A
    /// refusal is a signing failure, distinct from any network failure,
    /// and terminal for the attempt.
    fn sign_login_challenge(&self, challenge: &LoginChallenge) -> Result<String, ClientError>;
}

/// Wallet backed by a hex-encoded private key file. The key never leaves
/// this module.
pub struct KeystoreWallet {
    key_path: String,
    signer: RwLock<Option<PrivateKeySigner>>,
}

impl KeystoreWallet {
    pub fn new(key_path: &str) -> Self {
        Self {
            key_path: key_path.to_string(),
            signer: RwLock::new(None),
        }
    }
}

impl WalletProvider for KeystoreWallet {
    fn current_address(&self) -> Option<Address> {
        self.signer.read().as_ref().map(|s| s.address())
    }

    fn connect(&self) -> Result<Address, ClientError> {
        let raw = std::fs::read_to_string(&self.key_path).map_err(|e| {
            ClientError::SigningRejected {
                reason: format!("failed to read key file '{}': {}", self.key_path, e),
            }
        })?;
        let signer: PrivateKeySigner =
            raw.trim()
                .parse()
                .map_err(|e| ClientError::SigningRejected {
                    reason: format!("failed to parse private key: {}", e),
                })?;

        let address = signer.address();
        info!("✅ Wallet connected. Address: {}", address);
        *self.signer.write() = Some(signer);
        Ok(address)
    }

    fn disconnect(&self) {
        if self.signer.write().take().is_some() {
            info!("Wallet disconnected.");
        }
    }

    fn sign_login_challenge(&self, challenge: &LoginChallenge) -> Result<String, ClientError> {
        let guard = self.signer.read();
        let signer = guard.as_ref().ok_or(ClientError::SigningRejected {
            reason: "wallet is not connected".to_string(),
        })?;

        let signature = signer
            .sign_hash_sync(&challenge.signing_hash())
            .map_err(|e| ClientError::SigningRejected {
                reason: e.to_string(),
            })?;
        Ok(format!("0x{}", hex::encode(signature.as_bytes())))
    }
}
