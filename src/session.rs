//! # Session Manager
//!
//! Turns a wallet signature into an authenticated backend session and
//! tears it down again, locally and remotely.
//!
//! ## Core Rules
//!
//! 1.  **One attempt per address transition.** Sign-in fires when the
//!     observed wallet address changes (including none → some), never on
//!     repeated observation of the same address, so one connection can
//!     never race two sign-in attempts.
//!
//! 2.  **No half-authenticated state.** If any part of sign-in fails —
//!     the operator declining the signature included — the wallet is
//!     disconnected so the client never lingers "connected but
//!     unauthenticated" beyond one request cycle.
//!
//! 3.  **Sign-out always tears down.** The remote logout endpoint is
//!     always called, but the local wallet is disconnected regardless of
//!     that call's outcome, so an unreachable server cannot leave the
//!     console looking authenticated.

use std::sync::Arc;

use alloy_primitives::Address;
use parking_lot::RwLock;
use tracing::{info, warn};

use crate::core::api_client::{AirdropApi, LoginRequest};
use crate::error::ClientError;
use crate::state::Session;
use crate::wallet::{LoginChallenge, WalletProvider};

pub struct SessionManager<A: AirdropApi, W: WalletProvider> {
    api: Arc<A>,
    wallet: Arc<W>,
    session: RwLock<Option<Session>>,
    /// Last address a sign-in was attempted for; the transition watcher.
    last_observed: RwLock<Option<Address>>,
}

impl<A: AirdropApi, W: WalletProvider> SessionManager<A, W> {
    pub fn new(api: Arc<A>, wallet: Arc<W>) -> Self {
        Self {
            api,
            wallet,
            session: RwLock::new(None),
            last_observed: RwLock::new(None),
        }
    }

    /// The current session value, if one was established.
    pub fn session(&self) -> Option<Session> {
        *self.session.read()
    }

    /// Reports the currently connected address. Triggers `sign_in`
    /// exactly once per address transition; re-observing the same
    /// address is a no-op, and no address means no attempt.
    pub async fn observe_address(&self, address: Option<Address>) -> Result<(), ClientError> {
        let transitioned = {
            let mut last = self.last_observed.write();
            if *last == address {
                false
            } else {
                *last = address;
                true
            }
        };

        match (transitioned, address) {
            (true, Some(addr)) => self.sign_in(addr).await,
            _ => Ok(()),
        }
    }

    /// Signs the login challenge and exchanges it for a server session.
    /// On any failure the wallet connection is cancelled.
    pub async fn sign_in(&self, address: Address) -> Result<(), ClientError> {
        let challenge = LoginChallenge::new(address);
        match self.try_sign_in(&challenge).await {
            Ok(()) => {
                info!("✅ Signed in as {}", address);
                *self.session.write() = Some(Session {
                    wallet_address: address,
                    signed_at: challenge.timestamp,
                });
                Ok(())
            }
            Err(e) => {
                warn!("Sign-in failed for {}: {}. Disconnecting wallet.", address, e);
                self.wallet.disconnect();
                *self.session.write() = None;
                // Allow a fresh attempt if the operator reconnects the
                // same address.
                *self.last_observed.write() = None;
                Err(e)
            }
        }
    }

    async fn try_sign_in(&self, challenge: &LoginChallenge) -> Result<(), ClientError> {
        let signature = self.wallet.sign_login_challenge(challenge)?;
        let request = LoginRequest {
            wallet_address: challenge.wallet_address.to_string(),
            signature,
            timestamp: challenge.timestamp,
        };
        self.api.login(&request).await
    }

    /// Calls the remote logout endpoint and clears local session state.
    /// The wallet is disconnected (when requested) whether or not the
    /// endpoint call succeeds.
    pub async fn sign_out(&self, disconnect_wallet: bool) {
        if let Err(e) = self.api.logout().await {
            warn!("Logout endpoint failed: {}", e);
        }
        if disconnect_wallet {
            self.wallet.disconnect();
        }
        *self.session.write() = None;
        *self.last_observed.write() = None;
        info!("Signed out.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::api_client::CreateOutcome;
    use crate::error::ClientError;
    use crate::form::AirdropDefinition;
    use crate::state::AirdropStatus;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct StubApi {
        login_calls: Mutex<Vec<LoginRequest>>,
        logout_calls: Mutex<usize>,
        fail_login: bool,
        fail_logout: bool,
    }

    impl AirdropApi for StubApi {
        async fn login(&self, request: &LoginRequest) -> Result<(), ClientError> {
            self.login_calls.lock().push(request.clone());
            if self.fail_login {
                Err(ClientError::Unauthorized)
            } else {
                Ok(())
            }
        }

        async fn logout(&self) -> Result<(), ClientError> {
            *self.logout_calls.lock() += 1;
            if self.fail_logout {
                Err(ClientError::Transport("server unreachable".to_string()))
            } else {
                Ok(())
            }
        }

        async fn create(&self, _: &AirdropDefinition) -> Result<CreateOutcome, ClientError> {
            unreachable!("not used by session tests")
        }

        async fn draw_one(&self, _: &str) -> Result<String, ClientError> {
            unreachable!("not used by session tests")
        }

        async fn draw_all(&self, _: &str) -> Result<String, ClientError> {
            unreachable!("not used by session tests")
        }

        async fn check_status(&self, _: &str) -> Result<AirdropStatus, ClientError> {
            unreachable!("not used by session tests")
        }
    }

    #[derive(Default)]
    struct StubWallet {
        address: Mutex<Option<Address>>,
        disconnects: Mutex<usize>,
        refuse_signature: bool,
    }

    impl StubWallet {
        fn connected(address: Address) -> Self {
            Self {
                address: Mutex::new(Some(address)),
                ..Default::default()
            }
        }
    }

    impl WalletProvider for StubWallet {
        fn current_address(&self) -> Option<Address> {
            *self.address.lock()
        }

        fn connect(&self) -> Result<Address, ClientError> {
            self.current_address().ok_or(ClientError::SigningRejected {
                reason: "no key".to_string(),
            })
        }

        fn disconnect(&self) {
            *self.disconnects.lock() += 1;
            *self.address.lock() = None;
        }

        fn sign_login_challenge(&self, _: &LoginChallenge) -> Result<String, ClientError> {
            if self.refuse_signature {
                Err(ClientError::SigningRejected {
                    reason: "operator declined".to_string(),
                })
            } else {
                Ok(format!("0x{}", "ab".repeat(65)))
            }
        }
    }

    fn test_address() -> Address {
        "0x52908400098527886E0F7030069857D2E4169EE7"
            .parse()
            .expect("valid address")
    }

    #[tokio::test]
    async fn sign_in_fires_once_per_address_transition() {
        let api = Arc::new(StubApi::default());
        let wallet = Arc::new(StubWallet::connected(test_address()));
        let manager = SessionManager::new(api.clone(), wallet);

        manager.observe_address(Some(test_address())).await.unwrap();
        manager.observe_address(Some(test_address())).await.unwrap();
        manager.observe_address(Some(test_address())).await.unwrap();

        assert_eq!(api.login_calls.lock().len(), 1);
        assert!(manager.session().is_some());
    }

    #[tokio::test]
    async fn observing_no_address_attempts_nothing() {
        let api = Arc::new(StubApi::default());
        let wallet = Arc::new(StubWallet::default());
        let manager = SessionManager::new(api.clone(), wallet);

        manager.observe_address(None).await.unwrap();
        assert!(api.login_calls.lock().is_empty());
        assert!(manager.session().is_none());
    }

    #[tokio::test]
    async fn declined_signature_disconnects_without_network_call() {
        let api = Arc::new(StubApi::default());
        let wallet = Arc::new(StubWallet {
            address: Mutex::new(Some(test_address())),
            refuse_signature: true,
            ..Default::default()
        });
        let manager = SessionManager::new(api.clone(), wallet.clone());

        let result = manager.observe_address(Some(test_address())).await;
        assert!(matches!(result, Err(ClientError::SigningRejected { .. })));
        assert!(api.login_calls.lock().is_empty());
        assert_eq!(*wallet.disconnects.lock(), 1);
        assert!(manager.session().is_none());
    }

    #[tokio::test]
    async fn rejected_login_disconnects_and_allows_retry() {
        let api = Arc::new(StubApi {
            fail_login: true,
            ..Default::default()
        });
        let wallet = Arc::new(StubWallet::connected(test_address()));
        let manager = SessionManager::new(api.clone(), wallet.clone());

        assert!(manager.observe_address(Some(test_address())).await.is_err());
        assert_eq!(*wallet.disconnects.lock(), 1);

        // A reconnect to the same address is a fresh transition.
        *wallet.address.lock() = Some(test_address());
        assert!(manager.observe_address(Some(test_address())).await.is_err());
        assert_eq!(api.login_calls.lock().len(), 2);
    }

    #[tokio::test]
    async fn sign_out_disconnects_wallet_even_when_server_fails() {
        let api = Arc::new(StubApi {
            fail_logout: true,
            ..Default::default()
        });
        let wallet = Arc::new(StubWallet::connected(test_address()));
        let manager = SessionManager::new(api.clone(), wallet.clone());

        manager.observe_address(Some(test_address())).await.unwrap();
        assert!(manager.session().is_some());

        manager.sign_out(true).await;
        assert_eq!(*api.logout_calls.lock(), 1);
        assert_eq!(*wallet.disconnects.lock(), 1);
        assert!(manager.session().is_none());
    }

    #[tokio::test]
    async fn sign_out_can_keep_wallet_connected() {
        let api = Arc::new(StubApi::default());
        let wallet = Arc::new(StubWallet::connected(test_address()));
        let manager = SessionManager::new(api.clone(), wallet.clone());

        manager.observe_address(Some(test_address())).await.unwrap();
        manager.sign_out(false).await;

        assert_eq!(*wallet.disconnects.lock(), 0);
        assert!(manager.session().is_none());
    }
}
