//! # Backend Transport Layer
//!
//! Consolidates everything that talks to the airdrop backend over HTTP.
//!
//! ## Sub-modules
//!
//! - **`api_client`**: The cookie-carrying JSON client for the auth and
//!   airdrop endpoints, plus the status-code-driven classification of
//!   server rejections into the client error taxonomy.

pub mod api_client;
