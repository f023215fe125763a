//! Client for a zkool wallet backend's GraphQL API, and a dispatcher that exposes every
//! client operation by name.
//!
//! ```no_run
//! # async fn example() -> anyhow::Result<()> {
//! use zkool_client::{data::AccountId, remote::Endpoint, WalletClient};
//!
//! let client = WalletClient::new(Endpoint::from_env()?.connect(&[])?);
//! client.initialize().await?;
//! let balance = client.get_balance(AccountId(1)).await?;
//! println!("{}", balance.total);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod commands;
pub mod data;
pub mod documents;
pub mod error;
pub mod remote;
pub mod transport;

pub use client::WalletClient;
pub use commands::Dispatcher;
pub use error::Error;
