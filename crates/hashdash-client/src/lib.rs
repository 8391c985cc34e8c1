//! Hashdash Client SDK.
//!
//! Lets mining services report accruals and dashboards read referral data.
//!
//! # Example
//!
//! ```no_run
//! use hashdash_client::{ClientOptions, HashdashClient};
//! use hashdash_core::AccountId;
//!
//! # async fn example() -> Result<(), hashdash_client::ClientError> {
//! let client = HashdashClient::with_options(
//!     "http://hashdash:8080",
//!     "your-service-api-key",
//!     ClientOptions::with_service_name("pool-watcher"),
//! )?;
//!
//! let account: AccountId = "0b6f7c2e-4c1c-4f6e-9d8e-1c2b3a4d5e6f".parse().unwrap();
//! let stats = client.accrue_mining(&account, 125, 1).await?;
//! println!("Balance: {}", stats.mining_balance_formatted);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod client;
mod error;
mod types;

pub use client::{ClientOptions, HashdashClient};
pub use error::ClientError;
pub use types::*;
