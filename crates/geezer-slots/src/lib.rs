//! geezer-slots: a slot machine for a chat guild.
//!
//! Members spend tickets on `/pull` and collect units; `/units` shows the
//! balance. Balances live in a sled [`Ledger`], interactions arrive on a
//! signed HTTP endpoint ([`interactions::router`]), and a [`BackupTask`]
//! ships zipped exports of the ledger to an S3-compatible bucket.
//!
//! ```rust,no_run
//! use geezer_slots::{AppState, Ledger, SlotsConfig, interactions};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = SlotsConfig::load()?;
//! let ledger = Ledger::open(&config.ledger_path)?;
//! let app = interactions::router(AppState::new(ledger, config.public_key));
//! let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod backup;
pub mod discord;
pub mod error;
pub mod interactions;
pub mod ledger;
pub mod machine;
pub mod shutdown;
pub mod signature;
pub mod state;

pub use backup::{BackupError, BackupTask};
pub use discord::{DiscordClient, DiscordError};
pub use error::AppError;
pub use ledger::{Ledger, LedgerError, LedgerTree, Settlement};
pub use machine::{EmojiSet, Spin, Tier};
pub use signature::InteractionSignature;
pub use state::{AppState, S3Config, SlotsConfig};
