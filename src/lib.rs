//! Async client for the Reloadly airtime and gift-card API.
//!
//! The interesting parts live in [`amount`] (payable-amount resolution
//! against an operator's denomination model), [`topup`] (the per-job
//! builder with single-shot auto-detection fallback) and [`batch`] (the
//! bounded-concurrency runner). Everything else is transport plumbing.
//!
//! ```no_run
//! # async fn example() -> Result<(), reloadly::Error> {
//! use reloadly::{Service, ServiceConfig};
//!
//! let service = Service::new(ServiceConfig::from_env().unwrap());
//! service.authenticate().await?;
//!
//! let response = service
//!     .topups()
//!     .find_operator("IN", "Airtel India")
//!     .await
//!     .suggested_amount(50.0)
//!     .auto_fallback()
//!     .topup("+911234567890", 100.0)
//!     .await?;
//! println!("delivered: {:?}", response.delivered_amount);
//! # Ok(())
//! # }
//! ```

pub mod amount;
pub mod auth;
pub mod batch;
pub mod client;
pub mod config;
pub mod error;
pub mod giftcards;
pub mod logging;
pub mod operators;
pub mod topup;

pub use amount::resolve_amount;
pub use auth::Token;
pub use batch::{run_batch, TopupJob, TopupOutcome};
pub use client::Service;
pub use config::ServiceConfig;
pub use error::Error;
pub use giftcards::GiftCards;
pub use operators::{
    Country, Denomination, Fx, GeographicalRechargePlan, Operator, SuggestedAmount,
};
pub use topup::{RecipientPhone, TopupRequest, TopupResponse, Topups};
