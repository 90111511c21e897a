//! Client-side contract of the Lifeline review console.
//!
//! No rendering lives here: [`api::ApiClient`] talks to the backend,
//! [`review::ReviewDialog`] gates confirmation of a single action and
//! [`review::AccountReviewState`] keeps what the server last confirmed.

pub mod api;
pub mod config;
pub mod review;

pub use api::{ApiClient, ConsoleError};
pub use config::ConsoleConfig;
pub use review::{AccountReviewState, ReviewDialog};
