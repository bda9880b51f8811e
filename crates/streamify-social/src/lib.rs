//! Friendship service for Streamify.
//!
//! [`FriendshipService`] runs the friend-request workflow on top of the
//! document stores in `streamify-store`:
//!
//! - **request**: target must exist, must not already be a friend, and no
//!   request may exist between the pair in either direction
//! - **accept**: only the recipient may accept; the request moves to
//!   `Accepted` and a friend edge is written in each direction
//!
//! # Acceptance and consistency
//!
//! An accepted request touches three documents. When the backend implements
//! [`AcceptanceTransaction`](streamify_store::AcceptanceTransaction) and
//! [`SocialConfig::use_transactions`] is set, all three are written in one
//! transaction. Otherwise the writes run in sequence with retries on the
//! edge writes; if those still fail the caller gets
//! [`SocialError::InconsistentState`] and the request id is logged under the
//! `streamify::reconcile` target. [`FriendshipService::repair_acceptance`]
//! and [`FriendshipService::reconcile`] restore the missing edges.

pub mod config;
pub mod error;
pub mod service;

pub use config::SocialConfig;
pub use error::{SocialError, SocialResult};
pub use service::FriendshipService;
