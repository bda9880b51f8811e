//! Document storage for Streamify.
//!
//! The social core persists two collections:
//!
//! - `users` — user documents, each embedding its friend set as an array
//!   of user ids
//! - `friend_requests` — sender id, recipient id, status, and timestamps
//!
//! Friendship lives in both places at once: an accepted request in
//! `friend_requests` and a pair of one-directional memberships in `users`.
//! The traits here expose document-level operations only; keeping the two
//! collections consistent is the job of the friendship service built on top.
//!
//! # Modules
//!
//! - [`error`] — Error types for store operations
//! - [`traits`] — [`UserStore`], [`FriendRequestStore`], [`AcceptanceTransaction`]
//! - [`memory`] — In-memory [`InMemoryDocumentStore`] backend

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::InMemoryDocumentStore;
pub use traits::{
    AcceptanceTransaction, FriendRequestStore, RequestListParams, UserListParams, UserStore,
};
