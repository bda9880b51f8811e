//! Foundation types for Streamify.
//!
//! This crate provides the documents, identifiers, and pagination types used
//! throughout the social core. Every other Streamify crate depends on
//! `streamify-types`.
//!
//! # Key Types
//!
//! - [`UserId`] / [`FriendRequestId`] — UUID v7 document identifiers
//! - [`User`] — a user document with its embedded friend set
//! - [`FriendRequest`] — a friend request and its [`FriendRequestStatus`]
//! - [`PairKey`] — unordered pair of users, the uniqueness key for requests
//! - [`PageRequest`] / [`Metadata`] / [`Page`] — 1-based pagination

pub mod error;
pub mod friend_request;
pub mod identity;
pub mod page;
pub mod user;

pub use error::TypeError;
pub use friend_request::{
    FriendRequest, FriendRequestStatus, IncomingFriendRequest, OutgoingFriendRequest, PairKey,
    StatusFilter,
};
pub use identity::{FriendRequestId, UserId};
pub use page::{Metadata, Page, PageRequest};
pub use user::{User, UserSummary};
