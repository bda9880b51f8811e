//! Storage traits for the two social collections.
//!
//! Any backend (in-memory, document database) implements these traits. Every
//! method is async and cancellation-safe at the document level: dropping the
//! returned future abandons the call, and a single-document write either
//! lands completely or not at all.

use async_trait::async_trait;

use streamify_types::{
    FriendRequest, FriendRequestId, IncomingFriendRequest, OutgoingFriendRequest, Page,
    PageRequest, StatusFilter, User, UserId,
};

use crate::error::StoreResult;

/// Parameters for the user listings (`recommended`, `my_friends`).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserListParams {
    pub page: PageRequest,
    /// Case-insensitive free-text filter. Empty means no filter.
    pub query: String,
}

/// Parameters for the request listings (`incoming`, `outgoing`).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestListParams {
    pub status: StatusFilter,
    pub page: PageRequest,
    /// Free-text filter applied to the counterpart user's profile.
    pub search: String,
}

/// The `users` collection.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Read a user by id. Returns `Ok(None)` if no document matches.
    async fn get_by_id(&self, id: &UserId) -> StoreResult<Option<User>>;

    /// Users that `current` might want to befriend.
    ///
    /// Excludes `current` itself, everyone in `current.friend_ids`, and
    /// users who have not finished onboarding. Results are sorted by id so
    /// consecutive pages neither skip nor repeat rows.
    async fn recommended(&self, current: &User, params: &UserListParams)
        -> StoreResult<Page<User>>;

    /// Users whose id is in `current.friend_ids`, sorted by id.
    async fn my_friends(&self, current: &User, params: &UserListParams)
        -> StoreResult<Page<User>>;

    /// Add `new_friend` to `owner`'s friend set.
    ///
    /// Idempotent: adding an id that is already present is a no-op. This
    /// is a single-document write and does not touch `new_friend`'s
    /// document; keeping friendship symmetric is the caller's job.
    async fn add_friend(&self, owner: &UserId, new_friend: &UserId) -> StoreResult<()>;
}

/// The `friend_requests` collection.
#[async_trait]
pub trait FriendRequestStore: Send + Sync {
    /// Returns `true` if any request exists between `a` and `b`, in either
    /// direction and with any status.
    async fn check_existing(&self, a: &UserId, b: &UserId) -> StoreResult<bool>;

    /// Insert a new pending request, assigning its id and timestamps.
    ///
    /// Fails with [`StoreError::DuplicatePair`](crate::StoreError::DuplicatePair)
    /// if a request already exists for the unordered pair.
    async fn create(&self, sender: &UserId, recipient: &UserId) -> StoreResult<FriendRequest>;

    /// Read a request by id. Returns `Ok(None)` if no document matches.
    async fn get_by_id(&self, id: &FriendRequestId) -> StoreResult<Option<FriendRequest>>;

    /// Replace a request document by id and return the stored version.
    ///
    /// The sender/recipient pair is immutable and status may not move
    /// backwards; either violation is rejected.
    async fn update(&self, request: &FriendRequest) -> StoreResult<FriendRequest>;

    /// Requests addressed to `recipient`, with each sender's profile.
    async fn incoming(
        &self,
        recipient: &UserId,
        params: &RequestListParams,
    ) -> StoreResult<Page<IncomingFriendRequest>>;

    /// Requests sent by `sender`, with each recipient's profile.
    async fn outgoing(
        &self,
        sender: &UserId,
        params: &RequestListParams,
    ) -> StoreResult<Page<OutgoingFriendRequest>>;

    /// Every accepted request, oldest first. Used by reconciliation.
    async fn accepted_requests(&self) -> StoreResult<Vec<FriendRequest>>;
}

/// Multi-document transaction support for accepting a request.
///
/// Backends that can write several documents atomically implement this so
/// the status change and both friend edges land together or not at all.
#[async_trait]
pub trait AcceptanceTransaction: Send + Sync {
    /// Persist `accepted` (which must carry status `Accepted`) and add the
    /// friend edge in both directions, atomically.
    async fn commit_acceptance(&self, accepted: &FriendRequest) -> StoreResult<FriendRequest>;
}
