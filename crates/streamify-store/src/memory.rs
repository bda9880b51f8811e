//! In-memory document store for tests, demos, and single-node deployments.
//!
//! [`InMemoryDocumentStore`] keeps both collections behind one `RwLock`.
//! It implements [`UserStore`], [`FriendRequestStore`] and
//! [`AcceptanceTransaction`]; holding the write lock across the status
//! change and both edge inserts is what makes acceptance atomic here.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, warn};

use streamify_types::{
    FriendRequest, FriendRequestId, FriendRequestStatus, IncomingFriendRequest,
    OutgoingFriendRequest, Page, PairKey, User, UserId,
};

use crate::error::{StoreError, StoreResult};
use crate::traits::{
    AcceptanceTransaction, FriendRequestStore, RequestListParams, UserListParams, UserStore,
};

/// An in-memory implementation of the social collections.
///
/// Data is lost when the store is dropped.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    inner: RwLock<Collections>,
}

#[derive(Debug, Default)]
struct Collections {
    users: BTreeMap<UserId, User>,
    requests: BTreeMap<FriendRequestId, FriendRequest>,
    /// Unique index over the unordered sender/recipient pair.
    pairs: HashMap<PairKey, FriendRequestId>,
}

impl InMemoryDocumentStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with `users`.
    pub fn from_users(users: impl IntoIterator<Item = User>) -> StoreResult<Self> {
        let store = Self::new();
        for user in users {
            store.insert_user(user)?;
        }
        Ok(store)
    }

    /// Load seed users from a JSON file holding an array of user documents.
    pub fn load_users_json(path: &Path) -> StoreResult<Self> {
        let bytes = std::fs::read(path)?;
        let users: Vec<User> = serde_json::from_slice(&bytes)
            .map_err(|e| StoreError::Serialization(format!("{}: {e}", path.display())))?;
        Self::from_users(users)
    }

    /// Insert or replace a user document.
    ///
    /// Registration lives outside the social core; this is how users get
    /// into the in-memory backend.
    pub fn insert_user(&self, user: User) -> StoreResult<()> {
        let mut inner = self.write()?;
        inner.users.insert(user.id, user);
        Ok(())
    }

    pub fn user_count(&self) -> StoreResult<usize> {
        Ok(self.read()?.users.len())
    }

    pub fn request_count(&self) -> StoreResult<usize> {
        Ok(self.read()?.requests.len())
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Collections>> {
        self.inner
            .read()
            .map_err(|e| StoreError::Backend(format!("lock poisoned: {e}")))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Collections>> {
        self.inner
            .write()
            .map_err(|e| StoreError::Backend(format!("lock poisoned: {e}")))
    }
}

impl Collections {
    fn add_edge(&mut self, owner: &UserId, new_friend: &UserId) -> StoreResult<bool> {
        let user = self
            .users
            .get_mut(owner)
            .ok_or_else(|| StoreError::user_not_found(owner))?;
        Ok(user.add_friend(*new_friend))
    }

    /// Check `next` against the stored version and return the document to
    /// write, without writing it.
    fn prepare_update(&self, next: &FriendRequest) -> StoreResult<FriendRequest> {
        let current = self
            .requests
            .get(&next.id)
            .ok_or_else(|| StoreError::request_not_found(next.id))?;

        if current.sender_id != next.sender_id || current.recipient_id != next.recipient_id {
            return Err(StoreError::InvalidUpdate(format!(
                "sender and recipient of friend request {} are immutable",
                next.id
            )));
        }
        if !current.status.can_transition_to(next.status) {
            return Err(StoreError::InvalidUpdate(format!(
                "friend request {} cannot move from {} to {}",
                next.id, current.status, next.status
            )));
        }

        let mut stored = next.clone();
        stored.created_at = current.created_at;
        stored.updated_at = Utc::now();
        Ok(stored)
    }

    fn filtered_users<'a>(
        &'a self,
        keep: impl Fn(&User) -> bool + 'a,
        query: &'a str,
    ) -> impl Iterator<Item = &'a User> + 'a {
        // BTreeMap iteration is ordered by id, which is the stable sort key.
        self.users
            .values()
            .filter(move |user| keep(user) && user.matches_query(query))
    }
}

#[async_trait]
impl UserStore for InMemoryDocumentStore {
    async fn get_by_id(&self, id: &UserId) -> StoreResult<Option<User>> {
        Ok(self.read()?.users.get(id).cloned())
    }

    async fn recommended(
        &self,
        current: &User,
        params: &UserListParams,
    ) -> StoreResult<Page<User>> {
        let inner = self.read()?;
        let users: Vec<User> = inner
            .filtered_users(
                |user| {
                    user.id != current.id
                        && user.is_onboarded
                        && !current.friend_ids.contains(&user.id)
                },
                &params.query,
            )
            .cloned()
            .collect();
        Ok(Page::slice(users, params.page))
    }

    async fn my_friends(&self, current: &User, params: &UserListParams) -> StoreResult<Page<User>> {
        let inner = self.read()?;
        let users: Vec<User> = inner
            .filtered_users(|user| current.friend_ids.contains(&user.id), &params.query)
            .cloned()
            .collect();
        Ok(Page::slice(users, params.page))
    }

    async fn add_friend(&self, owner: &UserId, new_friend: &UserId) -> StoreResult<()> {
        let mut inner = self.write()?;
        if inner.add_edge(owner, new_friend)? {
            debug!(owner = %owner, friend = %new_friend, "friend edge added");
        }
        Ok(())
    }
}

#[async_trait]
impl FriendRequestStore for InMemoryDocumentStore {
    async fn check_existing(&self, a: &UserId, b: &UserId) -> StoreResult<bool> {
        Ok(self.read()?.pairs.contains_key(&PairKey::new(*a, *b)))
    }

    async fn create(&self, sender: &UserId, recipient: &UserId) -> StoreResult<FriendRequest> {
        let mut inner = self.write()?;
        let pair = PairKey::new(*sender, *recipient);
        if inner.pairs.contains_key(&pair) {
            return Err(StoreError::DuplicatePair(pair));
        }

        let request = FriendRequest::new(*sender, *recipient);
        inner.pairs.insert(pair, request.id);
        inner.requests.insert(request.id, request.clone());
        debug!(request = %request.id, sender = %sender, recipient = %recipient, "friend request created");
        Ok(request)
    }

    async fn get_by_id(&self, id: &FriendRequestId) -> StoreResult<Option<FriendRequest>> {
        Ok(self.read()?.requests.get(id).cloned())
    }

    async fn update(&self, request: &FriendRequest) -> StoreResult<FriendRequest> {
        let mut inner = self.write()?;
        let stored = inner.prepare_update(request)?;
        inner.requests.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn incoming(
        &self,
        recipient: &UserId,
        params: &RequestListParams,
    ) -> StoreResult<Page<IncomingFriendRequest>> {
        let inner = self.read()?;
        let mut rows = Vec::new();
        for request in inner.requests.values() {
            if &request.recipient_id != recipient || !params.status.matches(request.status) {
                continue;
            }
            let Some(sender) = inner.users.get(&request.sender_id) else {
                warn!(request = %request.id, sender = %request.sender_id, "sender document missing, row skipped");
                continue;
            };
            if sender.matches_query(&params.search) {
                rows.push(IncomingFriendRequest {
                    request: request.clone(),
                    sender: sender.summary(),
                });
            }
        }
        Ok(Page::slice(rows, params.page))
    }

    async fn outgoing(
        &self,
        sender: &UserId,
        params: &RequestListParams,
    ) -> StoreResult<Page<OutgoingFriendRequest>> {
        let inner = self.read()?;
        let mut rows = Vec::new();
        for request in inner.requests.values() {
            if &request.sender_id != sender || !params.status.matches(request.status) {
                continue;
            }
            let Some(recipient) = inner.users.get(&request.recipient_id) else {
                warn!(request = %request.id, recipient = %request.recipient_id, "recipient document missing, row skipped");
                continue;
            };
            if recipient.matches_query(&params.search) {
                rows.push(OutgoingFriendRequest {
                    request: request.clone(),
                    recipient: recipient.summary(),
                });
            }
        }
        Ok(Page::slice(rows, params.page))
    }

    async fn accepted_requests(&self) -> StoreResult<Vec<FriendRequest>> {
        let inner = self.read()?;
        Ok(inner
            .requests
            .values()
            .filter(|r| r.status == FriendRequestStatus::Accepted)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl AcceptanceTransaction for InMemoryDocumentStore {
    async fn commit_acceptance(&self, accepted: &FriendRequest) -> StoreResult<FriendRequest> {
        if accepted.status != FriendRequestStatus::Accepted {
            return Err(StoreError::InvalidUpdate(format!(
                "friend request {} must be Accepted to commit acceptance",
                accepted.id
            )));
        }

        let mut inner = self.write()?;

        // Validate every document before touching any of them.
        let stored = inner.prepare_update(accepted)?;
        for id in [&stored.sender_id, &stored.recipient_id] {
            if !inner.users.contains_key(id) {
                return Err(StoreError::user_not_found(id));
            }
        }

        inner.requests.insert(stored.id, stored.clone());
        inner.add_edge(&stored.recipient_id, &stored.sender_id)?;
        inner.add_edge(&stored.sender_id, &stored.recipient_id)?;
        debug!(request = %stored.id, "acceptance committed");
        Ok(stored)
    }
}
