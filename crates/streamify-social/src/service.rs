use std::future::Future;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use streamify_store::{
    AcceptanceTransaction, FriendRequestStore, RequestListParams, StoreError, StoreResult,
    UserListParams, UserStore,
};
use streamify_types::{
    FriendRequest, FriendRequestId, IncomingFriendRequest, OutgoingFriendRequest, Page, User,
    UserId,
};

use crate::config::SocialConfig;
use crate::error::{SocialError, SocialResult};

/// The friend-request workflow.
///
/// Composes the user and friend-request stores and enforces the invariants
/// neither can enforce alone: one request per pair of users, only the
/// recipient accepts, and an accepted request leaves a symmetric friend
/// edge behind.
///
/// Every store call runs under [`SocialConfig::store_timeout`]. Dropping a
/// returned future (for example when the HTTP client disconnects) cancels
/// the store call in flight.
pub struct FriendshipService {
    users: Arc<dyn UserStore>,
    requests: Arc<dyn FriendRequestStore>,
    transaction: Option<Arc<dyn AcceptanceTransaction>>,
    config: SocialConfig,
}

impl FriendshipService {
    /// Build a service over a backend that holds both collections and can
    /// accept requests transactionally.
    pub fn new<S>(store: Arc<S>, config: SocialConfig) -> Self
    where
        S: UserStore + FriendRequestStore + AcceptanceTransaction + 'static,
    {
        Self {
            users: store.clone(),
            requests: store.clone(),
            transaction: Some(store),
            config,
        }
    }

    /// Build a service over separate stores with no transaction support.
    /// Acceptance always takes the sequential path.
    pub fn from_parts(
        users: Arc<dyn UserStore>,
        requests: Arc<dyn FriendRequestStore>,
        config: SocialConfig,
    ) -> Self {
        Self {
            users,
            requests,
            transaction: None,
            config,
        }
    }

    pub fn config(&self) -> &SocialConfig {
        &self.config
    }

    /// Whether `accept_friend` commits through a store transaction.
    pub fn uses_transactions(&self) -> bool {
        self.config.use_transactions && self.transaction.is_some()
    }

    // ---- Friend requests ----

    /// Send a friend request from `actor` to `target`.
    ///
    /// Checks run in order and the first failure wins: the target must
    /// exist, the two must not already be friends, and no request may
    /// exist between them in either direction.
    pub async fn request_friend(&self, actor: &User, target: &UserId) -> SocialResult<FriendRequest> {
        if actor.id == *target {
            return Err(SocialError::InvalidInput(
                "cannot send a friend request to yourself".into(),
            ));
        }

        // A missing target reads as a bad id, never as "not found".
        let recipient = self
            .bounded("users.get_by_id", self.users.get_by_id(target))
            .await?
            .ok_or_else(|| SocialError::InvalidInput("invalid recipient id value".into()))?;

        if actor.is_friend_with(&recipient.id) || recipient.is_friend_with(&actor.id) {
            return Err(SocialError::InvalidInput(format!(
                "already friend with user {}",
                recipient.id
            )));
        }

        let exists = self
            .bounded(
                "friend_requests.check_existing",
                self.requests.check_existing(&actor.id, &recipient.id),
            )
            .await?;
        if exists {
            return Err(duplicate_request());
        }

        // The store's pair index closes the window between the check above
        // and this insert.
        let request = match self
            .bounded(
                "friend_requests.create",
                self.requests.create(&actor.id, &recipient.id),
            )
            .await
        {
            Ok(request) => request,
            Err(StoreError::DuplicatePair(_)) => return Err(duplicate_request()),
            Err(err) => return Err(err.into()),
        };

        info!(
            request = %request.id,
            sender = %request.sender_id,
            recipient = %request.recipient_id,
            "friend request sent"
        );
        Ok(request)
    }

    /// Accept friend request `request_id` on behalf of `actor`.
    ///
    /// Only the recipient may accept. Accepting an already accepted request
    /// succeeds without changes other than re-asserting both friend edges.
    pub async fn accept_friend(
        &self,
        actor: &User,
        request_id: &FriendRequestId,
    ) -> SocialResult<FriendRequest> {
        let mut request = self.load_request(request_id).await?;

        if request.recipient_id != actor.id {
            return Err(SocialError::Forbidden(
                "only the recipient can accept a friend request".into(),
            ));
        }

        if !request.is_pending() {
            debug!(request = %request.id, "friend request already accepted");
            self.ensure_edges(&request)
                .await
                .map_err(|source| self.inconsistent(&request, source))?;
            return Ok(request);
        }

        request.accept()?;

        let accepted = match self.active_transaction() {
            Some(tx) => {
                self.bounded(
                    "friend_requests.commit_acceptance",
                    tx.commit_acceptance(&request),
                )
                .await?
            }
            None => self.accept_sequentially(&request).await?,
        };

        info!(
            request = %accepted.id,
            sender = %accepted.sender_id,
            recipient = %accepted.recipient_id,
            "friend request accepted"
        );
        Ok(accepted)
    }

    /// Re-add both friend edges for an accepted request.
    ///
    /// Idempotent, so it is safe to run any number of times for the same
    /// request id.
    pub async fn repair_acceptance(&self, request_id: &FriendRequestId) -> SocialResult<FriendRequest> {
        let request = self.load_request(request_id).await?;
        if request.is_pending() {
            return Err(SocialError::InvalidInput(format!(
                "friend request {} is not accepted",
                request.id
            )));
        }
        self.ensure_edges(&request)
            .await
            .map_err(|source| self.inconsistent(&request, source))?;
        info!(request = %request.id, "friend edges repaired");
        Ok(request)
    }

    /// Scan every accepted request and repair the ones whose friend edges
    /// are missing. Returns the ids that needed repair.
    pub async fn reconcile(&self) -> SocialResult<Vec<FriendRequestId>> {
        let accepted = self
            .bounded(
                "friend_requests.accepted_requests",
                self.requests.accepted_requests(),
            )
            .await?;

        let mut repaired = Vec::new();
        for request in accepted {
            let sender = self
                .bounded("users.get_by_id", self.users.get_by_id(&request.sender_id))
                .await?;
            let recipient = self
                .bounded("users.get_by_id", self.users.get_by_id(&request.recipient_id))
                .await?;
            let (Some(sender), Some(recipient)) = (sender, recipient) else {
                warn!(request = %request.id, "accepted request references a missing user, skipped");
                continue;
            };

            if sender.is_friend_with(&recipient.id) && recipient.is_friend_with(&sender.id) {
                continue;
            }

            warn!(request = %request.id, "accepted request is missing friend edges, repairing");
            self.ensure_edges(&request)
                .await
                .map_err(|source| self.inconsistent(&request, source))?;
            repaired.push(request.id);
        }
        Ok(repaired)
    }

    // ---- Listings ----

    pub async fn get_user(&self, id: &UserId) -> SocialResult<User> {
        self.bounded("users.get_by_id", self.users.get_by_id(id))
            .await?
            .ok_or(SocialError::NotFound("user"))
    }

    /// Users `actor` is not yet friends with.
    pub async fn recommended(&self, actor: &User, params: &UserListParams) -> SocialResult<Page<User>> {
        self.check_page_size(params.page.page_size())?;
        Ok(self
            .bounded("users.recommended", self.users.recommended(actor, params))
            .await?)
    }

    /// `actor`'s friends.
    pub async fn my_friends(&self, actor: &User, params: &UserListParams) -> SocialResult<Page<User>> {
        self.check_page_size(params.page.page_size())?;
        Ok(self
            .bounded("users.my_friends", self.users.my_friends(actor, params))
            .await?)
    }

    /// Requests addressed to `actor`.
    pub async fn incoming_requests(
        &self,
        actor: &User,
        params: &RequestListParams,
    ) -> SocialResult<Page<IncomingFriendRequest>> {
        self.check_page_size(params.page.page_size())?;
        Ok(self
            .bounded("friend_requests.incoming", self.requests.incoming(&actor.id, params))
            .await?)
    }

    /// Requests sent by `actor`.
    pub async fn outgoing_requests(
        &self,
        actor: &User,
        params: &RequestListParams,
    ) -> SocialResult<Page<OutgoingFriendRequest>> {
        self.check_page_size(params.page.page_size())?;
        Ok(self
            .bounded("friend_requests.outgoing", self.requests.outgoing(&actor.id, params))
            .await?)
    }

    // ---- Internals ----

    fn active_transaction(&self) -> Option<&Arc<dyn AcceptanceTransaction>> {
        if self.config.use_transactions {
            self.transaction.as_ref()
        } else {
            None
        }
    }

    /// Status update first, then one edge per direction. A failure after the
    /// status update is reported as `InconsistentState`, not `Internal`.
    async fn accept_sequentially(&self, request: &FriendRequest) -> SocialResult<FriendRequest> {
        let stored = self
            .bounded("friend_requests.update", self.requests.update(request))
            .await?;

        self.ensure_edges(&stored)
            .await
            .map_err(|source| self.inconsistent(&stored, source))?;
        Ok(stored)
    }

    async fn ensure_edges(&self, request: &FriendRequest) -> StoreResult<()> {
        self.add_edge(&request.recipient_id, &request.sender_id).await?;
        self.add_edge(&request.sender_id, &request.recipient_id).await
    }

    async fn add_edge(&self, owner: &UserId, friend: &UserId) -> StoreResult<()> {
        let mut attempt = 0;
        loop {
            match self
                .bounded("users.add_friend", self.users.add_friend(owner, friend))
                .await
            {
                Ok(()) => return Ok(()),
                Err(err) if err.is_not_found() || attempt >= self.config.edge_retry_attempts => {
                    return Err(err)
                }
                Err(err) => {
                    attempt += 1;
                    warn!(owner = %owner, friend = %friend, attempt, error = %err, "friend edge write failed, retrying");
                    tokio::time::sleep(self.config.edge_retry_backoff()).await;
                }
            }
        }
    }

    async fn load_request(&self, id: &FriendRequestId) -> SocialResult<FriendRequest> {
        self.bounded("friend_requests.get_by_id", self.requests.get_by_id(id))
            .await?
            .ok_or(SocialError::NotFound("friend request"))
    }

    fn inconsistent(&self, request: &FriendRequest, source: StoreError) -> SocialError {
        error!(
            target: "streamify::reconcile",
            request = %request.id,
            sender = %request.sender_id,
            recipient = %request.recipient_id,
            error = %source,
            "friend request accepted but friend edges are incomplete"
        );
        SocialError::InconsistentState {
            request_id: request.id,
            source,
        }
    }

    fn check_page_size(&self, page_size: u64) -> SocialResult<()> {
        if page_size > self.config.max_page_size {
            return Err(SocialError::InvalidInput(format!(
                "page_size must be at most {}",
                self.config.max_page_size
            )));
        }
        Ok(())
    }

    async fn bounded<T, F>(&self, operation: &'static str, call: F) -> StoreResult<T>
    where
        F: Future<Output = StoreResult<T>>,
    {
        tokio::time::timeout(self.config.store_timeout(), call)
            .await
            .unwrap_or_else(|_elapsed| Err(StoreError::Timeout { operation }))
    }
}

fn duplicate_request() -> SocialError {
    SocialError::Conflict("friend request already exist between you and this user".into())
}
