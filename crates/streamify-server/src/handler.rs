use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;

use streamify_store::{RequestListParams, UserListParams};
use streamify_types::page::DEFAULT_PAGE_SIZE;
use streamify_types::{FriendRequestId, PageRequest, StatusFilter, UserId};

use crate::auth::CurrentUser;
use crate::error::{ServerError, ServerResult};
use crate::state::AppState;

/// Query string shared by the listing endpoints. Values stay raw strings so
/// malformed input produces a JSON 400 rather than an extractor rejection.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
    pub page_size: Option<String>,
    pub query: Option<String>,
    pub status: Option<String>,
    pub search_sender: Option<String>,
    pub search_recipient: Option<String>,
}

impl ListQuery {
    fn page_request(&self) -> ServerResult<PageRequest> {
        let page = parse_int(self.page.as_deref(), "page", 1)?;
        let page_size = parse_int(self.page_size.as_deref(), "page_size", DEFAULT_PAGE_SIZE)?;
        PageRequest::new(page, page_size).map_err(|e| ServerError::BadRequest(e.to_string()))
    }

    fn status_filter(&self) -> ServerResult<StatusFilter> {
        match self.status.as_deref() {
            None | Some("") => Ok(StatusFilter::All),
            Some(raw) => raw
                .parse()
                .map_err(|_| ServerError::BadRequest("status, must be one of All, Pending, Accepted".into())),
        }
    }

    fn user_params(&self) -> ServerResult<UserListParams> {
        Ok(UserListParams {
            page: self.page_request()?,
            query: self.query.clone().unwrap_or_default(),
        })
    }

    fn request_params(&self, search: Option<&String>) -> ServerResult<RequestListParams> {
        Ok(RequestListParams {
            status: self.status_filter()?,
            page: self.page_request()?,
            search: search.cloned().unwrap_or_default(),
        })
    }
}

fn parse_int(raw: Option<&str>, key: &str, default: u64) -> ServerResult<u64> {
    match raw {
        None | Some("") => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|_| ServerError::BadRequest(format!("{key}, must be an integer value"))),
    }
}

/// Health check handler.
pub async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn get_user(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    Path(user_id): Path<String>,
) -> ServerResult<impl IntoResponse> {
    let id = UserId::parse(&user_id)
        .map_err(|_| ServerError::BadRequest("invalid user id value".into()))?;
    let user = state.service.get_user(&id).await?;
    Ok(Json(json!({ "user": user })))
}

pub async fn recommended(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Query(query): Query<ListQuery>,
) -> ServerResult<impl IntoResponse> {
    let page = state
        .service
        .recommended(&actor, &query.user_params()?)
        .await?;
    Ok(Json(json!({ "users": page.items, "metadata": page.metadata })))
}

pub async fn my_friends(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Query(query): Query<ListQuery>,
) -> ServerResult<impl IntoResponse> {
    let page = state
        .service
        .my_friends(&actor, &query.user_params()?)
        .await?;
    Ok(Json(json!({ "users": page.items, "metadata": page.metadata })))
}

pub async fn request_friend(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(recipient_id): Path<String>,
) -> ServerResult<impl IntoResponse> {
    let recipient = UserId::parse(&recipient_id)
        .map_err(|_| ServerError::BadRequest("invalid recipient id value".into()))?;
    let request = state.service.request_friend(&actor, &recipient).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "friend_request": request })),
    ))
}

pub async fn accept_friend(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(request_id): Path<String>,
) -> ServerResult<impl IntoResponse> {
    let id = FriendRequestId::parse(&request_id)
        .map_err(|_| ServerError::BadRequest("invalid friend request id value".into()))?;
    let request = state.service.accept_friend(&actor, &id).await?;
    Ok(Json(json!({ "friend_request": request })))
}

pub async fn incoming_requests(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Query(query): Query<ListQuery>,
) -> ServerResult<impl IntoResponse> {
    let params = query.request_params(query.search_sender.as_ref())?;
    let page = state.service.incoming_requests(&actor, &params).await?;
    Ok(Json(json!({ "friend_requests": page.items, "metadata": page.metadata })))
}

pub async fn outgoing_requests(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Query(query): Query<ListQuery>,
) -> ServerResult<impl IntoResponse> {
    let params = query.request_params(query.search_recipient.as_ref())?;
    let page = state.service.outgoing_requests(&actor, &params).await?;
    Ok(Json(json!({ "friend_requests": page.items, "metadata": page.metadata })))
}
