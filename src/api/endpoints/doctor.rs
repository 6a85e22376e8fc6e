//! Doctor-facing worklist: the inbox of assigned tests.

use axum::extract::{Query, State};
use axum::{Extension, Json};
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, UserContext};
use crate::inbox::{self, InboxItem};
use crate::models::Role;

#[derive(Debug, Deserialize)]
pub struct InboxQuery {
    #[serde(default)]
    pub email: String,
}

pub async fn get_inbox(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Query(query): Query<InboxQuery>,
) -> Result<Json<Vec<InboxItem>>, ApiError> {
    user.require_role(Role::Doctor)?;
    let conn = ctx.lock_db()?;
    Ok(Json(inbox::fetch_inbox(&conn, &query.email)?))
}
