//! Test CRUD plus the per-test workflow actions: emailing one test's
//! report and assigning it to a doctor's inbox.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::endpoints::patients::SendBody;
use crate::api::endpoints::MessageResponse;
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, UserContext};
use crate::inbox;
use crate::models::{InboxEntry, LabTest, Role};
use crate::records::{self, NewTest, TestPatch};
use crate::report;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub patient_id: Option<Uuid>,
}

pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Json(new): Json<NewTest>,
) -> Result<(StatusCode, Json<LabTest>), ApiError> {
    user.require_role(Role::Lab)?;
    let conn = ctx.lock_db()?;
    let test = records::create_test(&conn, new)?;
    Ok((StatusCode::CREATED, Json(test)))
}

pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(_user): Extension<UserContext>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<LabTest>>, ApiError> {
    let conn = ctx.lock_db()?;
    Ok(Json(records::list_tests(&conn, query.patient_id.as_ref())?))
}

pub async fn get(
    State(ctx): State<ApiContext>,
    Extension(_user): Extension<UserContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<LabTest>, ApiError> {
    let conn = ctx.lock_db()?;
    Ok(Json(records::get_test(&conn, &id)?))
}

pub async fn update(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<Uuid>,
    Json(patch): Json<TestPatch>,
) -> Result<Json<LabTest>, ApiError> {
    user.require_role(Role::Lab)?;
    let conn = ctx.lock_db()?;
    Ok(Json(records::update_test(&conn, &id, patch)?))
}

pub async fn delete(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    user.require_role(Role::Lab)?;
    let conn = ctx.lock_db()?;
    records::delete_test(&conn, &id)?;
    Ok(Json(MessageResponse::new("Test deleted")))
}

/// Email this test's report to the effective doctor.
pub async fn send_to_doctor(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<Uuid>,
    body: Option<Json<SendBody>>,
) -> Result<Json<MessageResponse>, ApiError> {
    user.require_role(Role::Lab)?;
    let explicit = body.as_ref().and_then(|b| b.doctor_email.as_deref());
    let conn = ctx.lock_db()?;
    report::send_test_report(&conn, ctx.mailer.as_ref(), &id, explicit)?;
    Ok(Json(MessageResponse::new("Report sent to doctor")))
}

/// Put this test on the effective doctor's inbox worklist.
pub async fn assign_to_doctor(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<Uuid>,
    body: Option<Json<SendBody>>,
) -> Result<(StatusCode, Json<InboxEntry>), ApiError> {
    user.require_role(Role::Lab)?;
    let explicit = body.as_ref().and_then(|b| b.doctor_email.as_deref());
    let conn = ctx.lock_db()?;
    let entry = inbox::assign_to_inbox(&conn, &id, explicit)?;
    Ok((StatusCode::CREATED, Json(entry)))
}
