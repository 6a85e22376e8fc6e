//! Patient CRUD and the patient-level report send.
//!
//! Reads are open to any authenticated user; mutations and report sends
//! require the `lab` role.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::endpoints::MessageResponse;
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, UserContext};
use crate::models::{Patient, Role};
use crate::records::{self, NewPatient, PatientPatch};
use crate::report;

/// Optional body for send/assign endpoints; an explicit address
/// overrides the patient's stored doctor email.
#[derive(Debug, Deserialize)]
pub struct SendBody {
    pub doctor_email: Option<String>,
}

pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Json(new): Json<NewPatient>,
) -> Result<(StatusCode, Json<Patient>), ApiError> {
    user.require_role(Role::Lab)?;
    let conn = ctx.lock_db()?;
    let patient = records::create_patient(&conn, new)?;
    Ok((StatusCode::CREATED, Json(patient)))
}

pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(_user): Extension<UserContext>,
) -> Result<Json<Vec<Patient>>, ApiError> {
    let conn = ctx.lock_db()?;
    Ok(Json(records::list_patients(&conn)?))
}

pub async fn get(
    State(ctx): State<ApiContext>,
    Extension(_user): Extension<UserContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<Patient>, ApiError> {
    let conn = ctx.lock_db()?;
    Ok(Json(records::get_patient(&conn, &id)?))
}

pub async fn update(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<Uuid>,
    Json(patch): Json<PatientPatch>,
) -> Result<Json<Patient>, ApiError> {
    user.require_role(Role::Lab)?;
    let conn = ctx.lock_db()?;
    Ok(Json(records::update_patient(&conn, &id, patch)?))
}

pub async fn delete(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    user.require_role(Role::Lab)?;
    let conn = ctx.lock_db()?;
    records::delete_patient(&conn, &id)?;
    Ok(Json(MessageResponse::new("Patient deleted")))
}

/// Email all of the patient's tests and results to the effective doctor.
pub async fn send_results(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<Uuid>,
    body: Option<Json<SendBody>>,
) -> Result<Json<MessageResponse>, ApiError> {
    user.require_role(Role::Lab)?;
    let explicit = body.as_ref().and_then(|b| b.doctor_email.as_deref());
    let conn = ctx.lock_db()?;
    report::send_patient_report(&conn, ctx.mailer.as_ref(), &id, explicit)?;
    Ok(Json(MessageResponse::new("Results sent to doctor")))
}
