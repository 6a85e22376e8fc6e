//! Test result CRUD. Responses carry the stored record plus its derived
//! evaluation (flag and range position), computed on the way out.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::endpoints::MessageResponse;
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, UserContext};
use crate::evaluator::{classify, position_fraction, ResultFlag};
use crate::models::{Role, TestResult};
use crate::records::{self, NewTestResult, TestResultPatch};

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub test_id: Option<Uuid>,
}

/// Stored result enriched with its evaluation.
#[derive(Debug, Serialize)]
pub struct TestResultView {
    #[serde(flatten)]
    pub result: TestResult,
    pub flag: ResultFlag,
    pub range_position: f64,
}

impl From<TestResult> for TestResultView {
    fn from(result: TestResult) -> Self {
        let flag = classify(result.value, result.normal_min, result.normal_max);
        let range_position =
            position_fraction(result.value, result.normal_min, result.normal_max);
        Self {
            result,
            flag,
            range_position,
        }
    }
}

pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Json(new): Json<NewTestResult>,
) -> Result<(StatusCode, Json<TestResultView>), ApiError> {
    user.require_role(Role::Lab)?;
    let conn = ctx.lock_db()?;
    let result = records::create_test_result(&conn, new)?;
    Ok((StatusCode::CREATED, Json(result.into())))
}

pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(_user): Extension<UserContext>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<TestResultView>>, ApiError> {
    let conn = ctx.lock_db()?;
    let results = records::list_test_results(&conn, query.test_id.as_ref())?;
    Ok(Json(results.into_iter().map(TestResultView::from).collect()))
}

pub async fn get(
    State(ctx): State<ApiContext>,
    Extension(_user): Extension<UserContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<TestResultView>, ApiError> {
    let conn = ctx.lock_db()?;
    Ok(Json(records::get_test_result(&conn, &id)?.into()))
}

pub async fn update(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<Uuid>,
    Json(patch): Json<TestResultPatch>,
) -> Result<Json<TestResultView>, ApiError> {
    user.require_role(Role::Lab)?;
    let conn = ctx.lock_db()?;
    Ok(Json(records::update_test_result(&conn, &id, patch)?.into()))
}

pub async fn delete(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    user.require_role(Role::Lab)?;
    let conn = ctx.lock_db()?;
    records::delete_test_result(&conn, &id)?;
    Ok(Json(MessageResponse::new("Test result deleted")))
}
