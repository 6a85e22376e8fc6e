use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A patient record owned by the lab user who created it.
///
/// `doctor_email` is the default recipient for this patient's reports;
/// send/assign operations may override it per call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    pub name: String,
    pub dob: NaiveDate,
    pub gender: String,
    pub owner_user_id: Option<Uuid>,
    pub doctor_email: Option<String>,
}
