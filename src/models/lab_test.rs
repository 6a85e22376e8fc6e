use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A diagnostic procedure performed on a patient on a given date.
/// `test_type` is free text ("Complete Blood Count", "Lipid Panel", ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabTest {
    pub id: Uuid,
    pub test_type: String,
    pub date_taken: NaiveDate,
    pub patient_id: Uuid,
}
