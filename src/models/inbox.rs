use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Assignment of a test's results to a doctor's worklist.
///
/// Pure join record: "assigned" is modeled by row existence, there is no
/// status field and no deduplication of repeated assignments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboxEntry {
    pub id: Uuid,
    pub doctor_email: String,
    pub test_id: Uuid,
}
