use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One measured parameter belonging to a test.
///
/// Duplicate `parameter_name` values within a test are allowed — they
/// represent re-measurements. `normal_min <= normal_max` is expected but
/// not enforced; the evaluator applies the literal comparisons either way.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub id: Uuid,
    pub parameter_name: String,
    pub value: f64,
    pub unit: String,
    pub normal_min: f64,
    pub normal_max: f64,
    pub test_id: Uuid,
}
