pub mod auth;
pub mod doctor;
pub mod health;
pub mod lab_tests;
pub mod patients;
pub mod test_results;

use serde::Serialize;

/// Generic confirmation body for deletes and workflow actions.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
