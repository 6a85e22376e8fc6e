//! Doctor inbox workflow: assign a test's results to a doctor's worklist
//! and fetch that worklist with its joined context.
//!
//! Assignment and email reports are independent mechanisms — an inbox row
//! already written is never rolled back by a later mail failure.

use std::collections::HashMap;

use rusqlite::Connection;
use serde::Serialize;
use uuid::Uuid;

use crate::db::repository;
use crate::models::{InboxEntry, LabTest, Patient, TestResult};
use crate::records::{self, ServiceError};

/// Resolve the recipient for a send/assign call: an explicit email wins
/// over the patient's stored one.
pub(crate) fn resolve_doctor_email(
    explicit: Option<&str>,
    patient: &Patient,
) -> Result<String, ServiceError> {
    let explicit = explicit.map(str::trim).filter(|e| !e.is_empty());
    let stored = patient.doctor_email.as_deref().filter(|e| !e.is_empty());

    explicit.or(stored).map(str::to_owned).ok_or_else(|| {
        ServiceError::Validation("doctor email not set for this patient".into())
    })
}

/// Assign a test to a doctor's inbox. Repeated assignments of the same
/// (doctor, test) pair create additional rows — there is no dedup.
pub fn assign_to_inbox(
    conn: &Connection,
    test_id: &Uuid,
    explicit_email: Option<&str>,
) -> Result<InboxEntry, ServiceError> {
    let test = records::get_test(conn, test_id)?;
    let patient = records::get_patient(conn, &test.patient_id)?;
    let doctor_email = resolve_doctor_email(explicit_email, &patient)?;

    let entry = InboxEntry {
        id: Uuid::new_v4(),
        doctor_email,
        test_id: test.id,
    };
    repository::insert_inbox_entry(conn, &entry)?;
    tracing::info!(test_id = %test.id, doctor = %entry.doctor_email, "Test assigned to doctor inbox");
    Ok(entry)
}

/// One inbox entry joined with its test, the test's patient, and results.
///
/// `test`/`patient` are `None` when the underlying record was deleted
/// after assignment (deletes do not cascade into the inbox).
#[derive(Debug, Serialize)]
pub struct InboxItem {
    pub id: Uuid,
    pub doctor_email: String,
    pub test: Option<LabTest>,
    pub patient: Option<Patient>,
    pub results: Vec<TestResult>,
}

/// Fetch a doctor's worklist. Patient lookups are memoized per call so
/// entries sharing a patient hit the store once.
pub fn fetch_inbox(conn: &Connection, doctor_email: &str) -> Result<Vec<InboxItem>, ServiceError> {
    if doctor_email.trim().is_empty() {
        return Err(ServiceError::Validation("email query is required".into()));
    }

    let entries = repository::list_inbox_entries(conn, doctor_email)?;

    let mut patients: HashMap<Uuid, Option<Patient>> = HashMap::new();
    let mut items = Vec::with_capacity(entries.len());

    for entry in entries {
        let test = repository::get_test(conn, &entry.test_id)?;

        let (patient, results) = match &test {
            Some(test) => {
                if !patients.contains_key(&test.patient_id) {
                    let fetched = repository::get_patient(conn, &test.patient_id)?;
                    patients.insert(test.patient_id, fetched);
                }
                let patient = patients[&test.patient_id].clone();
                let results = repository::list_test_results(conn, Some(&test.id))?;
                (patient, results)
            }
            None => (None, Vec::new()),
        };

        items.push(InboxItem {
            id: entry.id,
            doctor_email: entry.doctor_email,
            test,
            patient,
            results,
        });
    }

    Ok(items)
}
