//! Record CRUD service for patients, tests, and test results.
//!
//! Validation and referential integrity live here, at the boundary: a test
//! must reference an existing patient and a result an existing test at
//! creation time. Updates use partial-merge semantics (unsupplied fields
//! stay untouched). Deletes are permanent and never cascade — orphaned
//! children are a documented policy, not an accident.

use chrono::NaiveDate;
use rusqlite::Connection;
use serde::Deserialize;
use uuid::Uuid;

use crate::db::{repository, DatabaseError};
use crate::mailer::MailError;
use crate::models::{LabTest, Patient, TestResult};

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("{0}")]
    InvalidState(String),

    #[error("mail delivery failed: {0}")]
    Delivery(#[from] MailError),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl ServiceError {
    pub(crate) fn not_found(entity: &'static str, id: &Uuid) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

fn require_text(field: &'static str, value: &str) -> Result<(), ServiceError> {
    if value.trim().is_empty() {
        return Err(ServiceError::Validation(format!("{field} is required")));
    }
    Ok(())
}

// ═══════════════════════════════════════════
// Patients
// ═══════════════════════════════════════════

#[derive(Debug, Clone, Deserialize)]
pub struct NewPatient {
    pub name: String,
    pub dob: NaiveDate,
    pub gender: String,
    pub owner_user_id: Option<Uuid>,
    pub doctor_email: Option<String>,
}

/// Partial update: `None` means "leave unchanged". Optional fields cannot
/// be cleared through a patch, matching the original full-record PUT.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PatientPatch {
    pub name: Option<String>,
    pub dob: Option<NaiveDate>,
    pub gender: Option<String>,
    pub owner_user_id: Option<Uuid>,
    pub doctor_email: Option<String>,
}

pub fn create_patient(conn: &Connection, new: NewPatient) -> Result<Patient, ServiceError> {
    require_text("name", &new.name)?;
    require_text("gender", &new.gender)?;

    let patient = Patient {
        id: Uuid::new_v4(),
        name: new.name,
        dob: new.dob,
        gender: new.gender,
        owner_user_id: new.owner_user_id,
        doctor_email: new.doctor_email,
    };
    repository::insert_patient(conn, &patient)?;
    Ok(patient)
}

pub fn get_patient(conn: &Connection, id: &Uuid) -> Result<Patient, ServiceError> {
    repository::get_patient(conn, id)?.ok_or_else(|| ServiceError::not_found("patient", id))
}

pub fn list_patients(conn: &Connection) -> Result<Vec<Patient>, ServiceError> {
    Ok(repository::list_patients(conn)?)
}

pub fn update_patient(
    conn: &Connection,
    id: &Uuid,
    patch: PatientPatch,
) -> Result<Patient, ServiceError> {
    let mut patient = get_patient(conn, id)?;

    if let Some(name) = patch.name {
        require_text("name", &name)?;
        patient.name = name;
    }
    if let Some(dob) = patch.dob {
        patient.dob = dob;
    }
    if let Some(gender) = patch.gender {
        require_text("gender", &gender)?;
        patient.gender = gender;
    }
    if let Some(owner) = patch.owner_user_id {
        patient.owner_user_id = Some(owner);
    }
    if let Some(email) = patch.doctor_email {
        patient.doctor_email = Some(email);
    }

    repository::update_patient(conn, &patient)?;
    Ok(patient)
}

pub fn delete_patient(conn: &Connection, id: &Uuid) -> Result<(), ServiceError> {
    get_patient(conn, id)?;
    repository::delete_patient(conn, id)?;
    Ok(())
}

// ═══════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════

#[derive(Debug, Clone, Deserialize)]
pub struct NewTest {
    pub test_type: String,
    pub date_taken: NaiveDate,
    pub patient_id: Uuid,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TestPatch {
    pub test_type: Option<String>,
    pub date_taken: Option<NaiveDate>,
    pub patient_id: Option<Uuid>,
}

pub fn create_test(conn: &Connection, new: NewTest) -> Result<LabTest, ServiceError> {
    require_text("test_type", &new.test_type)?;
    // Referential integrity: the parent patient must exist.
    get_patient(conn, &new.patient_id)?;

    let test = LabTest {
        id: Uuid::new_v4(),
        test_type: new.test_type,
        date_taken: new.date_taken,
        patient_id: new.patient_id,
    };
    repository::insert_test(conn, &test)?;
    Ok(test)
}

pub fn get_test(conn: &Connection, id: &Uuid) -> Result<LabTest, ServiceError> {
    repository::get_test(conn, id)?.ok_or_else(|| ServiceError::not_found("test", id))
}

pub fn list_tests(
    conn: &Connection,
    patient_id: Option<&Uuid>,
) -> Result<Vec<LabTest>, ServiceError> {
    Ok(repository::list_tests(conn, patient_id)?)
}

pub fn update_test(conn: &Connection, id: &Uuid, patch: TestPatch) -> Result<LabTest, ServiceError> {
    let mut test = get_test(conn, id)?;

    if let Some(test_type) = patch.test_type {
        require_text("test_type", &test_type)?;
        test.test_type = test_type;
    }
    if let Some(date_taken) = patch.date_taken {
        test.date_taken = date_taken;
    }
    if let Some(patient_id) = patch.patient_id {
        // Re-pointing a test still requires an existing patient.
        get_patient(conn, &patient_id)?;
        test.patient_id = patient_id;
    }

    repository::update_test(conn, &test)?;
    Ok(test)
}

pub fn delete_test(conn: &Connection, id: &Uuid) -> Result<(), ServiceError> {
    get_test(conn, id)?;
    repository::delete_test(conn, id)?;
    Ok(())
}

// ═══════════════════════════════════════════
// Test results
// ═══════════════════════════════════════════

#[derive(Debug, Clone, Deserialize)]
pub struct NewTestResult {
    pub parameter_name: String,
    pub value: f64,
    pub unit: String,
    pub normal_min: f64,
    pub normal_max: f64,
    pub test_id: Uuid,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TestResultPatch {
    pub parameter_name: Option<String>,
    pub value: Option<f64>,
    pub unit: Option<String>,
    pub normal_min: Option<f64>,
    pub normal_max: Option<f64>,
    pub test_id: Option<Uuid>,
}

pub fn create_test_result(
    conn: &Connection,
    new: NewTestResult,
) -> Result<TestResult, ServiceError> {
    require_text("parameter_name", &new.parameter_name)?;
    require_text("unit", &new.unit)?;
    get_test(conn, &new.test_id)?;

    let result = TestResult {
        id: Uuid::new_v4(),
        parameter_name: new.parameter_name,
        value: new.value,
        unit: new.unit,
        normal_min: new.normal_min,
        normal_max: new.normal_max,
        test_id: new.test_id,
    };
    repository::insert_test_result(conn, &result)?;
    Ok(result)
}

pub fn get_test_result(conn: &Connection, id: &Uuid) -> Result<TestResult, ServiceError> {
    repository::get_test_result(conn, id)?
        .ok_or_else(|| ServiceError::not_found("test result", id))
}

pub fn list_test_results(
    conn: &Connection,
    test_id: Option<&Uuid>,
) -> Result<Vec<TestResult>, ServiceError> {
    Ok(repository::list_test_results(conn, test_id)?)
}

pub fn update_test_result(
    conn: &Connection,
    id: &Uuid,
    patch: TestResultPatch,
) -> Result<TestResult, ServiceError> {
    let mut result = get_test_result(conn, id)?;

    if let Some(parameter_name) = patch.parameter_name {
        require_text("parameter_name", &parameter_name)?;
        result.parameter_name = parameter_name;
    }
    if let Some(value) = patch.value {
        result.value = value;
    }
    if let Some(unit) = patch.unit {
        require_text("unit", &unit)?;
        result.unit = unit;
    }
    if let Some(normal_min) = patch.normal_min {
        result.normal_min = normal_min;
    }
    if let Some(normal_max) = patch.normal_max {
        result.normal_max = normal_max;
    }
    if let Some(test_id) = patch.test_id {
        get_test(conn, &test_id)?;
        result.test_id = test_id;
    }

    repository::update_test_result(conn, &result)?;
    Ok(result)
}

pub fn delete_test_result(conn: &Connection, id: &Uuid) -> Result<(), ServiceError> {
    get_test_result(conn, id)?;
    repository::delete_test_result(conn, id)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_memory_database;

    fn new_patient() -> NewPatient {
        NewPatient {
            name: "Jane Doe".into(),
            dob: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            gender: "female".into(),
            owner_user_id: None,
            doctor_email: None,
        }
    }

    #[test]
    fn create_patient_rejects_blank_name() {
        let conn = open_memory_database().unwrap();
        let result = create_patient(
            &conn,
            NewPatient {
                name: "  ".into(),
                ..new_patient()
            },
        );
        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[test]
    fn get_is_idempotent() {
        let conn = open_memory_database().unwrap();
        let patient = create_patient(&conn, new_patient()).unwrap();

        let first = get_patient(&conn, &patient.id).unwrap();
        let second = get_patient(&conn, &patient.id).unwrap();
        assert_eq!(first.name, second.name);
        assert_eq!(first.dob, second.dob);
        assert_eq!(first.doctor_email, second.doctor_email);
    }

    #[test]
    fn create_test_requires_existing_patient() {
        let conn = open_memory_database().unwrap();
        let result = create_test(
            &conn,
            NewTest {
                test_type: "CBC".into(),
                date_taken: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
                patient_id: Uuid::new_v4(),
            },
        );
        assert!(matches!(
            result,
            Err(ServiceError::NotFound { entity: "patient", .. })
        ));
    }

    #[test]
    fn create_result_requires_existing_test() {
        let conn = open_memory_database().unwrap();
        let result = create_test_result(
            &conn,
            NewTestResult {
                parameter_name: "Hemoglobin".into(),
                value: 12.0,
                unit: "g/dL".into(),
                normal_min: 13.5,
                normal_max: 17.5,
                test_id: Uuid::new_v4(),
            },
        );
        assert!(matches!(
            result,
            Err(ServiceError::NotFound { entity: "test", .. })
        ));
    }

    #[test]
    fn partial_update_merges_supplied_fields_only() {
        let conn = open_memory_database().unwrap();
        let patient = create_patient(
            &conn,
            NewPatient {
                doctor_email: Some("doc@example.com".into()),
                ..new_patient()
            },
        )
        .unwrap();

        let updated = update_patient(
            &conn,
            &patient.id,
            PatientPatch {
                name: Some("Jane Smith".into()),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(updated.name, "Jane Smith");
        assert_eq!(updated.dob, patient.dob);
        assert_eq!(updated.gender, patient.gender);
        assert_eq!(updated.doctor_email.as_deref(), Some("doc@example.com"));

        // Stored state matches the returned merge.
        let stored = get_patient(&conn, &patient.id).unwrap();
        assert_eq!(stored.name, "Jane Smith");
        assert_eq!(stored.doctor_email.as_deref(), Some("doc@example.com"));
    }

    #[test]
    fn update_missing_record_is_not_found() {
        let conn = open_memory_database().unwrap();
        let result = update_patient(&conn, &Uuid::new_v4(), PatientPatch::default());
        assert!(matches!(result, Err(ServiceError::NotFound { .. })));
    }

    #[test]
    fn delete_missing_record_is_not_found() {
        let conn = open_memory_database().unwrap();
        assert!(matches!(
            delete_test(&conn, &Uuid::new_v4()),
            Err(ServiceError::NotFound { .. })
        ));
    }

    #[test]
    fn deleting_patient_does_not_cascade_to_tests() {
        let conn = open_memory_database().unwrap();
        let patient = create_patient(&conn, new_patient()).unwrap();
        let test = create_test(
            &conn,
            NewTest {
                test_type: "CBC".into(),
                date_taken: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
                patient_id: patient.id,
            },
        )
        .unwrap();

        delete_patient(&conn, &patient.id).unwrap();

        assert!(matches!(
            get_patient(&conn, &patient.id),
            Err(ServiceError::NotFound { .. })
        ));
        // The orphaned test still resolves.
        assert_eq!(get_test(&conn, &test.id).unwrap().id, test.id);
    }

    #[test]
    fn duplicate_parameter_names_are_allowed() {
        let conn = open_memory_database().unwrap();
        let patient = create_patient(&conn, new_patient()).unwrap();
        let test = create_test(
            &conn,
            NewTest {
                test_type: "CBC".into(),
                date_taken: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
                patient_id: patient.id,
            },
        )
        .unwrap();

        for value in [12.0, 12.4] {
            create_test_result(
                &conn,
                NewTestResult {
                    parameter_name: "Hemoglobin".into(),
                    value,
                    unit: "g/dL".into(),
                    normal_min: 13.5,
                    normal_max: 17.5,
                    test_id: test.id,
                },
            )
            .unwrap();
        }

        let results = list_test_results(&conn, Some(&test.id)).unwrap();
        assert_eq!(results.len(), 2);
    }
}
