use std::str::FromStr;

use chrono::NaiveDate;
use rusqlite::{params, Connection};
use uuid::Uuid;

use super::DatabaseError;
use crate::models::*;

fn parse_uuid(s: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(s).map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))
}

fn parse_date(s: &str) -> Result<NaiveDate, DatabaseError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))
}

// ═══════════════════════════════════════════
// User Repository
// ═══════════════════════════════════════════

pub fn insert_user(conn: &Connection, user: &User) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO users (id, name, email, password_hash, role)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            user.id.to_string(),
            user.name,
            user.email,
            user.password_hash,
            user.role.as_str(),
        ],
    )?;
    Ok(())
}

pub fn get_user_by_email(conn: &Connection, email: &str) -> Result<Option<User>, DatabaseError> {
    user_query(
        conn,
        "SELECT id, name, email, password_hash, role FROM users WHERE email = ?1",
        email,
    )
}

struct UserRow {
    id: String,
    name: String,
    email: String,
    password_hash: String,
    role: String,
}

fn user_query(conn: &Connection, sql: &str, key: &str) -> Result<Option<User>, DatabaseError> {
    let mut stmt = conn.prepare(sql)?;
    let result = stmt.query_row(params![key], |row| {
        Ok(UserRow {
            id: row.get(0)?,
            name: row.get(1)?,
            email: row.get(2)?,
            password_hash: row.get(3)?,
            role: row.get(4)?,
        })
    });

    match result {
        Ok(row) => Ok(Some(User {
            id: parse_uuid(&row.id)?,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            role: Role::from_str(&row.role)?,
        })),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

// ═══════════════════════════════════════════
// Patient Repository
// ═══════════════════════════════════════════

pub fn insert_patient(conn: &Connection, patient: &Patient) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO patients (id, name, dob, gender, owner_user_id, doctor_email)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            patient.id.to_string(),
            patient.name,
            patient.dob.to_string(),
            patient.gender,
            patient.owner_user_id.map(|id| id.to_string()),
            patient.doctor_email,
        ],
    )?;
    Ok(())
}

pub fn get_patient(conn: &Connection, id: &Uuid) -> Result<Option<Patient>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, dob, gender, owner_user_id, doctor_email
         FROM patients WHERE id = ?1",
    )?;

    let result = stmt.query_row(params![id.to_string()], patient_row);

    match result {
        Ok(row) => Ok(Some(patient_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_patients(conn: &Connection) -> Result<Vec<Patient>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, dob, gender, owner_user_id, doctor_email
         FROM patients ORDER BY rowid",
    )?;

    let rows = stmt.query_map([], patient_row)?;

    let mut patients = Vec::new();
    for row in rows {
        patients.push(patient_from_row(row?)?);
    }
    Ok(patients)
}

pub fn update_patient(conn: &Connection, patient: &Patient) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE patients SET name = ?2, dob = ?3, gender = ?4,
         owner_user_id = ?5, doctor_email = ?6
         WHERE id = ?1",
        params![
            patient.id.to_string(),
            patient.name,
            patient.dob.to_string(),
            patient.gender,
            patient.owner_user_id.map(|id| id.to_string()),
            patient.doctor_email,
        ],
    )?;
    Ok(())
}

pub fn delete_patient(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    conn.execute("DELETE FROM patients WHERE id = ?1", params![id.to_string()])?;
    Ok(())
}

struct PatientRow {
    id: String,
    name: String,
    dob: String,
    gender: String,
    owner_user_id: Option<String>,
    doctor_email: Option<String>,
}

fn patient_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PatientRow> {
    Ok(PatientRow {
        id: row.get(0)?,
        name: row.get(1)?,
        dob: row.get(2)?,
        gender: row.get(3)?,
        owner_user_id: row.get(4)?,
        doctor_email: row.get(5)?,
    })
}

fn patient_from_row(row: PatientRow) -> Result<Patient, DatabaseError> {
    Ok(Patient {
        id: parse_uuid(&row.id)?,
        name: row.name,
        dob: parse_date(&row.dob)?,
        gender: row.gender,
        owner_user_id: row.owner_user_id.as_deref().map(parse_uuid).transpose()?,
        doctor_email: row.doctor_email,
    })
}

// ═══════════════════════════════════════════
// Test Repository
// ═══════════════════════════════════════════

pub fn insert_test(conn: &Connection, test: &LabTest) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO tests (id, test_type, date_taken, patient_id)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            test.id.to_string(),
            test.test_type,
            test.date_taken.to_string(),
            test.patient_id.to_string(),
        ],
    )?;
    Ok(())
}

pub fn get_test(conn: &Connection, id: &Uuid) -> Result<Option<LabTest>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, test_type, date_taken, patient_id FROM tests WHERE id = ?1",
    )?;

    let result = stmt.query_row(params![id.to_string()], test_row);

    match result {
        Ok(row) => Ok(Some(test_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// List tests, optionally restricted to one patient.
pub fn list_tests(
    conn: &Connection,
    patient_id: Option<&Uuid>,
) -> Result<Vec<LabTest>, DatabaseError> {
    let mut tests = Vec::new();
    match patient_id {
        Some(pid) => {
            let mut stmt = conn.prepare(
                "SELECT id, test_type, date_taken, patient_id FROM tests
                 WHERE patient_id = ?1 ORDER BY rowid",
            )?;
            let rows = stmt.query_map(params![pid.to_string()], test_row)?;
            for row in rows {
                tests.push(test_from_row(row?)?);
            }
        }
        None => {
            let mut stmt = conn.prepare(
                "SELECT id, test_type, date_taken, patient_id FROM tests ORDER BY rowid",
            )?;
            let rows = stmt.query_map([], test_row)?;
            for row in rows {
                tests.push(test_from_row(row?)?);
            }
        }
    }
    Ok(tests)
}

pub fn update_test(conn: &Connection, test: &LabTest) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE tests SET test_type = ?2, date_taken = ?3, patient_id = ?4 WHERE id = ?1",
        params![
            test.id.to_string(),
            test.test_type,
            test.date_taken.to_string(),
            test.patient_id.to_string(),
        ],
    )?;
    Ok(())
}

pub fn delete_test(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    conn.execute("DELETE FROM tests WHERE id = ?1", params![id.to_string()])?;
    Ok(())
}

struct TestRow {
    id: String,
    test_type: String,
    date_taken: String,
    patient_id: String,
}

fn test_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<TestRow> {
    Ok(TestRow {
        id: row.get(0)?,
        test_type: row.get(1)?,
        date_taken: row.get(2)?,
        patient_id: row.get(3)?,
    })
}

fn test_from_row(row: TestRow) -> Result<LabTest, DatabaseError> {
    Ok(LabTest {
        id: parse_uuid(&row.id)?,
        test_type: row.test_type,
        date_taken: parse_date(&row.date_taken)?,
        patient_id: parse_uuid(&row.patient_id)?,
    })
}

// ═══════════════════════════════════════════
// Test Result Repository
// ═══════════════════════════════════════════

pub fn insert_test_result(conn: &Connection, result: &TestResult) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO test_results (id, parameter_name, value, unit, normal_min, normal_max, test_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            result.id.to_string(),
            result.parameter_name,
            result.value,
            result.unit,
            result.normal_min,
            result.normal_max,
            result.test_id.to_string(),
        ],
    )?;
    Ok(())
}

pub fn get_test_result(conn: &Connection, id: &Uuid) -> Result<Option<TestResult>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, parameter_name, value, unit, normal_min, normal_max, test_id
         FROM test_results WHERE id = ?1",
    )?;

    let result = stmt.query_row(params![id.to_string()], test_result_row);

    match result {
        Ok(row) => Ok(Some(test_result_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// List results, optionally restricted to one test.
pub fn list_test_results(
    conn: &Connection,
    test_id: Option<&Uuid>,
) -> Result<Vec<TestResult>, DatabaseError> {
    let mut results = Vec::new();
    match test_id {
        Some(tid) => {
            let mut stmt = conn.prepare(
                "SELECT id, parameter_name, value, unit, normal_min, normal_max, test_id
                 FROM test_results WHERE test_id = ?1 ORDER BY rowid",
            )?;
            let rows = stmt.query_map(params![tid.to_string()], test_result_row)?;
            for row in rows {
                results.push(test_result_from_row(row?)?);
            }
        }
        None => {
            let mut stmt = conn.prepare(
                "SELECT id, parameter_name, value, unit, normal_min, normal_max, test_id
                 FROM test_results ORDER BY rowid",
            )?;
            let rows = stmt.query_map([], test_result_row)?;
            for row in rows {
                results.push(test_result_from_row(row?)?);
            }
        }
    }
    Ok(results)
}

pub fn update_test_result(conn: &Connection, result: &TestResult) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE test_results SET parameter_name = ?2, value = ?3, unit = ?4,
         normal_min = ?5, normal_max = ?6, test_id = ?7
         WHERE id = ?1",
        params![
            result.id.to_string(),
            result.parameter_name,
            result.value,
            result.unit,
            result.normal_min,
            result.normal_max,
            result.test_id.to_string(),
        ],
    )?;
    Ok(())
}

pub fn delete_test_result(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    conn.execute(
        "DELETE FROM test_results WHERE id = ?1",
        params![id.to_string()],
    )?;
    Ok(())
}

struct TestResultRow {
    id: String,
    parameter_name: String,
    value: f64,
    unit: String,
    normal_min: f64,
    normal_max: f64,
    test_id: String,
}

fn test_result_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<TestResultRow> {
    Ok(TestResultRow {
        id: row.get(0)?,
        parameter_name: row.get(1)?,
        value: row.get(2)?,
        unit: row.get(3)?,
        normal_min: row.get(4)?,
        normal_max: row.get(5)?,
        test_id: row.get(6)?,
    })
}

fn test_result_from_row(row: TestResultRow) -> Result<TestResult, DatabaseError> {
    Ok(TestResult {
        id: parse_uuid(&row.id)?,
        parameter_name: row.parameter_name,
        value: row.value,
        unit: row.unit,
        normal_min: row.normal_min,
        normal_max: row.normal_max,
        test_id: parse_uuid(&row.test_id)?,
    })
}

// ═══════════════════════════════════════════
// Doctor Inbox Repository
// ═══════════════════════════════════════════

pub fn insert_inbox_entry(conn: &Connection, entry: &InboxEntry) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO doctor_inbox (id, doctor_email, test_id) VALUES (?1, ?2, ?3)",
        params![
            entry.id.to_string(),
            entry.doctor_email,
            entry.test_id.to_string(),
        ],
    )?;
    Ok(())
}

/// All inbox entries addressed to one doctor, in assignment order.
pub fn list_inbox_entries(
    conn: &Connection,
    doctor_email: &str,
) -> Result<Vec<InboxEntry>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, doctor_email, test_id FROM doctor_inbox
         WHERE doctor_email = ?1 ORDER BY rowid",
    )?;

    let rows = stmt.query_map(params![doctor_email], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
        ))
    })?;

    let mut entries = Vec::new();
    for row in rows {
        let (id, doctor_email, test_id) = row?;
        entries.push(InboxEntry {
            id: parse_uuid(&id)?,
            doctor_email,
            test_id: parse_uuid(&test_id)?,
        });
    }
    Ok(entries)
}
