//! HTML report rendering and the send-to-doctor workflow.
//!
//! Reports are inline-styled HTML tables (one per test) so they render in
//! any mail client. Transport failure is a delivery error, distinct from
//! validation, and nothing is retried.

use std::fmt::Write as _;

use rusqlite::Connection;
use uuid::Uuid;

use crate::db::repository;
use crate::evaluator::classify;
use crate::inbox::resolve_doctor_email;
use crate::mailer::{MailTransport, OutgoingEmail};
use crate::models::{LabTest, Patient, TestResult};
use crate::records::{self, ServiceError};

const TD: &str = "padding:4px 8px;border:1px solid #e5e7eb";
const TH: &str = "text-align:left;padding:6px 8px;border:1px solid #e5e7eb";

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

fn render_results_table(results: &[TestResult]) -> String {
    let mut rows = String::new();
    for r in results {
        let flag = classify(r.value, r.normal_min, r.normal_max);
        // Out-of-range values are highlighted in red.
        let flag_style = if flag.is_outside_range() {
            format!("{TD};color:#b91c1c;font-weight:bold")
        } else {
            TD.to_string()
        };
        let _ = write!(
            rows,
            "<tr>\
             <td style=\"{TD}\">{}</td>\
             <td style=\"{TD}\">{} {}</td>\
             <td style=\"{TD}\">{}-{}</td>\
             <td style=\"{flag_style}\">{}</td>\
             </tr>",
            escape_html(&r.parameter_name),
            r.value,
            escape_html(&r.unit),
            r.normal_min,
            r.normal_max,
            flag.as_str(),
        );
    }
    if rows.is_empty() {
        rows = "<tr><td colspan=\"4\" style=\"padding:6px 8px;border:1px solid #e5e7eb;\
                color:#6b7280\">No results</td></tr>"
            .to_string();
    }

    format!(
        "<table cellspacing=\"0\" cellpadding=\"0\" style=\"border-collapse:collapse;\
         font-family:Arial,Helvetica,sans-serif;font-size:14px\">\
         <thead><tr>\
         <th style=\"{TH}\">Parameter</th>\
         <th style=\"{TH}\">Value</th>\
         <th style=\"{TH}\">Normal Range</th>\
         <th style=\"{TH}\">Flag</th>\
         </tr></thead>\
         <tbody>{rows}</tbody></table>"
    )
}

/// Report for a single test: patient heading, test line, results table.
pub fn render_test_report(patient: &Patient, test: &LabTest, results: &[TestResult]) -> String {
    format!(
        "<div style=\"font-family:Arial,Helvetica,sans-serif;font-size:14px;color:#111827\">\
         <h2 style=\"margin:0 0 8px\">Lab Result for {}</h2>\
         <div style=\"margin-bottom:12px;color:#374151\">Test: {} &bull; Date: {}</div>{}</div>",
        escape_html(&patient.name),
        escape_html(&test.test_type),
        test.date_taken,
        render_results_table(results),
    )
}

/// Patient-level report: one section per test, each with its own table.
pub fn render_patient_report(patient: &Patient, tests: &[(LabTest, Vec<TestResult>)]) -> String {
    let mut sections = String::new();
    for (test, results) in tests {
        let _ = write!(
            sections,
            "<h3 style=\"margin:16px 0 8px\">{} ({})</h3>{}",
            escape_html(&test.test_type),
            test.date_taken,
            render_results_table(results),
        );
    }
    if sections.is_empty() {
        sections = "<div>No tests found.</div>".to_string();
    }

    format!(
        "<div style=\"font-family:Arial,Helvetica,sans-serif;font-size:14px;color:#111827\">\
         <h2 style=\"margin:0 0 8px\">Lab Results: {}</h2>\
         <div style=\"margin-bottom:16px;color:#374151\">DOB: {} &bull; Gender: {}</div>{}</div>",
        escape_html(&patient.name),
        patient.dob,
        escape_html(&patient.gender),
        sections,
    )
}

/// Email one test's results to the effective doctor.
pub fn send_test_report(
    conn: &Connection,
    mailer: &dyn MailTransport,
    test_id: &Uuid,
    explicit_email: Option<&str>,
) -> Result<(), ServiceError> {
    let test = records::get_test(conn, test_id)?;
    let patient = records::get_patient(conn, &test.patient_id)?;
    let doctor_email = resolve_doctor_email(explicit_email, &patient)?;

    let results = repository::list_test_results(conn, Some(&test.id))?;
    let html_body = render_test_report(&patient, &test, &results);

    mailer.send(&OutgoingEmail {
        to: doctor_email,
        subject: format!("Lab Result: {} - {}", patient.name, test.test_type),
        html_body,
    })?;
    Ok(())
}

/// Email all of a patient's tests, each with its own results.
pub fn send_patient_report(
    conn: &Connection,
    mailer: &dyn MailTransport,
    patient_id: &Uuid,
    explicit_email: Option<&str>,
) -> Result<(), ServiceError> {
    let patient = records::get_patient(conn, patient_id)?;
    let doctor_email = resolve_doctor_email(explicit_email, &patient)?;

    let tests = repository::list_tests(conn, Some(&patient.id))?;
    let mut sections = Vec::with_capacity(tests.len());
    for test in tests {
        let results = repository::list_test_results(conn, Some(&test.id))?;
        sections.push((test, results));
    }
    let html_body = render_patient_report(&patient, &sections);

    mailer.send(&OutgoingEmail {
        to: doctor_email,
        subject: format!("Lab Results for {}", patient.name),
        html_body,
    })?;
    Ok(())
}
