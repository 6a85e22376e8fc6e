//! LabTracker: a laboratory test-result tracking backend.
//!
//! SQLite storage behind a small repository layer, a record service with
//! referential checks, a pure result evaluator, and a doctor workflow
//! (email reports and an inbox worklist), exposed over a REST API.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod evaluator;
pub mod inbox;
pub mod mailer;
pub mod models;
pub mod records;
pub mod report;
