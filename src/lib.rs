//! FHIR-lite server library
//!
//! Patient and Observation resources over a FHIR R4 style REST API,
//! backed by PostgreSQL.

pub mod api;
pub mod config;
pub mod domain;
pub mod fhir;
pub mod infrastructure;
