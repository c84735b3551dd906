// Observation domain module
// Contains the observation aggregate root and its value objects

#![allow(clippy::module_inception)]

pub mod observation;
pub mod value_objects;

pub use observation::Observation;
pub use value_objects::{patient_id_from_reference, ObservationStatus};
