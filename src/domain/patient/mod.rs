// Patient domain module
// Contains the patient aggregate root and its value objects

#![allow(clippy::module_inception)]

pub mod patient;
pub mod value_objects;

pub use patient::Patient;
pub use value_objects::Gender;
