// src/models/mod.rs
// DOCUMENTATION: Models module organization
// PURPOSE: Re-export model components

pub mod appointment;
pub mod geo;
pub mod medical_record;
pub mod opening_hours;
pub mod place;
pub mod prescription;
pub mod product;
pub mod user;

pub use appointment::*;
pub use geo::*;
pub use medical_record::*;
pub use opening_hours::*;
pub use place::*;
pub use prescription::*;
pub use product::*;
pub use user::*;
