//! FieldCalc Core - survey point model, polygon geometry, and declination
//!
//! This crate contains the computational heart of the FieldCalc survey
//! calculator: the point-set model, the polygon metrics engine, the clockwise
//! ordering normalizer, coordinate transforms, and the magnetic declination
//! resolver, plus the format adapters that serialize results.

pub mod config;
pub mod declination;
pub mod error;
pub mod formats;
pub mod geo;
pub mod models;

pub use error::{FieldcalcError, Result};
