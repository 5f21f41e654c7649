#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod config;
pub mod dataset;
pub mod error;
pub mod loader;
pub mod types;

pub use dataset::{Dataset, DatasetExtents};
pub use error::{Error, Result};
pub use types::{Bounds, Dimension, NumericField, VehicleRecord, VehicleType};
