//! Business logic services

pub mod estimator;
pub mod export;
pub mod nominatim;
pub mod optimizer;
pub mod routing;
pub mod schedule;
