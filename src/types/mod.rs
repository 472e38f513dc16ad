//! Type definitions

pub mod geo;
pub mod schedule;
pub mod stop;

pub use geo::*;
pub use schedule::*;
pub use stop::*;
