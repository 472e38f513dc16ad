//! Geographic primitives

use serde::{Deserialize, Serialize};

/// WGS84 latitude/longitude pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}
