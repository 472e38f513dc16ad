//! Built-in operational constants and the named depot set.
//!
//! These are the fallback values for the five schedule tunables; every one
//! of them can be overridden through the environment (see `config`).

pub const DEFAULT_STOP_DWELL_MINUTES: i64 = 45;
pub const DEFAULT_MEAL_BREAK_MINUTES: i64 = 120;
pub const DEFAULT_DELIVERY_WINDOW_MINUTES: i64 = 240;
pub const DEFAULT_ROUNDING_GRID_MINUTES: i64 = 15;
pub const DEFAULT_DRIVE_BUFFER_FRACTION: f64 = 0.30;

/// Depots selectable by name on the command line.
pub fn known_depots() -> &'static [(&'static str, &'static str)] {
    &[
        ("duncan", "1 Tungsten Way, Duncan, SC"),
        ("lilburn", "4600 Lawrenceville Hwy, Lilburn, GA"),
    ]
}

/// Resolve a depot argument: a known depot name wins, anything else is
/// treated as a raw address.
pub fn resolve_depot(input: &str) -> String {
    known_depots()
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(input.trim()))
        .map(|(_, address)| address.to_string())
        .unwrap_or_else(|| input.trim().to_string())
}
