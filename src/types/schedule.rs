//! Route context and schedule row types.

use chrono::NaiveDateTime;

/// Identifier used for the synthetic depot-return row.
pub const RETURN_LOC_ID: &str = "RETURN";

/// Per-run route parameters. Supplied once, immutable.
#[derive(Debug, Clone)]
pub struct RouteContext {
    pub route_name: String,
    pub departure: NaiveDateTime,
    pub depot_address: String,
}

/// One line of the generated schedule.
///
/// For delivery stops the window is [arrival, arrival + delivery window];
/// for the terminal return row it spans the earliest and latest estimated
/// return including the meal break.
#[derive(Debug, Clone)]
pub struct ScheduleRow {
    pub route: String,
    pub loc_id: String,
    pub address: String,
    pub arrival: NaiveDateTime,
    pub window_start: NaiveDateTime,
    pub window_end: NaiveDateTime,
}

impl ScheduleRow {
    pub fn is_return(&self) -> bool {
        self.loc_id == RETURN_LOC_ID
    }

    /// Arrival rendered as a 12-hour clock string ("08:15 AM").
    pub fn arrival_label(&self) -> String {
        format_clock(self.arrival)
    }

    /// Delivery window rendered as "08:15 AM – 12:15 PM".
    pub fn window_label(&self) -> String {
        format!(
            "{} – {}",
            format_clock(self.window_start),
            format_clock(self.window_end)
        )
    }
}

/// 12-hour clock rendering used in the exported spreadsheet.
pub fn format_clock(t: NaiveDateTime) -> String {
    t.format("%I:%M %p").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn dt(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 2)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn clock_format_is_twelve_hour_with_meridiem() {
        assert_eq!(format_clock(dt(8, 15)), "08:15 AM");
        assert_eq!(format_clock(dt(14, 0)), "02:00 PM");
        assert_eq!(format_clock(dt(0, 5)), "12:05 AM");
        assert_eq!(format_clock(dt(12, 30)), "12:30 PM");
    }

    #[test]
    fn window_label_joins_both_ends() {
        let row = ScheduleRow {
            route: "TNT9999".to_string(),
            loc_id: "FSC1".to_string(),
            address: "12 Main St".to_string(),
            arrival: dt(9, 0),
            window_start: dt(9, 0),
            window_end: dt(13, 0),
        };

        assert_eq!(row.window_label(), "09:00 AM – 01:00 PM");
        assert!(!row.is_return());
    }

    #[test]
    fn return_sentinel_is_recognised() {
        let row = ScheduleRow {
            route: "TNT9999".to_string(),
            loc_id: RETURN_LOC_ID.to_string(),
            address: "1 Tungsten Way, Duncan, SC".to_string(),
            arrival: dt(14, 0),
            window_start: dt(14, 0),
            window_end: dt(14, 15),
        };

        assert!(row.is_return());
    }
}
