//! Schedule construction for a single delivery route.
//!
//! Given the route context and the stops in visiting order, this module
//! walks the route sequentially and computes arrival times and delivery
//! windows for each stop, then the depot return. It does not reorder the
//! stops; ordering is the optimizer's job.

use chrono::{DateTime, Duration, NaiveDateTime};

use crate::types::{RouteContext, ScheduleRow, Stop, RETURN_LOC_ID};

use super::estimator::DriveTimeEstimator;
use super::routing::DirectionsError;

/// The operational constants of schedule construction. Deployments share
/// the algorithm; the constants differ per fleet, so they are named config
/// rather than literals (the drive buffer policy lives on the estimator).
#[derive(Debug, Clone, Copy)]
pub struct SchedulePolicy {
    /// Minimum time spent at a stop before departing for the next.
    pub stop_dwell: Duration,
    /// Added to the final return leg.
    pub meal_break: Duration,
    /// Advertised delivery window length.
    pub delivery_window: Duration,
    /// Grid that arrival times are rounded onto.
    pub rounding_grid: Duration,
}

impl Default for SchedulePolicy {
    fn default() -> Self {
        use crate::defaults::*;
        Self {
            stop_dwell: Duration::minutes(DEFAULT_STOP_DWELL_MINUTES),
            meal_break: Duration::minutes(DEFAULT_MEAL_BREAK_MINUTES),
            delivery_window: Duration::minutes(DEFAULT_DELIVERY_WINDOW_MINUTES),
            rounding_grid: Duration::minutes(DEFAULT_ROUNDING_GRID_MINUTES),
        }
    }
}

/// Round a timestamp to the nearest grid boundary, half-up: a remainder of
/// exactly half the grid rounds to the later boundary. Seconds count toward
/// the remainder, so 08:07:30 on a 15-minute grid becomes 08:15.
pub fn round_to_grid(t: NaiveDateTime, grid: Duration) -> NaiveDateTime {
    let grid_secs = grid.num_seconds().max(1);
    let secs = t.and_utc().timestamp();
    let remainder = secs.rem_euclid(grid_secs);

    let rounded = if remainder * 2 >= grid_secs {
        secs - remainder + grid_secs
    } else {
        secs - remainder
    };

    DateTime::from_timestamp(rounded, 0)
        .map(|d| d.naive_utc())
        .unwrap_or(t)
}

/// Walk the stops in visiting order and build the schedule.
///
/// Simulation state is (current time, current location), initialized from
/// the route context. Each stop advances the state; the depot return with
/// meal break is emitted last. An empty stop list still yields the return
/// row, so the output is never empty. Row count is always stops + 1.
pub async fn build_schedule(
    ctx: &RouteContext,
    stops: &[Stop],
    estimator: &DriveTimeEstimator,
    policy: &SchedulePolicy,
) -> Result<Vec<ScheduleRow>, DirectionsError> {
    let mut rows = Vec::with_capacity(stops.len() + 1);
    let mut current_time = ctx.departure;
    let mut current_location: &str = &ctx.depot_address;

    for stop in stops {
        let est = estimator.estimate(current_location, &stop.address).await?;
        let arrival = round_to_grid(current_time + est.base, policy.rounding_grid);
        let buffered_arrival = round_to_grid(current_time + est.buffered, policy.rounding_grid);

        rows.push(ScheduleRow {
            route: ctx.route_name.clone(),
            loc_id: stop.loc_id.clone(),
            address: stop.address.clone(),
            arrival,
            window_start: arrival,
            window_end: arrival + policy.delivery_window,
        });

        // Dwell always elapses; on long hops the buffered (worst-case)
        // arrival dominates the next departure.
        current_time =
            (current_time + policy.stop_dwell).max(buffered_arrival + policy.stop_dwell);
        current_location = &stop.address;
    }

    // Return leg carries the meal break in both bounds of the window.
    let est = estimator
        .estimate(current_location, &ctx.depot_address)
        .await?;
    let min_return = round_to_grid(
        current_time + est.base + policy.meal_break,
        policy.rounding_grid,
    );
    let max_return = round_to_grid(
        current_time + est.buffered + policy.meal_break,
        policy.rounding_grid,
    );

    rows.push(ScheduleRow {
        route: ctx.route_name.clone(),
        loc_id: RETURN_LOC_ID.to_string(),
        address: ctx.depot_address.clone(),
        arrival: min_return,
        window_start: min_return,
        window_end: max_return,
    });

    Ok(rows)
}

// ===========================================================================
// Tests
// ===========================================================================
