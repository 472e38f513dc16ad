//! Configuration management

use anyhow::{Context, Result};
use chrono::Duration;

use crate::defaults;
use crate::services::estimator::BufferPolicy;
use crate::services::schedule::SchedulePolicy;

/// Directions backend selection. Explicit only: the offline estimator is a
/// configured choice, never a silent fallback after a provider failure.
#[derive(Debug, Clone, PartialEq)]
pub enum DirectionsBackend {
    Valhalla {
        valhalla_url: String,
        nominatim_url: String,
    },
    Offline,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub directions_backend: DirectionsBackend,
    /// The schedule-construction tunables (dwell, meal break, window, grid).
    pub schedule: SchedulePolicy,
    /// The drive buffer policy applied by the estimator.
    pub buffer: BufferPolicy,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let backend = std::env::var("DIRECTIONS_BACKEND").unwrap_or_else(|_| "valhalla".to_string());

        let directions_backend = match backend.as_str() {
            "valhalla" => {
                let valhalla_url = std::env::var("VALHALLA_URL")
                    .context("VALHALLA_URL must be set for the valhalla directions backend")?;
                let nominatim_url = std::env::var("NOMINATIM_URL")
                    .unwrap_or_else(|_| "https://nominatim.openstreetmap.org".to_string());
                DirectionsBackend::Valhalla {
                    valhalla_url,
                    nominatim_url,
                }
            }
            "offline" => DirectionsBackend::Offline,
            other => anyhow::bail!(
                "Unknown DIRECTIONS_BACKEND '{}' (expected \"valhalla\" or \"offline\")",
                other
            ),
        };

        let schedule = SchedulePolicy {
            stop_dwell: env_duration_minutes("STOP_DWELL_MINUTES", defaults::DEFAULT_STOP_DWELL_MINUTES)?,
            meal_break: env_duration_minutes("MEAL_BREAK_MINUTES", defaults::DEFAULT_MEAL_BREAK_MINUTES)?,
            delivery_window: env_duration_minutes(
                "DELIVERY_WINDOW_MINUTES",
                defaults::DEFAULT_DELIVERY_WINDOW_MINUTES,
            )?,
            rounding_grid: env_duration_minutes(
                "ROUNDING_GRID_MINUTES",
                defaults::DEFAULT_ROUNDING_GRID_MINUTES,
            )?,
        };

        if schedule.rounding_grid <= Duration::zero() {
            anyhow::bail!("ROUNDING_GRID_MINUTES must be positive");
        }

        let buffer = buffer_policy_from_env()?;

        Ok(Self {
            directions_backend,
            schedule,
            buffer,
        })
    }
}

fn env_duration_minutes(name: &str, default: i64) -> Result<Duration> {
    let minutes = match std::env::var(name) {
        Ok(value) => value
            .trim()
            .parse::<i64>()
            .with_context(|| format!("{name} must be an integer minute count (got {value:?})"))?,
        Err(_) => default,
    };

    if minutes < 0 {
        anyhow::bail!("{} must not be negative", name);
    }
    Ok(Duration::minutes(minutes))
}

fn buffer_policy_from_env() -> Result<BufferPolicy> {
    let fraction = std::env::var("DRIVE_BUFFER_FRACTION").ok();
    let minutes = std::env::var("DRIVE_BUFFER_MINUTES").ok();

    match (fraction, minutes) {
        (Some(_), Some(_)) => {
            anyhow::bail!("Set either DRIVE_BUFFER_FRACTION or DRIVE_BUFFER_MINUTES, not both")
        }
        (Some(f), None) => {
            let fraction: f64 = f
                .trim()
                .parse()
                .with_context(|| format!("DRIVE_BUFFER_FRACTION must be a number (got {f:?})"))?;
            if fraction < 0.0 {
                anyhow::bail!("DRIVE_BUFFER_FRACTION must not be negative");
            }
            Ok(BufferPolicy::Fraction(fraction))
        }
        (None, Some(m)) => {
            let minutes: i64 = m
                .trim()
                .parse()
                .with_context(|| format!("DRIVE_BUFFER_MINUTES must be an integer (got {m:?})"))?;
            if minutes < 0 {
                anyhow::bail!("DRIVE_BUFFER_MINUTES must not be negative");
            }
            Ok(BufferPolicy::FixedMinutes(minutes))
        }
        (None, None) => Ok(BufferPolicy::Fraction(defaults::DEFAULT_DRIVE_BUFFER_FRACTION)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[ignore] // requires --test-threads=1 due to env var race
    fn test_config_valhalla_url_required_for_valhalla_backend() {
        std::env::remove_var("DIRECTIONS_BACKEND");
        std::env::remove_var("VALHALLA_URL");

        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("VALHALLA_URL"));
    }

    #[test]
    #[ignore] // requires --test-threads=1 due to env var race
    fn test_config_offline_backend_needs_no_urls() {
        std::env::set_var("DIRECTIONS_BACKEND", "offline");
        std::env::remove_var("VALHALLA_URL");

        let config = Config::from_env().unwrap();
        assert_eq!(config.directions_backend, DirectionsBackend::Offline);

        std::env::remove_var("DIRECTIONS_BACKEND");
    }

    #[test]
    #[ignore] // requires --test-threads=1 due to env var race
    fn test_config_unknown_backend_is_rejected() {
        std::env::set_var("DIRECTIONS_BACKEND", "carrier-pigeon");

        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("carrier-pigeon"));

        std::env::remove_var("DIRECTIONS_BACKEND");
    }

    #[test]
    #[ignore] // requires --test-threads=1 due to env var race
    fn test_config_tunables_default_when_unset() {
        std::env::set_var("DIRECTIONS_BACKEND", "offline");
        for name in [
            "STOP_DWELL_MINUTES",
            "MEAL_BREAK_MINUTES",
            "DELIVERY_WINDOW_MINUTES",
            "ROUNDING_GRID_MINUTES",
            "DRIVE_BUFFER_FRACTION",
            "DRIVE_BUFFER_MINUTES",
        ] {
            std::env::remove_var(name);
        }

        let config = Config::from_env().unwrap();
        assert_eq!(config.schedule.stop_dwell, Duration::minutes(45));
        assert_eq!(config.schedule.meal_break, Duration::hours(2));
        assert_eq!(config.schedule.delivery_window, Duration::hours(4));
        assert_eq!(config.schedule.rounding_grid, Duration::minutes(15));
        assert_eq!(config.buffer, BufferPolicy::Fraction(0.30));

        std::env::remove_var("DIRECTIONS_BACKEND");
    }

    #[test]
    #[ignore] // requires --test-threads=1 due to env var race
    fn test_config_buffer_minutes_selects_additive_mode() {
        std::env::set_var("DIRECTIONS_BACKEND", "offline");
        std::env::remove_var("DRIVE_BUFFER_FRACTION");
        std::env::set_var("DRIVE_BUFFER_MINUTES", "30");

        let config = Config::from_env().unwrap();
        assert_eq!(config.buffer, BufferPolicy::FixedMinutes(30));

        std::env::remove_var("DRIVE_BUFFER_MINUTES");
        std::env::remove_var("DIRECTIONS_BACKEND");
    }

    #[test]
    #[ignore] // requires --test-threads=1 due to env var race
    fn test_config_both_buffer_vars_is_an_error() {
        std::env::set_var("DIRECTIONS_BACKEND", "offline");
        std::env::set_var("DRIVE_BUFFER_FRACTION", "0.3");
        std::env::set_var("DRIVE_BUFFER_MINUTES", "30");

        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("not both"));

        std::env::remove_var("DRIVE_BUFFER_FRACTION");
        std::env::remove_var("DRIVE_BUFFER_MINUTES");
        std::env::remove_var("DIRECTIONS_BACKEND");
    }
}
