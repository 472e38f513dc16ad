//! Stop list parsing.
//!
//! Input is one stop per line, `identifier, address`, split on the first
//! comma so the address may itself contain commas. Blank lines are ignored.

use anyhow::Result;
use tracing::warn;

/// A single delivery stop. The identifier is caller-supplied and not
/// required to be unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stop {
    pub loc_id: String,
    pub address: String,
}

/// What to do with a line that doesn't split into `identifier, address`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedLinePolicy {
    /// Log and drop the line (historical behaviour).
    Skip,
    /// Abort parsing with an error naming the line.
    Reject,
}

/// Parse a newline-delimited stop list.
pub fn parse_stop_list(input: &str, policy: MalformedLinePolicy) -> Result<Vec<Stop>> {
    let mut stops = Vec::new();

    for (lineno, raw) in input.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        match line.split_once(',') {
            Some((loc, addr)) if !loc.trim().is_empty() && !addr.trim().is_empty() => {
                stops.push(Stop {
                    loc_id: loc.trim().to_string(),
                    address: addr.trim().to_string(),
                });
            }
            _ => match policy {
                MalformedLinePolicy::Skip => {
                    warn!("Skipping malformed stop line {}: {:?}", lineno + 1, line);
                }
                MalformedLinePolicy::Reject => {
                    anyhow::bail!(
                        "Malformed stop line {}: {:?} (expected \"identifier, address\")",
                        lineno + 1,
                        line
                    );
                }
            },
        }
    }

    Ok(stops)
}
