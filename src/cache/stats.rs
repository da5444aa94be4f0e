//! Cache Statistics Module
//!
//! Best-effort counters reported by the distributed cache backing store.

use serde::{Deserialize, Serialize};

// == Cache Statistics ==
/// Aggregate L2 counters.
///
/// Sourced from the store's `INFO` output, so the numbers are only as exact
/// as the store reports them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStatistics {
    /// Successful key lookups
    pub hits: u64,
    /// Failed key lookups
    pub misses: u64,
    /// Keys evicted by the store's memory policy
    pub evictions: u64,
    /// Keys currently held
    pub keys: u64,
}

impl CacheStatistics {
    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits.saturating_add(self.misses);
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    // == Parse Info ==
    /// Parses the text returned by a Redis `INFO` call.
    ///
    /// Recognised fields are `keyspace_hits`, `keyspace_misses`,
    /// `evicted_keys` and the `keys=` count of every `dbN` keyspace line.
    /// Anything missing or malformed counts as zero.
    pub fn from_info(info: &str) -> Self {
        let mut stats = Self::default();

        for line in info.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((field, value)) = line.split_once(':') else {
                continue;
            };

            match field {
                "keyspace_hits" => stats.hits = parse_count(value),
                "keyspace_misses" => stats.misses = parse_count(value),
                "evicted_keys" => stats.evictions = parse_count(value),
                db if is_keyspace_field(db) => {
                    stats.keys = stats.keys.saturating_add(parse_keyspace_keys(value));
                }
                _ => {}
            }
        }

        stats
    }
}

fn parse_count(value: &str) -> u64 {
    value.trim().parse().unwrap_or(0)
}

fn is_keyspace_field(field: &str) -> bool {
    field
        .strip_prefix("db")
        .map(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
        .unwrap_or(false)
}

// keyspace lines look like `keys=10,expires=0,avg_ttl=0`
fn parse_keyspace_keys(value: &str) -> u64 {
    value
        .split(',')
        .filter_map(|part| part.split_once('='))
        .find(|(name, _)| name.trim() == "keys")
        .map(|(_, count)| parse_count(count))
        .unwrap_or(0)
}
