// Event domain types
//
// Entities are serialized with the wire casing the HTTP surface exposes
// (camelCase), so responses can embed them directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// A scheduled occurrence with a future date, location, and capacity.
/// Immutable once created; registrations are queried, not embedded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub date: DateTime<Utc>,
    pub location: String,
    pub capacity: i32,
    pub created_at: DateTime<Utc>,
}

/// An attendee. Created only through the test-support endpoint; otherwise
/// assumed to pre-exist.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Association of one User to one Event, unique per (user, event) pair
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub id: i64,
    pub event_id: i64,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Event attributes plus everyone currently registered, in registration
/// insertion order
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct EventDetail {
    pub id: i64,
    pub title: String,
    pub date: DateTime<Utc>,
    pub location: String,
    pub capacity: i32,
    pub registered_users: Vec<User>,
}

impl EventDetail {
    pub fn new(event: Event, registered_users: Vec<User>) -> Self {
        Self {
            id: event.id,
            title: event.title,
            date: event.date,
            location: event.location,
            capacity: event.capacity,
            registered_users,
        }
    }
}

/// Capacity statistics for one event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct EventStats {
    pub total_registrations: i64,
    /// capacity - total; negative values signal an upstream invariant
    /// violation and are reported as-is, never clamped
    pub remaining_capacity: i64,
    /// Integer percentage with a trailing `%`, e.g. "30%"
    pub percentage_used: String,
}

impl EventStats {
    /// Compute stats from a capacity and a registration count.
    ///
    /// The percentage is `round(total / capacity * 100)` using
    /// `f64::round`, i.e. half-away-from-zero; for the non-negative
    /// ratios here that is round-half-up. The rounding rule is part of
    /// the observable contract.
    pub fn compute(capacity: i32, total_registrations: i64) -> Self {
        let percentage =
            (total_registrations as f64 / f64::from(capacity) * 100.0).round() as i64;
        Self {
            total_registrations,
            remaining_capacity: i64::from(capacity) - total_registrations,
            percentage_used: format!("{percentage}%"),
        }
    }
}

/// Input for creating an event. Shape validation (non-empty text, future
/// date, capacity bounds) happens before this is constructed.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub title: String,
    pub date: DateTime<Utc>,
    pub location: String,
    pub capacity: i32,
}

/// Input for creating a user (test support)
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_for_partially_filled_event() {
        let stats = EventStats::compute(10, 3);
        assert_eq!(stats.total_registrations, 3);
        assert_eq!(stats.remaining_capacity, 7);
        assert_eq!(stats.percentage_used, "30%");
    }

    #[test]
    fn stats_round_half_up() {
        // 1/8 = 12.5% rounds up to 13%
        assert_eq!(EventStats::compute(8, 1).percentage_used, "13%");
        // 1/3 = 33.33..% rounds down to 33%
        assert_eq!(EventStats::compute(3, 1).percentage_used, "33%");
    }

    #[test]
    fn stats_for_empty_and_full_events() {
        let empty = EventStats::compute(50, 0);
        assert_eq!(empty.remaining_capacity, 50);
        assert_eq!(empty.percentage_used, "0%");

        let full = EventStats::compute(50, 50);
        assert_eq!(full.remaining_capacity, 0);
        assert_eq!(full.percentage_used, "100%");
    }

    #[test]
    fn stats_overshoot_is_not_clamped() {
        let stats = EventStats::compute(10, 12);
        assert_eq!(stats.remaining_capacity, -2);
        assert_eq!(stats.percentage_used, "120%");
    }
}
