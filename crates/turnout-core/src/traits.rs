// Store trait for pluggable backends
//
// Implementations:
// - InMemoryEventStore (this crate) for unit tests and examples
// - Postgres-backed store in turnout-storage for production

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::event::{Event, NewEvent, NewUser, Registration, User};

/// Persistence contract for events, users, and registrations.
///
/// `register` and `cancel` are the operations with invariants attached;
/// both are required to be atomic with respect to concurrent callers.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Persist a new event. Input shape is already validated.
    async fn create_event(&self, input: NewEvent) -> Result<Event>;

    /// Fetch one event by id
    async fn get_event(&self, event_id: i64) -> Result<Option<Event>>;

    /// All events with `date > now`, ordered by date ascending, ties
    /// broken by location ascending (byte order)
    async fn list_upcoming(&self, now: DateTime<Utc>) -> Result<Vec<Event>>;

    /// Users registered for an event, in registration insertion order
    async fn registered_users(&self, event_id: i64) -> Result<Vec<User>>;

    /// Number of registrations currently held for an event
    async fn registration_count(&self, event_id: i64) -> Result<i64>;

    /// Register a user for an event, enforcing every invariant in one
    /// atomic step: the event must exist (`EventNotFound`), its date must
    /// be strictly after `now` (`EventExpired`), the user must not already
    /// hold a registration (`AlreadyRegistered`), and the registration
    /// count must be below capacity (`EventFull`). Checks and insert are
    /// performed under one lock/transaction so concurrent callers cannot
    /// overshoot capacity.
    async fn register(
        &self,
        event_id: i64,
        user_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Registration>;

    /// Remove the registration for (user, event). Fails with
    /// `NotRegistered` when there is none; repeating the call after
    /// success fails the same way.
    async fn cancel(&self, event_id: i64, user_id: i64) -> Result<()>;

    /// Persist a new user (test support)
    async fn create_user(&self, input: NewUser) -> Result<User>;
}
