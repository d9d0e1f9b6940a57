// Error types for the registration domain

use thiserror::Error;

/// Result type alias for registration operations
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Errors that can occur while managing events and registrations
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Event does not exist
    #[error("event {0} not found")]
    EventNotFound(i64),

    /// Event date is not in the future anymore
    #[error("event {0} has already taken place")]
    EventExpired(i64),

    /// User already holds a registration for this event
    #[error("user {user_id} is already registered for event {event_id}")]
    AlreadyRegistered { event_id: i64, user_id: i64 },

    /// Event has reached its capacity
    #[error("event {0} is at capacity")]
    EventFull(i64),

    /// Cancellation target does not exist
    #[error("user {user_id} is not registered for event {event_id}")]
    NotRegistered { event_id: i64, user_id: i64 },

    /// Store-level failure (connection, query, constraint we did not expect)
    #[error("store error: {0}")]
    Store(String),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl RegistryError {
    /// Create a store error
    pub fn store(msg: impl Into<String>) -> Self {
        RegistryError::Store(msg.into())
    }

    /// Create an already-registered error
    pub fn already_registered(event_id: i64, user_id: i64) -> Self {
        RegistryError::AlreadyRegistered { event_id, user_id }
    }

    /// Create a not-registered error
    pub fn not_registered(event_id: i64, user_id: i64) -> Self {
        RegistryError::NotRegistered { event_id, user_id }
    }
}
