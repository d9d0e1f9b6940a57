// Database row types (internal, converted to domain types at the boundary)

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use turnout_core::{Event, Registration, User};

#[derive(Debug, Clone, FromRow)]
pub struct EventRow {
    pub id: i64,
    pub title: String,
    pub date: DateTime<Utc>,
    pub location: String,
    pub capacity: i32,
    pub created_at: DateTime<Utc>,
}

impl From<EventRow> for Event {
    fn from(row: EventRow) -> Self {
        Event {
            id: row.id,
            title: row.title,
            date: row.date,
            location: row.location,
            capacity: row.capacity,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            name: row.name,
            email: row.email,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct RegistrationRow {
    pub id: i64,
    pub event_id: i64,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
}

impl From<RegistrationRow> for Registration {
    fn from(row: RegistrationRow) -> Self {
        Registration {
            id: row.id,
            event_id: row.event_id,
            user_id: row.user_id,
            created_at: row.created_at,
        }
    }
}
