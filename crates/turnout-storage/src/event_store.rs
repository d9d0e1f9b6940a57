// Database-backed EventStore implementation
//
// register() runs its checks and the insert inside one transaction that
// takes `SELECT ... FOR UPDATE` on the event row. Concurrent registrations
// for the same event therefore serialize, and the capacity check and the
// insert cannot interleave. The (user_id, event_id) unique constraint
// backs the duplicate pre-check; its violation maps to AlreadyRegistered.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use turnout_core::{
    Event, EventStore, NewEvent, NewUser, Registration, RegistryError, Result, User,
};

use crate::models::{EventRow, RegistrationRow, UserRow};
use crate::repositories::Database;

fn store_err(e: sqlx::Error) -> RegistryError {
    RegistryError::store(e.to_string())
}

#[async_trait]
impl EventStore for Database {
    async fn create_event(&self, input: NewEvent) -> Result<Event> {
        let row = sqlx::query_as::<_, EventRow>(
            r#"
            INSERT INTO events (title, date, location, capacity)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, date, location, capacity, created_at
            "#,
        )
        .bind(&input.title)
        .bind(input.date)
        .bind(&input.location)
        .bind(input.capacity)
        .fetch_one(self.pool())
        .await
        .map_err(store_err)?;

        Ok(row.into())
    }

    async fn get_event(&self, event_id: i64) -> Result<Option<Event>> {
        let row = sqlx::query_as::<_, EventRow>(
            r#"
            SELECT id, title, date, location, capacity, created_at
            FROM events
            WHERE id = $1
            "#,
        )
        .bind(event_id)
        .fetch_optional(self.pool())
        .await
        .map_err(store_err)?;

        Ok(row.map(Event::from))
    }

    async fn list_upcoming(&self, now: DateTime<Utc>) -> Result<Vec<Event>> {
        // COLLATE "C" keeps the location tie-break byte-ordered and
        // case-sensitive regardless of the database locale
        let rows = sqlx::query_as::<_, EventRow>(
            r#"
            SELECT id, title, date, location, capacity, created_at
            FROM events
            WHERE date > $1
            ORDER BY date ASC, location COLLATE "C" ASC
            "#,
        )
        .bind(now)
        .fetch_all(self.pool())
        .await
        .map_err(store_err)?;

        Ok(rows.into_iter().map(Event::from).collect())
    }

    async fn registered_users(&self, event_id: i64) -> Result<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT u.id, u.name, u.email, u.created_at
            FROM users u
            JOIN registrations r ON r.user_id = u.id
            WHERE r.event_id = $1
            ORDER BY r.id ASC
            "#,
        )
        .bind(event_id)
        .fetch_all(self.pool())
        .await
        .map_err(store_err)?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn registration_count(&self, event_id: i64) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM registrations
            WHERE event_id = $1
            "#,
        )
        .bind(event_id)
        .fetch_one(self.pool())
        .await
        .map_err(store_err)?;

        Ok(count)
    }

    async fn register(
        &self,
        event_id: i64,
        user_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Registration> {
        let mut tx = self.pool().begin().await.map_err(store_err)?;

        // Row lock: serializes concurrent register calls for this event
        let event = sqlx::query_as::<_, EventRow>(
            r#"
            SELECT id, title, date, location, capacity, created_at
            FROM events
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(event_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(store_err)?
        .ok_or(RegistryError::EventNotFound(event_id))?;

        if event.date <= now {
            return Err(RegistryError::EventExpired(event_id));
        }

        let already: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM registrations
                WHERE event_id = $1 AND user_id = $2
            )
            "#,
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(store_err)?;

        if already {
            return Err(RegistryError::already_registered(event_id, user_id));
        }

        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM registrations
            WHERE event_id = $1
            "#,
        )
        .bind(event_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(store_err)?;

        if count >= i64::from(event.capacity) {
            return Err(RegistryError::EventFull(event_id));
        }

        let registration = sqlx::query_as::<_, RegistrationRow>(
            r#"
            INSERT INTO registrations (event_id, user_id)
            VALUES ($1, $2)
            RETURNING id, event_id, user_id, created_at
            "#,
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            // The unique constraint is the backstop for the pre-check above
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return RegistryError::already_registered(event_id, user_id);
                }
            }
            store_err(e)
        })?;

        tx.commit().await.map_err(store_err)?;

        tracing::debug!(event_id, user_id, "registration created");
        Ok(registration.into())
    }

    async fn cancel(&self, event_id: i64, user_id: i64) -> Result<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM registrations
            WHERE event_id = $1 AND user_id = $2
            "#,
        )
        .bind(event_id)
        .bind(user_id)
        .execute(self.pool())
        .await
        .map_err(store_err)?;

        if result.rows_affected() == 0 {
            return Err(RegistryError::not_registered(event_id, user_id));
        }

        Ok(())
    }

    async fn create_user(&self, input: NewUser) -> Result<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (name, email)
            VALUES ($1, $2)
            RETURNING id, name, email, created_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.email)
        .fetch_one(self.pool())
        .await
        .map_err(store_err)?;

        Ok(row.into())
    }
}
