// In-memory EventStore implementation
//
// Keeps all data in memory behind one lock, making it perfect for:
// - Unit tests of services and handlers
// - Quick prototyping without a database
//
// Atomicity note: register/cancel take the write lock for the whole
// check-and-insert, which gives the same guarantee the Postgres store
// gets from its row-locked transaction.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::error::{RegistryError, Result};
use crate::event::{Event, NewEvent, NewUser, Registration, User};
use crate::traits::EventStore;

#[derive(Debug, Default)]
struct State {
    next_event_id: i64,
    next_user_id: i64,
    next_registration_id: i64,
    events: HashMap<i64, Event>,
    users: HashMap<i64, User>,
    registrations: Vec<Registration>,
}

/// In-memory event store
#[derive(Debug, Default, Clone)]
pub struct InMemoryEventStore {
    state: Arc<RwLock<State>>,
}

impl InMemoryEventStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all data
    pub async fn clear(&self) {
        *self.state.write().await = State::default();
    }

    /// All registrations currently held (useful for asserting invariants
    /// in tests)
    pub async fn registrations(&self) -> Vec<Registration> {
        self.state.read().await.registrations.clone()
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn create_event(&self, input: NewEvent) -> Result<Event> {
        let mut state = self.state.write().await;
        state.next_event_id += 1;
        let event = Event {
            id: state.next_event_id,
            title: input.title,
            date: input.date,
            location: input.location,
            capacity: input.capacity,
            created_at: Utc::now(),
        };
        state.events.insert(event.id, event.clone());
        Ok(event)
    }

    async fn get_event(&self, event_id: i64) -> Result<Option<Event>> {
        Ok(self.state.read().await.events.get(&event_id).cloned())
    }

    async fn list_upcoming(&self, now: DateTime<Utc>) -> Result<Vec<Event>> {
        let state = self.state.read().await;
        let mut upcoming: Vec<Event> = state
            .events
            .values()
            .filter(|e| e.date > now)
            .cloned()
            .collect();
        upcoming.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.location.cmp(&b.location)));
        Ok(upcoming)
    }

    async fn registered_users(&self, event_id: i64) -> Result<Vec<User>> {
        let state = self.state.read().await;
        Ok(state
            .registrations
            .iter()
            .filter(|r| r.event_id == event_id)
            .filter_map(|r| state.users.get(&r.user_id).cloned())
            .collect())
    }

    async fn registration_count(&self, event_id: i64) -> Result<i64> {
        let state = self.state.read().await;
        Ok(state
            .registrations
            .iter()
            .filter(|r| r.event_id == event_id)
            .count() as i64)
    }

    async fn register(
        &self,
        event_id: i64,
        user_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Registration> {
        let mut state = self.state.write().await;

        let event = state
            .events
            .get(&event_id)
            .ok_or(RegistryError::EventNotFound(event_id))?;
        if event.date <= now {
            return Err(RegistryError::EventExpired(event_id));
        }

        let capacity = i64::from(event.capacity);
        if state
            .registrations
            .iter()
            .any(|r| r.event_id == event_id && r.user_id == user_id)
        {
            return Err(RegistryError::already_registered(event_id, user_id));
        }

        let count = state
            .registrations
            .iter()
            .filter(|r| r.event_id == event_id)
            .count() as i64;
        if count >= capacity {
            return Err(RegistryError::EventFull(event_id));
        }

        state.next_registration_id += 1;
        let registration = Registration {
            id: state.next_registration_id,
            event_id,
            user_id,
            created_at: Utc::now(),
        };
        state.registrations.push(registration.clone());
        Ok(registration)
    }

    async fn cancel(&self, event_id: i64, user_id: i64) -> Result<()> {
        let mut state = self.state.write().await;
        let before = state.registrations.len();
        state
            .registrations
            .retain(|r| !(r.event_id == event_id && r.user_id == user_id));
        if state.registrations.len() == before {
            return Err(RegistryError::not_registered(event_id, user_id));
        }
        Ok(())
    }

    async fn create_user(&self, input: NewUser) -> Result<User> {
        let mut state = self.state.write().await;
        state.next_user_id += 1;
        let user = User {
            id: state.next_user_id,
            name: input.name,
            email: input.email,
            created_at: Utc::now(),
        };
        state.users.insert(user.id, user.clone());
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn future_event(title: &str, location: &str, capacity: i32, days: i64) -> NewEvent {
        NewEvent {
            title: title.to_string(),
            date: Utc::now() + Duration::days(days),
            location: location.to_string(),
            capacity,
        }
    }

    #[tokio::test]
    async fn register_and_cancel_roundtrip() {
        let store = InMemoryEventStore::new();
        let event = store
            .create_event(future_event("Rust meetup", "Berlin", 10, 7))
            .await
            .unwrap();

        store.register(event.id, 1, Utc::now()).await.unwrap();
        assert_eq!(store.registration_count(event.id).await.unwrap(), 1);

        store.cancel(event.id, 1).await.unwrap();
        assert_eq!(store.registration_count(event.id).await.unwrap(), 0);

        // Second cancel fails the same way as cancelling a registration
        // that never existed
        assert!(matches!(
            store.cancel(event.id, 1).await,
            Err(RegistryError::NotRegistered { .. })
        ));
    }

    #[tokio::test]
    async fn duplicate_registration_is_rejected() {
        let store = InMemoryEventStore::new();
        let event = store
            .create_event(future_event("Rust meetup", "Berlin", 10, 7))
            .await
            .unwrap();

        store.register(event.id, 1, Utc::now()).await.unwrap();
        assert!(matches!(
            store.register(event.id, 1, Utc::now()).await,
            Err(RegistryError::AlreadyRegistered { .. })
        ));
        assert_eq!(store.registration_count(event.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn expired_event_rejects_registration() {
        let store = InMemoryEventStore::new();
        let event = store
            .create_event(future_event("Rust meetup", "Berlin", 10, 7))
            .await
            .unwrap();

        // "now" moves past the event date between creation and the call
        let later = event.date + Duration::hours(1);
        assert!(matches!(
            store.register(event.id, 1, later).await,
            Err(RegistryError::EventExpired(_))
        ));
    }

    #[tokio::test]
    async fn unknown_event_rejects_registration() {
        let store = InMemoryEventStore::new();
        assert!(matches!(
            store.register(42, 1, Utc::now()).await,
            Err(RegistryError::EventNotFound(42))
        ));
    }

    #[tokio::test]
    async fn capacity_is_never_overshot_by_racing_callers() {
        let store = InMemoryEventStore::new();
        let event = store
            .create_event(future_event("Tiny venue", "Oslo", 3, 7))
            .await
            .unwrap();

        // 10 distinct users race for the last 3 slots; at most 3 may win
        let mut handles = Vec::new();
        for user_id in 1..=10 {
            let store = store.clone();
            let event_id = event.id;
            handles.push(tokio::spawn(async move {
                store.register(event_id, user_id, Utc::now()).await
            }));
        }

        let mut won = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => won += 1,
                Err(RegistryError::EventFull(_)) => {}
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        assert_eq!(won, 3);
        assert_eq!(store.registration_count(event.id).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn upcoming_excludes_past_and_sorts_by_date_then_location() {
        let store = InMemoryEventStore::new();
        let now = Utc::now();

        store
            .create_event(NewEvent {
                title: "Past".into(),
                date: now - Duration::days(1),
                location: "Anywhere".into(),
                capacity: 5,
            })
            .await
            .unwrap();
        let same_day = now + Duration::days(3);
        for location in ["Zurich", "Lisbon"] {
            store
                .create_event(NewEvent {
                    title: "Same day".into(),
                    date: same_day,
                    location: location.into(),
                    capacity: 5,
                })
                .await
                .unwrap();
        }
        store
            .create_event(future_event("Soonest", "Madrid", 5, 1))
            .await
            .unwrap();

        let upcoming = store.list_upcoming(now).await.unwrap();
        let locations: Vec<&str> = upcoming.iter().map(|e| e.location.as_str()).collect();
        assert_eq!(locations, vec!["Madrid", "Lisbon", "Zurich"]);
    }

    #[tokio::test]
    async fn registered_users_come_back_in_insertion_order() {
        let store = InMemoryEventStore::new();
        let event = store
            .create_event(future_event("Rust meetup", "Berlin", 10, 7))
            .await
            .unwrap();

        let mut ids = Vec::new();
        for name in ["ada", "grace", "barbara"] {
            let user = store
                .create_user(NewUser {
                    name: name.to_string(),
                    email: format!("{name}@example.com"),
                })
                .await
                .unwrap();
            store.register(event.id, user.id, Utc::now()).await.unwrap();
            ids.push(user.id);
        }

        let users = store.registered_users(event.id).await.unwrap();
        let got: Vec<i64> = users.iter().map(|u| u.id).collect();
        assert_eq!(got, ids);
    }
}
