// Event service for business logic

use std::sync::Arc;

use chrono::Utc;
use turnout_core::{
    Event, EventDetail, EventStore, NewEvent, NewUser, RegistryError, Result, User,
};

pub struct EventService {
    store: Arc<dyn EventStore>,
}

impl EventService {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, input: NewEvent) -> Result<Event> {
        self.store.create_event(input).await
    }

    /// Event attributes plus the users currently registered
    pub async fn detail(&self, event_id: i64) -> Result<EventDetail> {
        let event = self
            .store
            .get_event(event_id)
            .await?
            .ok_or(RegistryError::EventNotFound(event_id))?;
        let registered_users = self.store.registered_users(event_id).await?;
        Ok(EventDetail::new(event, registered_users))
    }

    /// Snapshot of events with a date still ahead of now
    pub async fn upcoming(&self) -> Result<Vec<Event>> {
        self.store.list_upcoming(Utc::now()).await
    }

    /// Test support only
    pub async fn create_user(&self, input: NewUser) -> Result<User> {
        self.store.create_user(input).await
    }
}
