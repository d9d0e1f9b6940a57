// Registration service for business logic
//
// The invariant-heavy part of register/cancel lives in the store's atomic
// operations; this layer decides "now", reports defects, and shapes stats.

use std::sync::Arc;

use chrono::Utc;
use turnout_core::{EventStats, EventStore, Registration, RegistryError, Result};

pub struct RegistrationService {
    store: Arc<dyn EventStore>,
}

impl RegistrationService {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self { store }
    }

    pub async fn register(&self, event_id: i64, user_id: i64) -> Result<Registration> {
        self.store.register(event_id, user_id, Utc::now()).await
    }

    pub async fn cancel(&self, event_id: i64, user_id: i64) -> Result<()> {
        self.store.cancel(event_id, user_id).await
    }

    pub async fn stats(&self, event_id: i64) -> Result<EventStats> {
        let event = self
            .store
            .get_event(event_id)
            .await?
            .ok_or(RegistryError::EventNotFound(event_id))?;
        let total = self.store.registration_count(event_id).await?;

        let stats = EventStats::compute(event.capacity, total);
        if stats.remaining_capacity < 0 {
            // An upstream invariant was violated; report, don't clamp
            tracing::warn!(
                event_id,
                total,
                capacity = event.capacity,
                "registration count exceeds event capacity"
            );
        }
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use turnout_core::{InMemoryEventStore, NewEvent};

    fn service() -> (RegistrationService, Arc<InMemoryEventStore>) {
        let store = Arc::new(InMemoryEventStore::new());
        (RegistrationService::new(store.clone()), store)
    }

    async fn seed_event(store: &InMemoryEventStore, capacity: i32) -> i64 {
        store
            .create_event(NewEvent {
                title: "RustConf".into(),
                date: Utc::now() + Duration::days(30),
                location: "Montreal".into(),
                capacity,
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn stats_reflect_current_registrations() {
        let (service, store) = service();
        let event_id = seed_event(&store, 10).await;
        for user_id in 1..=3 {
            service.register(event_id, user_id).await.unwrap();
        }

        let stats = service.stats(event_id).await.unwrap();
        assert_eq!(stats.total_registrations, 3);
        assert_eq!(stats.remaining_capacity, 7);
        assert_eq!(stats.percentage_used, "30%");
    }

    #[tokio::test]
    async fn stats_of_missing_event_is_not_found() {
        let (service, _store) = service();
        assert!(matches!(
            service.stats(99).await,
            Err(RegistryError::EventNotFound(99))
        ));
    }

    #[tokio::test]
    async fn register_cancel_register_again_succeeds() {
        let (service, store) = service();
        let event_id = seed_event(&store, 1).await;

        service.register(event_id, 1).await.unwrap();
        service.cancel(event_id, 1).await.unwrap();
        service.register(event_id, 1).await.unwrap();

        let stats = service.stats(event_id).await.unwrap();
        assert_eq!(stats.total_registrations, 1);
    }
}
