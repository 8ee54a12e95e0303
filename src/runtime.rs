//! Runtime for executing intake conversations
//!
//! One actor task per user. All of a user's events flow through a single
//! mpsc channel into that user's `SessionRuntime`, so per-user handling
//! is strictly serialized while distinct users proceed concurrently.

mod executor;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use executor::SessionRuntime;
pub use traits::*;

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{mpsc, RwLock};

use crate::db::Database;
use crate::session::SessionStore;
use crate::state_machine::{Event, UserId};

/// Type alias for the production engine with concrete storage
pub type ProductionEngine<T> = EngineManager<DatabaseStorage, T>;

/// Handle to interact with a running session
pub struct SessionHandle {
    pub event_tx: mpsc::Sender<Event>,
}

/// Manager for all per-user session runtimes
pub struct EngineManager<S, T>
where
    S: Storage + Clone + 'static,
    T: Transport + 'static,
{
    storage: S,
    transport: Arc<T>,
    sessions: SessionStore,
    reviewer: UserId,
    runtimes: RwLock<HashMap<UserId, SessionHandle>>,
}

impl<T: Transport + 'static> ProductionEngine<T> {
    pub fn with_database(db: Database, transport: Arc<T>, reviewer: UserId) -> Self {
        Self::new(DatabaseStorage::new(db), transport, reviewer)
    }
}

impl<S, T> EngineManager<S, T>
where
    S: Storage + Clone + 'static,
    T: Transport + 'static,
{
    pub fn new(storage: S, transport: Arc<T>, reviewer: UserId) -> Self {
        Self {
            storage,
            transport,
            sessions: SessionStore::new(),
            reviewer,
            runtimes: RwLock::new(HashMap::new()),
        }
    }

    /// Route an inbound event to the owning user's runtime, starting one
    /// if needed. Only fails when the runtime task has died with events
    /// still queued.
    pub async fn dispatch(&self, user_id: UserId, event: Event) -> Result<(), String> {
        let event_tx = self.get_or_create(user_id).await;
        event_tx
            .send(event)
            .await
            .map_err(|e| format!("session {user_id} unavailable: {e}"))
    }

    async fn get_or_create(&self, user_id: UserId) -> mpsc::Sender<Event> {
        {
            let runtimes = self.runtimes.read().await;
            if let Some(handle) = runtimes.get(&user_id) {
                return handle.event_tx.clone();
            }
        }

        let mut runtimes = self.runtimes.write().await;
        // Lost the race to another dispatcher for the same user.
        if let Some(handle) = runtimes.get(&user_id) {
            return handle.event_tx.clone();
        }

        let (event_tx, event_rx) = mpsc::channel(32);
        let runtime = SessionRuntime::new(
            user_id,
            self.reviewer,
            self.sessions.clone(),
            self.storage.clone(),
            self.transport.clone(),
            event_rx,
        );
        tokio::spawn(runtime.run());

        runtimes.insert(
            user_id,
            SessionHandle {
                event_tx: event_tx.clone(),
            },
        );
        event_tx
    }

    #[cfg(test)]
    pub fn session_store(&self) -> &SessionStore {
        &self.sessions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::testing::RecordingTransport;
    use crate::state_machine::{
        AmountCode, ApplicantType, Choice, CollateralType, FinancingType, Language,
    };
    use std::time::Duration;

    #[tokio::test]
    async fn dispatched_events_are_processed_in_order() {
        let db = Database::open_in_memory().unwrap();
        let transport = Arc::new(RecordingTransport::new());
        let engine = EngineManager::new(DatabaseStorage::new(db.clone()), transport, 99);

        let events = vec![
            Event::Start {
                handle: Some("alice".to_string()),
            },
            Event::Choice {
                choice: Choice::Language(Language::Ru),
            },
            Event::Text {
                text: "Alice Karimova".to_string(),
            },
            Event::Choice {
                choice: Choice::Financing(FinancingType::Cash),
            },
            Event::Choice {
                choice: Choice::Amount(AmountCode::CashUpTo300M),
            },
            Event::Choice {
                choice: Choice::Applicant(ApplicantType::Individual),
            },
            Event::Choice {
                choice: Choice::Collateral(CollateralType::RealEstate),
            },
            Event::Text {
                text: "3-room apartment".to_string(),
            },
            Event::Contact {
                phone: "+998901234567".to_string(),
            },
        ];
        for event in events {
            engine.dispatch(7, event).await.unwrap();
        }

        // The runtime task drains the channel asynchronously.
        let mut applications = vec![];
        for _ in 0..200 {
            applications = db.list_applications().unwrap();
            if !applications.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(applications.len(), 1);
        assert_eq!(applications[0].user_id, 7);
        assert!(engine.session_store().get(7).is_none());
    }
}
