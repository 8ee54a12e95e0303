//! In-memory per-user session store
//!
//! Ephemeral by design: it holds the current flow state and draft for
//! each active conversation and can be rebuilt from scratch. The durable
//! system of record is `crate::db`.
//!
//! Each entry is read and written only by that user's runtime task, which
//! serializes events per user; the mutex just guards the shared map.

use crate::state_machine::{Draft, FlowState, UserId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// One active conversation.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionEntry {
    pub state: FlowState,
    pub draft: Draft,
}

/// Shared handle to the session map.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<Mutex<HashMap<UserId, SessionEntry>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, user_id: UserId) -> Option<SessionEntry> {
        self.inner.lock().unwrap().get(&user_id).cloned()
    }

    pub fn set(&self, user_id: UserId, state: FlowState, draft: Draft) {
        self.inner
            .lock()
            .unwrap()
            .insert(user_id, SessionEntry { state, draft });
    }

    pub fn clear(&self, user_id: UserId) {
        self.inner.lock().unwrap().remove(&user_id);
    }
}
