//! Mock implementations for testing
//!
//! These mocks enable end-to-end session tests without real I/O.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::traits::*;
use crate::db::{ApplicationSummary, NewApplication, User, UserPatch};
use crate::state_machine::UserId;
use crate::texts::MenuButton;

/// One recorded outbound transport call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    Text {
        user: UserId,
        text: String,
    },
    Menu {
        user: UserId,
        text: String,
        codes: Vec<String>,
    },
    EditMenu {
        user: UserId,
        text: String,
        codes: Vec<String>,
    },
    ContactRequest {
        user: UserId,
        text: String,
    },
    RemoveInput {
        user: UserId,
        text: String,
    },
    Direct {
        recipient: UserId,
        text: String,
    },
}

/// Transport that records every call in order.
#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<Outbound>>,
    fail_direct: AtomicBool,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent `direct_message` calls fail.
    pub fn fail_direct_messages(&self) {
        self.fail_direct.store(true, Ordering::SeqCst);
    }

    pub fn recorded(&self) -> Vec<Outbound> {
        self.sent.lock().unwrap().clone()
    }

    /// Text of every call addressed to `user`, in send order.
    pub fn texts_for(&self, user: UserId) -> Vec<String> {
        self.recorded()
            .into_iter()
            .filter_map(|o| match o {
                Outbound::Text { user: u, text }
                | Outbound::Menu { user: u, text, .. }
                | Outbound::EditMenu { user: u, text, .. }
                | Outbound::ContactRequest { user: u, text }
                | Outbound::RemoveInput { user: u, text } => (u == user).then_some(text),
                Outbound::Direct { recipient, text } => (recipient == user).then_some(text),
            })
            .collect()
    }

    fn record(&self, outbound: Outbound) {
        self.sent.lock().unwrap().push(outbound);
    }
}

fn codes(buttons: &[MenuButton]) -> Vec<String> {
    buttons.iter().map(|b| b.code.clone()).collect()
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send_text(&self, user: UserId, text: &str) -> Result<(), String> {
        self.record(Outbound::Text {
            user,
            text: text.to_string(),
        });
        Ok(())
    }

    async fn send_menu(
        &self,
        user: UserId,
        text: &str,
        buttons: &[MenuButton],
    ) -> Result<(), String> {
        self.record(Outbound::Menu {
            user,
            text: text.to_string(),
            codes: codes(buttons),
        });
        Ok(())
    }

    async fn edit_menu(
        &self,
        user: UserId,
        text: &str,
        buttons: &[MenuButton],
    ) -> Result<(), String> {
        self.record(Outbound::EditMenu {
            user,
            text: text.to_string(),
            codes: codes(buttons),
        });
        Ok(())
    }

    async fn request_contact(&self, user: UserId, text: &str, _button: &str) -> Result<(), String> {
        self.record(Outbound::ContactRequest {
            user,
            text: text.to_string(),
        });
        Ok(())
    }

    async fn remove_input(&self, user: UserId, text: &str) -> Result<(), String> {
        self.record(Outbound::RemoveInput {
            user,
            text: text.to_string(),
        });
        Ok(())
    }

    async fn direct_message(&self, recipient: UserId, text: &str) -> Result<(), String> {
        if self.fail_direct.load(Ordering::SeqCst) {
            return Err("direct channel closed".to_string());
        }
        self.record(Outbound::Direct {
            recipient,
            text: text.to_string(),
        });
        Ok(())
    }
}

// ============================================================================
// Flaky Storage
// ============================================================================

/// Storage wrapper whose `insert_application` can be made to fail.
#[derive(Clone)]
pub struct FlakyStorage<S: Storage> {
    inner: S,
    fail_inserts: std::sync::Arc<AtomicBool>,
}

impl<S: Storage> FlakyStorage<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            fail_inserts: std::sync::Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn fail_inserts(&self) {
        self.fail_inserts.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl<S: Storage> UserStore for FlakyStorage<S> {
    async fn upsert_user(&self, user_id: UserId, patch: &UserPatch) -> Result<(), String> {
        self.inner.upsert_user(user_id, patch).await
    }

    async fn get_user(&self, user_id: UserId) -> Result<Option<User>, String> {
        self.inner.get_user(user_id).await
    }
}

#[async_trait]
impl<S: Storage> ApplicationStore for FlakyStorage<S> {
    async fn insert_application(
        &self,
        user_id: UserId,
        app: &NewApplication,
    ) -> Result<i64, String> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err("disk full".to_string());
        }
        self.inner.insert_application(user_id, app).await
    }

    async fn list_applications(&self) -> Result<Vec<ApplicationSummary>, String> {
        self.inner.list_applications().await
    }
}
