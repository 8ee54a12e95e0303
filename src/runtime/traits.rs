//! Trait abstractions for runtime I/O
//!
//! The engine consumes the transport and the persistent store through
//! these seams; tests substitute recording/mock implementations.

use crate::db::{ApplicationSummary, Database, NewApplication, User, UserPatch};
use crate::state_machine::UserId;
use crate::texts::MenuButton;
use async_trait::async_trait;

/// Outbound side of the chat transport.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a plain text prompt.
    async fn send_text(&self, user: UserId, text: &str) -> Result<(), String>;

    /// Send a text prompt with an attached list of labeled choices.
    async fn send_menu(&self, user: UserId, text: &str, buttons: &[MenuButton])
        -> Result<(), String>;

    /// Edit the previously sent prompt in place (empty `buttons` drops
    /// the menu).
    async fn edit_menu(&self, user: UserId, text: &str, buttons: &[MenuButton])
        -> Result<(), String>;

    /// Show a contact-sharing affordance.
    async fn request_contact(&self, user: UserId, text: &str, button: &str) -> Result<(), String>;

    /// Remove any on-screen input affordance.
    async fn remove_input(&self, user: UserId, text: &str) -> Result<(), String>;

    /// Send a direct message to an arbitrary identity (reviewer
    /// notification).
    async fn direct_message(&self, recipient: UserId, text: &str) -> Result<(), String>;
}

/// Storage for user records.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Create or update a user; unset patch fields keep stored values.
    async fn upsert_user(&self, user_id: UserId, patch: &UserPatch) -> Result<(), String>;

    async fn get_user(&self, user_id: UserId) -> Result<Option<User>, String>;
}

/// Storage for completed applications.
#[async_trait]
pub trait ApplicationStore: Send + Sync {
    /// Insert a completed application; fully succeeds or has no visible
    /// effect.
    async fn insert_application(
        &self,
        user_id: UserId,
        app: &NewApplication,
    ) -> Result<i64, String>;

    /// All applications, newest first.
    async fn list_applications(&self) -> Result<Vec<ApplicationSummary>, String>;
}

/// Combined storage trait for convenience
pub trait Storage: UserStore + ApplicationStore {}
impl<T: UserStore + ApplicationStore> Storage for T {}

// ============================================================================
// Production Adapter
// ============================================================================

/// Adapter to use `Database` as `Storage`
#[derive(Clone)]
pub struct DatabaseStorage {
    db: Database,
}

impl DatabaseStorage {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    #[cfg(test)]
    pub fn inner(&self) -> &Database {
        &self.db
    }
}

#[async_trait]
impl UserStore for DatabaseStorage {
    async fn upsert_user(&self, user_id: UserId, patch: &UserPatch) -> Result<(), String> {
        self.db.upsert_user(user_id, patch).map_err(|e| e.to_string())
    }

    async fn get_user(&self, user_id: UserId) -> Result<Option<User>, String> {
        self.db.get_user(user_id).map_err(|e| e.to_string())
    }
}

#[async_trait]
impl ApplicationStore for DatabaseStorage {
    async fn insert_application(
        &self,
        user_id: UserId,
        app: &NewApplication,
    ) -> Result<i64, String> {
        self.db.insert_application(user_id, app).map_err(|e| e.to_string())
    }

    async fn list_applications(&self) -> Result<Vec<ApplicationSummary>, String> {
        self.db.list_applications().map_err(|e| e.to_string())
    }
}
