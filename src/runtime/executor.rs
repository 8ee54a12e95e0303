//! Per-user session runtime
//!
//! One `SessionRuntime` runs per active user, owning the receive side of
//! that user's event channel. Events are processed strictly in arrival
//! order: resolve context, run the pure transition, apply the state
//! change, then execute effects.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::db::{NewApplication, UserPatch};
use crate::session::SessionStore;
use crate::state_machine::{transition, Choice, Draft, Effect, Event, Language, Next, RenderMode,
    Screen, SessionContext, UserId};
use crate::texts::{self, MenuButton, MenuSpec};

use super::traits::{Storage, Transport};

pub struct SessionRuntime<S, T>
where
    S: Storage + 'static,
    T: Transport + 'static,
{
    user_id: UserId,
    reviewer: UserId,
    /// Cached language; refreshed from storage on `/start` and updated
    /// immediately when the user picks one.
    language: Language,
    /// Transport handle captured from the most recent `/start`.
    handle: Option<String>,
    sessions: SessionStore,
    storage: S,
    transport: Arc<T>,
    event_rx: mpsc::Receiver<Event>,
}

impl<S, T> SessionRuntime<S, T>
where
    S: Storage + 'static,
    T: Transport + 'static,
{
    pub fn new(
        user_id: UserId,
        reviewer: UserId,
        sessions: SessionStore,
        storage: S,
        transport: Arc<T>,
        event_rx: mpsc::Receiver<Event>,
    ) -> Self {
        Self {
            user_id,
            reviewer,
            language: Language::default(),
            handle: None,
            sessions,
            storage,
            transport,
            event_rx,
        }
    }

    /// Drain events until every sender is dropped.
    pub async fn run(mut self) {
        while let Some(event) = self.event_rx.recv().await {
            if let Err(e) = self.process_event(event).await {
                error!(user_id = self.user_id, error = %e, "event processing failed");
            }
        }
        debug!(user_id = self.user_id, "session runtime stopped");
    }

    pub(crate) async fn process_event(&mut self, event: Event) -> Result<(), String> {
        let mut known_user = true;
        if let Event::Start { handle } = &event {
            if handle.is_some() {
                self.handle = handle.clone();
            }
            match self.storage.get_user(self.user_id).await? {
                Some(user) => self.language = user.language,
                None => known_user = false,
            }
        }

        let (state, draft) = match self.sessions.get(self.user_id) {
            Some(entry) => (Some(entry.state), entry.draft),
            None => (None, Draft::default()),
        };
        let ctx = SessionContext {
            user_id: self.user_id,
            handle: self.handle.clone(),
            language: self.language,
            known_user,
            is_reviewer: self.user_id == self.reviewer,
        };

        let result = match transition(state, &draft, &ctx, &event) {
            Ok(result) => result,
            Err(e) => {
                // Out-of-flow input (stale menu taps, stray text) is
                // dropped rather than surfaced as an error.
                debug!(user_id = self.user_id, %e, "ignoring event");
                return Ok(());
            }
        };

        match result.next {
            Next::Stay => {
                if let Some(state) = state {
                    self.sessions.set(self.user_id, state, result.draft.clone());
                }
            }
            Next::Goto(next) => self.sessions.set(self.user_id, next, result.draft.clone()),
            Next::Clear => self.sessions.clear(self.user_id),
        }

        for effect in result.effects {
            self.execute_effect(effect, &result.draft).await?;
        }
        Ok(())
    }

    async fn execute_effect(&mut self, effect: Effect, draft: &Draft) -> Result<(), String> {
        match effect {
            Effect::Show { screen, mode } => self.show(&screen, mode).await,
            Effect::RegisterUser => {
                let patch = UserPatch {
                    handle: self.handle.clone(),
                    ..UserPatch::default()
                };
                self.storage.upsert_user(self.user_id, &patch).await
            }
            Effect::SaveLanguage { language } => {
                self.language = language;
                self.storage
                    .upsert_user(self.user_id, &UserPatch::language(language))
                    .await
            }
            Effect::SaveName { name } => {
                self.storage
                    .upsert_user(self.user_id, &UserPatch::name(name))
                    .await
            }
            Effect::Finalize { phone } => self.finalize(draft, phone).await,
            Effect::ShowApplications => {
                let apps = self.storage.list_applications().await?;
                let text = texts::application_list(self.language, &apps);
                let back = MenuButton::choice(texts::back_label(self.language), Choice::ReviewPanel);
                self.transport
                    .edit_menu(self.user_id, &text, &[back])
                    .await
            }
        }
    }

    async fn show(&self, screen: &Screen, mode: RenderMode) -> Result<(), String> {
        let rendered = texts::render(screen, self.language);
        match (mode, rendered.menu) {
            (RenderMode::Send, MenuSpec::None) => {
                self.transport.send_text(self.user_id, &rendered.text).await
            }
            (RenderMode::Send, MenuSpec::Inline(buttons)) => {
                self.transport
                    .send_menu(self.user_id, &rendered.text, &buttons)
                    .await
            }
            (RenderMode::Send, MenuSpec::Contact { button }) => {
                self.transport
                    .request_contact(self.user_id, &rendered.text, &button)
                    .await
            }
            (RenderMode::Send, MenuSpec::RemoveInput) => {
                self.transport.remove_input(self.user_id, &rendered.text).await
            }
            (RenderMode::EditInPlace, MenuSpec::Inline(buttons)) => {
                self.transport
                    .edit_menu(self.user_id, &rendered.text, &buttons)
                    .await
            }
            // Editing onto a screen without an inline menu just drops
            // the previous buttons.
            (RenderMode::EditInPlace, _) => {
                self.transport
                    .edit_menu(self.user_id, &rendered.text, &[])
                    .await
            }
        }
    }

    /// Record the phone, persist the application, confirm, and notify
    /// the reviewer. The session entry is already cleared; failures here
    /// change messaging, not flow.
    async fn finalize(&mut self, draft: &Draft, phone: String) -> Result<(), String> {
        if let Err(e) = self
            .storage
            .upsert_user(self.user_id, &UserPatch::phone(phone.clone()))
            .await
        {
            error!(user_id = self.user_id, error = %e, "failed to record phone");
            return self.show(&Screen::PersistFailed, RenderMode::Send).await;
        }

        let app = match build_application(draft) {
            Some(app) => app,
            None => {
                error!(user_id = self.user_id, "draft incomplete at finalize");
                return self.show(&Screen::PersistFailed, RenderMode::Send).await;
            }
        };

        let app_id = match self.storage.insert_application(self.user_id, &app).await {
            Ok(id) => id,
            Err(e) => {
                error!(user_id = self.user_id, error = %e, "failed to persist application");
                return self.show(&Screen::PersistFailed, RenderMode::Send).await;
            }
        };
        info!(user_id = self.user_id, app_id, "application persisted");

        self.show(&Screen::ContactAccepted, RenderMode::Send).await?;
        self.show(&Screen::Finished, RenderMode::Send).await?;
        if crate::state_machine::rules::advisory_applies(&app.amount) {
            self.show(&Screen::LargeAmountAdvisory, RenderMode::Send)
                .await?;
        }

        let full_name = self
            .storage
            .get_user(self.user_id)
            .await?
            .and_then(|u| u.full_name)
            .unwrap_or_else(|| "-".to_string());
        let summary = texts::review_notification(
            self.language,
            &full_name,
            &phone,
            app.financing,
            &app.amount,
            app.applicant,
            app.collateral,
            &app.collateral_details,
        );
        // A dead reviewer channel must not break the applicant's flow.
        if let Err(e) = self.transport.direct_message(self.reviewer, &summary).await {
            warn!(reviewer = self.reviewer, error = %e, "reviewer notification failed");
        }
        Ok(())
    }
}

fn build_application(draft: &Draft) -> Option<NewApplication> {
    Some(NewApplication {
        financing: draft.financing?,
        amount: draft.amount.clone()?,
        applicant: draft.applicant?,
        collateral: draft.collateral?,
        collateral_details: draft.collateral_details.clone()?,
    })
}
