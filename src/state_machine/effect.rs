//! Effects produced by state transitions

use super::state::{CollateralType, FinancingType, Language};

/// A prompt (plus optional menu) the transport should render.
///
/// Screens are semantic: localization and button wiring happen in
/// `crate::texts`, so transitions stay comparable in tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    /// Language menu shown to brand-new users.
    Welcome,
    AskFullName,
    FinancingMenu,
    /// Predefined amount codes filtered by financing type, plus the
    /// manual-entry option.
    AmountMenu { financing: FinancingType },
    ManualAmountPrompt { financing: FinancingType },
    AmountParseError,
    AmountBelowMinimum { financing: FinancingType },
    ApplicantMenu { restricted: bool },
    CollateralMenu,
    CollateralDetailsPrompt { collateral: CollateralType },
    /// Contact-sharing affordance.
    PhonePrompt,
    /// Wrong payload type at the phone step.
    PhoneTypeWarning,
    /// Contact accepted; removes the contact affordance.
    ContactAccepted,
    Finished,
    LargeAmountAdvisory,
    PersistFailed,
    ReviewPanel,
    ReviewDenied,
}

/// How a screen reaches the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Send as a new message.
    Send,
    /// Edit the prompt the triggering menu choice was attached to.
    EditInPlace,
}

/// Effects to be executed after a state transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Render a screen via the transport.
    Show { screen: Screen, mode: RenderMode },
    /// Create the User record on first contact (default language).
    RegisterUser,
    /// Persist the picked language on the User record.
    SaveLanguage { language: Language },
    /// Persist the collected name on the User record.
    SaveName { name: String },
    /// Terminal transition: record the phone, persist the Application
    /// from the completed draft, confirm, and notify the reviewer.
    Finalize { phone: String },
    /// Reviewer-only: render the persisted application list.
    ShowApplications,
}

impl Effect {
    pub fn send(screen: Screen) -> Self {
        Effect::Show {
            screen,
            mode: RenderMode::Send,
        }
    }

    pub fn edit(screen: Screen) -> Self {
        Effect::Show {
            screen,
            mode: RenderMode::EditInPlace,
        }
    }
}
