//! Core intake conversation state machine
//!
//! Pure state transitions; all I/O happens in the runtime via effects.

pub mod effect;
pub mod event;
pub mod rules;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::{Effect, RenderMode, Screen};
pub use event::{Choice, Event};
pub use state::{
    AmountCode, AmountSelection, ApplicantType, CollateralType, Draft, FinancingType, FlowState,
    Language, SessionContext, UserId,
};
pub use transition::{transition, Next, TransitionError, TransitionResult};
