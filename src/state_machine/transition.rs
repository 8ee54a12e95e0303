//! Pure state transition function
//!
//! Given the current state, the accumulated draft, and one inbound event,
//! compute the next state and the effects to execute. No I/O happens
//! here; the runtime owns effect execution.

use super::effect::{Effect, RenderMode, Screen};
use super::event::{Choice, Event};
use super::rules;
use super::state::{ApplicantType, Draft, FlowState, SessionContext};
use crate::texts;
use thiserror::Error;

/// Result of a state transition.
#[derive(Debug, PartialEq)]
pub struct TransitionResult {
    pub next: Next,
    pub draft: Draft,
    pub effects: Vec<Effect>,
}

/// What happens to the session entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Next {
    /// Keep the current state (draft may still have changed).
    Stay,
    Goto(FlowState),
    /// Conversation over; the user returns to "no active conversation".
    Clear,
}

impl TransitionResult {
    fn new(next: Next, draft: Draft) -> Self {
        Self {
            next,
            draft,
            effects: vec![],
        }
    }

    fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Errors that can occur during transition.
#[derive(Debug, Error)]
pub enum TransitionError {
    /// The event has no meaning in the current state (wrong payload kind,
    /// stale menu code, or a choice that is not legal given the draft).
    #[error("event not handled in state {state:?}")]
    Unhandled { state: Option<FlowState> },
}

fn unhandled(state: Option<FlowState>) -> TransitionError {
    TransitionError::Unhandled { state }
}

/// Pure transition function.
pub fn transition(
    state: Option<FlowState>,
    draft: &Draft,
    ctx: &SessionContext,
    event: &Event,
) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // ============================================================
        // Start command: restart or create
        // ============================================================
        (_, Event::Start { .. }) => {
            if ctx.known_user {
                if ctx.is_reviewer {
                    // Review-tool entry point; no intake conversation.
                    return Ok(TransitionResult::new(Next::Clear, Draft::default())
                        .with_effect(Effect::send(Screen::ReviewPanel)));
                }
                // Language and identity already known: restart at the
                // name step, discarding any parked draft.
                Ok(TransitionResult::new(Next::Goto(FlowState::FullName), Draft::default())
                    .with_effect(Effect::send(Screen::AskFullName)))
            } else {
                Ok(
                    TransitionResult::new(Next::Goto(FlowState::LanguageSelect), Draft::default())
                        .with_effect(Effect::RegisterUser)
                        .with_effect(Effect::send(Screen::Welcome)),
                )
            }
        }

        // ============================================================
        // Review surface (stateless; reviewer-only)
        // ============================================================
        (_, Event::Choice { choice: Choice::ReviewApplications }) => {
            if ctx.is_reviewer {
                Ok(TransitionResult::new(Next::Stay, draft.clone())
                    .with_effect(Effect::ShowApplications))
            } else {
                Ok(TransitionResult::new(Next::Stay, draft.clone())
                    .with_effect(Effect::send(Screen::ReviewDenied)))
            }
        }
        (_, Event::Choice { choice: Choice::ReviewPanel }) => {
            if ctx.is_reviewer {
                Ok(TransitionResult::new(Next::Stay, draft.clone())
                    .with_effect(Effect::edit(Screen::ReviewPanel)))
            } else {
                Ok(TransitionResult::new(Next::Stay, draft.clone())
                    .with_effect(Effect::send(Screen::ReviewDenied)))
            }
        }

        // ============================================================
        // Language selection
        // ============================================================
        (Some(FlowState::LanguageSelect), Event::Choice { choice: Choice::Language(lang) }) => {
            Ok(TransitionResult::new(Next::Goto(FlowState::FullName), draft.clone())
                .with_effect(Effect::SaveLanguage { language: *lang })
                .with_effect(Effect::edit(Screen::AskFullName)))
        }

        // ============================================================
        // Full name
        // ============================================================
        (Some(FlowState::FullName), Event::Text { text }) => {
            Ok(TransitionResult::new(Next::Goto(FlowState::FinancingType), draft.clone())
                .with_effect(Effect::SaveName { name: text.clone() })
                .with_effect(Effect::send(Screen::FinancingMenu)))
        }

        // ============================================================
        // Financing type
        // ============================================================
        (Some(FlowState::FinancingType), Event::Choice { choice: Choice::Back }) => {
            Ok(TransitionResult::new(Next::Goto(FlowState::FullName), draft.clone())
                .with_effect(Effect::edit(Screen::AskFullName)))
        }
        (Some(FlowState::FinancingType), Event::Choice { choice: Choice::Financing(fin) }) => {
            let mut draft = draft.clone();
            draft.financing = Some(*fin);
            // A changed financing type invalidates the amount answer.
            draft.amount = None;
            draft.min_amount = None;
            Ok(TransitionResult::new(Next::Goto(FlowState::Amount), draft)
                .with_effect(Effect::edit(Screen::AmountMenu { financing: *fin })))
        }

        // ============================================================
        // Amount (predefined codes)
        // ============================================================
        (Some(FlowState::Amount), Event::Choice { choice: Choice::Back }) => {
            Ok(TransitionResult::new(Next::Goto(FlowState::FinancingType), draft.clone())
                .with_effect(Effect::edit(Screen::FinancingMenu)))
        }
        (Some(FlowState::Amount), Event::Choice { choice: Choice::EnterAmountManually }) => {
            let fin = draft.financing.ok_or_else(|| unhandled(state))?;
            let mut draft = draft.clone();
            draft.min_amount = Some(rules::manual_minimum(fin));
            Ok(TransitionResult::new(Next::Goto(FlowState::AmountManualInput), draft)
                .with_effect(Effect::edit(Screen::ManualAmountPrompt { financing: fin })))
        }
        (Some(FlowState::Amount), Event::Choice { choice: Choice::Amount(code) }) => {
            let fin = draft.financing.ok_or_else(|| unhandled(state))?;
            // Reject codes a stale menu could carry for another category.
            if !rules::amount_codes(fin).contains(code) {
                return Err(unhandled(state));
            }
            let mut draft = draft.clone();
            draft.amount = Some(super::state::AmountSelection::code(*code));
            let restricted = rules::restricted_applicants(fin, draft.amount.as_ref());
            Ok(TransitionResult::new(Next::Goto(FlowState::ApplicantType), draft)
                .with_effect(Effect::edit(Screen::ApplicantMenu { restricted })))
        }

        // ============================================================
        // Amount (manual entry)
        // ============================================================
        (Some(FlowState::AmountManualInput), Event::Text { text }) => {
            let fin = draft.financing.ok_or_else(|| unhandled(state))?;
            let min = draft.min_amount.unwrap_or_else(|| rules::manual_minimum(fin));

            let Some(value) = rules::parse_manual_amount(text) else {
                // Re-prompt in place; no state change, no data loss.
                return Ok(TransitionResult::new(Next::Stay, draft.clone())
                    .with_effect(Effect::send(Screen::AmountParseError)));
            };
            if rules::validate_manual(fin, min, value).is_err() {
                return Ok(TransitionResult::new(Next::Stay, draft.clone())
                    .with_effect(Effect::send(Screen::AmountBelowMinimum { financing: fin })));
            }

            let mut draft = draft.clone();
            draft.amount = Some(super::state::AmountSelection::manual(value));
            let restricted = rules::restricted_applicants(fin, draft.amount.as_ref());
            Ok(TransitionResult::new(Next::Goto(FlowState::ApplicantType), draft)
                .with_effect(Effect::send(Screen::ApplicantMenu { restricted })))
        }

        // ============================================================
        // Applicant type
        // ============================================================
        (Some(FlowState::ApplicantType), Event::Choice { choice: Choice::Back }) => {
            let fin = draft.financing.ok_or_else(|| unhandled(state))?;
            // A manual amount has no menu code to return to; reopen the
            // manual prompt instead of a regenerated code menu.
            if matches!(draft.amount, Some(super::state::AmountSelection::Manual { .. })) {
                Ok(TransitionResult::new(Next::Goto(FlowState::AmountManualInput), draft.clone())
                    .with_effect(Effect::edit(Screen::ManualAmountPrompt { financing: fin })))
            } else {
                Ok(TransitionResult::new(Next::Goto(FlowState::Amount), draft.clone())
                    .with_effect(Effect::edit(Screen::AmountMenu { financing: fin })))
            }
        }
        (Some(FlowState::ApplicantType), Event::Choice { choice: Choice::Applicant(applicant) }) => {
            let fin = draft.financing.ok_or_else(|| unhandled(state))?;
            let restricted = rules::restricted_applicants(fin, draft.amount.as_ref());
            if restricted && *applicant != ApplicantType::Firm {
                return Err(unhandled(state));
            }
            let mut draft = draft.clone();
            draft.applicant = Some(*applicant);
            Ok(TransitionResult::new(Next::Goto(FlowState::CollateralType), draft)
                .with_effect(Effect::edit(Screen::CollateralMenu)))
        }

        // ============================================================
        // Collateral type
        // ============================================================
        (Some(FlowState::CollateralType), Event::Choice { choice: Choice::Back }) => {
            let fin = draft.financing.ok_or_else(|| unhandled(state))?;
            // Same predicate as the forward path; its inputs are still
            // in the draft, so the regenerated menu cannot drift.
            let restricted = rules::restricted_applicants(fin, draft.amount.as_ref());
            Ok(TransitionResult::new(Next::Goto(FlowState::ApplicantType), draft.clone())
                .with_effect(Effect::edit(Screen::ApplicantMenu { restricted })))
        }
        (Some(FlowState::CollateralType), Event::Choice { choice: Choice::Collateral(col) }) => {
            let mut draft = draft.clone();
            draft.collateral = Some(*col);
            Ok(TransitionResult::new(Next::Goto(FlowState::CollateralDetails), draft)
                .with_effect(Effect::send(Screen::CollateralDetailsPrompt { collateral: *col })))
        }

        // ============================================================
        // Collateral details (free text)
        // ============================================================
        (Some(FlowState::CollateralDetails), Event::Text { text }) => {
            if texts::is_back_label(text) {
                return Ok(TransitionResult::new(Next::Goto(FlowState::CollateralType), draft.clone())
                    .with_effect(Effect::send(Screen::CollateralMenu)));
            }
            let mut draft = draft.clone();
            draft.collateral_details = Some(text.clone());
            Ok(TransitionResult::new(Next::Goto(FlowState::Phone), draft)
                .with_effect(Effect::send(Screen::PhonePrompt)))
        }

        // ============================================================
        // Phone (contact payload only)
        // ============================================================
        (Some(FlowState::Phone), Event::Text { text }) => {
            if texts::is_back_label(text) {
                return Ok(TransitionResult::new(Next::Goto(FlowState::CollateralType), draft.clone())
                    .with_effect(Effect::send(Screen::CollateralMenu)));
            }
            Ok(TransitionResult::new(Next::Stay, draft.clone())
                .with_effect(Effect::send(Screen::PhoneTypeWarning)))
        }
        (Some(FlowState::Phone), Event::Contact { phone }) => {
            // State is cleared regardless of how finalization goes, so a
            // partially failed side effect never strands the user here.
            Ok(TransitionResult::new(Next::Clear, draft.clone())
                .with_effect(Effect::Finalize { phone: phone.clone() }))
        }

        (state, _) => Err(unhandled(state)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state_machine::state::{
        AmountCode, AmountSelection, CollateralType, FinancingType, Language,
    };

    fn ctx() -> SessionContext {
        SessionContext {
            user_id: 100,
            handle: None,
            language: Language::Uz,
            known_user: true,
            is_reviewer: false,
        }
    }

    fn new_user_ctx() -> SessionContext {
        SessionContext {
            known_user: false,
            ..ctx()
        }
    }

    fn reviewer_ctx() -> SessionContext {
        SessionContext {
            is_reviewer: true,
            ..ctx()
        }
    }

    /// Applies one event to a mutable (state, draft) pair.
    fn step(
        state: &mut Option<FlowState>,
        draft: &mut Draft,
        ctx: &SessionContext,
        event: Event,
    ) -> Vec<Effect> {
        let result = transition(*state, draft, ctx, &event).unwrap();
        match result.next {
            Next::Stay => {}
            Next::Goto(s) => *state = Some(s),
            Next::Clear => *state = None,
        }
        *draft = result.draft;
        result.effects
    }

    fn choose(choice: Choice) -> Event {
        Event::Choice { choice }
    }

    fn text(s: &str) -> Event {
        Event::Text { text: s.to_string() }
    }

    #[test]
    fn new_user_start_creates_record_and_asks_language() {
        let result = transition(None, &Draft::default(), &new_user_ctx(), &Event::Start {
            handle: Some("someone".into()),
        })
        .unwrap();
        assert_eq!(result.next, Next::Goto(FlowState::LanguageSelect));
        assert_eq!(
            result.effects,
            vec![Effect::RegisterUser, Effect::send(Screen::Welcome)]
        );
    }

    #[test]
    fn known_user_start_skips_language() {
        let result =
            transition(None, &Draft::default(), &ctx(), &Event::Start { handle: None }).unwrap();
        assert_eq!(result.next, Next::Goto(FlowState::FullName));
        assert_eq!(result.effects, vec![Effect::send(Screen::AskFullName)]);
    }

    #[test]
    fn start_mid_flow_discards_the_draft() {
        let mut draft = Draft::default();
        draft.financing = Some(FinancingType::Cash);
        let result = transition(
            Some(FlowState::Amount),
            &draft,
            &ctx(),
            &Event::Start { handle: None },
        )
        .unwrap();
        assert_eq!(result.next, Next::Goto(FlowState::FullName));
        assert_eq!(result.draft, Draft::default());
    }

    #[test]
    fn reviewer_start_opens_review_panel() {
        let result =
            transition(None, &Draft::default(), &reviewer_ctx(), &Event::Start { handle: None })
                .unwrap();
        assert_eq!(result.next, Next::Clear);
        assert_eq!(result.effects, vec![Effect::send(Screen::ReviewPanel)]);
    }

    #[test]
    fn full_flow_with_predefined_code_ends_in_finalize() {
        let mut state = Some(FlowState::FullName);
        let mut draft = Draft::default();
        let ctx = ctx();

        step(&mut state, &mut draft, &ctx, text("Alisher Usmanov"));
        assert_eq!(state, Some(FlowState::FinancingType));

        step(&mut state, &mut draft, &ctx, choose(Choice::Financing(FinancingType::Cash)));
        assert_eq!(state, Some(FlowState::Amount));

        let effects = step(
            &mut state,
            &mut draft,
            &ctx,
            choose(Choice::Amount(AmountCode::CashUpTo300M)),
        );
        assert_eq!(state, Some(FlowState::ApplicantType));
        assert_eq!(
            effects,
            vec![Effect::edit(Screen::ApplicantMenu { restricted: false })]
        );

        step(
            &mut state,
            &mut draft,
            &ctx,
            choose(Choice::Applicant(ApplicantType::Individual)),
        );
        assert_eq!(state, Some(FlowState::CollateralType));

        let effects = step(
            &mut state,
            &mut draft,
            &ctx,
            choose(Choice::Collateral(CollateralType::RealEstate)),
        );
        assert_eq!(
            effects,
            vec![Effect::send(Screen::CollateralDetailsPrompt {
                collateral: CollateralType::RealEstate
            })]
        );

        step(&mut state, &mut draft, &ctx, text("Tashkent, 120 m2"));
        assert_eq!(state, Some(FlowState::Phone));

        let effects = step(
            &mut state,
            &mut draft,
            &ctx,
            Event::Contact { phone: "+998901234567".into() },
        );
        assert_eq!(state, None);
        assert_eq!(effects, vec![Effect::Finalize { phone: "+998901234567".into() }]);
        assert_eq!(draft.collateral_details.as_deref(), Some("Tashkent, 120 m2"));
    }

    #[test]
    fn back_then_same_code_reproduces_identical_menu() {
        let mut state = Some(FlowState::Amount);
        let mut draft = Draft {
            financing: Some(FinancingType::LargeCredit),
            ..Draft::default()
        };
        let ctx = ctx();

        let first = step(
            &mut state,
            &mut draft,
            &ctx,
            choose(Choice::Amount(AmountCode::Above10B)),
        );
        let back = step(&mut state, &mut draft, &ctx, choose(Choice::Back));
        assert_eq!(
            back,
            vec![Effect::edit(Screen::AmountMenu { financing: FinancingType::LargeCredit })]
        );
        let second = step(
            &mut state,
            &mut draft,
            &ctx,
            choose(Choice::Amount(AmountCode::Above10B)),
        );
        assert_eq!(first, second);
        assert_eq!(
            second,
            vec![Effect::edit(Screen::ApplicantMenu { restricted: true })]
        );
    }

    #[test]
    fn back_after_manual_amount_reopens_manual_prompt() {
        let mut state = Some(FlowState::AmountManualInput);
        let mut draft = Draft {
            financing: Some(FinancingType::Cash),
            min_amount: Some(0.0),
            ..Draft::default()
        };
        let ctx = ctx();

        step(&mut state, &mut draft, &ctx, text("500000"));
        assert_eq!(state, Some(FlowState::ApplicantType));

        let effects = step(&mut state, &mut draft, &ctx, choose(Choice::Back));
        assert_eq!(state, Some(FlowState::AmountManualInput));
        assert_eq!(
            effects,
            vec![Effect::edit(Screen::ManualAmountPrompt { financing: FinancingType::Cash })]
        );
    }

    #[test]
    fn garbage_manual_amount_reprompts_in_place() {
        let draft = Draft {
            financing: Some(FinancingType::Cash),
            min_amount: Some(0.0),
            ..Draft::default()
        };
        let result = transition(
            Some(FlowState::AmountManualInput),
            &draft,
            &ctx(),
            &text("abc"),
        )
        .unwrap();
        assert_eq!(result.next, Next::Stay);
        assert_eq!(result.effects, vec![Effect::send(Screen::AmountParseError)]);
        assert_eq!(result.draft.amount, None);
    }

    #[test]
    fn below_minimum_manual_amount_reprompts_in_place() {
        let draft = Draft {
            financing: Some(FinancingType::Islamic),
            min_amount: Some(rules::ISLAMIC_MINIMUM),
            ..Draft::default()
        };
        let result = transition(
            Some(FlowState::AmountManualInput),
            &draft,
            &ctx(),
            &text("299999"),
        )
        .unwrap();
        assert_eq!(result.next, Next::Stay);
        assert_eq!(
            result.effects,
            vec![Effect::send(Screen::AmountBelowMinimum { financing: FinancingType::Islamic })]
        );

        let accepted = transition(
            Some(FlowState::AmountManualInput),
            &draft,
            &ctx(),
            &text("300000"),
        )
        .unwrap();
        assert_eq!(accepted.next, Next::Goto(FlowState::ApplicantType));
        assert_eq!(accepted.draft.amount, Some(AmountSelection::manual(300_000.0)));
    }

    #[test]
    fn large_manual_amount_restricts_applicants_even_for_cash() {
        let draft = Draft {
            financing: Some(FinancingType::Cash),
            min_amount: Some(0.0),
            ..Draft::default()
        };
        let result = transition(
            Some(FlowState::AmountManualInput),
            &draft,
            &ctx(),
            &text("10000000000"),
        )
        .unwrap();
        assert_eq!(
            result.effects,
            vec![Effect::send(Screen::ApplicantMenu { restricted: true })]
        );
    }

    #[test]
    fn comma_decimal_separator_is_accepted() {
        let draft = Draft {
            financing: Some(FinancingType::Cash),
            min_amount: Some(0.0),
            ..Draft::default()
        };
        let dot = transition(Some(FlowState::AmountManualInput), &draft, &ctx(), &text("350000.50"))
            .unwrap();
        let comma =
            transition(Some(FlowState::AmountManualInput), &draft, &ctx(), &text("350000,50"))
                .unwrap();
        assert_eq!(dot.draft.amount, comma.draft.amount);
        assert_eq!(dot.draft.amount, Some(AmountSelection::manual(350_000.5)));
    }

    #[test]
    fn stale_amount_code_for_other_category_is_rejected() {
        let draft = Draft {
            financing: Some(FinancingType::Cash),
            ..Draft::default()
        };
        let result = transition(
            Some(FlowState::Amount),
            &draft,
            &ctx(),
            &choose(Choice::Amount(AmountCode::IslamicFrom300K)),
        );
        assert!(matches!(result, Err(TransitionError::Unhandled { .. })));
    }

    #[test]
    fn non_firm_choice_rejected_under_restriction() {
        let draft = Draft {
            financing: Some(FinancingType::Islamic),
            amount: Some(AmountSelection::code(AmountCode::IslamicFrom300K)),
            ..Draft::default()
        };
        let result = transition(
            Some(FlowState::ApplicantType),
            &draft,
            &ctx(),
            &choose(Choice::Applicant(ApplicantType::Individual)),
        );
        assert!(matches!(result, Err(TransitionError::Unhandled { .. })));

        let firm = transition(
            Some(FlowState::ApplicantType),
            &draft,
            &ctx(),
            &choose(Choice::Applicant(ApplicantType::Firm)),
        )
        .unwrap();
        assert_eq!(firm.next, Next::Goto(FlowState::CollateralType));
    }

    #[test]
    fn collateral_back_recomputes_restriction_from_draft() {
        let draft = Draft {
            financing: Some(FinancingType::Cash),
            amount: Some(AmountSelection::manual(10_000_000_000.0)),
            applicant: Some(ApplicantType::Firm),
            ..Draft::default()
        };
        let result = transition(
            Some(FlowState::CollateralType),
            &draft,
            &ctx(),
            &choose(Choice::Back),
        )
        .unwrap();
        assert_eq!(result.next, Next::Goto(FlowState::ApplicantType));
        assert_eq!(
            result.effects,
            vec![Effect::edit(Screen::ApplicantMenu { restricted: true })]
        );
    }

    #[test]
    fn changing_financing_invalidates_the_amount() {
        let draft = Draft {
            financing: Some(FinancingType::LargeCredit),
            amount: Some(AmountSelection::code(AmountCode::Above10B)),
            ..Draft::default()
        };
        let result = transition(
            Some(FlowState::FinancingType),
            &draft,
            &ctx(),
            &choose(Choice::Financing(FinancingType::Cash)),
        )
        .unwrap();
        assert_eq!(result.draft.amount, None);
        assert_eq!(result.draft.min_amount, None);
    }

    #[test]
    fn back_phrase_in_either_language_leaves_collateral_details() {
        for phrase in ["🔙 Orqaga", "🔙 Назад"] {
            let result = transition(
                Some(FlowState::CollateralDetails),
                &Draft::default(),
                &ctx(),
                &text(phrase),
            )
            .unwrap();
            assert_eq!(result.next, Next::Goto(FlowState::CollateralType));
            assert_eq!(result.effects, vec![Effect::send(Screen::CollateralMenu)]);
        }
    }

    #[test]
    fn text_at_phone_step_warns_without_advancing() {
        let result =
            transition(Some(FlowState::Phone), &Draft::default(), &ctx(), &text("+99890"))
                .unwrap();
        assert_eq!(result.next, Next::Stay);
        assert_eq!(result.effects, vec![Effect::send(Screen::PhoneTypeWarning)]);
    }

    #[test]
    fn contact_at_phone_step_clears_and_finalizes() {
        let result = transition(
            Some(FlowState::Phone),
            &Draft::default(),
            &ctx(),
            &Event::Contact { phone: "+998".into() },
        )
        .unwrap();
        assert_eq!(result.next, Next::Clear);
        assert_eq!(result.effects, vec![Effect::Finalize { phone: "+998".into() }]);
    }

    #[test]
    fn review_listing_denied_for_non_reviewer() {
        let result = transition(
            None,
            &Draft::default(),
            &ctx(),
            &choose(Choice::ReviewApplications),
        )
        .unwrap();
        assert_eq!(result.next, Next::Stay);
        assert_eq!(result.effects, vec![Effect::send(Screen::ReviewDenied)]);
    }

    #[test]
    fn review_listing_allowed_for_reviewer() {
        let result = transition(
            None,
            &Draft::default(),
            &reviewer_ctx(),
            &choose(Choice::ReviewApplications),
        )
        .unwrap();
        assert_eq!(result.effects, vec![Effect::ShowApplications]);
    }

    #[test]
    fn contact_outside_phone_state_is_unhandled() {
        let result = transition(
            Some(FlowState::FullName),
            &Draft::default(),
            &ctx(),
            &Event::Contact { phone: "+998".into() },
        );
        assert!(matches!(result, Err(TransitionError::Unhandled { .. })));
    }
}
