//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::effect::{Effect, Screen};
use super::event::{Choice, Event};
use super::rules;
use super::state::*;
use super::transition::{transition, Next};
use proptest::prelude::*;

// ============================================================================
// Test Helpers
// ============================================================================

fn test_context() -> SessionContext {
    SessionContext {
        user_id: 1,
        handle: None,
        language: Language::Uz,
        known_user: true,
        is_reviewer: false,
    }
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_financing() -> impl Strategy<Value = FinancingType> {
    prop_oneof![
        Just(FinancingType::Islamic),
        Just(FinancingType::Cash),
        Just(FinancingType::LargeCredit),
    ]
}

fn arb_amount_code() -> impl Strategy<Value = AmountCode> {
    prop_oneof![
        Just(AmountCode::CashUpTo300M),
        Just(AmountCode::CashForeign),
        Just(AmountCode::WorkingCapitalUpTo10B),
        Just(AmountCode::Above10B),
        Just(AmountCode::IslamicFrom300K),
    ]
}

fn arb_amount_selection() -> impl Strategy<Value = AmountSelection> {
    prop_oneof![
        arb_amount_code().prop_map(AmountSelection::code),
        (1.0f64..2.0e10).prop_map(AmountSelection::manual),
    ]
}

proptest! {
    /// Comma and dot spellings of the same decimal parse identically.
    #[test]
    fn comma_and_dot_are_equivalent(int in 0u64..10_000_000_000, frac in 0u32..100) {
        let with_dot = format!("{int}.{frac:02}");
        let with_comma = format!("{int},{frac:02}");
        prop_assert_eq!(
            rules::parse_manual_amount(&with_dot),
            rules::parse_manual_amount(&with_comma)
        );
        prop_assert!(rules::parse_manual_amount(&with_dot).is_some());
    }

    /// A manual amount transition either stays put (rejected input) or
    /// records exactly the parsed value and advances to the applicant
    /// step; no other outcome exists.
    #[test]
    fn manual_entry_never_advances_with_invalid_amount(
        financing in arb_financing(),
        text in "[a-z0-9,.]{0,12}",
    ) {
        let draft = Draft {
            financing: Some(financing),
            min_amount: Some(rules::manual_minimum(financing)),
            ..Draft::default()
        };
        let result = transition(
            Some(FlowState::AmountManualInput),
            &draft,
            &test_context(),
            &Event::Text { text: text.clone() },
        ).unwrap();

        let parsed = rules::parse_manual_amount(&text);
        let valid = parsed.is_some_and(|v| {
            rules::validate_manual(financing, rules::manual_minimum(financing), v).is_ok()
        });
        if valid {
            prop_assert_eq!(result.next, Next::Goto(FlowState::ApplicantType));
            prop_assert_eq!(result.draft.amount, parsed.map(AmountSelection::manual));
        } else {
            prop_assert_eq!(result.next, Next::Stay);
            prop_assert_eq!(result.draft.amount, None);
        }
    }

    /// Back from the applicant step and re-choosing the same code always
    /// reproduces the applicant menu the forward path produced.
    #[test]
    fn applicant_menu_is_stable_across_back_navigation(
        financing in arb_financing(),
        index in 0usize..2,
    ) {
        let codes = rules::amount_codes(financing);
        let code = codes[index % codes.len()];
        let ctx = test_context();
        let draft = Draft { financing: Some(financing), ..Draft::default() };

        let forward = transition(
            Some(FlowState::Amount),
            &draft,
            &ctx,
            &Event::Choice { choice: Choice::Amount(code) },
        ).unwrap();

        let back = transition(
            Some(FlowState::ApplicantType),
            &forward.draft,
            &ctx,
            &Event::Choice { choice: Choice::Back },
        ).unwrap();
        prop_assert_eq!(back.next, Next::Goto(FlowState::Amount));

        let again = transition(
            Some(FlowState::Amount),
            &back.draft,
            &ctx,
            &Event::Choice { choice: Choice::Amount(code) },
        ).unwrap();
        prop_assert_eq!(forward.effects, again.effects);
    }

    /// The firm-only restriction holds for every large amount, whatever
    /// the financing category.
    #[test]
    fn large_amounts_always_restrict(amount in arb_amount_selection(), fin in arb_financing()) {
        if rules::amount_is_large(&amount) {
            prop_assert!(rules::restricted_applicants(fin, Some(&amount)));
        }
    }

    /// Only the terminal contact transition produces a Finalize effect.
    #[test]
    fn finalize_only_from_phone_contact(
        state in prop_oneof![
            Just(FlowState::FullName),
            Just(FlowState::FinancingType),
            Just(FlowState::Amount),
            Just(FlowState::AmountManualInput),
            Just(FlowState::ApplicantType),
            Just(FlowState::CollateralType),
            Just(FlowState::CollateralDetails),
        ],
        phone in "[+0-9]{5,13}",
    ) {
        let result = transition(
            Some(state),
            &Draft::default(),
            &test_context(),
            &Event::Contact { phone },
        );
        match result {
            Ok(r) => prop_assert!(
                !r.effects.iter().any(|e| matches!(e, Effect::Finalize { .. })),
                "no Finalize effect expected",
            ),
            Err(_) => {}
        }
    }

    /// The review listing never reaches a non-reviewer.
    #[test]
    fn review_listing_gated_by_identity(is_reviewer in any::<bool>()) {
        let ctx = SessionContext { is_reviewer, ..test_context() };
        let result = transition(
            None,
            &Draft::default(),
            &ctx,
            &Event::Choice { choice: Choice::ReviewApplications },
        ).unwrap();
        if is_reviewer {
            prop_assert_eq!(result.effects, vec![Effect::ShowApplications]);
        } else {
            prop_assert_eq!(result.effects, vec![Effect::send(Screen::ReviewDenied)]);
        }
    }
}
