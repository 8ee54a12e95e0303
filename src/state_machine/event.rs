//! Events delivered by the transport

use super::state::{AmountCode, ApplicantType, CollateralType, FinancingType, Language};

/// One inbound transport event for a user.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// The start command (`/start`).
    Start {
        /// The sender's transport handle, if the transport exposes one.
        handle: Option<String>,
    },
    /// Free text.
    Text { text: String },
    /// A menu-choice selection, already decoded from its wire code.
    Choice { choice: Choice },
    /// A structured contact submission.
    Contact { phone: String },
}

/// Decoded menu choices.
///
/// Wire codes are opaque to the transport; `parse`/`code` define the
/// closed mapping so unknown codes are dropped at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Back,
    Language(Language),
    Financing(FinancingType),
    Amount(AmountCode),
    EnterAmountManually,
    Applicant(ApplicantType),
    Collateral(CollateralType),
    ReviewApplications,
    ReviewPanel,
}

impl Choice {
    pub fn code(self) -> &'static str {
        match self {
            Choice::Back => "back",
            Choice::Language(Language::Uz) => "lang_uz",
            Choice::Language(Language::Ru) => "lang_ru",
            Choice::Financing(FinancingType::Islamic) => "fin_islamic",
            Choice::Financing(FinancingType::Cash) => "fin_cash",
            Choice::Financing(FinancingType::LargeCredit) => "fin_large",
            Choice::Amount(AmountCode::CashUpTo300M) => "amt_cash_300m",
            Choice::Amount(AmountCode::CashForeign) => "amt_cash_fx",
            Choice::Amount(AmountCode::WorkingCapitalUpTo10B) => "amt_working_10b",
            Choice::Amount(AmountCode::Above10B) => "amt_above_10b",
            Choice::Amount(AmountCode::IslamicFrom300K) => "amt_islamic_300k",
            Choice::EnterAmountManually => "amt_manual",
            Choice::Applicant(ApplicantType::Individual) => "app_individual",
            Choice::Applicant(ApplicantType::SoleProprietor) => "app_sole",
            Choice::Applicant(ApplicantType::Firm) => "app_firm",
            Choice::Collateral(CollateralType::RealEstate) => "col_estate",
            Choice::Collateral(CollateralType::Vehicle) => "col_vehicle",
            Choice::ReviewApplications => "review_apps",
            Choice::ReviewPanel => "review_panel",
        }
    }

    pub fn parse(code: &str) -> Option<Self> {
        Some(match code {
            "back" => Choice::Back,
            "lang_uz" => Choice::Language(Language::Uz),
            "lang_ru" => Choice::Language(Language::Ru),
            "fin_islamic" => Choice::Financing(FinancingType::Islamic),
            "fin_cash" => Choice::Financing(FinancingType::Cash),
            "fin_large" => Choice::Financing(FinancingType::LargeCredit),
            "amt_cash_300m" => Choice::Amount(AmountCode::CashUpTo300M),
            "amt_cash_fx" => Choice::Amount(AmountCode::CashForeign),
            "amt_working_10b" => Choice::Amount(AmountCode::WorkingCapitalUpTo10B),
            "amt_above_10b" => Choice::Amount(AmountCode::Above10B),
            "amt_islamic_300k" => Choice::Amount(AmountCode::IslamicFrom300K),
            "amt_manual" => Choice::EnterAmountManually,
            "app_individual" => Choice::Applicant(ApplicantType::Individual),
            "app_sole" => Choice::Applicant(ApplicantType::SoleProprietor),
            "app_firm" => Choice::Applicant(ApplicantType::Firm),
            "col_estate" => Choice::Collateral(CollateralType::RealEstate),
            "col_vehicle" => Choice::Collateral(CollateralType::Vehicle),
            "review_apps" => Choice::ReviewApplications,
            "review_panel" => Choice::ReviewPanel,
            _ => return None,
        })
    }
}
