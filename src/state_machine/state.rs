//! Conversation state types

use serde::{Deserialize, Serialize};

/// Opaque transport identity for a user.
pub type UserId = i64;

/// Supported interface languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    #[default]
    Uz,
    Ru,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Language::Uz => "uz",
            Language::Ru => "ru",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "uz" => Some(Language::Uz),
            "ru" => Some(Language::Ru),
            _ => None,
        }
    }
}

/// Financing categories offered by the intake flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinancingType {
    /// Islamic financing, USD-denominated, 300k minimum.
    Islamic,
    /// Cash credit up to 300 mln.
    Cash,
    /// Credit above 300 mln.
    LargeCredit,
}

/// Predefined amount menu codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountCode {
    CashUpTo300M,
    CashForeign,
    WorkingCapitalUpTo10B,
    Above10B,
    IslamicFrom300K,
}

/// The amount answer: either a predefined menu code or a validated
/// free-form value. Manual values carry no unit; the unit follows from
/// the financing type (USD for Islamic, UZS otherwise).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AmountSelection {
    Code { code: AmountCode },
    Manual { value: f64 },
}

impl AmountSelection {
    pub fn code(code: AmountCode) -> Self {
        AmountSelection::Code { code }
    }

    pub fn manual(value: f64) -> Self {
        AmountSelection::Manual { value }
    }
}

/// Who the financing is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicantType {
    Individual,
    SoleProprietor,
    Firm,
}

/// Collateral categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollateralType {
    RealEstate,
    Vehicle,
}

/// Where in the intake flow a user currently is.
///
/// Absence of a state means "no active conversation".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FlowState {
    LanguageSelect,
    FullName,
    FinancingType,
    Amount,
    /// Entered only via the manual-entry option on the amount menu.
    AmountManualInput,
    ApplicantType,
    CollateralType,
    CollateralDetails,
    Phone,
}

/// Answers accumulated during one in-progress conversation.
///
/// Owned exclusively by the active conversation for a user; discarded on
/// completion or restart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Draft {
    pub financing: Option<FinancingType>,
    pub amount: Option<AmountSelection>,
    pub applicant: Option<ApplicantType>,
    pub collateral: Option<CollateralType>,
    pub collateral_details: Option<String>,
    /// Minimum-amount threshold in effect for manual entry, fixed at the
    /// moment the manual option was chosen.
    pub min_amount: Option<f64>,
}

/// Per-event context the runtime resolves before calling `transition`.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub user_id: UserId,
    /// Optional transport handle, captured on first contact.
    pub handle: Option<String>,
    pub language: Language,
    /// Whether a User record already exists for this identity.
    pub known_user: bool,
    /// Whether this identity is the distinguished reviewer.
    pub is_reviewer: bool,
}
