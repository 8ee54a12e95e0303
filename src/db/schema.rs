//! Database schema and record types

use crate::state_machine::{
    AmountSelection, ApplicantType, CollateralType, FinancingType, Language, UserId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// SQL schema for initialization
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    user_id INTEGER PRIMARY KEY,
    full_name TEXT,
    handle TEXT,
    phone TEXT,
    language TEXT NOT NULL DEFAULT 'uz',
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS applications (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL,
    financing_type TEXT NOT NULL,
    amount TEXT NOT NULL,
    applicant_type TEXT NOT NULL,
    collateral_type TEXT NOT NULL,
    collateral_details TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'pending',
    created_at TEXT NOT NULL,

    FOREIGN KEY (user_id) REFERENCES users(user_id)
);

CREATE INDEX IF NOT EXISTS idx_applications_created ON applications(created_at DESC);
"#;

/// User record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub user_id: UserId,
    pub full_name: Option<String>,
    pub handle: Option<String>,
    pub phone: Option<String>,
    pub language: Language,
    pub created_at: DateTime<Utc>,
}

/// Field-wise update for `upsert_user`; `None` leaves a column untouched.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub full_name: Option<String>,
    pub handle: Option<String>,
    pub phone: Option<String>,
    pub language: Option<Language>,
}

impl UserPatch {
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            full_name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn phone(phone: impl Into<String>) -> Self {
        Self {
            phone: Some(phone.into()),
            ..Self::default()
        }
    }

    pub fn language(language: Language) -> Self {
        Self {
            language: Some(language),
            ..Self::default()
        }
    }
}

/// Review status of a persisted application. New applications start as
/// `Pending`; the review process mutates the status later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "approved" => ApplicationStatus::Approved,
            "rejected" => ApplicationStatus::Rejected,
            _ => ApplicationStatus::Pending,
        }
    }
}

/// The complete field set persisted when a draft finishes.
#[derive(Debug, Clone, PartialEq)]
pub struct NewApplication {
    pub financing: FinancingType,
    pub amount: AmountSelection,
    pub applicant: ApplicantType,
    pub collateral: CollateralType,
    pub collateral_details: String,
}

/// One row of the reviewer listing (application joined with its user).
#[derive(Debug, Clone)]
pub struct ApplicationSummary {
    pub id: i64,
    pub user_id: UserId,
    pub full_name: Option<String>,
    pub handle: Option<String>,
    pub financing: FinancingType,
    pub amount: AmountSelection,
    pub applicant: ApplicantType,
    pub collateral: CollateralType,
    pub collateral_details: String,
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
}
