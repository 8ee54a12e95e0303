//! Persistence for users and applications
//!
//! Thin rusqlite layer. Every application insert is a single statement,
//! so it either fully succeeds or has no visible effect.

pub mod schema;

pub use schema::*;

use crate::state_machine::{
    AmountSelection, ApplicantType, CollateralType, FinancingType, Language, UserId,
};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Corrupt column value: {0}")]
    Corrupt(#[from] serde_json::Error),
}

pub type DbResult<T> = Result<T, DbError>;

/// Thread-safe database handle
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    fn run_migrations(&self) -> DbResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    // ==================== User Operations ====================

    /// Create or update a user; `None` patch fields keep existing values.
    pub fn upsert_user(&self, user_id: UserId, patch: &UserPatch) -> DbResult<()> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now();
        conn.execute(
            "INSERT INTO users (user_id, full_name, handle, phone, language, created_at)
             VALUES (?1, ?2, ?3, ?4, COALESCE(?5, 'uz'), ?6)
             ON CONFLICT(user_id) DO UPDATE SET
                 full_name = COALESCE(excluded.full_name, full_name),
                 handle = COALESCE(excluded.handle, handle),
                 phone = COALESCE(excluded.phone, phone),
                 language = COALESCE(?5, language)",
            params![
                user_id,
                patch.full_name,
                patch.handle,
                patch.phone,
                patch.language.map(Language::code),
                now.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Get user by ID
    pub fn get_user(&self, user_id: UserId) -> DbResult<Option<User>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT user_id, full_name, handle, phone, language, created_at
             FROM users WHERE user_id = ?1",
            params![user_id],
            |row| {
                Ok(User {
                    user_id: row.get(0)?,
                    full_name: row.get(1)?,
                    handle: row.get(2)?,
                    phone: row.get(3)?,
                    language: parse_language(&row.get::<_, String>(4)?),
                    created_at: parse_datetime(&row.get::<_, String>(5)?),
                })
            },
        )
        .optional()
        .map_err(DbError::from)
    }

    // ==================== Application Operations ====================

    /// Insert a completed application. Single-statement, all-or-nothing.
    pub fn insert_application(&self, user_id: UserId, app: &NewApplication) -> DbResult<i64> {
        let amount_json = serde_json::to_string(&app.amount)?;
        let conn = self.conn.lock().unwrap();
        let now = Utc::now();
        conn.execute(
            "INSERT INTO applications
             (user_id, financing_type, amount, applicant_type, collateral_type, collateral_details, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                user_id,
                financing_to_str(app.financing),
                amount_json,
                applicant_to_str(app.applicant),
                collateral_to_str(app.collateral),
                app.collateral_details,
                ApplicationStatus::Pending.as_str(),
                now.to_rfc3339(),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// List all applications joined with their users, newest first.
    pub fn list_applications(&self) -> DbResult<Vec<ApplicationSummary>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT a.id, a.user_id, u.full_name, u.handle, a.financing_type, a.amount,
                    a.applicant_type, a.collateral_type, a.collateral_details, a.status, a.created_at
             FROM applications a
             JOIN users u ON a.user_id = u.user_id
             ORDER BY a.created_at DESC, a.id DESC",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, UserId>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, String>(6)?,
                row.get::<_, String>(7)?,
                row.get::<_, String>(8)?,
                row.get::<_, String>(9)?,
                row.get::<_, String>(10)?,
            ))
        })?;

        let mut out = Vec::new();
        for row in rows {
            let (id, user_id, full_name, handle, fin, amount, app, col, details, status, created) =
                row?;
            let amount: AmountSelection = serde_json::from_str(&amount)?;
            out.push(ApplicationSummary {
                id,
                user_id,
                full_name,
                handle,
                financing: parse_financing(&fin),
                amount,
                applicant: parse_applicant(&app),
                collateral: parse_collateral(&col),
                collateral_details: details,
                status: ApplicationStatus::parse(&status),
                created_at: parse_datetime(&created),
            });
        }
        Ok(out)
    }
}

fn financing_to_str(f: FinancingType) -> &'static str {
    match f {
        FinancingType::Islamic => "islamic",
        FinancingType::Cash => "cash",
        FinancingType::LargeCredit => "large_credit",
    }
}

fn parse_financing(s: &str) -> FinancingType {
    match s {
        "islamic" => FinancingType::Islamic,
        "large_credit" => FinancingType::LargeCredit,
        _ => FinancingType::Cash,
    }
}

fn applicant_to_str(a: ApplicantType) -> &'static str {
    match a {
        ApplicantType::Individual => "individual",
        ApplicantType::SoleProprietor => "sole_proprietor",
        ApplicantType::Firm => "firm",
    }
}

fn parse_applicant(s: &str) -> ApplicantType {
    match s {
        "individual" => ApplicantType::Individual,
        "sole_proprietor" => ApplicantType::SoleProprietor,
        _ => ApplicantType::Firm,
    }
}

fn collateral_to_str(c: CollateralType) -> &'static str {
    match c {
        CollateralType::RealEstate => "real_estate",
        CollateralType::Vehicle => "vehicle",
    }
}

fn parse_collateral(s: &str) -> CollateralType {
    match s {
        "vehicle" => CollateralType::Vehicle,
        _ => CollateralType::RealEstate,
    }
}

fn parse_language(s: &str) -> Language {
    Language::from_code(s).unwrap_or_default()
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
