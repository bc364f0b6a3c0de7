//! Email recipients and their delivery preferences.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Message language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Turkish (default).
    #[default]
    Tr,
    /// English.
    En,
}

impl Language {
    /// Parse a stored language code, falling back to Turkish.
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_lowercase().as_str() {
            "en" => Self::En,
            _ => Self::Tr,
        }
    }
}

/// A user together with their email preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Recipient {
    /// The user.
    pub user_id: Uuid,
    /// Delivery address.
    pub email: String,
    /// Display name.
    pub name: Option<String>,
    /// Preferred language code (`tr` or `en`).
    pub language: String,
    /// Master email switch.
    pub email_enabled: bool,
    /// Whether the daily digest is wanted.
    pub daily_digest_enabled: bool,
    /// Whether critical alerts are wanted.
    pub critical_alerts_enabled: bool,
}

impl Recipient {
    /// Parsed language preference.
    pub fn preferred_language(&self) -> Language {
        Language::from_code(&self.language)
    }

    /// Whether the daily digest should be sent.
    pub fn wants_digest(&self) -> bool {
        self.email_enabled && self.daily_digest_enabled
    }

    /// Whether critical alerts should be sent.
    pub fn wants_critical_alerts(&self) -> bool {
        self.email_enabled && self.critical_alerts_enabled
    }

    /// Name for greetings, falling back to the address.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.email)
    }
}
