//! User-facing status strings.
//!
//! The intake form is used by Malay and English speakers; every message the
//! workflow returns is rendered through a [`Locale`].

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Language used for status messages, ledger headers and gender labels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Ms,
}

impl Locale {
    /// Parse from a config value such as `en`, `ms` or `en-US`.
    pub fn from_code(code: &str) -> Result<Self, CoreError> {
        let lang = code
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match lang.as_str() {
            "en" => Ok(Self::En),
            "ms" | "my" => Ok(Self::Ms),
            _ => Err(CoreError::UnknownChoice {
                field: "locale",
                value: code.to_string(),
            }),
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Ms => "ms",
        }
    }

    /// Shown when the form arrives without a recording or upload.
    pub fn missing_audio(self) -> &'static str {
        match self {
            Self::En => "Please record or upload an audio file first.",
            Self::Ms => "Sila rakam atau muat naik fail audio dahulu.",
        }
    }

    pub fn saved(self, artifact_id: &str) -> String {
        match self {
            Self::En => format!("Audio saved with ID: {artifact_id}"),
            Self::Ms => format!("Audio berjaya disimpan dengan ID: {artifact_id}"),
        }
    }

    pub fn failed(self, error: &str) -> String {
        match self {
            Self::En => format!("Error while saving: {error}"),
            Self::Ms => format!("Ralat semasa simpan: {error}"),
        }
    }

    /// Lists the blank required fields using their localized labels.
    pub fn incomplete(self, fields: &[&str]) -> String {
        let joined = fields.join(", ");
        match self {
            Self::En => format!("Please fill in: {joined}"),
            Self::Ms => format!("Sila lengkapkan: {joined}"),
        }
    }
}
