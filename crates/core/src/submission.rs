//! Submission form fields, their validation, and the ledger row they produce.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::i18n::Locale;
use crate::ledger::LedgerSchema;
use crate::naming::format_timestamp;
use crate::remote::ArtifactId;

// ---------------------------------------------------------------------------
// Style
// ---------------------------------------------------------------------------

/// Styles offered in the form dropdown.
///
/// The list is open: [`Style`] accepts any non-blank label so new maqamat can
/// be recorded without a release.
pub const STANDARD_STYLES: &[&str] = &[
    "Bayati", "Hijaz", "Nahawand", "Rast", "Sobah", "Sika", "Jiharkah",
];

/// Performance style (tarannum) of a recitation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Style(String);

impl Style {
    /// Accept any non-blank label, trimmed.
    pub fn new(label: &str) -> Result<Self, CoreError> {
        let label = label.trim();
        if label.is_empty() {
            return Err(CoreError::Validation("style must not be blank".into()));
        }
        Ok(Self(label.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the label is one of [`STANDARD_STYLES`].
    pub fn is_standard(&self) -> bool {
        STANDARD_STYLES.contains(&self.0.as_str())
    }

    /// Label safe for use inside a file name.
    ///
    /// Whitespace becomes `_`; path separators are replaced as well so a
    /// free-form style can never escape the staging directory.
    pub fn sanitized(&self) -> String {
        self.0
            .chars()
            .map(|c| {
                if c.is_whitespace() || c == '/' || c == '\\' {
                    '_'
                } else {
                    c
                }
            })
            .collect()
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Gender
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub const ALL: [Gender; 2] = [Gender::Male, Gender::Female];

    /// Parse from an English or Malay label, case-insensitively.
    pub fn parse(label: &str) -> Result<Self, CoreError> {
        match label.trim().to_lowercase().as_str() {
            "male" | "lelaki" => Ok(Self::Male),
            "female" | "perempuan" => Ok(Self::Female),
            _ => Err(CoreError::UnknownChoice {
                field: "gender",
                value: label.to_string(),
            }),
        }
    }

    pub fn label(self, locale: Locale) -> &'static str {
        match (self, locale) {
            (Self::Male, Locale::En) => "Male",
            (Self::Female, Locale::En) => "Female",
            (Self::Male, Locale::Ms) => "Lelaki",
            (Self::Female, Locale::Ms) => "Perempuan",
        }
    }
}

// ---------------------------------------------------------------------------
// Form
// ---------------------------------------------------------------------------

/// A form field that must be present before a submission is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormField {
    Name,
    Gender,
    Nationality,
    Surah,
    Ayat,
    Style,
}

impl FormField {
    pub fn label(self, locale: Locale) -> &'static str {
        match (self, locale) {
            (Self::Name, Locale::En) => "Name",
            (Self::Name, Locale::Ms) => "Nama",
            (Self::Gender, Locale::En) => "Gender",
            (Self::Gender, Locale::Ms) => "Jantina",
            (Self::Nationality, _) => "Nationality",
            (Self::Surah, _) => "Surah",
            (Self::Ayat, Locale::En) => "Verse",
            (Self::Ayat, Locale::Ms) => "Ayat",
            (Self::Style, Locale::En) => "Style",
            (Self::Style, Locale::Ms) => "Jenis Tarannum",
        }
    }
}

/// Recorded or uploaded audio as received from the client.
#[derive(Debug, Clone, Default)]
pub struct AudioInput {
    /// File name supplied by the browser, if any. Informational only.
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
}

/// Raw form values exactly as the client sent them.
#[derive(Debug, Clone, Default)]
pub struct SubmissionForm {
    pub name: String,
    pub gender: Option<String>,
    pub nationality: String,
    /// Scripture unit (surah) identifier.
    pub surah: String,
    /// Verse (ayat) identifier.
    pub ayat: String,
    pub style: String,
    pub audio: Option<AudioInput>,
}

/// Why a form was turned away before any remote call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormRejection {
    MissingAudio,
    /// Required fields that were blank or not a recognised choice.
    Incomplete(Vec<FormField>),
}

/// Validated metadata for one submission, before upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionDetails {
    pub name: String,
    pub gender: Option<Gender>,
    pub nationality: String,
    pub surah: String,
    pub ayat: String,
    pub style: Style,
}

impl SubmissionForm {
    /// Check completeness and split the form into metadata and audio.
    ///
    /// Audio is checked first: a form without audio is always reported as
    /// [`FormRejection::MissingAudio`], whatever else is missing. An empty
    /// payload counts as missing. Gender is only required when the schema
    /// records it.
    pub fn into_parts(
        self,
        schema: LedgerSchema,
    ) -> Result<(SubmissionDetails, AudioInput), FormRejection> {
        let audio = match self.audio {
            Some(audio) if !audio.bytes.is_empty() => audio,
            _ => return Err(FormRejection::MissingAudio),
        };

        let mut missing = Vec::new();
        let mut required = |field: FormField, value: &str| {
            let value = value.trim();
            if value.is_empty() {
                missing.push(field);
            }
            value.to_string()
        };

        let name = required(FormField::Name, &self.name);
        let nationality = required(FormField::Nationality, &self.nationality);
        let surah = required(FormField::Surah, &self.surah);
        let ayat = required(FormField::Ayat, &self.ayat);

        let gender = if schema.include_gender {
            match self.gender.as_deref().map(Gender::parse) {
                Some(Ok(gender)) => Some(gender),
                _ => {
                    missing.push(FormField::Gender);
                    None
                }
            }
        } else {
            None
        };

        let style = Style::new(&self.style).ok();
        if style.is_none() {
            missing.push(FormField::Style);
        }

        match style {
            Some(style) if missing.is_empty() => Ok((
                SubmissionDetails {
                    name,
                    gender,
                    nationality,
                    surah,
                    ayat,
                    style,
                },
                audio,
            )),
            _ => {
                missing.sort_by_key(|field| *field as u8);
                Err(FormRejection::Incomplete(missing))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Submission record
// ---------------------------------------------------------------------------

/// A fully processed submission: metadata, submit time and uploaded artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub timestamp: NaiveDateTime,
    pub details: SubmissionDetails,
    pub artifact_id: ArtifactId,
}

impl Submission {
    /// Row values in the fixed ledger column order.
    pub fn ledger_row(&self, schema: LedgerSchema, locale: Locale) -> Vec<String> {
        let d = &self.details;
        let mut row = Vec::with_capacity(schema.column_count());
        row.push(format_timestamp(&self.timestamp));
        row.push(d.name.clone());
        if schema.include_gender {
            row.push(
                d.gender
                    .map(|g| g.label(locale).to_string())
                    .unwrap_or_default(),
            );
        }
        row.push(d.nationality.clone());
        row.push(d.surah.clone());
        row.push(d.ayat.clone());
        row.push(d.style.to_string());
        row.push(self.artifact_id.clone());
        row
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::NaiveDate;

    use super::*;

    fn complete_form() -> SubmissionForm {
        SubmissionForm {
            name: "Ali".into(),
            gender: Some("Male".into()),
            nationality: "Malaysia".into(),
            surah: "2".into(),
            ayat: "255".into(),
            style: "Bayati".into(),
            audio: Some(AudioInput {
                file_name: Some("take1.wav".into()),
                bytes: vec![1, 2, 3],
            }),
        }
    }

    #[test]
    fn sanitized_style_replaces_spaces_and_separators() {
        let style = Style::new("  Nahawand Murakkab/2 ").unwrap();
        assert_eq!(style.as_str(), "Nahawand Murakkab/2");
        assert_eq!(style.sanitized(), "Nahawand_Murakkab_2");
    }

    #[test]
    fn open_list_accepts_unlisted_style() {
        let style = Style::new("Kurdi").unwrap();
        assert!(!style.is_standard());
        assert!(Style::new("Hijaz").unwrap().is_standard());
        assert!(Style::new("   ").is_err());
    }

    #[test]
    fn gender_parses_both_languages() {
        assert_eq!(Gender::parse("lelaki").unwrap(), Gender::Male);
        assert_eq!(Gender::parse(" Female ").unwrap(), Gender::Female);
        assert!(Gender::parse("other").is_err());
        assert_eq!(Gender::Female.label(Locale::Ms), "Perempuan");
    }

    #[test]
    fn missing_audio_wins_over_blank_fields() {
        let form = SubmissionForm {
            audio: None,
            name: String::new(),
            ..complete_form()
        };
        assert_eq!(
            form.into_parts(LedgerSchema::default()).unwrap_err(),
            FormRejection::MissingAudio
        );
    }

    #[test]
    fn empty_audio_payload_counts_as_missing() {
        let form = SubmissionForm {
            audio: Some(AudioInput::default()),
            ..complete_form()
        };
        assert_matches!(
            form.into_parts(LedgerSchema::default()),
            Err(FormRejection::MissingAudio)
        );
    }

    #[test]
    fn blank_fields_are_listed_in_form_order() {
        let form = SubmissionForm {
            style: " ".into(),
            name: String::new(),
            gender: Some("unknown".into()),
            ..complete_form()
        };
        assert_eq!(
            form.into_parts(LedgerSchema::default()).unwrap_err(),
            FormRejection::Incomplete(vec![
                FormField::Name,
                FormField::Gender,
                FormField::Style
            ])
        );
    }

    #[test]
    fn gender_ignored_when_schema_omits_it() {
        let form = SubmissionForm {
            gender: None,
            ..complete_form()
        };
        let (details, _) = form
            .into_parts(LedgerSchema {
                include_gender: false,
            })
            .unwrap();
        assert_eq!(details.gender, None);
    }

    #[test]
    fn ledger_row_follows_column_order() {
        let (details, _) = complete_form()
            .into_parts(LedgerSchema::default())
            .unwrap();
        let submission = Submission {
            timestamp: NaiveDate::from_ymd_opt(2024, 3, 1)
                .unwrap()
                .and_hms_opt(9, 5, 7)
                .unwrap(),
            details,
            artifact_id: "file-1".into(),
        };

        assert_eq!(
            submission.ledger_row(LedgerSchema::default(), Locale::En),
            vec![
                "20240301_090507",
                "Ali",
                "Male",
                "Malaysia",
                "2",
                "255",
                "Bayati",
                "file-1"
            ]
        );
        assert_eq!(
            submission
                .ledger_row(LedgerSchema { include_gender: false }, Locale::En)
                .len(),
            7
        );
    }
}
