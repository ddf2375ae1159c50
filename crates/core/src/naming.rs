//! Artifact naming convention.
//!
//! Uploaded recordings are named `{YYYYMMDD_HHMMSS}_{style}.wav`, where the
//! timestamp is the submit time and the style has whitespace replaced by `_`.

use chrono::NaiveDateTime;

use crate::submission::Style;

/// Second-resolution timestamp used in file names and ledger rows.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Extension given to every uploaded recording.
pub const AUDIO_EXTENSION: &str = "wav";

pub fn format_timestamp(timestamp: &NaiveDateTime) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

/// Display name of the uploaded artifact.
///
/// ```
/// use chrono::NaiveDate;
/// use tarannum_core::naming::artifact_file_name;
/// use tarannum_core::submission::Style;
///
/// let at = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap().and_hms_opt(3, 4, 5).unwrap();
/// let style = Style::new("Nahawand Murakkab").unwrap();
/// assert_eq!(artifact_file_name(&at, &style), "20240102_030405_Nahawand_Murakkab.wav");
/// ```
pub fn artifact_file_name(timestamp: &NaiveDateTime, style: &Style) -> String {
    format!(
        "{}_{}.{AUDIO_EXTENSION}",
        format_timestamp(timestamp),
        style.sanitized()
    )
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn timestamp_is_zero_padded() {
        let at = NaiveDate::from_ymd_opt(2025, 12, 31)
            .unwrap()
            .and_hms_opt(23, 0, 9)
            .unwrap();
        assert_eq!(format_timestamp(&at), "20251231_230009");
    }

    #[test]
    fn single_word_style() {
        let at = NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(
            artifact_file_name(&at, &Style::new("Hijaz").unwrap()),
            "20250101_000000_Hijaz.wav"
        );
    }
}
