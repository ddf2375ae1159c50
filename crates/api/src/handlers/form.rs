//! Handlers for the intake form page and its dropdown choices.

use axum::extract::{Query, State};
use axum::response::Html;
use axum::Json;
use serde::{Deserialize, Serialize};
use tarannum_core::error::CoreError;
use tarannum_core::i18n::Locale;
use tarannum_core::submission::{FormField, Gender, STANDARD_STYLES};

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

const FORM_TEMPLATE: &str = include_str!("../../assets/form.html");

/// Optional `?lang=` override of the configured locale.
#[derive(Debug, Default, Deserialize)]
pub struct LocaleQuery {
    pub lang: Option<String>,
}

impl LocaleQuery {
    /// The requested locale, or `fallback` when none was asked for.
    pub fn resolve(&self, fallback: Locale) -> Result<Locale, CoreError> {
        match self.lang.as_deref().map(str::trim) {
            Some(code) if !code.is_empty() => Locale::from_code(code),
            _ => Ok(fallback),
        }
    }
}

/// One dropdown entry.
#[derive(Debug, Serialize)]
pub struct ChoiceOption {
    pub value: &'static str,
    pub label: &'static str,
}

/// Everything a client needs to render the form.
#[derive(Debug, Serialize)]
pub struct FormChoices {
    pub locale: Locale,
    pub styles: Vec<&'static str>,
    pub gender_enabled: bool,
    /// Absent when gender is not recorded.
    pub genders: Option<Vec<ChoiceOption>>,
}

fn gender_options(locale: Locale) -> Vec<ChoiceOption> {
    Gender::ALL
        .iter()
        .map(|g| ChoiceOption {
            value: g.label(Locale::En),
            label: g.label(locale),
        })
        .collect()
}

/// GET /api/v1/form/choices
///
/// Returns 400 when `lang` names an unsupported language.
pub async fn form_choices(
    State(state): State<AppState>,
    Query(query): Query<LocaleQuery>,
) -> AppResult<Json<DataResponse<FormChoices>>> {
    let intake = &state.config.intake;
    let locale = query.resolve(intake.locale)?;
    Ok(Json(DataResponse {
        data: FormChoices {
            locale,
            styles: STANDARD_STYLES.to_vec(),
            gender_enabled: intake.record_gender,
            genders: intake.record_gender.then(|| gender_options(locale)),
        },
    }))
}

/// GET /
pub async fn form_page(
    State(state): State<AppState>,
    Query(query): Query<LocaleQuery>,
) -> AppResult<Html<String>> {
    let intake = &state.config.intake;
    let locale = query.resolve(intake.locale)?;
    Ok(Html(render_form_page(locale, intake.record_gender)))
}

struct PageText {
    title: &'static str,
    audio: &'static str,
    record: &'static str,
    stop: &'static str,
    choose: &'static str,
    submit: &'static str,
    reset: &'static str,
    status: &'static str,
}

fn page_text(locale: Locale) -> PageText {
    match locale {
        Locale::En => PageText {
            title: "Tarannum Recording",
            audio: "Record or upload an audio file",
            record: "Record",
            stop: "Stop",
            choose: "Choose...",
            submit: "Submit",
            reset: "Add new audio",
            status: "Status",
        },
        Locale::Ms => PageText {
            title: "Aplikasi Rakaman Tarannum",
            audio: "Rakam atau Muat Naik Fail Audio",
            record: "Rakam",
            stop: "Henti",
            choose: "Pilih...",
            submit: "Hantar",
            reset: "Tambah Audio Baru",
            status: "Status",
        },
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn select_options(choose: &str, options: impl Iterator<Item = (String, String)>) -> String {
    let mut html = format!("<option value=\"\">{}</option>", escape_html(choose));
    for (value, label) in options {
        html.push_str(&format!(
            "<option value=\"{}\">{}</option>",
            escape_html(&value),
            escape_html(&label)
        ));
    }
    html
}

/// Render the form page for a locale, with or without the gender field.
pub fn render_form_page(locale: Locale, record_gender: bool) -> String {
    let text = page_text(locale);

    let style_options = select_options(
        text.choose,
        STANDARD_STYLES
            .iter()
            .map(|s| (s.to_string(), s.to_string())),
    );

    let gender_field = if record_gender {
        format!(
            "<label>{}<select name=\"gender\" required>{}</select></label>",
            FormField::Gender.label(locale),
            select_options(
                text.choose,
                gender_options(locale)
                    .into_iter()
                    .map(|o| (o.value.to_string(), o.label.to_string())),
            )
        )
    } else {
        String::new()
    };

    FORM_TEMPLATE
        .replace("{{lang}}", locale.code())
        .replace("{{title}}", text.title)
        .replace("{{label_name}}", FormField::Name.label(locale))
        .replace("{{gender_field}}", &gender_field)
        .replace("{{label_nationality}}", FormField::Nationality.label(locale))
        .replace("{{label_surah}}", FormField::Surah.label(locale))
        .replace("{{label_ayat}}", FormField::Ayat.label(locale))
        .replace("{{label_style}}", FormField::Style.label(locale))
        .replace("{{style_options}}", &style_options)
        .replace("{{label_audio}}", text.audio)
        .replace("{{label_record}}", text.record)
        .replace("{{label_stop}}", text.stop)
        .replace("{{label_submit}}", text.submit)
        .replace("{{label_reset}}", text.reset)
        .replace("{{label_status}}", text.status)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_lists_every_standard_style() {
        let html = render_form_page(Locale::En, true);
        for style in STANDARD_STYLES {
            assert!(html.contains(&format!("<option value=\"{style}\">{style}</option>")));
        }
        assert!(!html.contains("{{"));
    }

    #[test]
    fn gender_field_follows_config() {
        assert!(render_form_page(Locale::Ms, true).contains("name=\"gender\""));
        assert!(render_form_page(Locale::Ms, true).contains(">Lelaki<"));
        assert!(!render_form_page(Locale::En, false).contains("name=\"gender\""));
    }

    #[test]
    fn malay_page_uses_malay_labels() {
        let html = render_form_page(Locale::Ms, false);
        assert!(html.contains("Aplikasi Rakaman Tarannum"));
        assert!(html.contains("Hantar"));
        assert!(html.contains("lang=\"ms\""));
    }

    #[test]
    fn lang_query_overrides_configured_locale() {
        let query = |lang: Option<&str>| LocaleQuery {
            lang: lang.map(str::to_string),
        };
        assert_eq!(query(None).resolve(Locale::Ms).unwrap(), Locale::Ms);
        assert_eq!(query(Some(" ")).resolve(Locale::Ms).unwrap(), Locale::Ms);
        assert_eq!(query(Some("en-GB")).resolve(Locale::Ms).unwrap(), Locale::En);
        assert!(query(Some("fr")).resolve(Locale::En).is_err());
    }
}
