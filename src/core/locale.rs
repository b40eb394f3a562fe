use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::fmt;

// Locale bundles ship inside the binary; there is nothing to install next to it.
const EN_YAML: &str = include_str!("../locales/en.yaml");
const HU_YAML: &str = include_str!("../locales/hu.yaml");

/// A supported locale of the tool.
///
/// Parsing iterates the variants in the order of `Locale::ALL`, so the order
/// here is the deterministic locale-trial order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locale {
    En,
    Hu,
}

impl Locale {
    pub const ALL: [Locale; 2] = [Locale::En, Locale::Hu];

    /// Picks the locale for console output from the `LC_ALL`/`LANG`
    /// environment, falling back to English.
    pub fn detect() -> Self {
        let lang = env::var("LC_ALL")
            .or_else(|_| env::var("LANG"))
            .unwrap_or_default();

        if lang.to_lowercase().starts_with("hu") {
            Locale::Hu
        } else {
            Locale::En
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locale::En => write!(f, "en"),
            Locale::Hu => write!(f, "hu"),
        }
    }
}

/// The message table of a single locale.
///
/// `statement` is the authorship statement template with `{{placeholder}}`
/// tokens; everything else is UI text for the CLI.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Messages {
    pub statement: String,

    pub fatal_error: String,

    pub step: String,
    pub step_statement: String,
    pub step_zipping: String,
    pub step_verify: String,
    pub step_notice: String,

    pub statement_existent_and_valid: String,
    pub statement_existent_but_invalid: String,
    pub statement_created: String,

    pub statement_confirmation_question: String,
    pub accept: String,
    pub decline: String,
    pub statement_confirmation_declined: String,
    pub statement_confirmation_accepted: String,

    pub statement_name_question: String,
    pub statement_name_too_short: String,
    pub statement_name_missing_space: String,
    pub statement_neptun_question: String,
    pub statement_neptun_length: String,
    pub statement_neptun_invalid: String,

    pub zipping_files: String,
    pub creating_output_dir: String,
    pub writing_zip_file: String,
    pub verifying_zip_file: String,
    pub done: String,
    pub size: String,

    pub notice: String,
}

/// An immutable table holding the messages of every supported locale.
///
/// Built once at startup and passed by reference wherever localized text is
/// needed; no module keeps locale state of its own.
#[derive(Debug)]
pub struct LocaleTable {
    en: Messages,
    hu: Messages,
}

impl LocaleTable {
    pub fn load() -> Result<Self> {
        let en = serde_yaml::from_str(EN_YAML).context("Failed to parse the embedded en locale")?;
        let hu = serde_yaml::from_str(HU_YAML).context("Failed to parse the embedded hu locale")?;

        Ok(Self { en, hu })
    }

    pub fn messages(&self, locale: Locale) -> &Messages {
        match locale {
            Locale::En => &self.en,
            Locale::Hu => &self.hu,
        }
    }
}

/// Replaces every `{{key}}` token in `text` with its substitution value.
pub fn interpolate(text: &str, substitutions: &[(&str, &str)]) -> String {
    let mut result = text.to_string();
    for (key, value) in substitutions {
        result = result.replace(&format!("{{{{{key}}}}}"), value);
    }
    result
}
