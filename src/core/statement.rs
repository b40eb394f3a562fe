use chrono::Local;
use regex::Regex;
use thiserror::Error;

use crate::core::locale::{Locale, LocaleTable, interpolate};

/// Minimum length of a student name, after trimming.
pub const MIN_NAME_LEN: usize = 2;
/// Exact length of a Neptun code.
pub const NEPTUN_LEN: usize = 6;

const DATE_FORMAT: &str = "%Y. %m. %d.";

/// Placeholder tokens of the statement templates paired with the capture
/// group each one compiles to. The date group tolerates the optional spaces
/// between the date parts so hand-edited statements still parse.
const PLACEHOLDER_GROUPS: [(&str, &str); 5] = [
    ("{{name}}", "(?P<name>.+)"),
    ("{{neptun}}", "(?P<neptun>[a-zA-Z0-9]{6})"),
    ("{{course}}", "(?P<course>.+)"),
    ("{{date}}", r"(?P<date>\d{4}\.\s?\d{2}\.\s?\d{2}\.)"),
    ("{{task}}", "(?P<task>.+)"),
];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StatementError {
    #[error("invalid statement field '{field}': {reason}")]
    Validation { field: &'static str, reason: String },
}

fn validation(field: &'static str, reason: impl Into<String>) -> StatementError {
    StatementError::Validation {
        field,
        reason: reason.into(),
    }
}

/// Partially-filled statement data, as gathered from the CLI options and the
/// interactive form. A missing date is filled with the current day during
/// generation; every other missing field fails validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatementDraft {
    pub name: Option<String>,
    pub neptun: Option<String>,
    pub course: Option<String>,
    pub date: Option<String>,
    pub task: Option<String>,
}

/// Fully-populated, validated statement data.
///
/// Instances only exist after validation: both the interactive path and the
/// parse-an-existing-file path go through [`StatementData::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementData {
    pub name: String,
    pub neptun: String,
    pub course: String,
    pub date: String,
    pub task: String,
}

impl StatementData {
    /// Validates the raw field values and builds a `StatementData`.
    ///
    /// All fields are trimmed first. The error names the first offending
    /// field, which the generation path surfaces to the user as-is.
    pub fn new(
        name: &str,
        neptun: &str,
        course: &str,
        date: &str,
        task: &str,
    ) -> Result<Self, StatementError> {
        let name = name.trim();
        if name.chars().count() < MIN_NAME_LEN {
            return Err(validation(
                "name",
                format!("must be at least {MIN_NAME_LEN} characters long"),
            ));
        }

        let neptun = neptun.trim();
        if neptun.chars().count() != NEPTUN_LEN
            || !neptun.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return Err(validation(
                "neptun",
                format!("must be exactly {NEPTUN_LEN} alphanumeric characters"),
            ));
        }

        let course = required("course", course)?;
        let date = required("date", date)?;
        let task = required("task", task)?;

        Ok(Self {
            name: name.to_string(),
            neptun: neptun.to_string(),
            course,
            date,
            task,
        })
    }
}

fn required(field: &'static str, value: &str) -> Result<String, StatementError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(validation(field, "must not be empty"));
    }
    Ok(value.to_string())
}

/// Formats a date the way the statement templates expect it, e.g.
/// `2023. 11. 30.`.
pub fn format_statement_date(date: &chrono::NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Fills the statement template of the given locale with the draft data.
///
/// A missing date is replaced with the current local date. The fully
/// populated data is validated before substitution; an invalid field is a
/// caller bug and is reported as a [`StatementError::Validation`] naming the
/// field.
pub fn generate_statement(
    draft: &StatementDraft,
    locales: &LocaleTable,
    locale: Locale,
) -> Result<String, StatementError> {
    let date = match &draft.date {
        Some(date) => date.clone(),
        None => format_statement_date(&Local::now().date_naive()),
    };

    let data = StatementData::new(
        draft.name.as_deref().unwrap_or_default(),
        draft.neptun.as_deref().unwrap_or_default(),
        draft.course.as_deref().unwrap_or_default(),
        &date,
        draft.task.as_deref().unwrap_or_default(),
    )?;

    let template = &locales.messages(locale).statement;
    Ok(interpolate(
        template,
        &[
            ("name", &data.name),
            ("neptun", &data.neptun),
            ("course", &data.course),
            ("date", &data.date),
            ("task", &data.task),
        ],
    ))
}

/// Compiles a statement template into a matcher with named capture groups.
///
/// The template is trimmed and regex-escaped first, then each placeholder
/// token is swapped for its capture group. The token searched for must be
/// escaped with the same routine, because the escape pass has already turned
/// `{{name}}` into `\{\{name\}\}` inside the pattern text. The result is
/// anchored at a line start in multi-line mode.
fn compile_template(template: &str) -> Result<Regex, regex::Error> {
    let mut pattern = regex::escape(template.trim());

    for (placeholder, group) in PLACEHOLDER_GROUPS {
        pattern = pattern.replace(&regex::escape(placeholder), group);
    }

    Regex::new(&format!("(?m)^{pattern}"))
}

/// Extracts statement data from the given content.
///
/// Every locale's template is tried in `Locale::ALL` order. The first
/// template that matches structurally decides the outcome: its captures are
/// validated, and if they fail validation the whole parse returns `None`
/// without trying further locales. `None` is also returned when no template
/// matches at all. This is an expected outcome, not an error; the caller
/// decides whether an unparseable statement is fatal.
pub fn parse_statement(content: &str, locales: &LocaleTable) -> Option<StatementData> {
    let content = content.trim();

    for locale in Locale::ALL {
        // A template that does not compile cannot match; skip it.
        let Ok(regex) = compile_template(&locales.messages(locale).statement) else {
            continue;
        };

        if let Some(captures) = regex.captures(content) {
            let field = |name: &str| captures.name(name).map(|m| m.as_str()).unwrap_or_default();

            return StatementData::new(
                field("name"),
                field("neptun"),
                field("course"),
                field("date"),
                field("task"),
            )
            .ok();
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locales() -> LocaleTable {
        LocaleTable::load().unwrap()
    }

    fn draft() -> StatementDraft {
        StatementDraft {
            name: Some("John Doe".to_string()),
            neptun: Some("ABC123".to_string()),
            course: Some("Web Programming".to_string()),
            date: Some("2023. 11. 30.".to_string()),
            task: Some("PHP assignment".to_string()),
        }
    }

    #[test]
    fn test_generate_then_parse_round_trip() {
        let table = locales();

        for locale in Locale::ALL {
            let statement = generate_statement(&draft(), &table, locale).unwrap();
            let parsed = parse_statement(&statement, &table)
                .unwrap_or_else(|| panic!("statement for locale '{locale}' did not parse back"));

            assert_eq!(parsed.name, "John Doe");
            assert_eq!(parsed.neptun, "ABC123");
            assert_eq!(parsed.course, "Web Programming");
            assert_eq!(parsed.date, "2023. 11. 30.");
            assert_eq!(parsed.task, "PHP assignment");
        }
    }

    #[test]
    fn test_generate_fills_missing_date_with_today() {
        let table = locales();
        let mut data = draft();
        data.date = None;

        let statement = generate_statement(&data, &table, Locale::En).unwrap();
        let expected = format_statement_date(&Local::now().date_naive());

        assert!(statement.contains(&expected));
    }

    #[test]
    fn test_generate_names_the_offending_field() {
        let table = locales();
        let mut data = draft();
        data.course = None;

        let error = generate_statement(&data, &table, Locale::En).unwrap_err();
        assert!(matches!(
            error,
            StatementError::Validation { field: "course", .. }
        ));
    }

    #[test]
    fn test_generate_rejects_short_name() {
        let table = locales();
        let mut data = draft();
        data.name = Some("X".to_string());

        let error = generate_statement(&data, &table, Locale::En).unwrap_err();
        assert!(matches!(
            error,
            StatementError::Validation { field: "name", .. }
        ));
    }

    #[test]
    fn test_parse_returns_none_for_foreign_content() {
        let table = locales();

        assert_eq!(parse_statement("", &table), None);
        assert_eq!(
            parse_statement("Just some prose about homework and zip files.", &table),
            None
        );
    }

    #[test]
    fn test_parse_returns_none_for_wrong_neptun_shape() {
        let table = locales();

        // Too many characters: the template's six-character group cannot
        // match structurally, so the parse comes back empty.
        let statement = generate_statement(&draft(), &table, Locale::En)
            .unwrap()
            .replace("ABC123", "ABC1234");

        assert_eq!(parse_statement(&statement, &table), None);
    }

    #[test]
    fn test_parse_returns_none_when_captures_fail_validation() {
        let table = locales();

        // "X" matches the name group structurally but is below the minimum
        // name length, so the parse must give up rather than error out.
        let statement = generate_statement(&draft(), &table, Locale::En)
            .unwrap()
            .replace("John Doe", "X");

        assert_eq!(parse_statement(&statement, &table), None);
    }

    #[test]
    fn test_parse_tolerates_surrounding_whitespace() {
        let table = locales();
        let statement = generate_statement(&draft(), &table, Locale::Hu).unwrap();
        let padded = format!("\n\n{statement}\n\n");

        let parsed = parse_statement(&padded, &table).unwrap();
        assert_eq!(parsed.neptun, "ABC123");
    }

    #[test]
    fn test_validation_trims_fields() {
        let data = StatementData::new(
            "  John Doe ",
            " abc123 ",
            " Web Programming ",
            " 2023. 11. 30. ",
            " PHP assignment ",
        )
        .unwrap();

        assert_eq!(data.name, "John Doe");
        assert_eq!(data.neptun, "abc123");
        assert_eq!(data.task, "PHP assignment");
    }
}
