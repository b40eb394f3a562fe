use anyhow::{Context, Result, bail};
use colored::Colorize;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};

use crate::core::locale::{Messages, interpolate};
use crate::core::statement::{MIN_NAME_LEN, NEPTUN_LEN};

/// The identity the student confirms in the interactive form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameAndNeptun {
    pub name: String,
    pub neptun: String,
}

/// Runs the interactive statement form: shows the statement text, asks for
/// acceptance, then prompts for the student's name and Neptun code.
///
/// Declining the statement is fatal, since a submission cannot be packaged
/// without it. The name is normalized to title case, the Neptun code to
/// uppercase, matching how they appear in the generated statement.
pub fn statement_form(messages: &Messages) -> Result<NameAndNeptun> {
    for line in messages.statement.trim_end().lines() {
        println!("{}", line.dimmed());
    }
    println!();

    let choices = [messages.accept.as_str(), messages.decline.as_str()];
    let accepted = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(&messages.statement_confirmation_question)
        .items(&choices)
        .default(0)
        .interact()
        .context("Statement confirmation prompt failed")?
        == 0;

    if !accepted {
        bail!("{}", messages.statement_confirmation_declined);
    }
    println!("{}", messages.statement_confirmation_accepted.green());

    let name_too_short = interpolate(
        &messages.statement_name_too_short,
        &[("min", &MIN_NAME_LEN.to_string())],
    );
    let name_missing_space = messages.statement_name_missing_space.clone();

    let name: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(&messages.statement_name_question)
        .validate_with(move |input: &String| -> Result<(), String> {
            let trimmed = input.trim();
            if trimmed.chars().count() < MIN_NAME_LEN {
                return Err(name_too_short.clone());
            }
            if !trimmed.contains(' ') {
                return Err(name_missing_space.clone());
            }
            Ok(())
        })
        .interact_text()
        .context("Name prompt failed")?;

    let neptun_length = interpolate(
        &messages.statement_neptun_length,
        &[("length", &NEPTUN_LEN.to_string())],
    );
    let neptun_invalid = messages.statement_neptun_invalid.clone();

    let neptun: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(&messages.statement_neptun_question)
        .validate_with(move |input: &String| -> Result<(), String> {
            let trimmed = input.trim();
            if trimmed.chars().count() != NEPTUN_LEN {
                return Err(neptun_length.clone());
            }
            if !trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(neptun_invalid.clone());
            }
            Ok(())
        })
        .interact_text()
        .context("Neptun prompt failed")?;

    Ok(NameAndNeptun {
        name: title_case(&name),
        neptun: neptun.trim().to_uppercase(),
    })
}

/// `jOHN dOE` → `John Doe`; collapses repeated whitespace along the way.
fn title_case(name: &str) -> String {
    name.split_whitespace()
        .map(|part| {
            let lower = part.to_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
