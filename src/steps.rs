use anyhow::{Context, Result, bail};
use chrono::Local;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::builders::form::statement_form;
use crate::builders::reporter::StepReporter;
use crate::core::archive::{archive_file_name, build_archive, verify_archive};
use crate::core::locale::{Locale, LocaleTable, Messages, interpolate};
use crate::core::statement::{StatementDraft, generate_statement, parse_statement};
use crate::utils::human_size;

/// Well-known name of the statement file in the working directory.
pub const STATEMENT_FILE_NAME: &str = "statement.txt";

/// Validated program options.
#[derive(Debug, Clone)]
pub struct ProgramOptions {
    pub task: String,
    pub course: String,
    pub outdir: String,
    pub ignore: Vec<String>,
    pub verify: bool,
}

impl ProgramOptions {
    pub fn new(
        task: String,
        course: String,
        outdir: String,
        mut ignore: Vec<String>,
        verify: bool,
    ) -> Result<Self> {
        let task = required_option("task", task)?;
        let course = required_option("course", course)?;
        let outdir = required_option("outdir", outdir)?;

        // The output directory never belongs into the archive.
        ignore.push(outdir.clone());

        Ok(Self {
            task,
            course,
            outdir,
            ignore,
            verify,
        })
    }
}

fn required_option(option: &str, value: String) -> Result<String> {
    let value = value.trim().to_string();
    if value.is_empty() {
        bail!("Option '--{option}' must not be empty");
    }
    Ok(value)
}

/// State carried across the packaging steps: the validated options, the
/// locale table, and the student identity once the statement step has
/// confirmed it.
pub struct ProgramContext<'a> {
    pub options: ProgramOptions,
    pub locales: &'a LocaleTable,
    pub locale: Locale,
    pub name: String,
    pub neptun: String,
}

impl<'a> ProgramContext<'a> {
    pub fn new(options: ProgramOptions, locales: &'a LocaleTable, locale: Locale) -> Self {
        Self {
            options,
            locales,
            locale,
            name: String::new(),
            neptun: String::new(),
        }
    }

    pub fn messages(&self) -> &'a Messages {
        self.locales.messages(self.locale)
    }
}

/// Step 1: make sure a valid statement exists and learn who is submitting.
///
/// An existing `statement.txt` is parsed; an unparseable one is fatal (the
/// user has to remove or fix it, this tool does not resolve conflicts).
/// Without one, the interactive form collects the identity and the
/// generated statement is written next to the submission.
pub fn handle_statement(
    context: &mut ProgramContext,
    reporter: &mut impl StepReporter,
) -> Result<()> {
    let messages = context.messages();
    reporter.begin_step(&messages.step_statement);

    let cwd = env::current_dir().context("Failed to resolve the working directory")?;
    let statement_path = cwd.join(STATEMENT_FILE_NAME);
    let display_path = statement_path.display().to_string();

    if statement_path.is_file() {
        let content = fs::read_to_string(&statement_path)
            .with_context(|| format!("Failed to read {display_path}"))?;

        let Some(data) = parse_statement(&content, context.locales) else {
            bail!(
                "{}",
                interpolate(
                    &messages.statement_existent_but_invalid,
                    &[("path", display_path.as_str())],
                )
            );
        };

        reporter.success(&interpolate(
            &messages.statement_existent_and_valid,
            &[
                ("name", data.name.as_str()),
                ("neptun", data.neptun.as_str()),
                ("path", display_path.as_str()),
            ],
        ));

        context.name = data.name;
        context.neptun = data.neptun;
        return Ok(());
    }

    let entered = statement_form(messages)?;

    let draft = StatementDraft {
        name: Some(entered.name.clone()),
        neptun: Some(entered.neptun.clone()),
        course: Some(context.options.course.clone()),
        date: None,
        task: Some(context.options.task.clone()),
    };
    let statement = generate_statement(&draft, context.locales, context.locale)?;

    fs::write(&statement_path, statement)
        .with_context(|| format!("Failed to write {display_path}"))?;

    reporter.success(&interpolate(
        &messages.statement_created,
        &[("path", display_path.as_str())],
    ));

    context.name = entered.name;
    context.neptun = entered.neptun;
    Ok(())
}

/// Step 2: collect and compress the working directory, then write the
/// archive into the output directory. Returns the written archive path.
pub fn handle_zipping(
    context: &ProgramContext,
    reporter: &mut impl StepReporter,
) -> Result<PathBuf> {
    let messages = context.messages();
    reporter.begin_step(&messages.step_zipping);

    let cwd = env::current_dir().context("Failed to resolve the working directory")?;

    reporter.begin_task(&messages.zipping_files);
    let archive = build_archive(&cwd, &context.options.ignore)?;
    reporter.end_task(&messages.done, None);

    let zip_file_name = archive_file_name(
        &context.name,
        &context.neptun,
        &context.options.task,
        &Local::now(),
    );
    let out_dir = cwd.join(&context.options.outdir);
    let zip_path = out_dir.join(&zip_file_name);

    if !out_dir.exists() {
        reporter.begin_task(&interpolate(
            &messages.creating_output_dir,
            &[("path", out_dir.display().to_string().as_str())],
        ));
        fs::create_dir_all(&out_dir)
            .with_context(|| format!("Failed to create {}", out_dir.display()))?;
        reporter.end_task(&messages.done, None);
    }

    reporter.begin_task(&interpolate(
        &messages.writing_zip_file,
        &[("path", zip_path.display().to_string().as_str())],
    ));
    fs::write(&zip_path, &archive.bytes)
        .with_context(|| format!("Failed to write {}", zip_path.display()))?;

    let size = interpolate(
        &messages.size,
        &[("size", human_size(archive.bytes.len() as u64).as_str())],
    );
    reporter.end_task(&messages.done, Some(&size));

    Ok(zip_path)
}

/// Step 3: compare the written archive against the files on disk.
pub fn handle_verify(
    context: &ProgramContext,
    reporter: &mut impl StepReporter,
    zip_path: &Path,
) -> Result<()> {
    let messages = context.messages();
    reporter.begin_step(&messages.step_verify);

    let cwd = env::current_dir().context("Failed to resolve the working directory")?;

    reporter.begin_task(&messages.verifying_zip_file);
    verify_archive(zip_path, &cwd)?;
    reporter.end_task(&messages.done, None);

    Ok(())
}

/// Step 4: closing notices for the student.
pub fn handle_notice(context: &ProgramContext, reporter: &mut impl StepReporter) {
    let messages = context.messages();
    reporter.begin_step(&messages.step_notice);

    for line in messages.notice.trim_end().lines() {
        reporter.warn(line);
    }
}
