use colored::Colorize;
use std::io::{self, Write};

use crate::core::locale::interpolate;

/// Console progress reporting for the packaging steps.
///
/// The trait keeps the step handlers independent of how progress is shown;
/// `ConsoleReporter` is the implementation used by the CLI.
pub trait StepReporter {
    /// Opens a new numbered step with a banner line.
    fn begin_step(&mut self, title: &str);

    /// Starts a numbered sub-task inside the current step. The line is left
    /// open; `end_task` completes it.
    fn begin_task(&mut self, label: &str);

    /// Completes the currently open sub-task line.
    fn end_task(&mut self, done_label: &str, detail: Option<&str>);

    fn success(&self, message: &str);

    fn warn(&self, message: &str);
}

/// Prints step banners and task progress to the standard output.
pub struct ConsoleReporter {
    step_label: String,
    step: usize,
    task: usize,
}

impl ConsoleReporter {
    /// `step_label` is the localized banner template, with `{{step}}` and
    /// `{{title}}` tokens.
    pub fn new(step_label: &str) -> Self {
        Self {
            step_label: step_label.to_string(),
            step: 0,
            task: 0,
        }
    }
}

impl StepReporter for ConsoleReporter {
    fn begin_step(&mut self, title: &str) {
        self.step += 1;
        self.task = 0;

        let banner = interpolate(
            &self.step_label,
            &[("step", &self.step.to_string()), ("title", title)],
        );

        println!();
        println!("{}", banner.cyan().bold());
        println!();
    }

    fn begin_task(&mut self, label: &str) {
        self.task += 1;
        print!(" {}. {}... ", self.task, label);
        // The line stays open until end_task; make the label visible now.
        io::stdout().flush().ok();
    }

    fn end_task(&mut self, done_label: &str, detail: Option<&str>) {
        match detail {
            Some(detail) => println!("{} ({detail})", done_label.green()),
            None => println!("{}", done_label.green()),
        }
    }

    fn success(&self, message: &str) {
        println!("{}", message.green());
    }

    fn warn(&self, message: &str) {
        println!("{}", message.yellow());
    }
}
