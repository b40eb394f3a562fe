use anyhow::Result;
use clap::Parser;
use colored::Colorize;

use homework_zipper::builders::reporter::ConsoleReporter;
use homework_zipper::core::locale::{Locale, LocaleTable};
use homework_zipper::steps::{self, ProgramContext, ProgramOptions};

const DEFAULT_IGNORES: [&str; 6] = [
    "node_modules",
    "vendor",
    ".git",
    ".DS_Store",
    ".idea",
    ".vscode",
];

#[derive(Parser)]
#[command(name = "homework-zipper")]
#[command(version)]
#[command(about = "Packages a homework submission into a timestamped ZIP archive with a signed statement of authorship")]
struct Cli {
    /// Task name, used in the statement and the archive name
    #[arg(short, long)]
    task: String,

    /// Course name, used in the statement
    #[arg(short, long)]
    course: String,

    /// Output directory for the generated archive
    #[arg(short, long, default_value = "zipfiles")]
    outdir: String,

    /// Paths to ignore in addition to the ones in .zipignore files
    #[arg(short, long, value_delimiter = ',', default_values_t = DEFAULT_IGNORES.map(String::from))]
    ignore: Vec<String>,

    /// Skip verifying the archive after writing it
    #[arg(long = "no-verify", action = clap::ArgAction::SetFalse)]
    verify: bool,
}

fn main() {
    let cli = Cli::parse();

    let locale = Locale::detect();
    let locales = match LocaleTable::load() {
        Ok(locales) => locales,
        Err(error) => {
            eprintln!("{}", format!("{error:#}").red().bold());
            std::process::exit(1);
        }
    };

    if let Err(error) = run(cli, &locales, locale) {
        eprintln!("{}", locales.messages(locale).fatal_error.red().bold());
        for cause in error.chain() {
            eprintln!("{}", cause.to_string().red());
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli, locales: &LocaleTable, locale: Locale) -> Result<()> {
    let options = ProgramOptions::new(cli.task, cli.course, cli.outdir, cli.ignore, cli.verify)?;

    let mut context = ProgramContext::new(options, locales, locale);
    let mut reporter = ConsoleReporter::new(&locales.messages(locale).step);

    steps::handle_statement(&mut context, &mut reporter)?;
    let zip_path = steps::handle_zipping(&context, &mut reporter)?;

    if context.options.verify {
        steps::handle_verify(&context, &mut reporter, &zip_path)?;
    }

    steps::handle_notice(&context, &mut reporter);

    Ok(())
}
