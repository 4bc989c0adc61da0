//! atskaite CLI - financial report DOCX to XLSX converter

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use atskaite::{
    Classifier, ConversionStats, ConvertOptions, DocxParser, ParseOptions, ReportConverter,
    Section,
};

#[derive(Parser)]
#[command(name = "atskaite")]
#[command(version)]
#[command(about = "Convert Latvian financial report DOCX files into XLSX workbooks", long_about = None)]
struct Cli {
    /// Input DOCX file (prompted for when missing)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output XLSX file (prompted for when missing)
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    #[command(flatten)]
    flags: ConvertFlags,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args, Clone, Copy, Default)]
struct ConvertFlags {
    /// Do not reconstruct verification formulas
    #[arg(long)]
    no_formulas: bool,

    /// Keep numbers as they appear in the document
    #[arg(long)]
    keep_raw_numbers: bool,

    /// Create sheets for empty sections too
    #[arg(long)]
    all_sections: bool,

    /// Fail on unreadable list numbering instead of dropping the labels
    #[arg(long)]
    strict: bool,
}

impl ConvertFlags {
    fn parse_options(&self) -> ParseOptions {
        parse_options(self.strict)
    }

    fn convert_options(&self) -> ConvertOptions {
        ConvertOptions::new()
            .with_parse_options(self.parse_options())
            .with_formulas(!self.no_formulas)
            .with_number_normalization(!self.keep_raw_numbers)
            .with_empty_sections(self.all_sections)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a report to XLSX (default)
    Convert {
        /// Input DOCX file
        #[arg(value_name = "FILE")]
        input: Option<PathBuf>,

        /// Output XLSX file
        #[arg(value_name = "OUTPUT")]
        output: Option<PathBuf>,

        #[command(flatten)]
        flags: ConvertFlags,
    },

    /// Dump classified sections as JSON
    Classify {
        /// Input DOCX file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        /// Fail on unreadable list numbering instead of dropping the labels
        #[arg(long)]
        strict: bool,
    },

    /// Show section statistics
    Info {
        /// Input DOCX file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Show version information
    Version,
}

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Convert {
            input,
            output,
            flags,
        }) => cmd_convert(input, output, flags),
        Some(Commands::Classify {
            input,
            output,
            compact,
            strict,
        }) => cmd_classify(&input, output.as_deref(), compact, strict),
        Some(Commands::Info { input }) => cmd_info(&input),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => cmd_convert(cli.input, cli.output, cli.flags),
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

/// Ask for a path on stdin. An empty answer means "cancel".
fn prompt_path(question: &str, suggestion: Option<&Path>) -> io::Result<Option<PathBuf>> {
    match suggestion {
        Some(path) => print!("{} [{}]: ", question.cyan(), path.display().to_string().dimmed()),
        None => print!("{}: ", question.cyan()),
    }
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(parse_answer(&answer))
}

/// Trim an answer and strip the quotes terminals add to dropped files.
fn parse_answer(answer: &str) -> Option<PathBuf> {
    let answer = answer.trim().trim_matches(|c| c == '"' || c == '\'');
    if answer.is_empty() {
        None
    } else {
        Some(PathBuf::from(answer))
    }
}

fn parse_options(strict: bool) -> ParseOptions {
    if strict {
        ParseOptions::new().strict()
    } else {
        ParseOptions::new()
    }
}

fn default_output(input: &Path) -> PathBuf {
    input.with_extension("xlsx")
}

fn cmd_convert(input: Option<PathBuf>, output: Option<PathBuf>, flags: ConvertFlags) -> CliResult {
    let input = match input {
        Some(path) => path,
        None => match prompt_path("Word document to convert", None)? {
            Some(path) => path,
            None => {
                println!("{}", "No input selected, nothing to do.".yellow());
                return Ok(());
            }
        },
    };

    let output = match output {
        Some(path) => path,
        None => match prompt_path("Save workbook as", Some(&default_output(&input)))? {
            Some(path) => path,
            None => {
                println!("{}", "No output selected, nothing written.".yellow());
                return Ok(());
            }
        },
    };

    log::debug!("Converting {} to {}", input.display(), output.display());

    let pb = ProgressBar::new(3);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );

    pb.set_message("Reading document...");
    let options = flags.convert_options();
    let source = DocxParser::open_with_options(&input, options.parse.clone())?.parse()?;
    pb.inc(1);

    pb.set_message("Building workbook...");
    let result = ReportConverter::new(options).convert_document(source)?;
    pb.inc(1);

    pb.set_message("Saving...");
    result.save(&output)?;
    pb.inc(1);

    pb.finish_with_message("Done!");

    print_stats(&result.stats);
    println!("\n{} {}", "Saved to".green(), output.display());

    Ok(())
}

fn print_stats(stats: &ConversionStats) {
    println!("\n{}", "Sheets:".green().bold());
    let last = stats.sections.len().saturating_sub(1);
    for (i, section) in stats.sections.iter().enumerate() {
        let branch = if i == last { "└─" } else { "├─" };
        println!(
            "  {} {} ({} lines, {} totals)",
            branch.dimmed(),
            section.section.title(),
            section.lines,
            section.total_rows
        );
    }

    println!(
        "\n{}: {}",
        "Formulas written".bold(),
        stats.formulas_written
    );
    println!(
        "{}: {}",
        "Numbers normalized".bold(),
        stats.numbers_normalized
    );

    if !stats.skipped_formulas.is_empty() {
        println!(
            "\n{}",
            "Verification cells left without a formula:".yellow().bold()
        );
        for skipped in &stats.skipped_formulas {
            println!(
                "  {}!{}{}  {}",
                skipped.sheet,
                skipped.column,
                skipped.row,
                skipped.reason.dimmed()
            );
        }
    }
}

fn cmd_classify(input: &Path, output: Option<&Path>, compact: bool, strict: bool) -> CliResult {
    let doc = atskaite::parse_file_with_options(input, parse_options(strict))?;
    let classified = atskaite::classify_document(doc);

    let json = if compact {
        serde_json::to_string(&classified)?
    } else {
        serde_json::to_string_pretty(&classified)?
    };

    if let Some(path) = output {
        fs::write(path, &json)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", json);
    }

    Ok(())
}

fn cmd_info(input: &Path) -> CliResult {
    let doc = atskaite::parse_file(input)?;

    let mut classifier = Classifier::new();
    let classified = classifier.run(doc);
    let summary = classifier.summary();

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Paragraphs".bold(), summary.paragraphs);
    println!("{}: {}", "Tables".bold(), summary.tables);
    println!("{}: {}", "Discarded".bold(), summary.discarded);

    println!();
    println!("{}", "Sections".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    for section in Section::ALL {
        let lines = classified.lines(section);
        let rows = lines.iter().filter(|l| l.is_row()).count();
        let label = format!("{:<18}", section.title());
        if lines.is_empty() {
            println!("{} {}", label.dimmed(), "empty".dimmed());
        } else {
            println!("{} {} lines ({} table rows)", label.bold(), lines.len(), rows);
        }
    }

    if !classified.notes.is_empty() {
        println!();
        println!("{}: {}", "Numbered notes".bold(), classified.notes.len());
        for note in &classified.notes {
            println!(
                "  {:>2}. {}",
                note.number,
                note.title.as_deref().unwrap_or("").dimmed()
            );
        }
    }

    if classified.is_empty() {
        println!();
        println!(
            "{}",
            "No report sections found; the \"Vadības ziņojums\" heading may be missing.".yellow()
        );
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "atskaite".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Financial report DOCX to XLSX converter");
    println!();
    println!("License: MIT");
}
