//! Sheetport CLI - Convert qTest exports into Octane import workbooks
//!
//! # Commands
//!
//! ```bash
//! sheetport convert                      # Check, ask when warnings are found, convert
//! sheetport convert --yes                # Same, answering "yes" to the prompt
//! sheetport check                        # Integrity check only
//! sheetport headers export.xlsx          # Show the header row of an input file
//! sheetport example-mapping              # Show an example mapping document
//! ```
//!
//! Configuration is read from `converter.properties` and `mapping.json`, or
//! from the files named by `--properties` / `--mapping`, `SHEETPORT_PROPERTIES`
//! / `SHEETPORT_MAPPING`. A `.env` file in the working directory is loaded
//! first.
//!
//! Exit status: 0 on success, 2 when the run was stopped before conversion,
//! 1 on configuration or conversion failure.

use clap::{Args, Parser, Subcommand};
use sheetport::logging::{init_logging, ColorMode, LogConfig, LogFormat};
use sheetport::{
    example_mappings, read_headers, ConversionConfig, ConversionJob, Decision, FormatType, Gate,
    OperatorAnswer, PropertyOverrides, DEFAULT_MAPPING_FILE, DEFAULT_PROPERTIES_FILE,
    RETRY_PROMPT,
};
use std::env;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};

const PROPERTIES_ENV: &str = "SHEETPORT_PROPERTIES";
const MAPPING_ENV: &str = "SHEETPORT_MAPPING";

#[derive(Parser)]
#[command(name = "sheetport", version)]
#[command(about = "Convert qTest test-case exports into Octane import workbooks", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// More output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Less output (-q warnings, -qq errors only)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    quiet: u8,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty, global = true)]
    log_format: LogFormat,

    /// When to color log output
    #[arg(long, value_enum, default_value_t = ColorMode::Auto, global = true)]
    color: ColorMode,

    /// Prefix log lines with a timestamp
    #[arg(long, global = true)]
    log_timestamps: bool,

    /// Conversion properties file
    #[arg(long, global = true)]
    properties: Option<PathBuf>,

    /// Field mapping document
    #[arg(long, global = true)]
    mapping: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the configuration, then convert the input file
    Convert {
        #[command(flatten)]
        overrides: OverrideArgs,

        /// Continue without asking when only warnings are found
        #[arg(short, long)]
        yes: bool,
    },

    /// Check the configuration and the files it names, without converting
    Check {
        #[command(flatten)]
        overrides: OverrideArgs,
    },

    /// Print the header row of an input file
    Headers {
        /// Input spreadsheet
        file: PathBuf,

        /// Input format, picks the sheet to read
        #[arg(short, long, default_value = "QTEST")]
        format: String,
    },

    /// Show an example mapping document
    ExampleMapping {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Values overriding the properties file.
#[derive(Args)]
struct OverrideArgs {
    /// Input file (overrides input.file.path)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output file (overrides output.file.path)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Input format (overrides input.file.format.type)
    #[arg(short, long)]
    format: Option<String>,
}

impl From<OverrideArgs> for PropertyOverrides {
    fn from(args: OverrideArgs) -> Self {
        Self {
            input_file_path: args.input,
            output_file_path: args.output,
            input_format: args.format,
        }
    }
}

/// How a command ended when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Done,
    Stopped,
}

type CmdResult = Result<Outcome, Box<dyn std::error::Error>>;

fn main() -> ExitCode {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(
        &LogConfig::from_verbosity(cli.verbose, cli.quiet)
            .with_format(cli.log_format)
            .with_timestamps(cli.log_timestamps)
            .with_ansi(cli.color.enabled()),
    );

    let properties = config_path(cli.properties, PROPERTIES_ENV, DEFAULT_PROPERTIES_FILE);
    let mapping = config_path(cli.mapping, MAPPING_ENV, DEFAULT_MAPPING_FILE);

    let result = match cli.command {
        Commands::Convert { overrides, yes } => {
            cmd_convert(&properties, &mapping, overrides.into(), yes)
        }
        Commands::Check { overrides } => cmd_check(&properties, &mapping, overrides.into()),
        Commands::Headers { file, format } => cmd_headers(&file, &format),
        Commands::ExampleMapping { output } => cmd_example_mapping(output.as_deref()),
    };

    match result {
        Ok(Outcome::Done) => ExitCode::SUCCESS,
        Ok(Outcome::Stopped) => ExitCode::from(2),
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Flag value, else environment variable, else the default file name.
fn config_path(flag: Option<PathBuf>, var: &str, default: &str) -> PathBuf {
    flag.or_else(|| env::var_os(var).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(default))
}

fn cmd_convert(
    properties: &Path,
    mapping: &Path,
    overrides: PropertyOverrides,
    yes: bool,
) -> CmdResult {
    let config = ConversionConfig::load(properties, mapping, &overrides)?;
    let job = ConversionJob::from(config);

    let report = job.check();
    report.log();
    let gate = Gate::evaluate(&report);
    gate.log();

    let answer = match gate.question() {
        None => None,
        Some(_) if yes => Some(OperatorAnswer::Yes),
        Some(question) => prompt_answer(io::stdin().lock(), &mut io::stderr(), &question)?,
    };

    match gate.decide(answer) {
        Decision::Stop => {
            info!("Stopping the conversion.");
            return Ok(Outcome::Stopped);
        }
        Decision::Proceed if gate.needs_confirmation() => info!("Continuing........"),
        Decision::Proceed => {}
    }

    let stats = job.run()?;
    eprintln!(
        "Converted {} rows into {} tests and {} steps",
        stats.input_rows, stats.tests, stats.steps
    );
    Ok(Outcome::Done)
}

/// Ask `question` on `prompt` and read answers until one is `YES`/`NO`.
/// End of input counts as no answer.
fn prompt_answer<R: BufRead, W: Write>(
    mut input: R,
    prompt: &mut W,
    question: &str,
) -> io::Result<Option<OperatorAnswer>> {
    writeln!(prompt, "{question}")?;
    let mut line = String::new();
    loop {
        prompt.flush()?;
        line.clear();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        match OperatorAnswer::parse(&line) {
            Some(answer) => return Ok(Some(answer)),
            None => writeln!(prompt, "{RETRY_PROMPT}")?,
        }
    }
}

fn cmd_check(properties: &Path, mapping: &Path, overrides: PropertyOverrides) -> CmdResult {
    let config = ConversionConfig::load(properties, mapping, &overrides)?;
    let job = ConversionJob::from(config);

    let report = job.check();
    report.log();
    Gate::evaluate(&report).log();

    for issue in &report.errors {
        println!("error: {issue}");
    }
    for issue in &report.warnings {
        println!("warning: {issue}");
    }
    println!(
        "{} error(s), {} warning(s)",
        report.error_count(),
        report.warning_count()
    );

    if report.has_errors() {
        Ok(Outcome::Stopped)
    } else {
        Ok(Outcome::Done)
    }
}

fn cmd_headers(file: &Path, format: &str) -> CmdResult {
    let format = FormatType::parse(format);
    let headers = read_headers(file, format.input_sheet())?;
    for (index, name) in headers.names().enumerate() {
        println!("[{:2}] {}", index + 1, name);
    }
    Ok(Outcome::Done)
}

fn cmd_example_mapping(output: Option<&Path>) -> CmdResult {
    let json = serde_json::to_string_pretty(&example_mappings())?;
    write_text(&json, output)?;
    Ok(Outcome::Done)
}

fn write_text(content: &str, path: Option<&Path>) -> io::Result<()> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn ask(input: &str) -> (Option<OperatorAnswer>, String) {
        let mut prompt = Vec::new();
        let answer = prompt_answer(Cursor::new(input), &mut prompt, "Continue? [YES/NO]").unwrap();
        (answer, String::from_utf8(prompt).unwrap())
    }

    #[test]
    fn test_prompt_reprompts_until_valid() {
        let (answer, shown) = ask("maybe\n\nyes\n");
        assert_eq!(answer, Some(OperatorAnswer::Yes));
        assert_eq!(
            shown,
            format!("Continue? [YES/NO]\n{RETRY_PROMPT}\n{RETRY_PROMPT}\n")
        );
    }

    #[test]
    fn test_prompt_short_answers_reprompt() {
        let (answer, shown) = ask("Y\nN\nno\n");
        assert_eq!(answer, Some(OperatorAnswer::No));
        assert_eq!(shown.matches(RETRY_PROMPT).count(), 2);
    }

    #[test]
    fn test_prompt_end_of_input_is_no_answer() {
        assert_eq!(ask("later\n").0, None);
        let (answer, shown) = ask("");
        assert_eq!(answer, None);
        assert_eq!(shown, "Continue? [YES/NO]\n");
    }

    #[test]
    fn test_config_path_prefers_flag() {
        let path = config_path(Some(PathBuf::from("custom.properties")), "SHEETPORT_TEST_UNSET", "x");
        assert_eq!(path, PathBuf::from("custom.properties"));
        assert_eq!(config_path(None, "SHEETPORT_TEST_UNSET", "x"), PathBuf::from("x"));
    }

    #[test]
    fn test_cli_parses_convert() {
        let cli = Cli::try_parse_from([
            "sheetport", "-v", "convert", "--input", "in.xlsx", "--yes", "--mapping", "m.json",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 1);
        assert_eq!(cli.mapping, Some(PathBuf::from("m.json")));
        match cli.command {
            Commands::Convert { overrides, yes } => {
                assert!(yes);
                assert_eq!(overrides.input, Some(PathBuf::from("in.xlsx")));
            }
            _ => panic!("expected convert"),
        }
    }

    #[test]
    fn test_cli_parses_log_flags() {
        let cli = Cli::try_parse_from([
            "sheetport", "check", "--color", "never", "--log-timestamps", "--log-format", "json",
        ])
        .unwrap();
        assert_eq!(cli.color, ColorMode::Never);
        assert!(cli.log_timestamps);
        assert_eq!(cli.log_format, LogFormat::Json);

        let defaults = Cli::try_parse_from(["sheetport", "check"]).unwrap();
        assert_eq!(defaults.color, ColorMode::Auto);
        assert!(!defaults.log_timestamps);
    }
}
