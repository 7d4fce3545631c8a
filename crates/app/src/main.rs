use std::fmt;
use std::io::Write;
use std::path::PathBuf;

use chrono::NaiveDate;
use idiom_core::time::parse_date;
use services::{Clock, CommandOutcome, StudyService};
use storage::repository::Storage;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt as log_fmt, prelude::*};

mod shell;

use shell::ShellInput;

const DEFAULT_DATA: &str = "data/example.csv";
const DEFAULT_PROGRESS: &str = "flashcard-progress.json";

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidToday { raw: String },
    InvalidProgress { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidToday { raw } => {
                write!(f, "invalid --today value (expected YYYY-MM-DD): {raw}")
            }
            ArgsError::InvalidProgress { raw } => write!(f, "invalid --progress value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  idioms study [--data <csv>] [--progress <path|sqlite_url>] [--today <YYYY-MM-DD>]");
    eprintln!("  idioms list  [--data <csv>] [--progress <path|sqlite_url>] [--today <YYYY-MM-DD>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --data {DEFAULT_DATA}");
    eprintln!("  --progress {DEFAULT_PROGRESS}");
    eprintln!("  --today <local date>");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  IDIOMS_DATA, IDIOMS_PROGRESS, IDIOMS_TODAY, IDIOMS_LOG (default: warn)");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Study,
    List,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "study" => Some(Self::Study),
            "list" => Some(Self::List),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct Args {
    data: PathBuf,
    progress: String,
    today: Option<NaiveDate>,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut data = std::env::var("IDIOMS_DATA")
            .map_or_else(|_| PathBuf::from(DEFAULT_DATA), PathBuf::from);
        let mut progress =
            std::env::var("IDIOMS_PROGRESS").unwrap_or_else(|_| DEFAULT_PROGRESS.into());
        let mut today = std::env::var("IDIOMS_TODAY")
            .ok()
            .map(|raw| parse_today(&raw))
            .transpose()?;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--data" => data = PathBuf::from(require_value(args, "--data")?),
                "--progress" => {
                    let value = require_value(args, "--progress")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidProgress { raw: value });
                    }
                    progress = value;
                }
                "--today" => today = Some(parse_today(&require_value(args, "--today")?)?),
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            data,
            progress,
            today,
        })
    }

    fn clock(&self) -> Clock {
        self.today.map_or_else(Clock::system, Clock::fixed)
    }
}

fn parse_today(raw: &str) -> Result<NaiveDate, ArgsError> {
    parse_date(raw).map_err(|_| ArgsError::InvalidToday {
        raw: raw.to_owned(),
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("IDIOMS_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(log_fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

async fn study_loop(service: &mut StudyService) -> Result<(), Box<dyn std::error::Error>> {
    let mut stdout = std::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    shell::render_stats(&mut stdout, &service.stats())?;
    render_current(service, &mut stdout)?;

    loop {
        write!(stdout, "> ")?;
        stdout.flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        let input = match shell::parse_input(&line) {
            Ok(input) => input,
            Err(err) => {
                writeln!(stdout, "{err}")?;
                continue;
            }
        };

        match input {
            ShellInput::Quit => break,
            ShellInput::Nothing => {}
            ShellInput::Help => shell::print_help(&mut stdout)?,
            ShellInput::Stats => shell::render_stats(&mut stdout, &service.stats())?,
            ShellInput::Command(command) => match service.dispatch(command).await {
                Ok(outcome) => {
                    shell::render_outcome(&mut stdout, &outcome)?;
                    if let CommandOutcome::ListToggled { visible: false } = outcome {
                        continue;
                    }
                    if service.is_list_visible() {
                        shell::render_entries(&mut stdout, &service.entries())?;
                    }
                    render_current(service, &mut stdout)?;
                }
                Err(err) if err.is_empty_deck() => writeln!(stdout, "nothing to show")?,
                Err(err) => writeln!(stdout, "{err}")?,
            },
        }
    }

    shell::render_stats(&mut stdout, &service.stats())?;
    Ok(())
}

fn render_current(
    service: &StudyService,
    out: &mut impl Write,
) -> Result<(), Box<dyn std::error::Error>> {
    match service.card_view() {
        Ok(view) => shell::render_card(out, &view)?,
        Err(err) if err.is_empty_deck() => writeln!(out, "nothing to show")?,
        Err(err) => return Err(err.into()),
    }
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // No subcommand means study.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Study,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Study,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };
    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let parsed = Args::parse(&mut argv.into_iter()).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;
    info!(data = %parsed.data.display(), progress = %parsed.progress, "starting");

    let storage = Storage::open(&parsed.progress).await?;
    let mut service =
        StudyService::start_from_dataset(&parsed.data, storage.progress, parsed.clock()).await?;

    match cmd {
        Command::Study => study_loop(&mut service).await,
        Command::List => {
            let mut stdout = std::io::stdout();
            shell::render_entries(&mut stdout, &service.entries())?;
            shell::render_stats(&mut stdout, &service.stats())?;
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
