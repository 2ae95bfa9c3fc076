use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use dioxus::LaunchBuilder;
use dioxus::desktop::{Config as DesktopConfig, WindowBuilder};
use log::LevelFilter;
use quiz_core::model::{ParticipantId, QuestionSet};
use services::{AppServices, BattleConfig, BattleController, Clock, QuestionBank};
use ui::{App, UiApp, build_app_context};

const DEFAULT_DB_URL: &str = "sqlite://battle.sqlite3";
const DEFAULT_SESSION_ID: &str = "default";
const DEFAULT_PARTICIPANT: &str = "user1";
const DEFAULT_ROSTER: &str = "user1,user2";

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidCountdown { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidCountdown { raw } => {
                write!(f, "invalid --countdown value: {raw}")
            }
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
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

struct DesktopApp {
    battle: Arc<BattleController>,
}

impl UiApp for DesktopApp {
    fn battle(&self) -> Arc<BattleController> {
        Arc::clone(&self.battle)
    }
}

struct Args {
    db_url: String,
    session_id: String,
    participant: String,
    roster: Vec<String>,
    questions: Option<PathBuf>,
    countdown: u32,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!(
        "  cargo run -p app -- ui          [--db <sqlite_url>] [--session <id>] [--participant <id>]"
    );
    eprintln!("                                  [--roster <a,b,...>] [--questions <path.json>] [--countdown <units>]");
    eprintln!("  cargo run -p app -- new-session [--db <sqlite_url>] [--roster <a,b,...>] [--questions <path.json>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db {DEFAULT_DB_URL}");
    eprintln!("  --session {DEFAULT_SESSION_ID}");
    eprintln!("  --participant {DEFAULT_PARTICIPANT}");
    eprintln!("  --roster {DEFAULT_ROSTER}");
    eprintln!("  --countdown 10");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_DB_URL, QUIZ_SESSION_ID, QUIZ_PARTICIPANT_ID, QUIZ_ROSTER, QUIZ_QUESTIONS, QUIZ_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Ui,
    NewSession,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "ui" => Some(Self::Ui),
            "new-session" => Some(Self::NewSession),
            _ => None,
        }
    }
}

fn split_roster(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_owned)
        .collect()
}

impl Args {
    /// Flags win over `lookup`, which stands in for the process environment.
    fn parse(
        args: &mut impl Iterator<Item = String>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ArgsError> {
        let env = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut db_url = env("QUIZ_DB_URL").map_or_else(|| DEFAULT_DB_URL.into(), normalize_sqlite_url);
        let mut session_id = env("QUIZ_SESSION_ID").unwrap_or_else(|| DEFAULT_SESSION_ID.into());
        let mut participant =
            env("QUIZ_PARTICIPANT_ID").unwrap_or_else(|| DEFAULT_PARTICIPANT.into());
        let mut roster = split_roster(&env("QUIZ_ROSTER").unwrap_or_else(|| DEFAULT_ROSTER.into()));
        let mut questions = env("QUIZ_QUESTIONS").map(PathBuf::from);
        let mut countdown = quiz_core::battle::DEFAULT_COUNTDOWN_UNITS;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--session" => session_id = require_value(args, "--session")?,
                "--participant" => participant = require_value(args, "--participant")?,
                "--roster" => roster = split_roster(&require_value(args, "--roster")?),
                "--questions" => questions = Some(PathBuf::from(require_value(args, "--questions")?)),
                "--countdown" => {
                    let value = require_value(args, "--countdown")?;
                    countdown = value
                        .parse::<u32>()
                        .ok()
                        .filter(|units| *units > 0)
                        .ok_or(ArgsError::InvalidCountdown { raw: value })?;
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            session_id,
            participant,
            roster,
            questions,
            countdown,
        })
    }

    fn question_set(&self) -> Result<QuestionSet, services::QuestionBankError> {
        match &self.questions {
            Some(path) => QuestionBank::from_path(path),
            None => Ok(QuestionSet::financial_basics()),
        }
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn init_logging() {
    let level = std::env::var("QUIZ_LOG")
        .ok()
        .and_then(|raw| raw.parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::Info);
    if let Err(err) = simple_logger::SimpleLogger::new().with_level(level).init() {
        eprintln!("logging disabled: {err}");
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // Default behavior: launching UI when no subcommand is provided.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Ui,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Ui,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let parsed = Args::parse(&mut iter, |key| std::env::var(key).ok()).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    // Open + migrate SQLite at startup. Keep this in the binary glue so core/services stay pure.
    prepare_sqlite_file(&parsed.db_url)?;
    let services = AppServices::new_sqlite(&parsed.db_url, Clock::system()).await?;
    let questions = parsed.question_set()?;

    match cmd {
        Command::Ui => {
            let config = BattleConfig::from_raw(
                &parsed.session_id,
                &parsed.participant,
                &parsed.roster,
                questions,
            )?
            .with_countdown_units(parsed.countdown);
            let battle = Arc::new(services.battles().join(config).await);

            let app: Arc<dyn UiApp> = Arc::new(DesktopApp { battle });
            let context = build_app_context(&app);

            // On macOS, Dioxus/tao can default to an always-on-top window in some dev setups.
            let desktop_cfg = DesktopConfig::new().with_window(
                WindowBuilder::new()
                    .with_title("Quiz Battle")
                    .with_always_on_top(false),
            );

            LaunchBuilder::desktop()
                .with_cfg(desktop_cfg)
                .with_context(context)
                .launch(App);
            Ok(())
        }
        Command::NewSession => {
            let roster = parsed
                .roster
                .iter()
                .map(|raw| ParticipantId::new(raw.as_str()))
                .collect::<Result<Vec<_>, _>>()?;
            let session = services
                .battles()
                .open_session(&roster, questions.len())
                .await?;
            println!("{session}");
            Ok(())
        }
    }
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    init_logging();
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        log::error!("{err}");
        eprintln!("{err}");
        std::process::exit(2);
    }
}
