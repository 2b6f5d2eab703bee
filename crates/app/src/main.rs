use std::fmt;
use std::sync::Arc;

use dioxus::LaunchBuilder;
use dioxus::desktop::{Config as DesktopConfig, WindowBuilder};
use quiz_core::model::AssessmentId;
use services::{ApiConfig, AppServices, AuthService, Clock, QuizService};
use tracing_subscriber::EnvFilter;
use ui::{App, SessionExpiry, UiApp, build_app_context};

const DEFAULT_DB_URL: &str = "sqlite://learn.sqlite3";
const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingFlag { flag: &'static str },
    UnknownArg(String),
    InvalidAssessmentId { raw: String },
    InvalidDbUrl { raw: String },
    InvalidApiUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingFlag { flag } => write!(f, "{flag} is required"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidAssessmentId { raw } => {
                write!(f, "invalid --assessment value: {raw}")
            }
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidApiUrl { raw } => write!(f, "invalid --api value: {raw}"),
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
    services: AppServices,
    expiry: SessionExpiry,
    initial_assessment: Option<AssessmentId>,
}

impl UiApp for DesktopApp {
    fn quiz(&self) -> QuizService {
        self.services.quiz().clone()
    }

    fn auth(&self) -> AuthService {
        self.services.auth().clone()
    }

    fn session_expiry(&self) -> SessionExpiry {
        self.expiry.clone()
    }

    fn initial_assessment(&self) -> Option<AssessmentId> {
        self.initial_assessment.clone()
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- ui     [--db <sqlite_url>] [--api <url>] [--assessment <id>]");
    eprintln!("  cargo run -p app -- login  --email <email> --password <password> [--db <sqlite_url>] [--api <url>]");
    eprintln!("  cargo run -p app -- logout [--db <sqlite_url>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db {DEFAULT_DB_URL}");
    eprintln!("  --api {}", services::config::DEFAULT_API_URL);
    eprintln!();
    eprintln!("Environment (a .env file is read if present):");
    eprintln!("  LEARN_DB_URL, LEARN_API_URL, LEARN_API_TIMEOUT_SECS, LEARN_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Ui,
    Login,
    Logout,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "ui" => Some(Self::Ui),
            "login" => Some(Self::Login),
            "logout" => Some(Self::Logout),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct Args {
    db_url: String,
    api: ApiConfig,
    assessment: Option<AssessmentId>,
    email: Option<String>,
    password: Option<String>,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut parsed = Self {
            db_url: std::env::var("LEARN_DB_URL")
                .ok()
                .filter(|value| !value.trim().is_empty())
                .map_or_else(|| DEFAULT_DB_URL.into(), normalize_sqlite_url),
            api: ApiConfig::from_env(),
            assessment: None,
            email: None,
            password: None,
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    parsed.db_url = normalize_sqlite_url(value);
                }
                "--api" => {
                    let value = require_value(args, "--api")?;
                    let trimmed = value.trim();
                    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
                        return Err(ArgsError::InvalidApiUrl { raw: value });
                    }
                    parsed.api = parsed.api.with_base_url(trimmed);
                }
                "--assessment" => {
                    let value = require_value(args, "--assessment")?;
                    let id = value
                        .parse::<AssessmentId>()
                        .map_err(|_| ArgsError::InvalidAssessmentId { raw: value.clone() })?;
                    parsed.assessment = Some(id);
                }
                "--email" => parsed.email = Some(require_value(args, "--email")?),
                "--password" => parsed.password = Some(require_value(args, "--password")?),
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(parsed)
    }

    fn credentials(&self) -> Result<(&str, &str), ArgsError> {
        let email = self
            .email
            .as_deref()
            .ok_or(ArgsError::MissingFlag { flag: "--email" })?;
        let password = self
            .password
            .as_deref()
            .ok_or(ArgsError::MissingFlag { flag: "--password" })?;
        Ok((email, password))
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
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
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

fn init_tracing() {
    let filter = EnvFilter::try_from_env("LEARN_LOG")
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    // A second init (e.g. under a test harness) is harmless.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // No subcommand launches the UI.
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
    let parsed = Args::parse(&mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    // Token storage lives in SQLite; open and migrate it before anything talks to the backend.
    prepare_sqlite_file(&parsed.db_url)?;
    let expiry = SessionExpiry::default();
    let services = AppServices::new_sqlite(
        &parsed.db_url,
        parsed.api.clone(),
        Clock::system(),
        expiry.hook(),
    )
    .await?;

    match cmd {
        Command::Ui => {
            let app: Arc<dyn UiApp> = Arc::new(DesktopApp {
                services,
                expiry,
                initial_assessment: parsed.assessment,
            });
            let context = build_app_context(&app);

            // Keep the window a normal one; some dev setups default to always-on-top.
            let desktop_cfg = DesktopConfig::new().with_window(
                WindowBuilder::new()
                    .with_title("Assessments")
                    .with_always_on_top(false),
            );

            LaunchBuilder::desktop()
                .with_cfg(desktop_cfg)
                .with_context(context)
                .launch(App);
            Ok(())
        }
        Command::Login => {
            let (email, password) = parsed.credentials().map_err(|e| {
                eprintln!("{e}");
                print_usage();
                e
            })?;
            services.auth().login(email, password).await?;
            println!("Signed in.");
            Ok(())
        }
        Command::Logout => {
            services.auth().logout().await?;
            println!("Signed out.");
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    init_tracing();

    if let Err(err) = run().await {
        tracing::error!(error = %err, "command failed");
        eprintln!("{err}");
        std::process::exit(2);
    }
}
