use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use cv_client::net::ProgressCallback;
use cv_client::session::StorageError;
use cv_client::{
    ApiClient, ApiError, AuthService, ClientConfig, ConfigError, FileStore, FormData, RequestOptions, Role,
    RouteError, Router, SessionStore,
};
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("session storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("{0}")]
    Api(#[from] ApiError),
    #[error("{0}")]
    Route(#[from] RouteError),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("failed to read {path}: {source}")]
    ReadFile { path: PathBuf, source: io::Error },
    #[error("invalid {what} {raw:?}; expected {expected}")]
    InvalidArg { what: &'static str, raw: String, expected: &'static str },
}

#[derive(Parser, Debug)]
#[command(name = "cv-client", about = "CV analysis API client")]
struct Cli {
    #[arg(long, env = "API_BASE_URL")]
    base_url: Option<String>,

    #[arg(long, env = "CV_SESSION_FILE", default_value = ".cv-session.json")]
    session_file: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in and store the session.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "CV_PASSWORD")]
        password: String,
    },
    /// Register and store the session.
    Register {
        #[arg(long)]
        email: String,
        #[arg(long, env = "CV_PASSWORD")]
        password: String,
        #[arg(long, default_value = "candidate")]
        role: Role,
    },
    /// Clear the stored session.
    Logout,
    /// Print the stored user.
    Whoami,
    Get {
        endpoint: String,
        #[command(flatten)]
        request: RequestArgs,
    },
    Post {
        endpoint: String,
        #[arg(long, default_value = "{}")]
        data: String,
        #[command(flatten)]
        request: RequestArgs,
    },
    Put {
        endpoint: String,
        #[arg(long, default_value = "{}")]
        data: String,
        #[command(flatten)]
        request: RequestArgs,
    },
    Delete {
        endpoint: String,
        #[command(flatten)]
        request: RequestArgs,
    },
    /// Multipart upload of a file plus optional text fields.
    Upload {
        endpoint: String,
        #[arg(long)]
        file: PathBuf,
        #[arg(long, default_value = "file")]
        field: String,
        #[arg(long = "text", help = "Extra text field as name=value; repeatable")]
        texts: Vec<String>,
        #[command(flatten)]
        request: RequestArgs,
    },
    /// Resolve a route through the guard and show the view it lands on.
    Navigate { path: String },
}

#[derive(Args, Debug)]
struct RequestArgs {
    #[arg(short = 'H', long = "header", help = "Header as 'Name: value'; repeatable")]
    headers: Vec<String>,

    #[arg(long = "query", help = "Query parameter as key=value; repeatable")]
    query: Vec<String>,

    #[arg(long)]
    timeout_ms: Option<u64>,
}

impl RequestArgs {
    fn into_options(self) -> Result<RequestOptions, CliError> {
        let mut options = RequestOptions::new();
        for raw in &self.headers {
            let (name, value) = raw.split_once(':').ok_or_else(|| CliError::InvalidArg {
                what: "header",
                raw: raw.clone(),
                expected: "'Name: value'",
            })?;
            options = options.try_header(name, value)?;
        }
        for raw in &self.query {
            let (key, value) = split_pair(raw, "query parameter")?;
            options = options.query(key, value);
        }
        if let Some(ms) = self.timeout_ms {
            options = options.timeout(Duration::from_millis(ms));
        }
        Ok(options)
    }
}

fn split_pair<'a>(raw: &'a str, what: &'static str) -> Result<(&'a str, &'a str), CliError> {
    raw.split_once('=')
        .ok_or_else(|| CliError::InvalidArg { what, raw: raw.to_owned(), expected: "name=value" })
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let cli = Cli::parse();
    let mut config = ClientConfig::from_env()?;
    if let Some(base_url) = &cli.base_url {
        config = config.with_base_url(base_url);
    }

    let session = SessionStore::new(FileStore::open(&cli.session_file)?);
    let api = ApiClient::new(config, session.clone())?;
    tracing::debug!(base_url = %api.config().base_url, mode = ?api.config().mode, "client ready");

    run(cli.command, &api, &session).await
}

async fn run(command: Command, api: &ApiClient, session: &SessionStore) -> Result<(), CliError> {
    let auth = AuthService::new(api.clone());

    match command {
        Command::Login { email, password } => {
            let data = auth.login(&email, &password).await?;
            auth.set_user_data(&data)?;
            print_json(&serde_json::to_value(&data.user)?)
        }
        Command::Register { email, password, role } => {
            let data = auth.register(&email, &password, role).await?;
            auth.set_user_data(&data)?;
            print_json(&serde_json::to_value(&data.user)?)
        }
        Command::Logout => {
            auth.logout()?;
            println!("logged out");
            Ok(())
        }
        Command::Whoami => match session.get_user() {
            Some(user) => print_json(&serde_json::to_value(&user)?),
            None if session.is_authenticated() => {
                println!("logged in (no user record)");
                Ok(())
            }
            None => {
                println!("not logged in");
                Ok(())
            }
        },
        Command::Get { endpoint, request } => {
            let value: Value = api.get(&endpoint, request.into_options()?).await?;
            print_json(&value)
        }
        Command::Post { endpoint, data, request } => {
            let body: Value = serde_json::from_str(&data)?;
            let value: Value = api.post(&endpoint, &body, request.into_options()?).await?;
            print_json(&value)
        }
        Command::Put { endpoint, data, request } => {
            let body: Value = serde_json::from_str(&data)?;
            let value: Value = api.put(&endpoint, &body, request.into_options()?).await?;
            print_json(&value)
        }
        Command::Delete { endpoint, request } => {
            let value: Value = api.delete(&endpoint, request.into_options()?).await?;
            print_json(&value)
        }
        Command::Upload { endpoint, file, field, texts, request } => {
            let form = build_form(&file, &field, &texts).await?;
            let progress: ProgressCallback = Arc::new(|percent| {
                eprint!("\rupload {percent:>3}%");
                let _ = io::stderr().flush();
            });
            let value: Value = api.upload(&endpoint, form, request.into_options()?, Some(progress)).await?;
            eprintln!();
            print_json(&value)
        }
        Command::Navigate { path } => {
            let router = Router::default();
            let nav = router.navigate(&path, session)?;
            if nav.guard_redirected {
                println!("login required; redirected");
            }
            println!("{} -> {} ({})", path, nav.path, nav.view.title);
            println!("{}", nav.view.summary);
            Ok(())
        }
    }
}

async fn build_form(file: &Path, field: &str, texts: &[String]) -> Result<FormData, CliError> {
    let bytes = tokio::fs::read(file)
        .await
        .map_err(|source| CliError::ReadFile { path: file.to_path_buf(), source })?;
    let filename = file
        .file_name()
        .map_or_else(|| "upload".to_owned(), |n| n.to_string_lossy().into_owned());

    let mut form = FormData::new();
    for raw in texts {
        let (name, value) = split_pair(raw, "text field")?;
        form = form.text(name, value);
    }
    Ok(form.file(field, filename, guess_content_type(file), bytes))
}

fn guess_content_type(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "pdf" => Some("application/pdf"),
        "doc" => Some("application/msword"),
        "docx" => Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
        "txt" => Some("text/plain"),
        "json" => Some("application/json"),
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        _ => None,
    }
}

fn print_json(value: &Value) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
