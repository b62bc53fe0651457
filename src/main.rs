//! canal-denuncia binary
//!
//! `canal-denuncia` (or `canal-denuncia serve`) runs the intake server.
//! `auth-url` and `exchange-code` walk through the one-time Google consent flow
//! that yields `GOOGLE_REFRESH_TOKEN`.

use canal_denuncia::mail::oauth;
use canal_denuncia::{Config, GmailNotifier, SubmissionPipeline, SupabaseStore};
use clap::{Parser, Subcommand};
use std::io::IsTerminal;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "canal-denuncia", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the intake HTTP server (default)
    Serve,
    /// Print the Google consent URL for the gmail.send scope
    AuthUrl {
        /// Opaque value echoed back on the redirect
        #[arg(long)]
        state: Option<String>,
    },
    /// Trade the `code` from the consent redirect for a refresh token
    ExchangeCode {
        /// Authorization code from the redirect query string
        code: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env is normal in production
    let _ = dotenvy::dotenv();
    init_logging();

    let cli = Cli::parse();
    let result = match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve().await,
        Command::AuthUrl { state } => auth_url(state.as_deref()),
        Command::ExchangeCode { code } => exchange_code(&code).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "exiting");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// `LOG_FORMAT=json` switches to JSON lines; `RUST_LOG` filters (default `info`).
fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = match std::env::var("LOG_FORMAT").ok().as_deref() {
        Some("json") => true,
        Some("text") => false,
        _ => !std::io::stdout().is_terminal(),
    };

    if use_json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().flatten_event(true).with_current_span(false))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer())
            .init();
    }
}

async fn serve() -> canal_denuncia::Result<()> {
    let config = Config::from_env()?;
    config.validate()?;
    tracing::info!(
        store_table = %config.store.table,
        body_limit_bytes = config.server.body_limit_bytes,
        cors_origins = ?config.server.cors_origins,
        "configuration loaded"
    );

    let store = SupabaseStore::new(&config.store)?;
    let notifier = GmailNotifier::new(config.mail.clone())?;
    let pipeline = SubmissionPipeline::new(Arc::new(store), Arc::new(notifier));

    canal_denuncia::api::start_api_server(Arc::new(pipeline), Arc::new(config)).await
}

fn auth_url(state: Option<&str>) -> canal_denuncia::Result<()> {
    let config = Config::from_env()?;
    let url = oauth::authorization_url(&config.mail, state)?;
    println!("{url}");
    Ok(())
}

async fn exchange_code(code: &str) -> canal_denuncia::Result<()> {
    let config = Config::from_env()?;
    let tokens = oauth::exchange_code(&reqwest::Client::new(), &config.mail, code).await?;

    match tokens.refresh_token {
        Some(refresh_token) => {
            println!("GOOGLE_REFRESH_TOKEN={refresh_token}");
            Ok(())
        }
        None => Err(canal_denuncia::Error::config(
            "GOOGLE_REFRESH_TOKEN",
            "token endpoint returned no refresh token; revoke the app's access and run auth-url again",
        )),
    }
}
