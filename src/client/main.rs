/**
 * projet_client - headless driver
 *
 * Runs the session flows from a terminal against a real backend.
 *
 *   projet_client login <username> <password>
 *   projet_client forgot-password <email>
 *   projet_client tokens
 *
 * Configuration comes from the file named by PROJET_CONFIG when set,
 * otherwise from CLIENT_API_URL / CLIENT_DATA_DIR (a .env file is honoured).
 * Log verbosity follows RUST_LOG (default: info).
 */
use std::process::ExitCode;
use std::sync::Arc;

use projet_client::client::{ApiClient, Config, Session, SqlitePreferences, TokenStore};
use projet_client::shared::{AppConfig, Credentials};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: projet_client <login <username> <password> | forgot-password <email> | tokens>";

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run(std::env::args().skip(1).collect()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config() -> Result<Config, Box<dyn std::error::Error>> {
    match std::env::var("PROJET_CONFIG") {
        Ok(path) => {
            let app = AppConfig::from_file(&path)?;
            Ok(Config::new(app))
        }
        Err(_) => Ok(Config::from_env()?),
    }
}

async fn run(args: Vec<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    tracing::info!("Using server {}", config.server_url());

    let prefs = Arc::new(SqlitePreferences::open_auth(&config).await?);
    let api = ApiClient::new(config, TokenStore::new(prefs.clone()))?;
    let mut session = Session::new(api);

    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    let result = match args.as_slice() {
        ["login", username, password] => session
            .login(Credentials::new(*username, *password))
            .await
            .map(|user| println!("Logged in as {} <{}>", user.display_name(), user.email)),
        ["forgot-password", email] => session.send_forgot_password(email).await,
        ["tokens"] => {
            match session.stored_tokens() {
                Some(_) => println!("Tokens stored (ACCESS_TOKEN, REFRESH_TOKEN)"),
                None => println!("No tokens stored"),
            }
            Ok(())
        }
        _ => {
            eprintln!("{}", USAGE);
            return Err("invalid arguments".into());
        }
    };

    for notice in session.take_notices() {
        println!("{}", notice);
    }
    println!("Screen: {}", session.current_screen());

    prefs.flush().await?;
    result.map_err(Into::into)
}
