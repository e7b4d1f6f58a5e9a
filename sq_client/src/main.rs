//! A study tracker client and TUI.
//!
//! The client connects to a Study Quest backend over HTTP, resumes or
//! creates a session, then runs either a line-oriented prompt or a
//! terminal dashboard.

use anyhow::{Context, Result};
use pico_args::Arguments;
use std::io::{self, Write};

use sq_client::{
    api_client::ApiClient,
    cli::{self, CliApp},
    config::ClientConfig,
    credentials::{CredentialStore, FileStore},
    logging::{self, LogTarget},
    session::Session,
    tui_app::TuiApp,
};

const HELP: &str = "\
Track study tasks, points and rankings on a Study Quest server

USAGE:
  sq_client [OPTIONS]

OPTIONS:
  --server URL          Server URL  [default: $STUDY_QUEST_API_URL or http://localhost:5000]
  --email EMAIL         Email for login
  --password PASS       Password for login
  --tui                 Use TUI (Terminal UI) mode [default: false]

FLAGS:
  -h, --help            Print help information

ENVIRONMENT:
  STUDY_QUEST_DATA_DIR       Where credentials are kept [default: ~/.study_quest]
  STUDY_QUEST_TIMEOUT_SECS   Request timeout [default: 10]
  RUST_LOG                   Log filter
";

struct Args {
    server_url: Option<String>,
    email: Option<String>,
    password: Option<String>,
    use_tui: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut pargs = Arguments::from_env();

    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = Args {
        server_url: pargs.opt_value_from_str("--server")?,
        email: pargs.opt_value_from_str("--email")?,
        password: pargs.opt_value_from_str("--password")?,
        use_tui: pargs.contains("--tui"),
    };

    run(args).await
}

fn prompt(label: &str) -> Result<String> {
    print!("{label}: ");
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

/// Log in, offering registration when login fails.
async fn sign_in<S: CredentialStore>(session: &mut Session<S>, args: &Args) -> Result<()> {
    let email = match &args.email {
        Some(email) => email.clone(),
        None => prompt("Email")?,
    };
    let password = match &args.password {
        Some(password) => password.clone(),
        None => prompt("Password")?,
    };

    println!("Logging in as {}...", email);
    match session.login(&email, &password).await {
        Ok(user) => {
            println!("Welcome back, {}!", user.username);
            Ok(())
        }
        Err(e) => {
            println!("Login failed: {}", e);
            let username = prompt("Choose a username to register (empty to quit)")?;
            if username.is_empty() {
                anyhow::bail!("Not logged in");
            }
            let user = session
                .register(&email, &username, &password)
                .await
                .context("Failed to register")?;
            println!("Registered successfully as {}!", user.username);
            Ok(())
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let _ = dotenvy::dotenv();

    let mut config = ClientConfig::from_env()?;
    if let Some(server_url) = &args.server_url {
        config = config.with_api_url(server_url);
    }

    let log_target = if args.use_tui {
        LogTarget::File(config.log_path())
    } else {
        LogTarget::Stderr
    };
    logging::init(log_target)?;
    tracing::info!(api_url = %config.api_url, "Starting client");

    let api_client = ApiClient::from_config(&config)?;
    let store = FileStore::open(config.credentials_path()).context("Failed to open credential store")?;
    let mut session = Session::new(api_client, store);

    match session.restore().await? {
        Some(user) => println!("Resumed session for {}.", user.username),
        None => sign_in(&mut session, &args).await?,
    }

    if args.use_tui {
        let mut tui_app = TuiApp::new(session, cli::today());

        let terminal = ratatui::init();
        let result = tui_app.run(terminal).await;
        ratatui::restore();

        result?;
    } else {
        CliApp::new(session, cli::today()).run().await?;
    }

    Ok(())
}
