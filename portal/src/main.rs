//! # Portal CLI
//!
//! Restores (or opens) a session and prints an account summary.
//!
//! ```bash
//! PORTAL_EMAIL=jane@example.com PORTAL_PASSWORD=... portal
//! ```

use portal::app::Portal;
use portal::config::PortalConfig;
use portal::core::Result;
use portal::services::token_store::FileTokenStore;
use portal::telemetry;
use shared::format_money;
use std::process::ExitCode;
use std::sync::Arc;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let config = match PortalConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e.user_message("Invalid configuration"));
            return ExitCode::FAILURE;
        }
    };

    // Logging is optional for the CLI; keep going without it.
    let _log_guard = match telemetry::init(&config) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: {}", e);
            None
        }
    };

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "portal exited with an error");
            eprintln!("{}", e.user_message("Something went wrong, please try again"));
            ExitCode::FAILURE
        }
    }
}

async fn run(config: PortalConfig) -> Result<()> {
    let tokens = Arc::new(FileTokenStore::open(&config.token_file)?);
    let portal = Portal::new(config, tokens)?;

    let user = match portal.start().await? {
        Some(user) => user,
        None => {
            let (Ok(email), Ok(password)) = (std::env::var("PORTAL_EMAIL"), std::env::var("PORTAL_PASSWORD")) else {
                println!("Not signed in. Set PORTAL_EMAIL and PORTAL_PASSWORD to log in.");
                return Ok(());
            };
            portal.login(&email, &password).await?
        }
    };

    println!("Signed in as {} {} <{}>", user.first_name, user.last_name, user.email);
    println!("KYC status: {:?}", user.kyc_status);

    let holdings = portal.holdings.snapshot();
    if let Some(error) = &holdings.error {
        println!("Portfolios unavailable: {}", error);
    } else if holdings.portfolios.is_empty() {
        println!("No portfolios yet.");
    } else {
        println!("Portfolios:");
        for portfolio in &holdings.portfolios {
            println!(
                "  {:<24} {:>16}  ({} investments)",
                portfolio.name,
                format_money(portfolio.total_value, "USD"),
                portfolio.investments.len()
            );
        }
        println!("Holdings value: {}", format_money(holdings.total_value(), "USD"));
    }

    println!("Unread notifications: {}", portal.notifications.unread_count());
    Ok(())
}
