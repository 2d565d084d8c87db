use std::{path::PathBuf, process::ExitCode, sync::Arc};

use anyhow::Result;
use clap::{Parser, Subcommand};
use client_core::{
    config::{load_settings, normalize_base_url},
    pages::{Activation, BalancePage, DashboardPage, FundsPage, LoginPage, TransferPage},
    BankApi, FileSessionStore, HttpBankClient, Notice, RecordingNavigator, SessionContext,
    SubmitDisposition,
};
use shared::domain::Route;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod render;

#[derive(Parser, Debug)]
#[command(name = "teller", about = "Terminal client for the banking API")]
struct Cli {
    /// Base url of the banking API.
    #[arg(long, global = true)]
    api_url: Option<String>,
    /// Where the logged-in user is remembered between runs.
    #[arg(long, global = true)]
    session_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        username: String,
        #[arg(long, env = "TELLER_PIN", hide_env_values = true)]
        pin: String,
    },
    Logout,
    Dashboard,
    Balance,
    Deposit {
        #[arg(allow_negative_numbers = true)]
        amount: String,
    },
    Withdraw {
        #[arg(allow_negative_numbers = true)]
        amount: String,
    },
    Transfer {
        recipient: String,
        #[arg(allow_negative_numbers = true)]
        amount: String,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings()?;
    if let Some(api_url) = cli.api_url {
        settings.api_base_url = normalize_base_url(&api_url);
    }
    if let Some(session_file) = cli.session_file {
        settings.session_file = session_file;
    }
    debug!(api = %settings.api_base_url, session = %settings.session_file.display(), "settings");

    let api: Arc<dyn BankApi> = Arc::new(HttpBankClient::new(&settings.api_base_url)?);
    let navigator = Arc::new(RecordingNavigator::new());
    let session = SessionContext::new(
        Arc::new(FileSessionStore::new(settings.session_file)),
        navigator.clone(),
    );

    let report = run(cli.command, session, api).await;
    if let Some(output) = &report.output {
        println!("{output}");
    } else if navigator.last() == Some(Route::Login) {
        eprintln!("Not logged in. Run `teller login <username>` first.");
    }
    Ok(if report.succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// What one command printed, and whether it should exit cleanly.
#[derive(Debug)]
struct Report {
    /// `None` when the page redirected before rendering anything.
    output: Option<String>,
    succeeded: bool,
}

impl Report {
    fn shown(output: String, succeeded: bool) -> Self {
        Self {
            output: Some(output),
            succeeded,
        }
    }

    fn redirected() -> Self {
        Self {
            output: None,
            succeeded: false,
        }
    }
}

/// Drives one page for one command.
async fn run(command: Command, session: SessionContext, api: Arc<dyn BankApi>) -> Report {
    match command {
        Command::Login { username, pin } => {
            let page = LoginPage::open(session, api);
            page.set_credentials(username, pin).await;
            page.submit().await;
            let view = page.view().await;
            Report::shown(render::login(&view), view.error.is_none())
        }
        Command::Logout => {
            session.clear_session();
            Report::shown("Logged out.".to_string(), true)
        }
        Command::Dashboard => {
            let Activation::Ready(page) = DashboardPage::open(session) else {
                return Report::redirected();
            };
            Report::shown(render::dashboard(&page.view()), true)
        }
        Command::Balance => {
            let Activation::Ready(page) = BalancePage::mount(session, api).await else {
                return Report::redirected();
            };
            let view = page.view().await;
            Report::shown(render::balance(&view), view.error.is_none())
        }
        Command::Deposit { amount } => {
            let Activation::Ready(page) = FundsPage::deposit(session, api) else {
                return Report::redirected();
            };
            submit_funds(page, amount).await
        }
        Command::Withdraw { amount } => {
            let Activation::Ready(page) = FundsPage::withdraw(session, api) else {
                return Report::redirected();
            };
            submit_funds(page, amount).await
        }
        Command::Transfer { recipient, amount } => {
            let Activation::Ready(page) = TransferPage::open(session, api) else {
                return Report::redirected();
            };
            page.set_recipient(recipient).await;
            page.set_amount(amount).await;
            let disposition = page.submit().await;
            let view = page.view().await;
            Report::shown(
                render::transfer(&view),
                succeeded(disposition, view.notice.as_ref()),
            )
        }
    }
}

async fn submit_funds(page: FundsPage, amount: String) -> Report {
    page.set_amount(amount).await;
    let disposition = page.submit().await;
    let view = page.view().await;
    Report::shown(
        render::funds(&view),
        succeeded(disposition, view.notice.as_ref()),
    )
}

fn succeeded(disposition: SubmitDisposition, notice: Option<&Notice>) -> bool {
    disposition == SubmitDisposition::Settled && matches!(notice, Some(Notice::Success { .. }))
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
