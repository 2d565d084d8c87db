//! Plain-text rendering of page views for the terminal.

use client_core::{
    pages::{BalancePageView, DashboardView, FundsView, LoginView, TransferView},
    Notice,
};

pub fn login(view: &LoginView) -> String {
    match (&view.logged_in_as, &view.error) {
        (Some(username), _) => format!("Logged in as {username}."),
        (None, Some(err)) => format!("Error: {err}"),
        (None, None) => "Not logged in.".to_string(),
    }
}

pub fn dashboard(view: &DashboardView) -> String {
    let mut lines = vec![view.greeting.clone(), String::new()];
    for link in &view.links {
        let command = link.route.path().trim_start_matches('/');
        lines.push(format!("  {:<10} {}: {}", command, link.title, link.description));
    }
    lines.join("\n")
}

pub fn balance(view: &BalancePageView) -> String {
    if let Some(err) = &view.error {
        return format!("Error: {err}");
    }
    match view.balance_text() {
        Some(text) => format!("Account: {}\nCurrent Balance: {text}", view.account),
        None => "Loading balance...".to_string(),
    }
}

pub fn funds(view: &FundsView) -> String {
    notice(view.notice.as_ref())
}

pub fn transfer(view: &TransferView) -> String {
    notice(view.notice.as_ref())
}

fn notice(notice: Option<&Notice>) -> String {
    match notice {
        Some(success @ Notice::Success { .. }) => match success.new_balance_text() {
            Some(balance) => format!("{}\nNew Balance: {balance}", success.text()),
            None => success.text(),
        },
        Some(Notice::Error(err)) => format!("Error: {err}"),
        None => String::new(),
    }
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
