//! Page controllers. Each one composes the session guard, the validator, an
//! [`Executor`](crate::executor::Executor) and the reconciler for a single
//! screen. Form state sits behind a `tokio` mutex that is never held across
//! a network call, so input stays editable while a request is outstanding.

mod balance;
mod dashboard;
mod funds;
mod login;
mod transfer;

pub use balance::{BalancePage, BalancePageView};
pub use dashboard::{DashboardLink, DashboardPage, DashboardView};
pub use funds::{FundsPage, FundsView};
pub use login::{LoginPage, LoginView};
pub use transfer::{TransferPage, TransferView};

/// Result of entering a protected page.
pub enum Activation<P> {
    Ready(P),
    /// No session; navigation to the login page has been requested and the
    /// page must show nothing.
    Redirecting,
}

impl<P> Activation<P> {
    pub fn ready(self) -> Option<P> {
        match self {
            Activation::Ready(page) => Some(page),
            Activation::Redirecting => None,
        }
    }

    pub fn is_redirecting(&self) -> bool {
        matches!(self, Activation::Redirecting)
    }
}

#[cfg(test)]
#[path = "../tests/pages_tests.rs"]
mod tests;
