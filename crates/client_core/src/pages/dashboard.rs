use shared::domain::{Route, Username};

use crate::{pages::Activation, session::SessionContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardLink {
    pub route: Route,
    pub title: &'static str,
    pub description: &'static str,
}

const LINKS: [DashboardLink; 4] = [
    DashboardLink {
        route: Route::Deposit,
        title: "Deposit Funds",
        description: "Add money to your account.",
    },
    DashboardLink {
        route: Route::Transfer,
        title: "Bank Transfer",
        description: "Send money to another account.",
    },
    DashboardLink {
        route: Route::Balance,
        title: "View Balance",
        description: "Check your current account balance.",
    },
    DashboardLink {
        route: Route::Withdraw,
        title: "Withdraw Funds",
        description: "Withdraw money from your account.",
    },
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardView {
    pub greeting: String,
    pub links: Vec<DashboardLink>,
}

pub struct DashboardPage {
    username: Username,
    session: SessionContext,
}

impl DashboardPage {
    pub fn open(session: SessionContext) -> Activation<Self> {
        match session.require_session() {
            Some(current) => Activation::Ready(Self {
                username: current.username,
                session,
            }),
            None => Activation::Redirecting,
        }
    }

    pub fn view(&self) -> DashboardView {
        DashboardView {
            greeting: format!("Welcome, {}!", self.username),
            links: LINKS.to_vec(),
        }
    }

    pub fn follow(&self, route: Route) {
        self.session.navigate(route);
    }

    pub fn logout(&self) {
        self.session.clear_session();
    }
}
