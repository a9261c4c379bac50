//! Server-rendered login with a session cookie.
//!
//! `GET /` renders the form, `POST /` checks the pair. Success creates a
//! session record and redirects to the protected path; failure re-renders
//! the form with the generic error. `/index.php` behaves like `/`.

use std::sync::Arc;

use axum::{
    extract::{rejection::FormRejection, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Form, Router,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{debug, info};

use credfix_common::{
    validate_session_ttl, CredentialPair, CredentialRule, Error, FixtureDescriptor, Result,
    VariantKind,
};

use super::{require_rule, FixtureVariant, Outcome, INVALID_CREDENTIALS_MESSAGE};
use crate::auth::{cookie, GateState, SessionGate};
use crate::html::{escape_html, page};
use crate::server::SHARED_ROUTES;

/// Alternate login path; the form posts here.
pub const LOGIN_PATH_ALIAS: &str = "/index.php";

pub const LOGOUT_PATH: &str = "/logout";

pub struct ServerSessionLogin {
    descriptor: FixtureDescriptor,
    rule: CredentialRule,
    protected_path: String,
    gate: SessionGate,
}

impl ServerSessionLogin {
    pub fn new(descriptor: FixtureDescriptor, session_ttl_secs: i64) -> Result<Self> {
        let rule = require_rule(&descriptor, VariantKind::ServerSessionLogin)?;
        validate_session_ttl(session_ttl_secs)?;
        let protected_path = descriptor
            .protected_path()
            .ok_or_else(|| {
                Error::InvalidConfig(format!("fixture {} has no redirect target", descriptor.name()))
            })?
            .to_string();

        let reserved = [LOGIN_PATH_ALIAS, LOGOUT_PATH]
            .iter()
            .chain(SHARED_ROUTES.iter())
            .any(|p| *p == protected_path);
        if reserved || protected_path.contains(|c: char| c == ':' || c == '*') {
            return Err(Error::InvalidConfig(format!(
                "fixture {}: redirect target {} clashes with a fixture route",
                descriptor.name(),
                protected_path
            )));
        }

        Ok(Self {
            descriptor,
            rule,
            protected_path,
            gate: SessionGate::new(session_ttl_secs),
        })
    }

    pub fn gate(&self) -> &SessionGate {
        &self.gate
    }

    pub fn protected_path(&self) -> &str {
        &self.protected_path
    }

    fn render_dashboard(&self, username: &str) -> String {
        let body = format!(
            r#"    <div class="dashboard">
        <h2>Dashboard</h2>
        <p>Welcome, {username}!</p>
        <a href="{logout}">Logout</a>
    </div>"#,
            username = escape_html(username),
            logout = LOGOUT_PATH,
        );
        page("Dashboard", &body)
    }
}

impl FixtureVariant for ServerSessionLogin {
    fn descriptor(&self) -> &FixtureDescriptor {
        &self.descriptor
    }

    fn render_login_form(&self, error: Option<&str>) -> String {
        let error = error
            .map(|e| format!("        <p class=\"error\">{}</p>\n", escape_html(e)))
            .unwrap_or_default();
        let body = format!(
            r#"    <div class="login-box">
        <h2>Login</h2>
{error}        <form method="POST" action="{action}">
            <label>Username</label><br>
            <input type="text" name="username" required><br>
            <label>Password</label><br>
            <input type="password" name="password" required><br>
            <button type="submit">Login</button>
        </form>
    </div>"#,
            error = error,
            action = LOGIN_PATH_ALIAS,
        );
        page("Login", &body)
    }

    fn handle_submit(&self, submitted: &CredentialPair) -> Outcome {
        match self.gate.login(&self.rule, submitted) {
            Ok(session) => Outcome::Redirect {
                location: self.protected_path.clone(),
                session,
            },
            Err(_) => Outcome::Rejected {
                message: INVALID_CREDENTIALS_MESSAGE,
            },
        }
    }

    fn into_router(self: Arc<Self>) -> Router {
        let protected = self.protected_path.clone();
        Router::new()
            .route("/", get(login_form_handler).post(submit_handler))
            .route(LOGIN_PATH_ALIAS, get(login_form_handler).post(submit_handler))
            .route(&protected, get(protected_handler))
            .route(LOGOUT_PATH, get(logout_handler).post(logout_handler))
            .with_state(self)
    }
}

// ============================================================================
// Handlers
// ============================================================================

fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

async fn login_form_handler(State(fixture): State<Arc<ServerSessionLogin>>) -> Html<String> {
    Html(fixture.render_login_form(None))
}

async fn submit_handler(
    State(fixture): State<Arc<ServerSessionLogin>>,
    jar: CookieJar,
    form: std::result::Result<Form<CredentialPair>, FormRejection>,
) -> Response {
    let submitted = match form {
        Ok(Form(pair)) => pair,
        Err(rejection) => {
            debug!("Malformed login body, treating as empty pair: {}", rejection);
            CredentialPair::default()
        }
    };

    match fixture.handle_submit(&submitted) {
        Outcome::Redirect { location, session } => {
            info!(
                fixture = %fixture.descriptor.name(),
                username = %submitted.username,
                "Login accepted"
            );
            (cookie::with_session(jar, &session), found(&location)).into_response()
        }
        Outcome::Rejected { message } => {
            info!(
                fixture = %fixture.descriptor.name(),
                username = %submitted.username,
                "Login rejected"
            );
            (StatusCode::OK, Html(fixture.render_login_form(Some(message)))).into_response()
        }
        // The server variant only ever redirects or rejects.
        _ => (StatusCode::OK, Html(fixture.render_login_form(None))).into_response(),
    }
}

async fn protected_handler(
    State(fixture): State<Arc<ServerSessionLogin>>,
    jar: CookieJar,
) -> Response {
    let token = cookie::session_token(&jar);
    match fixture.gate.state(token.as_deref()) {
        GateState::Authenticated { username } => {
            Html(fixture.render_dashboard(&username)).into_response()
        }
        GateState::Anonymous => found("/"),
    }
}

async fn logout_handler(
    State(fixture): State<Arc<ServerSessionLogin>>,
    jar: CookieJar,
) -> Response {
    if let Some(token) = cookie::session_token(&jar) {
        fixture.gate.logout(&token);
    }
    (cookie::without_session(jar), found("/")).into_response()
}
