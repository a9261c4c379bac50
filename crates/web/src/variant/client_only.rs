//! Client-only login inside a hash-routed single-page app.
//!
//! The check runs in the page script: success raises an alert, failure
//! makes the error element visible. Nothing is ever posted back, and the
//! router exposes no POST route for this fixture.
//!
//! [`LoginPage`] reproduces the script's click handler so the page
//! behaviour can be exercised without a browser.

use std::sync::Arc;

use axum::{
    extract::State,
    http::header,
    response::{Html, IntoResponse},
    routing::get,
    Router,
};

use credfix_common::{
    CredentialPair, CredentialRule, FixtureDescriptor, Result, SuccessSignal, VariantKind,
    DEFAULT_ALERT_TEXT,
};

use super::{require_rule, FixtureVariant, Outcome, INVALID_CREDENTIALS_MESSAGE};
use crate::html::{escape_html, js_string_literal, js_value, page};

/// Script carrying the router and the credential check
pub const SCRIPT_PATH: &str = "/main.js";

/// Fragment shown when the URL has no hash
pub const DEFAULT_FRAGMENT: &str = "home";

/// Fragment -> content for the page's hash router
pub const PAGES: &[(&str, &str)] = &[
    ("home", "Welcome home"),
    ("about", "About this site"),
    ("login", "Sign in below"),
    ("contact", "Contact the administrator"),
];

/// Hash routing as the page script does it
pub struct HashRouter;

impl HashRouter {
    /// Normalize a `location.hash` value; an empty hash becomes the default.
    pub fn fragment(hash: &str) -> &str {
        let fragment = hash.strip_prefix('#').unwrap_or(hash);
        if fragment.is_empty() {
            DEFAULT_FRAGMENT
        } else {
            fragment
        }
    }

    /// Content for a fragment; unknown fragments render nothing.
    pub fn content(fragment: &str) -> &'static str {
        PAGES
            .iter()
            .find(|(name, _)| *name == fragment)
            .map(|(_, content)| *content)
            .unwrap_or("")
    }
}

pub struct ClientOnlyLogin {
    descriptor: FixtureDescriptor,
    rule: CredentialRule,
    alert_text: String,
}

impl ClientOnlyLogin {
    pub fn new(descriptor: FixtureDescriptor) -> Result<Self> {
        let rule = require_rule(&descriptor, VariantKind::ClientOnlyLogin)?;
        let alert_text = match descriptor.success_signal() {
            SuccessSignal::Alert { text } => text.clone(),
            _ => DEFAULT_ALERT_TEXT.to_string(),
        };
        Ok(Self {
            descriptor,
            rule,
            alert_text,
        })
    }

    /// The page script. Expected values are embedded as escaped literals.
    pub fn render_script(&self) -> String {
        let pages: serde_json::Map<String, serde_json::Value> = PAGES
            .iter()
            .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.to_string())))
            .collect();
        let expected = self.rule.expected();

        format!(
            r#"var pages = {pages};

function getContent(fragmentId) {{
  return Object.prototype.hasOwnProperty.call(pages, fragmentId) ? pages[fragmentId] : "";
}}

function loadContent() {{
  var contentDiv = document.getElementById("app");
  contentDiv.textContent = getContent(location.hash.substr(1));
}}

if (!location.hash) {{
  location.hash = {default_hash};
}}

loadContent();
window.addEventListener("hashchange", loadContent);

const expectedUsername = {username};
const expectedPassword = {password};
const successText = {success};

const loginForm = document.getElementById("login-form");
const loginButton = document.getElementById("login-form-submit");
const loginErrorMsg = document.getElementById("login-error-msg");

loginForm.addEventListener("submit", (e) => e.preventDefault());

loginButton.addEventListener("click", (e) => {{
  e.preventDefault();
  const username = loginForm.username.value;
  const password = loginForm.password.value;
  if (username === expectedUsername && password === expectedPassword) {{
    loginErrorMsg.style.visibility = "hidden";
    alert(successText);
  }} else {{
    loginErrorMsg.style.visibility = "visible";
  }}
}});
"#,
            pages = js_value(&serde_json::Value::Object(pages)),
            default_hash = js_string_literal(&format!("#{}", DEFAULT_FRAGMENT)),
            username = js_string_literal(&expected.username),
            password = js_string_literal(&expected.password),
            success = js_string_literal(&self.alert_text),
        )
    }
}

impl FixtureVariant for ClientOnlyLogin {
    fn descriptor(&self) -> &FixtureDescriptor {
        &self.descriptor
    }

    /// The error element is always present; only its visibility changes.
    fn render_login_form(&self, error: Option<&str>) -> String {
        let visibility = if error.is_some() { "visible" } else { "hidden" };
        let nav: String = PAGES
            .iter()
            .map(|(name, _)| format!(r##"<a href="#{0}">{0}</a> "##, name))
            .collect();
        let body = format!(
            r#"    <nav>{nav}</nav>
    <div id="app"></div>
    <main id="login-holder">
        <h1>Login</h1>
        <form id="login-form">
            <input type="text" name="username" id="username-field" placeholder="Username">
            <input type="password" name="password" id="password-field" placeholder="Password">
            <input type="submit" value="Login" id="login-form-submit">
        </form>
        <div id="login-error-msg-holder">
            <p id="login-error-msg" style="visibility: {visibility}">{message}</p>
        </div>
    </main>
    <script src="{script}"></script>"#,
            nav = nav.trim_end(),
            visibility = visibility,
            message = escape_html(error.unwrap_or(INVALID_CREDENTIALS_MESSAGE)),
            script = SCRIPT_PATH,
        );
        page("Login", &body)
    }

    fn handle_submit(&self, submitted: &CredentialPair) -> Outcome {
        if self.rule.evaluate(submitted) {
            Outcome::Acknowledged {
                text: self.alert_text.clone(),
            }
        } else {
            Outcome::ErrorShown
        }
    }

    fn into_router(self: Arc<Self>) -> Router {
        Router::new()
            .route("/", get(page_handler))
            .route("/index.html", get(page_handler))
            .route(SCRIPT_PATH, get(script_handler))
            .with_state(self)
    }
}

async fn page_handler(State(fixture): State<Arc<ClientOnlyLogin>>) -> Html<String> {
    Html(fixture.render_login_form(None))
}

async fn script_handler(State(fixture): State<Arc<ClientOnlyLogin>>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript")],
        fixture.render_script(),
    )
}

/// In-memory page state, gone on reload
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageState {
    pub error_visible: bool,
    /// Alert raised by the last submission, if any
    pub acknowledgment: Option<String>,
}

/// One loaded copy of the page
pub struct LoginPage<'a> {
    fixture: &'a ClientOnlyLogin,
    fragment: String,
    state: PageState,
}

impl<'a> LoginPage<'a> {
    pub fn open(fixture: &'a ClientOnlyLogin, hash: &str) -> Self {
        Self {
            fixture,
            fragment: HashRouter::fragment(hash).to_string(),
            state: PageState::default(),
        }
    }

    pub fn navigate(&mut self, hash: &str) {
        self.fragment = HashRouter::fragment(hash).to_string();
    }

    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    pub fn content(&self) -> &'static str {
        HashRouter::content(&self.fragment)
    }

    /// Click on the submit control. Completes synchronously.
    pub fn submit(&mut self, submitted: &CredentialPair) -> &PageState {
        self.state = match self.fixture.handle_submit(submitted) {
            Outcome::Acknowledged { text } => PageState {
                error_visible: false,
                acknowledgment: Some(text),
            },
            _ => PageState {
                error_visible: true,
                acknowledgment: None,
            },
        };
        &self.state
    }

    pub fn state(&self) -> &PageState {
        &self.state
    }

    /// Reload: all page state is lost.
    pub fn reload(&mut self) {
        self.state = PageState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> ClientOnlyLogin {
        let descriptor = FixtureDescriptor::builder("spa", VariantKind::ClientOnlyLogin)
            .credentials("admin", "admin1")
            .build()
            .unwrap();
        ClientOnlyLogin::new(descriptor).unwrap()
    }

    #[test]
    fn test_correct_pair_acknowledged_error_hidden() {
        let f = fixture();
        let mut page = LoginPage::open(&f, "");
        let state = page.submit(&CredentialPair::new("admin", "admin1"));
        assert!(!state.error_visible);
        assert_eq!(state.acknowledgment.as_deref(), Some(DEFAULT_ALERT_TEXT));
    }

    #[test]
    fn test_wrong_pair_shows_error_without_ack() {
        let f = fixture();
        let mut page = LoginPage::open(&f, "");
        let state = page.submit(&CredentialPair::new("foo", "bar"));
        assert!(state.error_visible);
        assert_eq!(state.acknowledgment, None);
    }

    #[test]
    fn test_error_visibility_tracks_last_submission() {
        let f = fixture();
        let mut page = LoginPage::open(&f, "#login");
        page.submit(&CredentialPair::new("admin", "admin"));
        assert!(page.state().error_visible);
        page.submit(&CredentialPair::new("admin", "admin1"));
        assert!(!page.state().error_visible);
        page.submit(&CredentialPair::default());
        assert!(page.state().error_visible);
        assert_eq!(page.state().acknowledgment, None);
    }

    #[test]
    fn test_reload_clears_state() {
        let f = fixture();
        let mut page = LoginPage::open(&f, "");
        page.submit(&CredentialPair::new("foo", "bar"));
        page.reload();
        assert_eq!(page.state(), &PageState::default());
    }

    #[test]
    fn test_hash_router() {
        let f = fixture();
        let mut page = LoginPage::open(&f, "");
        assert_eq!(page.fragment(), "home");
        assert_eq!(page.content(), "Welcome home");

        page.navigate("#contact");
        assert_eq!(page.content(), "Contact the administrator");

        page.navigate("#nowhere");
        assert_eq!(page.fragment(), "nowhere");
        assert_eq!(page.content(), "");

        page.navigate("#");
        assert_eq!(page.fragment(), "home");
    }

    #[test]
    fn test_script_makes_no_network_calls() {
        let script = fixture().render_script();
        for needle in ["fetch(", "XMLHttpRequest", "sendBeacon", "WebSocket", ".submit()"] {
            assert!(!script.contains(needle), "script contains {}", needle);
        }
        assert!(script.contains("e.preventDefault()"));
    }

    #[test]
    fn test_script_embeds_escaped_credentials() {
        let descriptor = FixtureDescriptor::builder("spa", VariantKind::ClientOnlyLogin)
            .credentials("ad\"min", "</script>")
            .build()
            .unwrap();
        let script = ClientOnlyLogin::new(descriptor).unwrap().render_script();
        assert!(script.contains(r#"const expectedUsername = "ad\"min";"#));
        assert!(script.contains(r#"const expectedPassword = "\u003c/script>";"#));
        assert!(!script.contains("</script>"));
    }

    #[test]
    fn test_form_has_no_action_and_hidden_error() {
        let html = fixture().render_login_form(None);
        assert!(html.contains(r#"<form id="login-form">"#));
        assert!(!html.contains("action="));
        assert!(html.contains(r#"style="visibility: hidden""#));
        assert!(html.contains(INVALID_CREDENTIALS_MESSAGE));
    }
}
