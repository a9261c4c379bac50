//! Static file serving

use axum::{
    body::Body,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use credfix_common::theme::{Theme, THEME_STORAGE_KEY};

/// Vendored installer page, served byte-for-byte.
pub const INSTALL_PAGE: &str = include_str!("../assets/wp-admin/install.php");

/// Path the installer decoy lives at
pub const INSTALL_PAGE_PATH: &str = "/wp-admin/install.php";

/// Theme switch script shared by all fixture pages, keyed on the same
/// storage entry the theme store uses.
pub fn theme_script() -> String {
    format!(
        r#"
function updateToggleSwitch(theme) {{
  var toggle = document.getElementById('theme-switch');
  if (toggle) {{
    toggle.checked = theme === 'dark';
  }}
}}

function switchTheme() {{
  var body = document.body;
  var next = body.dataset.bsTheme === 'light' ? 'dark' : 'light';
  body.dataset.bsTheme = next;
  localStorage.setItem('{key}', next);
  updateToggleSwitch(next);
}}

function loadTheme() {{
  var saved = localStorage.getItem('{key}') || '{default}';
  document.body.dataset.bsTheme = saved;
  updateToggleSwitch(saved);
}}

document.addEventListener('DOMContentLoaded', loadTheme);
"#,
        key = THEME_STORAGE_KEY,
        default = Theme::default().as_str(),
    )
}

/// Embedded asset lookup
pub struct StaticFiles;

impl StaticFiles {
    /// Serve an embedded file by request path
    pub fn serve(path: &str) -> Response {
        let content_type = guess_content_type(path);

        match path {
            "/theme.js" => serve_embedded(theme_script(), content_type),
            INSTALL_PAGE_PATH => serve_embedded(INSTALL_PAGE, content_type),
            _ => (StatusCode::NOT_FOUND, "File not found").into_response(),
        }
    }
}

pub fn guess_content_type(path: &str) -> &'static str {
    if path.ends_with(".js") {
        "application/javascript"
    } else if path.ends_with(".css") {
        "text/css"
    } else if path.ends_with(".html") || path.ends_with(".php") || path.ends_with('/') {
        "text/html; charset=utf-8"
    } else {
        "application/octet-stream"
    }
}

pub fn serve_embedded(content: impl Into<Body>, content_type: &'static str) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, content_type)],
        content.into(),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_types() {
        assert_eq!(guess_content_type("/theme.js"), "application/javascript");
        assert_eq!(guess_content_type(INSTALL_PAGE_PATH), "text/html; charset=utf-8");
        assert_eq!(guess_content_type("/blob"), "application/octet-stream");
    }

    #[test]
    fn test_install_page_is_vendored_markup() {
        assert!(INSTALL_PAGE.starts_with("<!DOCTYPE html>"));
        assert!(INSTALL_PAGE.contains("WordPress &rsaquo; Installation"));
    }

    #[test]
    fn test_theme_script_uses_store_key_and_dark_default() {
        let script = theme_script();
        assert!(script.contains(&format!("localStorage.setItem('{}', next)", THEME_STORAGE_KEY)));
        assert!(script.contains(&format!("localStorage.getItem('{}') || 'dark'", THEME_STORAGE_KEY)));
    }

    #[test]
    fn test_unknown_asset_is_404() {
        assert_eq!(StaticFiles::serve("/nope.js").status(), StatusCode::NOT_FOUND);
    }
}
