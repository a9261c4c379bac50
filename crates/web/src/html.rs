//! Markup helpers shared by the login fixtures.

/// Escape text for an HTML element or quoted attribute.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// A JavaScript string literal safe to embed inside a `<script>` element.
///
/// JSON string syntax is valid JS; `<` is additionally escaped so the value
/// can never close the surrounding script tag.
pub fn js_string_literal(s: &str) -> String {
    js_value(&serde_json::Value::String(s.to_string()))
}

/// Any JSON value as a script-safe JavaScript expression.
pub fn js_value(value: &serde_json::Value) -> String {
    value
        .to_string()
        .replace('<', "\\u003c")
        .replace('\u{2028}', "\\u2028")
        .replace('\u{2029}', "\\u2029")
}

/// Wrap a fixture body in the shared page chrome (theme switch included).
pub fn page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>{title}</title>
    <script src="/theme.js"></script>
</head>
<body data-bs-theme="dark">
    <label class="theme-toggle">
        <input type="checkbox" id="theme-switch" checked onchange="switchTheme()"> Dark mode
    </label>
{body}
</body>
</html>
"#,
        title = escape_html(title),
        body = body,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<script>alert("x")</script> & 'y'"#),
            "&lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt; &amp; &#039;y&#039;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_js_string_literal_cannot_close_script() {
        let lit = js_string_literal(r#"</script><script>alert("pwn")"#);
        assert!(!lit.contains('<'));
        assert!(lit.starts_with('"') && lit.ends_with('"'));
        assert!(lit.contains(r#"\"pwn\""#));
    }

    #[test]
    fn test_page_includes_theme_switch() {
        let html = page("Login", "<p>hi</p>");
        assert!(html.contains(r#"id="theme-switch""#));
        assert!(html.contains(r#"src="/theme.js""#));
        assert!(html.contains("<p>hi</p>"));
    }
}
