//! Artifact body rendering.
//!
//! Two artifact flavours exist beyond the plain page body: an HTML redirect
//! stub that replays a `Location` header in the browser, and a PHP cache
//! file that replays the recorded status code and headers server-side.
//! Plain HTML cannot convey a non-200 status, which is the whole reason the
//! PHP variant mode exists.

use serde::Deserialize;

use crate::response::RenderedResponse;

pub const HTML_EXTENSION: &str = "html";
pub const PHP_EXTENSION: &str = "php";

/// Which artifacts a publish produces.
///
/// `Html` writes only the static page; `Php` additionally writes an
/// executable cache file able to send a real HTTP status code, enabling
/// cached redirects and error pages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Html,
    #[default]
    Php,
}

impl ArtifactKind {
    /// True when the executable PHP variant is written alongside the HTML.
    pub fn php_enabled(self) -> bool {
        matches!(self, Self::Php)
    }
}

/// Render the HTML redirect stub for a `Location` target.
///
/// Uses both a meta refresh and a script assignment so the redirect works
/// with and without JavaScript.
pub fn html_redirect(location: &str) -> String {
    let href = attr_escape(location);
    let js = js_escape(location);
    format!(
        "<!DOCTYPE html>\n\
         <html>\n\
         <head>\n\
         <meta charset=\"utf-8\">\n\
         <meta http-equiv=\"refresh\" content=\"0; url={href}\">\n\
         <script>window.location.href = \"{js}\";</script>\n\
         <title>Redirecting to {href}</title>\n\
         </head>\n\
         <body>\n\
         <p>Redirecting to <a href=\"{href}\">{href}</a></p>\n\
         </body>\n\
         </html>\n"
    )
}

/// Render the executable PHP cache file for a response.
///
/// The stub replays the recorded status code and headers, then emits the
/// recorded body verbatim after the closing tag.
pub fn php_cache_file(response: &RenderedResponse) -> Vec<u8> {
    let mut stub = String::from("<?php\n\n");
    stub.push_str(&format!("http_response_code({});\n", response.status_code()));
    for (name, value) in response.headers() {
        stub.push_str(&format!(
            "header('{}: {}');\n",
            php_escape(name),
            php_escape(value)
        ));
    }
    stub.push_str("?>");

    let mut rendered = stub.into_bytes();
    rendered.extend_from_slice(response.body());
    rendered
}

fn attr_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn js_escape(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('<', "\\x3c")
}

fn php_escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redirect_stub_targets_the_location() {
        let stub = html_redirect("/moved/here");
        assert!(stub.contains("content=\"0; url=/moved/here\""));
        assert!(stub.contains("window.location.href = \"/moved/here\";"));
        assert!(stub.contains("<a href=\"/moved/here\">"));
    }

    #[test]
    fn redirect_stub_escapes_markup_in_the_location() {
        let stub = html_redirect("/x\"><script>alert(1)</script>");
        assert!(!stub.contains("<script>alert(1)</script>"));
        assert!(stub.contains("&quot;&gt;&lt;script&gt;"));
    }

    #[test]
    fn php_stub_replays_status_and_headers_before_the_body() {
        let response = RenderedResponse::new(404, "<html>missing</html>")
            .with_header("Content-Type", "text/html; charset=utf-8");

        let rendered = php_cache_file(&response);
        let rendered = String::from_utf8(rendered).expect("stub should be utf-8");

        assert!(rendered.starts_with("<?php"));
        assert!(rendered.contains("http_response_code(404);"));
        assert!(rendered.contains("header('Content-Type: text/html; charset=utf-8');"));
        assert!(rendered.ends_with("?><html>missing</html>"));
    }

    #[test]
    fn php_stub_escapes_quotes_in_header_values() {
        let response = RenderedResponse::new(200, "ok").with_header("X-Note", "it's quoted");
        let rendered = String::from_utf8(php_cache_file(&response)).expect("stub should be utf-8");
        assert!(rendered.contains("header('X-Note: it\\'s quoted');"));
    }

    #[test]
    fn artifact_kind_defaults_to_php() {
        assert!(ArtifactKind::default().php_enabled());
        assert!(!ArtifactKind::Html.php_enabled());
    }
}
