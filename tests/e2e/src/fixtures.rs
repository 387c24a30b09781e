//! Test fixtures and data factories
//!
//! Pages and assets as the CMS Flask app serves them.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use cms_worker::config::DEFAULT_ORIGIN;
use cms_worker::fetch::Url;
use cms_worker::{Response, ResponseType};

/// Origin every fixture URL lives under
pub const ORIGIN: &str = DEFAULT_ORIGIN;

/// Absolute URL for an app path
pub fn app_url(path: &str) -> String {
    format!("{}{}", ORIGIN, path)
}

/// HTML test fixtures
pub struct HtmlFixtures;

impl HtmlFixtures {
    /// Landing page, also the offline fallback
    pub fn index_page() -> String {
        String::from(r#"<!DOCTYPE html>
<html>
<head>
    <title>Criminology Management System</title>
    <link rel="manifest" href="/static/manifest.json">
    <link rel="stylesheet" href="/static/css/style.css">
</head>
<body>
    <h1>Criminology Management System</h1>
    <a href="/dashboard">Dashboard</a>
    <script src="/static/js/main.js"></script>
</body>
</html>"#)
    }

    /// Logged-in dashboard
    pub fn dashboard_page() -> String {
        String::from(r#"<!DOCTYPE html>
<html>
<head>
    <title>Dashboard</title>
</head>
<body>
    <table id="records">
        <tr><th>Case</th><th>Status</th></tr>
        <tr><td>CR-2024-0012</td><td>Under investigation</td></tr>
    </table>
</body>
</html>"#)
    }

    /// User registration form
    pub fn add_user_form() -> String {
        String::from(r#"<!DOCTYPE html>
<html>
<body>
    <form action="/add_user" method="post">
        <input type="text" name="name" required>
        <button type="submit">Add</button>
    </form>
</body>
</html>"#)
    }
}

/// Static asset fixtures
pub struct AssetFixtures;

impl AssetFixtures {
    pub fn stylesheet() -> &'static str {
        "body { font-family: sans-serif; }\n.navbar { background: #343a40; }\n"
    }

    pub fn script() -> &'static str {
        "if ('serviceWorker' in navigator) { navigator.serviceWorker.register('/sw.js'); }\n"
    }

    pub fn manifest() -> &'static str {
        r#"{"name":"Criminology Management System","short_name":"CMS","start_url":"/"}"#
    }

    /// Records list as the JSON API returns it
    pub fn records_json() -> &'static str {
        r#"[{"id":12,"case":"CR-2024-0012","status":"open"}]"#
    }
}

/// Content type for a URL, by extension
pub fn content_type_for(url: &str) -> &'static str {
    let path = Url::parse(url).map(|u| u.path()).unwrap_or(url);
    match path.rsplit_once('.').map(|(_, ext)| ext) {
        Some("css") => "text/css",
        Some("js") => "application/javascript",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("ico") => "image/x-icon",
        _ if path.starts_with("/api/") || path.starts_with("/get_") => "application/json",
        _ => "text/html; charset=utf-8",
    }
}

/// A `200` response for `url` as the server would send it.
///
/// Same-origin URLs come back `basic`, everything else `cors`.
pub fn response_for(url: &str, body: impl Into<Vec<u8>>) -> Response {
    let response_type = if url.starts_with(ORIGIN) {
        ResponseType::Basic
    } else {
        ResponseType::Cors
    };
    Response::basic(200, body)
        .with_type(response_type)
        .with_url(url)
        .with_header("Content-Type", content_type_for(url))
}

/// Body served for a static asset URL
pub fn asset_body(url: &str) -> String {
    let path = Url::parse(url).map(|u| u.path()).unwrap_or(url);
    match path {
        "/" => HtmlFixtures::index_page(),
        "/static/css/style.css" => String::from(AssetFixtures::stylesheet()),
        "/static/js/main.js" => String::from(AssetFixtures::script()),
        "/static/manifest.json" => String::from(AssetFixtures::manifest()),
        _ => format!("/* {} */", url),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_types() {
        assert_eq!(content_type_for(&app_url("/static/css/style.css")), "text/css");
        assert_eq!(content_type_for(&app_url("/api/records")), "application/json");
        assert_eq!(content_type_for(&app_url("/dashboard")), "text/html; charset=utf-8");
    }

    #[test]
    fn test_response_type_by_origin() {
        assert_eq!(response_for(&app_url("/"), "").response_type, ResponseType::Basic);
        assert_eq!(
            response_for("https://code.jquery.com/jquery-3.6.0.min.js", "").response_type,
            ResponseType::Cors
        );
    }
}
