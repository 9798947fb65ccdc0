use std::path::{Component, Path};
use time::OffsetDateTime;

use crate::errors::WikiError;

/// Escape HTML special characters
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Generate last modified metadata HTML
pub fn last_modified_html(modified: Option<OffsetDateTime>) -> String {
    let Some(dt) = modified else {
        return String::new();
    };
    match dt.format(&time::format_description::well_known::Rfc3339) {
        Ok(s) => format!("<p class=\"meta\">Last modified: {}</p>", escape_html(&s)),
        Err(_) => String::new(),
    }
}

/// Reject request paths that climb out of the served directory
pub fn ensure_safe_path(req_path: &str) -> Result<(), WikiError> {
    let path = Path::new(req_path);
    for comp in path.components() {
        match comp {
            Component::ParentDir | Component::Prefix(_) => return Err(WikiError::NotFound),
            _ => {}
        }
    }
    Ok(())
}

/// Strip the leading slash and empty or `.` segments from a request path
pub fn normalize_request_path(req_path: &str) -> String {
    req_path
        .split('/')
        .filter(|part| !part.is_empty() && *part != ".")
        .collect::<Vec<_>>()
        .join("/")
}

/// Determine content type for a file based on its extension
pub fn content_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|s| s.to_str()).map(|s| s.to_ascii_lowercase()) {
        Some(ref ext) if ext == "html" || ext == "htm" => "text/html; charset=utf-8",
        Some(ref ext) if ext == "css" => "text/css; charset=utf-8",
        Some(ref ext) if ext == "js" => "application/javascript; charset=utf-8",
        Some(ref ext) if ext == "json" => "application/json; charset=utf-8",
        Some(ref ext) if ext == "svg" => "image/svg+xml",
        Some(ref ext) if ext == "png" => "image/png",
        Some(ref ext) if ext == "jpg" || ext == "jpeg" => "image/jpeg",
        Some(ref ext) if ext == "gif" => "image/gif",
        Some(ref ext) if ext == "ico" => "image/x-icon",
        Some(ref ext) if ext == "txt" || ext == "page" => "text/plain; charset=utf-8",
        Some(ref ext) if ext == "md" => "text/markdown; charset=utf-8",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<a href=\"x\">&'</a>"), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;&lt;/a&gt;");
    }

    #[test]
    fn test_ensure_safe_path() {
        assert!(ensure_safe_path("img/logo.png").is_ok());
        assert!(ensure_safe_path("./logo.png").is_ok());
        assert!(ensure_safe_path("../secret.page").is_err());
        assert!(ensure_safe_path("img/../../etc/passwd").is_err());
    }

    #[test]
    fn test_normalize_request_path() {
        assert_eq!(normalize_request_path("/"), "");
        assert_eq!(normalize_request_path("/img//./logo.png"), "img/logo.png");
        assert_eq!(normalize_request_path("notes/"), "notes");
    }

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for(Path::new("logo.PNG")), "image/png");
        assert_eq!(content_type_for(Path::new("style.css")), "text/css; charset=utf-8");
        assert_eq!(content_type_for(Path::new("Home.page")), "text/plain; charset=utf-8");
        assert_eq!(content_type_for(Path::new("archive.tar.zst")), "application/octet-stream");
    }

    #[test]
    fn test_last_modified_html() {
        assert_eq!(last_modified_html(None), "");
        let dt = OffsetDateTime::from_unix_timestamp(0).unwrap();
        assert_eq!(
            last_modified_html(Some(dt)),
            "<p class=\"meta\">Last modified: 1970-01-01T00:00:00Z</p>"
        );
    }
}
