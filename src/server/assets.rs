// src/server/assets.rs

//! Static file serving with live-reload script injection.

use std::path::{Component, Path, PathBuf};

use axum::extract::State;
use axum::http::{header, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use tracing::{debug, warn};

use super::AppState;

pub const CLIENT_SCRIPT_TAG: &str = r#"<script src="/__livereload.js"></script>"#;

const CLIENT_SCRIPT: &str = r#"(function () {
  var source = new EventSource("/__livereload");
  source.addEventListener("reload", function () {
    window.location.reload();
  });
})();
"#;

/// GET /__livereload.js
pub async fn client_script() -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/javascript"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        CLIENT_SCRIPT,
    )
        .into_response()
}

/// Fallback handler serving files from the base directory.
pub async fn static_handler(State(app): State<AppState>, uri: Uri) -> Response {
    let Some(rel) = sanitize(uri.path()) else {
        debug!(path = %uri.path(), "rejected request path");
        return not_found();
    };

    let mut file = app.base_dir.join(&rel);
    if tokio::fs::metadata(&file)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false)
    {
        file.push("index.html");
    }

    let bytes = match tokio::fs::read(&file).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return not_found(),
        Err(err) => {
            warn!(file = ?file, error = %err, "failed to read static file");
            return (StatusCode::INTERNAL_SERVER_ERROR, "read error").into_response();
        }
    };

    let mime = mime_guess::from_path(&file).first_or_octet_stream();
    let body = if mime.essence_str() == "text/html" {
        match String::from_utf8(bytes) {
            Ok(html) => inject_script(&html).into_bytes(),
            Err(raw) => raw.into_bytes(),
        }
    } else {
        bytes
    };

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, mime.to_string()),
            (header::CACHE_CONTROL, "no-cache".to_string()),
        ],
        body,
    )
        .into_response()
}

/// Insert the client script tag before the last `</body>`, or append it.
pub fn inject_script(html: &str) -> String {
    let lower = html.to_ascii_lowercase();
    match lower.rfind("</body>") {
        Some(idx) => {
            let mut out = String::with_capacity(html.len() + CLIENT_SCRIPT_TAG.len());
            out.push_str(&html[..idx]);
            out.push_str(CLIENT_SCRIPT_TAG);
            out.push_str(&html[idx..]);
            out
        }
        None => format!("{html}{CLIENT_SCRIPT_TAG}"),
    }
}

/// Turn a request path into a relative file path; `None` for `..` or
/// absolute components.
fn sanitize(path: &str) -> Option<PathBuf> {
    let trimmed = path.trim_start_matches('/');
    let candidate = Path::new(trimmed);
    let mut out = PathBuf::new();
    for component in candidate.components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::CurDir => {}
            _ => return None,
        }
    }
    Some(out)
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Not found").into_response()
}
