use std::path::Path;

use axum::{
    body::Body,
    extract::{DefaultBodyLimit, Form, FromRequest, Multipart, Request, State},
    http::{header, Method, Response, StatusCode},
    response::{Html, IntoResponse},
    Router,
};

use crate::errors::WikiError;
use crate::routes::{edit_location, view_location, Route};
use crate::services::PageStore;
use crate::title::Title;
use crate::types::{AppState, Page};
use crate::utils::{content_type_for, ensure_safe_path, normalize_request_path};

/// Largest request body accepted by the save form
pub const MAX_FORM_BYTES: usize = 10 << 20;

/// Name of the form field carrying the page source
pub const BODY_FIELD: &str = "body";

/// Build the application router. Every path goes through [`handle_request`],
/// which applies [`Route::classify`] so precedence stays in one place.
pub fn router(state: AppState) -> Router {
    Router::new()
        .fallback(handle_request)
        .layer(DefaultBodyLimit::max(MAX_FORM_BYTES))
        .with_state(state)
}

/// Single entry point for all requests
pub async fn handle_request(
    State(state): State<AppState>,
    request: Request,
) -> Result<Response<Body>, WikiError> {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let Some(route) = Route::from_uri_path(&path) else {
        log::warn!("Undecodable path: '{}'", path);
        return Err(WikiError::NotFound);
    };
    log::debug!("{} {} -> {}", method, path, route.name());

    let store = PageStore::new(state.root_dir.as_ref().clone());
    let result = match route {
        Route::Static(path) => handle_static(&state, &path),
        Route::Home(path) => handle_home(&state, &store, &path),
        Route::View(raw) => handle_view(&state, &store, &raw),
        Route::Edit(raw) => handle_edit(&state, &store, &raw),
        Route::Save(raw) => {
            if method != Method::POST {
                return Ok(method_not_allowed());
            }
            handle_save(&state, &store, &raw, request).await
        }
    };

    if let Err(e) = &result {
        if e.status().is_server_error() {
            log::error!("{} {} failed: {}", method, path, e);
        }
    }
    result
}

/// Validate a title taken from the URL; failures are plain 404s
fn require_title(raw: &str) -> Result<Title, WikiError> {
    Title::parse(raw).ok_or_else(|| {
        log::warn!("Rejected title: '{}'", raw);
        WikiError::InvalidTitle
    })
}

fn handle_static(state: &AppState, req_path: &str) -> Result<Response<Body>, WikiError> {
    let normalized = normalize_request_path(req_path);
    ensure_safe_path(&normalized)?;
    let requested = state.root_dir.join(&normalized);

    if !requested.is_file() {
        log::warn!("Static path not found: '{}'", req_path);
        return Err(WikiError::NotFound);
    }

    let bytes = std::fs::read(&requested)?;
    log::info!("Served: {}", req_path);
    let mut resp = Response::new(Body::from(bytes));
    resp.headers_mut().insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static(content_type_for(&requested)),
    );
    Ok(resp)
}

fn handle_home(state: &AppState, store: &PageStore, req_path: &str) -> Result<Response<Body>, WikiError> {
    let dir = normalize_request_path(req_path);
    let home = store.list_titles(Path::new(&dir));
    let page = state.templates.render_home(&home)?;
    Ok(Html(page).into_response())
}

fn handle_view(state: &AppState, store: &PageStore, raw: &str) -> Result<Response<Body>, WikiError> {
    let title = require_title(raw)?;
    match store.load(&title) {
        Ok(page) => Ok(Html(state.templates.render_view(&page)?).into_response()),
        Err(WikiError::NotFound) => {
            log::debug!("No page '{}', redirecting to editor", title);
            Ok(found(edit_location(title.as_str())))
        }
        Err(e) => Err(e),
    }
}

fn handle_edit(state: &AppState, store: &PageStore, raw: &str) -> Result<Response<Body>, WikiError> {
    let title = require_title(raw)?;
    let page = match store.load(&title) {
        Ok(page) => page,
        Err(WikiError::NotFound) => Page::blank(title),
        Err(e) => return Err(e),
    };
    Ok(Html(state.templates.render_edit(&page)?).into_response())
}

async fn handle_save(
    state: &AppState,
    store: &PageStore,
    raw: &str,
    request: Request,
) -> Result<Response<Body>, WikiError> {
    let title = require_title(raw)?;
    let body = read_body_field(state, request).await?;
    let page = Page::with_body(title, body);
    store.save(&page)?;
    Ok(found(view_location(page.title.as_str())))
}

/// Media type of the request without parameters, lowercased
fn media_type(request: &Request) -> Option<String> {
    let value = request.headers().get(header::CONTENT_TYPE)?.to_str().ok()?;
    let essence = value.split(';').next().unwrap_or_default().trim();
    Some(essence.to_ascii_lowercase())
}

/// First `body` value of a urlencoded or multipart form. A request that is
/// not a form at all carries an empty body; a form that cannot be read is an
/// error and nothing gets saved.
async fn read_body_field(state: &AppState, request: Request) -> Result<String, WikiError> {
    match media_type(&request).as_deref() {
        Some("application/x-www-form-urlencoded") => {
            let Form(pairs) = Form::<Vec<(String, String)>>::from_request(request, state)
                .await
                .map_err(|rejection| {
                    log::warn!("Rejected save form: {}", rejection.body_text());
                    WikiError::Rejected(rejection.status(), rejection.body_text())
                })?;
            Ok(pairs
                .into_iter()
                .find(|(name, _)| name == BODY_FIELD)
                .map(|(_, value)| value)
                .unwrap_or_default())
        }
        Some("multipart/form-data") => {
            let mut multipart = Multipart::from_request(request, state).await.map_err(|rejection| {
                log::warn!("Rejected multipart save: {}", rejection.body_text());
                WikiError::Rejected(rejection.status(), rejection.body_text())
            })?;
            while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
                if field.name() == Some(BODY_FIELD) {
                    return field.text().await.map_err(multipart_error);
                }
            }
            Ok(String::new())
        }
        other => {
            log::debug!("Save without form payload ({:?}), storing empty body", other);
            Ok(String::new())
        }
    }
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> WikiError {
    log::warn!("Failed to read multipart save: {}", e);
    WikiError::Rejected(e.status(), e.body_text())
}

/// 302 Found
fn found(location: String) -> Response<Body> {
    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}

fn method_not_allowed() -> Response<Body> {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, "POST")],
        "405 method not allowed\n",
    )
        .into_response()
}
