//! Request path classification.
//!
//! Precedence is fixed: anything containing a `.` is a static asset, even
//! under a page prefix. Only then are the page prefixes consulted, and any
//! remaining path is a directory listing.

use std::borrow::Cow;

use percent_encoding::percent_decode_str;

pub const VIEW_PREFIX: &str = "/view/";
pub const EDIT_PREFIX: &str = "/edit/";
pub const SAVE_PREFIX: &str = "/save/";

/// Where a request goes. Page routes carry the raw, not yet validated title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Static(String),
    Home(String),
    View(String),
    Edit(String),
    Save(String),
}

impl Route {
    /// Classify a percent-encoded request path. `None` when the path does
    /// not decode to UTF-8.
    pub fn from_uri_path(raw: &str) -> Option<Self> {
        let decoded: Cow<'_, str> = percent_decode_str(raw).decode_utf8().ok()?;
        Some(Self::classify(&decoded))
    }

    /// Classify an already decoded request path
    pub fn classify(path: &str) -> Self {
        if path.contains('.') {
            return Route::Static(path.to_string());
        }

        if let Some(title) = path.strip_prefix(VIEW_PREFIX) {
            Route::View(title.to_string())
        } else if let Some(title) = path.strip_prefix(EDIT_PREFIX) {
            Route::Edit(title.to_string())
        } else if let Some(title) = path.strip_prefix(SAVE_PREFIX) {
            Route::Save(title.to_string())
        } else {
            Route::Home(path.to_string())
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Route::Static(_) => "static",
            Route::Home(_) => "home",
            Route::View(_) => "view",
            Route::Edit(_) => "edit",
            Route::Save(_) => "save",
        }
    }
}

pub fn view_location(title: &str) -> String {
    format!("{}{}", VIEW_PREFIX, title)
}

pub fn edit_location(title: &str) -> String {
    format!("{}{}", EDIT_PREFIX, title)
}
