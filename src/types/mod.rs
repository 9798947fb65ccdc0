use std::path::PathBuf;
use std::sync::Arc;

use time::OffsetDateTime;

use crate::components::Templates;
use crate::title::Title;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub root_dir: Arc<PathBuf>,
    pub templates: Arc<Templates>,
}

/// One wiki article, backed by `<title>.page`
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub title: Title,
    /// Markdown source exactly as last saved
    pub body: Vec<u8>,
    /// HTML derived from `body` on load; `None` for a page not yet on disk
    pub render: Option<String>,
    pub modified: Option<OffsetDateTime>,
}

impl Page {
    /// A page that exists only in memory, as offered by the edit form
    pub fn blank(title: Title) -> Self {
        Self::with_body(title, Vec::new())
    }

    pub fn with_body(title: Title, body: impl Into<Vec<u8>>) -> Self {
        Self {
            title,
            body: body.into(),
            render: None,
            modified: None,
        }
    }

    pub fn body_text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// Page titles found in a listing directory, in file name order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HomePage {
    pub pages: Vec<String>,
}
