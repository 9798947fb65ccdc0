//! pagewiki - a minimal personal wiki
//!
//! Pages are flat `<title>.page` files holding markdown. They are rendered to
//! HTML on view, edited through a plain form, and every other dotted path is
//! served straight from disk.

pub mod components;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod logger;
pub mod routes;
pub mod services;
pub mod title;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use components::Templates;
pub use config::Config;
pub use errors::WikiError;
pub use handlers::router;
pub use routes::Route;
pub use services::{MarkdownService, PageStore};
pub use title::{is_valid_title, Title};
pub use types::{AppState, HomePage, Page};
