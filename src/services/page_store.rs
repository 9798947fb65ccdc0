use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use log::{debug, error, info, warn};
use time::OffsetDateTime;

use crate::errors::WikiError;
use crate::services::MarkdownService;
use crate::title::Title;
use crate::types::{HomePage, Page};

/// Marker that identifies page files on disk
pub const PAGE_EXTENSION: &str = ".page";

/// Service for loading and saving pages as flat files
#[derive(Debug, Clone)]
pub struct PageStore {
    base_dir: PathBuf,
    markdown: MarkdownService,
}

impl PageStore {
    /// Create a store rooted at `base_dir`
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        let base_dir = base_dir.into();
        debug!("Creating PageStore with base directory: {:?}", base_dir);
        Self { base_dir, markdown: MarkdownService::new() }
    }

    pub fn path_for(&self, title: &Title) -> PathBuf {
        self.base_dir.join(title.file_name())
    }

    /// Read a page and render its body. Any read failure counts as not found.
    pub fn load(&self, title: &Title) -> Result<Page, WikiError> {
        let path = self.path_for(title);
        let body = fs::read(&path).map_err(|e| {
            debug!("Could not read page {:?}: {}", path, e);
            WikiError::NotFound
        })?;

        let modified = fs::metadata(&path)
            .and_then(|m| m.modified())
            .ok()
            .map(OffsetDateTime::from);
        let render = self.markdown.render(&String::from_utf8_lossy(&body));

        debug!("Loaded page '{}', {} bytes", title, body.len());
        Ok(Page {
            title: title.clone(),
            body,
            render: Some(render),
            modified,
        })
    }

    /// Write the page body, replacing whatever was stored under its title
    pub fn save(&self, page: &Page) -> Result<(), WikiError> {
        let path = self.path_for(&page.title);
        write_private(&path, &page.body).map_err(|e| {
            error!("Failed to save page {:?}: {}", path, e);
            WikiError::Io(e)
        })?;
        info!("Saved page '{}', {} bytes", page.title, page.body.len());
        Ok(())
    }

    /// Titles of the page files in `dir` (relative to the base directory).
    /// An unreadable directory is an empty listing.
    pub fn list_titles(&self, dir: &Path) -> HomePage {
        let full_path = self.base_dir.join(dir);
        let entries = match fs::read_dir(&full_path) {
            Ok(entries) => entries,
            Err(e) => {
                debug!("Listing {:?} failed, showing no pages: {}", full_path, e);
                return HomePage::default();
            }
        };

        let mut names: Vec<String> = entries
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry.file_name().to_string_lossy().into_owned()),
                Err(e) => {
                    warn!("Failed to read directory entry: {}", e);
                    None
                }
            })
            .filter(|name| name.contains(PAGE_EXTENSION))
            .collect();
        names.sort();

        let pages = names
            .into_iter()
            .map(|name| match name.strip_suffix(PAGE_EXTENSION) {
                Some(stem) => stem.to_string(),
                None => name,
            })
            .collect::<Vec<_>>();

        debug!("Listed {:?}, found {} pages", full_path, pages.len());
        HomePage { pages }
    }
}

/// Create or truncate `path`, owner read/write only when newly created
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    file.write_all(contents)?;
    file.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn title(s: &str) -> Title {
        Title::parse(s).unwrap()
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = PageStore::new(dir.path());
        let body = b"# Hello\n\nbytes \xff kept as-is".to_vec();

        store.save(&Page::with_body(title("Foo"), body.clone())).unwrap();
        let page = store.load(&title("Foo")).unwrap();

        assert_eq!(page.body, body);
        assert!(page.render.as_deref().unwrap().contains("<h1 id=\"hello\">Hello"));
        assert!(page.modified.is_some());
        assert!(dir.path().join("Foo.page").is_file());
    }

    #[test]
    fn test_save_is_idempotent_and_overwrites() {
        let dir = TempDir::new().unwrap();
        let store = PageStore::new(dir.path());
        let path = dir.path().join("Note.page");

        store.save(&Page::with_body(title("Note"), "a much longer first version")).unwrap();
        store.save(&Page::with_body(title("Note"), "short")).unwrap();
        let once = fs::read(&path).unwrap();
        store.save(&Page::with_body(title("Note"), "short")).unwrap();
        let twice = fs::read(&path).unwrap();

        assert_eq!(once, b"short");
        assert_eq!(once, twice);
    }

    #[cfg(unix)]
    #[test]
    fn test_saved_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let store = PageStore::new(dir.path());
        store.save(&Page::with_body(title("Secret"), "x")).unwrap();

        let mode = fs::metadata(dir.path().join("Secret.page")).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_load_missing_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = PageStore::new(dir.path());
        assert!(matches!(store.load(&title("Nope")), Err(WikiError::NotFound)));
    }

    #[test]
    fn test_save_into_missing_directory_is_io_error() {
        let dir = TempDir::new().unwrap();
        let store = PageStore::new(dir.path().join("does-not-exist"));
        let err = store.save(&Page::with_body(title("Foo"), "x")).unwrap_err();
        assert!(matches!(err, WikiError::Io(_)));
    }

    #[test]
    fn test_list_titles() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Zeta.page"), "z").unwrap();
        fs::write(dir.path().join("Alpha.page"), "a").unwrap();
        fs::write(dir.path().join("logo.png"), "png").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();

        let store = PageStore::new(dir.path());
        let home = store.list_titles(Path::new(""));
        assert_eq!(home.pages, vec!["Alpha".to_string(), "Zeta".to_string()]);
    }

    #[test]
    fn test_list_titles_missing_dir_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = PageStore::new(dir.path());
        assert!(store.list_titles(Path::new("nowhere")).pages.is_empty());
    }
}
