use std::fs;
use std::io;
use std::path::Path;

use log::{debug, info};

use crate::config::{EDIT_TEMPLATE, HOME_TEMPLATE, VIEW_TEMPLATE};
use crate::errors::WikiError;
use crate::types::{HomePage, Page};
use crate::utils::{escape_html, last_modified_html};

const BUILTIN_VIEW: &str = include_str!("../../templates/view.html");
const BUILTIN_EDIT: &str = include_str!("../../templates/edit.html");
const BUILTIN_HOME: &str = include_str!("../../templates/home.html");

/// The parsed template set, loaded once before serving
#[derive(Debug, Clone)]
pub struct Templates {
    view: String,
    edit: String,
    home: String,
}

impl Templates {
    /// Load `view.html`, `edit.html` and `home.html` from `dir`.
    /// Files that do not exist fall back to the built-in versions.
    pub fn load(dir: &Path) -> Result<Self, WikiError> {
        Ok(Self {
            view: load_one(dir, VIEW_TEMPLATE, BUILTIN_VIEW, &["TITLE", "RENDER"])?,
            edit: load_one(dir, EDIT_TEMPLATE, BUILTIN_EDIT, &["TITLE", "BODY"])?,
            home: load_one(dir, HOME_TEMPLATE, BUILTIN_HOME, &["PAGES"])?,
        })
    }

    /// The compiled-in template set
    pub fn builtin() -> Self {
        Self {
            view: BUILTIN_VIEW.to_string(),
            edit: BUILTIN_EDIT.to_string(),
            home: BUILTIN_HOME.to_string(),
        }
    }

    /// Fill the view template with the page's rendered HTML
    pub fn render_view(&self, page: &Page) -> Result<String, WikiError> {
        let render = page.render.as_deref().ok_or_else(|| {
            WikiError::Template(format!("{}: page {} has no rendered body", VIEW_TEMPLATE, page.title))
        })?;
        let modified = last_modified_html(page.modified);
        Ok(fill(
            &self.view,
            &[
                ("TITLE", escape_html(page.title.as_str()).as_str()),
                ("RENDER", render),
                ("MODIFIED", modified.as_str()),
            ],
        ))
    }

    /// Fill the edit template with the raw markdown body
    pub fn render_edit(&self, page: &Page) -> Result<String, WikiError> {
        let body = escape_html(&page.body_text());
        Ok(fill(
            &self.edit,
            &[("TITLE", escape_html(page.title.as_str()).as_str()), ("BODY", body.as_str())],
        ))
    }

    /// Fill the home template with one link per title
    pub fn render_home(&self, home: &HomePage) -> Result<String, WikiError> {
        let mut items = String::new();
        for title in &home.pages {
            let title = escape_html(title);
            items.push_str(&format!("        <li><a href=\"/view/{title}\">{title}</a></li>\n"));
        }
        Ok(fill(&self.home, &[("PAGES", items.as_str())]))
    }
}

fn load_one(dir: &Path, name: &str, builtin: &str, required: &[&str]) -> Result<String, WikiError> {
    let path = dir.join(name);
    let source = match fs::read_to_string(&path) {
        Ok(source) => {
            info!("Loaded template {:?}", path);
            source
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("No {:?}, using built-in {}", path, name);
            builtin.to_string()
        }
        Err(e) => return Err(WikiError::Template(format!("{}: {}", path.display(), e))),
    };

    for key in required {
        if !source.contains(&placeholder(key)) {
            return Err(WikiError::Template(format!(
                "{}: missing {} placeholder",
                path.display(),
                placeholder(key)
            )));
        }
    }
    Ok(source)
}

fn placeholder(key: &str) -> String {
    format!("{{{{{}}}}}", key)
}

/// Substitute `{{KEY}}` placeholders in one pass, so substituted values are
/// never scanned again. Unknown placeholders are left as they are.
fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            out.push_str(&rest[start..]);
            return out;
        };
        let key = &after[..end];
        match values.iter().find(|(k, _)| *k == key) {
            Some((_, value)) => out.push_str(value),
            None => out.push_str(&rest[start..start + 2 + end + 2]),
        }
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::title::Title;
    use tempfile::TempDir;

    fn title(s: &str) -> Title {
        Title::parse(s).unwrap()
    }

    #[test]
    fn test_fill_single_pass() {
        let out = fill("<h1>{{TITLE}}</h1>{{BODY}}{{OTHER}}", &[("TITLE", "T"), ("BODY", "{{TITLE}}")]);
        assert_eq!(out, "<h1>T</h1>{{TITLE}}{{OTHER}}");
        assert_eq!(fill("dangling {{TITLE", &[("TITLE", "T")]), "dangling {{TITLE");
    }

    #[test]
    fn test_missing_files_use_builtin() {
        let dir = TempDir::new().unwrap();
        let templates = Templates::load(dir.path()).unwrap();
        assert_eq!(templates.view, BUILTIN_VIEW);
        assert_eq!(templates.home, BUILTIN_HOME);
    }

    #[test]
    fn test_custom_template_is_used() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("home.html"), "<ol>{{PAGES}}</ol>").unwrap();
        let templates = Templates::load(dir.path()).unwrap();
        let html = templates.render_home(&HomePage { pages: vec!["Foo".into()] }).unwrap();
        assert_eq!(html, "<ol>        <li><a href=\"/view/Foo\">Foo</a></li>\n</ol>");
    }

    #[test]
    fn test_malformed_template_is_rejected() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("edit.html"), "<form>{{TITLE}}</form>").unwrap();
        let err = Templates::load(dir.path()).unwrap_err();
        assert!(matches!(err, WikiError::Template(ref msg) if msg.contains("{{BODY}}")));
    }

    #[test]
    fn test_render_edit_escapes_body() {
        let templates = Templates::builtin();
        let page = Page::with_body(title("Foo"), "</textarea><script>");
        let html = templates.render_edit(&page).unwrap();
        assert!(html.contains("action=\"/save/Foo\""));
        assert!(html.contains("&lt;/textarea&gt;&lt;script&gt;"));
    }

    #[test]
    fn test_render_edit_blank_page() {
        let html = Templates::builtin().render_edit(&Page::blank(title("New"))).unwrap();
        assert!(html.contains("<h1>Editing New</h1>"));
        assert!(html.contains("cols=\"80\"></textarea>"));
    }

    #[test]
    fn test_render_view_requires_render() {
        let templates = Templates::builtin();
        let mut page = Page::with_body(title("Foo"), "# Hi");
        assert!(matches!(templates.render_view(&page), Err(WikiError::Template(_))));

        page.render = Some("<h1 id=\"hi\">Hi</h1>".into());
        let html = templates.render_view(&page).unwrap();
        assert!(html.contains("<h1 id=\"hi\">Hi</h1>"));
        assert!(html.contains("href=\"/edit/Foo\""));
    }

    #[test]
    fn test_render_home_empty() {
        let html = Templates::builtin().render_home(&HomePage::default()).unwrap();
        assert!(html.contains("<ul class=\"listing\">"));
        assert!(!html.contains("<li>"));
    }
}
