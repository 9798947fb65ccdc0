use std::collections::HashMap;

use pulldown_cmark::{html, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use crate::utils::escape_html;

/// Service for converting page bodies to display HTML
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownService;

impl MarkdownService {
    /// Create a new markdown service
    pub fn new() -> Self {
        Self
    }

    fn options() -> Options {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_SMART_PUNCTUATION);
        options
    }

    /// Render markdown to HTML, giving every heading an id and a self-link
    pub fn render(&self, source: &str) -> String {
        let options = Self::options();
        let ids = self.heading_ids(source, options);

        let mut ids = ids.into_iter();
        let mut open: Vec<String> = Vec::new();
        let events = Parser::new_ext(source, options).map(|ev| match ev {
            Event::Start(Tag::Heading { level, .. }) => {
                let id = ids.next().unwrap_or_default();
                let start = format!("<h{} id=\"{}\">", heading_level_to_u32(level), escape_html(&id));
                open.push(id);
                Event::Html(start.into())
            }
            Event::End(TagEnd::Heading(level)) => {
                let id = open.pop().unwrap_or_default();
                Event::Html(
                    format!(
                        "<a class=\"hlink\" href=\"#{}\" aria-label=\"Link to this section\">#</a></h{}>\n",
                        escape_html(&id),
                        heading_level_to_u32(level)
                    )
                    .into(),
                )
            }
            other => other,
        });

        let mut out = String::with_capacity(source.len() * 3 / 2);
        html::push_html(&mut out, events);
        out
    }

    /// First pass: collect a unique slug per heading, in document order
    fn heading_ids(&self, source: &str, options: Options) -> Vec<String> {
        let mut ids = Vec::new();
        let mut counts: HashMap<String, usize> = HashMap::new();
        let mut in_heading: Option<u32> = None;
        let mut buf = String::new();

        for ev in Parser::new_ext(source, options) {
            match ev {
                Event::Start(Tag::Heading { level, .. }) => {
                    in_heading = Some(heading_level_to_u32(level));
                    buf.clear();
                }
                Event::End(TagEnd::Heading(_)) => {
                    if let Some(lvl) = in_heading.take() {
                        let mut id = slugify(&buf);
                        if id.is_empty() {
                            id = format!("h{}", lvl);
                        }
                        let count = counts.entry(id.clone()).or_insert(0);
                        if *count > 0 {
                            id = format!("{}-{}", id, *count);
                        }
                        *count += 1;
                        ids.push(id);
                    }
                }
                Event::Text(t) | Event::Code(t) if in_heading.is_some() => buf.push_str(&t),
                Event::SoftBreak | Event::HardBreak if in_heading.is_some() => buf.push(' '),
                _ => {}
            }
        }
        ids
    }
}

fn heading_level_to_u32(level: HeadingLevel) -> u32 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Create URL-friendly slug from text
fn slugify(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_dash = false;
    for ch in text.chars() {
        let c = ch.to_ascii_lowercase();
        if c.is_ascii_alphanumeric() {
            out.push(c);
            last_dash = false;
        } else if (c.is_ascii_whitespace() || c == '-' || c == '_') && !last_dash && !out.is_empty() {
            out.push('-');
            last_dash = true;
        }
    }
    if out.ends_with('-') {
        out.pop();
    }
    out
}
