//! Page templates
//!
//! Templates are embedded at build time. `{{name}}` is replaced with the
//! HTML-escaped parameter of that name and `{{> partial}}` with the rendered
//! partial template.

use thiserror::Error;

use crate::config::AppConfig;

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Template not found: {0}")]
    NotFound(String),

    #[error("Includes nested too deeply in template: {0}")]
    IncludeDepth(String),
}

pub type Result<T> = std::result::Result<T, TemplateError>;

const TEMPLATES: &[(&str, &str)] = &[
    ("index", include_str!("../../templates/index.html")),
    ("stylesheet", include_str!("../../templates/stylesheet.html")),
    ("javascript", include_str!("../../templates/javascript.html")),
];

const MAX_INCLUDE_DEPTH: usize = 8;

/// Path the client fetches its cards from
pub const CARDS_ENDPOINT: &str = "/api/cards";

fn get_template(name: &str) -> Option<&'static str> {
    TEMPLATES
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, source)| *source)
}

/// Render a named template with the given parameters
pub fn include(filename: &str, params: &[(&str, &str)]) -> Result<String> {
    render_named(filename, params, 0)
}

fn render_named(name: &str, params: &[(&str, &str)], depth: usize) -> Result<String> {
    if depth > MAX_INCLUDE_DEPTH {
        return Err(TemplateError::IncludeDepth(name.to_string()));
    }
    let source = get_template(name).ok_or_else(|| TemplateError::NotFound(name.to_string()))?;
    render_source(source, params, depth)
}

fn render_source(source: &str, params: &[(&str, &str)], depth: usize) -> Result<String> {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];

        let Some(end) = after.find("}}") else {
            // Unterminated tag, keep it verbatim
            out.push_str(&rest[start..]);
            return Ok(out);
        };

        let tag = after[..end].trim();
        if let Some(partial) = tag.strip_prefix('>') {
            out.push_str(&render_named(partial.trim(), params, depth + 1)?);
        } else if let Some((_, value)) = params.iter().find(|(key, _)| *key == tag) {
            out.push_str(&html_escape::encode_safe(value));
        } else {
            log::debug!("No value for template placeholder '{}'", tag);
        }

        rest = &after[end + 2..];
    }

    out.push_str(rest);
    Ok(out)
}

/// A rendered page plus the head elements set on it
#[derive(Debug, Clone)]
pub struct HtmlOutput {
    title: String,
    meta_tags: Vec<(String, String)>,
    content: String,
}

impl HtmlOutput {
    pub fn new(content: String) -> Self {
        Self {
            title: String::new(),
            meta_tags: Vec::new(),
            content,
        }
    }

    pub fn set_title(&mut self, title: &str) -> &mut Self {
        self.title = title.to_string();
        self
    }

    pub fn add_meta_tag(&mut self, name: &str, content: &str) -> &mut Self {
        self.meta_tags.push((name.to_string(), content.to_string()));
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Full HTML document
    pub fn to_document(&self) -> String {
        let mut head = String::from("  <meta charset=\"utf-8\">\n");
        for (name, content) in &self.meta_tags {
            head.push_str(&format!(
                "  <meta name=\"{}\" content=\"{}\">\n",
                html_escape::encode_double_quoted_attribute(name),
                html_escape::encode_double_quoted_attribute(content)
            ));
        }
        head.push_str(&format!(
            "  <title>{}</title>\n",
            html_escape::encode_text(&self.title)
        ));

        format!(
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n{}</head>\n<body>\n{}</body>\n</html>\n",
            head, self.content
        )
    }
}

/// Render the app page. Request parameters play no part in the output.
pub fn render_index(config: &AppConfig) -> Result<HtmlOutput> {
    let content = include(
        "index",
        &[
            ("page_title", config.page_title.as_str()),
            ("spreadsheet_name", config.spreadsheet_name.as_str()),
            ("cards_endpoint", CARDS_ENDPOINT),
        ],
    )?;

    let mut page = HtmlOutput::new(content);
    page.set_title(&config.page_title)
        .add_meta_tag("viewport", "width=device-width");
    Ok(page)
}
