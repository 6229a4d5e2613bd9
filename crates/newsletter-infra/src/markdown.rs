//! Markdown rendering with Comrak, sanitised by Ammonia.

use comrak::{Options, markdown_to_html};

use newsletter_core::ports::MarkdownRenderer;

/// GitHub-flavoured markdown to safe HTML.
pub struct ComrakMarkdownRenderer {
    options: Options<'static>,
    sanitizer: ammonia::Builder<'static>,
}

impl ComrakMarkdownRenderer {
    pub fn new() -> Self {
        let mut options = Options::default();
        options.extension.strikethrough = true;
        options.extension.table = true;
        options.extension.autolink = true;
        options.extension.tasklist = true;

        Self {
            options,
            sanitizer: ammonia::Builder::default(),
        }
    }
}

impl Default for ComrakMarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownRenderer for ComrakMarkdownRenderer {
    fn render(&self, markdown: &str) -> String {
        if markdown.trim().is_empty() {
            return String::new();
        }
        let html = markdown_to_html(markdown, &self.options);
        self.sanitizer.clean(&html).to_string()
    }
}
