/// Converts a post's markdown source to sanitized HTML.
///
/// Empty input yields empty output. Rendering never fails: malformed
/// markdown is still rendered as best it can be.
pub trait MarkdownRenderer: Send + Sync {
    fn render(&self, markdown: &str) -> String;
}
