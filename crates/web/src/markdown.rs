//! Markdown rendering for blog posts.

use comrak::{Options, markdown_to_html};

/// Render Markdown to HTML with GitHub Flavored Markdown extensions.
///
/// Raw HTML in the source is omitted from the output.
#[must_use]
pub fn render(content: &str) -> String {
    let mut options = Options::default();

    // Enable GFM extensions
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options.extension.header_ids = Some(String::new());
    options.extension.footnotes = true;

    markdown_to_html(content, &options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renders_gfm() {
        let html = render("# Title\n\n~~old~~ | a |\n");
        assert!(html.contains("<h1"));
        assert!(html.contains("<del>old</del>"));
    }

    #[test]
    fn test_tables() {
        let html = render("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(html.contains("<table>"));
        assert!(html.contains("<td>1</td>"));
    }

    #[test]
    fn test_raw_html_is_not_passed_through() {
        let html = render("hello <script>alert(1)</script>");
        assert!(!html.contains("<script>"));
    }
}
