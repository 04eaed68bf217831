use pulldown_cmark::{html, Options, Parser};

fn markdown_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_TASKLISTS);
    options
}

/// Renders a post body. MDX component tags pass through as raw HTML.
pub fn render_markdown_to_html(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, markdown_options());
    let mut html_out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut html_out, parser);
    html_out
}

#[cfg(test)]
mod tests {
    use super::render_markdown_to_html;

    #[test]
    fn renders_headings_and_paragraphs() {
        let output = render_markdown_to_html("# Title\n\nSome *text*.");
        assert!(output.contains("<h1>Title</h1>"));
        assert!(output.contains("<em>text</em>"));
    }

    #[test]
    fn renders_tables_and_strikethrough() {
        let output = render_markdown_to_html("| a | b |\n|---|---|\n| 1 | 2 |\n\n~~old~~");
        assert!(output.contains("<table>"));
        assert!(output.contains("<del>old</del>"));
    }

    #[test]
    fn renders_sample_post() {
        let post = include_str!("../content/posts/hello-world.mdx");
        let output = render_markdown_to_html(post);
        assert!(output.contains("<h2>"));
    }
}
