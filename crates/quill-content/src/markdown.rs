//! Markdown to HTML conversion.

use pulldown_cmark::{html, Options, Parser};

/// Convert a markdown body to HTML.
pub fn to_html(text: &str) -> String {
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS;

    let parser = Parser::new_ext(text, options);

    let mut output = String::new();
    html::push_html(&mut output, parser);

    output
}
