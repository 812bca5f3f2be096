use std::collections::{HashMap, HashSet};

/// Render a question prompt to sanitized HTML.
///
/// Prompts authored in the web editor may already be HTML; everything else
/// is treated as Markdown.
#[must_use]
pub fn question_html(input: &str) -> String {
    if looks_like_html(input) {
        sanitize_html(input)
    } else {
        markdown_to_html(input)
    }
}

#[must_use]
pub fn markdown_to_html(input: &str) -> String {
    let mut options = pulldown_cmark::Options::empty();
    options.insert(pulldown_cmark::Options::ENABLE_STRIKETHROUGH);
    options.insert(pulldown_cmark::Options::ENABLE_TABLES);

    let parser = pulldown_cmark::Parser::new_ext(input, options);
    let mut html = String::new();
    pulldown_cmark::html::push_html(&mut html, parser);
    sanitize_html(&html)
}

#[must_use]
pub fn sanitize_html(html: &str) -> String {
    let tags: HashSet<&str> = [
        "p", "div", "span", "br", "em", "strong", "b", "i", "u", "code", "pre", "blockquote",
        "ul", "ol", "li", "sub", "sup", "table", "thead", "tbody", "tr", "th", "td", "del",
    ]
    .into_iter()
    .collect();

    // Links are dropped to keep the student inside the attempt window.
    ammonia::Builder::new()
        .tags(tags)
        .tag_attributes(HashMap::new())
        .clean(html)
        .to_string()
}

#[must_use]
pub fn looks_like_html(input: &str) -> bool {
    let trimmed = input.trim_start();
    if trimmed.is_empty() {
        return false;
    }

    let lower = trimmed.to_ascii_lowercase();
    let Some(start) = lower.find('<') else {
        return false;
    };
    if !lower[start + 1..].contains('>') {
        return false;
    }

    let tags = ["<p", "<div", "<span", "<br", "<strong", "<em", "<code", "<pre", "<ul", "<ol"];
    tags.iter().any(|tag| lower.contains(tag))
}
