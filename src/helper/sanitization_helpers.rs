use std::collections::HashSet;

/// Strips all HTML tags from a string, leaving only the plain text content.
/// Used for titles, display names, excerpts and captions.
pub fn strip_all_html(input: &str) -> String {
    ammonia::Builder::new()
        .tags(HashSet::new())
        .clean(input)
        .to_string()
}

/// Plain text with HTML stripped and entities left decoded, trimmed.
pub fn clean_text(input: &str) -> String {
    html_escape::decode_html_entities(&strip_all_html(input)).trim().to_string()
}

/// Makes user CSS safe to embed in a `<style>` element. CSS has no use for a
/// raw `<`, so every one is replaced with its escape, which also neutralises
/// `</style>`.
pub fn sanitize_custom_css(css: &str) -> String {
    css.replace('<', "\\3c ")
}

/// Font family names end up inside a quoted CSS value; only name characters survive.
pub fn sanitize_font_family(font: &str) -> String {
    font.chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect::<String>()
        .trim()
        .to_string()
}
