use std::collections::HashSet;

/// Tags model output may keep
pub const DEFAULT_ALLOWED_TAGS: &[&str] = &[
    "p", "h1", "h2", "h3", "h4", "h5", "h6", "b", "strong", "i", "em", "br", "ul", "ol", "li",
];

/// Tags removed together with everything inside them
const STRIPPED_WITH_CONTENT: &[&str] = &["script", "style", "iframe", "object", "noscript"];

/// Allow-list HTML sanitizer for model output
///
/// Model replies are untrusted. Anything outside the allow-list is dropped:
/// unknown tags lose their markup but keep their text, script-like tags lose
/// their content too, and no attributes survive at all. Clean input passes
/// through unchanged, so sanitizing twice is the same as sanitizing once.
pub struct Sanitizer {
    builder: ammonia::Builder<'static>,
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self::new(DEFAULT_ALLOWED_TAGS)
    }
}

impl Sanitizer {
    pub fn new(allowed_tags: &[&'static str]) -> Self {
        let strip: HashSet<&'static str> = STRIPPED_WITH_CONTENT.iter().copied().collect();
        // ammonia rejects a tag that is both kept and content-stripped
        let tags: HashSet<&'static str> = allowed_tags
            .iter()
            .copied()
            .filter(|tag| !strip.contains(tag))
            .collect();

        let mut builder = ammonia::Builder::empty();
        builder.tags(tags).clean_content_tags(strip).strip_comments(true);

        Self { builder }
    }

    pub fn clean(&self, html: &str) -> String {
        self.builder.clean(html).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_is_removed_with_content() {
        let sanitizer = Sanitizer::default();
        assert_eq!(
            sanitizer.clean("<script>alert(1)</script><p>ok</p>"),
            "<p>ok</p>"
        );
    }

    #[test]
    fn test_event_handlers_are_stripped() {
        let sanitizer = Sanitizer::default();
        assert_eq!(
            sanitizer.clean(r#"<p onclick="steal()">Directed by <b onmouseover="x()">Nolan</b></p>"#),
            "<p>Directed by <b>Nolan</b></p>"
        );
    }

    #[test]
    fn test_unknown_tags_keep_text() {
        let sanitizer = Sanitizer::default();
        assert_eq!(
            sanitizer.clean(r#"<div><a href="javascript:alert(1)">Genres</a>: Drama</div>"#),
            "Genres: Drama"
        );
    }

    #[test]
    fn test_allowed_markup_is_untouched() {
        let sanitizer = Sanitizer::default();
        let html = "<h3><b>Summary</b></h3><p><b>Rating:</b> ★ 8.4/10</p>";
        assert_eq!(sanitizer.clean(html), html);
    }

    #[test]
    fn test_sanitizing_is_idempotent() {
        let sanitizer = Sanitizer::default();
        let inputs = [
            "<p>Tom &amp; Jerry</p>",
            "<p>Fish & Chips <i>2 < 3</i></p>",
            "<img src=x onerror=alert(1)><em>fine</em>",
            "<style>p{}</style><h2>Cast</h2><!-- note -->",
            "plain text with \"quotes\"",
        ];

        for input in inputs {
            let once = sanitizer.clean(input);
            assert_eq!(sanitizer.clean(&once), once, "input: {}", input);
        }
    }

    #[test]
    fn test_custom_allow_list() {
        let sanitizer = Sanitizer::new(&["p", "script"]);
        assert_eq!(
            sanitizer.clean("<p><b>bold</b></p><script>x</script>"),
            "<p>bold</p>"
        );
    }
}
