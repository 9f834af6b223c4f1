use ammonia::Builder;

/// Allow-list HTML cleaner for page content leaving the server.
///
/// Admin-authored HTML is stored as written; it is cleaned on the public
/// read path and in generated static pages.
pub struct HtmlSanitizer {
    builder: Builder<'static>,
}

impl HtmlSanitizer {
    pub fn new() -> Self {
        let mut builder = Builder::default();
        builder
            .add_tags(&["iframe", "video", "source", "figure", "figcaption"])
            .add_tag_attributes(
                "iframe",
                &["src", "width", "height", "allow", "allowfullscreen", "frameborder"],
            )
            .add_tag_attributes("video", &["src", "controls", "width", "height", "poster"])
            .add_tag_attributes("source", &["src", "type"])
            .add_tag_attributes("img", &["width", "height", "loading"])
            .add_generic_attributes(&["class", "style"]);

        Self { builder }
    }

    pub fn clean(&self, html: &str) -> String {
        self.builder.clean(html).to_string()
    }
}

impl Default for HtmlSanitizer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for HtmlSanitizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HtmlSanitizer").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_scripts_and_handlers() {
        let sanitizer = HtmlSanitizer::new();

        let html = sanitizer.clean(r#"<p onclick="steal()">Hi<script>alert(1)</script></p>"#);

        assert_eq!(html, "<p>Hi</p>");
    }

    #[test]
    fn test_keeps_media_and_styling() {
        let sanitizer = HtmlSanitizer::new();

        let html = sanitizer.clean(
            r#"<figure class="wide"><img src="/uploads/a.png" alt="A"></figure><iframe src="https://video.example.com/embed/1" allowfullscreen></iframe>"#,
        );

        assert!(html.contains(r#"<figure class="wide">"#));
        assert!(html.contains(r#"src="/uploads/a.png""#));
        assert!(html.contains("<iframe"));
        assert!(html.contains("allowfullscreen"));
    }

    #[test]
    fn test_rejects_javascript_urls() {
        let sanitizer = HtmlSanitizer::new();

        let html = sanitizer.clean(r#"<a href="javascript:alert(1)">x</a>"#);

        assert!(!html.contains("javascript:"));
    }
}
