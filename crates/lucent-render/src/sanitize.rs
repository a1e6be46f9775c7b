//! HTML sanitizing service.

/// Allow-list HTML sanitizer applied to raw HTML and images.
pub trait Sanitizer: Send + Sync {
    /// Strip disallowed markup. Must be idempotent.
    fn sanitize(&self, html: &str) -> String;
}

fn builder() -> ammonia::Builder<'static> {
    let mut builder = ammonia::Builder::default();
    builder
        .add_tags(&[
            "iframe", "embed", "video", "audio", "source", "details", "summary", "mark", "input",
        ])
        .add_generic_attributes(&["class", "style", "id"])
        .add_generic_attribute_prefixes(&["data-"])
        .add_tag_attributes("iframe", &["src", "width", "height", "frameborder", "allowfullscreen"])
        .add_tag_attributes("embed", &["src", "type", "width", "height"])
        .add_tag_attributes("video", &["src", "controls", "width", "height", "poster"])
        .add_tag_attributes("audio", &["src", "controls"])
        .add_tag_attributes("source", &["src", "type"])
        .add_tag_attributes("details", &["open"])
        .add_tag_attributes("input", &["type", "checked", "disabled"])
        .add_tag_attributes("img", &["loading"]);
    builder
}

/// [`Sanitizer`] backed by `ammonia`.
///
/// Extends ammonia's defaults with embedded media, disclosure widgets,
/// task checkboxes and `class`, `style`, `id` and `data-*` attributes.
#[derive(Clone, Copy, Debug, Default)]
pub struct AmmoniaSanitizer;

impl Sanitizer for AmmoniaSanitizer {
    fn sanitize(&self, html: &str) -> String {
        builder().clean(html).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_script() {
        let clean = AmmoniaSanitizer.sanitize(r#"<p onclick="x()">hi<script>alert(1)</script></p>"#);
        assert_eq!(clean, "<p>hi</p>");
    }

    #[test]
    fn test_keeps_allowed_markup() {
        let html = r#"<details><summary>More</summary><video src="a.mp4" controls=""></video></details>"#;
        let clean = AmmoniaSanitizer.sanitize(html);
        assert!(clean.contains("<summary>More</summary>"));
        assert!(clean.contains(r#"<video src="a.mp4""#));
    }

    #[test]
    fn test_keeps_data_attributes() {
        let clean = AmmoniaSanitizer.sanitize(r#"<img src="a.png" data-src="b.png" class="x">"#);
        assert!(clean.contains(r#"data-src="b.png""#));
        assert!(clean.contains(r#"class="x""#));
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            r#"<a href="javascript:alert(1)">x</a><b>y</b>"#,
            r#"<iframe src="https://x.io"></iframe><img src=x onerror=alert(1)>"#,
            "plain & <text>",
        ];
        for input in inputs {
            let once = AmmoniaSanitizer.sanitize(input);
            assert_eq!(AmmoniaSanitizer.sanitize(&once), once);
        }
    }
}
