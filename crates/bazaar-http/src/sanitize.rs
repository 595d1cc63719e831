//! Neutralization of unsafe content in JSON request bodies.
//!
//! Only string values are rewritten; keys, numbers, nesting and array
//! lengths are left as they are. Sanitation cannot fail.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

/// Elements removed together with their content.
static BLOCKS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    ["script", "style", "iframe", "object", "embed"]
        .iter()
        .map(|tag| {
            Regex::new(&format!(r"(?is)<\s*{tag}\b[^>]*>.*?<\s*/\s*{tag}\s*>"))
                .expect("static block pattern")
        })
        .collect()
});

/// Any remaining opening, closing or self-closing tag.
static TAGS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<\s*/?\s*[a-z][a-z0-9-]*(?:\s[^<>]*)?/?\s*>").expect("static tag pattern")
});

/// Script-bearing URL schemes.
static SCHEMES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:java|vb)script\s*:|data\s*:\s*text/html").expect("static scheme pattern")
});

/// Strip unsafe substrings from every string in `value`.
pub fn sanitize_value(value: Value) -> Value {
    match value {
        Value::String(s) => Value::String(sanitize_str(&s).into_owned()),
        Value::Array(items) => Value::Array(items.into_iter().map(sanitize_value).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (key, sanitize_value(value)))
                .collect(),
        ),
        other => other,
    }
}

/// Strip unsafe substrings from a single string.
pub fn sanitize_str(input: &str) -> Cow<'_, str> {
    if !needs_work(input) {
        return Cow::Borrowed(input);
    }

    let mut out = input.to_string();
    out.retain(|c| !c.is_control() || matches!(c, '\n' | '\r' | '\t'));

    // A removal can splice its neighbours into a new match, so repeat until
    // stable. Every pass only deletes, which bounds the loop.
    loop {
        let next = strip_once(&out);
        if next == out {
            return Cow::Owned(out);
        }
        out = next;
    }
}

fn strip_once(input: &str) -> String {
    let mut out = input.to_string();
    for block in BLOCKS.iter() {
        out = block.replace_all(&out, "").into_owned();
    }
    out = TAGS.replace_all(&out, "").into_owned();
    SCHEMES.replace_all(&out, "").into_owned()
}

fn needs_work(input: &str) -> bool {
    input.contains('<')
        || input.contains(':')
        || input
            .chars()
            .any(|c| c.is_control() && !matches!(c, '\n' | '\r' | '\t'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plain_text_is_untouched() {
        let input = "Senior Rust developer, 5+ years & remote";
        assert!(matches!(sanitize_str(input), Cow::Borrowed(_)));
        assert_eq!(sanitize_str("price: 10 < 20"), "price: 10 < 20");
    }

    #[test]
    fn script_blocks_removed_with_content() {
        assert_eq!(
            sanitize_str("hi<script type=\"text/javascript\">alert(1)</script> there"),
            "hi there"
        );
        assert_eq!(sanitize_str("<SCRIPT>\nbad()\n</Script>ok"), "ok");
    }

    #[test]
    fn tags_and_handlers_removed() {
        assert_eq!(
            sanitize_str(r#"<img src=x onerror="steal()">caption"#),
            "caption"
        );
        assert_eq!(sanitize_str("<b>bold</b>"), "bold");
    }

    #[test]
    fn script_urls_neutralized() {
        assert_eq!(sanitize_str("javascript:alert(1)"), "alert(1)");
        assert_eq!(sanitize_str("JavaScript :void(0)"), "void(0)");
        assert_eq!(sanitize_str("https://example.com"), "https://example.com");
    }

    #[test]
    fn nested_tags_cannot_reassemble() {
        let out = sanitize_str("<scr<b>ipt>alert(1)</script>");
        assert!(!out.to_lowercase().contains("<script"));
        assert_eq!(out, "alert(1)");

        assert_eq!(sanitize_str("<<b>img src=x onerror=steal()>"), "");
    }

    #[test]
    fn nested_schemes_cannot_reassemble() {
        assert_eq!(sanitize_str("javajavascript:script:alert(1)"), "alert(1)");
        assert_eq!(sanitize_str("vbsvbscript:cript:msgbox"), "msgbox");
        assert_eq!(sanitize_str("java\u{0}script:go()"), "go()");
    }

    #[test]
    fn control_characters_dropped() {
        assert_eq!(sanitize_str("a\u{0}b\u{7}c\nd"), "abc\nd");
    }

    #[test]
    fn structure_is_preserved() {
        let input = json!({
            "title": "<script>x()</script>Gardener",
            "tags": ["<i>outdoor</i>", "part-time"],
            "budget": 120.5,
            "remote": true,
            "contact": null,
            "nested": {"<b>key</b>": "javascript:go()"}
        });

        let output = sanitize_value(input);

        assert_eq!(
            output,
            json!({
                "title": "Gardener",
                "tags": ["outdoor", "part-time"],
                "budget": 120.5,
                "remote": true,
                "contact": null,
                "nested": {"<b>key</b>": "go()"}
            })
        );
    }
}
