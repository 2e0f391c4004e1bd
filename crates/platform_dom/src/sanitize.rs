//! Allowlist-based markup sanitizer.
//!
//! External factories occasionally hand back markup strings instead of element
//! nodes. Before any such string reaches the live tree it is filtered here:
//! `Strict` keeps text content only, `Basic` additionally keeps a small set of
//! inline formatting tags with every attribute stripped. `script`/`style`
//! elements are dropped together with their content at both levels.

use serde::{Deserialize, Serialize};

/// Sanitization strictness applied to coerced markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SanitizeLevel {
    /// Text content only; every tag is removed.
    #[default]
    Strict,
    /// Inline formatting allowlist with all attributes stripped.
    Basic,
}

const BASIC_ALLOWED_TAGS: [&str; 10] = [
    "b", "br", "code", "em", "i", "li", "ol", "p", "span", "strong",
];

const DROP_CONTENT_TAGS: [&str; 2] = ["script", "style"];

/// Filters `markup` down to content that is safe to assign into a live tree.
pub fn sanitize(markup: &str, level: SanitizeLevel) -> String {
    let mut out = String::with_capacity(markup.len());
    let mut rest = markup;
    let mut dropping_until: Option<String> = None;

    while let Some(open) = rest.find('<') {
        let (text, tail) = rest.split_at(open);
        if dropping_until.is_none() {
            out.push_str(text);
        }

        let Some(close) = tail.find('>') else {
            // Unterminated tag: nothing after this point is trustworthy.
            rest = "";
            break;
        };
        let tag_body = &tail[1..close];
        rest = &tail[close + 1..];

        if tag_body.starts_with("!--") {
            // Comment. Unless it already closed at this `>`, skip to the
            // real end marker.
            if !tag_body.ends_with("--") {
                if let Some(end) = rest.find("-->") {
                    rest = &rest[end + 3..];
                } else {
                    rest = "";
                    break;
                }
            }
            continue;
        }

        let closing = tag_body.starts_with('/');
        let name = tag_name(tag_body);

        if let Some(awaited) = dropping_until.as_deref() {
            if closing && name == awaited {
                dropping_until = None;
            }
            continue;
        }

        if DROP_CONTENT_TAGS.contains(&name.as_str()) {
            if !closing && !tag_body.ends_with('/') {
                dropping_until = Some(name);
            }
            continue;
        }

        if level == SanitizeLevel::Basic && BASIC_ALLOWED_TAGS.contains(&name.as_str()) {
            if closing {
                out.push_str(&format!("</{name}>"));
            } else if name == "br" {
                out.push_str("<br>");
            } else {
                out.push_str(&format!("<{name}>"));
            }
        }
    }

    if dropping_until.is_none() {
        out.push_str(rest);
    }
    out
}

/// Removes every tag from `markup`, keeping text content only.
pub fn strip_tags(markup: &str) -> String {
    sanitize(markup, SanitizeLevel::Strict)
}

fn tag_name(tag_body: &str) -> String {
    tag_body
        .trim_start_matches('/')
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_keeps_text_only() {
        assert_eq!(sanitize("<div>x</div>", SanitizeLevel::Strict), "x");
        assert_eq!(
            sanitize("<p>hello <b>world</b></p>", SanitizeLevel::Strict),
            "hello world"
        );
    }

    #[test]
    fn basic_keeps_allowlisted_tags_without_attributes() {
        assert_eq!(
            sanitize(
                "<p class=\"x\" onclick=\"evil()\">hi <b>there</b></p>",
                SanitizeLevel::Basic
            ),
            "<p>hi <b>there</b></p>"
        );
        assert_eq!(
            sanitize("<div><em>kept</em></div>", SanitizeLevel::Basic),
            "<em>kept</em>"
        );
    }

    #[test]
    fn script_content_is_dropped_entirely() {
        assert_eq!(
            sanitize("a<script>alert(1)</script>b", SanitizeLevel::Strict),
            "ab"
        );
        assert_eq!(
            sanitize("a<style>p{}</style>b", SanitizeLevel::Basic),
            "ab"
        );
    }

    #[test]
    fn comments_and_unterminated_tags_are_removed() {
        assert_eq!(sanitize("a<!-- secret -->b", SanitizeLevel::Strict), "ab");
        assert_eq!(sanitize("ok<div", SanitizeLevel::Strict), "ok");
    }

    #[test]
    fn self_closing_break_survives_basic() {
        assert_eq!(sanitize("a<br/>b", SanitizeLevel::Basic), "a<br>b");
    }
}
