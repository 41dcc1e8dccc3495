// src/ingest/mod.rs
pub mod providers;
pub mod types;

use once_cell::sync::OnceCell;
use regex::Regex;

const ALLOWED_URL_SCHEMES: &[&str] = &[
    "http", "https", "ftp", "ftps", "mailto", "news", "irc", "gopher", "nntp", "feed", "telnet",
];

/// Sanitize untrusted text into a single plain-text line:
/// escape lone `<`, strip tags (and script/style bodies), drop percent-encoded
/// octets, collapse whitespace, trim.
pub fn sanitize_text_field(s: &str) -> String {
    // 1) A `<` that never closes is text, not markup
    let mut out = if s.contains('<') {
        escape_lone_lt(s)
    } else {
        s.to_string()
    };

    // 2) Strip script/style bodies, then all remaining tags
    static RE_SCRIPT: OnceCell<Regex> = OnceCell::new();
    let re_script = RE_SCRIPT.get_or_init(|| {
        Regex::new(r"(?is)<script[^>]*>.*?</script\s*>|<style[^>]*>.*?</style\s*>").unwrap()
    });
    out = re_script.replace_all(&out, "").to_string();

    static RE_TAGS: OnceCell<Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| Regex::new(r"(?s)<[^>]*>").unwrap());
    out = re_tags.replace_all(&out, "").to_string();

    // 3) Percent-encoded octets, repeated until none are left
    static RE_OCTETS: OnceCell<Regex> = OnceCell::new();
    let re_octets = RE_OCTETS.get_or_init(|| Regex::new(r"%[a-fA-F0-9]{2}").unwrap());
    while re_octets.is_match(&out) {
        out = re_octets.replace_all(&out, "").to_string();
    }

    // 4) Collapse whitespace
    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"[\r\n\t ]+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();

    out.trim().to_string()
}

fn escape_lone_lt(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(i) = rest.find('<') {
        out.push_str(&rest[..i]);
        let tail = &rest[i + 1..];
        let closes = match (tail.find('>'), tail.find('<')) {
            (Some(gt), Some(lt)) => gt < lt,
            (Some(_), None) => true,
            _ => false,
        };
        if closes {
            out.push('<');
        } else {
            out.push_str(&html_escape::encode_text("<"));
        }
        rest = tail;
    }
    out.push_str(rest);
    out
}

/// Sanitize an untrusted URL for storage. Returns an empty string for
/// anything that is not an absolute URL with an allowed scheme.
pub fn sanitize_url(s: &str) -> String {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let cleaned: String = trimmed
        .replace(' ', "%20")
        .chars()
        .filter(|c| {
            !c.is_ascii() || c.is_ascii_alphanumeric() || "-~+_.?#=!&;,/:%@$|*'()[]".contains(*c)
        })
        .collect();
    if cleaned.is_empty() {
        return String::new();
    }

    static RE_SCHEME: OnceCell<Regex> = OnceCell::new();
    let re_scheme = RE_SCHEME.get_or_init(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.\-]*:").unwrap());
    let candidate = if re_scheme.is_match(&cleaned) {
        cleaned
    } else if cleaned.starts_with(['/', '#', '?']) {
        // relative references have no place as a source URL
        return String::new();
    } else {
        format!("http://{cleaned}")
    };

    match url::Url::parse(&candidate) {
        Ok(u) if ALLOWED_URL_SCHEMES.contains(&u.scheme()) => u.to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_field_strips_tags_and_collapses_ws() {
        let s = "  <b>Hello</b>\n\t world  ";
        assert_eq!(sanitize_text_field(s), "Hello world");
    }

    #[test]
    fn text_field_keeps_non_breaking_spaces() {
        assert_eq!(
            sanitize_text_field("Chip\u{00A0}\u{00A0}news \r\n today"),
            "Chip\u{00A0}\u{00A0}news today"
        );
    }

    #[test]
    fn text_field_drops_script_bodies() {
        let s = "Before<script>alert('x')</script> after";
        assert_eq!(sanitize_text_field(s), "Before after");
    }

    #[test]
    fn text_field_escapes_lone_lt() {
        assert_eq!(sanitize_text_field("1 < 2"), "1 &lt; 2");
        assert_eq!(sanitize_text_field("a < b <i>c</i>"), "a &lt; b c");
    }

    #[test]
    fn text_field_removes_percent_octets() {
        assert_eq!(sanitize_text_field("100%25 sure"), "100 sure");
        assert_eq!(sanitize_text_field("a %%2541b"), "a b");
    }

    #[test]
    fn text_field_only_markup_is_empty() {
        assert_eq!(sanitize_text_field("<p> </p>"), "");
    }

    #[test]
    fn url_accepts_http_and_normalizes() {
        assert_eq!(
            sanitize_url(" https://example.com/a?b=1 "),
            "https://example.com/a?b=1"
        );
        assert_eq!(sanitize_url("example.com/news"), "http://example.com/news");
    }

    #[test]
    fn url_is_idempotent() {
        let once = sanitize_url("https://Example.com/path with space");
        assert_eq!(sanitize_url(&once), once);
    }

    #[test]
    fn url_rejects_bad_schemes_and_relatives() {
        assert_eq!(sanitize_url("javascript:alert(1)"), "");
        assert_eq!(sanitize_url("/relative/path"), "");
        assert_eq!(sanitize_url("   "), "");
    }
}
