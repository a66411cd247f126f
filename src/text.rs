//! Text normalization shared by the news adapters.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)</?[^>]+>").expect("tag regex"));
static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex"));
static RE_SCRIPTS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<script[^>]*>.*?</script>|<style[^>]*>.*?</style>").expect("script regex")
});

const MAX_CHARS: usize = 1500;

/// Decode HTML entities, strip tags, normalize typographic quotes and
/// collapse whitespace. Sentence punctuation is kept: `!` carries
/// emphasis for the sentiment scorer.
pub fn normalize_text(s: &str) -> String {
    let decoded = html_escape::decode_html_entities(s).to_string();
    let stripped = RE_TAGS.replace_all(&decoded, "");

    let quoted = stripped
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    let mut out = RE_WS.replace_all(&quoted, " ").trim().to_string();

    if out.chars().count() > MAX_CHARS {
        out = out.chars().take(MAX_CHARS).collect();
    }
    out
}

/// Whole-page visible text: scripts and styles dropped, tags replaced by
/// spaces, entities decoded. No length cap.
pub fn visible_text(html: &str) -> String {
    let body = RE_SCRIPTS.replace_all(html, " ");
    let body = RE_TAGS.replace_all(&body, " ");
    let decoded = html_escape::decode_html_entities(&body).to_string();
    RE_WS.replace_all(&decoded, " ").trim().to_string()
}

/// Normalize and map empty results to `None`.
pub fn non_empty(s: &str) -> Option<String> {
    let t = normalize_text(s);
    if t.is_empty() {
        None
    } else {
        Some(t)
    }
}

/// Key used for de-duplication and store lookups: trimmed, lower-case,
/// single-spaced.
pub fn fold_key(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
