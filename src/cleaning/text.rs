//! Single-string normalization.
//!
//! One pass runs five steps in order:
//! 1. decode HTML entities (named HTML5 entities and numeric references)
//! 2. replace anything shaped like `<...>` with a space
//! 3. Unicode NFKC normalization
//! 4. drop control and invisible/format characters
//! 5. collapse whitespace runs to one space and trim
//!
//! Entities are decoded until none remain before the other steps run, so
//! nesting depth such as `&amp;amp;lt;` costs nothing extra. Decoding and
//! NFKC can still expose new markup (fullwidth `＜b＞`, or `&` produced by
//! NFKC), so [`normalize_text`] repeats the pass until the output stops
//! changing. The result is a fixed point, which is what makes record
//! cleaning idempotent.

use once_cell::sync::Lazy;
use quick_xml::escape::{resolve_html5_entity, unescape_with};
use regex::{Captures, Regex};
use unicode_normalization::UnicodeNormalization;

static ENTITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(?:#[0-9]{1,7}|#[xX][0-9A-Fa-f]{1,6}|[A-Za-z][A-Za-z0-9]{1,31});")
        .expect("entity pattern is valid")
});

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("tag pattern is valid"));

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Clean one string. Pure; empty input yields an empty string.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(normalize_text("T &amp; Co <b>Inc</b>"), "T & Co Inc");
/// assert_eq!(normalize_text("  a\n\n\tb  "), "a b");
/// ```
pub fn normalize_text(text: &str) -> String {
    // Every step except NFKC only shortens the text and NFKC output is
    // stable under NFKC, so this settles after a few passes.
    let mut current = normalize_once(text);
    loop {
        let next = normalize_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn normalize_once(text: &str) -> String {
    let decoded = decode_all_entities(text);
    let untagged = strip_tags(&decoded);
    let composed: String = untagged.nfkc().collect();
    let visible = remove_invisible(&composed);
    collapse_whitespace(&visible)
}

/// Decode entities repeatedly until the text stops changing. Each round
/// that changes anything shortens the text.
fn decode_all_entities(text: &str) -> String {
    let mut current = decode_entities(text);
    loop {
        let next = decode_entities(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Decode each entity independently, one level deep. Unknown names stay as written, so a
/// bad entity never prevents the rest of the string from decoding.
pub fn decode_entities(text: &str) -> String {
    ENTITY_RE
        .replace_all(text, |caps: &Captures<'_>| {
            let entity = &caps[0];
            match unescape_with(entity, |name: &str| resolve_html5_entity(name)) {
                Ok(decoded) => decoded.into_owned(),
                Err(_) => entity.to_string(),
            }
        })
        .into_owned()
}

/// Best-effort tag removal; not an HTML parser.
pub fn strip_tags(text: &str) -> String {
    TAG_RE.replace_all(text, " ").into_owned()
}

fn remove_invisible(text: &str) -> String {
    text.chars()
        .filter(|&c| !(c.is_control() && !c.is_whitespace()) && !is_format_char(c))
        .collect()
}

/// Zero-width and other format characters that render as nothing.
fn is_format_char(c: char) -> bool {
    matches!(
        c,
        '\u{00AD}'
            | '\u{061C}'
            | '\u{180E}'
            | '\u{200B}'..='\u{200F}'
            | '\u{202A}'..='\u{202E}'
            | '\u{2060}'..='\u{2064}'
            | '\u{2066}'..='\u{206F}'
            | '\u{FEFF}'
            | '\u{FFF9}'..='\u{FFFB}'
    )
}

fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RE.replace_all(text, " ").trim().to_string()
}
