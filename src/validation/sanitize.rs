/*!
 * Verse text sanitization.
 *
 * Strips sequences resembling executable markup (script and iframe
 * elements, inline event handlers, javascript: URIs) and entity-encodes
 * the reserved markup characters. Sanitization never rejects a verse;
 * the text survives in sanitized form and the stripping is reported to
 * the caller so it can be logged.
 */

use once_cell::sync::Lazy;
use regex::Regex;

static SCRIPT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<script[^>]*>.*?</script>").unwrap());

static IFRAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<iframe[^>]*>.*?</iframe>").unwrap());

static EVENT_HANDLER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)\son\w+\s*=\s*("[^"]*"|'[^']*')"#).unwrap());

static JAVASCRIPT_URI_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)javascript:").unwrap());

/// Outcome of sanitizing one verse text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sanitized {
    /// The sanitized replacement text
    pub text: String,

    /// Whether an executable-looking sequence was stripped
    pub stripped: bool,
}

/// Sanitizer for verse text.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextSanitizer;

impl TextSanitizer {
    pub fn new() -> Self {
        TextSanitizer
    }

    /// Sanitize one verse text: strip executable-looking sequences, then
    /// entity-encode reserved markup characters.
    pub fn sanitize(&self, text: &str) -> Sanitized {
        let mut current = SCRIPT_PATTERN.replace_all(text, "").into_owned();
        current = IFRAME_PATTERN.replace_all(&current, "").into_owned();
        current = EVENT_HANDLER_PATTERN.replace_all(&current, "").into_owned();
        current = JAVASCRIPT_URI_PATTERN.replace_all(&current, "").into_owned();

        let stripped = current != text;

        let mut escaped = String::with_capacity(current.len());
        for ch in current.chars() {
            match ch {
                '<' => escaped.push_str("&lt;"),
                '>' => escaped.push_str("&gt;"),
                '&' => escaped.push_str("&amp;"),
                '"' => escaped.push_str("&quot;"),
                '\'' => escaped.push_str("&#x27;"),
                _ => escaped.push(ch),
            }
        }

        Sanitized {
            text: escaped,
            stripped,
        }
    }
}
