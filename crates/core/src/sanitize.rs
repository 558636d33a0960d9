//! Markup escaping for free-text fields before they are persisted.
//!
//! Stored text is rendered verbatim by the public pages, so every
//! character that could open a tag or break out of an attribute is
//! replaced with its entity form. The dashboard edits stored (escaped)
//! text and sends it back, so escaping must be idempotent.

/// The characters that are escaped and the entity each becomes.
const ENTITIES: [(char, &str); 6] = [
    ('&', "&amp;"),
    ('<', "&lt;"),
    ('>', "&gt;"),
    ('"', "&quot;"),
    ('\'', "&#x27;"),
    ('/', "&#x2F;"),
];

/// Escape `& < > " ' /` in `input`. Entities this function emits are
/// decoded first, so already-escaped text comes back unchanged.
///
/// ```
/// use rioframe_core::sanitize::escape_text;
///
/// let once = escape_text("<b>Tom & Jerry</b>");
/// assert_eq!(once, "&lt;b&gt;Tom &amp; Jerry&lt;&#x2F;b&gt;");
/// assert_eq!(escape_text(&once), once);
/// ```
pub fn escape_text(input: &str) -> String {
    let decoded = unescape_text(input);
    let mut out = String::with_capacity(decoded.len());
    for ch in decoded.chars() {
        match ENTITIES.iter().find(|(c, _)| *c == ch) {
            Some((_, entity)) => out.push_str(entity),
            None => out.push(ch),
        }
    }
    out
}

/// Reverse [`escape_text`]: replace each of its six entities with the
/// character it stands for. Anything else is left alone.
pub fn unescape_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        match ENTITIES.iter().find(|(_, entity)| rest.starts_with(entity)) {
            Some((ch, entity)) => {
                out.push(*ch);
                rest = &rest[entity.len()..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Escape every entry of a list of short strings.
pub fn escape_all(items: &[String]) -> Vec<String> {
    items.iter().map(|s| escape_text(s)).collect()
}
