//! XML escaping rules and the response decoder
//!
//! Encoding reverses any prior entity encoding before escaping, so values
//! that arrive already entity-encoded are never double-escaped. Decoding is
//! the substring scanner the service's responses were designed around, not a
//! conforming XML parser; its quirks are defined behavior (see [`decode`]).

use std::collections::BTreeMap;

/// Decoded XML fragment: leaf text or a map of child elements
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    /// Verbatim text content of a tagless fragment
    Text(String),
    /// Child elements keyed by tag name
    Map(BTreeMap<String, Node>),
}

impl Node {
    /// Leaf text, if this node is a leaf
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Node::Text(s) => Some(s),
            Node::Map(_) => None,
        }
    }

    /// Child map, if this node has children
    pub fn as_map(&self) -> Option<&BTreeMap<String, Node>> {
        match self {
            Node::Text(_) => None,
            Node::Map(m) => Some(m),
        }
    }

    /// Child node by tag name
    pub fn get(&self, name: &str) -> Option<&Node> {
        self.as_map()?.get(name)
    }

    /// Trimmed leaf text of a child element
    pub fn get_text(&self, name: &str) -> Option<&str> {
        self.get(name)?.as_text().map(str::trim)
    }
}

// =============================================================================
// ENCODE
// =============================================================================

/// Reverse entity encoding: named XML entities plus numeric character
/// references (`&#NNN;` / `&#xHH;`). Unrecognized sequences pass through.
pub fn unescape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let Some(semi) = tail.find(';') else {
            out.push_str(tail);
            return out;
        };
        match decode_entity(&tail[1..semi]) {
            Some(ch) => {
                out.push(ch);
                rest = &tail[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[amp + 1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let digits = entity.strip_prefix('#')?;
            let code = if let Some(hex_digits) = digits
                .strip_prefix('x')
                .or_else(|| digits.strip_prefix('X'))
            {
                u32::from_str_radix(hex_digits, 16).ok()?
            } else {
                digits.parse::<u32>().ok()?
            };
            char::from_u32(code)
        }
    }
}

/// Escape a value for inclusion in XML text.
///
/// The value is unescaped first (it may arrive already entity-encoded) and
/// trimmed, then `& < > " '` are escaped. Two control characters the
/// server's XML parser cannot handle are substituted: vertical tab becomes a
/// space and SOH becomes the numeric reference `&#x1;`.
pub fn escape(value: &str) -> String {
    let raw = unescape(value);
    let raw = raw.trim();
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\u{0B}' => out.push(' '),
            '\u{01}' => out.push_str("&#x1;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Escape a content payload: [`escape`] plus the SYN (0x16) substitution,
/// which applies to content bodies only.
pub fn escape_content(value: &str) -> String {
    escape(value).replace('\u{16}', " ")
}

// =============================================================================
// DECODE
// =============================================================================

/// Decode a response body into a [`Node`] tree.
///
/// This mirrors the scanner the service was built against; all of the
/// following are defined behavior, covered by tests, and must not be
/// silently replaced with nested-tag-aware parsing:
///
/// - The closing tag is located by plain substring search for the literal
///   `</name>` sequence, so a payload whose text contains that sequence
///   before the true close will mis-parse.
/// - Same-named sibling elements overwrite each other in the map (last
///   wins). The service numbers repeated groups (`document_0`, `file_1`,
///   ...) to stay clear of the collision.
/// - A stray closing tag is skipped rather than rejected.
/// - A fragment with no child tags decodes to its verbatim text.
/// - Empty input decodes to an empty map.
pub fn decode(xml: &str) -> Node {
    if xml.is_empty() {
        return Node::Map(BTreeMap::new());
    }
    decode_fragment(xml)
}

fn decode_fragment(xml: &str) -> Node {
    let mut children = BTreeMap::new();
    let mut rest = xml;
    while !rest.is_empty() {
        let Some(open) = rest.find('<') else { break };
        let Some(gt) = rest[open..].find('>').map(|i| open + i) else {
            break;
        };
        if rest.as_bytes().get(open + 1) == Some(&b'/') {
            // stray closing tag: skip past it and continue
            if gt + 1 < rest.len() {
                rest = &rest[gt + 1..];
                continue;
            }
            break;
        }
        let name = rest[open + 1..gt].trim().to_string();
        let closing = format!("</{name}>");
        let Some(end) = rest[gt + 1..].find(&closing).map(|i| gt + 1 + i) else {
            break;
        };
        // last-wins on repeated sibling names
        children.insert(name, decode_fragment(&rest[gt + 1..end]));
        rest = &rest[end + closing.len()..];
    }
    if children.is_empty() {
        Node::Text(xml.to_string())
    } else {
        Node::Map(children)
    }
}

/// Best-effort case-insensitive extraction of a single tag's inner text.
///
/// Used for pulling `<result>` / `<result_code>` out of responses that
/// failed the success-marker check. Returns `None` for absent or empty tags.
pub fn extract_tag<'a>(body: &'a str, name: &str) -> Option<&'a str> {
    let open = format!("<{name}>");
    let close = format!("</{name}>");
    let start = find_ci(body, &open)? + open.len();
    let end = find_ci(&body[start..], &close)? + start;
    (end > start).then(|| &body[start..end])
}

/// ASCII case-insensitive substring search returning a byte offset
pub fn find_ci(haystack: &str, needle: &str) -> Option<usize> {
    haystack
        .to_ascii_lowercase()
        .find(&needle.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_basics() {
        assert_eq!(escape("a & b"), "a &amp; b");
        assert_eq!(escape("<tag>"), "&lt;tag&gt;");
        assert_eq!(escape("\"quoted\" 'single'"), "&quot;quoted&quot; &apos;single&apos;");
    }

    #[test]
    fn test_escape_trims() {
        assert_eq!(escape("  padded  "), "padded");
    }

    #[test]
    fn test_escape_never_double_encodes() {
        // already-encoded input decodes first, so the result is identical
        assert_eq!(escape("a &amp; b"), "a &amp; b");
        assert_eq!(escape(&escape("x < y")), escape("x < y"));
    }

    #[test]
    fn test_escape_control_characters() {
        assert_eq!(escape("a\u{0B}b"), "a b");
        assert_eq!(escape("a\u{01}b"), "a&#x1;b");
        // SYN survives plain escape but not content escape
        assert_eq!(escape("a\u{16}b"), "a\u{16}b");
        assert_eq!(escape_content("a\u{16}b"), "a b");
    }

    #[test]
    fn test_unescape_roundtrip() {
        let original = "5 < 6 & \"7\" > '1'";
        assert_eq!(unescape(&escape(original)), original);
    }

    #[test]
    fn test_unescape_numeric_references() {
        assert_eq!(unescape("&#65;&#x42;"), "AB");
        assert_eq!(unescape("&#x1;"), "\u{01}");
    }

    #[test]
    fn test_unescape_passes_through_unknown() {
        assert_eq!(unescape("fish & chips; &bogus; &"), "fish & chips; &bogus; &");
    }

    #[test]
    fn test_decode_nested() {
        let node = decode("<a><b>hello</b><c><d>deep</d></c></a>");
        assert_eq!(node.get("a").unwrap().get_text("b"), Some("hello"));
        assert_eq!(
            node.get("a").unwrap().get("c").unwrap().get_text("d"),
            Some("deep")
        );
    }

    #[test]
    fn test_decode_last_sibling_wins() {
        let node = decode("<a><x>1</x><x>2</x></a>");
        assert_eq!(node.get("a").unwrap().get_text("x"), Some("2"));
    }

    #[test]
    fn test_decode_skips_stray_closing_tag() {
        let node = decode("</stray><a>ok</a>");
        assert_eq!(node.get_text("a"), Some("ok"));
    }

    #[test]
    fn test_decode_leaf_is_verbatim_text() {
        assert_eq!(decode("just text"), Node::Text("just text".into()));
    }

    #[test]
    fn test_decode_empty_input_is_empty_map() {
        assert_eq!(decode(""), Node::Map(BTreeMap::new()));
    }

    #[test]
    fn test_decode_escaped_text_has_no_structure() {
        // encode-then-decode restores the original structural text
        let original = "a&b <not a tag>";
        let node = decode(&escape(original));
        assert_eq!(unescape(node.as_text().unwrap()), original);
    }

    #[test]
    fn test_decode_substring_close_is_defined_behavior() {
        // the literal closing sequence inside a payload ends the element
        // early; documented scanner behavior
        let node = decode("<a><b>text</b></a>trailing</a>");
        assert_eq!(node.get("a").unwrap().get_text("b"), Some("text"));
    }

    #[test]
    fn test_extract_tag() {
        let body = "garbage<Result>User already exists</Result>more";
        assert_eq!(extract_tag(body, "result"), Some("User already exists"));
        assert_eq!(extract_tag(body, "missing"), None);
        assert_eq!(extract_tag("<result></result>", "result"), None);
    }
}
