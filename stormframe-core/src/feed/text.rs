//! Character data helpers

use alloc::string::String;

/// Call `f` with the pieces of `raw` after resolving entity references
///
/// Handles the five predefined XML entities and decimal or hex character
/// references. Anything else starting with `&` is passed through verbatim.
pub fn for_each_unescaped(raw: &str, mut f: impl FnMut(&str)) {
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        if amp > 0 {
            f(&rest[..amp]);
        }
        let after = &rest[amp + 1..];
        let resolved = after
            .find(';')
            .filter(|&semi| semi <= 10)
            .and_then(|semi| resolve_entity(&after[..semi]).map(|c| (c, semi)));

        match resolved {
            Some((c, semi)) => {
                let mut utf8 = [0u8; 4];
                f(c.encode_utf8(&mut utf8));
                rest = &after[semi + 1..];
            }
            None => {
                f("&");
                rest = after;
            }
        }
    }
    if !rest.is_empty() {
        f(rest);
    }
}

fn resolve_entity(name: &str) -> Option<char> {
    match name {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let code = if let Some(hex) = name.strip_prefix("#x") {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                name.strip_prefix('#')?.parse().ok()?
            };
            char::from_u32(code)
        }
    }
}

/// Append as much of `piece` as fits in `max_bytes`, cutting on a char boundary
///
/// Returns `false` if anything was dropped.
pub fn push_bounded(out: &mut String, piece: &str, max_bytes: usize) -> bool {
    let room = max_bytes.saturating_sub(out.len());
    if piece.len() <= room {
        out.push_str(piece);
        return true;
    }
    let mut cut = room;
    while !piece.is_char_boundary(cut) {
        cut -= 1;
    }
    out.push_str(&piece[..cut]);
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unescape(raw: &str) -> String {
        let mut out = String::new();
        for_each_unescaped(raw, |piece| out.push_str(piece));
        out
    }

    #[test]
    fn test_predefined_entities() {
        assert_eq!(
            unescape("&lt;img src=&quot;a.png&quot;&gt; &amp; &apos;"),
            "<img src=\"a.png\"> & '"
        );
    }

    #[test]
    fn test_character_references() {
        assert_eq!(unescape("&#65;&#x42;"), "AB");
    }

    #[test]
    fn test_unknown_entity_passes_through() {
        assert_eq!(unescape("a &nbsp; b & c"), "a &nbsp; b & c");
    }

    #[test]
    fn test_push_bounded_cuts_on_char_boundary() {
        let mut out = String::from("ab");
        assert!(!push_bounded(&mut out, "cé", 4));
        assert_eq!(out, "abc");
        assert!(push_bounded(&mut out, "d", 4));
        assert_eq!(out, "abcd");
    }
}
