//! Character reference decoding for markup text.

/// Decode the name of a character reference (`amp`, `#38`, `#x26`, `nbsp`).
///
/// Unknown names are preserved as the literal reference text.
pub(crate) fn decode_entity(entity: &str) -> String {
    if let Some(numeric) = entity.strip_prefix('#') {
        let code = if let Some(hex) = numeric
            .strip_prefix('x')
            .or_else(|| numeric.strip_prefix('X'))
        {
            u32::from_str_radix(hex, 16).ok()
        } else {
            numeric.parse::<u32>().ok()
        };
        return code
            .and_then(char::from_u32)
            .map_or_else(|| format!("&{entity};"), |c| c.to_string());
    }

    named_entity(entity).map_or_else(|| format!("&{entity};"), str::to_owned)
}

/// Map a named reference to its character.
fn named_entity(name: &str) -> Option<&'static str> {
    Some(match name {
        // XML
        "lt" => "<",
        "gt" => ">",
        "amp" => "&",
        "apos" => "'",
        "quot" => "\"",

        // Spacing and punctuation
        "nbsp" => "\u{00a0}",
        "ensp" => "\u{2002}",
        "emsp" => "\u{2003}",
        "thinsp" => "\u{2009}",
        "mdash" => "\u{2014}",
        "ndash" => "\u{2013}",
        "hellip" => "\u{2026}",
        "bull" => "\u{2022}",
        "middot" => "\u{00b7}",

        // Quotes
        "ldquo" => "\u{201c}",
        "rdquo" => "\u{201d}",
        "lsquo" => "\u{2018}",
        "rsquo" => "\u{2019}",
        "laquo" => "\u{00ab}",
        "raquo" => "\u{00bb}",

        // Arrows
        "rarr" => "\u{2192}",
        "larr" => "\u{2190}",
        "uarr" => "\u{2191}",
        "darr" => "\u{2193}",

        // Symbols
        "copy" => "\u{00a9}",
        "reg" => "\u{00ae}",
        "trade" => "\u{2122}",
        "deg" => "\u{00b0}",
        "times" => "\u{00d7}",
        "divide" => "\u{00f7}",
        "plusmn" => "\u{00b1}",
        "euro" => "\u{20ac}",
        "pound" => "\u{00a3}",
        "yen" => "\u{00a5}",
        "cent" => "\u{00a2}",
        "sect" => "\u{00a7}",
        "para" => "\u{00b6}",

        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_xml_entities() {
        assert_eq!(decode_entity("lt"), "<");
        assert_eq!(decode_entity("amp"), "&");
        assert_eq!(decode_entity("quot"), "\"");
    }

    #[test]
    fn test_decode_named_html_entities() {
        assert_eq!(decode_entity("nbsp"), "\u{00a0}");
        assert_eq!(decode_entity("mdash"), "\u{2014}");
    }

    #[test]
    fn test_decode_numeric() {
        assert_eq!(decode_entity("#65"), "A");
        assert_eq!(decode_entity("#x41"), "A");
        assert_eq!(decode_entity("#X263a"), "\u{263a}");
    }

    #[test]
    fn test_unknown_preserved() {
        assert_eq!(decode_entity("bogus"), "&bogus;");
        assert_eq!(decode_entity("#xZZ"), "&#xZZ;");
    }
}
