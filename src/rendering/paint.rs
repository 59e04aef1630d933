/// Paint command set emitted by the scene layout pass

#[derive(Debug, Clone, PartialEq)]
pub enum PaintCommand {
    SolidRect {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        rgba: (u8, u8, u8, u8),
    },
    Text {
        x: i32,
        y: i32,
        text: String,
        size: u32,
        rgba: (u8, u8, u8, u8),
    },
}

/// Parse the subset of CSS color syntax the timeline styles use: `#rgb`,
/// `#rrggbb`, `#rrggbbaa` and a few keywords. Unparseable values (e.g.
/// `color-mix(...)`) yield `None` and the caller skips the fill.
pub fn parse_css_color(s: &str) -> Option<(u8, u8, u8, u8)> {
    let s = s.trim();
    match s {
        "white" => return Some((255, 255, 255, 255)),
        "black" => return Some((0, 0, 0, 255)),
        "transparent" => return Some((0, 0, 0, 0)),
        _ => {}
    }
    let hex = s.strip_prefix('#')?;
    let nibble = |c: u8| -> Option<u8> {
        match c {
            b'0'..=b'9' => Some(c - b'0'),
            b'a'..=b'f' => Some(c - b'a' + 10),
            b'A'..=b'F' => Some(c - b'A' + 10),
            _ => None,
        }
    };
    let b = hex.as_bytes();
    match b.len() {
        3 => {
            let r = nibble(b[0])?;
            let g = nibble(b[1])?;
            let bl = nibble(b[2])?;
            Some((r * 17, g * 17, bl * 17, 255))
        }
        6 | 8 => {
            let mut parts = [0u8; 4];
            parts[3] = 255;
            for (i, chunk) in b.chunks(2).enumerate() {
                parts[i] = nibble(chunk[0])? * 16 + nibble(chunk[1])?;
            }
            Some((parts[0], parts[1], parts[2], parts[3]))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_and_long_hex() {
        assert_eq!(parse_css_color("#fff"), Some((255, 255, 255, 255)));
        assert_eq!(parse_css_color("#e74c3c"), Some((231, 76, 60, 255)));
        assert_eq!(parse_css_color("#22222280"), Some((34, 34, 34, 128)));
    }

    #[test]
    fn rejects_what_it_cannot_represent() {
        assert_eq!(parse_css_color("color-mix(in srgb, #fff 15%, transparent)"), None);
        assert_eq!(parse_css_color("#zzz"), None);
    }
}
