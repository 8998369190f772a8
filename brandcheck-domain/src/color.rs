//! Colour parsing, RGB distance and WCAG contrast.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };
pub const WHITE: Rgb = Rgb {
    r: 255,
    g: 255,
    b: 255,
};

impl Rgb {
    /// Accepts `#rgb`, `#rrggbb` and `rgb(r, g, b)`; case-insensitive, surrounding space ignored.
    pub fn parse(input: &str) -> Option<Rgb> {
        let s = input.trim().to_ascii_lowercase();
        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex);
        }
        if let Some(inner) = s.strip_prefix("rgb(").and_then(|r| r.strip_suffix(')')) {
            let parts: Vec<u8> = inner
                .split(',')
                .map(|p| p.trim().parse::<u8>())
                .collect::<Result<_, _>>()
                .ok()?;
            if let [r, g, b] = parts[..] {
                return Some(Rgb { r, g, b });
            }
            return None;
        }
        match s.as_str() {
            "black" => Some(BLACK),
            "white" => Some(WHITE),
            _ => None,
        }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Euclidean distance in RGB space, 0..=441.67.
    pub fn distance(self, other: Rgb) -> f64 {
        let dr = self.r as f64 - other.r as f64;
        let dg = self.g as f64 - other.g as f64;
        let db = self.b as f64 - other.b as f64;
        (dr * dr + dg * dg + db * db).sqrt()
    }

    /// WCAG 2.x relative luminance.
    pub fn relative_luminance(self) -> f64 {
        fn channel(c: u8) -> f64 {
            let c = c as f64 / 255.0;
            if c <= 0.03928 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        0.2126 * channel(self.r) + 0.7152 * channel(self.g) + 0.0722 * channel(self.b)
    }

    /// WCAG contrast ratio, 1.0..=21.0, symmetric.
    pub fn contrast_ratio(self, other: Rgb) -> f64 {
        let a = self.relative_luminance();
        let b = other.relative_luminance();
        let (hi, lo) = if a >= b { (a, b) } else { (b, a) };
        (hi + 0.05) / (lo + 0.05)
    }

    /// Index and distance of the nearest palette entry. First entry wins ties.
    pub fn nearest(self, palette: &[Rgb]) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;
        for (i, c) in palette.iter().enumerate() {
            let d = self.distance(*c);
            if best.is_none_or(|(_, bd)| d < bd) {
                best = Some((i, d));
            }
        }
        best
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

fn parse_hex(hex: &str) -> Option<Rgb> {
    let expanded: String = match hex.len() {
        3 => hex.chars().flat_map(|c| [c, c]).collect(),
        6 => hex.to_string(),
        _ => return None,
    };
    let v = u32::from_str_radix(&expanded, 16).ok()?;
    Some(Rgb {
        r: ((v >> 16) & 0xff) as u8,
        g: ((v >> 8) & 0xff) as u8,
        b: (v & 0xff) as u8,
    })
}

/// Canonical `#rrggbb` form, or `None` when the value is not a solid colour.
pub fn normalize(input: &str) -> Option<String> {
    Rgb::parse(input).map(Rgb::to_hex)
}

/// Black or white, whichever contrasts more with `background`.
pub fn best_text_color(background: Rgb) -> Rgb {
    if BLACK.contrast_ratio(background) >= WHITE.contrast_ratio(background) {
        BLACK
    } else {
        WHITE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_long_and_functional_forms() {
        assert_eq!(Rgb::parse("#fff"), Some(WHITE));
        assert_eq!(Rgb::parse(" #E30613 ").map(Rgb::to_hex), Some("#e30613".into()));
        assert_eq!(
            Rgb::parse("rgb(10, 20, 30)"),
            Some(Rgb {
                r: 10,
                g: 20,
                b: 30
            })
        );
        assert_eq!(Rgb::parse("linear-gradient(red, blue)"), None);
        assert_eq!(Rgb::parse("#12345"), None);
    }

    #[test]
    fn black_on_white_is_twenty_one_to_one() {
        let ratio = BLACK.contrast_ratio(WHITE);
        assert!((ratio - 21.0).abs() < 1e-9);
        assert!((WHITE.contrast_ratio(WHITE) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn nearest_picks_closest_and_first_on_tie() {
        let grey = Rgb {
            r: 128,
            g: 128,
            b: 128,
        };
        let (idx, _) = grey.nearest(&[BLACK, WHITE]).expect("non-empty");
        assert_eq!(idx, 1);

        let (idx, d) = BLACK.nearest(&[WHITE, BLACK, BLACK]).expect("non-empty");
        assert_eq!((idx, d), (1, 0.0));
        assert_eq!(BLACK.nearest(&[]), None);
    }

    #[test]
    fn best_text_color_picks_higher_contrast() {
        assert_eq!(best_text_color(WHITE), BLACK);
        assert_eq!(best_text_color(BLACK), WHITE);
        let red = Rgb::parse("#e30613").expect("red");
        assert_eq!(best_text_color(red), WHITE);
    }
}
