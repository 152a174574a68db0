// src/render/style.rs

use plotters::style::RGBColor;
use tracing::warn;

/// How the regression line is stroked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineStyle {
    Solid,
    Dashed,
}

impl LineStyle {
    /// `"dotted"` draws dashed; every other name draws solid.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "dotted" => LineStyle::Dashed,
            _ => LineStyle::Solid,
        }
    }
}

const NAMED_COLORS: &[(&str, RGBColor)] = &[
    ("red", RGBColor(255, 0, 0)),
    ("blue", RGBColor(0, 0, 255)),
    ("green", RGBColor(0, 128, 0)),
    ("black", RGBColor(0, 0, 0)),
    ("orange", RGBColor(255, 165, 0)),
    ("purple", RGBColor(128, 0, 128)),
    ("gray", RGBColor(128, 128, 128)),
    ("grey", RGBColor(128, 128, 128)),
    ("yellow", RGBColor(255, 255, 0)),
    ("cyan", RGBColor(0, 255, 255)),
    ("magenta", RGBColor(255, 0, 255)),
];

const FALLBACK: RGBColor = RGBColor(255, 0, 0);

/// A basic colour name or `#rrggbb`. Anything else falls back to red.
pub fn parse_color(name: &str) -> RGBColor {
    let name = name.trim().to_lowercase();
    if let Some(hex) = name.strip_prefix('#') {
        if let Some(c) = parse_hex(hex) {
            return c;
        }
    } else if let Some((_, c)) = NAMED_COLORS.iter().find(|(n, _)| *n == name) {
        return *c;
    }
    warn!(color = %name, "unrecognised line colour; using red");
    FALLBACK
}

fn parse_hex(hex: &str) -> Option<RGBColor> {
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(RGBColor(channel(0)?, channel(2)?, channel(4)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_dotted_is_dashed() {
        assert_eq!(LineStyle::from_name("dotted"), LineStyle::Dashed);
        assert_eq!(LineStyle::from_name(" Dotted "), LineStyle::Dashed);
        assert_eq!(LineStyle::from_name("solid"), LineStyle::Solid);
        assert_eq!(LineStyle::from_name("dashed"), LineStyle::Solid);
        assert_eq!(LineStyle::from_name(""), LineStyle::Solid);
    }

    #[test]
    fn colours_by_name_and_hex() {
        assert_eq!(parse_color("red"), RGBColor(255, 0, 0));
        assert_eq!(parse_color("Blue"), RGBColor(0, 0, 255));
        assert_eq!(parse_color("#10ff80"), RGBColor(0x10, 0xff, 0x80));
        assert_eq!(parse_color("#12345"), FALLBACK);
        assert_eq!(parse_color("chartreuse-ish"), FALLBACK);
    }
}
