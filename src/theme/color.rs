use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ColorError {
    #[error("Hex colour '{0}' must have exactly 6 hex digits")]
    Length(String),
    #[error("Hex colour '{0}' contains non-hex characters")]
    Digits(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.r, self.g, self.b)
    }
}

/// Parses `#rrggbb` or `rrggbb`.
pub fn hex_to_rgb(hex: &str) -> Result<Rgb, ColorError> {
    let h = hex.strip_prefix('#').unwrap_or(hex);
    if h.len() != 6 {
        return Err(ColorError::Length(hex.to_string()));
    }
    if !h.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ColorError::Digits(hex.to_string()));
    }
    let channel = |i: usize| u8::from_str_radix(&h[i..i + 2], 16).map_err(|_| ColorError::Digits(hex.to_string()));
    Ok(Rgb {
        r: channel(0)?,
        g: channel(2)?,
        b: channel(4)?,
    })
}

pub fn rgb_to_hex(rgb: Rgb) -> String {
    format!("#{:02x}{:02x}{:02x}", rgb.r, rgb.g, rgb.b)
}

/// Moves each channel `amount` (0..=1) of the way toward mid-grey (128).
pub fn mute(hex: &str, amount: f64) -> Result<String, ColorError> {
    let rgb = hex_to_rgb(hex)?;
    let amount = amount.clamp(0.0, 1.0);
    let m = |c: u8| {
        let c = f64::from(c);
        (c + (128.0 - c) * amount).round().clamp(0.0, 255.0) as u8
    };
    Ok(rgb_to_hex(Rgb { r: m(rgb.r), g: m(rgb.g), b: m(rgb.b) }))
}

/// Adds `steps` to each channel, saturating at 255.
pub fn lighten(hex: &str, steps: u8) -> Result<String, ColorError> {
    let rgb = hex_to_rgb(hex)?;
    Ok(rgb_to_hex(Rgb {
        r: rgb.r.saturating_add(steps),
        g: rgb.g.saturating_add(steps),
        b: rgb.b.saturating_add(steps),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_with_and_without_hash() {
        assert_eq!(hex_to_rgb("#8b5cf6"), Ok(Rgb { r: 0x8b, g: 0x5c, b: 0xf6 }));
        assert_eq!(hex_to_rgb("FFFFFF"), Ok(Rgb { r: 255, g: 255, b: 255 }));
    }

    #[test]
    fn rejects_malformed_hex() {
        assert_eq!(hex_to_rgb("#fff"), Err(ColorError::Length("#fff".into())));
        assert_eq!(hex_to_rgb("#12345g"), Err(ColorError::Digits("#12345g".into())));
        assert_eq!(hex_to_rgb(""), Err(ColorError::Length("".into())));
        assert!(hex_to_rgb("#ééé").is_err());
        assert!(mute("red", 0.45).is_err());
        assert!(lighten("#1234567", 8).is_err());
    }

    #[test]
    fn formats_lowercase_padded() {
        assert_eq!(rgb_to_hex(Rgb { r: 0, g: 10, b: 255 }), "#000aff");
    }

    #[test]
    fn mute_toward_grey() {
        assert_eq!(mute("#808080", 0.45).unwrap(), "#808080");
        assert_eq!(mute("#000000", 1.0).unwrap(), "#808080");
        assert_eq!(mute("#ffffff", 1.0).unwrap(), "#808080");
        assert_eq!(mute("#000000", 0.0).unwrap(), "#000000");
        // 224 + (128 - 224) * 0.45 = 180.8
        assert_eq!(mute("#e0e0e0", 0.45).unwrap(), "#b5b5b5");
    }

    #[test]
    fn lighten_clamps() {
        assert_eq!(lighten("#000000", 8).unwrap(), "#080808");
        assert_eq!(lighten("#fffafa", 8).unwrap(), "#ffffff");
        assert_eq!(lighten("111111", 8).unwrap(), "#191919");
    }
}
