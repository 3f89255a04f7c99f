use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// A 24 bit RGB color.
///
/// Its text form is the CSS hex notation: `#` followed by 6 lowercase, zero padded hex digits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub(crate) struct Color {
    r: u8,
    g: u8,
    b: u8,
}

impl Color {
    pub(crate) const BLACK: Self = Self::new(0, 0, 0);

    /// Random draws are taken from `0..RANDOM_DRAW_END`, so pure white is never produced.
    const RANDOM_DRAW_END: u32 = 0xff_ffff;

    pub(crate) const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Builds a color out of the lower 24 bits of `value`.
    pub(crate) fn from_u24(value: u32) -> Self {
        let [_, r, g, b] = value.to_be_bytes();
        Self { r, g, b }
    }

    /// Draw a uniformly distributed random color.
    pub(crate) fn random(rng: &mut fastrand::Rng) -> Self {
        Self::from_u24(rng.u32(0..Self::RANDOM_DRAW_END))
    }

    pub(crate) fn as_rgb(&self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }

    /// Linearly interpolate towards `other`. `t` is clamped to `0.0..=1.0`.
    pub(crate) fn lerp(self, other: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |from: u8, to: u8| {
            let from = from as f32;
            let to = to as f32;
            (from + (to - from) * t).round().clamp(0.0, 255.0) as u8
        };
        Self::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", hex::encode([self.r, self.g, self.b]))
    }
}

impl FromStr for Color {
    type Err = ColorError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let digits = input.strip_prefix('#').ok_or_else(|| ColorError::InvalidHex(input.to_string()))?;
        if digits.len() != 6 {
            return Err(ColorError::InvalidHex(input.to_string()));
        }
        let mut bytes = [0; 3];
        hex::decode_to_slice(digits, &mut bytes).map_err(|_| ColorError::InvalidHex(input.to_string()))?;
        let [r, g, b] = bytes;
        Ok(Self { r, g, b })
    }
}

impl TryFrom<String> for Color {
    type Error = ColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for crossterm::style::Color {
    fn from(color: Color) -> Self {
        let (r, g, b) = color.as_rgb();
        crossterm::style::Color::Rgb { r, g, b }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ColorError {
    #[error("invalid color '{0}': expected '#' followed by 6 hex digits")]
    InvalidHex(String),
}
