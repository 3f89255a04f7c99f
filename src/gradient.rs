use crate::color::Color;
use std::fmt;

/// A gradient direction in whole degrees, always in `0..360`.
///
/// As in CSS, `0deg` points up and angles grow clockwise.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Angle(u16);

impl Angle {
    const FULL_TURN: u16 = 360;

    pub(crate) fn new(degrees: u16) -> Self {
        Self(degrees % Self::FULL_TURN)
    }

    pub(crate) fn degrees(&self) -> u16 {
        self.0
    }

    /// The angle one degree further, wrapping at a full turn.
    pub(crate) fn next(self) -> Self {
        Self((self.0 + 1) % Self::FULL_TURN)
    }
}

impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}deg", self.0)
    }
}

/// A two stop linear gradient, rendered as `linear-gradient(<angle>, <from>, <to>)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct LinearGradient {
    pub(crate) angle: Angle,
    pub(crate) from: Color,
    pub(crate) to: Color,
}

impl LinearGradient {
    pub(crate) fn new(angle: Angle, from: Color, to: Color) -> Self {
        Self { angle, from, to }
    }

    /// Sample the gradient at point `(x, y)` of a `width` x `height` box.
    ///
    /// The gradient line passes through the box center and is long enough that the box corners
    /// land exactly on the 0% and 100% stops, which is how CSS sizes it.
    pub(crate) fn sample(&self, x: f32, y: f32, width: f32, height: f32) -> Color {
        let radians = (self.angle.degrees() as f32).to_radians();
        // y grows downwards, so "up" is negative.
        let (dx, dy) = (radians.sin(), -radians.cos());
        let length = (width * dx).abs() + (height * dy).abs();
        if length <= f32::EPSILON {
            return self.from;
        }
        let projection = (x - width / 2.0) * dx + (y - height / 2.0) * dy;
        let t = projection / length + 0.5;
        self.from.lerp(self.to, t)
    }
}

impl fmt::Display for LinearGradient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "linear-gradient({}, {}, {})", self.angle, self.from, self.to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const RED: Color = Color::new(255, 0, 0);
    const BLUE: Color = Color::new(0, 0, 255);

    #[test]
    fn angle_wraps_after_full_turn() {
        let mut angle = Angle::default();
        for tick in 1..=1000u32 {
            angle = angle.next();
            assert_eq!(angle.degrees() as u32, tick % 360);
        }
    }

    #[test]
    fn angle_constructor_wraps() {
        assert_eq!(Angle::new(360), Angle::new(0));
        assert_eq!(Angle::new(725).degrees(), 5);
        assert_eq!(Angle::new(359).next(), Angle::new(0));
    }

    #[test]
    fn display() {
        let gradient = LinearGradient::new(Angle::new(45), Color::new(1, 2, 3), Color::new(0xab, 0xcd, 0xef));
        assert_eq!(gradient.to_string(), "linear-gradient(45deg, #010203, #abcdef)");
    }

    #[rstest]
    #[case::to_top(0, (5.0, 4.0), RED, (5.0, 0.0), BLUE)]
    #[case::to_right(90, (0.0, 2.0), RED, (10.0, 2.0), BLUE)]
    #[case::to_bottom(180, (5.0, 0.0), RED, (5.0, 4.0), BLUE)]
    #[case::to_left(270, (10.0, 2.0), RED, (0.0, 2.0), BLUE)]
    fn sample_endpoints(
        #[case] degrees: u16,
        #[case] start: (f32, f32),
        #[case] start_color: Color,
        #[case] end: (f32, f32),
        #[case] end_color: Color,
    ) {
        let gradient = LinearGradient::new(Angle::new(degrees), RED, BLUE);
        assert_eq!(gradient.sample(start.0, start.1, 10.0, 4.0), start_color);
        assert_eq!(gradient.sample(end.0, end.1, 10.0, 4.0), end_color);
    }

    #[test]
    fn sample_diagonal_corners() {
        let gradient = LinearGradient::new(Angle::new(135), RED, BLUE);
        assert_eq!(gradient.sample(0.0, 0.0, 8.0, 8.0), RED);
        assert_eq!(gradient.sample(8.0, 8.0, 8.0, 8.0), BLUE);
    }

    #[test]
    fn sample_center_is_midpoint() {
        let gradient = LinearGradient::new(Angle::new(90), Color::BLACK, Color::new(200, 100, 50));
        assert_eq!(gradient.sample(5.0, 1.0, 10.0, 2.0), Color::new(100, 50, 25));
    }

    #[test]
    fn sample_empty_box() {
        let gradient = LinearGradient::new(Angle::new(90), RED, BLUE);
        assert_eq!(gradient.sample(0.0, 0.0, 0.0, 0.0), RED);
    }
}
