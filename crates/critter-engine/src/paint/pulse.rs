use super::Color;

/// Green intensity oscillating with time: `sin(t) / 2 + 0.5`.
///
/// Always in `[0, 1]`; period `2π` seconds.
#[inline]
pub fn green(t: f32) -> f32 {
    (t.sin() / 2.0 + 0.5).clamp(0.0, 1.0)
}

/// Time-varying clear color `(green / 2, green, green, 1)`.
#[inline]
pub fn clear_color(t: f32) -> Color {
    let g = green(t);
    Color::rgba(g / 2.0, g, g, 1.0)
}

/// Time-varying mesh tint `(0, green, 0, 1)`.
#[inline]
pub fn tint(t: f32) -> Color {
    Color::rgba(0.0, green(t), 0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{PI, TAU};

    fn close(a: Color, b: Color) -> bool {
        let eps = 1e-4;
        (a.r - b.r).abs() < eps
            && (a.g - b.g).abs() < eps
            && (a.b - b.b).abs() < eps
            && (a.a - b.a).abs() < eps
    }

    #[test]
    fn green_stays_in_unit_range() {
        let mut t = -100.0f32;
        while t < 100.0 {
            let g = green(t);
            assert!((0.0..=1.0).contains(&g), "green({t}) = {g}");
            t += 0.37;
        }
    }

    #[test]
    fn green_hits_known_points() {
        assert!((green(0.0) - 0.5).abs() < 1e-6);
        assert!((green(PI / 2.0) - 1.0).abs() < 1e-6);
        assert!(green(3.0 * PI / 2.0).abs() < 1e-6);
    }

    #[test]
    fn clear_color_is_periodic() {
        for i in 0..64 {
            let t = i as f32 * 0.21;
            assert!(close(clear_color(t + TAU), clear_color(t)), "t = {t}");
        }
    }

    #[test]
    fn clear_color_red_is_half_green() {
        let c = clear_color(1.0);
        assert!((c.r - c.g / 2.0).abs() < 1e-6);
        assert_eq!(c.g, c.b);
        assert_eq!(c.a, 1.0);
    }

    #[test]
    fn tint_only_drives_green() {
        let c = tint(0.8);
        assert_eq!(c.r, 0.0);
        assert_eq!(c.b, 0.0);
        assert_eq!(c.a, 1.0);
        assert!((c.g - green(0.8)).abs() < 1e-6);
    }
}
