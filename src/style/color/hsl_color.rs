use glam::Vec3;

/// Hue, saturation and lightness, each normalized to `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HslColor {
    h: f32,
    s: f32,
    l: f32,
}

impl HslColor {
    pub fn new(h: f32, s: f32, l: f32) -> Self {
        Self { h, s, l }
    }

    pub fn from_rgb(rgb: Vec3) -> Self {
        let min = rgb.min_element();
        let max = rgb.max_element();
        let delta = max - min;
        let l = (max + min) / 2.0;

        if delta == 0.0 {
            return Self { h: 0.0, s: 0.0, l };
        }

        let s = if l < 0.5 {
            delta / (max + min)
        } else {
            delta / (2.0 - max - min)
        };

        let sector = if rgb.x == max {
            (rgb.y - rgb.z) / delta
        } else if rgb.y == max {
            2.0 + (rgb.z - rgb.x) / delta
        } else {
            4.0 + (rgb.x - rgb.y) / delta
        };

        let mut degrees = sector * 60.0;
        if degrees < 0.0 {
            degrees += 360.0;
        }
        Self {
            h: degrees / 360.0,
            s,
            l,
        }
    }

    pub fn h(&self) -> f32 {
        self.h
    }
    pub fn s(&self) -> f32 {
        self.s
    }
    pub fn l(&self) -> f32 {
        self.l
    }

    pub fn to_rgb(&self) -> Vec3 {
        hsl_to_rgb(self.h, self.s, self.l)
    }
}

// ---- conversion core ----

fn hsl_to_rgb(h: f32, s: f32, l: f32) -> Vec3 {
    if s == 0.0 {
        return Vec3::splat(l);
    }

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    Vec3::new(
        hue_to_channel(p, q, h + 1.0 / 3.0),
        hue_to_channel(p, q, h),
        hue_to_channel(p, q, h - 1.0 / 3.0),
    )
}

fn hue_to_channel(p: f32, q: f32, mut t: f32) -> f32 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        return p + (q - p) * 6.0 * t;
    }
    if t < 0.5 {
        return q;
    }
    if t < 2.0 / 3.0 {
        return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
    }
    p
}

#[cfg(test)]
mod tests {
    use super::HslColor;
    use glam::Vec3;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).abs().max_element() < 1e-4
    }

    #[test]
    fn primary_hues_map_to_pure_channels() {
        assert!(close(HslColor::new(0.0, 1.0, 0.5).to_rgb(), Vec3::X));
        assert!(close(HslColor::new(1.0 / 3.0, 1.0, 0.5).to_rgb(), Vec3::Y));
        assert!(close(HslColor::new(2.0 / 3.0, 1.0, 0.5).to_rgb(), Vec3::Z));
        assert!(close(HslColor::new(1.0, 1.0, 0.5).to_rgb(), Vec3::X));
    }

    #[test]
    fn grey_has_no_saturation() {
        let grey = HslColor::from_rgb(Vec3::splat(0.4));
        assert_eq!(grey.s(), 0.0);
        assert!((grey.l() - 0.4).abs() < 1e-6);
    }

    #[test]
    fn rgb_conversion_round_trips_a_mixed_color() {
        let source = Vec3::new(0.2, 0.6, 0.9);
        let hsl = HslColor::from_rgb(source);
        assert!(close(hsl.to_rgb(), source));
    }
}
