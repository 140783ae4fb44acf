//! Flat shading, ACES filmic tone mapping and sRGB output.

use nalgebra::{Matrix3, Vector3};

use crate::config::RenderConfig;

/// Key light plus hemisphere ambient, evaluated per face.
#[derive(Debug, Clone)]
pub struct Shading {
    light_direction: Vector3<f32>,
    ambient: f32,
    exposure: f32,
}

impl Shading {
    pub fn new(config: &RenderConfig) -> Self {
        let light_direction = Vector3::from(config.light_direction)
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(|| -Vector3::y());
        Self {
            light_direction,
            ambient: config.ambient,
            exposure: config.exposure,
        }
    }

    /// Linear radiance of a surface with the given world normal.
    pub fn radiance(&self, base_color: [f32; 3], normal: &Vector3<f32>) -> Vector3<f32> {
        let diffuse = normal.dot(&-self.light_direction).max(0.0);
        // Sky from above, ground bounce from below
        let hemisphere = self.ambient * (0.75 + 0.25 * normal.y);
        Vector3::from(base_color) * (diffuse + hemisphere)
    }

    /// Display color (sRGB, 0-255) of a shaded face.
    pub fn shade(&self, base_color: [f32; 3], normal: &Vector3<f32>) -> [u8; 3] {
        let mapped = aces_filmic(&(self.radiance(base_color, normal) * self.exposure));
        mapped.map(linear_to_srgb).map(to_byte).into()
    }

    /// Perceived brightness in [0, 1] of a shaded face.
    pub fn brightness(&self, base_color: [f32; 3], normal: &Vector3<f32>) -> f32 {
        let mapped = aces_filmic(&(self.radiance(base_color, normal) * self.exposure));
        linear_to_srgb(luminance(&mapped))
    }
}

/// ACES filmic fit (RRT + ODT) as used by three.js, including its 1/0.6
/// exposure pre-scale.
pub fn aces_filmic(color: &Vector3<f32>) -> Vector3<f32> {
    #[rustfmt::skip]
    let input = Matrix3::new(
        0.597_19, 0.354_58, 0.048_23,
        0.076_00, 0.908_34, 0.015_66,
        0.028_40, 0.133_83, 0.837_77,
    );
    #[rustfmt::skip]
    let output = Matrix3::new(
        1.604_75, -0.531_08, -0.073_67,
        -0.102_08, 1.108_13, -0.006_05,
        -0.003_27, -0.072_76, 1.076_02,
    );

    let v = input * (color / 0.6);
    let a = v.component_mul(&v.add_scalar(0.024_578_6)).add_scalar(-0.000_090_537);
    let b = v
        .component_mul(&(v * 0.983_729).add_scalar(0.432_951))
        .add_scalar(0.238_081);
    (output * a.component_div(&b)).map(|c| c.clamp(0.0, 1.0))
}

pub fn linear_to_srgb(c: f32) -> f32 {
    if c <= 0.003_130_8 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

/// Rec. 709 relative luminance of a linear color
pub fn luminance(color: &Vector3<f32>) -> f32 {
    0.2126 * color.x + 0.7152 * color.y + 0.0722 * color.z
}

fn to_byte(c: f32) -> u8 {
    (c.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// CSS color string for a display-space color
pub fn css_color(rgb: [f32; 3]) -> String {
    let [r, g, b] = rgb.map(to_byte);
    format!("rgb({r},{g},{b})")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aces_black_and_saturation() {
        let black = aces_filmic(&Vector3::zeros());
        assert!(black.norm() < 1e-3);

        let hot = aces_filmic(&Vector3::repeat(1000.0));
        for c in hot.iter() {
            assert!(*c <= 1.0 && *c > 0.95);
        }
    }

    #[test]
    fn test_aces_is_monotonic_on_grey() {
        let mut last = -1.0;
        for i in 0..20 {
            let v = aces_filmic(&Vector3::repeat(i as f32 * 0.25)).y;
            assert!(v >= last);
            last = v;
        }
    }

    #[test]
    fn test_srgb_endpoints() {
        assert_eq!(linear_to_srgb(0.0), 0.0);
        assert!((linear_to_srgb(1.0) - 1.0).abs() < 1e-5);
        assert!(linear_to_srgb(0.2) > 0.2);
    }

    #[test]
    fn test_lit_face_is_brighter_than_shadowed() {
        let shading = Shading::new(&RenderConfig::default());
        let facing_light = Vector3::new(0.4, 1.0, 0.6).normalize();
        let lit = shading.brightness([0.8, 0.8, 0.8], &facing_light);
        let dark = shading.brightness([0.8, 0.8, 0.8], &-facing_light);
        assert!(lit > dark);
        assert!((0.0..=1.0).contains(&lit));
    }

    #[test]
    fn test_css_color() {
        assert_eq!(css_color([0.0, 0.5, 1.0]), "rgb(0,128,255)");
    }
}
