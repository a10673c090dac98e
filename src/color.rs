use palette::{LinSrgb, Mix, Srgb};
use plotters::style::RGBColor;

// ---------------------------------------------------------------------------
// Viridis gradient
// ---------------------------------------------------------------------------

/// Evenly spaced viridis stops (sRGB, 8-bit).
const VIRIDIS_STOPS: [(u8, u8, u8); 9] = [
    (68, 1, 84),
    (71, 44, 122),
    (59, 81, 139),
    (44, 113, 142),
    (33, 144, 141),
    (39, 173, 129),
    (92, 200, 99),
    (170, 220, 50),
    (253, 231, 37),
];

fn stop_linear(i: usize) -> LinSrgb {
    let (r, g, b) = VIRIDIS_STOPS[i];
    Srgb::new(r, g, b).into_format::<f32>().into_linear()
}

/// Sample the gradient at `t` in `[0, 1]` (clamped). Neighbouring stops are
/// blended in linear light.
pub fn viridis(t: f64) -> RGBColor {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let segments = VIRIDIS_STOPS.len() - 1;
    let pos = t * segments as f64;
    let lower = (pos.floor() as usize).min(segments - 1);
    let frac = (pos - lower as f64) as f32;

    let mixed = stop_linear(lower).mix(stop_linear(lower + 1), frac);
    let srgb: Srgb<f32> = Srgb::from_linear(mixed);
    let rgb: Srgb<u8> = srgb.into_format();
    RGBColor(rgb.red, rgb.green, rgb.blue)
}

// ---------------------------------------------------------------------------
// Color scale: value → colour
// ---------------------------------------------------------------------------

/// Continuous mapping from a value range onto the viridis gradient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorScale {
    min: f64,
    max: f64,
}

impl ColorScale {
    /// A zero-width range is widened by 0.5 on each side.
    pub fn new(min: f64, max: f64) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        if max - min < f64::EPSILON {
            ColorScale {
                min: min - 0.5,
                max: max + 0.5,
            }
        } else {
            ColorScale { min, max }
        }
    }

    /// Scale covering `range`, or `[0, 1]` when there is nothing to cover.
    pub fn from_range(range: Option<(f64, f64)>) -> Self {
        match range {
            Some((lo, hi)) => ColorScale::new(lo, hi),
            None => ColorScale::new(0.0, 1.0),
        }
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// Look up the colour for a value. Out-of-range values are clamped.
    pub fn color_for(&self, value: f64) -> RGBColor {
        viridis((value - self.min) / (self.max - self.min))
    }
}
