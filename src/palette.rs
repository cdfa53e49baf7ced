use crate::core::Rgba8;

/// Canonical hue names, one per 30-degree bucket starting at red (0 degrees).
const HUE_NAMES: [&str; 12] = [
    "red", "orange", "yellow", "lime", "green", "teal", "cyan", "blue", "indigo", "violet",
    "fuchsia", "pink",
];

/// Shades kept per family, light (index 0) to dark (index 9).
pub const SHADES_PER_FAMILY: usize = 10;

// Shape fills sample mid-tone shades only; the extremes read as background
// (near-white) or ink (near-black).
const SAMPLE_SHADES: std::ops::RangeInclusive<usize> = 1..=5;

/// One named hue with its lightness ladder.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct HueFamily {
    pub name: String,
    pub shades: Vec<Rgba8>,
}

/// Immutable color scheme derived from a single base color.
///
/// Twelve hue families are produced by rotating the base hue in 30-degree
/// steps at the base saturation, named by the bucket each rotation lands in,
/// plus a desaturated `gray` family. Every family carries
/// [`SHADES_PER_FAMILY`] shades from light to dark.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Palette {
    pub base: Rgba8,
    pub families: Vec<HueFamily>,
}

impl Palette {
    pub fn derive(base: Rgba8) -> Self {
        let (base_hue, base_sat, _) = rgb_to_hsl(base);

        let mut families = Vec::with_capacity(1 + HUE_NAMES.len());
        families.push(HueFamily {
            name: "gray".to_string(),
            shades: shade_ladder(base_hue, base_sat / 8.0),
        });
        for step in 0..HUE_NAMES.len() {
            let hue = (base_hue + step as f64 * 30.0) % 360.0;
            families.push(HueFamily {
                name: hue_name(hue).to_string(),
                shades: shade_ladder(hue, base_sat),
            });
        }

        Self { base, families }
    }

    pub fn family(&self, name: &str) -> Option<&HueFamily> {
        self.families.iter().find(|f| f.name == name)
    }

    /// Uniform family pick plus a uniform mid-tone shade pick.
    pub fn sample<R: rand::Rng + ?Sized>(&self, rng: &mut R) -> Rgba8 {
        if self.families.is_empty() {
            return self.base;
        }
        let family = &self.families[rng.gen_range(0..self.families.len())];
        if family.shades.is_empty() {
            return self.base;
        }
        let hi = (*SAMPLE_SHADES.end()).min(family.shades.len() - 1);
        let lo = (*SAMPLE_SHADES.start()).min(hi);
        family.shades[rng.gen_range(lo..=hi)]
    }
}

impl Default for Palette {
    fn default() -> Self {
        // House scheme: everything derived from goldenrod #b81.
        Self::derive(Rgba8::opaque(0xbb, 0x88, 0x11))
    }
}

fn shade_ladder(hue: f64, sat: f64) -> Vec<Rgba8> {
    (0..SHADES_PER_FAMILY)
        .map(|i| hsl_to_rgba8(hue, sat, 0.95 - 0.1 * i as f64))
        .collect()
}

fn hue_name(hue: f64) -> &'static str {
    let idx = ((hue / 30.0).round() as usize) % HUE_NAMES.len();
    HUE_NAMES[idx]
}

/// Standard sRGB -> HSL. Hue in degrees `[0, 360)`, saturation and lightness
/// normalized `0..1`.
fn rgb_to_hsl(c: Rgba8) -> (f64, f64, f64) {
    let r = c.r as f64 / 255.0;
    let g = c.g as f64 / 255.0;
    let b = c.b as f64 / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;

    if max == min {
        return (0.0, 0.0, l);
    }

    let d = max - min;
    let s = if l > 0.5 {
        d / (2.0 - max - min)
    } else {
        d / (max + min)
    };

    let h = if max == r {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };

    (h * 60.0, s, l)
}

/// Standard HSL -> sRGB conversion (opaque output).
fn hsl_to_rgba8(h: f64, s: f64, l: f64) -> Rgba8 {
    let h = (h % 360.0 + 360.0) % 360.0 / 360.0;
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);

    fn to_u8(x: f64) -> u8 {
        (x.clamp(0.0, 1.0) * 255.0).round() as u8
    }

    if s == 0.0 {
        let v = to_u8(l);
        return Rgba8::opaque(v, v, v);
    }

    fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
        if t < 0.0 {
            t += 1.0;
        }
        if t > 1.0 {
            t -= 1.0;
        }
        if t < 1.0 / 6.0 {
            return p + (q - p) * 6.0 * t;
        }
        if t < 1.0 / 2.0 {
            return q;
        }
        if t < 2.0 / 3.0 {
            return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
        }
        p
    }

    let q = if l < 0.5 {
        l * (1.0 + s)
    } else {
        l + s - l * s
    };
    let p = 2.0 * l - q;

    Rgba8::opaque(
        to_u8(hue_to_rgb(p, q, h + 1.0 / 3.0)),
        to_u8(hue_to_rgb(p, q, h)),
        to_u8(hue_to_rgb(p, q, h - 1.0 / 3.0)),
    )
}
