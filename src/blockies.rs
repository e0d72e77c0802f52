//! Deterministic "blockies" identicon, the avatar of last resort.
//!
//! Matches the canonical Ethereum blockies algorithm (as used by the `blo`
//! library): a 4-word xorshift PRNG seeded from the lowercased address string
//! drives three HSL colors and a horizontally mirrored 8x8 cell grid. Pure
//! function of the address, no failure mode.

use ethers::types::Address;
use maud::{html, Markup};
use palette::{Clamp, Hsl, IntoColor, Srgb};

const GRID: usize = 8;

struct Xorshift {
    seed: [i32; 4],
}

impl Xorshift {
    fn new(seed_str: &str) -> Self {
        let mut seed = [0i32; 4];
        for (i, c) in seed_str.chars().enumerate() {
            let slot = &mut seed[i % 4];
            *slot = slot.wrapping_shl(5).wrapping_sub(*slot).wrapping_add(c as i32);
        }
        Self { seed }
    }

    /// Yields values in `[0, 2)`, reproducing the reference implementation's
    /// unsigned reinterpretation of the last word.
    fn next(&mut self) -> f64 {
        let t = self.seed[0] ^ (self.seed[0] << 11);
        self.seed[0] = self.seed[1];
        self.seed[1] = self.seed[2];
        self.seed[2] = self.seed[3];
        self.seed[3] = self.seed[3] ^ (self.seed[3] >> 19) ^ t ^ (t >> 8);
        (self.seed[3] as u32) as f64 / (1u64 << 31) as f64
    }

    fn color(&mut self) -> String {
        let hue = (self.next() * 360.0).floor() as f32;
        let saturation = (self.next() * 60.0 + 40.0) as f32 / 100.0;
        let lightness = ((self.next() + self.next() + self.next() + self.next()) * 25.0) as f32
            / 100.0;
        // Out-of-range saturation/lightness clamp the same way CSS hsl() does.
        let rgb: Srgb = Hsl::new(hue, saturation, lightness).clamp().into_color();
        let rgb = rgb.into_format::<u8>();
        format!("#{:02x}{:02x}{:02x}", rgb.red, rgb.green, rgb.blue)
    }
}

/// Cell values: 0 = background, 1 = color, 2 = spot color. Each row generates
/// the left half and mirrors it.
fn cells(rng: &mut Xorshift) -> [u8; GRID * GRID] {
    let mut data = [0u8; GRID * GRID];
    for row in data.chunks_exact_mut(GRID) {
        let mut left = [0u8; GRID / 2];
        for cell in &mut left {
            *cell = (rng.next() * 2.3) as u8;
        }
        row[..GRID / 2].copy_from_slice(&left);
        left.reverse();
        row[GRID / 2..].copy_from_slice(&left);
    }
    data
}

/// Render the identicon as an SVG fragment scaled to `size` pixels.
pub fn render_svg(address: Address, size: u32) -> Markup {
    let seed = format!("0x{address:x}");
    let mut rng = Xorshift::new(&seed);
    let color = rng.color();
    let bgcolor = rng.color();
    let spotcolor = rng.color();
    let data = cells(&mut rng);
    let scale = size as f32 / GRID as f32;
    html! {
        svg xmlns="http://www.w3.org/2000/svg" width=(size) height=(size) {
            rect width=(size) height=(size) fill=(bgcolor) {}
            @for (i, &value) in data.iter().enumerate() {
                @if value > 0 {
                    rect x=((i % GRID) as f32 * scale)
                        y=((i / GRID) as f32 * scale)
                        width=(scale)
                        height=(scale)
                        fill=(if value == 1 { &color } else { &spotcolor }) {}
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VITALIK: &str = "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045";

    #[test]
    fn test_deterministic() {
        let address: Address = VITALIK.parse().unwrap();
        let a = render_svg(address, 200).into_string();
        let b = render_svg(address, 200).into_string();
        assert_eq!(a, b);
    }

    #[test]
    fn test_addresses_differ() {
        let a: Address = VITALIK.parse().unwrap();
        let b: Address = "0x0000000000000000000000000000000000000001".parse().unwrap();
        assert_ne!(render_svg(a, 200).into_string(), render_svg(b, 200).into_string());
    }

    #[test]
    fn test_structure() {
        let address: Address = VITALIK.parse().unwrap();
        let svg = render_svg(address, 200).into_string();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("fill=\"#"));
        // Background plus at least one foreground cell.
        assert!(svg.matches("<rect").count() > 1);
    }

    #[test]
    fn test_grid_is_mirrored() {
        let mut rng = Xorshift::new("0xabc");
        let data = cells(&mut rng);
        for row in 0..GRID {
            for col in 0..GRID / 2 {
                assert_eq!(data[row * GRID + col], data[row * GRID + GRID - 1 - col]);
            }
        }
    }

    #[test]
    fn test_seed_is_case_stable() {
        // The seed string is the lowercase hex form, so mixed-case input
        // produces the same icon once parsed.
        let a: Address = VITALIK.parse().unwrap();
        let b: Address = VITALIK.to_lowercase().parse().unwrap();
        assert_eq!(render_svg(a, 200).into_string(), render_svg(b, 200).into_string());
    }
}
