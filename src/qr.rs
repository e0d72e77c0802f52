use anyhow::{Context, Result};
use maud::{html, Markup};
use qrcode::{Color, QrCode};

/// Standard quiet zone width, in modules.
const QUIET: usize = 4;

/// Render a QR code for `data` as an SVG fragment scaled to `size` pixels.
pub fn render_svg(data: &str, size: u32) -> Result<Markup> {
    let code = QrCode::new(data.as_bytes()).context("Failed to encode QR code")?;
    let width = code.width();
    let colors = code.to_colors();
    let scale = size as f32 / (width + QUIET * 2) as f32;
    Ok(html! {
        svg xmlns="http://www.w3.org/2000/svg" width=(size) height=(size) {
            rect width=(size) height=(size) fill="#ffffff" {}
            @for (i, color) in colors.iter().enumerate() {
                @if *color == Color::Dark {
                    rect x=((i % width + QUIET) as f32 * scale)
                        y=((i / width + QUIET) as f32 * scale)
                        width=(scale)
                        height=(scale)
                        fill="#000000" {}
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic() {
        let data = "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045";
        let a = render_svg(data, 330).unwrap().into_string();
        let b = render_svg(data, 330).unwrap().into_string();
        assert_eq!(a, b);
        assert!(a.starts_with("<svg"));
        assert!(a.contains("fill=\"#000000\""));
    }

    #[test]
    fn test_payloads_differ() {
        let a = render_svg("0x0000000000000000000000000000000000000001", 330).unwrap();
        let b = render_svg("0x0000000000000000000000000000000000000002", 330).unwrap();
        assert_ne!(a.into_string(), b.into_string());
    }
}
