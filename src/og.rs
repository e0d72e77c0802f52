//! Fixed 1200x630 OG card layout: white header band with the site title and
//! a display-name pill, light blue body, an identity card (avatar, name,
//! balance) and a QR-code card.

use maud::{html, Markup, PreEscaped};

pub const WIDTH: u32 = 1200;
pub const HEIGHT: u32 = 630;
pub const AVATAR_SIZE: u32 = 200;
pub const QR_SIZE: u32 = 330;

const HEADER_HEIGHT: u32 = 125;

pub enum Avatar {
    /// PNG data URI fetched from the avatar service.
    Remote(String),
    /// Inline blockies SVG fragment.
    Blockies(Markup),
}

pub struct OgCard {
    pub display_name: String,
    pub balance_text: String,
    pub avatar: Avatar,
    pub qr: Markup,
}

pub fn render_svg(card: &OgCard) -> String {
    html! {
        (PreEscaped("<?xml version=\"1.0\" encoding=\"utf-8\"?>"))
        svg xmlns="http://www.w3.org/2000/svg" version="1.1"
            viewBox=(format!("0 0 {WIDTH} {HEIGHT}")) width=(WIDTH) height=(HEIGHT) {
            defs {
                clipPath id="avatar-clip" {
                    circle cx=(AVATAR_SIZE / 2) cy=(AVATAR_SIZE / 2) r=(AVATAR_SIZE / 2) {}
                }
            }
            rect width=(WIDTH) height=(HEIGHT) fill="#eff6ff" {}
            rect width=(WIDTH) height=(HEADER_HEIGHT) fill="#ffffff" {}
            text x="40" y="84" font-family="sans-serif" font-size="60" font-weight="bold"
                fill="#0f172a" { "address.vision" }
            rect x="520" y="30" rx="32" width="600" height="64"
                fill="#eff6ff" stroke="#cbd5e1" {}
            text x="820" y="74" text-anchor="middle" font-family="sans-serif" font-size="36"
                fill="#0f172a" { (card.display_name) }
            // Identity card
            rect x="72" y="189" rx="32" width="560" height="400" fill="#ffffff" {}
            g transform="translate(104, 289)" {
                g clip-path="url(#avatar-clip)" {
                    @match &card.avatar {
                        Avatar::Remote(uri) => {
                            image href=(uri) width=(AVATAR_SIZE) height=(AVATAR_SIZE)
                                preserveAspectRatio="xMidYMid slice" {}
                        }
                        Avatar::Blockies(markup) => { (markup) }
                    }
                }
            }
            text x="336" y="370" font-family="sans-serif" font-size="34" font-weight="bold"
                fill="#0f172a" { (card.display_name) }
            text x="336" y="424" font-family="sans-serif" font-size="30" fill="#0f172a" {
                "Balance: " (card.balance_text) " ETH"
            }
            // QR card
            rect x="664" y="189" rx="32" width="464" height="400" fill="#ffffff" {}
            g transform="translate(731, 224)" { (card.qr) }
        }
    }
    .into_string()
}
