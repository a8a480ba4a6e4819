/// 8-bit RGBA colour. Alpha 255 is opaque.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const DARK_MAGENTA: Color = Color::rgb(128, 0, 128);
    pub const GRAY: Color = Color::rgb(192, 192, 192);
    pub const DARK_GRAY: Color = Color::rgb(128, 128, 128);
    pub const LIGHT_GRAY: Color = Color::rgb(240, 240, 240);
    pub const NAVY: Color = Color::rgb(0, 0, 128);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Packs into the `0x00RRGGBB` layout used by [`Frame`](super::Frame).
    pub const fn to_xrgb(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    pub const fn from_xrgb(px: u32) -> Self {
        Self::rgb((px >> 16) as u8, (px >> 8) as u8, px as u8)
    }

    /// Source-over compositing of `self` onto an opaque `dst` pixel.
    pub fn blend_over(self, dst: u32) -> u32 {
        match self.a {
            255 => self.to_xrgb(),
            0 => dst,
            a => {
                let d = Color::from_xrgb(dst);
                let mix = |s: u8, d: u8| -> u8 {
                    let a = a as u32;
                    ((s as u32 * a + d as u32 * (255 - a) + 127) / 255) as u8
                };
                Color::rgb(mix(self.r, d.r), mix(self.g, d.g), mix(self.b, d.b)).to_xrgb()
            }
        }
    }

    /// Parses the `"R G B"` triple used by string-valued draw attributes.
    pub fn parse_triple(s: &str) -> Option<Self> {
        let mut it = s.split_whitespace().map(str::parse::<u8>);
        let c = Color::rgb(it.next()?.ok()?, it.next()?.ok()?, it.next()?.ok()?);
        it.next().is_none().then_some(c)
    }
}
