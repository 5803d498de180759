//! Colors and compositing of scanlines into raw RGBA buffers.

use {
  crate::{
    error::{Error, Result, config_bail},
    geometry::P2,
    raster::{Rasterizer, Scanline}
  },
  image::{Rgba, RgbaImage},
  std::{fmt, str::FromStr}
};


#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct Color {
  pub r: u8,
  pub g: u8,
  pub b: u8,
  pub a: u8
}

impl Color {
  pub const BLACK: Color = Color { r: 0, g: 0, b: 0, a: 255 };

  pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
    Self { r, g, b, a }
  }

  pub const fn with_alpha(self, a: u8) -> Self {
    Self { a, ..self }
  }

  /// Mean RGB of the whole image, opaque.
  pub fn average(image: &RgbaImage) -> Self {
    let n = (image.width() as u64 * image.height() as u64).max(1) as f64;
    let mut sum = [0u64; 3];
    for px in image.pixels() {
      for (s, c) in sum.iter_mut().zip(px.0) {
        *s += c as u64;
      }
    }
    let mean = |s: u64| (s as f64 / n).round() as u8;
    Self::new(mean(sum[0]), mean(sum[1]), mean(sum[2]), 255)
  }

  /// `#rrggbb`, alpha left out
  pub fn hex(&self) -> String {
    format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
  }

  pub fn opacity(&self) -> f64 {
    self.a as f64 / 255.0
  }

  /// SVG presentation attributes for a shape filled with this color.
  pub fn svg_attrs(&self) -> String {
    format!("fill=\"{}\" fill-opacity=\"{:.6}\"", self.hex(), self.opacity())
  }
}

impl fmt::Display for Color {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}{:02x}", self.hex(), self.a)
  }
}

/// Accepts `#rgb`, `#rgba`, `#rrggbb` and `#rrggbbaa`, the `#` being optional.
impl FromStr for Color {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    let digits = s.trim().trim_start_matches('#');
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
      config_bail!("malformed hex color {s:?}");
    }
    let nibble = |i: usize| u8::from_str_radix(&digits[i..i + 1], 16).map(|v| v << 4 | v);
    let byte = |i: usize| u8::from_str_radix(&digits[2 * i..2 * i + 2], 16);
    let parsed = match digits.len() {
      3 => (nibble(0), nibble(1), nibble(2), Ok(255)),
      4 => (nibble(0), nibble(1), nibble(2), nibble(3)),
      6 => (byte(0), byte(1), byte(2), Ok(255)),
      8 => (byte(0), byte(1), byte(2), byte(3)),
      _ => config_bail!("malformed hex color {s:?}")
    };
    match parsed {
      (Ok(r), Ok(g), Ok(b), Ok(a)) => Ok(Color::new(r, g, b, a)),
      _ => config_bail!("malformed hex color {s:?}")
    }
  }
}

impl From<Rgba<u8>> for Color {
  fn from(Rgba([r, g, b, a]): Rgba<u8>) -> Self {
    Self { r, g, b, a }
  }
}

impl From<Color> for Rgba<u8> {
  fn from(c: Color) -> Self {
    Rgba([c.r, c.g, c.b, c.a])
  }
}

/// Byte range of the pixels covered by `line` in a tightly packed RGBA buffer.
pub(crate) fn line_bytes(line: &Scanline, width: u32) -> std::ops::Range<usize> {
  let row = line.y as usize * width as usize;
  (row + line.x1 as usize) * 4..(row + line.x2 as usize) * 4
}

/// Composite `color` over the covered pixels.
pub fn draw_lines(image: &mut RgbaImage, color: Color, lines: &[Scanline]) {
  let width = image.width();
  let data: &mut [u8] = image;
  let src = [color.r as f64, color.g as f64, color.b as f64];
  let alpha = color.opacity();
  for line in lines {
    let f = alpha * line.coverage;
    for px in data[line_bytes(line, width)].chunks_exact_mut(4) {
      for (dst, c) in px.iter_mut().zip(src) {
        let d = *dst as f64;
        *dst = (d + (c - d) * f).round().clamp(0.0, 255.0) as u8;
      }
      let a = px[3] as f64;
      px[3] = (a + (255.0 - a) * f).round().clamp(0.0, 255.0) as u8;
    }
  }
}

/// Reset the covered pixels of `dst` to their value in `src`.
pub fn copy_lines(dst: &mut RgbaImage, src: &RgbaImage, lines: &[Scanline]) {
  debug_assert_eq!(dst.dimensions(), src.dimensions());
  let width = dst.width();
  let dst: &mut [u8] = dst;
  let src: &[u8] = src;
  for line in lines {
    let range = line_bytes(line, width);
    dst[range.clone()].copy_from_slice(&src[range]);
  }
}

/// Rasterize `outline`, scaled by `scale`, and composite it onto `image`.
pub fn draw_outline(
  image: &mut RgbaImage,
  rasterizer: &mut Rasterizer,
  outline: &[P2],
  scale: f64,
  color: Color
) {
  let scaled = outline.iter()
    .map(|p| P2::new(p.x * scale, p.y * scale))
    .collect::<Vec<_>>();
  let lines = rasterizer.fill(&scaled);
  draw_lines(image, color, &lines);
}
