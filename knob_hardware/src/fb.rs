//! Linux framebuffer renderer: one BMP face plus a caption strip.
//!
//! Frames are composed off-screen as RGB888 and blitted to the
//! framebuffer device as BGRA8888 (32-bit, alpha zero), one whole frame
//! per `render` call. Layout is fixed: image at the origin, caption in
//! the bottom strip.

use crate::error::HwError;
use embedded_graphics::{
    Pixel,
    image::Image,
    mono_font::{MonoTextStyle, ascii::FONT_10X20},
    pixelcolor::Rgb888,
    prelude::*,
    text::{Baseline, Text},
};
use knob_traits::{DisplayPanel, ImageId};
use std::fs;
use std::path::PathBuf;
use tinybmp::Bmp;

/// Height of the caption strip at the bottom of the frame.
const CAPTION_STRIP_PX: i32 = 60;

fn asset_file(image: ImageId) -> &'static str {
    match image {
        ImageId::OpenMouth => "open-mouth.bmp",
        ImageId::ClosedMouth => "closed-mouth.bmp",
        ImageId::Sleepy => "sleepy.bmp",
        ImageId::Working => "working.bmp",
    }
}

/// Off-screen RGB888 frame used as the embedded-graphics draw target.
struct Frame {
    width: u32,
    height: u32,
    pixels: Vec<Rgb888>,
}

impl Frame {
    fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgb888::BLACK; (width * height) as usize],
        }
    }

    /// Pack as BGRA8888 for the framebuffer.
    fn to_bgra(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixels.len() * 4);
        for c in &self.pixels {
            out.extend_from_slice(&[c.b(), c.g(), c.r(), 0]);
        }
        out
    }
}

impl OriginDimensions for Frame {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

impl DrawTarget for Frame {
    type Color = Rgb888;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Rgb888>>,
    {
        let (w, h) = (self.width as i32, self.height as i32);
        for Pixel(p, color) in pixels {
            if p.x >= 0 && p.y >= 0 && p.x < w && p.y < h {
                self.pixels[(p.y * w + p.x) as usize] = color;
            }
        }
        Ok(())
    }
}

pub struct FramebufferDisplay {
    device: PathBuf,
    width: u32,
    height: u32,
    asset_dir: PathBuf,
    /// Raw BMP file bytes, loaded once per image.
    cache: Vec<(ImageId, Vec<u8>)>,
}

impl FramebufferDisplay {
    pub fn new(cfg: &knob_config::Display) -> Self {
        Self {
            device: PathBuf::from(&cfg.device),
            width: cfg.width,
            height: cfg.height,
            asset_dir: PathBuf::from(&cfg.asset_dir),
            cache: Vec::new(),
        }
    }

    fn asset_bytes(&mut self, image: ImageId) -> Result<&[u8], HwError> {
        if let Some(idx) = self.cache.iter().position(|(id, _)| *id == image) {
            return Ok(&self.cache[idx].1);
        }
        let path = self.asset_dir.join(asset_file(image));
        let bytes = fs::read(&path)
            .map_err(|e| HwError::Asset(format!("{}: {e}", path.display())))?;
        self.cache.push((image, bytes));
        Ok(&self.cache[self.cache.len() - 1].1)
    }

    fn paint(&mut self, image: ImageId, caption: &str) -> Result<(), HwError> {
        let (width, height) = (self.width, self.height);
        let bytes = self.asset_bytes(image)?.to_vec();
        let bmp = Bmp::<Rgb888>::from_slice(&bytes)
            .map_err(|e| HwError::Asset(format!("{}: {e:?}", asset_file(image))))?;

        let mut frame = Frame::new(width, height);
        let _ = Image::new(&bmp, Point::zero()).draw(&mut frame);

        let style = MonoTextStyle::new(&FONT_10X20, Rgb888::WHITE);
        let y = height as i32 - CAPTION_STRIP_PX + 10;
        let _ = Text::with_baseline(caption, Point::new(10, y), style, Baseline::Top)
            .draw(&mut frame);

        fs::write(&self.device, frame.to_bgra())
            .map_err(|e| HwError::Framebuffer(format!("{}: {e}", self.device.display())))?;
        tracing::trace!(?image, caption, "frame written");
        Ok(())
    }
}

impl DisplayPanel for FramebufferDisplay {
    fn render(
        &mut self,
        image: ImageId,
        caption: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.paint(image, caption).map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal valid 24-bit bottom-up BMP (2x2, solid red).
    fn tiny_bmp() -> Vec<u8> {
        let mut b = Vec::new();
        // file header
        b.extend_from_slice(b"BM");
        b.extend_from_slice(&70u32.to_le_bytes()); // file size
        b.extend_from_slice(&[0; 4]); // reserved
        b.extend_from_slice(&54u32.to_le_bytes()); // pixel data offset
        // DIB header (BITMAPINFOHEADER)
        b.extend_from_slice(&40u32.to_le_bytes());
        b.extend_from_slice(&2i32.to_le_bytes()); // width
        b.extend_from_slice(&2i32.to_le_bytes()); // height
        b.extend_from_slice(&1u16.to_le_bytes()); // planes
        b.extend_from_slice(&24u16.to_le_bytes()); // bpp
        b.extend_from_slice(&0u32.to_le_bytes()); // compression
        b.extend_from_slice(&16u32.to_le_bytes()); // image size
        b.extend_from_slice(&2835u32.to_le_bytes()); // x ppm
        b.extend_from_slice(&2835u32.to_le_bytes()); // y ppm
        b.extend_from_slice(&0u32.to_le_bytes()); // palette colors
        b.extend_from_slice(&0u32.to_le_bytes()); // important colors
        // two rows: 2 BGR pixels + 2 pad bytes each
        for _ in 0..2 {
            b.extend_from_slice(&[0, 0, 255, 0, 0, 255, 0, 0]);
        }
        b
    }

    fn display_in(dir: &std::path::Path) -> FramebufferDisplay {
        let cfg = knob_config::Display {
            device: dir.join("fb0").to_string_lossy().into_owned(),
            width: 32,
            height: 24,
            asset_dir: dir.to_string_lossy().into_owned(),
        };
        FramebufferDisplay::new(&cfg)
    }

    #[test]
    fn render_writes_a_full_bgra_frame() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("sleepy.bmp"), tiny_bmp()).unwrap();
        let mut display = display_in(dir.path());
        display.render(ImageId::Sleepy, "Status: Ready").unwrap();
        let written = std::fs::read(dir.path().join("fb0")).unwrap();
        assert_eq!(written.len(), 32 * 24 * 4);
        // The red asset pixel lands at the origin, packed BGRA.
        assert_eq!(&written[0..4], &[0, 0, 255, 0]);
    }

    #[test]
    fn missing_asset_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut display = display_in(dir.path());
        assert!(display.render(ImageId::Working, "x").is_err());
    }

    #[test]
    fn assets_are_cached_after_first_use() {
        let dir = tempfile::tempdir().unwrap();
        let asset = dir.path().join("sleepy.bmp");
        std::fs::write(&asset, tiny_bmp()).unwrap();
        let mut display = display_in(dir.path());
        display.render(ImageId::Sleepy, "one").unwrap();
        // Deleting the file must not break subsequent renders.
        std::fs::remove_file(&asset).unwrap();
        display.render(ImageId::Sleepy, "two").unwrap();
    }
}
