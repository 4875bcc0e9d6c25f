//! Bitmap and font services.
//!
//! Widgets treat both as opaque: an [`ImageLoader`] turns a path into a
//! drawable [`Surface`] (or nothing, in which case the widget paints a
//! placeholder) and a [`FontService`] measures and renders single words.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use log::warn;

use crate::geometry::{Rect, Size};
use crate::render::surface::{Color, Surface};

// ---------------------------------------------------------------------------
// Images
// ---------------------------------------------------------------------------

/// Source of decoded bitmaps.
pub trait ImageLoader {
    /// Load the image at `path`. `None` if it is missing or cannot be decoded.
    fn load(&mut self, path: &Path) -> Option<Rc<Surface>>;
}

/// Decodes PNG and JPEG files with the `image` crate and caches the result,
/// failures included, per path.
#[derive(Debug, Default)]
pub struct FileImageLoader {
    cache: HashMap<PathBuf, Option<Rc<Surface>>>,
}

impl FileImageLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget every cached image.
    pub fn clear(&mut self) {
        self.cache.clear();
    }

    fn decode(path: &Path) -> Option<Surface> {
        let decoded = match image::open(path) {
            Ok(img) => img.to_rgba8(),
            Err(e) => {
                warn!("cannot load image {}: {e}", path.display());
                return None;
            }
        };
        let size = Size::new(decoded.width() as i32, decoded.height() as i32);
        let pixels = decoded
            .pixels()
            .map(|p| Color::rgba(p[0], p[1], p[2], p[3]))
            .collect();
        Some(Surface::from_pixels(size, pixels))
    }
}

impl ImageLoader for FileImageLoader {
    fn load(&mut self, path: &Path) -> Option<Rc<Surface>> {
        self.cache
            .entry(path.to_path_buf())
            .or_insert_with(|| Self::decode(path).map(Rc::new))
            .clone()
    }
}

/// Scale `size` to fit inside `bounds`, keeping its aspect ratio.
pub fn fit_within(size: Size, bounds: Size) -> Size {
    if size.is_empty() || bounds.is_empty() {
        return Size::ZERO;
    }
    let (w, h) = (i64::from(size.width), i64::from(size.height));
    let (bw, bh) = (i64::from(bounds.width), i64::from(bounds.height));
    if w * bh > h * bw {
        Size::new(bounds.width, (h * bw / w) as i32)
    } else {
        Size::new((w * bh / h) as i32, bounds.height)
    }
}

// ---------------------------------------------------------------------------
// Fonts
// ---------------------------------------------------------------------------

/// Measures and renders words.
pub trait FontService {
    /// Pixel size of `word` when rendered.
    fn measure(&self, word: &str) -> Size;

    /// Render `word` onto a transparent bitmap of [`measure`](Self::measure) size.
    fn render(&self, word: &str, color: Color) -> Surface;

    /// Height of one line of text.
    fn line_height(&self) -> i32;

    /// Width of the gap between words.
    fn space_width(&self) -> i32 {
        self.measure(" ").width
    }
}

/// Fixed-advance greeked font.
///
/// Every character occupies one `advance` cell; visible characters are drawn
/// as a solid block inset by one pixel on each side. At terminal resolution
/// individual glyphs are not legible anyway, so this keeps text layout
/// faithful without shipping a font.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockFont {
    advance: Size,
}

impl BlockFont {
    pub fn new(advance: Size) -> Self {
        Self { advance }
    }

    pub fn advance(&self) -> Size {
        self.advance
    }
}

impl Default for BlockFont {
    fn default() -> Self {
        Self::new(Size::new(8, 16))
    }
}

impl FontService for BlockFont {
    fn measure(&self, word: &str) -> Size {
        Size::new(word.chars().count() as i32 * self.advance.width, self.advance.height)
    }

    fn render(&self, word: &str, color: Color) -> Surface {
        let mut surface = Surface::new(self.measure(word));
        let glyph = Rect::new(1, 1, self.advance.width - 2, self.advance.height - 2);
        for (i, ch) in word.chars().enumerate() {
            if ch.is_whitespace() {
                continue;
            }
            let x = i as i32 * self.advance.width;
            surface.fill_rect(glyph.translate(crate::geometry::Offset::new(x, 0)), color);
        }
        surface
    }

    fn line_height(&self) -> i32 {
        self.advance.height
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn fit_keeps_aspect() {
        assert_eq!(fit_within(Size::new(200, 100), Size::new(100, 100)), Size::new(100, 50));
        assert_eq!(fit_within(Size::new(100, 400), Size::new(100, 100)), Size::new(25, 100));
        assert_eq!(fit_within(Size::new(10, 10), Size::new(40, 20)), Size::new(20, 20));
        assert_eq!(fit_within(Size::ZERO, Size::new(40, 20)), Size::ZERO);
    }

    #[test]
    fn block_font_measures_by_char_count() {
        let font = BlockFont::new(Size::new(4, 6));
        assert_eq!(font.measure("abc"), Size::new(12, 6));
        assert_eq!(font.measure("äö"), Size::new(8, 6));
        assert_eq!(font.space_width(), 4);
        assert_eq!(font.line_height(), 6);
    }

    #[test]
    fn block_font_renders_blocks_and_skips_spaces() {
        let font = BlockFont::new(Size::new(4, 6));
        let s = font.render("a b", Color::RED);
        assert_eq!(s.size(), Size::new(12, 6));
        assert_eq!(s.get(1, 1), Some(Color::RED));
        assert_eq!(s.get(0, 0), Some(Color::TRANSPARENT));
        assert_eq!(s.get(5, 2), Some(Color::TRANSPARENT));
        assert_eq!(s.get(9, 2), Some(Color::RED));
    }

    #[test]
    fn missing_image_is_none_and_cached() {
        let mut loader = FileImageLoader::new();
        let path = Path::new("/nonexistent/couch-ui/cover.png");
        assert!(loader.load(path).is_none());
        assert_eq!(loader.cache.len(), 1);
        assert!(loader.load(path).is_none());
    }

    #[test]
    fn decodes_png_from_disk() {
        let dir = std::env::temp_dir().join(format!("couch-ui-media-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("cover.png");
        let img = image::RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 255]));
        img.save(&path).unwrap();

        let mut loader = FileImageLoader::new();
        let surface = loader.load(&path).unwrap();
        assert_eq!(surface.size(), Size::new(3, 2));
        assert_eq!(surface.get(2, 1), Some(Color::rgb(10, 20, 30)));
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
