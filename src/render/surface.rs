//! Pixel surfaces and colours.
//!
//! A [`Surface`] is an owned RGBA pixel buffer. Nodes never own a surface of
//! their own (viewports excepted); they draw through a [`Canvas`], a clipped
//! window onto whichever surface hosts them.

use crate::geometry::{Offset, Rect, Size};

// ---------------------------------------------------------------------------
// Color
// ---------------------------------------------------------------------------

/// An RGBA colour with straight (non-premultiplied) alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const GREY: Color = Color::rgb(190, 190, 190);
    pub const DARK_GREY: Color = Color::rgb(50, 50, 50);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const YELLOW: Color = Color::rgb(255, 255, 0);
    /// Highlight used for focused tiles.
    pub const ACCENT: Color = Color::rgb(128, 128, 255);
    /// Fill drawn where a thumbnail is missing.
    pub const PLACEHOLDER: Color = Color::rgb(128, 255, 255);

    /// Opaque colour.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// The same colour with a different alpha.
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    pub const fn is_opaque(self) -> bool {
        self.a == 255
    }

    /// Composite `self` over `dst` ("source over").
    pub fn over(self, dst: Color) -> Color {
        match self.a {
            255 => self,
            0 => dst,
            a => {
                let a = u16::from(a);
                let inv = 255 - a;
                let mix = |s: u8, d: u8| ((u16::from(s) * a + u16::from(d) * inv + 127) / 255) as u8;
                Color {
                    r: mix(self.r, dst.r),
                    g: mix(self.g, dst.g),
                    b: mix(self.b, dst.b),
                    a: (a + (u16::from(dst.a) * inv + 127) / 255).min(255) as u8,
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Surface
// ---------------------------------------------------------------------------

/// An owned RGBA pixel buffer.
#[derive(Clone, PartialEq, Eq)]
pub struct Surface {
    size: Size,
    pixels: Vec<Color>,
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface").field("size", &self.size).finish_non_exhaustive()
    }
}

impl Surface {
    /// A fully transparent surface. Negative dimensions are treated as zero.
    pub fn new(size: Size) -> Self {
        Self::filled(size, Color::TRANSPARENT)
    }

    pub fn filled(size: Size, color: Color) -> Self {
        let size = Size::new(size.width.max(0), size.height.max(0));
        Self {
            size,
            pixels: vec![color; size.area() as usize],
        }
    }

    /// Build a surface from row-major pixels.
    ///
    /// # Panics
    ///
    /// Panics if `pixels.len()` does not equal `width * height`.
    pub fn from_pixels(size: Size, pixels: Vec<Color>) -> Self {
        assert_eq!(
            pixels.len(),
            size.area().max(0) as usize,
            "pixel buffer does not match surface size"
        );
        Self { size, pixels }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn width(&self) -> i32 {
        self.size.width
    }

    pub fn height(&self) -> i32 {
        self.size.height
    }

    pub fn rect(&self) -> Rect {
        self.size.to_rect()
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.size.width || y >= self.size.height {
            return None;
        }
        Some((y * self.size.width + x) as usize)
    }

    /// The pixel at `(x, y)`, or `None` outside the surface.
    pub fn get(&self, x: i32, y: i32) -> Option<Color> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Overwrite one pixel. Out-of-bounds writes are ignored.
    pub fn set(&mut self, x: i32, y: i32, color: Color) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = color;
        }
    }

    /// Replace every pixel.
    pub fn fill(&mut self, color: Color) {
        self.pixels.fill(color);
    }

    /// Paint a rectangle, clipped to the surface.
    ///
    /// Opaque colours replace pixels; translucent ones are blended over them.
    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        let clip = rect.intersection(self.rect());
        if clip.is_empty() {
            return;
        }
        for y in clip.y..clip.bottom() {
            let start = (y * self.size.width + clip.x) as usize;
            let row = &mut self.pixels[start..start + clip.width as usize];
            if color.is_opaque() {
                row.fill(color);
            } else {
                for px in row {
                    *px = color.over(*px);
                }
            }
        }
    }

    /// Copy `src_rect` of `src` so that its top-left lands on `dst`.
    ///
    /// Both ends are clipped. Translucent source pixels are blended.
    pub fn blit(&mut self, src: &Surface, src_rect: Rect, dst: Offset) {
        let src_rect = src_rect.intersection(src.rect());
        if src_rect.is_empty() {
            return;
        }
        let shift = dst - src_rect.origin();
        let target = src_rect.translate(shift).intersection(self.rect());
        for y in target.y..target.bottom() {
            for x in target.x..target.right() {
                let s = src.pixels[((y - shift.y) * src.size.width + (x - shift.x)) as usize];
                let i = (y * self.size.width + x) as usize;
                self.pixels[i] = s.over(self.pixels[i]);
            }
        }
    }

    /// Nearest-neighbour scale the whole of `src` into `dst_rect`.
    pub fn blit_scaled(&mut self, src: &Surface, dst_rect: Rect) {
        if src.size.is_empty() || dst_rect.is_empty() {
            return;
        }
        let target = dst_rect.intersection(self.rect());
        for y in target.y..target.bottom() {
            let sy = ((y - dst_rect.y) as i64 * src.size.height as i64 / dst_rect.height as i64) as i32;
            for x in target.x..target.right() {
                let sx = ((x - dst_rect.x) as i64 * src.size.width as i64 / dst_rect.width as i64) as i32;
                let s = src.pixels[(sy * src.size.width + sx) as usize];
                let i = (y * self.size.width + x) as usize;
                self.pixels[i] = s.over(self.pixels[i]);
            }
        }
    }

    /// A canvas covering the whole surface.
    pub fn canvas(&mut self) -> Canvas<'_> {
        let rect = self.rect();
        Canvas { surface: self, rect }
    }

    /// A canvas covering `rect` (clipped to the surface).
    pub fn canvas_at(&mut self, rect: Rect) -> Canvas<'_> {
        let rect = rect.intersection(self.rect());
        Canvas { surface: self, rect }
    }
}

// ---------------------------------------------------------------------------
// Canvas
// ---------------------------------------------------------------------------

/// A clipped, translated window onto a [`Surface`].
///
/// All coordinates given to a canvas are local: `(0, 0)` is the top-left of
/// the window and nothing outside it is ever touched.
pub struct Canvas<'a> {
    surface: &'a mut Surface,
    rect: Rect,
}

impl Canvas<'_> {
    /// Size of the drawable window.
    pub fn size(&self) -> Size {
        self.rect.size()
    }

    /// The window in host-surface coordinates.
    pub fn host_rect(&self) -> Rect {
        self.rect
    }

    fn to_host(&self, local: Rect) -> Rect {
        local.translate(self.rect.origin()).intersection(self.rect)
    }

    /// Fill the whole window.
    pub fn fill(&mut self, color: Color) {
        self.surface.fill_rect(self.rect, color);
    }

    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        let host = self.to_host(rect);
        self.surface.fill_rect(host, color);
    }

    /// Copy all of `src` with its top-left at local `pos`.
    pub fn blit(&mut self, src: &Surface, pos: Offset) {
        self.blit_region(src, src.rect(), pos);
    }

    /// Copy `src_rect` of `src` with its top-left at local `pos`.
    pub fn blit_region(&mut self, src: &Surface, src_rect: Rect, pos: Offset) {
        let src_rect = src_rect.intersection(src.rect());
        let placed = Rect::new(pos.x, pos.y, src_rect.width, src_rect.height);
        let host = self.to_host(placed);
        if host.is_empty() {
            return;
        }
        let trimmed = Rect::new(
            src_rect.x + (host.x - self.rect.x - pos.x),
            src_rect.y + (host.y - self.rect.y - pos.y),
            host.width,
            host.height,
        );
        self.surface.blit(src, trimmed, host.origin());
    }

    /// Scale all of `src` into local `rect`.
    pub fn blit_scaled(&mut self, src: &Surface, rect: Rect) {
        let placed = rect.translate(self.rect.origin());
        if placed.intersection(self.rect) == placed {
            self.surface.blit_scaled(src, placed);
        } else {
            // Scale off-screen first so clipping does not distort the image.
            let mut scaled = Surface::new(rect.size());
            scaled.blit_scaled(src, scaled.rect());
            self.blit(&scaled, rect.origin());
        }
    }

    /// A nested canvas for local `rect`, clipped to this one.
    pub fn sub(&mut self, rect: Rect) -> Canvas<'_> {
        let rect = self.to_host(rect);
        Canvas { surface: self.surface, rect }
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
    fn translucent_fill_blends() {
        let mut s = Surface::filled(Size::new(2, 1), Color::BLACK);
        s.fill_rect(Rect::new(0, 0, 1, 1), Color::WHITE.with_alpha(128));
        let px = s.get(0, 0).unwrap();
        assert!(px.r > 120 && px.r < 135, "{px:?}");
        assert_eq!(px.a, 255);
        assert_eq!(s.get(1, 0), Some(Color::BLACK));
    }

    #[test]
    fn fill_rect_is_clipped() {
        let mut s = Surface::new(Size::new(4, 4));
        s.fill_rect(Rect::new(2, 2, 10, 10), Color::RED);
        assert_eq!(s.get(3, 3), Some(Color::RED));
        assert_eq!(s.get(1, 1), Some(Color::TRANSPARENT));
    }

    #[test]
    fn blit_copies_window() {
        let mut src = Surface::filled(Size::new(4, 4), Color::BLACK);
        src.set(2, 3, Color::RED);
        let mut dst = Surface::filled(Size::new(2, 2), Color::WHITE);
        dst.blit(&src, Rect::new(1, 2, 2, 2), Offset::ZERO);
        assert_eq!(dst.get(1, 1), Some(Color::RED));
        assert_eq!(dst.get(0, 0), Some(Color::BLACK));
    }

    #[test]
    fn blit_scaled_nearest() {
        let mut src = Surface::filled(Size::new(2, 1), Color::BLACK);
        src.set(1, 0, Color::RED);
        let mut dst = Surface::new(Size::new(4, 2));
        dst.blit_scaled(&src, dst.rect());
        assert_eq!(dst.get(0, 1), Some(Color::BLACK));
        assert_eq!(dst.get(3, 0), Some(Color::RED));
    }

    #[test]
    fn canvas_is_local_and_clipped() {
        let mut s = Surface::filled(Size::new(10, 10), Color::BLACK);
        {
            let mut c = s.canvas_at(Rect::new(5, 5, 3, 3));
            assert_eq!(c.size(), Size::new(3, 3));
            c.fill_rect(Rect::new(-1, -1, 10, 10), Color::RED);
        }
        assert_eq!(s.get(5, 5), Some(Color::RED));
        assert_eq!(s.get(7, 7), Some(Color::RED));
        assert_eq!(s.get(8, 8), Some(Color::BLACK));
        assert_eq!(s.get(4, 4), Some(Color::BLACK));
    }

    #[test]
    fn nested_canvas_stays_inside_parent() {
        let mut s = Surface::filled(Size::new(10, 10), Color::BLACK);
        {
            let mut c = s.canvas_at(Rect::new(2, 2, 4, 4));
            let mut inner = c.sub(Rect::new(2, 2, 8, 8));
            assert_eq!(inner.size(), Size::new(2, 2));
            inner.fill(Color::WHITE);
        }
        assert_eq!(s.get(4, 4), Some(Color::WHITE));
        assert_eq!(s.get(6, 6), Some(Color::BLACK));
    }

    #[test]
    fn canvas_blit_region_clips_source() {
        let src = Surface::filled(Size::new(5, 5), Color::RED);
        let mut s = Surface::filled(Size::new(6, 6), Color::BLACK);
        {
            let mut c = s.canvas_at(Rect::new(1, 1, 3, 3));
            c.blit(&src, Offset::new(-2, 1));
        }
        assert_eq!(s.get(1, 2), Some(Color::RED));
        assert_eq!(s.get(1, 1), Some(Color::BLACK));
        assert_eq!(s.get(4, 4), Some(Color::BLACK));
    }
}
