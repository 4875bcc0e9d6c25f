//! TextBlock widget: word-wrapped text.

use std::any::Any;
use std::rc::Rc;

use crate::geometry::Offset;
use crate::render::surface::{Canvas, Color};
use crate::services::media::FontService;
use crate::tree::{NodeData, NodeId, Tree};
use crate::widget::traits::Widget;

// ---------------------------------------------------------------------------
// Wrapping
// ---------------------------------------------------------------------------

/// Break `text` into lines no wider than `width`.
///
/// Words are separated by whitespace. A word that is wider than `width` on
/// its own gets a line to itself and is clipped when drawn.
pub fn wrap<'a>(font: &dyn FontService, text: &'a str, width: i32) -> Vec<Vec<&'a str>> {
    let space = font.space_width();
    let mut lines: Vec<Vec<&str>> = Vec::new();
    let mut line: Vec<&str> = Vec::new();
    let mut line_w = 0;

    for word in text.split_whitespace() {
        let w = font.measure(word).width;
        if !line.is_empty() && line_w + space + w > width {
            lines.push(std::mem::take(&mut line));
            line_w = 0;
        }
        if !line.is_empty() {
            line_w += space;
        }
        line_w += w;
        line.push(word);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

// ---------------------------------------------------------------------------
// TextBlock
// ---------------------------------------------------------------------------

/// A panel of word-wrapped text, optionally centred along either axis.
pub struct TextBlock {
    text: String,
    color: Color,
    font: Rc<dyn FontService>,
    center_h: bool,
    center_v: bool,
}

impl TextBlock {
    /// White, top-left aligned text.
    pub fn new(text: impl Into<String>, font: Rc<dyn FontService>) -> Self {
        Self {
            text: text.into(),
            color: Color::WHITE,
            font,
            center_h: false,
            center_v: false,
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Centre each line horizontally and/or the whole block vertically.
    pub fn centered(mut self, horizontal: bool, vertical: bool) -> Self {
        self.center_h = horizontal;
        self.center_v = vertical;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn color(&self) -> Color {
        self.color
    }

    /// Replace the text. Returns `true` if it changed.
    pub fn replace_text(&mut self, text: &str) -> bool {
        if self.text == text {
            return false;
        }
        self.text = text.to_owned();
        true
    }

    /// Replace the text of the block at `id`, redrawing it if it changed.
    pub fn set_text(tree: &mut Tree, id: NodeId, text: &str) {
        if tree.widget_mut::<TextBlock>(id).is_some_and(|b| b.replace_text(text)) {
            tree.mark_dirty(id);
        }
    }

    /// Replace the colour of the block at `id`.
    pub fn set_color(tree: &mut Tree, id: NodeId, color: Color) {
        let Some(block) = tree.widget_mut::<TextBlock>(id) else {
            return;
        };
        if block.color != color {
            block.color = color;
            tree.mark_dirty(id);
        }
    }
}

impl Widget for TextBlock {
    fn widget_type(&self) -> &str {
        "TextBlock"
    }

    fn compose(&mut self, _node: &NodeData, canvas: &mut Canvas<'_>) -> bool {
        let area = canvas.size();
        if area.is_empty() {
            return false;
        }
        let font = self.font.as_ref();
        let lines = wrap(font, &self.text, area.width);
        let line_h = font.line_height();
        let space = font.space_width();

        let mut y = 0;
        if self.center_v {
            y = ((area.height - line_h * lines.len() as i32) / 2).max(0);
        }
        let mut drawn = false;
        for line in &lines {
            let widths: Vec<i32> = line.iter().map(|w| font.measure(w).width).collect();
            let line_w = widths.iter().sum::<i32>() + space * (line.len() as i32 - 1);
            let mut x = if self.center_h { ((area.width - line_w) / 2).max(0) } else { 0 };
            for (word, w) in line.iter().zip(widths) {
                canvas.blit(&font.render(word, self.color), Offset::new(x, y));
                x += w + space;
                drawn = true;
            }
            y += line_h;
        }
        drawn
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

// ===========================================================================
// Tests
// ===========================================================================
