//! BoardView: draws a board snapshot plus animator state into a framebuffer.
//!
//! This module is pure (no I/O). It can be unit-tested.

use crate::animator::{Overlay, TileSprite};
use crate::core::BoardSnapshot;
use crate::fb::{CellStyle, FrameBuffer, Rgb};
use crate::input::BoardLayout;
use crate::types::{Position, TileKind};

const BOARD_BG: Rgb = Rgb::new(30, 30, 40);
const SELECT_BG: Rgb = Rgb::new(110, 110, 140);
const HINT_BG: Rgb = Rgb::new(90, 70, 20);
const PANEL_MIN_W: u16 = 12;

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// Centered message drawn over the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Banner {
    #[default]
    None,
    NoMoves,
    GameOver,
}

impl Banner {
    fn text(self) -> Option<&'static str> {
        match self {
            Banner::None => None,
            Banner::NoMoves => Some("NO MOVES LEFT - r to restart"),
            Banner::GameOver => Some("GAME OVER - r to restart"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Hud {
    pub score: u32,
    pub seconds_left: u32,
    pub waves: u32,
    pub banner: Banner,
}

/// Everything needed to draw one frame.
#[derive(Debug, Clone, Copy)]
pub struct Scene<'a> {
    pub board: &'a BoardSnapshot,
    pub sprites: &'a [TileSprite],
    pub overlay: &'a Overlay,
    pub hud: Hud,
}

pub struct BoardView {
    /// Board cell width in terminal columns.
    cell_w: u16,
    /// Board cell height in terminal rows.
    cell_h: u16,
}

impl Default for BoardView {
    fn default() -> Self {
        // 4x2 keeps tiles roughly square in most fonts.
        Self {
            cell_w: 4,
            cell_h: 2,
        }
    }
}

impl BoardView {
    pub fn new(cell_w: u16, cell_h: u16) -> Self {
        Self {
            cell_w: cell_w.max(1),
            cell_h: cell_h.max(1),
        }
    }

    /// Where the board sits in `viewport`. The pointer tracker must use the
    /// same layout so clicks land on the tile drawn under them.
    pub fn layout(&self, viewport: Viewport, width: usize, height: usize) -> BoardLayout {
        let mut layout = BoardLayout::new(width, height, i32::from(self.cell_w), i32::from(self.cell_h))
            .centered(viewport.width, viewport.height, 1);
        // leave room for the border
        layout.origin_x = layout.origin_x.max(1);
        layout.origin_y = layout.origin_y.max(1);
        layout
    }

    /// Render into an existing framebuffer, resizing it to the viewport.
    pub fn render_into(&self, scene: &Scene<'_>, viewport: Viewport, fb: &mut FrameBuffer) {
        fb.resize(viewport.width, viewport.height);
        fb.clear(CellStyle::default().cell(' '));

        let layout = self.layout(viewport, scene.board.width, scene.board.height);
        let (board_w, board_h) = layout.screen_size();

        let border = CellStyle::with_colors(Rgb::new(200, 200, 200), Rgb::new(0, 0, 0));
        fb.fill_rect_clipped(
            layout.origin_x,
            layout.origin_y,
            board_w,
            board_h,
            ' ',
            CellStyle::with_colors(BOARD_BG, BOARD_BG),
        );
        draw_border(
            fb,
            layout.origin_x - 1,
            layout.origin_y - 1,
            board_w + 2,
            board_h + 2,
            border,
        );

        for (pos, amount) in &scene.overlay.selections {
            self.tint_cell(fb, &layout, *pos, BOARD_BG.lerp(SELECT_BG, *amount));
        }
        if let Some((a, b)) = scene.overlay.highlight {
            self.tint_cell(fb, &layout, a, HINT_BG);
            self.tint_cell(fb, &layout, b, HINT_BG);
        }

        for tile in &scene.board.tiles {
            if tile.kind.is_empty() {
                self.draw_empty_cell(fb, &layout, tile.pos);
            }
        }
        for sprite in scene.sprites {
            self.draw_sprite(fb, &layout, sprite);
        }

        self.draw_side_panel(fb, &scene.hud, viewport, &layout);
        self.draw_status_line(fb, viewport);

        if let Some(text) = scene.hud.banner.text() {
            draw_overlay_text(fb, &layout, text);
        }
    }

    /// Convenience helper that allocates a new framebuffer.
    pub fn render(&self, scene: &Scene<'_>, viewport: Viewport) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(scene, viewport, &mut fb);
        fb
    }

    fn tint_cell(&self, fb: &mut FrameBuffer, layout: &BoardLayout, pos: Position, bg: Rgb) {
        if let Some((x, y)) = layout.screen_from_position(pos) {
            fb.fill_rect_clipped(
                x,
                y,
                layout.cell_w,
                layout.cell_h,
                ' ',
                CellStyle::with_colors(bg, bg),
            );
        }
    }

    fn draw_empty_cell(&self, fb: &mut FrameBuffer, layout: &BoardLayout, pos: Position) {
        if let Some((x, y)) = layout.screen_from_position(pos) {
            let style = CellStyle {
                dim: true,
                ..CellStyle::with_colors(Rgb::new(90, 90, 100), BOARD_BG)
            };
            put_keep_bg(
                fb,
                x + layout.cell_w / 2,
                y + layout.cell_h / 2,
                '·',
                style,
                None,
            );
        }
    }

    fn draw_sprite(&self, fb: &mut FrameBuffer, layout: &BoardLayout, sprite: &TileSprite) {
        if sprite.scale < 0.3 {
            return;
        }
        let (fg, glyph) = tile_look(sprite.kind);
        let style = CellStyle {
            bold: sprite.kind.is_special_by_default(),
            ..CellStyle::with_colors(fg, BOARD_BG)
        };
        let x = layout.origin_x + (sprite.col * layout.cell_w as f32).round() as i32;
        let y = layout.origin_y + (sprite.row * layout.cell_h as f32).round() as i32;
        let clip = Some(layout);

        if sprite.scale < 0.7 {
            put_keep_bg(fb, x + layout.cell_w / 2, y + layout.cell_h / 2, '▪', style, clip);
            return;
        }

        // one column of padding each side when the cell is wide enough
        let pad = if layout.cell_w > 2 { 1 } else { 0 };
        for dy in 0..layout.cell_h {
            let mut chars = glyph.chars().cycle();
            for dx in pad..layout.cell_w - pad {
                let ch = chars.next().unwrap_or(' ');
                put_keep_bg(fb, x + dx, y + dy, ch, style, clip);
            }
        }
    }

    fn draw_side_panel(&self, fb: &mut FrameBuffer, hud: &Hud, viewport: Viewport, layout: &BoardLayout) {
        let (board_w, _) = layout.screen_size();
        let panel_x = layout.origin_x + board_w + 3;
        if panel_x < 0 || panel_x >= i32::from(viewport.width) {
            return;
        }
        let panel_x = panel_x as u16;
        if viewport.width - panel_x < PANEL_MIN_W {
            return;
        }

        let label = CellStyle::default().bold();
        let value = CellStyle::with_colors(Rgb::new(200, 200, 200), Rgb::new(0, 0, 0));

        let mut y = layout.origin_y.max(0) as u16;
        for (name, n) in [
            ("SCORE", hud.score),
            ("TIME", hud.seconds_left),
            ("WAVES", hud.waves),
        ] {
            fb.put_str(panel_x, y, name, label);
            y = y.saturating_add(1);
            fb.put_u32(panel_x, y, n, value);
            y = y.saturating_add(2);
        }
    }

    fn draw_status_line(&self, fb: &mut FrameBuffer, viewport: Viewport) {
        if viewport.height == 0 {
            return;
        }
        let style = CellStyle {
            dim: true,
            ..CellStyle::default()
        };
        fb.put_str(
            1,
            viewport.height - 1,
            "click or drag to swap | h hint | r restart | q quit",
            style,
        );
    }
}

/// Foreground colour and body glyph of a tile.
pub fn tile_look(kind: TileKind) -> (Rgb, &'static str) {
    match kind {
        TileKind::Empty => (BOARD_BG, " "),
        TileKind::Red => (Rgb::new(220, 80, 80), "█"),
        TileKind::Blue => (Rgb::new(80, 120, 220), "█"),
        TileKind::Green => (Rgb::new(100, 220, 120), "█"),
        TileKind::LightBlue => (Rgb::new(80, 220, 220), "█"),
        TileKind::Yellow => (Rgb::new(240, 220, 80), "█"),
        TileKind::Pink => (Rgb::new(240, 130, 200), "█"),
        TileKind::AnyColor => (Rgb::new(255, 255, 255), "◆"),
        TileKind::Cross => (Rgb::new(255, 165, 0), "╋"),
        TileKind::Vertical => (Rgb::new(255, 165, 0), "┃"),
        TileKind::Horizontal => (Rgb::new(255, 165, 0), "━"),
        TileKind::PlusTime => (Rgb::new(120, 240, 240), "+T"),
        TileKind::DoublePoints => (Rgb::new(240, 220, 80), "x2"),
    }
}

/// Write a glyph but keep whatever background is already there, so tiles
/// sit on top of selection tints. With `clip`, nothing outside the board is
/// touched.
fn put_keep_bg(
    fb: &mut FrameBuffer,
    x: i32,
    y: i32,
    ch: char,
    style: CellStyle,
    clip: Option<&BoardLayout>,
) {
    if let Some(layout) = clip {
        let (w, h) = layout.screen_size();
        if x < layout.origin_x || y < layout.origin_y || x >= layout.origin_x + w || y >= layout.origin_y + h {
            return;
        }
    }
    if x < 0 || y < 0 || x > i32::from(u16::MAX) || y > i32::from(u16::MAX) {
        return;
    }
    let Some(existing) = fb.get(x as u16, y as u16) else {
        return;
    };
    fb.set_clipped(
        x,
        y,
        CellStyle {
            bg: existing.style.bg,
            ..style
        }
        .cell(ch),
    );
}

fn draw_border(fb: &mut FrameBuffer, x: i32, y: i32, w: i32, h: i32, style: CellStyle) {
    if w < 2 || h < 2 {
        return;
    }

    fb.set_clipped(x, y, style.cell('┌'));
    fb.set_clipped(x + w - 1, y, style.cell('┐'));
    fb.set_clipped(x, y + h - 1, style.cell('└'));
    fb.set_clipped(x + w - 1, y + h - 1, style.cell('┘'));

    for dx in 1..w - 1 {
        fb.set_clipped(x + dx, y, style.cell('─'));
        fb.set_clipped(x + dx, y + h - 1, style.cell('─'));
    }
    for dy in 1..h - 1 {
        fb.set_clipped(x, y + dy, style.cell('│'));
        fb.set_clipped(x + w - 1, y + dy, style.cell('│'));
    }
}

fn draw_overlay_text(fb: &mut FrameBuffer, layout: &BoardLayout, text: &str) {
    let (w, h) = layout.screen_size();
    let text_w = text.chars().count() as i32;
    let x = layout.origin_x + ((w - text_w) / 2).max(0);
    let y = layout.origin_y + h / 2;
    if x < 0 || y < 0 {
        return;
    }
    let style = CellStyle::with_colors(Rgb::new(255, 255, 255), Rgb::new(0, 0, 0)).bold();
    fb.put_str(x as u16, y as u16, text, style);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animator::TerminalAnimator;
    use crate::core::Grid;
    use std::time::Instant;

    fn frame(layout: &str, hud: Hud, viewport: Viewport) -> (FrameBuffer, BoardLayout) {
        let board = Grid::from_layout(layout).unwrap().snapshot();
        let anim = TerminalAnimator::new(board.height);
        let now = Instant::now();
        let mut sprites = Vec::new();
        anim.sprites_into(&board, now, &mut sprites);
        let overlay = anim.overlay(now);
        let view = BoardView::default();
        let scene = Scene {
            board: &board,
            sprites: &sprites,
            overlay: &overlay,
            hud,
        };
        let fb = view.render(&scene, viewport);
        (fb, view.layout(viewport, board.width, board.height))
    }

    #[test]
    fn test_tiles_drawn_where_pointer_maps() {
        let viewport = Viewport::new(60, 20);
        let (fb, layout) = frame("RGB\nGBY\nBR.", Hud::default(), viewport);
        let red = Position::new(0, 0);
        let (x, y) = layout.screen_from_position(red).unwrap();
        let cell = fb.get((x + 1) as u16, y as u16).unwrap();
        assert_eq!(cell.ch, '█');
        assert_eq!(cell.style.fg, tile_look(TileKind::Red).0);
        assert_eq!(layout.position_from_screen(x + 1, y), Some(red));
    }

    #[test]
    fn test_empty_slot_shows_dot() {
        let viewport = Viewport::new(60, 20);
        let (fb, layout) = frame("RGB\nGBY\nBR.", Hud::default(), viewport);
        let (x, y) = layout.screen_from_position(Position::new(2, 2)).unwrap();
        let cell = fb
            .get((x + layout.cell_w / 2) as u16, (y + layout.cell_h / 2) as u16)
            .unwrap();
        assert_eq!(cell.ch, '·');
    }

    #[test]
    fn test_border_surrounds_board() {
        let viewport = Viewport::new(40, 12);
        let (fb, layout) = frame("RGB\nGBY\nBRP", Hud::default(), viewport);
        let corner = fb
            .get((layout.origin_x - 1) as u16, (layout.origin_y - 1) as u16)
            .unwrap();
        assert_eq!(corner.ch, '┌');
    }

    #[test]
    fn test_panel_and_banner() {
        let hud = Hud {
            score: 42,
            seconds_left: 7,
            waves: 1,
            banner: Banner::GameOver,
        };
        let (fb, _) = frame("RGB\nGBY\nBRP", hud, Viewport::new(60, 20));
        let text: String = fb.cells().iter().map(|c| c.ch).collect();
        assert!(text.contains("SCORE"));
        assert!(text.contains("42"));
        assert!(text.contains("GAME OVER"));
    }

    #[test]
    fn test_tiny_viewport_does_not_panic() {
        let (fb, _) = frame("RGB\nGBY\nBRP", Hud::default(), Viewport::new(3, 2));
        assert_eq!(fb.cells().len(), 6);
    }
}
