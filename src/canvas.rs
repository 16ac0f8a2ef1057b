//! Freehand drawing surface.
//!
//! A fixed 300×300 raster that starts out opaque white. Strokes are round
//! capped; the eraser removes pigment (destination-out) instead of painting
//! white. Nothing but pixels is kept: no strokes, no undo.

use std::io::Cursor;

use image::{ImageFormat, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::{ConfettiError, ConfettiResult};

pub const CANVAS_SIZE: u32 = 300;
pub const MIN_WIDTH: u32 = 1;
pub const MAX_WIDTH: u32 = 20;
pub const DEFAULT_WIDTH: u32 = 3;
pub const MAX_EVENTS: usize = 100_000;

pub const PALETTE: [&str; 12] = [
    "#000000", "#FF0000", "#00FF00", "#0000FF", "#FFFF00", "#FF00FF",
    "#00FFFF", "#FFA500", "#800080", "#FFC0CB", "#A52A2A", "#808080",
];

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
const ERASED: Rgba<u8> = Rgba([0, 0, 0, 0]);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Point {
        Point { x, y }
    }

    /// Center of the pixel this point falls in, kept inside the canvas.
    fn cell_center(self) -> (f32, f32) {
        let clamp = |v: f32| {
            if v.is_finite() {
                v.clamp(0.0, (CANVAS_SIZE - 1) as f32).floor() + 0.5
            } else {
                0.5
            }
        };
        (clamp(self.x), clamp(self.y))
    }
}

/// One recorded input, as sent by the browser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CanvasEvent {
    Down { x: f32, y: f32 },
    Move { x: f32, y: f32 },
    Up,
    Leave,
    Color { value: String },
    Width { value: u32 },
    Eraser { on: bool },
    Clear,
}

pub struct DrawingSurface {
    buffer: RgbaImage,
    color: Rgba<u8>,
    width: u32,
    eraser: bool,
    cursor: Option<Point>,
}

impl Default for DrawingSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl DrawingSurface {
    pub fn new() -> DrawingSurface {
        DrawingSurface {
            buffer: RgbaImage::from_pixel(CANVAS_SIZE, CANVAS_SIZE, WHITE),
            color: BLACK,
            width: DEFAULT_WIDTH,
            eraser: false,
            cursor: None,
        }
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.buffer
    }

    pub fn is_drawing(&self) -> bool {
        self.cursor.is_some()
    }

    pub fn color(&self) -> Rgba<u8> {
        self.color
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn eraser(&self) -> bool {
        self.eraser
    }

    /// Picks a stroke color (`#RRGGBB`). Picking a color leaves eraser mode.
    pub fn set_color(&mut self, hex: &str) -> ConfettiResult<()> {
        self.color = parse_hex(hex)?;
        self.eraser = false;
        Ok(())
    }

    pub fn set_width(&mut self, width: u32) {
        self.width = width.clamp(MIN_WIDTH, MAX_WIDTH);
    }

    pub fn set_eraser(&mut self, on: bool) {
        self.eraser = on;
    }

    pub fn pointer_down(&mut self, at: Point) {
        if self.cursor.is_some() {
            return;
        }
        self.cursor = Some(at);
        self.stroke(at, at);
    }

    pub fn pointer_move(&mut self, to: Point) {
        let Some(from) = self.cursor else {
            return;
        };
        self.stroke(from, to);
        self.cursor = Some(to);
    }

    pub fn pointer_up(&mut self) {
        self.cursor = None;
    }

    pub fn pointer_leave(&mut self) {
        self.cursor = None;
    }

    pub fn clear(&mut self) {
        for pixel in self.buffer.pixels_mut() {
            *pixel = WHITE;
        }
    }

    pub fn export_png(&self) -> ConfettiResult<Vec<u8>> {
        let mut buf = Vec::new();
        self.buffer.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
        Ok(buf)
    }

    pub fn apply(&mut self, event: &CanvasEvent) -> ConfettiResult<()> {
        use CanvasEvent::*;
        match event {
            Down { x, y } => self.pointer_down(Point::new(*x, *y)),
            Move { x, y } => self.pointer_move(Point::new(*x, *y)),
            Up => self.pointer_up(),
            Leave => self.pointer_leave(),
            Color { value } => self.set_color(value)?,
            Width { value } => self.set_width(*value),
            Eraser { on } => self.set_eraser(*on),
            Clear => self.clear(),
        }
        Ok(())
    }

    pub fn replay(&mut self, events: &[CanvasEvent]) -> ConfettiResult<()> {
        if events.len() > MAX_EVENTS {
            return Err(ConfettiError::validation(format!(
                "drawing has {} events, at most {MAX_EVENTS} allowed",
                events.len()
            )));
        }
        events.iter().try_for_each(|event| self.apply(event))
    }

    fn stroke(&mut self, from: Point, to: Point) {
        let (ax, ay) = from.cell_center();
        let (bx, by) = to.cell_center();
        let radius = self.width as f32 / 2.0;
        let ink = if self.eraser { ERASED } else { self.color };

        let lo = |a: f32, b: f32| (a.min(b) - radius).floor().max(0.0) as u32;
        let hi = |a: f32, b: f32| ((a.max(b) + radius).ceil() as u32).min(CANVAS_SIZE - 1);

        for py in lo(ay, by)..=hi(ay, by) {
            for px in lo(ax, bx)..=hi(ax, bx) {
                let center = (px as f32 + 0.5, py as f32 + 0.5);
                if distance_to_segment(center, (ax, ay), (bx, by)) <= radius + 1e-4 {
                    self.buffer.put_pixel(px, py, ink);
                }
            }
        }
    }
}

fn distance_to_segment(p: (f32, f32), a: (f32, f32), b: (f32, f32)) -> f32 {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len2 = dx * dx + dy * dy;
    let t = if len2 == 0.0 {
        0.0
    } else {
        (((p.0 - a.0) * dx + (p.1 - a.1) * dy) / len2).clamp(0.0, 1.0)
    };
    let (cx, cy) = (a.0 + t * dx, a.1 + t * dy);
    ((p.0 - cx).powi(2) + (p.1 - cy).powi(2)).sqrt()
}

fn parse_hex(hex: &str) -> ConfettiResult<Rgba<u8>> {
    let bad = || ConfettiError::validation(format!("not a #RRGGBB color: {hex:?}"));
    let digits = hex.strip_prefix('#').ok_or_else(bad)?;
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(bad());
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| bad());
    Ok(Rgba([channel(0)?, channel(2)?, channel(4)?, 255]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn changed(surface: &DrawingSurface) -> Vec<(u32, u32)> {
        surface
            .pixels()
            .enumerate_pixels()
            .filter(|(_, _, p)| **p != WHITE)
            .map(|(x, y, _)| (x, y))
            .collect()
    }

    #[test]
    fn starts_white_with_defaults() {
        let surface = DrawingSurface::new();
        assert!(changed(&surface).is_empty());
        assert_eq!(surface.pixels().dimensions(), (CANVAS_SIZE, CANVAS_SIZE));
        assert_eq!(surface.width(), DEFAULT_WIDTH);
        assert_eq!(surface.color(), BLACK);
        assert!(!surface.eraser());
    }

    #[test]
    fn single_thin_dab_paints_only_its_pixel() {
        let mut surface = DrawingSurface::new();
        surface.set_width(1);
        surface.pointer_down(Point::new(10.3, 20.7));
        assert_eq!(changed(&surface), [(10, 20)]);
        assert_eq!(*surface.pixels().get_pixel(10, 20), BLACK);
    }

    #[test]
    fn default_dab_is_round_and_centered() {
        let mut surface = DrawingSurface::new();
        surface.pointer_down(Point::new(50.0, 50.0));
        let painted = changed(&surface);
        assert_eq!(painted.len(), 9);
        assert!(painted.iter().all(|&(x, y)| x.abs_diff(50) <= 1 && y.abs_diff(50) <= 1));
    }

    #[test]
    fn move_without_down_paints_nothing() {
        let mut surface = DrawingSurface::new();
        surface.pointer_move(Point::new(20.0, 20.0));
        assert!(changed(&surface).is_empty());
        assert!(!surface.is_drawing());
    }

    #[test]
    fn stroke_joins_points_until_released() {
        let mut surface = DrawingSurface::new();
        surface.set_width(1);
        surface.pointer_down(Point::new(10.0, 10.0));
        surface.pointer_move(Point::new(20.0, 10.0));
        let painted = changed(&surface);
        assert_eq!(painted.len(), 11);
        assert!(painted.iter().all(|&(_, y)| y == 10));

        surface.pointer_up();
        surface.pointer_move(Point::new(20.0, 40.0));
        assert_eq!(changed(&surface).len(), 11);
    }

    #[test]
    fn leaving_the_surface_ends_the_stroke() {
        let mut surface = DrawingSurface::new();
        surface.pointer_down(Point::new(100.0, 100.0));
        surface.pointer_leave();
        let before = changed(&surface).len();
        surface.pointer_move(Point::new(200.0, 200.0));
        assert_eq!(changed(&surface).len(), before);
    }

    #[test]
    fn second_down_during_a_stroke_is_ignored() {
        let mut surface = DrawingSurface::new();
        surface.set_width(1);
        surface.pointer_down(Point::new(10.0, 10.0));
        surface.pointer_down(Point::new(200.0, 200.0));
        surface.pointer_move(Point::new(12.0, 10.0));
        assert_eq!(changed(&surface), [(10, 10), (11, 10), (12, 10)]);
    }

    #[test]
    fn eraser_removes_pigment_instead_of_painting() {
        let mut surface = DrawingSurface::new();
        surface.set_width(5);
        surface.pointer_down(Point::new(30.0, 30.0));
        surface.pointer_move(Point::new(60.0, 30.0));
        surface.pointer_up();

        surface.set_eraser(true);
        surface.set_width(1);
        surface.pointer_down(Point::new(45.0, 30.0));
        surface.pointer_up();

        let erased = surface.pixels().get_pixel(45, 30);
        assert_eq!(erased.0[3], 0);
        assert_ne!(*erased, BLACK);
        assert_eq!(*surface.pixels().get_pixel(44, 30), BLACK);
    }

    #[test]
    fn clear_restores_white_everywhere() {
        let mut surface = DrawingSurface::new();
        surface.pointer_down(Point::new(5.0, 5.0));
        surface.pointer_up();
        surface.set_eraser(true);
        surface.pointer_down(Point::new(100.0, 100.0));
        surface.pointer_up();

        surface.clear();
        let png = surface.export_png().unwrap();
        let exported = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(exported.dimensions(), (CANVAS_SIZE, CANVAS_SIZE));
        assert!(exported.pixels().all(|p| *p == WHITE));
    }

    #[test]
    fn export_leaves_the_buffer_alone() {
        let mut surface = DrawingSurface::new();
        surface.pointer_down(Point::new(150.0, 150.0));
        let before = surface.pixels().clone();
        let png = surface.export_png().unwrap();
        assert_eq!(surface.pixels(), &before);
        assert_eq!(image::load_from_memory(&png).unwrap().to_rgba8(), before);
    }

    #[test]
    fn picking_a_color_leaves_eraser_mode() {
        let mut surface = DrawingSurface::new();
        surface.set_eraser(true);
        surface.set_color(PALETTE[1]).unwrap();
        assert!(!surface.eraser());
        assert_eq!(surface.color(), Rgba([255, 0, 0, 255]));

        assert!(surface.set_color("red").is_err());
        assert!(surface.set_color("#12345").is_err());
        assert!(surface.set_color("#GG0000").is_err());
        assert!(surface.set_color("#+F+F+F").is_err());
        assert!(surface.set_color("#-1-1-1").is_err());
    }

    #[test]
    fn width_is_clamped() {
        let mut surface = DrawingSurface::new();
        surface.set_width(0);
        assert_eq!(surface.width(), MIN_WIDTH);
        surface.set_width(500);
        assert_eq!(surface.width(), MAX_WIDTH);
    }

    #[test]
    fn out_of_bounds_points_are_clamped() {
        let mut surface = DrawingSurface::new();
        surface.set_width(1);
        surface.pointer_down(Point::new(-40.0, 9000.0));
        assert_eq!(changed(&surface), [(0, CANVAS_SIZE - 1)]);
    }

    #[test]
    fn replay_reads_recorded_events() {
        let events: Vec<CanvasEvent> = serde_json::from_str(
            r##"[
                {"kind":"color","value":"#0000FF"},
                {"kind":"width","value":1},
                {"kind":"down","x":3,"y":4},
                {"kind":"move","x":5,"y":4},
                {"kind":"up"}
            ]"##,
        )
        .unwrap();

        let mut surface = DrawingSurface::new();
        surface.replay(&events).unwrap();
        assert_eq!(changed(&surface), [(3, 4), (4, 4), (5, 4)]);
        assert_eq!(*surface.pixels().get_pixel(4, 4), Rgba([0, 0, 255, 255]));
        assert!(!surface.is_drawing());
    }

    #[test]
    fn replay_rejects_bad_colors() {
        let mut surface = DrawingSurface::new();
        let events = [CanvasEvent::Color { value: "#nothex".into() }];
        assert!(matches!(surface.replay(&events), Err(ConfettiError::Validation(_))));
    }
}
