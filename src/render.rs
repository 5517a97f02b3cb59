use std::collections::HashMap;

use image::{Rgb, RgbImage};
use imageproc::{
    drawing::{draw_filled_circle_mut, draw_filled_rect_mut},
    rect::Rect,
};
use tracing::debug;

use crate::builder::{ModuleKind, QR, QUIET_ZONE_WIDTH};
use crate::common::error::{QRError, QRResult};
use crate::common::metadata::Color;

// Render options
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Shape {
    Square,
    Circle,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum ColorMode {
    Mono,
    // Distinct color per module kind
    Debug,
}

#[derive(Debug, Clone)]
pub struct RenderOptions {
    quiet_zone: u32,
    scale: u32,
    default_shape: Shape,
    shape_overrides: HashMap<ModuleKind, Shape>,
    color_mode: ColorMode,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            quiet_zone: QUIET_ZONE_WIDTH as u32,
            scale: DEFAULT_SCALE,
            default_shape: Shape::Square,
            shape_overrides: HashMap::new(),
            color_mode: ColorMode::Mono,
        }
    }
}

impl RenderOptions {
    pub fn quiet_zone(mut self, modules: u32) -> Self {
        self.quiet_zone = modules;
        self
    }

    /// Pixels per module side. Zero is rejected.
    pub fn scale(mut self, scale: u32) -> QRResult<Self> {
        if scale == 0 {
            return Err(QRError::InvalidScale);
        }
        self.scale = scale;
        Ok(self)
    }

    pub fn default_shape(mut self, shape: Shape) -> Self {
        self.default_shape = shape;
        self
    }

    pub fn color_mode(mut self, mode: ColorMode) -> Self {
        self.color_mode = mode;
        self
    }

    /// Overrides the shape of one module kind. Circular finders are rejected since scanners
    /// locate the symbol by them.
    pub fn set_shape(mut self, kind: ModuleKind, shape: Shape) -> QRResult<Self> {
        if kind == ModuleKind::Finder && shape == Shape::Circle {
            return Err(QRError::InvalidShape);
        }
        self.shape_overrides.insert(kind, shape);
        Ok(self)
    }

    pub fn shape_of(&self, kind: ModuleKind) -> Shape {
        match self.shape_overrides.get(&kind) {
            Some(&s) => s,
            None if kind == ModuleKind::Finder => Shape::Square,
            None => self.default_shape,
        }
    }

    pub fn image_size(&self, qr_width: usize) -> u32 {
        (qr_width as u32 + 2 * self.quiet_zone) * self.scale
    }
}


// Render
//------------------------------------------------------------------------------

impl QR {
    pub fn render(&self, opts: &RenderOptions) -> QRResult<RgbImage> {
        if !self.is_finalized() {
            return Err(QRError::InvalidState("render requires a finalized symbol"));
        }

        let w = self.width();
        let total_sz = opts.image_size(w);
        debug!(width = w, image_size = total_sz, mode = ?opts.color_mode, "Rendering QR");

        let mut canvas = RgbImage::from_pixel(total_sz, total_sz, Rgb([255, 255, 255]));
        let sz = opts.scale;
        let radius = (sz / 2) as i32;
        for r in 0..w {
            for c in 0..w {
                let m = self.get(r as i16, c as i16);
                let pixel = match opts.color_mode {
                    ColorMode::Mono if m.color == Color::Light => continue,
                    ColorMode::Mono => Rgb([0, 0, 0]),
                    ColorMode::Debug => debug_color(m.kind, m.color),
                };

                let x = (c as u32 + opts.quiet_zone) * sz;
                let y = (r as u32 + opts.quiet_zone) * sz;
                match opts.shape_of(m.kind) {
                    Shape::Square => {
                        let rect = Rect::at(x as i32, y as i32).of_size(sz, sz);
                        draw_filled_rect_mut(&mut canvas, rect, pixel);
                    }
                    Shape::Circle => {
                        let center = (x as i32 + radius, y as i32 + radius);
                        draw_filled_circle_mut(&mut canvas, center, radius * 4 / 5, pixel);
                    }
                }
            }
        }

        Ok(canvas)
    }
}

fn debug_color(kind: ModuleKind, color: Color) -> Rgb<u8> {
    let v = color.select(255, 0);
    match kind {
        ModuleKind::None => Rgb([200, 200, 200]),
        ModuleKind::Finder | ModuleKind::Dark => Rgb([0, 0, v]),
        ModuleKind::Separator => Rgb([255, 255, 255]),
        ModuleKind::Timing => Rgb([0, v, 0]),
        ModuleKind::Data => Rgb([v, v, v]),
        ModuleKind::Format => Rgb([v, v, 0]),
        ModuleKind::Version => Rgb([v, 0, 255]),
    }
}


// Global constants
//------------------------------------------------------------------------------

static DEFAULT_SCALE: u32 = 10;
