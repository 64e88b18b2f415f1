//! Rendering surface abstraction.
//!
//! The coordinator owns two surfaces of the same size: the final surface
//! where committed marks live, and the draft surface used for previews.

use crate::settings::Brush;
use crate::style::Color;
use kurbo::{BezPath, ParamCurveNearest, Point, Rect, Shape, Size};
use serde::{Deserialize, Serialize};

/// Accuracy used when measuring the distance from a point to a curve.
const NEAREST_ACCURACY: f64 = 1e-3;

/// A 2D raster target.
///
/// Implementations can wrap a browser canvas, a GPU scene, or just record
/// what was painted.
pub trait Surface {
    /// Image type accepted by [`Surface::draw_image`].
    type Image: ?Sized;

    /// Pixel dimensions of the surface.
    fn size(&self) -> Size;

    /// Replace the current brush state.
    fn set_brush(&mut self, brush: &Brush);

    /// Stroke `path` with the current brush.
    fn stroke(&mut self, path: &BezPath);

    /// Fill `path` with the current brush.
    fn fill(&mut self, path: &BezPath);

    /// Erase every pixel to transparent.
    fn clear(&mut self);

    /// Colour of the pixel under `point`.
    fn sample(&self, point: Point) -> Color;

    /// Draw `image` with its top-left corner at `at`.
    fn draw_image(&mut self, image: &Self::Image, at: Point);

    /// The full surface rectangle.
    fn bounds(&self) -> Rect {
        self.size().to_rect()
    }
}

/// An RGBA8 pixel buffer supplied by a host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    /// Row-major RGBA, `width * height * 4` bytes.
    pub pixels: Vec<u8>,
}

impl RasterImage {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self {
            width,
            height,
            pixels,
        }
    }

    /// A single-colour image.
    pub fn filled(width: u32, height: u32, color: Color) -> Self {
        let pixels = (0..width as usize * height as usize)
            .flat_map(|_| [color.r, color.g, color.b, color.a])
            .collect();
        Self::new(width, height, pixels)
    }

    /// Pixel at integer coordinates, if in range.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.pixels.get(i..i + 4)?;
        Some(Color::new(px[0], px[1], px[2], px[3]))
    }
}

/// What a recorded command painted.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Stroke(BezPath),
    Fill(BezPath),
    Image { image: RasterImage, at: Point },
}

/// One entry of a [`RecordingSurface`] display list.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCommand {
    pub op: DrawOp,
    pub brush: Brush,
}

impl DrawCommand {
    /// Colour this command paints at `point`, if it covers it.
    fn color_at(&self, point: Point) -> Option<Color> {
        match &self.op {
            DrawOp::Fill(path) => (path.winding(point) != 0).then_some(self.brush.fill),
            DrawOp::Stroke(path) => {
                let reach = (self.brush.width / 2.0).max(0.5);
                let hit = path
                    .segments()
                    .any(|seg| seg.nearest(point, NEAREST_ACCURACY).distance_sq <= reach * reach);
                hit.then_some(self.brush.stroke)
            }
            DrawOp::Image { image, at } => {
                let local = point - *at;
                if local.x < 0.0 || local.y < 0.0 {
                    return None;
                }
                image
                    .pixel(local.x as u32, local.y as u32)
                    .filter(|c| c.a > 0)
            }
        }
    }
}

/// A surface that records every paint operation in order.
///
/// Sampling hit-tests the display list from the top down, so the colour
/// reported is that of the last operation covering the point.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    size: Size,
    brush: Brush,
    commands: Vec<DrawCommand>,
    clears: usize,
}

impl RecordingSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            size: Size::new(width, height),
            brush: Brush::default(),
            commands: Vec::new(),
            clears: 0,
        }
    }

    /// Commands painted since the last clear, oldest first.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn last_command(&self) -> Option<&DrawCommand> {
        self.commands.last()
    }

    /// How many times the surface has been cleared.
    pub fn clear_count(&self) -> usize {
        self.clears
    }

    /// The brush that the next operation would use.
    pub fn brush(&self) -> &Brush {
        &self.brush
    }

    fn push(&mut self, op: DrawOp) {
        self.commands.push(DrawCommand {
            op,
            brush: self.brush,
        });
    }
}

impl Surface for RecordingSurface {
    type Image = RasterImage;

    fn size(&self) -> Size {
        self.size
    }

    fn set_brush(&mut self, brush: &Brush) {
        self.brush = *brush;
    }

    fn stroke(&mut self, path: &BezPath) {
        self.push(DrawOp::Stroke(path.clone()));
    }

    fn fill(&mut self, path: &BezPath) {
        self.push(DrawOp::Fill(path.clone()));
    }

    fn clear(&mut self) {
        self.commands.clear();
        self.clears += 1;
    }

    fn sample(&self, point: Point) -> Color {
        if !self.bounds().contains(point) {
            return Color::TRANSPARENT;
        }
        self.commands
            .iter()
            .rev()
            .find_map(|cmd| cmd.color_at(point))
            .unwrap_or(Color::TRANSPARENT)
    }

    fn draw_image(&mut self, image: &RasterImage, at: Point) {
        self.push(DrawOp::Image {
            image: image.clone(),
            at,
        });
    }
}
