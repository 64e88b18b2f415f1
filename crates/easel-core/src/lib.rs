//! Easel Core Library
//!
//! Platform-agnostic tool state machine and stroke pipeline for an
//! embeddable drawing surface with a draft (preview) layer and a final
//! (committed) layer.

pub mod easel;
pub mod error;
pub mod input;
pub mod options;
pub mod settings;
pub mod simplify;
pub mod style;
pub mod surface;
pub mod tools;
pub mod viewport;

/// Ordered sequence of sampled points in surface coordinates.
pub type Path = Vec<kurbo::Point>;

pub use easel::{CommittedStroke, Easel};
pub use error::{EaselError, EaselResult};
pub use input::{MouseButton, PointerEvent, TouchPhase};
pub use options::EaselOptions;
pub use settings::{Brush, Setting, SettingsOverride, ToolSettings};
pub use style::{Color, ColorParseError, CompositeOp, LineCap, LineJoin};
pub use surface::{DrawCommand, DrawOp, RasterImage, RecordingSurface, Surface};
pub use tools::{ColorTarget, Tool, ToolBox, ToolKind};
pub use viewport::Viewport;

pub use kurbo::{Point, Size, Vec2};
