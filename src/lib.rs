// MIT/Apache2 License

//! A retained-mode 2D vector drawing engine.
//!
//! Drawing happens through a [`Context`], which keeps a stack of drawing parameters and builds paths in user
//! space. Paint comes from a [`Pattern`] and lands on a [`Surface`], which hands the actual pixel work to a
//! [`SurfaceBackend`]. The in-memory [`ImageSurface`] backend is available with the `image` feature.

mod error;

pub mod color;
pub mod compositor;
pub mod gradient;
pub mod intensity;
pub mod pattern;
pub mod surface;

mod context;
mod state;

#[cfg(feature = "image")]
pub mod image;

pub use color::*;
pub use compositor::*;
pub use context::*;
pub use error::*;
pub use gradient::*;
pub use intensity::*;
pub use pattern::*;
pub use surface::*;

#[cfg(feature = "image")]
pub use image::{Format, ImageSurface};

pub use easel_geometry as geometry;
pub use easel_geometry::{
    Antialias, Clip, FillRule, LineCap, LineJoin, Matrix, Operator, PathFixed, Rectangle,
    RectangleF,
};
