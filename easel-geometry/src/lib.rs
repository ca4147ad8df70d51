// MIT/Apache2 License

//! Contains the geometry used by the `easel` crate: fixed point numbers and the boxes built from them, affine
//! matrices, paths stored in backend space, polygons and pixel regions, the clip, and the stroker that turns
//! stroked paths into fillable polygons.
//!
//! Everything in here works in backend space unless noted otherwise. Backend space coordinates are stored as
//! 24.8 fixed point numbers, which keeps path building exact and cheap to compare, and are converted to floating
//! point only at the edges (flattening, polygon building and rasterisation).

#![no_std]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::must_use_candidate)]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

mod clip;
pub use clip::*;

mod composite;
pub use composite::*;

mod curve;
pub use curve::*;

mod fixed;
pub use fixed::*;

mod matrix;
pub use matrix::*;

mod path;
pub use path::*;

mod polygon;
pub use polygon::*;

mod rect;
pub use rect::*;

mod region;
pub use region::*;

mod slope;
pub use slope::*;

mod stroke;
pub use stroke::*;

pub use lyon_geom::point;
pub use lyon_path::{FillRule, LineCap, LineJoin};

/// A point in backend space, in floating point.
pub type DevicePoint = lyon_geom::Point<f64>;
