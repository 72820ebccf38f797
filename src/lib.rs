#![deny(bare_trait_objects)]

//! Tessellation of arbitrary 2D polygons — self-intersecting, multi-contour,
//! odd or non-zero filled — into contours a rasterizer can consume directly:
//! monotone polygons, convex polygons, or triangles.
//!
//! # Overview
//!
//! The input polygon is loaded into a half-edge mesh ([`mesh`]), all its
//! vertices are queued in sweep order ([`event_queue`]), and a Bentley-Ottmann
//! style sweep ([`active_region`] and the sweep module) partitions the plane
//! into regions of constant winding number, splitting edges at intersections
//! along the way and repairing the inevitable numerical disagreements
//! combinatorially. Faces whose winding is interior under the fill rule are
//! then y-monotone by construction; they are triangulated in place and,
//! in the default mode, greedily merged back into convex polygons.
//!
//! Results are delivered through a [`ContourReceiver`]: one callback per
//! closed contour, over a point buffer that is reused between calls.
//!
//! # Example
//!
//! ```
//! use polytess::{point, ContourBuffers, Options, Polygon, Tessellator};
//!
//! // Two nested squares with the default odd fill rule: an annulus.
//! let mut polygon = Polygon::new();
//! polygon.add_contour(&[
//!     point(0.0, 0.0),
//!     point(10.0, 0.0),
//!     point(10.0, 10.0),
//!     point(0.0, 10.0),
//! ]);
//! polygon.add_contour(&[
//!     point(2.0, 2.0),
//!     point(2.0, 8.0),
//!     point(8.0, 8.0),
//!     point(8.0, 2.0),
//! ]);
//!
//! let mut tess = Tessellator::new();
//! let mut buffers = ContourBuffers::new();
//! let bounds = polygon.bounds();
//! tess.tessellate(&polygon, &bounds, &Options::default(), &mut buffers)
//!     .unwrap();
//! assert!(!buffers.contours.is_empty());
//! ```

pub mod active_region;
mod convex;
pub mod event_queue;
pub mod geom;
pub mod math;
pub mod mesh;
mod monotone;
pub mod output;
pub mod polygon;
mod sweep;
mod tessellator;


pub use crate::math::{point, vector, Box2D, Point, Vector};
pub use crate::output::{ContourBuffers, ContourReceiver, Index, MAX_CONTOUR_POINTS};
pub use crate::polygon::{Polygon, PolygonBuilder};
pub use crate::tessellator::Tessellator;

/// Tells how the winding number of a region decides whether it is filled.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum FillRule {
    /// Filled iff the winding number is odd.
    EvenOdd,
    /// Filled iff the winding number is not zero.
    NonZero,
}

impl FillRule {
    #[inline]
    pub fn is_in(self, winding: i16) -> bool {
        match self {
            FillRule::EvenOdd => winding % 2 != 0,
            FillRule::NonZero => winding != 0,
        }
    }
}

/// The kind of contours the tessellator emits.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum OutputMode {
    /// Convex polygons (triangles merged where convexity allows).
    Convex,
    /// The raw monotone regions of the sweep.
    Monotone,
    /// Triangles only.
    Triangulation,
}

/// Parameters for a tessellation pass.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Options {
    pub fill_rule: FillRule,
    pub output_mode: OutputMode,
}

impl Options {
    pub const DEFAULT: Options = Options {
        fill_rule: FillRule::EvenOdd,
        output_mode: OutputMode::Convex,
    };

    pub fn even_odd() -> Self {
        Options::DEFAULT
    }

    pub fn non_zero() -> Self {
        Options {
            fill_rule: FillRule::NonZero,
            ..Options::DEFAULT
        }
    }

    pub fn with_fill_rule(mut self, fill_rule: FillRule) -> Self {
        self.fill_rule = fill_rule;
        self
    }

    pub fn with_output_mode(mut self, output_mode: OutputMode) -> Self {
        self.output_mode = output_mode;
        self
    }
}

impl Default for Options {
    fn default() -> Self {
        Options::DEFAULT
    }
}

/// Number of contours and points handed to the receiver.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Count {
    pub contours: u32,
    pub points: u32,
}

/// Broken invariants inside the engine itself. Seeing one of these is a bug
/// in the tessellator, not in the input.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InternalError {
    /// The active region list was out of order after all repairs ran.
    InconsistentRegionOrder,
}

/// The error type for [`Tessellator::tessellate`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TessellationError {
    /// An output contour exceeded [`MAX_CONTOUR_POINTS`].
    TooManyVertices,
    Internal(InternalError),
}

/// Alias for the result of tessellation operations.
pub type TessellationResult = Result<Count, TessellationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_rules() {
        assert!(!FillRule::EvenOdd.is_in(0));
        assert!(FillRule::EvenOdd.is_in(1));
        assert!(FillRule::EvenOdd.is_in(-1));
        assert!(!FillRule::EvenOdd.is_in(2));
        assert!(!FillRule::NonZero.is_in(0));
        assert!(FillRule::NonZero.is_in(2));
        assert!(FillRule::NonZero.is_in(-2));
    }

    #[test]
    fn default_options() {
        let options = Options::default();
        assert_eq!(options.fill_rule, FillRule::EvenOdd);
        assert_eq!(options.output_mode, OutputMode::Convex);
    }
}
