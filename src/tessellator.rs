//! The public face of the crate: feeds a polygon into the mesh, runs the
//! sweep and the output stages, and emits the resulting contours.

use crate::convex;
use crate::geom::Tolerance;
use crate::math::{Box2D, Point};
use crate::mesh::{sym, HalfEdgeId, Mesh};
use crate::monotone;
use crate::output::{self, ContourReceiver};
use crate::polygon::Polygon;
use crate::sweep::Sweeper;
use crate::{Count, Options, OutputMode, TessellationError, TessellationResult};

/// Tessellates polygons into monotone, convex or triangle contours.
///
/// A `Tessellator` owns its working memory (the mesh arenas and the output
/// buffer) and reuses it across calls; create it once and feed it as many
/// polygons as you like. It is not reentrant: the receiver must not call
/// back into the tessellator, which the borrow checker enforces anyway.
///
/// # Example
///
/// ```
/// use polytess::{Tessellator, Options, OutputMode, ContourBuffers};
/// use polytess::{Polygon, point};
///
/// let mut polygon = Polygon::new();
/// polygon.add_contour(&[
///     point(0.0, 0.0),
///     point(4.0, 0.0),
///     point(4.0, 4.0),
///     point(0.0, 4.0),
/// ]);
///
/// let mut tess = Tessellator::new();
/// let mut buffers = ContourBuffers::new();
/// let options = Options::default().with_output_mode(OutputMode::Triangulation);
/// let bounds = polygon.bounds();
///
/// let count = tess
///     .tessellate(&polygon, &bounds, &options, &mut buffers)
///     .unwrap();
/// assert_eq!(count.contours, 2);
/// for contour in &buffers.contours {
///     assert_eq!(contour.len(), 3);
/// }
/// ```
pub struct Tessellator {
    mesh: Mesh,
    buffer: Vec<Point>,
    log: bool,
}

impl Tessellator {
    pub fn new() -> Self {
        Tessellator {
            mesh: Mesh::new(),
            buffer: Vec::new(),
            log: false,
        }
    }

    /// Prints a trace of the sweep to stdout. Debug builds only.
    pub fn enable_logging(&mut self) {
        self.log = true;
    }

    /// Tessellates `polygon` and hands each output contour to `output`.
    ///
    /// `bounds` must enclose every input point; it seeds the sentinel
    /// geometry and the numerical tolerance (`Polygon::bounds` computes it
    /// if the caller doesn't track it already). Contours may have been
    /// emitted even when an error is returned; each one is individually
    /// valid.
    pub fn tessellate(
        &mut self,
        polygon: &Polygon,
        bounds: &Box2D,
        options: &Options,
        output: &mut dyn ContourReceiver,
    ) -> TessellationResult {
        self.mesh.clear();
        for contour in polygon.contours() {
            self.add_contour(contour);
        }
        if self.mesh.alive_edge_count() == 0 {
            return Ok(Count {
                contours: 0,
                points: 0,
            });
        }

        let tolerance = Tolerance::for_bounds(bounds);
        {
            let mut sweeper = Sweeper::new(&mut self.mesh, options.fill_rule, tolerance, self.log);
            sweeper.compute_interior(bounds)?;
        }

        match options.output_mode {
            OutputMode::Monotone => {}
            OutputMode::Triangulation => {
                monotone::tessellate_interior(&mut self.mesh);
            }
            OutputMode::Convex => {
                monotone::tessellate_interior(&mut self.mesh);
                convex::merge_convex_faces(&mut self.mesh);
            }
        }

        output::emit_contours(&self.mesh, &mut self.buffer, output)
    }

    /// Loads one contour into the mesh as a closed loop of edges. Half-edges
    /// pointing along the contour get winding +1, their twins -1, so that
    /// crossing an edge from its right face to its left face increments the
    /// winding number.
    fn add_contour(&mut self, points: &[Point]) {
        if points.is_empty() {
            return;
        }

        let mut e: Option<HalfEdgeId> = None;
        for &p in points {
            let edge = match e {
                None => {
                    // A self-loop: one vertex, one edge, two faces.
                    let edge = self.mesh.make_edge(p, p);
                    self.mesh.splice(edge, sym(edge));
                    edge
                }
                Some(prev) => {
                    let edge = self.mesh.split_edge(prev);
                    let v = self.mesh.org(edge);
                    self.mesh.set_position(v, p);
                    edge
                }
            };
            self.mesh.set_winding(edge, 1);
            self.mesh.set_winding(sym(edge), -1);
            e = Some(edge);
        }
    }
}

impl Default for Tessellator {
    fn default() -> Self {
        Self::new()
    }
}

impl From<crate::InternalError> for TessellationError {
    fn from(e: crate::InternalError) -> Self {
        TessellationError::Internal(e)
    }
}
