//! Delivery of the tessellation result.
//!
//! The tessellator hands each finished contour to a [`ContourReceiver`] as a
//! slice of points. The slice borrows a buffer that is reused from one
//! contour to the next, so receivers that want to keep the points must copy
//! them out. [`ContourBuffers`] is the ready-made receiver that does exactly
//! that; closures taking a point slice also work.

use crate::math::Point;
use crate::mesh::{FaceId, Mesh};
use crate::{Count, TessellationError};

/// The index type contours are addressed with; a single contour cannot hold
/// more points than it can count.
pub type Index = u16;

/// Hard cap on the number of points in one emitted contour.
pub const MAX_CONTOUR_POINTS: usize = Index::MAX as usize;

/// Receives the output contours of a tessellation, one call per closed
/// contour. The point slice is only valid for the duration of the call.
pub trait ContourReceiver {
    fn contour(&mut self, points: &[Point]);
}

impl<F: FnMut(&[Point])> ContourReceiver for F {
    fn contour(&mut self, points: &[Point]) {
        self(points)
    }
}

/// A receiver that simply copies every contour into a vector.
#[derive(Clone, Debug, Default)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct ContourBuffers {
    pub contours: Vec<Vec<Point>>,
}

impl ContourBuffers {
    pub fn new() -> Self {
        ContourBuffers {
            contours: Vec::new(),
        }
    }

    pub fn clear(&mut self) {
        self.contours.clear();
    }
}

impl ContourReceiver for ContourBuffers {
    fn contour(&mut self, points: &[Point]) {
        self.contours.push(points.to_vec());
    }
}

/// Walks every inside face of the mesh and hands its boundary to the
/// receiver, reusing `buffer` across contours.
pub(crate) fn emit_contours(
    mesh: &Mesh,
    buffer: &mut Vec<Point>,
    output: &mut dyn ContourReceiver,
) -> Result<Count, TessellationError> {
    let mut count = Count {
        contours: 0,
        points: 0,
    };

    for i in mesh.face_range() {
        let f = FaceId::new(i);
        if !mesh.is_face_alive(f) || !mesh.is_inside(f) {
            continue;
        }

        buffer.clear();
        let start = mesh.face_edge(f);
        let mut e = start;
        loop {
            if buffer.len() >= MAX_CONTOUR_POINTS {
                return Err(TessellationError::TooManyVertices);
            }
            buffer.push(mesh.org_pos(e));
            e = mesh.lnext(e);
            if e == start {
                break;
            }
        }

        output.contour(buffer);
        count.contours += 1;
        count.points += buffer.len() as u32;
    }

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::point;
    use crate::mesh::sym;

    #[test]
    fn closures_are_receivers() {
        let mut n = 0;
        {
            let mut sink = |points: &[Point]| {
                n += points.len();
            };
            sink.contour(&[point(0.0, 0.0), point(1.0, 0.0)]);
        }
        assert_eq!(n, 2);
    }

    #[test]
    fn emits_only_inside_faces() {
        let mut mesh = Mesh::new();
        // A triangle: one inside face, one outer.
        let e1 = mesh.make_edge(point(0.0, 0.0), point(1.0, 0.0));
        let e2 = mesh.split_edge(e1);
        let v = mesh.org(e2);
        mesh.set_position(v, point(1.0, 1.0));
        let _e3 = mesh.connect(e2, e1);

        let f = mesh.face(e1);
        mesh.set_inside(f, true);
        mesh.set_face_edge(f, e1);
        mesh.set_inside(mesh.face(sym(e1)), false);

        let mut buffers = ContourBuffers::new();
        let mut scratch = Vec::new();
        let count = emit_contours(&mesh, &mut scratch, &mut buffers).unwrap();

        assert_eq!(count.contours, 1);
        assert_eq!(count.points, 3);
        assert_eq!(buffers.contours.len(), 1);
        assert_eq!(buffers.contours[0].len(), 3);
        assert_eq!(buffers.contours[0][0], point(0.0, 0.0));
    }
}
