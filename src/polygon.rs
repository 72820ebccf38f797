//! The input polygon: a sequence of contours, each a sequence of points.
//!
//! Contour orientation is irrelevant (winding takes care of signs), empty
//! contours are ignored, and contours may freely self-intersect or overlap
//! each other. Points are stored flat with per-contour ranges, so the whole
//! polygon is two allocations.

use crate::math::{point, Box2D, Point};
use std::ops::Range;

#[derive(Clone, Debug, Default)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Polygon {
    points: Vec<Point>,
    contours: Vec<Range<u32>>,
}

impl Polygon {
    pub fn new() -> Self {
        Polygon {
            points: Vec::new(),
            contours: Vec::new(),
        }
    }

    pub fn builder() -> PolygonBuilder {
        PolygonBuilder {
            polygon: Polygon::new(),
            contour_start: 0,
        }
    }

    /// Appends a contour. Empty contours are dropped silently.
    pub fn add_contour(&mut self, points: &[Point]) {
        if points.is_empty() {
            return;
        }
        let start = self.points.len() as u32;
        self.points.extend_from_slice(points);
        self.contours.push(start..self.points.len() as u32);
    }

    pub fn is_empty(&self) -> bool {
        self.contours.is_empty()
    }

    pub fn contour_count(&self) -> usize {
        self.contours.len()
    }

    pub fn contour(&self, index: usize) -> &[Point] {
        let range = self.contours[index].clone();
        &self.points[range.start as usize..range.end as usize]
    }

    pub fn contours(&self) -> impl Iterator<Item = &[Point]> + '_ {
        self.contours
            .iter()
            .map(move |range| &self.points[range.start as usize..range.end as usize])
    }

    /// The axis-aligned bounding rectangle of all points (a point-sized box
    /// at the origin if the polygon is empty).
    pub fn bounds(&self) -> Box2D {
        let mut iter = self.points.iter();
        let first = match iter.next() {
            Some(p) => *p,
            None => return Box2D::new(point(0.0, 0.0), point(0.0, 0.0)),
        };
        let mut min = first;
        let mut max = first;
        for p in iter {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Box2D::new(min, max)
    }
}

/// Builds a polygon one contour at a time, in the move/line/close style.
pub struct PolygonBuilder {
    polygon: Polygon,
    contour_start: u32,
}

impl PolygonBuilder {
    /// Ends the current contour (if any) and starts a new one at `p`.
    pub fn move_to(&mut self, p: Point) -> &mut Self {
        self.close();
        self.contour_start = self.polygon.points.len() as u32;
        self.polygon.points.push(p);
        self
    }

    pub fn line_to(&mut self, p: Point) -> &mut Self {
        self.polygon.points.push(p);
        self
    }

    /// Ends the current contour. Contours are implicitly closed back to
    /// their first point; single-point contours are discarded.
    pub fn close(&mut self) -> &mut Self {
        let end = self.polygon.points.len() as u32;
        if end > self.contour_start + 1 {
            self.polygon.contours.push(self.contour_start..end);
        } else {
            self.polygon.points.truncate(self.contour_start as usize);
        }
        self.contour_start = end;
        self
    }

    pub fn build(mut self) -> Polygon {
        self.close();
        self.polygon
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contours_round_trip() {
        let mut polygon = Polygon::new();
        polygon.add_contour(&[point(0.0, 0.0), point(1.0, 0.0), point(1.0, 1.0)]);
        polygon.add_contour(&[]);
        polygon.add_contour(&[point(5.0, 5.0), point(6.0, 5.0), point(6.0, 6.0)]);

        assert_eq!(polygon.contour_count(), 2);
        assert_eq!(polygon.contour(0).len(), 3);
        assert_eq!(polygon.contour(1)[0], point(5.0, 5.0));
    }

    #[test]
    fn builder_closes_contours() {
        let mut builder = Polygon::builder();
        builder
            .move_to(point(0.0, 0.0))
            .line_to(point(4.0, 0.0))
            .line_to(point(4.0, 4.0))
            .close();
        builder.move_to(point(10.0, 10.0)); // dangling single point
        let polygon = builder.build();

        assert_eq!(polygon.contour_count(), 1);
        assert_eq!(polygon.contour(0).len(), 3);
    }

    #[test]
    fn bounds_cover_all_contours() {
        let mut polygon = Polygon::new();
        polygon.add_contour(&[point(-1.0, 2.0), point(3.0, -4.0), point(0.5, 0.0)]);
        polygon.add_contour(&[point(7.0, 1.0), point(6.0, 5.0), point(6.5, 2.0)]);

        let b = polygon.bounds();
        assert_eq!(b.min, point(-1.0, -4.0));
        assert_eq!(b.max, point(7.0, 5.0));
    }
}
