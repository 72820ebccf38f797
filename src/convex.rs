//! Merging triangulated faces back into convex polygons.
//!
//! Walks every inside face and deletes shared edges whose removal keeps the
//! merged boundary convex. Convexity only has to be checked at the two
//! endpoints of the edge being deleted (everything else is untouched), so
//! the test is two corner orientation checks; no per-face vertex counts are
//! kept anywhere.

use crate::geom::is_ccw;
use crate::mesh::{sym, FaceId, Mesh};

pub(crate) fn merge_convex_faces(mesh: &mut Mesh) {
    for i in mesh.face_range() {
        let f = FaceId::new(i);
        if !mesh.is_face_alive(f) || !mesh.is_inside(f) {
            continue;
        }

        let mut e_cur = mesh.face_edge(f);
        let v_start = mesh.org(e_cur);

        loop {
            let mut e_next = mesh.lnext(e_cur);
            let e_sym = sym(e_cur);
            let mut merged = false;

            let neighbor = mesh.rface(e_cur);
            if mesh.is_inside(neighbor) && neighbor != mesh.face(e_cur) {
                // The merged ring stays convex iff the corners at both
                // endpoints of the shared edge still turn the right way.
                let a = mesh.org_pos(mesh.lprev(e_cur));
                let b = mesh.org_pos(e_cur);
                let c = mesh.org_pos(mesh.lnext(mesh.lnext(e_sym)));
                let d = mesh.org_pos(mesh.lprev(e_sym));
                let e = mesh.org_pos(e_sym);
                let g = mesh.org_pos(mesh.lnext(mesh.lnext(e_cur)));
                if is_ccw(a, b, c) && is_ccw(d, e, g) {
                    e_next = mesh.lnext(e_sym);
                    mesh.delete_edge(e_cur);
                    merged = true;
                }
            }

            if !merged && mesh.org(mesh.lnext(e_cur)) == v_start {
                break;
            }
            e_cur = e_next;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{point, Point};
    use crate::mesh::HalfEdgeId;

    fn ring(mesh: &mut Mesh, pts: &[Point]) -> HalfEdgeId {
        let mut e = mesh.make_edge(pts[0], pts[0]);
        mesh.splice(e, sym(e));
        for &p in &pts[1..] {
            let next = mesh.split_edge(e);
            let v = mesh.org(next);
            mesh.set_position(v, p);
            e = next;
        }
        e
    }

    fn count_inside(mesh: &Mesh) -> usize {
        mesh.face_range()
            .map(FaceId::new)
            .filter(|&f| mesh.is_face_alive(f) && mesh.is_inside(f))
            .count()
    }

    // Splits a quad face along one diagonal into two inside triangles and
    // returns the diagonal.
    fn split_quad(mesh: &mut Mesh, pts: &[Point; 4]) -> HalfEdgeId {
        let e = ring(mesh, pts);
        let f = mesh.face(e);
        mesh.set_inside(f, true);
        mesh.set_face_edge(f, e);
        let diagonal = mesh.connect(mesh.lnext(e), e);
        mesh.check();
        diagonal
    }

    #[test]
    fn convex_pair_is_merged() {
        let mut mesh = Mesh::new();
        split_quad(
            &mut mesh,
            &[
                point(0.0, 0.0),
                point(0.0, 4.0),
                point(4.0, 4.0),
                point(4.0, 0.0),
            ],
        );
        assert_eq!(count_inside(&mesh), 2);

        merge_convex_faces(&mut mesh);
        mesh.check();

        // The diagonal is gone; one convex quad remains.
        assert_eq!(count_inside(&mesh), 1);
        assert_eq!(mesh.alive_edge_count(), 4);
    }

    #[test]
    fn reflex_pair_is_kept() {
        let mut mesh = Mesh::new();
        // A dart: merging its two triangles across the diagonal would
        // produce a reflex corner at (1, 1).
        split_quad(
            &mut mesh,
            &[
                point(0.0, 0.0),
                point(1.0, 1.0),
                point(0.0, 3.0),
                point(4.0, 1.5),
            ],
        );
        let inside_before = count_inside(&mesh);
        let edges_before = mesh.alive_edge_count();

        merge_convex_faces(&mut mesh);
        mesh.check();

        assert_eq!(count_inside(&mesh), inside_before);
        assert_eq!(mesh.alive_edge_count(), edges_before);
    }
}
