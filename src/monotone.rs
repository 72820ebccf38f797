//! Triangulation of the monotone faces produced by the sweep.
//!
//! Every face marked inside is y-monotone: its boundary splits at the
//! topmost and bottommost vertices into two chains, each sorted in sweep
//! order. Triangulation walks both chains top-down, clipping ears off
//! whichever chain is behind, and finishes with a fan from the topmost
//! vertex. All work happens in the mesh itself via `connect`, so the
//! triangles come out as ordinary faces inheriting the `inside` flag.

use crate::geom::{edge_sign, vertex_leq};
use crate::mesh::{sym, FaceId, HalfEdgeId, Mesh};

#[inline]
fn goes_up(mesh: &Mesh, e: HalfEdgeId) -> bool {
    vertex_leq(mesh.dst_pos(e), mesh.org_pos(e))
}

#[inline]
fn goes_down(mesh: &Mesh, e: HalfEdgeId) -> bool {
    vertex_leq(mesh.org_pos(e), mesh.dst_pos(e))
}

/// Triangulates one monotone face in place.
pub(crate) fn tessellate_mono_region(mesh: &mut Mesh, face: FaceId) {
    // Position `up` so that its origin is the bottommost vertex; the ring
    // anchor left by the sweep is usually already close.
    let mut up = mesh.face_edge(face);
    debug_assert!(mesh.lnext(up) != up && mesh.lnext(mesh.lnext(up)) != up);

    while goes_up(mesh, up) {
        up = mesh.lprev(up);
    }
    while goes_down(mesh, up) {
        up = mesh.lnext(up);
    }
    let mut lo = mesh.lprev(up);

    while mesh.lnext(up) != lo {
        if vertex_leq(mesh.dst_pos(up), mesh.org_pos(lo)) {
            // dst(up) is higher: it is safe to clip ears against the lo
            // chain. The direction test keeps us making progress even when
            // rounding makes some of these triangles inverted.
            loop {
                let lo_next = mesh.lnext(lo);
                if lo_next == up {
                    break;
                }
                let advance = goes_up(mesh, lo_next)
                    || edge_sign(
                        mesh.org_pos(lo),
                        mesh.dst_pos(lo),
                        mesh.dst_pos(lo_next),
                    ) <= 0.0;
                if !advance {
                    break;
                }
                let temp = mesh.connect(lo_next, lo);
                lo = sym(temp);
            }
            lo = mesh.lprev(lo);
        } else {
            // org(lo) is higher: clip against the up chain.
            loop {
                if mesh.lnext(lo) == up {
                    break;
                }
                let up_prev = mesh.lprev(up);
                let advance = goes_down(mesh, up_prev)
                    || edge_sign(
                        mesh.dst_pos(up),
                        mesh.org_pos(up),
                        mesh.org_pos(up_prev),
                    ) >= 0.0;
                if !advance {
                    break;
                }
                let temp = mesh.connect(up, up_prev);
                up = sym(temp);
            }
            up = mesh.lnext(up);
        }
    }

    // The chains met; fan out the rest from the topmost vertex.
    debug_assert!(mesh.lnext(lo) != up);
    loop {
        let lo_next = mesh.lnext(lo);
        if mesh.lnext(lo_next) == up {
            break;
        }
        let temp = mesh.connect(lo_next, lo);
        lo = sym(temp);
    }
}

/// Triangulates every inside face of the mesh.
pub(crate) fn tessellate_interior(mesh: &mut Mesh) {
    for i in mesh.face_range() {
        let f = FaceId::new(i);
        if mesh.is_face_alive(f) && mesh.is_inside(f) {
            tessellate_mono_region(mesh, f);
        }
    }
}
