//! The half-edge mesh the tessellator operates on.
//!
//! Every edge is a pair of oppositely oriented half-edges allocated together;
//! the twin of a half-edge is found by flipping the lowest bit of its id.
//! Each half-edge knows its origin vertex, the next edge counter-clockwise
//! around that origin (`onext`) and the next edge counter-clockwise around
//! its left face (`lnext`); everything else (`oprev`, `lprev`, `rprev`,
//! destination, right face...) derives from those three fields.
//!
//! All cross-references are typed ids into per-kind arenas, so the cyclic
//! structure needs no pointers and the whole mesh can be dumped for
//! debugging. Deleted records go to free lists and are recycled.
//!
//! The only fundamental mutation is `raw_splice`, which exchanges the
//! `onext` links of two half-edges. All public operators (`make_edge`,
//! `splice`, `split_edge`, `connect`, `delete_edge`) are built from it plus
//! the vertex/face bookkeeping. They are infallible: violating their
//! preconditions is a bug in the caller, caught by `check()` in debug runs.

use crate::active_region::RegionId;
use crate::event_queue::EventId;
use crate::math::Point;
use sid::{Id, IdVec};

#[doc(hidden)]
pub struct VertexTag;
pub type VertexId = Id<VertexTag, u32>;

#[doc(hidden)]
pub struct HalfEdgeTag;
pub type HalfEdgeId = Id<HalfEdgeTag, u32>;

#[doc(hidden)]
pub struct FaceTag;
pub type FaceId = Id<FaceTag, u32>;

const INVALID_HANDLE: u32 = std::u32::MAX;

pub fn no_vertex() -> VertexId {
    VertexId::new(INVALID_HANDLE)
}

pub fn no_edge() -> HalfEdgeId {
    HalfEdgeId::new(INVALID_HANDLE)
}

pub fn no_face() -> FaceId {
    FaceId::new(INVALID_HANDLE)
}

/// The twin half-edge of the same pair.
#[inline]
pub fn sym(e: HalfEdgeId) -> HalfEdgeId {
    HalfEdgeId::new(e.handle ^ 1)
}

struct VertexData {
    position: Point,
    // Some half-edge with this origin.
    an_edge: HalfEdgeId,
    // Slot for the sweep: position of this vertex in the event queue.
    queue_handle: Option<EventId>,
    alive: bool,
}

struct HalfEdgeData {
    org: VertexId,
    // Next edge CCW around the origin.
    onext: HalfEdgeId,
    // Next edge CCW around the left face.
    lnext: HalfEdgeId,
    face: FaceId,
    // Change of winding number when crossing from the right to the left face.
    winding: i16,
    // Slot for the sweep: the active region this edge bounds, if any.
    active_region: Option<RegionId>,
    alive: bool,
}

struct FaceData {
    // Some half-edge with this left face.
    an_edge: HalfEdgeId,
    inside: bool,
    winding: i16,
    alive: bool,
}

pub struct Mesh {
    vertices: IdVec<VertexId, VertexData>,
    edges: IdVec<HalfEdgeId, HalfEdgeData>,
    faces: IdVec<FaceId, FaceData>,
    free_vertices: Vec<VertexId>,
    // Even half of each free pair.
    free_edges: Vec<HalfEdgeId>,
    free_faces: Vec<FaceId>,
}

impl Mesh {
    pub fn new() -> Self {
        Mesh {
            vertices: IdVec::new(),
            edges: IdVec::new(),
            faces: IdVec::new(),
            free_vertices: Vec::new(),
            free_edges: Vec::new(),
            free_faces: Vec::new(),
        }
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.edges.clear();
        self.faces.clear();
        self.free_vertices.clear();
        self.free_edges.clear();
        self.free_faces.clear();
    }

    // ---------- accessors ----------

    #[inline]
    pub fn org(&self, e: HalfEdgeId) -> VertexId {
        self.edges[e].org
    }

    #[inline]
    pub fn dst(&self, e: HalfEdgeId) -> VertexId {
        self.edges[sym(e)].org
    }

    #[inline]
    pub fn onext(&self, e: HalfEdgeId) -> HalfEdgeId {
        self.edges[e].onext
    }

    #[inline]
    pub fn lnext(&self, e: HalfEdgeId) -> HalfEdgeId {
        self.edges[e].lnext
    }

    /// Previous edge around the origin (clockwise).
    #[inline]
    pub fn oprev(&self, e: HalfEdgeId) -> HalfEdgeId {
        self.edges[sym(e)].lnext
    }

    /// Previous edge around the left face.
    #[inline]
    pub fn lprev(&self, e: HalfEdgeId) -> HalfEdgeId {
        sym(self.edges[e].onext)
    }

    /// Previous edge around the right face.
    #[inline]
    pub fn rprev(&self, e: HalfEdgeId) -> HalfEdgeId {
        self.edges[sym(e)].onext
    }

    /// Next edge around the destination.
    #[inline]
    pub fn dnext(&self, e: HalfEdgeId) -> HalfEdgeId {
        sym(self.rprev(e))
    }

    #[inline]
    pub fn face(&self, e: HalfEdgeId) -> FaceId {
        self.edges[e].face
    }

    #[inline]
    pub fn rface(&self, e: HalfEdgeId) -> FaceId {
        self.edges[sym(e)].face
    }

    #[inline]
    pub fn winding(&self, e: HalfEdgeId) -> i16 {
        self.edges[e].winding
    }

    #[inline]
    pub fn set_winding(&mut self, e: HalfEdgeId, winding: i16) {
        self.edges[e].winding = winding;
    }

    /// Transfers the winding of a parallel edge onto `dst` (both halves).
    pub fn add_winding(&mut self, dst: HalfEdgeId, src: HalfEdgeId) {
        self.edges[dst].winding += self.edges[src].winding;
        let w = self.edges[sym(src)].winding;
        self.edges[sym(dst)].winding += w;
    }

    #[inline]
    pub fn active_region(&self, e: HalfEdgeId) -> Option<RegionId> {
        self.edges[e].active_region
    }

    #[inline]
    pub fn set_active_region(&mut self, e: HalfEdgeId, region: Option<RegionId>) {
        self.edges[e].active_region = region;
    }

    #[inline]
    pub fn position(&self, v: VertexId) -> Point {
        self.vertices[v].position
    }

    #[inline]
    pub fn set_position(&mut self, v: VertexId, position: Point) {
        self.vertices[v].position = position;
    }

    #[inline]
    pub fn org_pos(&self, e: HalfEdgeId) -> Point {
        self.position(self.org(e))
    }

    #[inline]
    pub fn dst_pos(&self, e: HalfEdgeId) -> Point {
        self.position(self.dst(e))
    }

    #[inline]
    pub fn vertex_edge(&self, v: VertexId) -> HalfEdgeId {
        self.vertices[v].an_edge
    }

    #[inline]
    pub fn queue_handle(&self, v: VertexId) -> Option<EventId> {
        self.vertices[v].queue_handle
    }

    #[inline]
    pub fn set_queue_handle(&mut self, v: VertexId, handle: Option<EventId>) {
        self.vertices[v].queue_handle = handle;
    }

    #[inline]
    pub fn face_edge(&self, f: FaceId) -> HalfEdgeId {
        self.faces[f].an_edge
    }

    #[inline]
    pub fn set_face_edge(&mut self, f: FaceId, e: HalfEdgeId) {
        self.faces[f].an_edge = e;
    }

    #[inline]
    pub fn is_inside(&self, f: FaceId) -> bool {
        self.faces[f].inside
    }

    #[inline]
    pub fn set_inside(&mut self, f: FaceId, inside: bool) {
        self.faces[f].inside = inside;
    }

    #[inline]
    pub fn face_winding(&self, f: FaceId) -> i16 {
        self.faces[f].winding
    }

    #[inline]
    pub fn set_face_winding(&mut self, f: FaceId, winding: i16) {
        self.faces[f].winding = winding;
    }

    // ---------- arena walking ----------

    pub fn vertex_range(&self) -> std::ops::Range<u32> {
        0..self.vertices.len() as u32
    }

    pub fn edge_range(&self) -> std::ops::Range<u32> {
        0..self.edges.len() as u32
    }

    pub fn face_range(&self) -> std::ops::Range<u32> {
        0..self.faces.len() as u32
    }

    #[inline]
    pub fn is_vertex_alive(&self, v: VertexId) -> bool {
        (v.handle as usize) < self.vertices.len() as usize && self.vertices[v].alive
    }

    #[inline]
    pub fn is_edge_alive(&self, e: HalfEdgeId) -> bool {
        (e.handle as usize) < self.edges.len() as usize && self.edges[e].alive
    }

    #[inline]
    pub fn is_face_alive(&self, f: FaceId) -> bool {
        (f.handle as usize) < self.faces.len() as usize && self.faces[f].alive
    }

    pub fn alive_vertex_count(&self) -> usize {
        self.vertex_range()
            .filter(|&i| self.vertices[VertexId::new(i)].alive)
            .count()
    }

    pub fn alive_edge_count(&self) -> usize {
        self.edge_range()
            .filter(|&i| self.edges[HalfEdgeId::new(i)].alive)
            .count()
            / 2
    }

    pub fn alive_face_count(&self) -> usize {
        self.face_range()
            .filter(|&i| self.faces[FaceId::new(i)].alive)
            .count()
    }

    /// Number of edges around the left face of `e`.
    pub fn face_len(&self, e: HalfEdgeId) -> usize {
        let mut n = 0;
        let mut it = e;
        loop {
            n += 1;
            it = self.lnext(it);
            if it == e {
                return n;
            }
        }
    }

    // ---------- allocation ----------

    fn alloc_vertex(&mut self, position: Point, an_edge: HalfEdgeId) -> VertexId {
        let data = VertexData {
            position,
            an_edge,
            queue_handle: None,
            alive: true,
        };
        if let Some(v) = self.free_vertices.pop() {
            self.vertices[v] = data;
            return v;
        }
        self.vertices.push(data)
    }

    fn alloc_face(&mut self, an_edge: HalfEdgeId, inside: bool) -> FaceId {
        let data = FaceData {
            an_edge,
            inside,
            winding: 0,
            alive: true,
        };
        if let Some(f) = self.free_faces.pop() {
            self.faces[f] = data;
            return f;
        }
        self.faces.push(data)
    }

    fn blank_half_edge() -> HalfEdgeData {
        HalfEdgeData {
            org: no_vertex(),
            onext: no_edge(),
            lnext: no_edge(),
            face: no_face(),
            winding: 0,
            active_region: None,
            alive: true,
        }
    }

    /// Allocates an isolated edge pair: both halves are their own origin ring
    /// and each other's face ring. No vertices or faces are attached yet.
    fn raw_make_edge(&mut self) -> HalfEdgeId {
        let e = if let Some(e) = self.free_edges.pop() {
            self.edges[e] = Self::blank_half_edge();
            self.edges[sym(e)] = Self::blank_half_edge();
            e
        } else {
            let e = self.edges.push(Self::blank_half_edge());
            self.edges.push(Self::blank_half_edge());
            e
        };
        let es = sym(e);
        self.edges[e].onext = e;
        self.edges[e].lnext = es;
        self.edges[es].onext = es;
        self.edges[es].lnext = e;
        e
    }

    fn kill_edge_pair(&mut self, e: HalfEdgeId) {
        let even = HalfEdgeId::new(e.handle & !1);
        self.edges[even].alive = false;
        self.edges[sym(even)].alive = false;
        self.free_edges.push(even);
    }

    /// Creates a vertex at `position` owning the whole origin ring of `e`.
    fn new_vertex_for_ring(&mut self, e: HalfEdgeId, position: Point) -> VertexId {
        let v = self.alloc_vertex(position, e);
        let mut it = e;
        loop {
            self.edges[it].org = v;
            it = self.edges[it].onext;
            if it == e {
                break;
            }
        }
        v
    }

    fn kill_vertex(&mut self, v: VertexId, new_org: Option<VertexId>) {
        let start = self.vertices[v].an_edge;
        let replacement = new_org.unwrap_or_else(no_vertex);
        let mut it = start;
        loop {
            self.edges[it].org = replacement;
            it = self.edges[it].onext;
            if it == start {
                break;
            }
        }
        self.vertices[v].alive = false;
        self.free_vertices.push(v);
    }

    /// Creates a face owning the whole left ring of `e`, optionally copying
    /// the `inside` flag of `inherit` (the common case when a face is being
    /// split in two).
    fn new_face_for_ring(&mut self, e: HalfEdgeId, inherit: Option<FaceId>) -> FaceId {
        let inside = inherit.map(|f| self.faces[f].inside).unwrap_or(false);
        let f = self.alloc_face(e, inside);
        let mut it = e;
        loop {
            self.edges[it].face = f;
            it = self.edges[it].lnext;
            if it == e {
                break;
            }
        }
        f
    }

    fn kill_face(&mut self, f: FaceId, new_face: Option<FaceId>) {
        let start = self.faces[f].an_edge;
        let replacement = new_face.unwrap_or_else(no_face);
        let mut it = start;
        loop {
            self.edges[it].face = replacement;
            it = self.edges[it].lnext;
            if it == start {
                break;
            }
        }
        self.faces[f].alive = false;
        self.free_faces.push(f);
    }

    /// The splice primitive: exchanges the `onext` links of `a` and `b` (and
    /// patches the `lnext` links that mirror them). If `a` and `b` share an
    /// origin ring this separates the ring in two; otherwise it joins the
    /// two rings. Vertex and face records are *not* updated.
    fn raw_splice(&mut self, a: HalfEdgeId, b: HalfEdgeId) {
        let a_onext = self.edges[a].onext;
        let b_onext = self.edges[b].onext;
        self.edges[sym(a_onext)].lnext = b;
        self.edges[sym(b_onext)].lnext = a;
        self.edges[a].onext = b_onext;
        self.edges[b].onext = a_onext;
    }

    // ---------- Euler operators ----------

    /// Creates an isolated edge from `a` to `b` with its own two vertices
    /// and a single face spanning both sides.
    pub fn make_edge(&mut self, a: Point, b: Point) -> HalfEdgeId {
        let e = self.raw_make_edge();
        self.new_vertex_for_ring(e, a);
        self.new_vertex_for_ring(sym(e), b);
        self.new_face_for_ring(e, None);
        e
    }

    /// The topological workhorse. If `e_org` and `e_dst` have distinct
    /// origins, their vertices are merged (and likewise their faces if
    /// distinct); if they already share an origin and a face, the vertex and
    /// the face are each split in two. Everything else (`split_edge`,
    /// `connect`, `delete_edge`) reduces to this.
    pub fn splice(&mut self, e_org: HalfEdgeId, e_dst: HalfEdgeId) {
        if e_org == e_dst {
            return;
        }

        let mut joining_vertices = false;
        let v_org = self.edges[e_org].org;
        let v_dst = self.edges[e_dst].org;
        if v_dst != v_org {
            joining_vertices = true;
            self.kill_vertex(v_dst, Some(v_org));
        }

        let mut joining_loops = false;
        let f_org = self.edges[e_org].face;
        let f_dst = self.edges[e_dst].face;
        if f_dst != f_org {
            joining_loops = true;
            self.kill_face(f_dst, Some(f_org));
        }

        self.raw_splice(e_dst, e_org);

        if !joining_vertices {
            // One vertex became two; the new one owns `e_dst`'s ring.
            let position = self.vertices[v_org].position;
            self.new_vertex_for_ring(e_dst, position);
            self.vertices[v_org].an_edge = e_org;
        }
        if !joining_loops {
            // One face became two; the new one owns `e_dst`'s ring.
            self.new_face_for_ring(e_dst, Some(f_org));
            self.faces[f_org].an_edge = e_org;
        }
    }

    /// Removes `e_del`, merging its two faces if they are distinct or
    /// splitting its origin ring off as a separate component otherwise.
    pub fn delete_edge(&mut self, e_del: HalfEdgeId) {
        let e_del_sym = sym(e_del);

        let mut joining_loops = false;
        let lface = self.edges[e_del].face;
        let rface = self.edges[e_del_sym].face;
        if lface != rface {
            joining_loops = true;
            self.kill_face(lface, Some(rface));
        }

        if self.edges[e_del].onext == e_del {
            let v = self.edges[e_del].org;
            self.kill_vertex(v, None);
        } else {
            // Keep the right face and origin anchored on surviving edges.
            let oprev = self.oprev(e_del);
            let rf = self.edges[e_del_sym].face;
            self.faces[rf].an_edge = oprev;
            let v = self.edges[e_del].org;
            self.vertices[v].an_edge = self.edges[e_del].onext;

            self.raw_splice(e_del, oprev);

            if !joining_loops {
                // Splitting one loop in two; give `e_del`'s ring its own face.
                let f = self.edges[e_del].face;
                self.new_face_for_ring(e_del, Some(f));
            }
        }

        if self.edges[e_del_sym].onext == e_del_sym {
            let v = self.edges[e_del_sym].org;
            self.kill_vertex(v, None);
            let f = self.edges[e_del_sym].face;
            self.kill_face(f, None);
        } else {
            let oprev = self.oprev(e_del_sym);
            let lf = self.edges[e_del].face;
            self.faces[lf].an_edge = oprev;
            let v = self.edges[e_del_sym].org;
            self.vertices[v].an_edge = self.edges[e_del_sym].onext;

            self.raw_splice(e_del_sym, oprev);
        }

        self.kill_edge_pair(e_del);
    }

    /// Adds a new edge out of `dst(e_org)` towards a brand-new vertex,
    /// inserted right after `e_org` in its left face ring. Returns the new
    /// edge; its destination position is a placeholder the caller overwrites.
    pub fn add_edge_vertex(&mut self, e_org: HalfEdgeId) -> HalfEdgeId {
        let e_new = self.raw_make_edge();
        let e_new_sym = sym(e_new);

        let lnext = self.edges[e_org].lnext;
        self.raw_splice(e_new, lnext);

        let dst = self.dst(e_org);
        self.edges[e_new].org = dst;
        let placeholder = self.vertices[dst].position;
        self.new_vertex_for_ring(e_new_sym, placeholder);

        let f = self.edges[e_org].face;
        self.edges[e_new].face = f;
        self.edges[e_new_sym].face = f;

        e_new
    }

    /// Splits `e_org` in two at a new vertex, producing two collinear edges.
    /// Returns the new edge (from the new vertex to the old destination);
    /// `e_org` keeps its origin and now ends at the new vertex. Both halves
    /// inherit the winding of the original. The caller positions the new
    /// vertex (`org(returned edge)`).
    pub fn split_edge(&mut self, e_org: HalfEdgeId) -> HalfEdgeId {
        let temp = self.add_edge_vertex(e_org);
        let e_new = sym(temp);

        // Move the origin ring of `sym(e_org)` from the old destination onto
        // the new vertex.
        let e_org_sym = sym(e_org);
        let oprev = self.oprev(e_org_sym);
        self.raw_splice(e_org_sym, oprev);
        self.raw_splice(e_org_sym, e_new);

        let mid = self.edges[e_new].org;
        self.edges[e_org_sym].org = mid;
        let far = self.dst(e_new);
        self.vertices[far].an_edge = sym(e_new);
        let rf = self.edges[e_org_sym].face;
        self.edges[sym(e_new)].face = rf;
        self.edges[e_new].winding = self.edges[e_org].winding;
        self.edges[sym(e_new)].winding = self.edges[e_org_sym].winding;

        e_new
    }

    /// Adds an edge from `dst(e_org)` to `org(e_dst)`. Both edges must share
    /// a face; the face is split in two unless the two edges were in
    /// different faces already (in which case the faces are merged).
    pub fn connect(&mut self, e_org: HalfEdgeId, e_dst: HalfEdgeId) -> HalfEdgeId {
        let e_new = self.raw_make_edge();
        let e_new_sym = sym(e_new);

        let mut joining_loops = false;
        let f_org = self.edges[e_org].face;
        let f_dst = self.edges[e_dst].face;
        if f_dst != f_org {
            joining_loops = true;
            self.kill_face(f_dst, Some(f_org));
        }

        let lnext = self.edges[e_org].lnext;
        self.raw_splice(e_new, lnext);
        self.raw_splice(e_new_sym, e_dst);

        let v_from = self.dst(e_org);
        self.edges[e_new].org = v_from;
        let v_to = self.edges[e_dst].org;
        self.edges[e_new_sym].org = v_to;

        let f = self.edges[e_org].face;
        self.edges[e_new].face = f;
        self.edges[e_new_sym].face = f;
        self.faces[f].an_edge = e_new_sym;

        if !joining_loops {
            self.new_face_for_ring(e_new, Some(f));
        }

        e_new
    }

    // ---------- validation ----------

    /// Walks the whole mesh and panics on any broken invariant. Debug aid;
    /// called after the sweep in debug builds and used heavily by tests.
    pub fn check(&self) {
        let edge_bound = self.edges.len() + 1;

        for i in self.edge_range() {
            let e = HalfEdgeId::new(i);
            if !self.edges[e].alive {
                continue;
            }
            assert!(self.is_edge_alive(sym(e)), "twin of an alive edge is dead");
            assert!(self.is_vertex_alive(self.org(e)), "edge with a dead origin");
            assert!(self.is_face_alive(self.face(e)), "edge with a dead face");

            // The splice identity linking the two ring orderings.
            assert_eq!(
                self.lnext(sym(self.onext(e))),
                e,
                "onext/lnext rings disagree"
            );
            assert_eq!(
                self.org(self.lnext(e)),
                self.dst(e),
                "face ring skips a vertex"
            );
            assert_eq!(
                self.face(self.lnext(e)),
                self.face(e),
                "face ring crosses faces"
            );
            assert_eq!(
                self.org(self.onext(e)),
                self.org(e),
                "origin ring crosses vertices"
            );
        }

        for i in self.vertex_range() {
            let v = VertexId::new(i);
            if !self.vertices[v].alive {
                continue;
            }
            let start = self.vertices[v].an_edge;
            assert!(self.is_edge_alive(start), "vertex anchored on a dead edge");
            let mut it = start;
            let mut steps = 0;
            loop {
                assert_eq!(self.org(it), v, "origin ring contains a stranger");
                it = self.onext(it);
                steps += 1;
                assert!(steps < edge_bound, "origin ring does not close");
                if it == start {
                    break;
                }
            }
        }

        for i in self.face_range() {
            let f = FaceId::new(i);
            if !self.faces[f].alive {
                continue;
            }
            let start = self.faces[f].an_edge;
            assert!(self.is_edge_alive(start), "face anchored on a dead edge");
            let mut it = start;
            let mut steps = 0;
            loop {
                assert_eq!(self.face(it), f, "face ring contains a stranger");
                it = self.lnext(it);
                steps += 1;
                assert!(steps < edge_bound, "face ring does not close");
                if it == start {
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::point;

    #[test]
    fn isolated_edge() {
        let mut mesh = Mesh::new();
        let e = mesh.make_edge(point(0.0, 0.0), point(1.0, 0.0));
        mesh.check();

        assert_eq!(mesh.org_pos(e), point(0.0, 0.0));
        assert_eq!(mesh.dst_pos(e), point(1.0, 0.0));
        assert_eq!(mesh.onext(e), e);
        assert_eq!(mesh.lnext(e), sym(e));
        assert_eq!(mesh.face(e), mesh.face(sym(e)));
        assert_eq!(mesh.alive_vertex_count(), 2);
        assert_eq!(mesh.alive_edge_count(), 1);
        assert_eq!(mesh.alive_face_count(), 1);
    }

    #[test]
    fn splice_joins_and_separates() {
        let mut mesh = Mesh::new();
        let e1 = mesh.make_edge(point(0.0, 0.0), point(1.0, 0.0));
        let e2 = mesh.make_edge(point(0.0, 0.0), point(0.0, 1.0));
        assert_eq!(mesh.alive_vertex_count(), 4);
        assert_eq!(mesh.alive_face_count(), 2);

        // Disjoint origins: splice merges the two vertices and faces.
        mesh.splice(e1, e2);
        mesh.check();
        assert_eq!(mesh.alive_vertex_count(), 3);
        assert_eq!(mesh.alive_face_count(), 1);
        assert_eq!(mesh.org(e1), mesh.org(e2));

        // Shared origin and face: splice undoes the join.
        mesh.splice(e1, e2);
        mesh.check();
        assert_eq!(mesh.alive_vertex_count(), 4);
        assert_eq!(mesh.alive_face_count(), 2);
        assert_ne!(mesh.org(e1), mesh.org(e2));
    }

    #[test]
    fn split_keeps_chain_and_winding() {
        let mut mesh = Mesh::new();
        let e = mesh.make_edge(point(0.0, 0.0), point(2.0, 0.0));
        mesh.set_winding(e, 1);
        mesh.set_winding(sym(e), -1);

        let e2 = mesh.split_edge(e);
        mesh.set_position(mesh.org(e2), point(1.0, 0.0));
        mesh.check();

        assert_eq!(mesh.dst(e), mesh.org(e2));
        assert_eq!(mesh.dst_pos(e2), point(2.0, 0.0));
        assert_eq!(mesh.lnext(e), e2);
        assert_eq!(mesh.winding(e2), 1);
        assert_eq!(mesh.winding(sym(e2)), -1);
        assert_eq!(mesh.alive_vertex_count(), 3);
        assert_eq!(mesh.alive_edge_count(), 2);
        assert_eq!(mesh.alive_face_count(), 1);
    }

    fn make_triangle(mesh: &mut Mesh) -> (HalfEdgeId, HalfEdgeId, HalfEdgeId) {
        let e1 = mesh.make_edge(point(0.0, 0.0), point(1.0, 0.0));
        let e2 = mesh.split_edge(e1);
        mesh.set_position(mesh.org(e2), point(1.0, 1.0));
        mesh.set_position(mesh.dst(e2), point(0.0, 1.0));
        let e3 = mesh.connect(e2, e1);
        (e1, e2, e3)
    }

    #[test]
    fn connect_closes_a_triangle() {
        let mut mesh = Mesh::new();
        let (e1, e2, e3) = make_triangle(&mut mesh);
        mesh.check();

        assert_eq!(mesh.alive_vertex_count(), 3);
        assert_eq!(mesh.alive_edge_count(), 3);
        assert_eq!(mesh.alive_face_count(), 2);
        assert_ne!(mesh.face(e3), mesh.rface(e3));
        assert_eq!(mesh.face_len(e1), 3);
        assert_eq!(mesh.face_len(sym(e1)), 3);
        assert_eq!(mesh.lnext(mesh.lnext(mesh.lnext(e2))), e2);
    }

    #[test]
    fn delete_merges_faces_back() {
        let mut mesh = Mesh::new();
        let (e1, _e2, e3) = make_triangle(&mut mesh);

        mesh.delete_edge(e3);
        mesh.check();
        assert_eq!(mesh.alive_face_count(), 1);
        assert_eq!(mesh.alive_edge_count(), 2);

        mesh.delete_edge(e1);
        mesh.check();
        assert_eq!(mesh.alive_edge_count(), 1);
        assert_eq!(mesh.alive_vertex_count(), 2);
    }

    #[test]
    fn connect_inherits_inside_flag() {
        let mut mesh = Mesh::new();
        let (e1, e2, _e3) = make_triangle(&mut mesh);
        let inner = mesh.face(e1);
        mesh.set_inside(inner, true);

        // Split the triangle; both parts keep the flag.
        let d = mesh.connect(e1, mesh.lprev(e1));
        mesh.check();
        assert!(mesh.is_inside(mesh.face(d)));
        assert!(mesh.is_inside(mesh.face(sym(d))));
        assert!(mesh.is_inside(mesh.face(e2)));
    }

    #[test]
    fn operator_storm_keeps_invariants() {
        // A little scripted stress run: build a fan, split everything,
        // connect across, then tear it all down, checking at every step.
        let mut mesh = Mesh::new();
        let e = mesh.make_edge(point(0.0, 0.0), point(4.0, 0.0));
        mesh.check();

        let mut spokes = vec![e];
        for i in 1..5 {
            let prev = *spokes.last().unwrap();
            let next = mesh.make_edge(point(0.0, 0.0), point(4.0, i as f32));
            mesh.splice(prev, next);
            mesh.check();
            spokes.push(next);
        }
        assert_eq!(mesh.alive_vertex_count(), 6);

        let mut rim = Vec::new();
        for w in spokes.windows(2) {
            let c = mesh.connect(w[0], sym(w[1]));
            mesh.check();
            rim.push(c);
        }
        assert!(mesh.alive_face_count() >= 2);

        for c in &rim {
            let mid = mesh.split_edge(*c);
            mesh.set_position(mesh.org(mid), point(4.0, 0.5));
            mesh.check();
        }

        for c in rim {
            mesh.delete_edge(c);
            mesh.check();
        }
        for s in spokes {
            mesh.delete_edge(s);
            mesh.check();
        }
        // Only the stubs left over from the rim splits remain.
        assert_eq!(mesh.alive_edge_count(), 4);
    }
}
