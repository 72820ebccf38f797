//! The sweep that turns the input mesh into monotone regions.
//!
//! A horizontal sweep line moves towards increasing `y` (ties broken by
//! `x`). Vertices are processed in that order from the event queue; the
//! edges currently crossing the sweep line live in the active region list,
//! ordered left to right. Processing an event finishes the regions whose
//! edges end there (stamping their winding and inside flag onto the mesh
//! faces they bound) and opens regions for the edges that start there.
//!
//! The interesting part is everything that can go wrong numerically: edges
//! that intersect below the sweep line are split at a synthesized vertex
//! which becomes a new event; intersections that pop out *above* the sweep
//! line due to rounding are clamped to the current event; and whenever two
//! neighboring edges are found to disagree with the list order, the
//! offending endpoint is spliced into the neighbor so that the order becomes
//! true by construction. These repairs are combinatorial rather than
//! arithmetic, which is what keeps the sweep sound on degenerate input.
//!
//! A vertex with no down-going edges would leave a region without a right
//! boundary; a temporary edge (flagged `fix_upper_edge`) is inserted instead
//! and replaced by a real edge, or deleted, as soon as one shows up.

use crate::active_region::{ActiveRegionList, RegionId};
use crate::event_queue::EventQueue;
use crate::geom::{edge_sign, vertex_eq, vertex_leq, Tolerance};
use crate::geom::edge_intersect;
use crate::math::{point, Box2D, Point};
use crate::mesh::{no_vertex, sym, HalfEdgeId, Mesh, VertexId};
use crate::{FillRule, InternalError};

#[cfg(debug_assertions)]
macro_rules! tess_log {
    ($obj:ident, $fmt:expr) => (
        if $obj.log {
            println!($fmt);
        }
    );
    ($obj:ident, $fmt:expr, $($arg:tt)*) => (
        if $obj.log {
            println!($fmt, $($arg)*);
        }
    );
}

#[cfg(not(debug_assertions))]
macro_rules! tess_log {
    ($obj:ident, $fmt:expr) => {};
    ($obj:ident, $fmt:expr, $($arg:tt)*) => {};
}

pub(crate) struct Sweeper<'l> {
    mesh: &'l mut Mesh,
    queue: EventQueue,
    regions: ActiveRegionList,
    fill_rule: FillRule,
    tolerance: Tolerance,
    // The vertex being processed; the active list predicate is evaluated
    // relative to it.
    event: VertexId,
    log: bool,
}

impl<'l> Sweeper<'l> {
    pub fn new(mesh: &'l mut Mesh, fill_rule: FillRule, tolerance: Tolerance, log: bool) -> Self {
        Sweeper {
            mesh,
            queue: EventQueue::new(),
            regions: ActiveRegionList::new(),
            fill_rule,
            tolerance,
            event: no_vertex(),
            log,
        }
    }

    /// Runs the whole sweep. Afterwards every face of the mesh is marked
    /// inside or outside and every inside face is y-monotone.
    pub fn compute_interior(&mut self, bounds: &Box2D) -> Result<(), InternalError> {
        self.remove_degenerate_edges();
        self.init_event_queue();
        self.init_active_regions(bounds);

        while let Some((position, v)) = self.queue.pop_min() {
            if !self.mesh.is_vertex_alive(v) {
                // The vertex was merged away after it was queued.
                continue;
            }
            self.mesh.set_queue_handle(v, None);
            loop {
                match self.queue.peek_min() {
                    Some((next_position, next_v)) if vertex_eq(next_position, position) => {
                        self.queue.pop_min();
                        self.mesh.set_queue_handle(next_v, None);
                        tess_log!(self, "merging coincident vertex at {:?}", position);
                        self.merge_coincident(v, next_v);
                    }
                    _ => break,
                }
            }
            tess_log!(self, "#### event at {:?}", position);
            self.sweep_event(v);
        }

        self.done_active_regions()?;
        self.remove_degenerate_faces();

        #[cfg(debug_assertions)]
        self.mesh.check();

        Ok(())
    }

    #[inline]
    fn event_pos(&self) -> Point {
        self.mesh.position(self.event)
    }

    // ---------- setup ----------

    /// Deletes zero-length edges and contours with fewer than three edges.
    fn remove_degenerate_edges(&mut self) {
        for i in self.mesh.edge_range() {
            let mut e = HalfEdgeId::new(i);
            if !self.mesh.is_edge_alive(e) {
                continue;
            }

            if vertex_eq(self.mesh.org_pos(e), self.mesh.dst_pos(e))
                && self.mesh.lnext(self.mesh.lnext(e)) != e
            {
                // Zero-length edge in a contour that keeps at least three.
                let lnext = self.mesh.lnext(e);
                self.mesh.splice(lnext, e);
                self.mesh.delete_edge(e);
                e = lnext;
            }

            let lnext = self.mesh.lnext(e);
            if self.mesh.lnext(lnext) == e {
                // One or two edges left in this contour; drop it.
                if lnext != e {
                    self.mesh.delete_edge(lnext);
                }
                self.mesh.delete_edge(e);
            }
        }
    }

    fn init_event_queue(&mut self) {
        for i in self.mesh.vertex_range() {
            let v = VertexId::new(i);
            if !self.mesh.is_vertex_alive(v) {
                continue;
            }
            let handle = self.queue.insert(self.mesh.position(v), v);
            self.mesh.set_queue_handle(v, Some(handle));
        }
    }

    /// Installs the two sentinel regions, bounded by synthetic vertical
    /// edges placed outside the padded bounds. Every real edge sorts
    /// strictly between them, so neighbor lookups never fall off the list.
    fn init_active_regions(&mut self, bounds: &Box2D) {
        let w = (bounds.max.x - bounds.min.x).max(1.0);
        let h = (bounds.max.y - bounds.min.y).max(1.0);
        let x_min = bounds.min.x - w;
        let x_max = bounds.max.x + w;
        let y_min = bounds.min.y - h;
        let y_max = bounds.max.y + h;

        self.add_sentinel(x_min, y_min, y_max);
        self.add_sentinel(x_max, y_min, y_max);
    }

    fn add_sentinel(&mut self, x: f32, y_min: f32, y_max: f32) {
        let e = self.mesh.make_edge(point(x, y_max), point(x, y_min));
        // Give the predicate a valid event before the first real one.
        self.event = self.mesh.dst(e);

        let id = self.regions.insert(&self.mesh, self.event, e);
        self.regions[id].sentinel = true;
        self.mesh.set_active_region(e, Some(id));
    }

    /// Merges `other` (popped at the same position as `v`) into `v` by
    /// splicing their edge rings together.
    fn merge_coincident(&mut self, v: VertexId, other: VertexId) {
        if !self.mesh.is_vertex_alive(other) || v == other {
            return;
        }
        let e1 = self.mesh.vertex_edge(v);
        let e2 = self.mesh.vertex_edge(other);
        self.mesh.splice(e1, e2);
    }

    // ---------- region bookkeeping ----------

    fn compute_winding(&mut self, reg: RegionId) {
        let right = self.regions.right(reg);
        let w = self.regions[right].winding + self.mesh.winding(self.regions[reg].edge);
        self.regions[reg].winding = w;
        self.regions[reg].inside = self.fill_rule.is_in(w);
    }

    fn delete_region(&mut self, reg: RegionId) {
        if self.regions[reg].fix_upper_edge {
            // A temporary edge is only ever discarded with zero winding.
            debug_assert_eq!(self.mesh.winding(self.regions[reg].edge), 0);
        }
        let e = self.regions[reg].edge;
        self.mesh.set_active_region(e, None);
        self.regions.remove(reg);
    }

    /// Closes a region: its winding and inside flag are stamped onto the
    /// mesh face to its left, which is complete from here on.
    fn finish_region(&mut self, reg: RegionId) {
        let e = self.regions[reg].edge;
        let f = self.mesh.face(e);
        let inside = self.regions[reg].inside;
        let winding = self.regions[reg].winding;
        self.mesh.set_inside(f, inside);
        self.mesh.set_face_winding(f, winding);
        self.mesh.set_face_edge(f, e);
        self.delete_region(reg);
    }

    /// Swaps the temporary bounding edge of `reg` for a real one.
    fn fix_upper_edge(&mut self, reg: RegionId, new_edge: HalfEdgeId) {
        debug_assert!(self.regions[reg].fix_upper_edge);
        let old = self.regions[reg].edge;
        self.mesh.delete_edge(old);
        self.regions[reg].fix_upper_edge = false;
        self.regions[reg].edge = new_edge;
        self.mesh.set_active_region(new_edge, Some(reg));
    }

    /// Walks right past every region whose edge has the same (pending)
    /// origin as `reg`'s, returning the first region beyond the run. A
    /// temporary bounding edge found there is replaced by a real connection
    /// to the run.
    fn right_bound_of_run(&mut self, reg: RegionId) -> RegionId {
        let org = self.mesh.org(self.regions[reg].edge);
        let mut reg = reg;
        loop {
            reg = self.regions.right(reg);
            if self.mesh.org(self.regions[reg].edge) != org {
                break;
            }
        }

        if self.regions[reg].fix_upper_edge {
            let below = self.regions.left(reg);
            let a = sym(self.regions[below].edge);
            let b = self.mesh.lnext(self.regions[reg].edge);
            let e_new = self.mesh.connect(a, b);
            self.fix_upper_edge(reg, e_new);
            reg = self.regions.right(reg);
        }
        reg
    }

    /// Like `right_bound_of_run`, but for a run of edges sharing their
    /// processed destination.
    fn right_bound_of_dst_run(&mut self, reg: RegionId) -> RegionId {
        let dst = self.mesh.dst(self.regions[reg].edge);
        let mut reg = reg;
        loop {
            reg = self.regions.right(reg);
            if self.mesh.dst(self.regions[reg].edge) != dst {
                break;
            }
        }
        reg
    }

    /// Finishes the run of regions whose edges end at the current event,
    /// walking right to left from `reg_first` until `reg_last` (or until the
    /// run ends). The mesh is relinked so the finished edges are
    /// consecutive around the event, and temporary edges encountered in the
    /// run are made real. Returns the leftmost edge ending at the event.
    fn finish_ending_regions(
        &mut self,
        reg_first: RegionId,
        reg_last: Option<RegionId>,
    ) -> HalfEdgeId {
        let mut reg_prev = reg_first;
        let mut e_prev = self.regions[reg_first].edge;

        while Some(reg_prev) != reg_last {
            // If this region's edge was temporary, its placement turned out
            // to be correct after all.
            self.regions[reg_prev].fix_upper_edge = false;

            let reg = self.regions.left(reg_prev);
            let mut e = self.regions[reg].edge;
            if self.mesh.org(e) != self.mesh.org(e_prev) {
                if !self.regions[reg].fix_upper_edge {
                    self.finish_region(reg_prev);
                    break;
                }
                // A temporary edge from below; connect it to the event.
                let lprev = self.mesh.lprev(e_prev);
                e = self.mesh.connect(lprev, sym(e));
                self.fix_upper_edge(reg, e);
            }

            // Make the two edges consecutive in the ring around the event.
            if self.mesh.onext(e_prev) != e {
                let oprev = self.mesh.oprev(e);
                self.mesh.splice(oprev, e);
                self.mesh.splice(e_prev, e);
            }

            self.finish_region(reg_prev);
            e_prev = self.regions[reg].edge;
            reg_prev = reg;
        }

        e_prev
    }

    /// Inserts regions for the down-going edges `e_first..e_last` (in onext
    /// order around the event) just left of `reg_right`, propagates winding
    /// leftwards through them, merges parallel duplicates, and optionally
    /// runs the dirty-region pass.
    fn insert_down_going_edges(
        &mut self,
        reg_right: RegionId,
        e_first: HalfEdgeId,
        e_last: HalfEdgeId,
        e_rightmost: Option<HalfEdgeId>,
        clean_up: bool,
    ) {
        let mut e = e_first;
        loop {
            debug_assert!(vertex_leq(self.mesh.org_pos(e), self.mesh.dst_pos(e)));
            tess_log!(self, "  new active edge towards {:?}", self.mesh.dst_pos(e));
            let id = self
                .regions
                .insert_before(&self.mesh, self.event, reg_right, sym(e));
            self.mesh.set_active_region(sym(e), Some(id));
            e = self.mesh.onext(e);
            if e == e_last {
                break;
            }
        }

        let e_top = match e_rightmost {
            Some(e) => e,
            None => {
                let below = self.regions.left(reg_right);
                self.mesh.rprev(self.regions[below].edge)
            }
        };

        let mut reg_prev = reg_right;
        let mut e_prev = e_top;
        let mut first_time = true;
        loop {
            let reg = self.regions.left(reg_prev);
            let e = sym(self.regions[reg].edge);
            if self.mesh.org(e) != self.mesh.org(e_prev) {
                break;
            }

            if self.mesh.onext(e) != e_prev {
                // The mesh ring disagrees with the list order; relink.
                let oprev_e = self.mesh.oprev(e);
                self.mesh.splice(oprev_e, e);
                let oprev_prev = self.mesh.oprev(e_prev);
                self.mesh.splice(oprev_prev, e);
            }

            let w = self.regions[reg_prev].winding - self.mesh.winding(e);
            self.regions[reg].winding = w;
            self.regions[reg].inside = self.fill_rule.is_in(w);

            // Two edges with the same slope collapse into one; do it before
            // any intersection tests.
            self.regions[reg_prev].dirty = true;
            if !first_time && self.check_bottom_splice(reg_prev) {
                self.mesh.add_winding(e, e_prev);
                self.delete_region(reg_prev);
                self.mesh.delete_edge(e_prev);
            }
            first_time = false;
            reg_prev = reg;
            e_prev = e;
        }
        self.regions[reg_prev].dirty = true;

        if clean_up {
            self.walk_dirty_regions(reg_prev);
        }
    }

    // ---------- numerical repairs ----------

    /// Repairs the list order at the pending (bottom) endpoints of a
    /// neighboring pair of edges: if one origin pokes through the other
    /// edge, it is spliced into it; coincident origins are merged outright
    /// (removing the stale event through its queue handle). Returns whether
    /// anything was changed.
    fn check_bottom_splice(&mut self, reg_right: RegionId) -> bool {
        let reg_left = self.regions.left(reg_right);
        let e_right = self.regions[reg_right].edge;
        let e_left = self.regions[reg_left].edge;
        let org_r = self.mesh.org_pos(e_right);
        let org_l = self.mesh.org_pos(e_left);
        let dst_r = self.mesh.dst_pos(e_right);
        let dst_l = self.mesh.dst_pos(e_left);

        if vertex_leq(org_r, org_l) {
            if edge_sign(dst_l, org_r, org_l) > 0.0 {
                return false;
            }
            if !vertex_eq(org_r, org_l) {
                // org(e_right) pokes left of e_left: split e_left there.
                tess_log!(self, "  repair: splice right origin into left edge");
                self.mesh.split_edge(sym(e_left));
                let oprev = self.mesh.oprev(e_left);
                self.mesh.splice(e_right, oprev);
                self.regions[reg_right].dirty = true;
                self.regions[reg_left].dirty = true;
            } else if self.mesh.org(e_right) != self.mesh.org(e_left) {
                // Same position, two vertices: merge them, dropping the
                // pending event of the one that goes away.
                tess_log!(self, "  repair: merge coincident origins");
                let doomed = self.mesh.org(e_right);
                if let Some(handle) = self.mesh.queue_handle(doomed) {
                    self.queue.remove(handle);
                    self.mesh.set_queue_handle(doomed, None);
                }
                let oprev = self.mesh.oprev(e_left);
                self.mesh.splice(oprev, e_right);
            }
        } else {
            if edge_sign(dst_r, org_l, org_r) < 0.0 {
                return false;
            }
            // org(e_left) pokes right of e_right: split e_right there.
            tess_log!(self, "  repair: splice left origin into right edge");
            let rr = self.regions.right(reg_right);
            self.regions[rr].dirty = true;
            self.regions[reg_right].dirty = true;
            self.mesh.split_edge(sym(e_right));
            let oprev = self.mesh.oprev(e_left);
            self.mesh.splice(oprev, e_right);
        }
        true
    }

    /// The mirror repair at the processed (top) endpoints: in principle the
    /// order always holds there, but splitting an edge can invalidate an
    /// earlier test, so a destination may end up on the wrong side of its
    /// neighbor. Splice it in when that happens.
    fn check_top_splice(&mut self, reg_right: RegionId) -> bool {
        let reg_left = self.regions.left(reg_right);
        let e_right = self.regions[reg_right].edge;
        let e_left = self.regions[reg_left].edge;
        let dst_r = self.mesh.dst_pos(e_right);
        let dst_l = self.mesh.dst_pos(e_left);
        let org_r = self.mesh.org_pos(e_right);
        let org_l = self.mesh.org_pos(e_left);

        debug_assert!(!vertex_eq(dst_r, dst_l));

        if vertex_leq(dst_r, dst_l) {
            if edge_sign(dst_r, dst_l, org_r) < 0.0 {
                return false;
            }
            // dst(e_left) is left of e_right: split e_right at it.
            tess_log!(self, "  repair: splice left destination into right edge");
            let rr = self.regions.right(reg_right);
            self.regions[rr].dirty = true;
            self.regions[reg_right].dirty = true;
            let e_new = self.mesh.split_edge(e_right);
            self.mesh.splice(sym(e_left), e_new);
            let f = self.mesh.face(e_new);
            let inside = self.regions[reg_right].inside;
            self.mesh.set_inside(f, inside);
        } else {
            if edge_sign(dst_l, dst_r, org_l) > 0.0 {
                return false;
            }
            // dst(e_right) is right of e_left: split e_left at it.
            tess_log!(self, "  repair: splice right destination into left edge");
            self.regions[reg_right].dirty = true;
            self.regions[reg_left].dirty = true;
            let e_new = self.mesh.split_edge(e_left);
            let lnext = self.mesh.lnext(e_right);
            self.mesh.splice(lnext, sym(e_left));
            let f = self.mesh.rface(e_new);
            let inside = self.regions[reg_right].inside;
            self.mesh.set_inside(f, inside);
        }
        true
    }

    /// Checks a neighboring pair for an intersection below the sweep line
    /// and splits both edges there if one exists. Returns true when the
    /// intersection degenerated into re-processing the event (everything is
    /// already handled in that case and the dirty walk must stop).
    fn check_for_intersect(&mut self, reg_right: RegionId) -> bool {
        let reg_left = self.regions.left(reg_right);
        let e_right = self.regions[reg_right].edge;
        let e_left = self.regions[reg_left].edge;
        let org_r_v = self.mesh.org(e_right);
        let org_l_v = self.mesh.org(e_left);
        let dst_r_v = self.mesh.dst(e_right);
        let dst_l_v = self.mesh.dst(e_left);
        let org_r = self.mesh.org_pos(e_right);
        let org_l = self.mesh.org_pos(e_left);
        let dst_r = self.mesh.dst_pos(e_right);
        let dst_l = self.mesh.dst_pos(e_left);
        let event_p = self.event_pos();

        debug_assert!(!vertex_eq(dst_r, dst_l));
        debug_assert!(org_r_v != self.event && org_l_v != self.event);
        debug_assert!(!self.regions[reg_right].fix_upper_edge);
        debug_assert!(!self.regions[reg_left].fix_upper_edge);

        if org_r_v == org_l_v {
            // The pending endpoints already meet.
            return false;
        }

        let x_min_r = org_r.x.min(dst_r.x);
        let x_max_l = org_l.x.max(dst_l.x);
        if x_min_r > x_max_l {
            return false;
        }

        if vertex_leq(org_r, org_l) {
            if edge_sign(dst_l, org_r, org_l) > 0.0 {
                return false;
            }
        } else {
            if edge_sign(dst_r, org_l, org_r) < 0.0 {
                return false;
            }
        }

        let mut isect = edge_intersect(dst_r, org_r, dst_l, org_l);
        tess_log!(self, "  intersection at {:?}", isect);

        if vertex_leq(isect, event_p) {
            // Rounding pushed the intersection above the sweep line; the
            // event is the only safe stand-in.
            isect = event_p;
        }
        // Keep the intersection from crawling past the higher origin.
        let org_min = if vertex_leq(org_r, org_l) { org_r } else { org_l };
        if vertex_leq(org_min, isect) {
            isect = org_min;
        }

        if vertex_eq(isect, org_r) || vertex_eq(isect, org_l) {
            // Intersection exactly at an existing endpoint: splice the rings
            // rather than synthesize a duplicate vertex.
            self.check_bottom_splice(reg_right);
            return false;
        }

        let bad_right = dst_r_v != self.event && edge_sign(dst_r, event_p, isect) >= 0.0;
        let bad_left = dst_l_v != self.event && edge_sign(dst_l, event_p, isect) <= 0.0;
        if bad_right || bad_left {
            // The computed point would fall on the wrong side of the event.
            if dst_l_v == self.event {
                // Splice the event into e_right and re-process around it.
                self.mesh.split_edge(sym(e_right));
                self.mesh.splice(sym(e_left), e_right);
                let reg_right = self.right_bound_of_run(reg_right);
                let below = self.regions.left(reg_right);
                let e_right = self.regions[below].edge;
                self.finish_ending_regions(below, Some(reg_left));
                let oprev = self.mesh.oprev(e_right);
                self.insert_down_going_edges(reg_right, oprev, e_right, Some(e_right), true);
                return true;
            }
            if dst_r_v == self.event {
                // Splice the event into e_left and re-process around it.
                self.mesh.split_edge(sym(e_left));
                let lnext = self.mesh.lnext(e_right);
                let oprev = self.mesh.oprev(e_left);
                self.mesh.splice(lnext, oprev);
                let reg_lo = reg_right;
                let reg_right = self.right_bound_of_dst_run(reg_right);
                let below = self.regions.left(reg_right);
                let e_anchor = self.mesh.rprev(self.regions[below].edge);
                let new_edge = self.mesh.oprev(e_left);
                let old_edge = self.regions[reg_lo].edge;
                self.regions[reg_lo].edge = new_edge;
                self.mesh.set_active_region(old_edge, None);
                self.mesh.set_active_region(new_edge, Some(reg_lo));
                let e_lowest = self.finish_ending_regions(reg_lo, None);
                let first = self.mesh.onext(e_lowest);
                let last = self.mesh.rprev(e_right);
                self.insert_down_going_edges(reg_right, first, last, Some(e_anchor), true);
                return true;
            }
            // Neither destination is the event (we were called from
            // connect_bottom_event): split whichever edge crosses it and
            // leave the rest to the caller.
            if edge_sign(dst_r, event_p, isect) >= 0.0 {
                let rr = self.regions.right(reg_right);
                self.regions[rr].dirty = true;
                self.regions[reg_right].dirty = true;
                self.mesh.split_edge(sym(e_right));
                let v = self.mesh.org(e_right);
                self.mesh.set_position(v, event_p);
            }
            if edge_sign(dst_l, event_p, isect) <= 0.0 {
                self.regions[reg_right].dirty = true;
                self.regions[reg_left].dirty = true;
                self.mesh.split_edge(sym(e_left));
                let v = self.mesh.org(e_left);
                self.mesh.set_position(v, event_p);
            }
            return false;
        }

        // The usual case: split both edges at the intersection, splice the
        // two new vertices into one, and queue it as a future event.
        self.mesh.split_edge(sym(e_right));
        self.mesh.split_edge(sym(e_left));
        let oprev = self.mesh.oprev(e_left);
        self.mesh.splice(oprev, e_right);
        let v = self.mesh.org(e_right);
        self.mesh.set_position(v, isect);
        let handle = self.queue.insert(isect, v);
        self.mesh.set_queue_handle(v, Some(handle));

        let rr = self.regions.right(reg_right);
        self.regions[rr].dirty = true;
        self.regions[reg_right].dirty = true;
        self.regions[reg_left].dirty = true;
        false
    }

    /// Re-checks every dirty pair of neighboring regions, restoring the
    /// list invariants and finding intersections, until nothing is dirty.
    fn walk_dirty_regions(&mut self, reg_start: RegionId) {
        let mut reg_right = reg_start;
        let mut reg_left = self.regions.left(reg_right);

        loop {
            // Move to the leftmost dirty pair.
            while !self.regions.is_end(reg_left) && self.regions[reg_left].dirty {
                reg_right = reg_left;
                reg_left = self.regions.left(reg_left);
            }
            if !self.regions[reg_right].dirty {
                reg_left = reg_right;
                reg_right = self.regions.right(reg_right);
                if self.regions.is_end(reg_right) || !self.regions[reg_right].dirty {
                    return;
                }
            }
            self.regions[reg_right].dirty = false;
            debug_assert!(!self.regions.is_end(reg_left));

            let mut e_right = self.regions[reg_right].edge;
            let mut e_left = self.regions[reg_left].edge;

            if self.mesh.dst(e_right) != self.mesh.dst(e_left) {
                if self.check_top_splice(reg_right) {
                    // A temporary edge involved in a repair is obsolete.
                    if self.regions[reg_left].fix_upper_edge {
                        let e = self.regions[reg_left].edge;
                        self.delete_region(reg_left);
                        self.mesh.delete_edge(e);
                        reg_left = self.regions.left(reg_right);
                        e_left = self.regions[reg_left].edge;
                    } else if self.regions[reg_right].fix_upper_edge {
                        let e = self.regions[reg_right].edge;
                        self.delete_region(reg_right);
                        self.mesh.delete_edge(e);
                        reg_right = self.regions.right(reg_left);
                        e_right = self.regions[reg_right].edge;
                    }
                }
            }

            if self.mesh.org(e_right) != self.mesh.org(e_left) {
                if self.mesh.dst(e_right) != self.mesh.dst(e_left)
                    && !self.regions[reg_right].fix_upper_edge
                    && !self.regions[reg_left].fix_upper_edge
                    && (self.mesh.dst(e_right) == self.event
                        || self.mesh.dst(e_left) == self.event)
                {
                    if self.check_for_intersect(reg_right) {
                        // The event was re-processed; this walk is stale.
                        return;
                    }
                } else {
                    // Can't run the intersection check safely, but the
                    // origins may still violate the order.
                    self.check_bottom_splice(reg_right);
                }
            }

            let e_right_now = self.regions[reg_right].edge;
            let e_left_now = self.regions[reg_left].edge;
            if self.mesh.org(e_right_now) == self.mesh.org(e_left_now)
                && self.mesh.dst(e_right_now) == self.mesh.dst(e_left_now)
            {
                // Two edges bounding a degenerate two-edge loop; fold them.
                tess_log!(self, "  repair: collapse two-edge loop");
                self.mesh.add_winding(e_left_now, e_right_now);
                self.delete_region(reg_right);
                self.mesh.delete_edge(e_right_now);
                reg_right = self.regions.right(reg_left);
            }
        }
    }

    // ---------- event dispatch ----------

    fn sweep_event(&mut self, v: VertexId) {
        self.event = v;

        // Does any edge at this vertex already cross the sweep line?
        let start = self.mesh.vertex_edge(v);
        let mut e = start;
        while self.mesh.active_region(e).is_none() {
            e = self.mesh.onext(e);
            if e == start {
                // No: this is a start vertex.
                self.connect_top_event(v);
                return;
            }
        }

        // Finish all regions whose edges end here, then insert the edges
        // that leave downwards.
        let first = self.mesh.active_region(e).unwrap();
        let reg_right = self.right_bound_of_run(first);
        let reg = self.regions.left(reg_right);
        let e_rightmost = self.regions[reg].edge;
        let e_leftmost = self.finish_ending_regions(reg, None);

        if self.mesh.onext(e_leftmost) == e_rightmost {
            // Nothing goes down from here: this is an end vertex.
            self.connect_bottom_event(reg_right, e_leftmost);
        } else {
            let first_down = self.mesh.onext(e_leftmost);
            self.insert_down_going_edges(
                reg_right,
                first_down,
                e_rightmost,
                Some(e_rightmost),
                true,
            );
        }
    }

    /// Handles an event none of whose edges are active yet. Either the
    /// event is interior to some region and must be connected to the mesh
    /// above it, or it merely starts new regions.
    fn connect_top_event(&mut self, v: VertexId) {
        tess_log!(self, "  start vertex");
        let probe = sym(self.mesh.vertex_edge(v));
        let reg_right = self.regions.search(&self.mesh, self.event, probe);
        let reg_left = self.regions.left(reg_right);
        if self.regions.is_end(reg_left) {
            // Nothing active left of the event; degenerate input.
            return;
        }
        let e_right = self.regions[reg_right].edge;
        let e_left = self.regions[reg_left].edge;

        // The event may lie (within tolerance) on the bounding edge itself.
        let dst_r = self.mesh.dst_pos(e_right);
        let org_r = self.mesh.org_pos(e_right);
        if self.tolerance.on_edge(dst_r, self.event_pos(), org_r) {
            self.connect_top_degenerate(reg_right, v);
            return;
        }

        // Pick the bounding origin nearest the sweep line as the connection
        // target.
        let reg = if vertex_leq(self.mesh.org_pos(e_left), self.mesh.org_pos(e_right)) {
            reg_right
        } else {
            reg_left
        };

        if self.regions[reg_right].inside || self.regions[reg].fix_upper_edge {
            let e_new = if reg == reg_right {
                let a = sym(self.mesh.vertex_edge(v));
                let b = self.mesh.lnext(e_right);
                self.mesh.connect(a, b)
            } else {
                let a = self.mesh.dnext(e_left);
                let b = self.mesh.vertex_edge(v);
                let temp = self.mesh.connect(a, b);
                sym(temp)
            };
            if self.regions[reg].fix_upper_edge {
                self.fix_upper_edge(reg, e_new);
            } else {
                let id = self
                    .regions
                    .insert_before(&self.mesh, self.event, reg_right, e_new);
                self.mesh.set_active_region(e_new, Some(id));
                self.compute_winding(id);
            }
            // Now the vertex has an active edge; run the normal path.
            self.sweep_event(v);
        } else {
            // The event is in an exterior region; just open its edges.
            let an_edge = self.mesh.vertex_edge(v);
            self.insert_down_going_edges(reg_right, an_edge, an_edge, None, true);
        }
    }

    /// The event lies exactly on an already-processed edge or vertex.
    fn connect_top_degenerate(&mut self, reg_right: RegionId, v: VertexId) {
        tess_log!(self, "  event on an active edge");
        let e = self.regions[reg_right].edge;
        let event_p = self.mesh.position(v);

        if vertex_eq(self.mesh.org_pos(e), event_p) {
            // The pending origin of the edge sits at the event; merge them
            // and let the origin's own turn in the queue do the work.
            let e2 = self.mesh.vertex_edge(v);
            self.mesh.splice(e, e2);
            return;
        }

        if !vertex_eq(self.mesh.dst_pos(e), event_p) {
            // The event splits the edge proper.
            self.mesh.split_edge(sym(e));
            if self.regions[reg_right].fix_upper_edge {
                // The lower half of a temporary edge is of no use.
                let onext = self.mesh.onext(e);
                self.mesh.delete_edge(onext);
                self.regions[reg_right].fix_upper_edge = false;
            }
            let e2 = self.mesh.vertex_edge(v);
            self.mesh.splice(e2, e);
            self.sweep_event(v);
            return;
        }

        // The event coincides with the processed destination: splice the new
        // edges into that vertex's ring.
        let reg_right = self.right_bound_of_dst_run(reg_right);
        let reg = self.regions.left(reg_right);
        let mut e_top_right = sym(self.regions[reg].edge);
        let e_top_left = self.mesh.onext(e_top_right);
        let e_last = e_top_left;

        if self.regions[reg].fix_upper_edge {
            // The destination's only down-going edge was temporary; real
            // ones are arriving, so drop it.
            debug_assert!(e_top_left != e_top_right);
            let dead = self.regions[reg].edge;
            self.delete_region(reg);
            self.mesh.delete_edge(dead);
            e_top_right = self.mesh.oprev(e_top_left);
        }

        let e2 = self.mesh.vertex_edge(v);
        self.mesh.splice(e2, e_top_right);

        let e_rightmost = if vertex_leq(self.mesh.dst_pos(e_top_left), self.mesh.org_pos(e_top_left))
        {
            // The destination has up-going edges; anchor the winding walk
            // on the first of them.
            Some(e_top_left)
        } else {
            None
        };

        let first = self.mesh.onext(e_top_right);
        self.insert_down_going_edges(reg_right, first, e_last, e_rightmost, true);
    }

    /// Handles an end vertex: regions closed above it, nothing opening
    /// below. The event must still be connected rightwards for the mesh to
    /// stay monotone, but the edge it will eventually connect to is not
    /// known yet, so a temporary one is added and flagged for repair.
    fn connect_bottom_event(&mut self, reg_right: RegionId, e_leftmost: HalfEdgeId) {
        tess_log!(self, "  end vertex");
        let mut reg_right = reg_right;
        let mut e_leftmost = e_leftmost;
        let mut e_top = self.mesh.onext(e_leftmost);
        let reg_left = self.regions.left(reg_right);
        let e_right = self.regions[reg_right].edge;
        let e_left = self.regions[reg_left].edge;
        let mut degenerate = false;

        if self.mesh.dst(e_right) != self.mesh.dst(e_left) {
            self.check_for_intersect(reg_right);
        }

        // The intersection handling may have moved a bounding origin onto
        // the event; merge in that case.
        let event_p = self.event_pos();
        if vertex_eq(self.mesh.org_pos(e_right), event_p) {
            let oprev = self.mesh.oprev(e_top);
            self.mesh.splice(oprev, e_right);
            reg_right = self.right_bound_of_run(reg_right);
            let below = self.regions.left(reg_right);
            e_top = self.regions[below].edge;
            self.finish_ending_regions(below, Some(reg_left));
            degenerate = true;
        }
        if vertex_eq(self.mesh.org_pos(e_left), event_p) {
            let oprev = self.mesh.oprev(e_left);
            self.mesh.splice(e_leftmost, oprev);
            e_leftmost = self.finish_ending_regions(reg_left, None);
            degenerate = true;
        }
        if degenerate {
            let first = self.mesh.onext(e_leftmost);
            self.insert_down_going_edges(reg_right, first, e_top, Some(e_top), true);
            return;
        }

        // Add the temporary edge, aiming at whichever bounding origin is
        // nearer the sweep line.
        let e_attach = if vertex_leq(self.mesh.org_pos(e_left), self.mesh.org_pos(e_right)) {
            self.mesh.oprev(e_left)
        } else {
            e_right
        };
        let lprev = self.mesh.lprev(e_leftmost);
        let e_new = self.mesh.connect(lprev, e_attach);

        // Insert it without the dirty walk so it can be flagged temporary
        // before anything tries to delete it.
        let last = self.mesh.onext(e_new);
        self.insert_down_going_edges(reg_right, e_new, last, Some(last), false);
        let id = self.mesh.active_region(sym(e_new)).unwrap();
        self.regions[id].fix_upper_edge = true;
        self.walk_dirty_regions(reg_right);
    }

    // ---------- teardown ----------

    /// After the last event only the sentinels (plus at most one orphaned
    /// temporary edge) may remain in the list; anything else means the
    /// repairs failed to restore the order.
    fn done_active_regions(&mut self) -> Result<(), InternalError> {
        let mut fixable = 0;
        loop {
            let reg = self.regions.leftmost();
            if self.regions.is_end(reg) {
                break;
            }
            if !self.regions[reg].sentinel {
                if !self.regions[reg].fix_upper_edge {
                    return Err(InternalError::InconsistentRegionOrder);
                }
                fixable += 1;
                if fixable > 1 {
                    return Err(InternalError::InconsistentRegionOrder);
                }
            }
            debug_assert_eq!(self.regions[reg].winding, 0);
            self.delete_region(reg);
        }
        Ok(())
    }

    /// Deletes faces bounded by only two edges (the sweep can produce them
    /// when splicing, and the sentinel edges always are one).
    fn remove_degenerate_faces(&mut self) {
        for i in self.mesh.face_range() {
            let f = crate::mesh::FaceId::new(i);
            if !self.mesh.is_face_alive(f) {
                continue;
            }
            let e = self.mesh.face_edge(f);
            debug_assert!(self.mesh.lnext(e) != e);

            if self.mesh.lnext(self.mesh.lnext(e)) == e {
                let onext = self.mesh.onext(e);
                if onext != e {
                    self.mesh.add_winding(onext, e);
                }
                self.mesh.delete_edge(e);
            }
        }
    }
}
