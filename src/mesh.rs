//! The public mesh facade: vertex/face storage with 3D coordinates, a
//! half-edge directory keyed by endpoint pair, and the mesh protocol
//! consumed by [`crate::ops`], [`crate::delaunay`] and [`crate::voronoi`].
//!
//! Single-threaded, synchronous, no I/O. Mutation goes exclusively through
//! `&mut Mesh` methods (ordinary Rust borrowing already gives the exclusive
//! access this model assumes; no additional locking is needed).

use ahash::{AHashMap, AHashSet};
use geo::Coord;

use crate::dcel::{Dcel, FaceKey, HalfEdgeKey, VertexKey, OUTSIDE};
use crate::error::{MeshError, MeshResult};
use crate::predicates;

/// A mesh vertex coordinate: planar operations read only `(x, y)`; `z` rides
/// along for callers that need a 3D position (e.g. a terrain mesh).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// The planar projection used by every geometric predicate.
    pub fn xy(&self) -> Coord<f64> {
        Coord {
            x: self.x,
            y: self.y,
        }
    }
}

impl From<Coord<f64>> for Point3 {
    fn from(c: Coord<f64>) -> Self {
        Self {
            x: c.x,
            y: c.y,
            z: 0.0,
        }
    }
}

fn lerp(a: Point3, b: Point3, t: f64) -> Point3 {
    Point3 {
        x: a.x + (b.x - a.x) * t,
        y: a.y + (b.y - a.y) * t,
        z: a.z + (b.z - a.z) * t,
    }
}

/// A half-edge mesh over [`Point3`] vertices.
///
/// Wraps a [`Dcel`] and adds the `(origin, dest) -> half-edge` directory
/// lookup the operations in [`crate::ops`] need, plus tombstone sets so
/// deleted keys are never reused (`VertexKey`/`FaceKey` allocation is
/// monotonic; spec data model, §3).
#[derive(Clone, Debug)]
pub struct Mesh {
    pub(crate) dcel: Dcel<Point3>,
    pub(crate) directory: AHashMap<(VertexKey, VertexKey), HalfEdgeKey>,
    pub(crate) deleted_vertices: AHashSet<VertexKey>,
    pub(crate) deleted_faces: AHashSet<FaceKey>,
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}

impl Mesh {
    pub fn new() -> Self {
        Self {
            dcel: Dcel::new(),
            directory: AHashMap::new(),
            deleted_vertices: AHashSet::new(),
            deleted_faces: AHashSet::new(),
        }
    }

    // -----------------------------------------------------------------
    // Validation helpers
    // -----------------------------------------------------------------

    pub(crate) fn require_vertex(&self, v: VertexKey) -> MeshResult<()> {
        if v.0 >= self.dcel.num_vertices() || self.deleted_vertices.contains(&v) {
            Err(MeshError::UnknownKey)
        } else {
            Ok(())
        }
    }

    pub(crate) fn require_bounded_face(&self, f: FaceKey) -> MeshResult<()> {
        if f == OUTSIDE
            || f.0 >= self.dcel.num_faces()
            || self.deleted_faces.contains(&f)
            || self.dcel.face(f).half_edge.is_none()
        {
            Err(MeshError::UnknownKey)
        } else {
            Ok(())
        }
    }

    /// Adds a twin half-edge pair `u -> v` / `v -> u` and records both
    /// directions in the directory.
    pub(crate) fn link_edge(
        &mut self,
        u: VertexKey,
        v: VertexKey,
        face_left: FaceKey,
        face_right: FaceKey,
    ) -> (HalfEdgeKey, HalfEdgeKey) {
        let (uv, vu) = self.dcel.add_edge(u, v, face_left, face_right);
        self.directory.insert((u, v), uv);
        self.directory.insert((v, u), vu);
        (uv, vu)
    }

    /// Removes both directions of an edge from the directory. The
    /// underlying half-edge records are left in the `Dcel` but become
    /// unreachable once no face or vertex references them.
    pub(crate) fn unlink_edge(&mut self, u: VertexKey, v: VertexKey) {
        self.directory.remove(&(u, v));
        self.directory.remove(&(v, u));
    }

    /// Repairs `v`'s representative half-edge after surrounding topology
    /// changed: if it still names a live directed edge, leaves it alone;
    /// otherwise picks the first of `candidates` (gathered via `vertex_star`
    /// *before* the mutation) that still does, or `None` if `v` ended up
    /// isolated.
    pub(crate) fn repair_representative(&mut self, v: VertexKey, candidates: &[HalfEdgeKey]) {
        let stale = match self.dcel.vertex(v).half_edge {
            Some(he) => {
                let o = self.dcel.half_edge(he).origin;
                let d = self.dcel.dest(he);
                !self.directory.contains_key(&(o, d))
            }
            None => true,
        };
        if !stale {
            return;
        }
        let replacement = candidates.iter().copied().find(|&he| {
            let o = self.dcel.half_edge(he).origin;
            let d = self.dcel.dest(he);
            self.directory.contains_key(&(o, d))
        });
        self.dcel.vertex_mut(v).half_edge = replacement;
    }

    // -----------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------

    /// Adds an isolated vertex.
    pub fn add_vertex(&mut self, coords: Point3) -> VertexKey {
        self.dcel.add_vertex(coords)
    }

    /// Adds a new bounded face from an explicit CCW vertex cycle. Every
    /// directed edge of the cycle must be unused; this is the bootstrap
    /// builder for a face with an entirely fresh boundary (e.g. the
    /// Delaunay super-triangle), not a general polygon-soup stitcher.
    /// Faces that share edges with existing geometry are grown by the
    /// operations in [`crate::ops`] instead.
    pub fn add_face(&mut self, vertices: &[VertexKey]) -> MeshResult<FaceKey> {
        let n = vertices.len();
        if n < 3 {
            return Err(MeshError::InvalidParameter(format!(
                "a face needs at least 3 vertices, got {n}"
            )));
        }
        for &v in vertices {
            self.require_vertex(v)?;
        }
        for i in 0..n {
            let u = vertices[i];
            let v = vertices[(i + 1) % n];
            if self.directory.contains_key(&(u, v)) {
                return Err(MeshError::InvalidParameter(format!(
                    "directed edge {u}->{v} already exists"
                )));
            }
        }

        let face = self.dcel.add_face();
        let mut inner = Vec::with_capacity(n);
        let mut outer = Vec::with_capacity(n);
        for i in 0..n {
            let u = vertices[i];
            let v = vertices[(i + 1) % n];
            let (uv, vu) = self.link_edge(u, v, face, OUTSIDE);
            inner.push(uv);
            outer.push(vu);
        }
        for i in 0..n {
            self.dcel.set_next(inner[i], inner[(i + 1) % n]);
        }
        for i in 0..n {
            self.dcel.set_next(outer[i], outer[(i + n - 1) % n]);
        }
        self.dcel.face_mut(face).half_edge = Some(inner[0]);
        self.dcel.face_mut(OUTSIDE).half_edge = Some(outer[0]);
        Ok(face)
    }

    // -----------------------------------------------------------------
    // Deletion
    // -----------------------------------------------------------------

    /// Removes every face incident to `v` (`OUTSIDE` included, if `v` sits
    /// on the boundary), then `v` itself and every directory entry
    /// mentioning it. The region this exposes becomes part of `OUTSIDE`.
    /// Works for any vertex — interior, boundary, or isolated — with no
    /// failure mode beyond [`MeshError::UnknownKey`] for an unknown key.
    ///
    /// For each spoke `s_i` leaving `v` (in `vertex_star` order), the face
    /// `s_i` belongs to contributes one surviving arc: its cycle with both
    /// `v`-incident edges dropped (`s_i` itself and the chord that closes
    /// the wedge back to `v`, which is the twin of the *previous* spoke).
    /// Chaining arc `i` to arc `i-1` — the chord relationship runs
    /// backwards through `vertex_star`'s rotation — rebuilds a single
    /// closed walk around the hole, merging in `OUTSIDE`'s own untouched
    /// remainder where one of the wedges already bordered it.
    pub fn delete_vertex(&mut self, v: VertexKey) -> MeshResult<()> {
        self.require_vertex(v)?;

        let spokes: Vec<HalfEdgeKey> = match self.dcel.vertex(v).half_edge {
            Some(start) => self.dcel.vertex_star(start).collect(),
            None => Vec::new(),
        };

        if spokes.is_empty() {
            self.deleted_vertices.insert(v);
            return Ok(());
        }

        // Neighbors' representative half-edges may name one of v's edges;
        // gather replacement candidates before anything moves.
        let neighbor_candidates: Vec<(VertexKey, Vec<HalfEdgeKey>)> = spokes
            .iter()
            .map(|&spoke| {
                let n = self.dcel.dest(spoke);
                let candidates = match self.dcel.vertex(n).half_edge {
                    Some(start) => self.dcel.vertex_star(start).collect(),
                    None => Vec::new(),
                };
                (n, candidates)
            })
            .collect();

        let k = spokes.len();

        let mut arcs: Vec<Vec<HalfEdgeKey>> = Vec::with_capacity(k);
        for &spoke in &spokes {
            let mut run = Vec::new();
            let mut cur = self.dcel.half_edge(spoke).next;
            while self.dcel.half_edge(cur).origin != v {
                run.push(cur);
                cur = self.dcel.half_edge(cur).next;
            }
            run.pop(); // drop the trailing chord back to v
            arcs.push(run);
        }

        for arc in &arcs {
            for &he in arc {
                self.dcel.half_edge_mut(he).face = OUTSIDE;
            }
        }

        if arcs.iter().any(|a| !a.is_empty()) {
            for i in 0..k {
                if arcs[i].is_empty() {
                    continue;
                }
                let mut j = (i + k - 1) % k;
                while arcs[j].is_empty() {
                    j = (j + k - 1) % k;
                }
                let last = *arcs[i].last().unwrap();
                let first = arcs[j][0];
                self.dcel.set_next(last, first);
            }
        }

        for &spoke in &spokes {
            let f = self.dcel.half_edge(spoke).face;
            if f != OUTSIDE {
                self.deleted_faces.insert(f);
            }
        }

        if let Some(first_arc) = arcs.iter().find(|a| !a.is_empty()) {
            self.dcel.face_mut(OUTSIDE).half_edge = Some(first_arc[0]);
        }

        for &spoke in &spokes {
            let twin = self.dcel.half_edge(spoke).twin;
            let origin = self.dcel.half_edge(spoke).origin;
            let dest = self.dcel.half_edge(twin).origin;
            self.unlink_edge(origin, dest);
        }

        for (n, candidates) in &neighbor_candidates {
            self.repair_representative(*n, candidates);
        }

        self.deleted_vertices.insert(v);
        Ok(())
    }

    /// Deletes a bounded face. Edges shared with another bounded face
    /// revert to `OUTSIDE` on this side; edges that already bordered
    /// `OUTSIDE` on the other side vanish entirely (both directions are
    /// removed from the directory).
    pub fn delete_face(&mut self, f: FaceKey) -> MeshResult<()> {
        self.require_bounded_face(f)?;

        let start = self.dcel.face(f).half_edge.unwrap();
        let cycle: Vec<HalfEdgeKey> = self.dcel.face_cycle(start).collect();
        let m = cycle.len();

        let keep: Vec<bool> = cycle
            .iter()
            .map(|&he| {
                let twin = self.dcel.half_edge(he).twin;
                self.dcel.half_edge(twin).face != OUTSIDE
            })
            .collect();

        if keep.iter().all(|&k| !k) {
            for &he in &cycle {
                let u = self.dcel.half_edge(he).origin;
                let v = self.dcel.dest(he);
                self.unlink_edge(u, v);
            }
            self.deleted_faces.insert(f);
            return Ok(());
        }

        for (i, &he) in cycle.iter().enumerate() {
            if keep[i] {
                self.dcel.half_edge_mut(he).face = OUTSIDE;
            }
        }

        for i in 0..m {
            if !keep[i] {
                continue;
            }
            let mut j = (i + 1) % m;
            while !keep[j] {
                j = (j + 1) % m;
            }
            if j != (i + 1) % m {
                self.dcel.set_next(cycle[i], cycle[j]);
            }
        }

        for i in 0..m {
            if keep[i] {
                continue;
            }
            let he = cycle[i];
            let twin = self.dcel.half_edge(he).twin;
            let before = self.dcel.half_edge(twin).prev;
            let after = self.dcel.half_edge(twin).next;
            if before != twin {
                self.dcel.set_next(before, after);
            }
            let u = self.dcel.half_edge(he).origin;
            let v = self.dcel.dest(he);
            self.unlink_edge(u, v);
        }

        let first_kept = cycle[keep.iter().position(|&k| k).unwrap()];
        self.dcel.face_mut(OUTSIDE).half_edge = Some(first_kept);
        self.deleted_faces.insert(f);
        Ok(())
    }

    // -----------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------

    pub fn vertex_coordinates(&self, v: VertexKey) -> MeshResult<Point3> {
        self.require_vertex(v)?;
        Ok(self.dcel.vertex(v).coords)
    }

    pub fn face_vertices(&self, f: FaceKey) -> MeshResult<Vec<VertexKey>> {
        self.require_bounded_face(f)?;
        let start = self.dcel.face(f).half_edge.unwrap();
        Ok(self
            .dcel
            .face_cycle(start)
            .map(|he| self.dcel.half_edge(he).origin)
            .collect())
    }

    pub fn face_coordinates(&self, f: FaceKey) -> MeshResult<Vec<Point3>> {
        self.face_vertices(f)?
            .into_iter()
            .map(|v| self.vertex_coordinates(v))
            .collect()
    }

    pub fn face_centroid(&self, f: FaceKey) -> MeshResult<Point3> {
        let coords = self.face_coordinates(f)?;
        let xy = predicates::centroid(&coords.iter().map(Point3::xy).collect::<Vec<_>>());
        let z = coords.iter().map(|p| p.z).sum::<f64>() / coords.len() as f64;
        Ok(Point3::new(xy.x, xy.y, z))
    }

    /// A point along the directed edge `u -> v` at parameter `t` (`0.0` is
    /// `u`, `1.0` is `v`), by linear interpolation of the endpoint
    /// coordinates.
    pub fn edge_point(&self, u: VertexKey, v: VertexKey, t: f64) -> MeshResult<Point3> {
        if !(0.0..=1.0).contains(&t) {
            return Err(MeshError::InvalidParameter(format!(
                "edge parameter t={t} is not in [0, 1]"
            )));
        }
        if self.halfedge_of(u, v).is_none() {
            return Err(MeshError::UnknownKey);
        }
        let pu = self.vertex_coordinates(u)?;
        let pv = self.vertex_coordinates(v)?;
        Ok(lerp(pu, pv, t))
    }

    /// Bounded faces incident to `v`, in CCW order starting from `v`'s
    /// stored half-edge, with the `OUTSIDE` corner (present for boundary
    /// vertices) filtered out.
    pub fn vertex_faces(&self, v: VertexKey) -> MeshResult<Vec<FaceKey>> {
        self.require_vertex(v)?;
        let Some(start) = self.dcel.vertex(v).half_edge else {
            return Ok(Vec::new());
        };
        Ok(self
            .dcel
            .vertex_star(start)
            .map(|he| self.dcel.half_edge(he).face)
            .filter(|&f| f != OUTSIDE)
            .collect())
    }

    pub fn halfedge_of(&self, u: VertexKey, v: VertexKey) -> Option<HalfEdgeKey> {
        self.directory.get(&(u, v)).copied()
    }

    /// Live vertex keys, in allocation order.
    pub fn vertices(&self) -> impl Iterator<Item = VertexKey> + '_ {
        (0..self.dcel.num_vertices())
            .map(VertexKey)
            .filter(move |v| !self.deleted_vertices.contains(v))
    }

    /// Live bounded face keys, in allocation order.
    pub fn faces(&self) -> impl Iterator<Item = FaceKey> + '_ {
        (1..self.dcel.num_faces()).map(FaceKey).filter(move |f| {
            !self.deleted_faces.contains(f) && self.dcel.face(*f).half_edge.is_some()
        })
    }

    /// One half-edge per live undirected edge (the lower-numbered
    /// [`HalfEdgeKey`] of the twin pair is canonical).
    pub fn edges(&self) -> Vec<HalfEdgeKey> {
        let mut seen: AHashSet<HalfEdgeKey> = AHashSet::new();
        let mut out = Vec::new();
        for &he in self.directory.values() {
            if seen.contains(&he) {
                continue;
            }
            let twin = self.dcel.half_edge(he).twin;
            seen.insert(he);
            seen.insert(twin);
            out.push(if he.0 < twin.0 { he } else { twin });
        }
        out
    }

    /// Vertices lying on `OUTSIDE`'s boundary walk, in CCW order around the
    /// outside (i.e. CW around the mesh interior).
    pub fn vertices_on_boundary(&self) -> Vec<VertexKey> {
        match self.dcel.face(OUTSIDE).half_edge {
            Some(start) => self
                .dcel
                .face_cycle(start)
                .map(|he| self.dcel.half_edge(he).origin)
                .collect(),
            None => Vec::new(),
        }
    }

    /// Splits `f` by inserting a vertex connected to every existing corner
    /// of `f`. Thin wrapper over [`crate::ops::insert_vertex_into_face`];
    /// `key`, when given, reuses an already-allocated isolated vertex
    /// instead of allocating a fresh one.
    pub fn insert_vertex(
        &mut self,
        f: FaceKey,
        coords: Point3,
        key: Option<VertexKey>,
    ) -> MeshResult<(VertexKey, Vec<FaceKey>)> {
        crate::ops::insert_vertex_into_face(self, f, coords, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point3 {
        Point3::new(x, y, 0.0)
    }

    fn make_triangle() -> (Mesh, [VertexKey; 3], FaceKey) {
        let mut m = Mesh::new();
        let a = m.add_vertex(p(0.0, 0.0));
        let b = m.add_vertex(p(2.0, 0.0));
        let c = m.add_vertex(p(1.0, 2.0));
        let f = m.add_face(&[a, b, c]).unwrap();
        (m, [a, b, c], f)
    }

    /// A hub surrounded by four triangles, built by inserting a vertex
    /// into a square face so the hub ends up strictly interior.
    fn make_pyramid() -> (Mesh, VertexKey, [VertexKey; 4], [FaceKey; 4]) {
        let mut m = Mesh::new();
        let n = m.add_vertex(p(0.0, 1.0));
        let w = m.add_vertex(p(-1.0, 0.0));
        let s = m.add_vertex(p(0.0, -1.0));
        let e = m.add_vertex(p(1.0, 0.0));
        let square = m.add_face(&[e, n, w, s]).unwrap();
        let (hub, _) = m.insert_vertex(square, p(0.0, 0.0), None).unwrap();
        let faces: Vec<FaceKey> = m.vertex_faces(hub).unwrap();
        let fs: [FaceKey; 4] = [faces[0], faces[1], faces[2], faces[3]];
        (m, hub, [n, w, s, e], fs)
    }

    #[test]
    fn add_face_wires_outside_boundary() {
        let (m, [a, b, c], f) = make_triangle();
        assert_eq!(m.face_vertices(f).unwrap(), vec![a, b, c]);
        let boundary = m.vertices_on_boundary();
        assert_eq!(boundary.len(), 3);
    }

    #[test]
    fn add_face_rejects_too_few_vertices() {
        let mut m = Mesh::new();
        let a = m.add_vertex(p(0.0, 0.0));
        let b = m.add_vertex(p(1.0, 0.0));
        assert!(m.add_face(&[a, b]).is_err());
    }

    #[test]
    fn face_centroid_of_triangle() {
        let (m, _, f) = make_triangle();
        let c = m.face_centroid(f).unwrap();
        assert!((c.x - 1.0).abs() < 1e-9);
        assert!((c.y - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn edge_point_midpoint() {
        let (m, [a, b, ..], _) = make_triangle();
        let mid = m.edge_point(a, b, 0.5).unwrap();
        assert!((mid.x - 1.0).abs() < 1e-9);
        assert!((mid.y - 0.0).abs() < 1e-9);
    }

    #[test]
    fn edge_point_rejects_unknown_edge() {
        let (m, [a, _, c], _) = make_triangle();
        assert!(m.edge_point(a, c, 0.5).is_ok());
        let mut m2 = Mesh::new();
        let x = m2.add_vertex(p(0.0, 0.0));
        let y = m2.add_vertex(p(1.0, 0.0));
        assert!(m2.edge_point(x, y, 0.5).is_err());
    }

    #[test]
    fn vertex_faces_filters_outside() {
        let (m, [a, ..], f) = make_triangle();
        assert_eq!(m.vertex_faces(a).unwrap(), vec![f]);
    }

    #[test]
    fn halfedge_of_round_trips_with_directory() {
        let (m, [a, b, ..], _) = make_triangle();
        let he = m.halfedge_of(a, b).unwrap();
        assert_eq!(m.dcel.half_edge(he).origin, a);
    }

    #[test]
    fn edges_count_matches_euler_formula() {
        // One triangle: V=3, F=2 (including outside), E=3.
        let (m, ..) = make_triangle();
        assert_eq!(m.edges().len(), 3);
    }

    #[test]
    fn delete_interior_vertex_merges_surrounding_faces() {
        let (mut m, hub, rim, _) = make_pyramid();
        assert!(m.delete_vertex(hub).is_ok());
        assert_eq!(m.faces().count(), 0);
        let boundary = m.vertices_on_boundary();
        assert_eq!(boundary.len(), 4);
        for v in rim {
            assert!(boundary.contains(&v));
        }
    }

    #[test]
    fn delete_boundary_vertex_collapses_onto_the_opposite_edge() {
        let (mut m, [a, b, c], _) = make_triangle();
        assert!(m.delete_vertex(a).is_ok());
        assert_eq!(m.faces().count(), 0);
        assert!(m.halfedge_of(a, b).is_none());
        assert!(m.halfedge_of(a, c).is_none());
        let boundary = m.vertices_on_boundary();
        assert_eq!(boundary.len(), 2);
        assert!(boundary.contains(&b));
        assert!(boundary.contains(&c));
        assert!(m.halfedge_of(b, c).is_some());
    }

    #[test]
    fn delete_isolated_vertex_is_a_no_op_beyond_tombstoning() {
        let mut m = Mesh::new();
        let a = m.add_vertex(p(0.0, 0.0));
        assert!(m.delete_vertex(a).is_ok());
        assert!(m.vertex_coordinates(a).is_err());
    }

    #[test]
    fn delete_standalone_face_clears_boundary() {
        let (mut m, ..) = make_triangle();
        let f = m.faces().next().unwrap();
        assert!(m.delete_face(f).is_ok());
        assert_eq!(m.faces().count(), 0);
        assert!(m.edges().is_empty());
    }

    #[test]
    fn delete_shared_face_reverts_shared_edges_to_outside() {
        let (mut m, hub, _, faces) = make_pyramid();
        assert!(m.delete_face(faces[0]).is_ok());
        assert_eq!(m.faces().count(), 3);
        // hub is still interior: it lost one face but gained no outside
        // corner, because the deleted face's only non-spoke edge reverted
        // to OUTSIDE without touching the hub.
        assert!(m.vertex_faces(hub).unwrap().len() == 3);
    }
}
