//! Mesh operations: the topology-changing mutators built on top of
//! [`crate::mesh::Mesh`] and [`crate::dcel`].
//!
//! Every function here checks its preconditions up front and performs no
//! partial mutation on failure — either the whole rewiring happens or
//! nothing does.

use crate::dcel::{FaceKey, HalfEdgeKey, VertexKey, OUTSIDE};
use crate::error::{MeshError, MeshResult};
use crate::mesh::{Mesh, Point3};
use crate::predicates;

/// Edges of `cycle[from..to)`, cyclically, in original order.
fn arc_edges(cycle: &[HalfEdgeKey], from: usize, to: usize) -> Vec<HalfEdgeKey> {
    let n = cycle.len();
    let mut out = Vec::new();
    let mut i = from;
    while i != to {
        out.push(cycle[i]);
        i = (i + 1) % n;
    }
    out
}

/// Replaces a half-edge `old` in its cycle with the pair `(a, b)` (`a`
/// shares `old`'s origin, `b` shares its destination), fixing up
/// `prev`/`next`, the owning face's representative half-edge, and the
/// origin vertex's representative half-edge if it pointed at `old`.
fn splice_in(mesh: &mut Mesh, old: HalfEdgeKey, a: HalfEdgeKey, b: HalfEdgeKey) {
    let prev = mesh.dcel.half_edge(old).prev;
    let next = mesh.dcel.half_edge(old).next;
    let face = mesh.dcel.half_edge(old).face;
    let origin = mesh.dcel.half_edge(old).origin;

    if prev == old {
        mesh.dcel.set_next(a, b);
        mesh.dcel.set_next(b, a);
    } else {
        mesh.dcel.set_next(prev, a);
        mesh.dcel.set_next(a, b);
        mesh.dcel.set_next(b, next);
    }

    if mesh.dcel.face(face).half_edge == Some(old) {
        mesh.dcel.face_mut(face).half_edge = Some(a);
    }
    if mesh.dcel.vertex(origin).half_edge == Some(old) {
        mesh.dcel.vertex_mut(origin).half_edge = Some(a);
    }
}

/// Inserts a new vertex `w` on edge `u`–`v` at parameter `t` (measured from
/// `u`), growing each incident non-outside face by one vertex. Returns
/// `Ok(None)` without mutating the mesh when the edge borders `OUTSIDE` and
/// `allow_boundary` is false.
pub fn split_edge(
    mesh: &mut Mesh,
    u: VertexKey,
    v: VertexKey,
    t: f64,
    allow_boundary: bool,
) -> MeshResult<Option<VertexKey>> {
    predicates::check_split_parameter(t)?;
    let uv = mesh.halfedge_of(u, v).ok_or(MeshError::UnknownKey)?;
    let vu = mesh.halfedge_of(v, u).ok_or(MeshError::UnknownKey)?;

    let face_uv = mesh.dcel.half_edge(uv).face;
    let face_vu = mesh.dcel.half_edge(vu).face;
    if !allow_boundary && (face_uv == OUTSIDE || face_vu == OUTSIDE) {
        return Ok(None);
    }

    let w_coords = mesh.edge_point(u, v, t)?;
    let w = mesh.add_vertex(w_coords);

    let (uw, wu) = mesh.link_edge(u, w, face_uv, face_vu);
    let (wv, vw) = mesh.link_edge(w, v, face_uv, face_vu);

    mesh.unlink_edge(u, v);
    splice_in(mesh, uv, uw, wv);
    splice_in(mesh, vu, vw, wu);

    Ok(Some(w))
}

/// Triangle-mesh variant of [`split_edge`]: each incident triangle is
/// bisected into two new triangles sharing a fresh spoke to the split
/// point, instead of growing into a quad.
pub fn split_edge_triangle(
    mesh: &mut Mesh,
    u: VertexKey,
    v: VertexKey,
    t: f64,
    allow_boundary: bool,
) -> MeshResult<Option<VertexKey>> {
    predicates::check_split_parameter(t)?;
    let uv = mesh.halfedge_of(u, v).ok_or(MeshError::UnknownKey)?;
    let vu = mesh.halfedge_of(v, u).ok_or(MeshError::UnknownKey)?;

    let fx = mesh.dcel.half_edge(uv).face;
    let fy = mesh.dcel.half_edge(vu).face;
    if !allow_boundary && (fx == OUTSIDE || fy == OUTSIDE) {
        return Ok(None);
    }

    let w = mesh.add_vertex(mesh.edge_point(u, v, t)?);

    // side_x: the triangle (u, v, o) bordering u->v, described by the two
    // untouched original edges (o->u) and (v->o).
    let side_x = if fx != OUTSIDE {
        let ou = mesh.dcel.half_edge(uv).prev;
        let vo = mesh.dcel.half_edge(uv).next;
        let o = mesh.dcel.half_edge(ou).origin;
        Some((o, ou, vo))
    } else {
        None
    };
    // side_y: the triangle (v, u, o2) bordering v->u.
    let side_y = if fy != OUTSIDE {
        let o2v = mesh.dcel.half_edge(vu).prev;
        let uo2 = mesh.dcel.half_edge(vu).next;
        let o2 = mesh.dcel.half_edge(o2v).origin;
        Some((o2, o2v, uo2))
    } else {
        None
    };

    let f_u1 = side_x.map(|_| mesh.dcel.add_face());
    let f_v1 = side_x.map(|_| mesh.dcel.add_face());
    let f_v2 = side_y.map(|_| mesh.dcel.add_face());
    let f_u2 = side_y.map(|_| mesh.dcel.add_face());

    let left_uw = f_u1.unwrap_or(OUTSIDE);
    let right_uw = f_u2.unwrap_or(OUTSIDE);
    let left_wv = f_v1.unwrap_or(OUTSIDE);
    let right_wv = f_v2.unwrap_or(OUTSIDE);

    mesh.unlink_edge(u, v);
    let (uw, wu) = mesh.link_edge(u, w, left_uw, right_uw);
    let (wv, vw) = mesh.link_edge(w, v, left_wv, right_wv);

    if mesh.dcel.vertex(u).half_edge == Some(uv) {
        mesh.dcel.vertex_mut(u).half_edge = Some(uw);
    }
    if mesh.dcel.vertex(v).half_edge == Some(vu) {
        mesh.dcel.vertex_mut(v).half_edge = Some(vw);
    }

    if let (Some((o, ou, vo)), Some(fu1), Some(fv1)) = (side_x, f_u1, f_v1) {
        let (wo, ow) = mesh.link_edge(w, o, fu1, fv1);

        // triangle (u, w, o)
        mesh.dcel.half_edge_mut(ou).face = fu1;
        mesh.dcel.set_next(uw, wo);
        mesh.dcel.set_next(wo, ou);
        mesh.dcel.set_next(ou, uw);
        mesh.dcel.face_mut(fu1).half_edge = Some(uw);

        // triangle (w, v, o)
        mesh.dcel.half_edge_mut(vo).face = fv1;
        mesh.dcel.set_next(wv, vo);
        mesh.dcel.set_next(vo, ow);
        mesh.dcel.set_next(ow, wv);
        mesh.dcel.face_mut(fv1).half_edge = Some(wv);

        mesh.deleted_faces.insert(fx);
    } else {
        splice_in(mesh, uv, uw, wv);
    }

    if let (Some((o2, o2v, uo2)), Some(fu2), Some(fv2)) = (side_y, f_u2, f_v2) {
        let (wo2, o2w) = mesh.link_edge(w, o2, fv2, fu2);

        // triangle (v, w, o2)
        mesh.dcel.half_edge_mut(o2v).face = fv2;
        mesh.dcel.set_next(vw, wo2);
        mesh.dcel.set_next(wo2, o2v);
        mesh.dcel.set_next(o2v, vw);
        mesh.dcel.face_mut(fv2).half_edge = Some(vw);

        // triangle (w, u, o2)
        mesh.dcel.half_edge_mut(uo2).face = fu2;
        mesh.dcel.set_next(wu, uo2);
        mesh.dcel.set_next(uo2, o2w);
        mesh.dcel.set_next(o2w, wu);
        mesh.dcel.face_mut(fu2).half_edge = Some(wu);

        mesh.deleted_faces.insert(fy);
    } else {
        splice_in(mesh, vu, vw, wu);
    }

    Ok(Some(w))
}

/// Splits face `fkey` along the chord `u`–`v`, producing two faces whose
/// cycles are the two arcs of the original cycle from `u` to `v` and from
/// `v` to `u` (each inclusive of both endpoints).
pub fn split_face(
    mesh: &mut Mesh,
    fkey: FaceKey,
    u: VertexKey,
    v: VertexKey,
) -> MeshResult<(FaceKey, FaceKey)> {
    mesh.require_bounded_face(fkey)?;
    let start = mesh.dcel.face(fkey).half_edge.unwrap();
    let cycle_he: Vec<HalfEdgeKey> = mesh.dcel.face_cycle(start).collect();
    let cycle_v: Vec<VertexKey> = cycle_he
        .iter()
        .map(|&he| mesh.dcel.half_edge(he).origin)
        .collect();
    let n = cycle_v.len();

    let iu = cycle_v.iter().position(|&x| x == u).ok_or(MeshError::NotOnFace)?;
    let iv = cycle_v.iter().position(|&x| x == v).ok_or(MeshError::NotOnFace)?;
    if (iu + 1) % n == iv || (iv + 1) % n == iu {
        return Err(MeshError::Adjacent);
    }

    let arc1 = arc_edges(&cycle_he, iu, iv);
    let arc2 = arc_edges(&cycle_he, iv, iu);

    let f1 = mesh.dcel.add_face();
    let f2 = mesh.dcel.add_face();

    for &he in &arc1 {
        mesh.dcel.half_edge_mut(he).face = f1;
    }
    for &he in &arc2 {
        mesh.dcel.half_edge_mut(he).face = f2;
    }

    let (uv_he, vu_he) = mesh.link_edge(u, v, f2, f1);

    mesh.dcel.set_next(*arc1.last().unwrap(), vu_he);
    mesh.dcel.set_next(vu_he, arc1[0]);
    mesh.dcel.set_next(*arc2.last().unwrap(), uv_he);
    mesh.dcel.set_next(uv_he, arc2[0]);

    mesh.dcel.face_mut(f1).half_edge = Some(arc1[0]);
    mesh.dcel.face_mut(f2).half_edge = Some(arc2[0]);

    mesh.deleted_faces.insert(fkey);
    Ok((f1, f2))
}

/// Flips the shared edge of the two triangles bordering `u`–`v`, replacing
/// it with the opposite diagonal of their quadrilateral.
pub fn flip_edge(mesh: &mut Mesh, u: VertexKey, v: VertexKey) -> MeshResult<(FaceKey, FaceKey)> {
    let uv = mesh.halfedge_of(u, v).ok_or(MeshError::UnknownKey)?;
    let vu = mesh.halfedge_of(v, u).ok_or(MeshError::UnknownKey)?;

    let fx = mesh.dcel.half_edge(uv).face;
    let fy = mesh.dcel.half_edge(vu).face;
    if fx == OUTSIDE || fy == OUTSIDE {
        return Err(MeshError::BoundaryFlip);
    }

    let start_x = mesh.dcel.face(fx).half_edge.unwrap();
    let start_y = mesh.dcel.face(fy).half_edge.unwrap();
    if mesh.dcel.face_cycle(start_x).count() != 3 || mesh.dcel.face_cycle(start_y).count() != 3 {
        return Err(MeshError::NotTriangle);
    }

    let vo1 = mesh.dcel.half_edge(uv).next;
    let o1u = mesh.dcel.half_edge(uv).prev;
    let o1 = mesh.dcel.half_edge(o1u).origin;

    let uo2 = mesh.dcel.half_edge(vu).next;
    let o2v = mesh.dcel.half_edge(vu).prev;
    let o2 = mesh.dcel.half_edge(o2v).origin;

    mesh.unlink_edge(u, v);

    let f1 = mesh.dcel.add_face(); // (u, o2, o1)
    let f2 = mesh.dcel.add_face(); // (v, o1, o2)

    let (o2o1, o1o2) = mesh.link_edge(o2, o1, f1, f2);

    mesh.dcel.half_edge_mut(uo2).face = f1;
    mesh.dcel.half_edge_mut(o1u).face = f1;
    mesh.dcel.set_next(uo2, o2o1);
    mesh.dcel.set_next(o2o1, o1u);
    mesh.dcel.set_next(o1u, uo2);
    mesh.dcel.face_mut(f1).half_edge = Some(uo2);

    mesh.dcel.half_edge_mut(vo1).face = f2;
    mesh.dcel.half_edge_mut(o2v).face = f2;
    mesh.dcel.set_next(vo1, o1o2);
    mesh.dcel.set_next(o1o2, o2v);
    mesh.dcel.set_next(o2v, vo1);
    mesh.dcel.face_mut(f2).half_edge = Some(vo1);

    if mesh.dcel.vertex(u).half_edge == Some(uv) {
        mesh.dcel.vertex_mut(u).half_edge = Some(uo2);
    }
    if mesh.dcel.vertex(v).half_edge == Some(vu) {
        mesh.dcel.vertex_mut(v).half_edge = Some(vo1);
    }

    mesh.deleted_faces.insert(fx);
    mesh.deleted_faces.insert(fy);

    Ok((f1, f2))
}

/// Inserts a vertex at `coords` connected to every corner of `fkey`,
/// replacing it with one triangle per original edge. When `key` is given,
/// that (already-allocated, still-isolated) vertex is reused as `w` instead
/// of allocating a fresh one — the `insert_vertex(fkey, key?, xyz, ...)`
/// protocol entry spec §6 describes, used by [`crate::delaunay`] to insert
/// each site under its own stable point index rather than a counter value.
pub fn insert_vertex_into_face(
    mesh: &mut Mesh,
    fkey: FaceKey,
    coords: Point3,
    key: Option<VertexKey>,
) -> MeshResult<(VertexKey, Vec<FaceKey>)> {
    mesh.require_bounded_face(fkey)?;
    let start = mesh.dcel.face(fkey).half_edge.unwrap();
    let cycle_he: Vec<HalfEdgeKey> = mesh.dcel.face_cycle(start).collect();
    let cycle_v: Vec<VertexKey> = cycle_he
        .iter()
        .map(|&he| mesh.dcel.half_edge(he).origin)
        .collect();
    let k = cycle_v.len();

    let w = match key {
        Some(existing) => {
            mesh.require_vertex(existing)?;
            mesh.dcel.vertex_mut(existing).coords = coords;
            existing
        }
        None => mesh.add_vertex(coords),
    };
    let new_faces: Vec<FaceKey> = (0..k).map(|_| mesh.dcel.add_face()).collect();

    // spoke_from_w[i] = w -> v_i (belongs to triangle i = (v_i, v_{i+1}, w))
    // spoke_to_w[i]   = v_i -> w (belongs to triangle i-1 = (v_{i-1}, v_i, w))
    let mut spoke_from_w = Vec::with_capacity(k);
    let mut spoke_to_w = Vec::with_capacity(k);
    for (i, &vi) in cycle_v.iter().enumerate() {
        let face_left = new_faces[i];
        let face_right = new_faces[(i + k - 1) % k];
        let (wv, vw) = mesh.link_edge(w, vi, face_left, face_right);
        spoke_from_w.push(wv);
        spoke_to_w.push(vw);
    }

    for i in 0..k {
        let rim = cycle_he[i];
        let w_to_vi = spoke_from_w[i];
        let vnext_to_w = spoke_to_w[(i + 1) % k];

        mesh.dcel.half_edge_mut(rim).face = new_faces[i];
        mesh.dcel.set_next(rim, vnext_to_w);
        mesh.dcel.set_next(vnext_to_w, w_to_vi);
        mesh.dcel.set_next(w_to_vi, rim);
        mesh.dcel.face_mut(new_faces[i]).half_edge = Some(rim);
    }

    mesh.deleted_faces.insert(fkey);
    Ok((w, new_faces))
}
