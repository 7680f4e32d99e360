//! Integration tests for the topology-changing operations, covering the
//! concrete split/flip scenarios.

use planemesh::{mesh_split_edge, mesh_split_face, trimesh_swap_edge, Mesh, Point3};

fn p(x: f64, y: f64) -> Point3 {
    Point3::new(x, y, 0.0)
}

/// Scenario: split interior edge. A unit-square quad face (0,1,2,3);
/// splitting edge 0-1 at t=0.5 grows it to a pentagon with the new vertex
/// at (0.5, 0, 0) inserted between the two original endpoints.
#[test]
fn split_interior_edge_of_a_quad() {
    let mut m = Mesh::new();
    let a = m.add_vertex(p(0.0, 0.0));
    let b = m.add_vertex(p(1.0, 0.0));
    let c = m.add_vertex(p(1.0, 1.0));
    let d = m.add_vertex(p(0.0, 1.0));
    m.add_face(&[a, b, c, d]).unwrap();

    let w = mesh_split_edge(&mut m, a, b, 0.5, false).unwrap().expect("interior edge splits");
    let coords = m.vertex_coordinates(w).unwrap();
    assert!((coords.x - 0.5).abs() < 1e-12);
    assert!(coords.y.abs() < 1e-12);

    let f = m.faces().next().unwrap();
    let cycle = m.face_vertices(f).unwrap();
    assert_eq!(cycle, vec![a, w, b, c, d]);

    assert!(m.halfedge_of(a, w).is_some());
    assert!(m.halfedge_of(w, a).is_some());
    assert!(m.halfedge_of(w, b).is_some());
    assert!(m.halfedge_of(b, w).is_some());
    assert!(m.halfedge_of(a, b).is_none());
}

/// Edge split with t outside (0, 1) is rejected up front.
#[test]
fn split_edge_rejects_out_of_range_parameter() {
    let mut m = Mesh::new();
    let a = m.add_vertex(p(0.0, 0.0));
    let b = m.add_vertex(p(1.0, 0.0));
    let c = m.add_vertex(p(1.0, 1.0));
    m.add_face(&[a, b, c]).unwrap();
    assert!(mesh_split_edge(&mut m, a, b, 0.0, false).is_err());
    assert!(mesh_split_edge(&mut m, a, b, 1.0, false).is_err());
}

/// A boundary edge with allow_boundary=false is a documented no-op, not an
/// error.
#[test]
fn split_edge_on_boundary_without_allow_boundary_is_a_no_op() {
    let mut m = Mesh::new();
    let a = m.add_vertex(p(0.0, 0.0));
    let b = m.add_vertex(p(1.0, 0.0));
    let c = m.add_vertex(p(1.0, 1.0));
    m.add_face(&[a, b, c]).unwrap();
    // a->b borders OUTSIDE on one side since there's only one triangle.
    let result = mesh_split_edge(&mut m, b, a, 0.5, false).unwrap();
    assert!(result.is_none());
    assert_eq!(m.vertices().count(), 3);
}

/// Scenario: split face by chord. Same quad; splitting by the chord 1-3
/// produces two triangular faces and removes the original.
#[test]
fn split_face_by_chord() {
    let mut m = Mesh::new();
    let a = m.add_vertex(p(0.0, 0.0));
    let b = m.add_vertex(p(1.0, 0.0));
    let c = m.add_vertex(p(1.0, 1.0));
    let d = m.add_vertex(p(0.0, 1.0));
    let quad = m.add_face(&[a, b, c, d]).unwrap();

    let (f1, f2) = mesh_split_face(&mut m, quad, b, d).unwrap();
    assert_eq!(m.face_vertices(f1).unwrap(), vec![b, c, d]);
    assert_eq!(m.face_vertices(f2).unwrap(), vec![d, a, b]);
    assert_eq!(m.faces().count(), 2);
}

#[test]
fn split_face_rejects_vertices_not_on_the_face() {
    let mut m = Mesh::new();
    let a = m.add_vertex(p(0.0, 0.0));
    let b = m.add_vertex(p(1.0, 0.0));
    let c = m.add_vertex(p(1.0, 1.0));
    let d = m.add_vertex(p(0.0, 1.0));
    let quad = m.add_face(&[a, b, c, d]).unwrap();
    let stray = m.add_vertex(p(5.0, 5.0));
    assert!(mesh_split_face(&mut m, quad, a, stray).is_err());
}

#[test]
fn split_face_rejects_already_adjacent_vertices() {
    let mut m = Mesh::new();
    let a = m.add_vertex(p(0.0, 0.0));
    let b = m.add_vertex(p(1.0, 0.0));
    let c = m.add_vertex(p(1.0, 1.0));
    let d = m.add_vertex(p(0.0, 1.0));
    let quad = m.add_face(&[a, b, c, d]).unwrap();
    assert!(mesh_split_face(&mut m, quad, a, b).is_err());
}

/// Scenario: flip edge in a two-triangle strip. Triangles (0,1,2) and
/// (0,2,3) share edge 0-2; flipping it removes that edge and installs
/// 1-3 instead, leaving two triangles each still spanning the original
/// quad's footprint.
#[test]
fn flip_edge_in_two_triangle_strip() {
    let mut m = Mesh::new();
    let v0 = m.add_vertex(p(0.0, 0.0));
    let v1 = m.add_vertex(p(1.0, 0.0));
    let v2 = m.add_vertex(p(1.0, 1.0));
    let v3 = m.add_vertex(p(0.0, 1.0));
    m.add_face(&[v0, v1, v2]).unwrap();
    m.add_face(&[v0, v2, v3]).unwrap();

    let (f1, f2) = trimesh_swap_edge(&mut m, v0, v2).unwrap();

    assert!(m.halfedge_of(v0, v2).is_none());
    assert!(m.halfedge_of(v2, v0).is_none());
    assert!(m.halfedge_of(v1, v3).is_some());
    assert!(m.halfedge_of(v3, v1).is_some());

    let mut corners: Vec<_> = m.face_vertices(f1).unwrap();
    corners.sort_by_key(|v| v.0);
    let mut all: std::collections::HashSet<_> = corners.into_iter().collect();
    all.extend(m.face_vertices(f2).unwrap());
    assert_eq!(all, std::collections::HashSet::from([v0, v1, v2, v3]));
    assert_eq!(m.face_vertices(f1).unwrap().len(), 3);
    assert_eq!(m.face_vertices(f2).unwrap().len(), 3);
}

#[test]
fn flip_edge_rejects_boundary_edge() {
    let mut m = Mesh::new();
    let a = m.add_vertex(p(0.0, 0.0));
    let b = m.add_vertex(p(1.0, 0.0));
    let c = m.add_vertex(p(1.0, 1.0));
    m.add_face(&[a, b, c]).unwrap();
    assert!(trimesh_swap_edge(&mut m, a, b).is_err());
}

/// flip_edge is an involution: flipping the shared edge back restores the
/// original two triangles (as vertex sets; face keys themselves are fresh
/// each time since this crate never reuses a tombstoned key).
#[test]
fn flip_edge_is_an_involution_on_the_combinatorics() {
    let mut m = Mesh::new();
    let v0 = m.add_vertex(p(0.0, 0.0));
    let v1 = m.add_vertex(p(1.0, 0.0));
    let v2 = m.add_vertex(p(1.0, 1.0));
    let v3 = m.add_vertex(p(0.0, 1.0));
    m.add_face(&[v0, v1, v2]).unwrap();
    m.add_face(&[v0, v2, v3]).unwrap();

    trimesh_swap_edge(&mut m, v0, v2).unwrap();
    trimesh_swap_edge(&mut m, v1, v3).unwrap();

    assert!(m.halfedge_of(v0, v2).is_some());
    assert!(m.halfedge_of(v1, v3).is_none());
    assert_eq!(m.faces().count(), 2);
}

#[test]
fn insert_vertex_into_face_fans_every_corner() {
    let mut m = Mesh::new();
    let a = m.add_vertex(p(0.0, 0.0));
    let b = m.add_vertex(p(1.0, 0.0));
    let c = m.add_vertex(p(1.0, 1.0));
    let d = m.add_vertex(p(0.0, 1.0));
    let quad = m.add_face(&[a, b, c, d]).unwrap();

    let (w, new_faces) = m.insert_vertex(quad, p(0.5, 0.5), None).unwrap();
    assert_eq!(new_faces.len(), 4);
    assert_eq!(m.faces().count(), 4);
    for f in &new_faces {
        assert_eq!(m.face_vertices(*f).unwrap().len(), 3);
    }
    assert!(m.halfedge_of(a, w).is_some());
    assert!(m.halfedge_of(b, w).is_some());
    assert!(m.halfedge_of(c, w).is_some());
    assert!(m.halfedge_of(d, w).is_some());
}
