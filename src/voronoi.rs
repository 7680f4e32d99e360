//! Dual mesh construction and the Voronoi diagram built from it.
//!
//! [`mesh_dual`] is the generic construction (spec §6 library-level
//! operation `mesh_dual`): vertices of the dual are the original's faces,
//! faces of the dual are the original's interior vertices.
//! [`voronoi_from_delaunay`] (spec §4.4) is `mesh_dual` followed by
//! replacing each dual vertex's coordinates — initially a face centroid —
//! with the circumcenter of that Delaunay face.

use ahash::AHashMap;

use crate::dcel::VertexKey;
use crate::mesh::{Mesh, Point3};
use crate::predicates;

/// Builds the dual of `mesh` plus the reverse map from each dual vertex
/// back to the original face it was built from — [`voronoi_from_delaunay`]
/// needs that map to look up the three face corners for the circumcenter
/// replacement; [`mesh_dual`] just discards it.
fn dual_with_face_map(mesh: &Mesh) -> (Mesh, AHashMap<VertexKey, crate::dcel::FaceKey>) {
    let mut dual = Mesh::new();
    let mut vertex_of_face = AHashMap::new();
    let mut face_of_vertex = AHashMap::new();

    for f in mesh.faces() {
        let centroid = mesh.face_centroid(f).expect("live face");
        let v = dual.add_vertex(centroid);
        vertex_of_face.insert(f, v);
        face_of_vertex.insert(v, f);
    }

    let boundary: std::collections::HashSet<VertexKey> =
        mesh.vertices_on_boundary().into_iter().collect();

    for v in mesh.vertices() {
        if boundary.contains(&v) {
            continue;
        }
        let incident = mesh.vertex_faces(v).expect("live vertex");
        if incident.len() < 3 {
            // Can't form a valid (>= 3 vertex) dual face from this corner.
            continue;
        }
        let cycle: Vec<VertexKey> = incident.iter().map(|f| vertex_of_face[f]).collect();
        let _ = dual.add_face(&cycle);
    }

    (dual, face_of_vertex)
}

/// Constructs the dual of `mesh`: a vertex per face (at that face's
/// centroid) and a face per interior vertex (spec §6 `mesh_dual`).
/// Boundary vertices of `mesh` do not produce dual faces — spec §4.4's
/// documented limitation, since their incident-face fan is an open walk,
/// not a closed cycle, and so cannot bound a face.
pub fn mesh_dual(mesh: &Mesh) -> Mesh {
    dual_with_face_map(mesh).0
}

/// Constructs the Voronoi dual of a Delaunay mesh: [`mesh_dual`], with
/// every dual vertex's coordinates replaced by the circumcenter of the
/// Delaunay face it corresponds to (spec §4.4).
///
/// Returns an empty mesh when every vertex of `delaunay` lies on the
/// boundary — spec §9's documented open question, resolved as "do not
/// invent boundary Voronoi cells" rather than attempt one.
pub fn voronoi_from_delaunay(delaunay: &Mesh) -> Mesh {
    let (mut voronoi, face_of_vertex) = dual_with_face_map(delaunay);

    let updates: Vec<(VertexKey, Point3)> = voronoi
        .vertices()
        .filter_map(|v| {
            let f = *face_of_vertex.get(&v)?;
            let coords = delaunay.face_coordinates(f).ok()?;
            if coords.len() != 3 {
                return None;
            }
            let circle =
                predicates::circle_from_points(coords[0].xy(), coords[1].xy(), coords[2].xy())
                    .ok()?;
            Some((v, Point3::new(circle.center.x, circle.center.y, 0.0)))
        })
        .collect();

    for (v, p) in updates {
        voronoi.dcel.vertex_mut(v).coords = p;
    }

    voronoi
}
