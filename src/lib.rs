//! `planemesh` — a planar half-edge mesh core.
//!
//! A half-edge (DCEL) mesh data structure, the topology-changing
//! operations that mutate it (edge split, face split, triangle edge-split,
//! edge flip, vertex insertion, vertex/face deletion), an incremental
//! Delaunay triangulator with Lawson edge-flipping, and the Voronoi dual
//! built from it.
//!
//! Single-threaded and synchronous throughout: every mutation takes
//! `&mut Mesh` and completes or fails atomically before returning, and
//! ordinary Rust borrowing is the only exclusivity mechanism — there is no
//! internal locking, no I/O, and no cancellation mid-operation.
//!
//! Out of scope: 3D (non-planar) Delaunay, constrained Delaunay, exact
//! arbitrary-precision predicates, dynamic deletion during Delaunay
//! construction, mesh file I/O, and visualization — see `DESIGN.md`.

mod dcel;
mod delaunay;
mod error;
mod mesh;
mod ops;
mod predicates;
mod voronoi;

#[doc(inline)]
pub use dcel::{FaceKey, HalfEdgeKey, VertexKey, OUTSIDE};

#[doc(inline)]
pub use error::{MeshError, MeshResult};

#[doc(inline)]
pub use mesh::{Mesh, Point3};

#[doc(inline)]
pub use predicates::{
    bounding_box, centroid, circle_from_points, distance, is_point_in_circle,
    is_point_in_polygon, is_point_in_triangle, Circle,
};

#[doc(inline)]
pub use ops::{
    flip_edge as trimesh_swap_edge, insert_vertex_into_face, split_edge as mesh_split_edge,
    split_edge_triangle as trimesh_split_edge, split_face as mesh_split_face,
};

#[doc(inline)]
pub use delaunay::{delaunay_from_points, triangulate_to_mesh, DelaunayResult, Triangle};

#[doc(inline)]
pub use voronoi::{mesh_dual, voronoi_from_delaunay};
