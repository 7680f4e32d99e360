//! Incremental Delaunay triangulation with Lawson edge-flipping.
//!
//! Bootstraps a super-triangle enclosing all sites, inserts each site in
//! input order via point location + [`crate::ops::insert_vertex_into_face`],
//! then restores the empty-circumcircle property around the new vertex by
//! flipping edges on a work stack — the Bowyer–Watson triangulation
//! realized as incremental flips rather than cavity retriangulation.

use geo::Coord;

use crate::dcel::{FaceKey, VertexKey, OUTSIDE};
use crate::mesh::{Mesh, Point3};
use crate::ops;
use crate::predicates;

/// A triangle in the output, as indices into the original `points` slice
/// passed to [`delaunay_from_points`].
pub type Triangle = (usize, usize, usize);

/// Result of a triangulation run: the triangle list plus a diagnostic count
/// of sites that point location failed to place (spec §4.3, §9: "should
/// not occur after super-triangle bootstrap", handled as a recoverable
/// condition rather than an error).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DelaunayResult {
    pub triangles: Vec<Triangle>,
    pub skipped_sites: usize,
}

/// A tiny deterministic xorshift64* generator. Its only job is breaking
/// exact collinearity/cocircularity (spec §4.3 step 1); cryptographic
/// quality is not needed and a `rand` dependency would be overkill for
/// this one caller. Seedable for reproducible tests (spec §9).
struct Xorshift64Star(u64);

impl Xorshift64Star {
    fn new(seed: u64) -> Self {
        // xorshift64* is undefined at seed 0; nudge it off zero.
        Self(if seed == 0 { 0x9E3779B97F4A7C15 } else { seed })
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.0 = x;
        x.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }

    /// Uniform float in `[-bound, bound]`.
    fn jitter(&mut self, bound: f64) -> f64 {
        let unit = (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64; // [0, 1)
        (unit * 2.0 - 1.0) * bound
    }
}

/// Computes the Delaunay triangulation of `points` (planar, `xy`
/// projection). `boundary` and `holes`, when given, clip the result to an
/// outer polygon and cut polygonal holes out of it (spec §4.3 steps 5–6).
/// `tiny` is the jitter magnitude (spec default `1e-12`); `seed` makes the
/// jitter reproducible.
pub fn delaunay_from_points(
    points: &[Coord<f64>],
    boundary: Option<&[Coord<f64>]>,
    holes: Option<&[Vec<Coord<f64>>]>,
    tiny: f64,
    seed: u64,
) -> DelaunayResult {
    let (mesh, skipped_sites) = triangulate_to_mesh(points, boundary, holes, tiny, seed);

    let triangles = mesh
        .faces()
        .map(|f| {
            let verts = mesh.face_vertices(f).expect("live face");
            (verts[0].0, verts[1].0, verts[2].0)
        })
        .collect();

    DelaunayResult {
        triangles,
        skipped_sites,
    }
}

/// Does the actual triangulation, leaving the result as a fully-stitched
/// [`Mesh`] — every vertex key equal to its index into `points` — instead
/// of the plain index-triplet list [`delaunay_from_points`] reduces it to.
/// Public so callers can feed the mesh straight into [`crate::voronoi`]
/// without re-parsing a triangle list back into a mesh themselves (the
/// way the original `Mesh.from_vertices_and_faces(points, faces)` step
/// would, except that reconstruction is not expressible against this
/// crate's `add_face`, which only accepts a fresh, not-yet-stitched
/// cycle — one call per triangle would fight itself over shared edges).
pub fn triangulate_to_mesh(
    points: &[Coord<f64>],
    boundary: Option<&[Coord<f64>]>,
    holes: Option<&[Vec<Coord<f64>>]>,
    tiny: f64,
    seed: u64,
) -> (Mesh, usize) {
    let n = points.len();
    if n < 3 {
        return (Mesh::new(), 0);
    }

    // Step 1: jitter.
    let mut rng = Xorshift64Star::new(seed);
    let jittered: Vec<Coord<f64>> = points
        .iter()
        .map(|p| Coord {
            x: p.x + rng.jitter(tiny),
            y: p.y + rng.jitter(tiny),
        })
        .collect();

    let mut mesh = Mesh::new();
    // Pre-allocate the site vertices under keys 0..n so each site's vertex
    // key equals its index into `points` — insert_vertex_into_face's `key`
    // parameter then reuses these instead of allocating fresh ones.
    let site_keys: Vec<VertexKey> = jittered
        .iter()
        .map(|&c| mesh.add_vertex(Point3::from(c)))
        .collect();

    // Step 2: super-triangle.
    let centroid = predicates::centroid(&jittered);
    let (bmin, bmax) = predicates::bounding_box(&jittered);
    // Guard against a zero-area bbox (e.g. all sites coincide after jitter).
    let diag = predicates::distance(bmin, bmax).max(1.0) * 300.0;
    let s0 = mesh.add_vertex(Point3::new(centroid.x, centroid.y + 2.0 * diag, 0.0));
    let s1 = mesh.add_vertex(Point3::new(
        centroid.x + 3f64.sqrt() * diag,
        centroid.y - diag,
        0.0,
    ));
    let s2 = mesh.add_vertex(Point3::new(
        centroid.x - 3f64.sqrt() * diag,
        centroid.y - diag,
        0.0,
    ));
    let super_vertices = [s0, s1, s2];
    mesh.add_face(&[s0, s1, s2]).expect("fresh super-triangle cycle");

    let mut skipped_sites = 0usize;

    // Step 3: incremental insertion.
    for (i, &site) in site_keys.iter().enumerate() {
        let p = jittered[i];

        let host = mesh.faces().find(|&f| {
            let verts = mesh.face_vertices(f).expect("live face");
            if verts.len() != 3 {
                return false;
            }
            let tri = [
                mesh.vertex_coordinates(verts[0]).unwrap().xy(),
                mesh.vertex_coordinates(verts[1]).unwrap().xy(),
                mesh.vertex_coordinates(verts[2]).unwrap().xy(),
            ];
            predicates::is_point_in_triangle(p, tri, true)
        });

        let Some(host) = host else {
            skipped_sites += 1;
            continue;
        };

        let (_, new_faces) = ops::insert_vertex_into_face(&mut mesh, host, Point3::from(p), Some(site))
            .expect("host face and isolated site vertex satisfy insert_vertex_into_face");

        let mut stack: Vec<FaceKey> = new_faces;
        while let Some(f) = stack.pop() {
            if mesh.require_bounded_face(f).is_err() {
                // Already consumed by an earlier flip in this same pass.
                continue;
            }
            let verts = mesh.face_vertices(f).expect("live face");
            let Some(idx) = verts.iter().position(|&v| v == site) else {
                continue;
            };
            let a = verts[(idx + 1) % 3];
            let b = verts[(idx + 2) % 3];

            let Some(he_ba) = mesh.halfedge_of(b, a) else {
                continue;
            };
            let f_op = mesh.dcel.half_edge(he_ba).face;
            if f_op == OUTSIDE {
                continue;
            }
            let opp_verts = mesh.face_vertices(f_op).expect("live face");
            let Some(&o) = opp_verts.iter().find(|&&v| v != a && v != b) else {
                continue;
            };

            let pa = mesh.vertex_coordinates(a).unwrap().xy();
            let pb = mesh.vertex_coordinates(b).unwrap().xy();
            let po = mesh.vertex_coordinates(o).unwrap().xy();

            // Degenerate (collinear) circumcircles are swallowed as "not in
            // circle" (spec §7) to stay robust to near-collinear triples.
            if let Ok(circle) = predicates::circle_from_points(pa, pb, po) {
                if predicates::is_point_in_circle(p, &circle) {
                    let (f1, f2) = ops::flip_edge(&mut mesh, a, b).expect("both sides are triangles");
                    stack.push(f1);
                    stack.push(f2);
                }
            }
        }
    }

    // Step 4: super-triangle cleanup. delete_vertex removes every face
    // incident to s0/s1/s2 along with the vertices themselves.
    for &s in &super_vertices {
        mesh.delete_vertex(s).expect("super-triangle vertex is live");
    }

    // Step 5: optional outer-boundary clipping.
    if let Some(b) = boundary {
        let outside: Vec<FaceKey> = mesh
            .faces()
            .filter(|&f| {
                let c = mesh.face_centroid(f).expect("live face").xy();
                !predicates::is_point_in_polygon(c, b)
            })
            .collect();
        for f in outside {
            mesh.delete_face(f).expect("live face");
        }
    }

    // Step 6: optional hole clipping.
    if let Some(hs) = holes {
        for h in hs {
            let inside_hole: Vec<FaceKey> = mesh
                .faces()
                .filter(|&f| {
                    let c = mesh.face_centroid(f).expect("live face").xy();
                    predicates::is_point_in_polygon(c, h)
                })
                .collect();
            for f in inside_hole {
                mesh.delete_face(f).expect("live face");
            }
        }
    }

    (mesh, skipped_sites)
}
