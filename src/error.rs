//! Error kinds returned by mesh operations and geometric predicates.

use std::fmt;

/// Everything that can go wrong building or mutating a [`crate::mesh::Mesh`].
#[derive(Clone, Debug, PartialEq)]
pub enum MeshError {
    /// A numeric parameter was outside its legal range (e.g. a split
    /// parameter `t` not in `(0, 1)`).
    InvalidParameter(String),
    /// A vertex or face key was not present in the mesh.
    UnknownKey,
    /// `split_face`'s chord endpoints do not both lie on the named face.
    NotOnFace,
    /// `split_face`'s chord endpoints are already cyclically adjacent.
    Adjacent,
    /// `flip_edge` was asked to flip an edge with an `OUTSIDE` side.
    BoundaryFlip,
    /// `flip_edge` was asked to flip an edge where one incident face is not
    /// a triangle.
    NotTriangle,
    /// A geometric construction (e.g. a circumcircle) is undefined for the
    /// given input, typically because three points are collinear.
    Degenerate,
}

impl fmt::Display for MeshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeshError::InvalidParameter(msg) => write!(f, "invalid parameter: {msg}"),
            MeshError::UnknownKey => write!(f, "unknown vertex or face key"),
            MeshError::NotOnFace => write!(f, "vertex is not on the named face"),
            MeshError::Adjacent => write!(f, "chord endpoints are already adjacent"),
            MeshError::BoundaryFlip => write!(f, "cannot flip an edge on the outside boundary"),
            MeshError::NotTriangle => write!(f, "flip requires both incident faces to be triangles"),
            MeshError::Degenerate => write!(f, "geometric construction is degenerate (collinear input)"),
        }
    }
}

impl std::error::Error for MeshError {}

pub type MeshResult<T> = Result<T, MeshError>;
