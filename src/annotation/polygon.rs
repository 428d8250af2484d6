//! Polygon annotations in image and sphere coordinates.

use crate::camera::{ConversionError, SphericalModel};
use crate::geometry::{self, is_convex_points, is_regular_points};
use log::{debug, warn};
use nalgebra::{Vector2, Vector3};
use serde::{Deserialize, Serialize};

/// Smallest number of vertices accepted for a polygon annotation.
pub const MIN_VERTICES: usize = 2;
/// Largest number of vertices accepted for a polygon annotation.
pub const MAX_VERTICES: usize = 20;

/// A validated image-plane polygon.
///
/// Construction checks the vertex count, convexity and edge regularity, so a
/// `CartesianPolygon` that exists always satisfies them. Deserialization goes
/// through the same checks.
///
/// # Examples
///
/// ```rust
/// use fisheye_annotations::annotation::CartesianPolygon;
///
/// let square = CartesianPolygon::from_flat(&[0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0]).unwrap();
/// assert_eq!(square.len(), 4);
///
/// let rectangle = CartesianPolygon::from_flat(&[0.0, 0.0, 2.0, 0.0, 2.0, 1.0, 0.0, 1.0]);
/// assert!(rectangle.is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vector2<f64>>", into = "Vec<Vector2<f64>>")]
pub struct CartesianPolygon {
    vertices: Vec<Vector2<f64>>,
}

impl CartesianPolygon {
    /// Creates a polygon from its vertices.
    ///
    /// # Errors
    ///
    /// * [`ConversionError::InvalidVertexCount`] for fewer than 2 or more than 20 vertices.
    /// * [`ConversionError::NonConvexPolygon`]
    /// * [`ConversionError::NonRegularPolygon`]
    pub fn new(vertices: Vec<Vector2<f64>>) -> Result<Self, ConversionError> {
        if !(MIN_VERTICES..=MAX_VERTICES).contains(&vertices.len()) {
            warn!("Rejected polygon with {} vertices", vertices.len());
            return Err(ConversionError::InvalidVertexCount(vertices.len() * 2));
        }
        if !is_convex_points(&vertices) {
            warn!("Rejected non-convex polygon {:?}", vertices);
            return Err(ConversionError::NonConvexPolygon);
        }
        if !is_regular_points(&vertices) {
            warn!("Rejected non-regular polygon {:?}", vertices);
            return Err(ConversionError::NonRegularPolygon);
        }
        Ok(CartesianPolygon { vertices })
    }

    /// Creates a polygon from interleaved `[x0, y0, x1, y1, ...]` coordinates.
    ///
    /// # Errors
    ///
    /// Same as [`CartesianPolygon::new`], plus
    /// [`ConversionError::InvalidVertexCount`] for an odd number of values.
    pub fn from_flat(values: &[f64]) -> Result<Self, ConversionError> {
        CartesianPolygon::new(geometry::points_from_flat(values)?)
    }

    pub fn vertices(&self) -> &[Vector2<f64>] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn to_flat(&self) -> Vec<f64> {
        geometry::points_to_flat(&self.vertices)
    }
}

impl TryFrom<Vec<Vector2<f64>>> for CartesianPolygon {
    type Error = ConversionError;

    fn try_from(vertices: Vec<Vector2<f64>>) -> Result<Self, Self::Error> {
        CartesianPolygon::new(vertices)
    }
}

impl From<CartesianPolygon> for Vec<Vector2<f64>> {
    fn from(polygon: CartesianPolygon) -> Self {
        polygon.vertices
    }
}

/// A polygon whose vertices are directions on the unit sphere, one per image vertex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SphericalPolygon {
    pub vertices: Vec<Vector3<f64>>,
}

impl SphericalPolygon {
    /// Interleaved `[x0, y0, z0, x1, y1, z1, ...]` coordinates.
    pub fn to_flat(&self) -> Vec<f64> {
        self.vertices.iter().flat_map(|v| [v.x, v.y, v.z]).collect()
    }
}

/// Convert a validated polygon to the sphere, vertex by vertex.
pub fn polygon_to_spherical<M>(model: &M, polygon: &CartesianPolygon) -> SphericalPolygon
where
    M: ?Sized + SphericalModel,
{
    debug!("Converting polygon with {} vertices", polygon.len());
    SphericalPolygon {
        vertices: polygon
            .vertices()
            .iter()
            .map(|v| model.cartesian_to_sphere(v))
            .collect(),
    }
}

/// Map a spherical polygon back to image vertices.
///
/// The result is not re-validated: lens distortion does not preserve edge
/// lengths, so callers decide whether to rebuild a [`CartesianPolygon`].
///
/// # Errors
///
/// [`ConversionError::DomainError`] if a vertex is not a valid sphere point.
pub fn spherical_to_polygon<M>(
    model: &M,
    polygon: &SphericalPolygon,
) -> Result<Vec<Vector2<f64>>, ConversionError>
where
    M: ?Sized + SphericalModel,
{
    polygon
        .vertices
        .iter()
        .map(|v| model.sphere_to_cartesian(v))
        .collect()
}
