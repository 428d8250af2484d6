//! Convexity and edge-regularity checks for polygon annotations.
//!
//! Both checks walk every vertex triple `(i, i + 1, i + 2)` with wrap-around,
//! so the closing edges from the last vertex back to the first are included.

use crate::camera::ConversionError;
use crate::geometry::points_from_flat;
use nalgebra::Vector2;
use std::f64::consts::TAU;

/// Maximum allowed difference between the squared lengths of adjacent edges.
pub const REGULARITY_TOLERANCE: f64 = 1e-5;

/// Edges `(p[i] -> p[i+1], p[i+1] -> p[i+2])` for every vertex, wrapping around.
fn edge_pairs(
    points: &[Vector2<f64>],
) -> impl Iterator<Item = (Vector2<f64>, Vector2<f64>)> + '_ {
    let n = points.len();
    (0..n).map(move |i| {
        let a = points[i];
        let b = points[(i + 1) % n];
        let c = points[(i + 2) % n];
        (b - a, c - b)
    })
}

/// Tolerance on the total turning angle of a convex polygon.
const WINDING_TOLERANCE: f64 = 1e-6;

/// Returns `true` when the polygon is convex and simple.
///
/// The 2D cross product of consecutive edges must keep one sign around the
/// whole polygon, and the exterior angles must add up to exactly one full turn.
/// Collinear triples that keep going forward do not decide the direction, but
/// zero-length edges, edges that fold straight back, and polygons with no turn
/// at all are rejected. A bowtie fails because its turning direction flips; a
/// pentagram fails because it winds twice.
///
/// Two distinct vertices form a degenerate segment, which is accepted.
pub fn is_convex_points(points: &[Vector2<f64>]) -> bool {
    match points.len() {
        0 | 1 => return true,
        2 => return points[0] != points[1],
        _ => {}
    }

    let mut sign: Option<bool> = None;
    let mut winding = 0.0_f64;

    for (e1, e2) in edge_pairs(points) {
        if e1.norm_squared() == 0.0 {
            return false;
        }
        let cross = e1.x * e2.y - e1.y * e2.x;
        let dot = e1.dot(&e2);
        if cross == 0.0 {
            if dot < 0.0 {
                return false;
            }
            continue;
        }
        let positive = cross > 0.0;
        match sign {
            Some(s) if s != positive => return false,
            _ => sign = Some(positive),
        }
        winding += cross.atan2(dot);
    }

    sign.is_some() && (winding.abs() - TAU).abs() <= WINDING_TOLERANCE
}

/// Returns `true` when every edge has the same squared length as the next one,
/// within [`REGULARITY_TOLERANCE`].
///
/// Only adjacent edge lengths are compared, angles are not, so a rhombus
/// passes while a rectangle with unequal sides does not.
pub fn is_regular_points(points: &[Vector2<f64>]) -> bool {
    edge_pairs(points)
        .all(|(e1, e2)| (e1.norm_squared() - e2.norm_squared()).abs() <= REGULARITY_TOLERANCE)
}

/// [`is_convex_points`] over a flat `[x0, y0, x1, y1, ...]` sequence.
///
/// # Errors
///
/// [`ConversionError::InvalidVertexCount`] if the sequence has an odd length.
pub fn is_convex(values: &[f64]) -> Result<bool, ConversionError> {
    Ok(is_convex_points(&points_from_flat(values)?))
}

/// [`is_regular_points`] over a flat `[x0, y0, x1, y1, ...]` sequence.
///
/// # Errors
///
/// [`ConversionError::InvalidVertexCount`] if the sequence has an odd length.
pub fn is_regular(values: &[f64]) -> Result<bool, ConversionError> {
    Ok(is_regular_points(&points_from_flat(values)?))
}
