//! Planar geometry helpers shared by the annotation converters.

pub mod shape;

pub use shape::{is_convex, is_convex_points, is_regular, is_regular_points, REGULARITY_TOLERANCE};

use crate::camera::{ConversionError, SphericalModel};
use nalgebra::{Vector2, Vector3};

/// Interpret a flat `[x0, y0, x1, y1, ...]` sequence as 2D points.
///
/// Fails with [`ConversionError::InvalidVertexCount`] when the number of
/// values is odd, instead of silently dropping the trailing coordinate.
pub fn points_from_flat(values: &[f64]) -> Result<Vec<Vector2<f64>>, ConversionError> {
    if values.len() % 2 != 0 {
        return Err(ConversionError::InvalidVertexCount(values.len()));
    }
    Ok(values
        .chunks_exact(2)
        .map(|xy| Vector2::new(xy[0], xy[1]))
        .collect())
}

/// Flatten 2D points back into `[x0, y0, x1, y1, ...]`.
pub fn points_to_flat(points: &[Vector2<f64>]) -> Vec<f64> {
    points.iter().flat_map(|p| [p.x, p.y]).collect()
}

/// Generate a grid of sample points that are evenly distributed across the image,
/// together with their directions on the unit sphere
///
/// # Arguments
///
/// * `model` - Lens model providing the image resolution and the sphere mapping
/// * `n` - The approximate number of points to generate
///
/// # Returns
///
/// * A tuple containing:
///   * the pixel coordinates at the center of each grid cell
///   * the corresponding unit-sphere directions
pub fn sample_points<M>(
    model: &M,
    n: usize,
) -> Result<(Vec<Vector2<f64>>, Vec<Vector3<f64>>), ConversionError>
where
    M: ?Sized + SphericalModel,
{
    let resolution = model.get_resolution();
    if resolution.width == 0 || resolution.height == 0 {
        return Err(ConversionError::InvalidParams(
            "Resolution must be non-zero to sample points".to_string(),
        ));
    }
    if n == 0 {
        return Err(ConversionError::InvalidParams(
            "Number of sample points must be positive".to_string(),
        ));
    }

    let width = resolution.width as f64;
    let height = resolution.height as f64;

    // Calculate the number of cells in each dimension
    let num_cells_x = ((n as f64 * (width / height)).sqrt().round() as usize).max(1);
    let num_cells_y = ((n as f64 * (height / width)).sqrt().round() as usize).max(1);

    // Calculate the dimensions of each cell
    let cell_width = width / num_cells_x as f64;
    let cell_height = height / num_cells_y as f64;

    let mut points_2d = Vec::with_capacity(num_cells_x * num_cells_y);
    let mut points_3d = Vec::with_capacity(num_cells_x * num_cells_y);

    // Generate a point at the center of each cell
    for i in 0..num_cells_y {
        for j in 0..num_cells_x {
            let pixel = Vector2::new(
                (j as f64 + 0.5) * cell_width,
                (i as f64 + 0.5) * cell_height,
            );
            points_3d.push(model.cartesian_to_sphere(&pixel));
            points_2d.push(pixel);
        }
    }

    Ok((points_2d, points_3d))
}
