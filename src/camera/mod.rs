//! Lens model and point conversion between the image plane and the unit sphere.
//!
//! The [`SphericalModel`] trait captures the two directions of the mapping,
//! [`LensModel`] implements it for the equidistant fisheye lens used by the
//! annotation converters, and [`convert_point`] dispatches on point arity.

pub mod lens;

pub use lens::LensModel;

use nalgebra::{Vector2, Vector3};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

#[derive(thiserror::Error, Debug)]
pub enum ConversionError {
    #[error("Expected point to be 2D or 3D, got {0} dimensions")]
    InvalidDimension(usize),
    #[error("Invalid bbox format: {0} (expected xyxy, xywh or cxcywh)")]
    InvalidFormat(String),
    #[error("Cartesian bbox must have 4 values, got {0}")]
    InvalidBoxValues(usize),
    #[error("Invalid polygon vertex count: {0} coordinate values")]
    InvalidVertexCount(usize),
    #[error("Polygon must be convex")]
    NonConvexPolygon,
    #[error("Polygon must be regular")]
    NonRegularPolygon,
    #[error("Point is outside the unit sphere domain: {0}")]
    DomainError(String),
    #[error("Focal length must be positive")]
    FocalLengthMustBePositive,
    #[error("Principal point must be finite")]
    PrincipalPointMustBeFinite,
    #[error("Invalid lens parameters: {0}")]
    InvalidParams(String),
    #[error("Failed to load YAML: {0}")]
    YamlError(String),
    #[error("IO Error: {0}")]
    IOError(String),
}

impl From<std::io::Error> for ConversionError {
    fn from(err: std::io::Error) -> Self {
        ConversionError::IOError(err.to_string())
    }
}

impl From<yaml_rust::ScanError> for ConversionError {
    fn from(err: yaml_rust::ScanError) -> Self {
        ConversionError::YamlError(err.to_string())
    }
}

/// Trait defining the mapping between image pixels and viewing rays on the unit sphere
pub trait SphericalModel {
    /// Map an image-plane pixel to a unit-sphere direction
    fn cartesian_to_sphere(&self, point_2d: &Vector2<f64>) -> Vector3<f64>;

    /// Map a unit-sphere direction back to an image-plane pixel
    fn sphere_to_cartesian(
        &self,
        point_3d: &Vector3<f64>,
    ) -> Result<Vector2<f64>, ConversionError>;

    /// Load lens parameters from a YAML file
    fn load_from_yaml(path: &str) -> Result<Self, ConversionError>
    where
        Self: Sized;

    /// Save lens parameters to a YAML file
    fn save_to_yaml(&self, path: &str) -> Result<(), ConversionError>;

    /// Validate lens parameters
    fn validate_params(&self) -> Result<(), ConversionError>;

    fn get_resolution(&self) -> Resolution;
}

/// Convert a single point between image and sphere coordinates.
///
/// A 2-element slice is treated as a pixel and mapped onto the sphere, a
/// 3-element slice is treated as a sphere direction and mapped back to the
/// image. Any other length fails with [`ConversionError::InvalidDimension`].
pub fn convert_point<M>(model: &M, point: &[f64]) -> Result<Vec<f64>, ConversionError>
where
    M: ?Sized + SphericalModel,
{
    match point.len() {
        2 => {
            let p = model.cartesian_to_sphere(&Vector2::new(point[0], point[1]));
            Ok(vec![p.x, p.y, p.z])
        }
        3 => {
            let p = model.sphere_to_cartesian(&Vector3::new(point[0], point[1], point[2]))?;
            Ok(vec![p.x, p.y])
        }
        n => Err(ConversionError::InvalidDimension(n)),
    }
}

/// Common validation functions for lens parameters
pub mod validation {
    use super::*;

    pub fn validate_focal_length(focal_length: f64) -> Result<(), ConversionError> {
        if !focal_length.is_finite() || focal_length <= 0.0 {
            return Err(ConversionError::FocalLengthMustBePositive);
        }
        Ok(())
    }

    pub fn validate_center(center: &Vector2<f64>) -> Result<(), ConversionError> {
        if !center.x.is_finite() || !center.y.is_finite() {
            return Err(ConversionError::PrincipalPointMustBeFinite);
        }
        Ok(())
    }

    pub fn validate_distortion(distortion: f64) -> Result<(), ConversionError> {
        if !distortion.is_finite() || distortion <= 0.0 {
            return Err(ConversionError::InvalidParams(format!(
                "distortion coefficient must be positive and finite, got {distortion}"
            )));
        }
        Ok(())
    }

    /// Check that a sphere point can be mapped back to the image.
    pub fn validate_sphere_point(point_3d: &Vector3<f64>) -> Result<(), ConversionError> {
        if !point_3d.iter().all(|v| v.is_finite()) {
            return Err(ConversionError::DomainError(format!(
                "non-finite component in ({}, {}, {})",
                point_3d.x, point_3d.y, point_3d.z
            )));
        }
        if point_3d.z.abs() > 1.0 {
            return Err(ConversionError::DomainError(format!(
                "z = {} is outside [-1, 1]",
                point_3d.z
            )));
        }
        if point_3d.z == -1.0 {
            return Err(ConversionError::DomainError(
                "antipodal pole z = -1 has no unique image point".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_point_dispatch() {
        let model = LensModel::image_1();

        let sphere = convert_point(&model, &[1.0, 2.0]).unwrap();
        assert_eq!(sphere.len(), 3);
        let expected = model.cartesian_to_sphere(&Vector2::new(1.0, 2.0));
        assert_eq!(sphere, vec![expected.x, expected.y, expected.z]);

        let image = convert_point(&model, &sphere).unwrap();
        assert_eq!(image.len(), 2);
        assert!((image[0] - 1.0).abs() < 1e-6);
        assert!((image[1] - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_convert_point_three_values_takes_inverse_path() {
        let model = LensModel::image_1();
        // (1, 2, 3) is not on the sphere, so the inverse path rejects it
        let result = convert_point(&model, &[1.0, 2.0, 3.0]);
        assert!(matches!(result, Err(ConversionError::DomainError(_))));
    }

    #[test]
    fn test_convert_point_invalid_dimension() {
        let model = LensModel::image_1();
        assert!(matches!(
            convert_point(&model, &[1.0]),
            Err(ConversionError::InvalidDimension(1))
        ));
        assert!(matches!(
            convert_point(&model, &[1.0, 2.0, 3.0, 4.0]),
            Err(ConversionError::InvalidDimension(4))
        ));
        assert!(matches!(
            convert_point(&model, &[]),
            Err(ConversionError::InvalidDimension(0))
        ));
    }

    #[test]
    fn test_validate_sphere_point() {
        assert!(validation::validate_sphere_point(&Vector3::new(0.0, 0.0, 1.0)).is_ok());
        assert!(validation::validate_sphere_point(&Vector3::new(0.0, 0.0, 1.5)).is_err());
        assert!(validation::validate_sphere_point(&Vector3::new(0.0, 0.0, -1.0)).is_err());
        assert!(validation::validate_sphere_point(&Vector3::new(f64::NAN, 0.0, 0.5)).is_err());
    }
}
