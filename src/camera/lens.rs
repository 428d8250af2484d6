//! Implements the equidistant fisheye lens used for spherical annotations.
//!
//! This module provides the [`LensModel`] struct, which adheres to the
//! [`SphericalModel`] trait defined in the parent `camera` module
//! ([`crate::camera`]). A pixel is shifted by the principal point, scaled by
//! the inverse focal length, and its radial distance (scaled by the distortion
//! coefficient `D`) is used as the polar angle of the viewing ray.

use crate::camera::{validation, ConversionError, Resolution, SphericalModel};
use log::info;
use nalgebra::{Vector2, Vector3};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use yaml_rust::{Yaml, YamlLoader};

/// Focal length in pixels of the 1080p reference lens.
pub const DEFAULT_FOCAL_LENGTH: f64 = 714.285714;
/// Distortion coefficient calibrated for the first reference image.
pub const IMAGE_1_DISTORTION: f64 = 1.082984;
/// Distortion coefficient calibrated for the second reference image.
pub const IMAGE_2_DISTORTION: f64 = 0.871413;

/// Represents the fixed optical parameters of a fisheye lens.
///
/// A lens model is plain configuration: it is built once (from a preset, from
/// parameters, or from a YAML file) and passed by reference to every
/// conversion. Nothing in the crate mutates it, so different images with
/// different distortion coefficients can be processed side by side.
///
/// # Examples
///
/// ```rust
/// use nalgebra::Vector2;
/// use fisheye_annotations::camera::{LensModel, Resolution, SphericalModel};
///
/// let lens = LensModel::new(
///     714.285714,
///     Vector2::new(960.0, 540.0),
///     1.082984,
///     Resolution { width: 1920, height: 1080 },
/// )
/// .unwrap();
///
/// let ray = lens.cartesian_to_sphere(&Vector2::new(960.0, 540.0));
/// assert_eq!(ray.z, 1.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LensModel {
    /// Focal length `f` in pixels.
    pub focal_length: f64,
    /// Principal point (cx, cy) in pixels.
    pub center: Vector2<f64>,
    /// Lens-specific distortion coefficient `D` applied to the radial distance.
    pub distortion: f64,
    /// Image size the lens was configured for.
    pub resolution: Resolution,
}

impl LensModel {
    /// Creates a new [`LensModel`] and validates its parameters.
    ///
    /// # Errors
    ///
    /// * [`ConversionError::FocalLengthMustBePositive`]
    /// * [`ConversionError::PrincipalPointMustBeFinite`]
    /// * [`ConversionError::InvalidParams`] if the distortion coefficient is not positive
    pub fn new(
        focal_length: f64,
        center: Vector2<f64>,
        distortion: f64,
        resolution: Resolution,
    ) -> Result<Self, ConversionError> {
        let model = LensModel {
            focal_length,
            center,
            distortion,
            resolution,
        };

        model.validate_params()?;

        Ok(model)
    }

    /// The 1080p reference lens with the coefficient calibrated for image 1.
    pub fn image_1() -> Self {
        Self::reference_1080p(IMAGE_1_DISTORTION)
    }

    /// The 1080p reference lens with the coefficient calibrated for image 2.
    pub fn image_2() -> Self {
        Self::reference_1080p(IMAGE_2_DISTORTION)
    }

    /// Returns a copy of this lens with a different distortion coefficient.
    pub fn with_distortion(&self, distortion: f64) -> Result<Self, ConversionError> {
        LensModel::new(self.focal_length, self.center, distortion, self.resolution)
    }

    fn reference_1080p(distortion: f64) -> Self {
        LensModel {
            focal_length: DEFAULT_FOCAL_LENGTH,
            center: Vector2::new(960.0, 540.0),
            distortion,
            resolution: Resolution {
                width: 1920,
                height: 1080,
            },
        }
    }
}

impl Default for LensModel {
    fn default() -> Self {
        LensModel::image_1()
    }
}

/// Reads an image dimension, rejecting values that do not fit in a `u32`.
fn yaml_dimension(value: &Yaml, name: &str) -> Result<u32, ConversionError> {
    let raw = value.as_i64().ok_or_else(|| {
        ConversionError::InvalidParams(format!("Invalid {name}: not an integer"))
    })?;
    u32::try_from(raw)
        .map_err(|_| ConversionError::InvalidParams(format!("Invalid {name}: {raw} out of range")))
}

impl SphericalModel for LensModel {
    /// Maps an image-plane pixel to a direction on the unit sphere.
    ///
    /// `(x, y) = (p - center) / f`, `r = |(x, y)|`. The direction `(x, y)` is
    /// normalized when `r != 0`, then `theta = r * D` gives
    /// `(x sin(theta), y sin(theta), cos(theta))`. The principal point maps to
    /// `(0, 0, 1)`.
    fn cartesian_to_sphere(&self, point_2d: &Vector2<f64>) -> Vector3<f64> {
        let mut x = (point_2d.x - self.center.x) / self.focal_length;
        let mut y = (point_2d.y - self.center.y) / self.focal_length;

        let r = x.hypot(y);
        if r != 0.0 {
            x /= r;
            y /= r;
        }

        let theta = r * self.distortion;
        let sin_theta = theta.sin();

        Vector3::new(x * sin_theta, y * sin_theta, theta.cos())
    }

    /// Maps a unit-sphere direction back to image-plane pixels.
    ///
    /// # Errors
    ///
    /// * [`ConversionError::DomainError`] if `|z| > 1`, a component is not
    ///   finite, or `z == -1` (the antipode has no unique image point).
    fn sphere_to_cartesian(
        &self,
        point_3d: &Vector3<f64>,
    ) -> Result<Vector2<f64>, ConversionError> {
        validation::validate_sphere_point(point_3d)?;

        let mut r = point_3d.z.acos() / self.distortion;
        // At the pole acos(z) is already 0 and the denominator would be 0/0
        if point_3d.z != 1.0 {
            r /= (1.0 - point_3d.z * point_3d.z).sqrt();
        }

        let u = r * point_3d.x * self.focal_length + self.center.x;
        let v = r * point_3d.y * self.focal_length + self.center.y;

        Ok(Vector2::new(u, v))
    }

    /// Loads lens parameters from a YAML file.
    ///
    /// The file is expected to contain a `cam0` section with
    /// `intrinsics: [f, cx, cy]`, `distortion: D` and
    /// `resolution: [width, height]`.
    ///
    /// # Errors
    ///
    /// * [`ConversionError::IOError`]: If there's an issue reading the file.
    /// * [`ConversionError::YamlError`]: If the YAML content is malformed.
    /// * [`ConversionError::InvalidParams`]: If fields are missing or mistyped.
    /// * Errors from `validate_params` if the loaded parameters are invalid.
    fn load_from_yaml(path: &str) -> Result<Self, ConversionError> {
        let contents = fs::read_to_string(path)?;
        let docs = YamlLoader::load_from_str(&contents)?;
        let doc = docs.first().ok_or_else(|| {
            ConversionError::InvalidParams("YAML file contains no document".to_string())
        })?;

        let intrinsics_yaml = doc["cam0"]["intrinsics"].as_vec().ok_or_else(|| {
            ConversionError::InvalidParams("YAML missing 'intrinsics' or not an array".to_string())
        })?;
        if intrinsics_yaml.len() != 3 {
            return Err(ConversionError::InvalidParams(format!(
                "'intrinsics' must hold [f, cx, cy], got {} values",
                intrinsics_yaml.len()
            )));
        }
        let resolution_yaml = doc["cam0"]["resolution"].as_vec().ok_or_else(|| {
            ConversionError::InvalidParams("YAML missing 'resolution' or not an array".to_string())
        })?;
        if resolution_yaml.len() != 2 {
            return Err(ConversionError::InvalidParams(format!(
                "'resolution' must hold [width, height], got {} values",
                resolution_yaml.len()
            )));
        }

        let focal_length = intrinsics_yaml[0].as_f64().ok_or_else(|| {
            ConversionError::InvalidParams("Invalid f: not a float".to_string())
        })?;
        let cx = intrinsics_yaml[1].as_f64().ok_or_else(|| {
            ConversionError::InvalidParams("Invalid cx: not a float".to_string())
        })?;
        let cy = intrinsics_yaml[2].as_f64().ok_or_else(|| {
            ConversionError::InvalidParams("Invalid cy: not a float".to_string())
        })?;
        let distortion = doc["cam0"]["distortion"].as_f64().ok_or_else(|| {
            ConversionError::InvalidParams("Invalid distortion: not a float".to_string())
        })?;

        let resolution = Resolution {
            width: yaml_dimension(&resolution_yaml[0], "width")?,
            height: yaml_dimension(&resolution_yaml[1], "height")?,
        };

        let model = LensModel::new(focal_length, Vector2::new(cx, cy), distortion, resolution)?;
        info!(
            "Loaded lens from {path}: f = {}, center = ({}, {}), D = {}",
            model.focal_length, model.center.x, model.center.y, model.distortion
        );

        Ok(model)
    }

    /// Saves the lens parameters to a YAML file readable by
    /// [`LensModel::load_from_yaml()`].
    ///
    /// # Errors
    ///
    /// * [`ConversionError::YamlError`]: If serialization fails.
    /// * [`ConversionError::IOError`]: If the file cannot be created or written.
    fn save_to_yaml(&self, path: &str) -> Result<(), ConversionError> {
        let yaml = serde_yaml::to_value(serde_yaml::Mapping::from_iter([(
            serde_yaml::Value::String("cam0".to_string()),
            serde_yaml::to_value(serde_yaml::Mapping::from_iter([
                (
                    serde_yaml::Value::String("camera_model".to_string()),
                    serde_yaml::Value::String("fisheye_sphere".to_string()),
                ),
                (
                    serde_yaml::Value::String("intrinsics".to_string()),
                    serde_yaml::to_value(vec![self.focal_length, self.center.x, self.center.y])
                        .map_err(|e| ConversionError::YamlError(e.to_string()))?,
                ),
                (
                    serde_yaml::Value::String("distortion".to_string()),
                    serde_yaml::to_value(self.distortion)
                        .map_err(|e| ConversionError::YamlError(e.to_string()))?,
                ),
                (
                    serde_yaml::Value::String("resolution".to_string()),
                    serde_yaml::to_value(vec![self.resolution.width, self.resolution.height])
                        .map_err(|e| ConversionError::YamlError(e.to_string()))?,
                ),
            ]))
            .map_err(|e| ConversionError::YamlError(e.to_string()))?,
        )]))
        .map_err(|e| ConversionError::YamlError(e.to_string()))?;

        let yaml_string =
            serde_yaml::to_string(&yaml).map_err(|e| ConversionError::YamlError(e.to_string()))?;

        let mut file = fs::File::create(path)?;
        file.write_all(yaml_string.as_bytes())?;

        info!("Saved lens parameters to {path}");
        Ok(())
    }

    fn validate_params(&self) -> Result<(), ConversionError> {
        validation::validate_focal_length(self.focal_length)?;
        validation::validate_center(&self.center)?;
        validation::validate_distortion(self.distortion)?;
        Ok(())
    }

    fn get_resolution(&self) -> Resolution {
        self.resolution
    }
}
