//! Fisheye Annotations Library
//!
//! Converts annotations drawn on fisheye images to and from directions on the
//! unit sphere. This library provides:
//! - A fisheye lens model mapping pixels to viewing rays and back
//! - Convexity and edge-regularity checks for polygon annotations
//! - Bounding box conversion for corner-corner, corner-size and center-size boxes
//! - Polygon conversion for validated convex, regular polygons

pub mod annotation;
pub mod camera;
pub mod geometry;

// Re-export commonly used types
pub use camera::{convert_point, ConversionError, LensModel, Resolution, SphericalModel};

pub use annotation::{
    bbox_to_spherical, polygon_to_spherical, spherical_to_bbox, spherical_to_polygon, BBoxFormat,
    CartesianBBox, CartesianPolygon, SphericalBBox, SphericalPolygon,
};

pub use geometry::{is_convex, is_regular};
