//! Image annotations (bounding boxes and polygons) and their spherical form.
//!
//! Every conversion takes the lens explicitly, so annotations from images shot
//! with different distortion coefficients can be converted concurrently.

pub mod bbox;
pub mod polygon;

pub use bbox::{bbox_to_spherical, spherical_to_bbox, BBoxFormat, CartesianBBox, SphericalBBox};
pub use polygon::{
    polygon_to_spherical, spherical_to_polygon, CartesianPolygon, SphericalPolygon, MAX_VERTICES,
    MIN_VERTICES,
};
