//! Bounding box annotations in image and sphere coordinates.

use crate::camera::{ConversionError, SphericalModel};
use log::{debug, warn};
use nalgebra::{Vector2, Vector3};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the four numbers of a [`CartesianBBox`] are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BBoxFormat {
    /// `(x1, y1, x2, y2)`: two opposite corners.
    #[serde(rename = "xyxy")]
    CornerCorner,
    /// `(x, y, w, h)`: first corner plus width and height.
    #[serde(rename = "xywh")]
    CornerSize,
    /// `(cx, cy, w, h)`: box center plus width and height.
    #[serde(rename = "cxcywh")]
    CenterSize,
}

impl BBoxFormat {
    pub fn tag(&self) -> &'static str {
        match self {
            BBoxFormat::CornerCorner => "xyxy",
            BBoxFormat::CornerSize => "xywh",
            BBoxFormat::CenterSize => "cxcywh",
        }
    }
}

impl FromStr for BBoxFormat {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "xyxy" => Ok(BBoxFormat::CornerCorner),
            "xywh" => Ok(BBoxFormat::CornerSize),
            "cxcywh" => Ok(BBoxFormat::CenterSize),
            other => {
                warn!("Rejected unknown bbox format {other:?}");
                Err(ConversionError::InvalidFormat(other.to_string()))
            }
        }
    }
}

impl fmt::Display for BBoxFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// An image-plane bounding box: four values tagged with their [`BBoxFormat`].
///
/// No ordering or area constraint is enforced, so `x1 > x2` or a zero-area box
/// are both accepted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CartesianBBox {
    pub values: [f64; 4],
    pub format: BBoxFormat,
}

impl CartesianBBox {
    /// Creates a box from exactly four values.
    ///
    /// # Errors
    ///
    /// [`ConversionError::InvalidBoxValues`] if `values` does not hold 4 numbers.
    pub fn new(values: &[f64], format: BBoxFormat) -> Result<Self, ConversionError> {
        let values: [f64; 4] = values.try_into().map_err(|_| {
            warn!("Rejected {} bbox with {} values", format, values.len());
            ConversionError::InvalidBoxValues(values.len())
        })?;
        Ok(CartesianBBox { values, format })
    }

    /// Creates a box from four values and a format tag (`xyxy`, `xywh` or `cxcywh`).
    ///
    /// # Errors
    ///
    /// * [`ConversionError::InvalidFormat`] for an unknown tag.
    /// * [`ConversionError::InvalidBoxValues`] if `values` does not hold 4 numbers.
    pub fn parse(values: &[f64], format: &str) -> Result<Self, ConversionError> {
        let format = format.parse::<BBoxFormat>()?;
        CartesianBBox::new(values, format)
    }

    /// The two corners defining the box, normalized from whatever format it is stored in.
    pub fn corners(&self) -> (Vector2<f64>, Vector2<f64>) {
        let [a, b, c, d] = self.values;
        match self.format {
            BBoxFormat::CornerCorner => (Vector2::new(a, b), Vector2::new(c, d)),
            BBoxFormat::CornerSize => (Vector2::new(a, b), Vector2::new(a + c, b + d)),
            BBoxFormat::CenterSize => {
                let half = Vector2::new(c / 2.0, d / 2.0);
                let center = Vector2::new(a, b);
                (center - half, center + half)
            }
        }
    }

    /// The same box expressed in another format.
    pub fn to_format(&self, format: BBoxFormat) -> CartesianBBox {
        let (first, second) = self.corners();
        let size = second - first;
        let values = match format {
            BBoxFormat::CornerCorner => [first.x, first.y, second.x, second.y],
            BBoxFormat::CornerSize => [first.x, first.y, size.x, size.y],
            BBoxFormat::CenterSize => {
                let center = (first + second) / 2.0;
                [center.x, center.y, size.x, size.y]
            }
        };
        CartesianBBox { values, format }
    }
}

/// A bounding box whose two defining corners live on the unit sphere.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SphericalBBox {
    pub corners: [Vector3<f64>; 2],
}

/// Convert a Cartesian box to the sphere by mapping both of its corners.
pub fn bbox_to_spherical<M>(model: &M, bbox: &CartesianBBox) -> SphericalBBox
where
    M: ?Sized + SphericalModel,
{
    let (first, second) = bbox.corners();
    debug!(
        "Converting {} bbox {:?} with corners ({}, {}) ({}, {})",
        bbox.format, bbox.values, first.x, first.y, second.x, second.y
    );
    SphericalBBox {
        corners: [
            model.cartesian_to_sphere(&first),
            model.cartesian_to_sphere(&second),
        ],
    }
}

/// Map a spherical box back to the image as a corner-corner box.
///
/// # Errors
///
/// [`ConversionError::DomainError`] if a corner is not a valid sphere point.
pub fn spherical_to_bbox<M>(
    model: &M,
    bbox: &SphericalBBox,
) -> Result<CartesianBBox, ConversionError>
where
    M: ?Sized + SphericalModel,
{
    let first = model.sphere_to_cartesian(&bbox.corners[0])?;
    let second = model.sphere_to_cartesian(&bbox.corners[1])?;
    Ok(CartesianBBox {
        values: [first.x, first.y, second.x, second.y],
        format: BBoxFormat::CornerCorner,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::LensModel;
    use approx::assert_relative_eq;

    #[test]
    fn test_parse_formats() {
        assert_eq!("xyxy".parse::<BBoxFormat>().unwrap(), BBoxFormat::CornerCorner);
        assert_eq!("xywh".parse::<BBoxFormat>().unwrap(), BBoxFormat::CornerSize);
        assert_eq!("cxcywh".parse::<BBoxFormat>().unwrap(), BBoxFormat::CenterSize);
        assert!(matches!(
            "yolo".parse::<BBoxFormat>(),
            Err(ConversionError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_bbox_requires_four_values() {
        assert!(CartesianBBox::new(&[1.0, 2.0, 3.0, 4.0], BBoxFormat::CornerCorner).is_ok());
        assert!(matches!(
            CartesianBBox::new(&[1.0, 2.0, 3.0], BBoxFormat::CornerCorner),
            Err(ConversionError::InvalidBoxValues(3))
        ));
        assert!(matches!(
            CartesianBBox::parse(&[1.0, 2.0, 3.0, 4.0, 5.0], "xywh"),
            Err(ConversionError::InvalidBoxValues(5))
        ));
        assert!(matches!(
            CartesianBBox::parse(&[1.0, 2.0, 3.0, 4.0], "xy"),
            Err(ConversionError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_corners_per_format() {
        let xyxy = CartesianBBox::parse(&[4.0, 4.0, 6.0, 6.0], "xyxy").unwrap();
        let xywh = CartesianBBox::parse(&[4.0, 4.0, 2.0, 2.0], "xywh").unwrap();
        let cxcywh = CartesianBBox::parse(&[5.0, 5.0, 2.0, 2.0], "cxcywh").unwrap();

        let expected = (Vector2::new(4.0, 4.0), Vector2::new(6.0, 6.0));
        assert_eq!(xyxy.corners(), expected);
        assert_eq!(xywh.corners(), expected);
        assert_eq!(cxcywh.corners(), expected);
    }

    #[test]
    fn test_to_format() {
        let cxcywh = CartesianBBox::parse(&[100.0, 50.0, 20.0, 10.0], "cxcywh").unwrap();
        assert_eq!(
            cxcywh.to_format(BBoxFormat::CornerCorner).values,
            [90.0, 45.0, 110.0, 55.0]
        );
        assert_eq!(
            cxcywh.to_format(BBoxFormat::CornerSize).values,
            [90.0, 45.0, 20.0, 10.0]
        );
        assert_eq!(cxcywh.to_format(BBoxFormat::CenterSize), cxcywh);
    }

    #[test]
    fn test_bbox_formats_agree_on_sphere() {
        let model = LensModel::image_1();
        let center_size = CartesianBBox::parse(&[5.0, 5.0, 2.0, 2.0], "cxcywh").unwrap();
        let corner_corner = CartesianBBox::parse(&[4.0, 4.0, 6.0, 6.0], "xyxy").unwrap();
        let corner_size = CartesianBBox::parse(&[4.0, 4.0, 2.0, 2.0], "xywh").unwrap();

        let a = bbox_to_spherical(&model, &center_size);
        let b = bbox_to_spherical(&model, &corner_corner);
        let c = bbox_to_spherical(&model, &corner_size);

        for k in 0..2 {
            for i in 0..3 {
                assert_relative_eq!(a.corners[k][i], b.corners[k][i], epsilon = 1e-12);
                assert_relative_eq!(c.corners[k][i], b.corners[k][i], epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_degenerate_box_is_accepted() {
        let model = LensModel::image_1();
        let point = CartesianBBox::parse(&[960.0, 540.0, 0.0, 0.0], "cxcywh").unwrap();
        let spherical = bbox_to_spherical(&model, &point);
        assert_eq!(spherical.corners[0], Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(spherical.corners[0], spherical.corners[1]);
    }

    #[test]
    fn test_spherical_bbox_round_trip() {
        let model = LensModel::image_2();
        let bbox = CartesianBBox::parse(&[300.0, 200.0, 400.0, 250.0], "xywh").unwrap();

        let spherical = bbox_to_spherical(&model, &bbox);
        let back = spherical_to_bbox(&model, &spherical).unwrap();

        assert_eq!(back.format, BBoxFormat::CornerCorner);
        let expected = bbox.to_format(BBoxFormat::CornerCorner);
        for i in 0..4 {
            assert_relative_eq!(back.values[i], expected.values[i], epsilon = 1e-6);
        }
    }
}
