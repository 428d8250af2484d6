use approx::assert_relative_eq;
use fisheye_annotations::{
    bbox_to_spherical, convert_point, is_convex, is_regular, polygon_to_spherical, BBoxFormat,
    CartesianBBox, CartesianPolygon, ConversionError, LensModel, SphericalModel,
};
use nalgebra::Vector2;
use std::thread;

#[test]
fn test_lens_from_yaml_matches_preset_conversions() {
    let loaded = LensModel::load_from_yaml("samples/lens_image1.yaml").unwrap();
    let preset = LensModel::image_1();

    let pixel = Vector2::new(1500.0, 200.0);
    assert_eq!(loaded.cartesian_to_sphere(&pixel), preset.cartesian_to_sphere(&pixel));
}

#[test]
fn test_point_round_trip_through_dispatch() {
    let lens = LensModel::image_1();
    for pixel in [[100.0, 100.0], [960.0, 540.0], [1800.0, 1000.0], [1234.5, 321.0]] {
        let ray = convert_point(&lens, &pixel).unwrap();
        assert_relative_eq!(
            (ray[0] * ray[0] + ray[1] * ray[1] + ray[2] * ray[2]).sqrt(),
            1.0,
            epsilon = 1e-9
        );
        let back = convert_point(&lens, &ray).unwrap();
        assert_relative_eq!(back[0], pixel[0], epsilon = 1e-6);
        assert_relative_eq!(back[1], pixel[1], epsilon = 1e-6);
    }
}

#[test]
fn test_out_of_domain_point_is_rejected() {
    let lens = LensModel::image_1();
    assert!(matches!(
        convert_point(&lens, &[0.0, 0.0, -1.5]),
        Err(ConversionError::DomainError(_))
    ));
}

#[test]
fn test_different_lenses_convert_concurrently() {
    let lenses = [LensModel::image_1(), LensModel::image_2()];
    let bbox = CartesianBBox::new(&[1200.0, 400.0, 80.0, 60.0], BBoxFormat::CenterSize).unwrap();

    let handles: Vec<_> = lenses
        .iter()
        .cloned()
        .map(|lens| thread::spawn(move || (bbox_to_spherical(&lens, &bbox), lens)))
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for (spherical, lens) in &results {
        assert_eq!(*spherical, bbox_to_spherical(lens, &bbox));
    }
    assert_ne!(results[0].0, results[1].0);
}

#[test]
fn test_polygon_pipeline() {
    let lens = LensModel::image_2();
    let square = [500.0, 500.0, 520.0, 500.0, 520.0, 520.0, 500.0, 520.0];

    assert!(is_convex(&square).unwrap());
    assert!(is_regular(&square).unwrap());

    let polygon = CartesianPolygon::from_flat(&square).unwrap();
    let spherical = polygon_to_spherical(&lens, &polygon);

    assert_eq!(spherical.vertices.len(), 4);
    assert_eq!(
        spherical.vertices[0],
        lens.cartesian_to_sphere(&Vector2::new(500.0, 500.0))
    );
}

#[test]
fn test_spherical_bbox_serializes_as_json() {
    let lens = LensModel::image_1();
    let bbox = CartesianBBox::parse(&[960.0, 540.0, 0.0, 0.0], "xywh").unwrap();
    let spherical = bbox_to_spherical(&lens, &bbox);

    let json = serde_json::to_string(&spherical).unwrap();
    assert_eq!(json, r#"{"corners":[[0.0,0.0,1.0],[0.0,0.0,1.0]]}"#);

    let format = serde_json::to_string(&BBoxFormat::CenterSize).unwrap();
    assert_eq!(format, r#""cxcywh""#);
}
