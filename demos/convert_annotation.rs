//! Annotation Conversion Example
//!
//! Converts a single point, bounding box or polygon between image coordinates
//! and the unit sphere, and prints the result as JSON.
//!
//! Usage:
//! ```bash
//! cargo run --example convert_annotation -- \
//!   --kind bbox --format cxcywh --values 1200,400,80,60 \
//!   --lens-path samples/lens_image1.yaml
//!
//! cargo run --example convert_annotation -- --kind point --values 0.1,0.2,0.9746794
//! ```

use clap::Parser;
use fisheye_annotations::annotation::{
    bbox_to_spherical, polygon_to_spherical, CartesianBBox, CartesianPolygon,
};
use fisheye_annotations::camera::{convert_point, LensModel, SphericalModel};
use log::info;
use std::path::PathBuf;

/// Fisheye annotation conversion tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Kind of annotation to convert (point, bbox, polygon)
    #[arg(short = 'k', long, default_value = "point")]
    kind: String,

    /// Comma separated annotation values
    #[arg(short = 'v', long, value_delimiter = ',', allow_negative_numbers = true)]
    values: Vec<f64>,

    /// Bounding box format (xyxy, xywh, cxcywh)
    #[arg(short = 'f', long, default_value = "xyxy")]
    format: String,

    /// Path to the lens YAML file; the image-1 reference lens is used when omitted
    #[arg(short = 'p', long)]
    lens_path: Option<PathBuf>,
}

fn load_lens(path: Option<&PathBuf>) -> Result<LensModel, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            let path = path.to_str().ok_or("Lens path is not valid UTF-8")?;
            info!("Loading lens from: {}", path);
            Ok(LensModel::load_from_yaml(path)?)
        }
        None => {
            info!("Using the image-1 reference lens");
            Ok(LensModel::image_1())
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let cli = Cli::parse();
    let lens = load_lens(cli.lens_path.as_ref())?;

    let output = match cli.kind.to_lowercase().as_str() {
        "point" => serde_json::to_string_pretty(&convert_point(&lens, &cli.values)?)?,
        "bbox" => {
            let bbox = CartesianBBox::parse(&cli.values, &cli.format)?;
            serde_json::to_string_pretty(&bbox_to_spherical(&lens, &bbox))?
        }
        "polygon" => {
            let polygon = CartesianPolygon::from_flat(&cli.values)?;
            serde_json::to_string_pretty(&polygon_to_spherical(&lens, &polygon))?
        }
        other => {
            return Err(format!(
                "Unsupported annotation kind: {}. Supported kinds: point, bbox, polygon",
                other
            )
            .into());
        }
    };

    println!("{output}");
    Ok(())
}
