use std::{path::PathBuf, sync::Arc};

use dicom_section::{Axis, Plane, PlanarAxes, Section, SectionParams, VolumeLoader, VolumeParams};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let directory = args.next().map_or_else(|| PathBuf::from("dicom"), PathBuf::from);
    let tilt: f64 = args
        .next()
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(30.0);

    let volume = VolumeLoader::load_from_directory(
        &directory,
        &VolumeParams::default().with_fix_z_duplicates(true),
    )
    .expect("should have loaded files from directory");

    let origin = volume.middle().center();
    let plane = Plane::from_axes(PlanarAxes::XY)
        .rotate(Axis::X, tilt.to_radians())
        .move_to(origin);

    let section = Section::from_plane(Arc::new(volume), &plane, origin, &SectionParams::default())
        .expect("plane should cross the middle slice");
    let image = section
        .to_luma8((512usize, 512usize))
        .expect("should have resampled the section");
    image.save("result.png").expect("should have saved result.png");
}
