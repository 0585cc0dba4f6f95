//! # DICOM-section library
//!
//! This crate reconstructs arbitrary, possibly oblique, sections through a
//! volume assembled from a stack of parallel DICOM slices.
//!
//! Every slice carries its own pixel-to-world mapping (a
//! [`LocalCoordinateSystem`] built from Image Position and Image Orientation).
//! Slices are sorted by the world Z of their first pixel, checked for
//! homogeneity (constant gap, thickness, size, orientation and spacing) and
//! indexed linearly on Z. A [`Section`] is a new coordinate system placed
//! through that volume along any plane; its image is resampled row by row,
//! in parallel using rayon, from the native pixels of whatever slice each
//! world point falls in.
//!
//! Assumptions on the input:
//!  - Parallel slices, stacked along the world Z axis
//!  - No multiframe (always the first frame is used)
//!  - Nearest-neighbour sampling, no interpolation across slices
//!
//! # Examples
//!
//! ## Oblique section through the middle of a series
//!
//! Read all DICOM files from the dicom/ directory, tilt an axial plane by
//! 30 degrees around the X axis and resample a 512x512 image centered on the
//! middle slice.
//!
//! ```no_run
//! # use dicom_section::{Axis, Plane, PlanarAxes, Section, SectionParams, VolumeLoader, VolumeParams};
//! # use std::sync::Arc;
//! let volume = VolumeLoader::load_from_directory("dicom", &VolumeParams::default())
//!     .expect("should have loaded files from directory");
//! let origin = volume.middle().center();
//! let plane = Plane::from_axes(PlanarAxes::XY)
//!     .rotate(Axis::X, 30f64.to_radians())
//!     .move_to(origin);
//! let section = Section::from_plane(Arc::new(volume), &plane, origin, &SectionParams::default())
//!     .expect("plane should cross the middle slice");
//! let image = section
//!     .to_luma8((512usize, 512usize))
//!     .expect("should have resampled the section");
//! image.save("result.png");
//! ```

pub mod enums;
pub mod error;
pub mod lcs;
pub mod params;
pub mod plane;
mod resampler;
pub mod section;
pub mod slice;
pub mod vector;
pub mod volume;
pub mod volume_loader;

#[cfg(test)]
mod test_support;

pub use enums::{
    Axis, Coordinates, Direction, Extent, ImageSize, Locator, Orientation, PlanarAxes, Scale,
    Target,
};
pub use error::{Error, GeometryError, HomogeneityError, Result};
pub use lcs::LocalCoordinateSystem;
pub use params::{SectionParams, VolumeParams};
pub use plane::Plane;
pub use section::Section;
pub use slice::{Slice, SliceMetadata};
pub use vector::{PartialPoint, Point, Vector};
pub use volume::{Volume, ZMapping};
pub use volume_loader::{VolumeLoader, VolumeLoaderError};
