use crate::{
    error::Error as VolumeError,
    params::VolumeParams,
    slice::{Slice, SliceMetadata},
    vector::{Point, Vector},
    volume::Volume,
};

use dicom::{
    object::{FileDicomObject, InMemDicomObject, open_file},
    pixeldata::{ConvertOptions, PixelDecoder, VoiLutOption},
};
use dicom_dictionary_std::tags;
use ndarray::{Array2, s};
use std::{fs, path::Path};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum VolumeLoaderError {
    #[error("No valid DICOM images found")]
    NoValidImages,

    #[error("Missing or malformed attribute: {0}")]
    MissingAttribute(&'static str),

    #[error("Could not decode pixel data")]
    PixelData,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("DICOM error: {0}")]
    Dicom(#[from] dicom::object::ReadError),

    #[error("Volume error: {0}")]
    Volume(#[from] VolumeError),
}

/// Builds volumes from DICOM files.
///
/// Only the attributes needed to place each image in world space are read:
/// Image Position (Patient), Image Orientation (Patient), Pixel Spacing,
/// Slice Thickness, Rows and Columns. Multiframe objects contribute their
/// first frame.
pub struct VolumeLoader;

impl VolumeLoader {
    /// Load a volume from DICOM objects
    ///
    /// # Arguments
    ///
    /// * `dicom_objects` - Slice of DICOM file objects
    /// * `params` - Volume construction parameters
    ///
    /// # Errors
    ///
    /// Returns error if no valid images are found or the volume can't be built
    pub fn load_from_dicom_objects(
        dicom_objects: &[FileDicomObject<InMemDicomObject>],
        params: &VolumeParams,
    ) -> Result<Volume, VolumeLoaderError> {
        let slices: Vec<_> = dicom_objects
            .iter()
            .enumerate()
            .filter_map(|(i, dicom_object)| match Self::read_slice(dicom_object) {
                Ok(slice) => Some(slice),
                Err(err) => {
                    warn!(object = i, error = %err, "Skipping DICOM object");
                    None
                }
            })
            .collect();

        if slices.is_empty() {
            return Err(VolumeLoaderError::NoValidImages);
        }

        info!(
            slices = slices.len(),
            skipped = dicom_objects.len() - slices.len(),
            "Loaded DICOM slices"
        );

        Ok(Volume::new(slices, params)?)
    }

    /// Load a volume from file paths
    pub fn load_from_file_paths(
        paths: &[impl AsRef<Path>],
        params: &VolumeParams,
    ) -> Result<Volume, VolumeLoaderError> {
        let objects: Result<Vec<_>, _> =
            paths.iter().map(|path| open_file(path.as_ref())).collect();

        Self::load_from_dicom_objects(&objects?, params)
    }

    /// Load a volume from a directory containing .dcm files
    pub fn load_from_directory(
        path: impl AsRef<Path>,
        params: &VolumeParams,
    ) -> Result<Volume, VolumeLoaderError> {
        let paths: Vec<_> = fs::read_dir(path.as_ref())?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                path.extension()
                    .and_then(|s| s.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("dcm"))
            })
            .collect();

        if paths.is_empty() {
            return Err(VolumeLoaderError::NoValidImages);
        }

        Self::load_from_file_paths(&paths, params)
    }

    /// Decode one object into a [`Slice`].
    pub fn read_slice(
        dicom_object: &FileDicomObject<InMemDicomObject>,
    ) -> Result<Slice, VolumeLoaderError> {
        let metadata = Self::read_metadata(dicom_object)?;
        let pixels = Self::decode_image(dicom_object).ok_or(VolumeLoaderError::PixelData)?;
        Ok(Slice::new(pixels, metadata)?)
    }

    fn read_metadata(
        dicom_object: &FileDicomObject<InMemDicomObject>,
    ) -> Result<SliceMetadata, VolumeLoaderError> {
        let floats = |tag, name, len: usize| {
            dicom_object
                .element(tag)
                .ok()
                .and_then(|element| element.to_multi_float64().ok())
                .filter(|values| values.len() >= len)
                .ok_or(VolumeLoaderError::MissingAttribute(name))
        };
        let count = |tag, name| {
            dicom_object
                .element(tag)
                .ok()
                .and_then(|element| element.to_int::<u32>().ok())
                .map(|n| n as usize)
                .ok_or(VolumeLoaderError::MissingAttribute(name))
        };

        let position = floats(tags::IMAGE_POSITION_PATIENT, "ImagePositionPatient", 3)?;
        let orientation = floats(tags::IMAGE_ORIENTATION_PATIENT, "ImageOrientationPatient", 6)?;
        let spacing = floats(tags::PIXEL_SPACING, "PixelSpacing", 2)?;
        let thickness = floats(tags::SLICE_THICKNESS, "SliceThickness", 1)?;

        Ok(SliceMetadata {
            rows: count(tags::ROWS, "Rows")?,
            columns: count(tags::COLUMNS, "Columns")?,
            thickness: thickness[0],
            // Pixel Spacing is (between rows, between columns)
            pixel_spacing: (spacing[1], spacing[0]),
            orientation: (
                Vector::new(orientation[0], orientation[1], orientation[2]),
                Vector::new(orientation[3], orientation[4], orientation[5]),
            ),
            position: Point::new(position[0], position[1], position[2]),
        })
    }

    fn decode_image(dicom_object: &FileDicomObject<InMemDicomObject>) -> Option<Array2<u16>> {
        let pixel_data = dicom_object.decode_pixel_data().ok()?;
        let options = ConvertOptions::new().with_voi_lut(VoiLutOption::First);
        pixel_data
            .to_ndarray_with_options::<u16>(&options)
            .ok()
            .map(|arr| arr.slice_move(s![0, .., .., 0]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dicom::core::{DataElement, VR, dicom_value};
    use dicom::object::FileMetaTableBuilder;
    use dicom_dictionary_std::uids;

    fn ct_header(pixel_spacing: Option<[&str; 2]>) -> FileDicomObject<InMemDicomObject> {
        let mut elements = vec![
            DataElement::new(
                tags::IMAGE_POSITION_PATIENT,
                VR::DS,
                dicom_value!(Strs, ["-123.4", "-87.3", "-20"]),
            ),
            DataElement::new(
                tags::IMAGE_ORIENTATION_PATIENT,
                VR::DS,
                dicom_value!(Strs, ["1", "0", "0", "0", "0.8", "-0.6"]),
            ),
            DataElement::new(tags::SLICE_THICKNESS, VR::DS, dicom_value!(Strs, ["2.5"])),
            DataElement::new(tags::ROWS, VR::US, dicom_value!(U16, [4])),
            DataElement::new(tags::COLUMNS, VR::US, dicom_value!(U16, [6])),
        ];
        if let Some([row, column]) = pixel_spacing {
            elements.push(DataElement::new(
                tags::PIXEL_SPACING,
                VR::DS,
                dicom_value!(Strs, [row, column]),
            ));
        }

        InMemDicomObject::from_element_iter(elements)
            .with_meta(
                FileMetaTableBuilder::new()
                    .transfer_syntax(uids::EXPLICIT_VR_LITTLE_ENDIAN)
                    .media_storage_sop_class_uid(uids::CT_IMAGE_STORAGE)
                    .media_storage_sop_instance_uid("2.25.1"),
            )
            .unwrap()
    }

    #[test]
    fn test_read_metadata() {
        let metadata = VolumeLoader::read_metadata(&ct_header(Some(["0.7", "0.5"]))).unwrap();

        assert_eq!(metadata.rows, 4);
        assert_eq!(metadata.columns, 6);
        assert_eq!(metadata.thickness, 2.5);
        // rows are 0.7 apart, columns 0.5
        assert_eq!(metadata.pixel_spacing, (0.5, 0.7));
        assert_eq!(metadata.orientation.0, Vector::new(1.0, 0.0, 0.0));
        assert_eq!(metadata.orientation.1, Vector::new(0.0, 0.8, -0.6));
        assert_eq!(metadata.position, Point::new(-123.4, -87.3, -20.0));
    }

    #[test]
    fn test_missing_pixel_spacing() {
        let result = VolumeLoader::read_metadata(&ct_header(None));
        assert!(matches!(
            result,
            Err(VolumeLoaderError::MissingAttribute("PixelSpacing"))
        ));
    }

    #[test]
    fn test_short_pixel_spacing() {
        let mut object = ct_header(None);
        object.put(DataElement::new(
            tags::PIXEL_SPACING,
            VR::DS,
            dicom_value!(Strs, ["0.7"]),
        ));
        let result = VolumeLoader::read_metadata(&object);
        assert!(matches!(
            result,
            Err(VolumeLoaderError::MissingAttribute("PixelSpacing"))
        ));
    }

    #[test]
    fn test_objects_without_pixel_data_are_skipped() {
        let objects = [ct_header(Some(["0.7", "0.5"]))];
        let result = VolumeLoader::load_from_dicom_objects(&objects, &VolumeParams::default());
        assert!(matches!(result, Err(VolumeLoaderError::NoValidImages)));
    }
}
