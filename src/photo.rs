use std::io::Cursor;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::clock::file_stamp;
use crate::error::PhotoError;
use crate::gps::GpsFix;

/// Fixed UTC+7 used for photo names regardless of the device timezone.
pub const PHOTO_NAME_OFFSET_HOURS: i32 = 7;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldPhoto {
    pub id: String,
    pub image_data_uri: String,
    pub timestamp_ms: i64,
    pub gps: Option<GpsFix>,
    /// Lookup only; the feature may have been erased since.
    pub linked_feature_id: Option<String>,
}

impl FieldPhoto {
    pub fn from_jpeg(
        id: String,
        jpeg: &[u8],
        timestamp_ms: i64,
        gps: Option<GpsFix>,
        linked_feature_id: Option<String>,
    ) -> FieldPhoto {
        FieldPhoto {
            id,
            image_data_uri: format!("data:image/jpeg;base64,{}", STANDARD.encode(jpeg)),
            timestamp_ms,
            gps,
            linked_feature_id,
        }
    }

    /// `<feature id>.jpg` when linked, else `field-photo-<date>_<time>.jpg`.
    pub fn file_name(&self) -> String {
        match &self.linked_feature_id {
            Some(feature_id) => format!("{}.jpg", feature_id),
            None => format!(
                "field-photo-{}.jpg",
                file_stamp(self.timestamp_ms, PHOTO_NAME_OFFSET_HOURS)
            ),
        }
    }

    pub fn jpeg_bytes(&self) -> Option<Vec<u8>> {
        let encoded = self.image_data_uri.split_once(";base64,")?.1;
        STANDARD.decode(encoded).ok()
    }
}

/// Photos in capture order.
#[derive(Debug, Default)]
pub struct PhotoAlbum {
    photos: Vec<FieldPhoto>,
}

impl PhotoAlbum {
    pub fn new() -> PhotoAlbum {
        PhotoAlbum::default()
    }

    pub fn add(&mut self, photo: FieldPhoto) -> &FieldPhoto {
        self.photos.push(photo);
        &self.photos[self.photos.len() - 1]
    }

    pub fn for_feature<'a>(&'a self, feature_id: &'a str) -> impl Iterator<Item = &'a FieldPhoto> {
        self.photos
            .iter()
            .filter(move |p| p.linked_feature_id.as_deref() == Some(feature_id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldPhoto> {
        self.photos.iter()
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }
}

/// `(lat, lng)` from the JPEG's EXIF GPS tags, `None` when untagged.
pub fn read_exif_position(jpeg: &[u8]) -> Result<Option<(f64, f64)>, PhotoError> {
    let mut reader = Cursor::new(jpeg);
    let exif = exif::Reader::new().read_from_container(&mut reader)?;

    let lat = match coordinate(&exif, exif::Tag::GPSLatitude, exif::Tag::GPSLatitudeRef) {
        Some(lat) => lat,
        None => return Ok(None),
    };
    let lng = match coordinate(&exif, exif::Tag::GPSLongitude, exif::Tag::GPSLongitudeRef) {
        Some(lng) => lng,
        None => return Ok(None),
    };
    Ok(Some((lat, lng)))
}

fn coordinate(exif: &exif::Exif, tag: exif::Tag, ref_tag: exif::Tag) -> Option<f64> {
    let hemisphere = exif
        .get_field(ref_tag, exif::In::PRIMARY)?
        .display_value()
        .to_string()
        .trim_matches('"')
        .to_string();
    let dms = match &exif.get_field(tag, exif::In::PRIMARY)?.value {
        exif::Value::Rational(v) if v.len() >= 3 => [v[0].to_f64(), v[1].to_f64(), v[2].to_f64()],
        exif::Value::SRational(v) if v.len() >= 3 => [v[0].to_f64(), v[1].to_f64(), v[2].to_f64()],
        _ => return None,
    };
    Some(dms_to_degrees(dms, &hemisphere))
}

fn dms_to_degrees([deg, min, sec]: [f64; 3], hemisphere: &str) -> f64 {
    let sign = if hemisphere.starts_with('S') || hemisphere.starts_with('W') {
        -1.0
    } else {
        1.0
    };
    sign * (deg + min / 60.0 + sec / 60.0 / 60.0)
}
