//! CSV export of drawn features, one file per geometry family.

use std::borrow::Cow;
use std::collections::BTreeSet;

use tracing::info;

use crate::clock::file_stamp;
use crate::config::ExportDefaults;
use crate::feature::{DrawnFeature, Family, FeatureKind};
use crate::store::FeatureStore;
use crate::wkt;

/// Excel needs the byte-order mark to read UTF-8.
pub const BOM: &str = "\u{FEFF}";

#[derive(Clone, Debug, PartialEq)]
pub struct ExportOptions {
    pub include_geometry: bool,
    pub include_attributes: bool,
    pub kinds: Vec<FeatureKind>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        ExportOptions::from(&ExportDefaults::default())
    }
}

impl From<&ExportDefaults> for ExportOptions {
    fn from(defaults: &ExportDefaults) -> Self {
        ExportOptions {
            include_geometry: defaults.include_geometry,
            include_attributes: defaults.include_attributes,
            kinds: FeatureKind::ALL.to_vec(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CsvFile {
    pub file_name: String,
    pub contents: String,
}

/// Quotes a field holding a comma, quote or line break.
pub fn escape_field(value: &str) -> Cow<'_, str> {
    if value.contains(&[',', '"', '\n', '\r'][..]) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

/// Encodes features into one CSV document, BOM included.
///
/// Metric columns appear when any exported feature carries that metric;
/// features without it get an empty cell.
pub fn encode(features: &[&DrawnFeature], options: &ExportOptions) -> String {
    let has_area = features.iter().any(|f| f.metrics.area_m2.is_some());
    let has_length = features.iter().any(|f| f.metrics.length_m.is_some());
    let has_radius = features.iter().any(|f| f.metrics.radius_m.is_some());
    let attribute_keys: BTreeSet<&str> = if options.include_attributes {
        features
            .iter()
            .flat_map(|f| f.attributes.keys().map(String::as_str))
            .collect()
    } else {
        BTreeSet::new()
    };

    let mut header = vec!["id", "feature_type", "created_date", "created_time"];
    if options.include_geometry {
        header.push("geometry_wkt");
    }
    if has_area {
        header.push("area_m2");
    }
    if has_length {
        header.push("length_m");
    }
    if has_radius {
        header.push("radius_m");
    }
    header.extend(attribute_keys.iter().copied());

    let mut out = String::from(BOM);
    push_row(&mut out, header.into_iter().map(Cow::Borrowed));

    for feature in features {
        let mut row: Vec<Cow<str>> = vec![
            Cow::Borrowed(feature.id.as_str()),
            Cow::Borrowed(feature.kind.as_str()),
            Cow::Borrowed(feature.created_at.date.as_str()),
            Cow::Borrowed(feature.created_at.time.as_str()),
        ];
        if options.include_geometry {
            row.push(Cow::Owned(wkt::format_coordinates(&feature.geometry)));
        }
        if has_area {
            row.push(metric(feature.metrics.area_m2));
        }
        if has_length {
            row.push(metric(feature.metrics.length_m));
        }
        if has_radius {
            row.push(metric(feature.metrics.radius_m));
        }
        for key in &attribute_keys {
            row.push(Cow::Borrowed(
                feature.attributes.get(*key).map(String::as_str).unwrap_or(""),
            ));
        }
        push_row(&mut out, row.into_iter());
    }
    out
}

fn metric(value: Option<f64>) -> Cow<'static, str> {
    match value {
        Some(v) => Cow::Owned(format!("{:.2}", v)),
        None => Cow::Borrowed(""),
    }
}

fn push_row<'a>(out: &mut String, fields: impl Iterator<Item = Cow<'a, str>>) {
    let line = fields
        .map(|f| escape_field(&f).into_owned())
        .collect::<Vec<_>>()
        .join(",");
    out.push_str(&line);
    out.push('\n');
}

fn selected<'a>(
    store: &'a FeatureStore,
    options: &ExportOptions,
    family: Option<Family>,
) -> Vec<&'a DrawnFeature> {
    store
        .iter()
        .filter(|f| options.kinds.contains(&f.kind))
        .filter(|f| family.map_or(true, |fam| f.kind.family() == fam))
        .collect()
}

fn file_name(suffix: &str, epoch_ms: i64, offset_hours: i32) -> String {
    format!("field-data_{}_{}.csv", suffix, file_stamp(epoch_ms, offset_hours))
}

/// One family's CSV, or `None` when the family has nothing to export.
pub fn export_family(
    store: &FeatureStore,
    family: Family,
    options: &ExportOptions,
    epoch_ms: i64,
    offset_hours: i32,
) -> Option<CsvFile> {
    let features = selected(store, options, Some(family));
    if features.is_empty() {
        return None;
    }
    info!(family = family.file_suffix(), count = features.len(), "exporting csv");
    Some(CsvFile {
        file_name: file_name(family.file_suffix(), epoch_ms, offset_hours),
        contents: encode(&features, options),
    })
}

pub fn export_by_family(
    store: &FeatureStore,
    options: &ExportOptions,
    epoch_ms: i64,
    offset_hours: i32,
) -> Vec<CsvFile> {
    Family::ALL
        .iter()
        .filter_map(|family| export_family(store, *family, options, epoch_ms, offset_hours))
        .collect()
}

/// Every selected feature in a single file, whatever its geometry.
///
/// Columns follow the same rules as a family export, so a metric column
/// may be filled for some kinds and empty for others.
pub fn export_all(
    store: &FeatureStore,
    options: &ExportOptions,
    epoch_ms: i64,
    offset_hours: i32,
) -> Option<CsvFile> {
    let features = selected(store, options, None);
    if features.is_empty() {
        return None;
    }
    info!(count = features.len(), "exporting combined csv");
    Some(CsvFile {
        file_name: file_name("all", epoch_ms, offset_hours),
        contents: encode(&features, options),
    })
}
