use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::feature::DrawnFeature;

/// Ordered collection of drawn features plus the discard record.
///
/// Features leave the store through undo or erase and land on the discard
/// stack. Nothing is ever replayed back from it.
#[derive(Debug, Default)]
pub struct FeatureStore {
    features: Vec<DrawnFeature>,
    discarded: Vec<DrawnFeature>,
}

impl FeatureStore {
    pub fn new() -> FeatureStore {
        FeatureStore::default()
    }

    pub fn append(&mut self, feature: DrawnFeature) {
        info!(id = %feature.id, kind = %feature.kind, "feature added");
        self.discarded.clear();
        self.features.push(feature);
    }

    pub fn remove_by_id(&mut self, id: &str) -> Option<&DrawnFeature> {
        let index = self.features.iter().position(|f| f.id == id)?;
        let removed = self.features.remove(index);
        info!(id = %removed.id, "feature removed");
        self.discarded.push(removed);
        self.discarded.last()
    }

    pub fn undo_last(&mut self) -> Option<&DrawnFeature> {
        let removed = self.features.pop()?;
        info!(id = %removed.id, "feature undone");
        self.discarded.push(removed);
        self.discarded.last()
    }

    /// Replaces the attribute map wholesale. Unknown ids are ignored.
    pub fn update_attributes(&mut self, id: &str, attributes: BTreeMap<String, String>) -> bool {
        match self.features.iter_mut().find(|f| f.id == id) {
            Some(feature) => {
                feature.attributes = attributes;
                true
            }
            None => {
                debug!(id, "attribute update for unknown feature ignored");
                false
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&DrawnFeature> {
        self.features.iter().find(|f| f.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DrawnFeature> {
        self.features.iter()
    }

    pub fn features(&self) -> &[DrawnFeature] {
        &self.features
    }

    pub fn discarded(&self) -> &[DrawnFeature] {
        &self.discarded
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}
