use std::collections::HashMap;

/// Maps feature ids to whatever the renderer uses to draw them.
///
/// Domain data lives in the feature store; handles carry none of it.
#[derive(Debug)]
pub struct LayerRegistry<H> {
    handles: HashMap<String, H>,
}

impl<H> Default for LayerRegistry<H> {
    fn default() -> Self {
        LayerRegistry {
            handles: HashMap::new(),
        }
    }
}

impl<H> LayerRegistry<H> {
    pub fn new() -> LayerRegistry<H> {
        LayerRegistry::default()
    }

    pub fn bind(&mut self, feature_id: &str, handle: H) -> Option<H> {
        self.handles.insert(feature_id.to_string(), handle)
    }

    pub fn get(&self, feature_id: &str) -> Option<&H> {
        self.handles.get(feature_id)
    }

    pub fn unbind(&mut self, feature_id: &str) -> Option<H> {
        self.handles.remove(feature_id)
    }

    /// Drops handles whose feature is gone, returning them for disposal.
    pub fn retain_features(&mut self, mut live: impl FnMut(&str) -> bool) -> Vec<H> {
        let stale: Vec<String> = self
            .handles
            .keys()
            .filter(|id| !live(id))
            .cloned()
            .collect();
        stale
            .into_iter()
            .filter_map(|id| self.handles.remove(&id))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}
