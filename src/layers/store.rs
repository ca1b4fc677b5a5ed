use crate::{
    foundation::core::LayerId,
    foundation::settings::MIN_SCALE,
    layers::model::{AdjustmentsPatch, Layer, LayerKind, LayerPatch},
};

/// Ordered layer stack; index 0 is drawn first (bottom).
///
/// Holds at most one selected id, and that id always names a layer in the stack.
#[derive(Clone, Debug)]
pub struct LayerStore {
    layers: Vec<Layer>,
    selected: Option<LayerId>,
    min_scale: f64,
}

impl Default for LayerStore {
    fn default() -> Self {
        Self::new(MIN_SCALE)
    }
}

impl LayerStore {
    /// Empty stack using `min_scale` as the floor for scale patches.
    pub fn new(min_scale: f64) -> Self {
        Self {
            layers: Vec::new(),
            selected: None,
            min_scale,
        }
    }

    /// Layers in z-order, bottom first.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Number of layers.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// True when the stack is empty.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Stack index of `id`.
    pub fn index_of(&self, id: LayerId) -> Option<usize> {
        self.layers.iter().position(|l| l.id() == id)
    }

    /// Layer by id.
    pub fn get(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id() == id)
    }

    pub(crate) fn get_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.id() == id)
    }

    /// Currently selected id.
    pub fn selected(&self) -> Option<LayerId> {
        self.selected
    }

    /// Currently selected layer.
    pub fn selected_layer(&self) -> Option<&Layer> {
        self.selected.and_then(|id| self.get(id))
    }

    /// Select `id`; unknown ids are ignored. Returns whether the selection changed.
    pub fn select(&mut self, id: LayerId) -> bool {
        if self.get(id).is_none() || self.selected == Some(id) {
            return false;
        }
        self.selected = Some(id);
        true
    }

    /// Clear the selection.
    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// First visible mockup layer: the document's sizing and DPI reference.
    pub fn mockup_layer(&self) -> Option<&Layer> {
        self.layers
            .iter()
            .find(|l| l.kind == LayerKind::Mockup && l.visible)
    }

    /// Append `layer` on top of the stack and select it.
    pub fn push(&mut self, layer: Layer) -> LayerId {
        let id = layer.id();
        tracing::debug!(%id, name = %layer.name, index = self.layers.len(), "layer inserted");
        self.layers.push(layer);
        self.selected = Some(id);
        id
    }

    /// Remove `id`.
    ///
    /// A removed selection moves to the layer now at the same index, else the one
    /// below, else nothing.
    pub fn remove(&mut self, id: LayerId) -> Option<Layer> {
        let index = self.index_of(id)?;
        let removed = self.layers.remove(index);
        if self.selected == Some(id) {
            self.selected = if self.layers.is_empty() {
                None
            } else {
                Some(self.layers[index.min(self.layers.len() - 1)].id())
            };
        }
        tracing::debug!(%id, index, "layer removed");
        Some(removed)
    }

    /// Swap `id` with the layer above it; no-op at the top.
    pub fn bring_forward(&mut self, id: LayerId) -> bool {
        match self.index_of(id) {
            Some(i) if i + 1 < self.layers.len() => {
                self.layers.swap(i, i + 1);
                true
            }
            _ => false,
        }
    }

    /// Swap `id` with the layer below it; no-op at the bottom.
    pub fn send_backward(&mut self, id: LayerId) -> bool {
        match self.index_of(id) {
            Some(i) if i > 0 => {
                self.layers.swap(i, i - 1);
                true
            }
            _ => false,
        }
    }

    /// Move the layer at `from` to `to`, preserving the relative order of the rest.
    ///
    /// An out-of-range `from` is ignored; `to` is clamped to the last index.
    pub fn move_to(&mut self, from: usize, to: usize) -> bool {
        if from >= self.layers.len() {
            return false;
        }
        let to = to.min(self.layers.len() - 1);
        if from == to {
            return false;
        }
        let layer = self.layers.remove(from);
        self.layers.insert(to, layer);
        true
    }

    /// Value copy of `id` inserted directly above it and selected.
    ///
    /// Raster surfaces are shared with the source, not copied.
    pub fn duplicate(&mut self, id: LayerId) -> Option<LayerId> {
        let index = self.index_of(id)?;
        let source = &self.layers[index];
        let copy = source.duplicate_as(format!("{} copy", source.name));
        let new_id = copy.id();
        self.layers.insert(index + 1, copy);
        self.selected = Some(new_id);
        Some(new_id)
    }

    /// Shallow-merge `patch` onto `id`. Returns false for unknown ids.
    pub fn update_properties(&mut self, id: LayerId, patch: &LayerPatch) -> bool {
        let min_scale = self.min_scale;
        let Some(layer) = self.get_mut(id) else {
            return false;
        };
        patch.apply(layer, min_scale);
        true
    }

    /// Shallow-merge `patch` onto the adjustments of `id`. Returns false for unknown ids.
    pub fn update_adjustments(&mut self, id: LayerId, patch: &AdjustmentsPatch) -> bool {
        let Some(layer) = self.get_mut(id) else {
            return false;
        };
        patch.apply(&mut layer.adjustments);
        true
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layers/store.rs"]
mod tests;
