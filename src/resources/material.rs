//! Camera material slots and the standard/occlusion decision rule

use std::sync::mpsc;

use glam::{Mat4, Vec4};

use super::loader::{MaterialCompletion, MaterialEvent, MaterialLoader};
use crate::backend::{MaterialInstanceHandle, RenderEngine};
use crate::tracking::{DepthMode, DepthModeUsage};

/// A loaded material instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Material {
    name: String,
    instance: MaterialInstanceHandle,
}

impl Material {
    pub fn new(name: impl Into<String>, instance: MaterialInstanceHandle) -> Self {
        Self {
            name: name.into(),
            instance,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn instance(&self) -> MaterialInstanceHandle {
        self.instance
    }
}

/// The two camera material variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CameraMaterialKind {
    /// Samples the camera texture only
    Standard,
    /// Samples the camera texture and the depth texture
    Occlusion,
}

impl CameraMaterialKind {
    pub const ALL: [Self; 2] = [Self::Standard, Self::Occlusion];
}

/// Contents of one material slot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MaterialSlot {
    #[default]
    Unloaded,
    /// Filled by the material loader
    Loaded(Material),
    /// Supplied by the caller; the loader never replaces it
    Custom(Material),
}

impl MaterialSlot {
    pub fn material(&self) -> Option<&Material> {
        match self {
            MaterialSlot::Unloaded => None,
            MaterialSlot::Loaded(m) | MaterialSlot::Custom(m) => Some(m),
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, MaterialSlot::Custom(_))
    }
}

/// Pick the material variant for the current depth policy and capability.
///
/// Occlusion is used only when the caller enabled it and the session
/// actually produces depth.
pub fn select_material_kind(usage: DepthModeUsage, mode: DepthMode) -> CameraMaterialKind {
    if usage == DepthModeUsage::Enabled && mode.has_depth() {
        CameraMaterialKind::Occlusion
    } else {
        CameraMaterialKind::Standard
    }
}

/// Owns both material slots and the channel loaders report into.
///
/// Loads complete on arbitrary threads; their results sit in the channel
/// until [`apply_pending`](Self::apply_pending) runs on the owning thread.
#[derive(Debug)]
pub struct MaterialSelector {
    standard: MaterialSlot,
    occlusion: MaterialSlot,
    sender: mpsc::Sender<MaterialEvent>,
    receiver: mpsc::Receiver<MaterialEvent>,
}

impl MaterialSelector {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            standard: MaterialSlot::Unloaded,
            occlusion: MaterialSlot::Unloaded,
            sender,
            receiver,
        }
    }

    /// Ask `loader` for a material. The result is applied by the next
    /// [`apply_pending`](Self::apply_pending).
    pub fn request(&self, loader: &dyn MaterialLoader, kind: CameraMaterialKind) {
        log::debug!("Requesting {kind:?} camera material");
        loader.load(kind, MaterialCompletion::new(kind, self.sender.clone()));
    }

    /// Drain finished loads into their slots.
    ///
    /// Only empty slots are filled; a slot keeps the first material it
    /// receives. Each newly loaded instance gets an identity matrix under
    /// `uv_transform_parameter`. Returns the number of slots filled.
    pub fn apply_pending(
        &mut self,
        engine: &dyn RenderEngine,
        uv_transform_parameter: &str,
    ) -> usize {
        let mut filled = 0;
        while let Ok(MaterialEvent { kind, result }) = self.receiver.try_recv() {
            let material = match result {
                Ok(material) => material,
                Err(e) => {
                    log::error!("Failed to load {kind:?} camera material: {e}");
                    continue;
                }
            };

            match self.slot(kind) {
                MaterialSlot::Unloaded => {}
                MaterialSlot::Loaded(current) => {
                    log::debug!(
                        "{kind:?} material already loaded as {:?}, dropping {:?}",
                        current.name(),
                        material.name()
                    );
                    continue;
                }
                MaterialSlot::Custom(_) => {
                    log::debug!(
                        "Keeping custom {kind:?} material, dropping loaded {:?}",
                        material.name()
                    );
                    continue;
                }
            }

            engine.set_material_float4_array(
                material.instance(),
                uv_transform_parameter,
                &identity_rows(),
            );
            log::debug!("Loaded {kind:?} camera material {:?}", material.name());
            *self.slot_mut(kind) = MaterialSlot::Loaded(material);
            filled += 1;
        }
        filled
    }

    /// Put a caller-supplied material in a slot, shielding it from the loader.
    pub fn set_custom(&mut self, kind: CameraMaterialKind, material: Material) {
        *self.slot_mut(kind) = MaterialSlot::Custom(material);
    }

    pub fn slot(&self, kind: CameraMaterialKind) -> &MaterialSlot {
        match kind {
            CameraMaterialKind::Standard => &self.standard,
            CameraMaterialKind::Occlusion => &self.occlusion,
        }
    }

    fn slot_mut(&mut self, kind: CameraMaterialKind) -> &mut MaterialSlot {
        match kind {
            CameraMaterialKind::Standard => &mut self.standard,
            CameraMaterialKind::Occlusion => &mut self.occlusion,
        }
    }

    pub fn material(&self, kind: CameraMaterialKind) -> Option<&Material> {
        self.slot(kind).material()
    }

    /// The selected kind and its material, if loaded.
    pub fn select(
        &self,
        usage: DepthModeUsage,
        mode: DepthMode,
    ) -> (CameraMaterialKind, Option<&Material>) {
        let kind = select_material_kind(usage, mode);
        (kind, self.material(kind))
    }
}

impl Default for MaterialSelector {
    fn default() -> Self {
        Self::new()
    }
}

/// The identity matrix as four float4 rows.
fn identity_rows() -> [Vec4; 4] {
    let m = Mat4::IDENTITY.transpose();
    [m.x_axis, m.y_axis, m.z_axis, m.w_axis]
}
