//! Morph rig adapter
//!
//! The renderer owns the influence buffers. A `MorphRig` only knows, per mesh,
//! which buffer slot each morph-target name lives in, and copies a weight map
//! into those slots.

use std::collections::HashMap;

use holo_core::{Viseme, JAW_OPEN_TARGET};
use tracing::warn;

use crate::AnimationWeights;

/// Meshes that carry lip-sync morph targets on the stock avatar
pub const LIP_SYNC_MESHES: [&str; 3] = ["Head_Mesh", "Teeth_Mesh", "Tongue_Mesh"];

/// Morph dictionary of one mesh
#[derive(Debug, Clone, Default)]
pub struct MeshBinding {
    pub name: String,
    /// Morph-target name → influence index
    slots: HashMap<String, usize>,
    /// Length of the influence buffer
    len: usize,
}

impl MeshBinding {
    pub fn new(name: impl Into<String>, dictionary: HashMap<String, usize>) -> Self {
        let len = dictionary.values().map(|i| i + 1).max().unwrap_or(0);
        MeshBinding {
            name: name.into(),
            slots: dictionary,
            len,
        }
    }

    /// Build from an ordered list of morph-target names
    pub fn from_names<I, S>(name: impl Into<String>, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let dictionary = targets
            .into_iter()
            .enumerate()
            .map(|(i, t)| (t.into(), i))
            .collect();
        Self::new(name, dictionary)
    }

    pub fn slot(&self, target: &str) -> Option<usize> {
        self.slots.get(target).copied()
    }

    /// Influence buffer length this mesh expects
    pub fn buffer_len(&self) -> usize {
        self.len
    }

    /// Write `weights` into `influences`
    ///
    /// Targets the mesh lacks are skipped. Returns how many slots were written.
    pub fn apply(&self, weights: &AnimationWeights, influences: &mut [f32]) -> usize {
        if influences.len() < self.len {
            warn!(
                mesh = %self.name,
                expected = self.len,
                actual = influences.len(),
                "influence buffer shorter than morph dictionary"
            );
        }

        let mut written = 0;
        for (viseme, weight) in weights.iter() {
            written += self.write(viseme.morph_target(), weight, influences);
        }
        written += self.write(JAW_OPEN_TARGET, weights.jaw_open, influences);
        written
    }

    fn write(&self, target: &str, value: f32, influences: &mut [f32]) -> usize {
        match self.slot(target).and_then(|i| influences.get_mut(i)) {
            Some(slot) => {
                *slot = value;
                1
            }
            None => 0,
        }
    }
}

/// Set of meshes driven by the facial animator
#[derive(Debug, Clone, Default)]
pub struct MorphRig {
    meshes: Vec<MeshBinding>,
}

impl MorphRig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mesh(mut self, mesh: MeshBinding) -> Self {
        self.add_mesh(mesh);
        self
    }

    pub fn add_mesh(&mut self, mesh: MeshBinding) {
        self.meshes.retain(|m| m.name != mesh.name);
        self.meshes.push(mesh);
    }

    /// Stock rig: every lip-sync mesh with the full viseme set plus jaw
    pub fn standard() -> Self {
        let targets: Vec<&str> = Viseme::ALL
            .iter()
            .map(|v| v.morph_target())
            .chain(std::iter::once(JAW_OPEN_TARGET))
            .collect();
        let mut rig = MorphRig::new();
        for mesh in LIP_SYNC_MESHES {
            rig.add_mesh(MeshBinding::from_names(mesh, targets.iter().copied()));
        }
        rig
    }

    pub fn mesh(&self, name: &str) -> Option<&MeshBinding> {
        self.meshes.iter().find(|m| m.name == name)
    }

    pub fn meshes(&self) -> &[MeshBinding] {
        &self.meshes
    }

    /// Apply one frame of weights to a single mesh's buffer
    pub fn apply(&self, mesh: &str, weights: &AnimationWeights, influences: &mut [f32]) -> usize {
        self.mesh(mesh)
            .map(|m| m.apply(weights, influences))
            .unwrap_or(0)
    }

    /// Per-mesh influence buffers for a frame, for renderers that want owned data
    pub fn frame_buffers(&self, weights: &AnimationWeights) -> HashMap<String, Vec<f32>> {
        self.meshes
            .iter()
            .map(|m| {
                let mut buf = vec![0.0; m.buffer_len()];
                m.apply(weights, &mut buf);
                (m.name.clone(), buf)
            })
            .collect()
    }
}
