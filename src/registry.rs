use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;

use crate::axis::Axis;
use crate::errors::{ClassifierError, Result};
use crate::model::load_scorer;
use crate::preprocess::{adapter_for, DAMAGE_RESOLUTION, DEFAULT_DISASTER_RESOLUTION};
use crate::traits::{Resolution, Scorer, TensorAdapter};

/// A loaded scorer with the adapter and resolution fixed at install time.
#[derive(Clone)]
pub struct ScorerEntry {
    pub scorer: Arc<dyn Scorer>,
    pub adapter: Arc<dyn TensorAdapter>,
    pub resolution: Resolution,
}

impl ScorerEntry {
    fn new(axis: Axis, scorer: Arc<dyn Scorer>) -> Self {
        let resolution = match axis {
            Axis::Disaster => scorer
                .declared_resolution()
                .unwrap_or(DEFAULT_DISASTER_RESOLUTION),
            Axis::Damage => DAMAGE_RESOLUTION,
        };
        Self {
            adapter: Arc::from(adapter_for(axis, resolution)),
            scorer,
            resolution,
        }
    }
}

impl std::fmt::Debug for ScorerEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScorerEntry")
            .field("scorer", &self.scorer.describe())
            .field("resolution", &self.resolution)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisStatus {
    pub loaded: bool,
    pub resolution: Option<Resolution>,
}

/// Process-wide scorers, one slot per axis.
///
/// Readers clone the entry out of the slot, so a reload never blocks or invalidates a
/// request that is already scoring. Such a request finishes on the scorer it started with.
#[derive(Default)]
pub struct ScorerRegistry {
    disaster: RwLock<Option<ScorerEntry>>,
    damage: RwLock<Option<ScorerEntry>>,
    device_id: i32,
}

impl ScorerRegistry {
    pub fn new(device_id: i32) -> Self {
        Self {
            device_id,
            ..Self::default()
        }
    }

    const fn slot(&self, axis: Axis) -> &RwLock<Option<ScorerEntry>> {
        match axis {
            Axis::Disaster => &self.disaster,
            Axis::Damage => &self.damage,
        }
    }

    /// Replaces the scorer for `axis` and returns its effective input resolution.
    pub fn install(&self, axis: Axis, scorer: Arc<dyn Scorer>) -> Resolution {
        let entry = ScorerEntry::new(axis, scorer);
        let resolution = entry.resolution;
        info!(
            %axis,
            scorer = %entry.scorer.describe(),
            height = resolution.height,
            width = resolution.width,
            "installed scorer"
        );
        *self.slot(axis).write() = Some(entry);
        resolution
    }

    /// Loads an ONNX model from disk and installs it.
    ///
    /// On failure the previously installed scorer, if any, stays in place.
    pub fn load(&self, axis: Axis, model_path: &Path) -> Result<Resolution> {
        let scorer = load_scorer(axis, model_path, self.device_id)?;
        Ok(self.install(axis, Arc::from(scorer)))
    }

    pub fn get(&self, axis: Axis) -> Result<ScorerEntry> {
        self.slot(axis)
            .read()
            .clone()
            .ok_or(ClassifierError::ModelNotLoaded { axis })
    }

    pub fn is_loaded(&self, axis: Axis) -> bool {
        self.slot(axis).read().is_some()
    }

    pub fn status(&self, axis: Axis) -> AxisStatus {
        let slot = self.slot(axis).read();
        AxisStatus {
            loaded: slot.is_some(),
            resolution: slot.as_ref().map(|entry| entry.resolution),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::MockScorer;

    #[test]
    fn test_get_before_load() {
        let registry = ScorerRegistry::new(0);
        assert!(matches!(
            registry.get(Axis::Damage),
            Err(ClassifierError::ModelNotLoaded { axis: Axis::Damage })
        ));
        assert!(!registry.status(Axis::Disaster).loaded);
    }

    #[test]
    fn test_disaster_resolution_comes_from_the_scorer() {
        let registry = ScorerRegistry::new(0);
        let scorer = MockScorer::new(vec![0.25; 4]).with_resolution(Resolution::square(128));

        let resolution = registry.install(Axis::Disaster, Arc::new(scorer));
        assert_eq!(resolution, Resolution::square(128));
        assert_eq!(
            registry.get(Axis::Disaster).map(|e| e.adapter.resolution()).ok(),
            Some(Resolution::square(128))
        );
    }

    #[test]
    fn test_disaster_resolution_defaults_when_undeclared() {
        let registry = ScorerRegistry::new(0);
        let resolution = registry.install(Axis::Disaster, Arc::new(MockScorer::new(vec![0.25; 4])));
        assert_eq!(resolution, DEFAULT_DISASTER_RESOLUTION);
    }

    #[test]
    fn test_damage_resolution_is_fixed() {
        let registry = ScorerRegistry::new(0);
        let scorer = MockScorer::new(vec![0.25; 4]).with_resolution(Resolution::square(300));
        assert_eq!(registry.install(Axis::Damage, Arc::new(scorer)), DAMAGE_RESOLUTION);
    }

    #[test]
    fn test_reload_resets_resolution() {
        let registry = ScorerRegistry::new(0);
        let first = MockScorer::new(vec![0.25; 4]).with_resolution(Resolution::square(128));
        registry.install(Axis::Disaster, Arc::new(first));

        registry.install(Axis::Disaster, Arc::new(MockScorer::new(vec![0.25; 4])));
        assert_eq!(
            registry.status(Axis::Disaster).resolution,
            Some(DEFAULT_DISASTER_RESOLUTION)
        );
    }

    #[test]
    fn test_failed_load_keeps_previous_scorer() {
        let registry = ScorerRegistry::new(0);
        registry.install(Axis::Damage, Arc::new(MockScorer::new(vec![0.25; 4])));

        let result = registry.load(Axis::Damage, Path::new("/nonexistent/damage.onnx"));
        assert!(matches!(result, Err(ClassifierError::ModelLoad { .. })));
        assert!(registry.is_loaded(Axis::Damage));
    }

    #[test]
    fn test_entry_outlives_reload() -> Result<()> {
        let registry = ScorerRegistry::new(0);
        registry.install(Axis::Damage, Arc::new(MockScorer::new(vec![1.0, 0.0, 0.0, 0.0])));
        let in_flight = registry.get(Axis::Damage)?;

        registry.install(Axis::Damage, Arc::new(MockScorer::new(vec![0.0, 0.0, 0.0, 1.0])));

        let tensor = ndarray::Array4::<f32>::zeros((1, 3, 64, 64));
        assert_eq!(in_flight.scorer.score(tensor.view())?, vec![1.0, 0.0, 0.0, 0.0]);
        assert_eq!(
            registry.get(Axis::Damage)?.scorer.score(tensor.view())?,
            vec![0.0, 0.0, 0.0, 1.0]
        );
        Ok(())
    }
}
