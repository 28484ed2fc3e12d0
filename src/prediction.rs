use indexmap::IndexMap;
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};

use crate::axis::{Axis, AxisSelection};
use crate::errors::Result;
use crate::normalize::normalize;

/// Class label → probability, in declared label order.
pub type ProbabilityDistribution = IndexMap<String, f64>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    pub predicted_class: String,
    pub confidence: f64,
    pub probabilities: ProbabilityDistribution,
}

impl PredictionResult {
    /// Builds the result for `axis` from a raw score vector.
    ///
    /// The distribution is computed over the whole vector. Declared classes the vector
    /// does not reach get 0.0; extra trailing scores are not reported in `probabilities`,
    /// but can still win the arg-max, in which case the class is named `class_<index>`.
    pub fn from_scores(axis: Axis, scores: &[f32]) -> Result<Self> {
        let (probs, _) = normalize(scores)?;
        let labels = axis.labels();

        // strict `>` keeps the lowest index on ties
        let (top, confidence) = probs
            .iter()
            .copied()
            .enumerate()
            .fold((0, f64::NEG_INFINITY), |best, (i, p)| if p > best.1 { (i, p) } else { best });

        let predicted_class = labels
            .get(top)
            .map_or_else(|| format!("class_{top}"), |label| (*label).to_string());

        let probabilities = labels
            .iter()
            .enumerate()
            .map(|(i, label)| ((*label).to_string(), probs.get(i).copied().unwrap_or(0.0)))
            .collect();

        Ok(Self {
            predicted_class,
            confidence,
            probabilities,
        })
    }
}

/// What happened on one axis: a prediction or the reason there is none.
#[derive(Debug, Clone, PartialEq)]
pub enum AxisOutcome {
    Success(PredictionResult),
    Failure(String),
}

impl AxisOutcome {
    pub const fn is_success(&self) -> bool {
        matches!(self, AxisOutcome::Success(_))
    }

    pub const fn prediction(&self) -> Option<&PredictionResult> {
        match self {
            AxisOutcome::Success(prediction) => Some(prediction),
            AxisOutcome::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            AxisOutcome::Success(_) => None,
            AxisOutcome::Failure(message) => Some(message),
        }
    }
}

impl<E: std::fmt::Display> From<std::result::Result<PredictionResult, E>> for AxisOutcome {
    fn from(result: std::result::Result<PredictionResult, E>) -> Self {
        match result {
            Ok(prediction) => AxisOutcome::Success(prediction),
            Err(e) => AxisOutcome::Failure(e.to_string()),
        }
    }
}

/// `{success: true, prediction}` or `{success: false, error}`.
impl Serialize for AxisOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("AxisOutcome", 2)?;
        state.serialize_field("success", &self.is_success())?;
        match self {
            AxisOutcome::Success(prediction) => state.serialize_field("prediction", prediction)?,
            AxisOutcome::Failure(message) => state.serialize_field("error", message)?,
        }
        state.end()
    }
}

/// Both axes evaluated on the same image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombinedResult {
    pub disaster_detection: AxisOutcome,
    pub damage_assessment: AxisOutcome,
}

impl CombinedResult {
    pub const fn outcome(&self, axis: Axis) -> &AxisOutcome {
        match axis {
            Axis::Disaster => &self.disaster_detection,
            Axis::Damage => &self.damage_assessment,
        }
    }
}

/// One entry of a batch response.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchItemResult {
    pub filename: String,
    pub selection: AxisSelection,
    /// Set when the item failed before any axis ran (content type, decode).
    pub error: Option<String>,
    pub outcomes: Vec<(Axis, AxisOutcome)>,
}

impl BatchItemResult {
    pub fn rejected(filename: impl Into<String>, selection: AxisSelection, error: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            selection,
            error: Some(error.into()),
            outcomes: Vec::new(),
        }
    }

    pub fn evaluated(
        filename: impl Into<String>,
        selection: AxisSelection,
        outcomes: Vec<(Axis, AxisOutcome)>,
    ) -> Self {
        Self {
            filename: filename.into(),
            selection,
            error: None,
            outcomes,
        }
    }

    /// In `both` mode one successful axis is enough; in single-axis mode that axis must succeed.
    pub fn success(&self) -> bool {
        if self.error.is_some() {
            return false;
        }
        match self.selection {
            AxisSelection::Both => self.outcomes.iter().any(|(_, o)| o.is_success()),
            _ => !self.outcomes.is_empty() && self.outcomes.iter().all(|(_, o)| o.is_success()),
        }
    }

    pub fn outcome(&self, axis: Axis) -> Option<&AxisOutcome> {
        self.outcomes
            .iter()
            .find_map(|(a, outcome)| (*a == axis).then_some(outcome))
    }
}

/// Flattens per-axis outcomes into `<axis>_prediction` / `<axis>_error` keys.
impl Serialize for BatchItemResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("filename", &self.filename)?;
        map.serialize_entry("success", &self.success())?;
        for (axis, outcome) in &self.outcomes {
            match outcome {
                AxisOutcome::Success(prediction) => {
                    map.serialize_entry(&format!("{axis}_prediction"), prediction)?
                }
                AxisOutcome::Failure(message) => {
                    map.serialize_entry(&format!("{axis}_error"), message)?
                }
            }
        }
        if let Some(error) = &self.error {
            map.serialize_entry("error", error)?;
        } else if !self.success() {
            map.serialize_entry("error", "all predictions failed")?;
        }
        map.end()
    }
}
