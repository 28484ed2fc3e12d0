use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use ndarray::prelude::*;

use crate::errors::{ClassifierError, Result};
use crate::traits::{Resolution, Scorer};

/// A scorer for tests.
///
/// Returns the same scores for any tensor.
#[derive(Debug, Clone)]
pub struct MockScorer {
    pub scores: Vec<f32>,
    pub resolution: Option<Resolution>,
    calls: Arc<AtomicUsize>,
}

impl MockScorer {
    pub fn new(scores: Vec<f32>) -> Self {
        Self {
            scores,
            resolution: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub const fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = Some(resolution);
        self
    }

    /// Number of `score` calls, shared between clones.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Scorer for MockScorer {
    fn declared_resolution(&self) -> Option<Resolution> {
        self.resolution
    }

    fn score(&self, tensor: ArrayView4<f32>) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if tensor.shape()[0] != 1 {
            return Err(ClassifierError::inference(format!(
                "expected a batch of one, got {:?}",
                tensor.shape()
            )));
        }
        Ok(self.scores.clone())
    }

    fn describe(&self) -> String {
        format!("mock:{:?}", self.scores)
    }
}

/// A scorer whose every invocation fails, standing in for a broken runtime.
#[derive(Debug, Clone, Default)]
pub struct FailingScorer {
    pub message: String,
}

impl FailingScorer {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Scorer for FailingScorer {
    fn declared_resolution(&self) -> Option<Resolution> {
        None
    }

    fn score(&self, _tensor: ArrayView4<f32>) -> Result<Vec<f32>> {
        Err(ClassifierError::inference(self.message.clone()))
    }

    fn describe(&self) -> String {
        "failing".to_string()
    }
}

/// A disaster scorer emitting probabilities that always pick "Flood".
pub fn create_mock_disaster_scorer() -> MockScorer {
    MockScorer::new(vec![0.05, 0.05, 0.85, 0.05])
}

/// A damage scorer emitting logits that favour "Destroyed".
pub fn create_mock_damage_scorer() -> MockScorer {
    MockScorer::new(vec![-1.0, 0.5, 1.0, 3.0])
}
