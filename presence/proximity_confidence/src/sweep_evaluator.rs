// Copyright 2023 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::ops::Add;
use std::sync::Arc;

use log::{debug, error};

use crate::confidence_classifier::{
    ClassificationObserver, ConfidenceClassifier, FallbackClassifier,
};
use crate::confidence_utils::{ConfidenceAssessment, ConfidenceLevel};
use crate::error::ConfidenceError;
use crate::prior::{SamplePrior, UniformPrior};
use crate::sweep_grid::SweepGrid;

/// Agreement between a candidate default TxPower and the true TxPower over a sweep grid.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SweepResult {
    /// Candidate default TxPower that was evaluated.
    pub candidate: f64,
    /// Grid points where the fallback level equals the true level.
    pub matches: u64,
    /// Grid points where it does not.
    pub mismatches: u64,
    /// Prior weight of the matching grid points.
    pub matched_weight: f64,
    /// Prior weight of the mismatching grid points.
    pub mismatched_weight: f64,
}

impl SweepResult {
    /// An empty tally for `candidate`.
    pub fn new(candidate: f64) -> Self {
        SweepResult {
            candidate,
            matches: 0,
            mismatches: 0,
            matched_weight: 0.0,
            mismatched_weight: 0.0,
        }
    }

    /// Records one grid point.
    pub fn record(&mut self, agrees: bool, weight: f64) {
        if agrees {
            self.matches += 1;
            self.matched_weight += weight;
        } else {
            self.mismatches += 1;
            self.mismatched_weight += weight;
        }
    }

    /// Number of grid points evaluated.
    pub fn samples(&self) -> u64 {
        self.matches + self.mismatches
    }

    /// Weighted fraction of grid points where the candidate reproduced the true level. Equal to
    /// `matches / (matches + mismatches)` under a uniform prior.
    pub fn agreement(&self) -> Result<f64, ConfidenceError> {
        let total_weight = self.matched_weight + self.mismatched_weight;
        if self.samples() == 0 || total_weight <= 0.0 {
            return Err(ConfidenceError::EmptyAgreement {
                candidate: self.candidate,
            });
        }
        Ok(self.matched_weight / total_weight)
    }
}

/// Combines partial tallies. Both operands must tally the same candidate.
impl Add for SweepResult {
    type Output = SweepResult;

    fn add(self, other: SweepResult) -> SweepResult {
        debug_assert_eq!(
            self.candidate.to_bits(),
            other.candidate.to_bits(),
            "tallies of different candidates"
        );
        SweepResult {
            candidate: self.candidate,
            matches: self.matches + other.matches,
            mismatches: self.mismatches + other.mismatches,
            matched_weight: self.matched_weight + other.matched_weight,
            mismatched_weight: self.mismatched_weight + other.mismatched_weight,
        }
    }
}

/// Fails if a reading that is within 1 meter by definition (`calibration <= signal`) was not
/// classified as `High`.
pub fn check_ground_truth(assessment: &ConfidenceAssessment) -> Result<(), ConfidenceError> {
    if assessment.axiomatic && assessment.level != ConfidenceLevel::High {
        error!(
            "Ground truth violated: RSSI {} TxPower {} classified {}",
            assessment.signal, assessment.calibration, assessment.level
        );
        return Err(ConfidenceError::InvariantViolation {
            signal: assessment.signal,
            calibration: assessment.calibration,
            level: assessment.level,
        });
    }
    Ok(())
}

/// Compares the fallback classifier against the true TxPower over every point of a grid.
#[derive(Clone)]
pub struct SweepEvaluator {
    classifier: ConfidenceClassifier,
    grid: SweepGrid,
    prior: Arc<dyn SamplePrior>,
}

impl SweepEvaluator {
    /// Evaluates over `grid` with a uniform prior.
    pub fn new(classifier: ConfidenceClassifier, grid: SweepGrid) -> Self {
        SweepEvaluator {
            classifier,
            grid,
            prior: Arc::new(UniformPrior),
        }
    }

    /// Replaces the weighting of grid points.
    pub fn with_prior(mut self, prior: Arc<dyn SamplePrior>) -> Self {
        self.prior = prior;
        self
    }

    /// Replaces the observer of the classifier.
    pub fn with_observer(mut self, observer: Arc<dyn ClassificationObserver>) -> Self {
        self.classifier = self.classifier.with_observer(observer);
        self
    }

    /// Grid every candidate is evaluated over.
    pub fn grid(&self) -> &SweepGrid {
        &self.grid
    }

    /// Classifier used for both the true and the fallback levels.
    pub fn classifier(&self) -> &ConfidenceClassifier {
        &self.classifier
    }

    /// Tallies how often `candidate_default` yields the same level as the true TxPower.
    ///
    /// Aborts with [`ConfidenceError::InvariantViolation`] on the first grid point whose true
    /// classification contradicts ground truth.
    pub fn evaluate_default(&self, candidate_default: f64) -> Result<SweepResult, ConfidenceError> {
        let fallback = FallbackClassifier::new(self.classifier.clone(), candidate_default);
        // Below 1 meter the axiom no longer implies High.
        let ground_truth_applies = self.classifier.options().proximity_threshold_meters >= 1.0;
        let mut result = SweepResult::new(candidate_default);
        for signal in self.grid.signals() {
            // Independent of the true TxPower, so once per RSSI.
            let fallback_level = fallback.classify(signal)?;
            for calibration in self.grid.calibrations() {
                let assessment = self.classifier.assess(signal, calibration)?;
                if ground_truth_applies {
                    check_ground_truth(&assessment)?;
                }
                let weight = self.prior.weight(signal, calibration);
                if !weight.is_finite() || weight < 0.0 {
                    return Err(ConfidenceError::InvalidWeight {
                        signal,
                        calibration,
                        weight,
                    });
                }
                result.record(assessment.level == fallback_level, weight);
            }
        }
        debug!(
            "Default TxPower {}: {} matches, {} mismatches",
            candidate_default, result.matches, result.mismatches
        );
        Ok(result)
    }
}

/// Evaluates `candidate_default` with the default classifier and a uniform prior over the
/// grid spanned by `signal_range` and `calibration_range`, both `(min, max)`.
pub fn evaluate_default(
    candidate_default: f64,
    signal_range: (f64, f64),
    calibration_range: (f64, f64),
    granularity: u32,
) -> Result<SweepResult, ConfidenceError> {
    let grid = SweepGrid::new(signal_range, calibration_range, granularity)?;
    SweepEvaluator::new(ConfidenceClassifier::default(), grid).evaluate_default(candidate_default)
}
