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

use std::sync::Arc;

use log::trace;

use crate::confidence_utils::{
    ClassifierOptions, ConfidenceAssessment, ConfidenceLevel, SweepConfig,
    DEFAULT_CLASSIFIER_OPTIONS, DEFAULT_TX_POWER,
};
use crate::distance_estimator::estimate_distance;
use crate::error::ConfidenceError;
use crate::sweep_grid::SweepGrid;

/// Receives every assessment a classifier makes. Used for diagnostics only.
pub trait ClassificationObserver: Send + Sync {
    /// Called once per classification, after the level has been decided.
    fn on_classification(&self, assessment: &ConfidenceAssessment);
}

/// Discards all assessments.
pub struct NoopObserver;

impl ClassificationObserver for NoopObserver {
    fn on_classification(&self, _assessment: &ConfidenceAssessment) {}
}

/// Writes every assessment to the `log` facade at trace level.
pub struct LogObserver;

impl ClassificationObserver for LogObserver {
    fn on_classification(&self, assessment: &ConfidenceAssessment) {
        trace!(
            "RSSI: {}  TxPower: {}  confidence: {}  upper estimate: {:.2}m  lower estimate: {:.2}m",
            assessment.signal,
            assessment.calibration,
            assessment.level,
            assessment.upper_estimate_meters,
            assessment.lower_estimate_meters
        );
    }
}

// Static function for getting the confidence level from both distance estimates
fn get_confidence_level_from_estimates(
    upper_estimate_meters: f64,
    lower_estimate_meters: f64,
    proximity_threshold_meters: f64,
) -> ConfidenceLevel {
    if upper_estimate_meters <= proximity_threshold_meters {
        return ConfidenceLevel::High;
    }
    if lower_estimate_meters <= proximity_threshold_meters {
        return ConfidenceLevel::Moderate;
    }
    ConfidenceLevel::Low
}

/// Classifies an (RSSI, TxPower) pair by bracketing the distance between an optimistic and
/// a pessimistic path loss bias.
#[derive(Clone)]
pub struct ConfidenceClassifier {
    options: ClassifierOptions,
    observer: Arc<dyn ClassificationObserver>,
}

impl Default for ConfidenceClassifier {
    fn default() -> Self {
        ConfidenceClassifier {
            options: DEFAULT_CLASSIFIER_OPTIONS,
            observer: Arc::new(NoopObserver),
        }
    }
}

impl ConfidenceClassifier {
    /// Creates a silent classifier after validating `options`.
    pub fn new(options: ClassifierOptions) -> Result<Self, ConfidenceError> {
        options.validate()?;
        Ok(ConfidenceClassifier {
            options,
            observer: Arc::new(NoopObserver),
        })
    }

    /// Replaces the observer notified of every classification.
    pub fn with_observer(mut self, observer: Arc<dyn ClassificationObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Options this classifier was built with.
    pub fn options(&self) -> &ClassifierOptions {
        &self.options
    }

    /// Computes both distance estimates and the resulting confidence level.
    pub fn assess(
        &self,
        signal: f64,
        calibration: f64,
    ) -> Result<ConfidenceAssessment, ConfidenceError> {
        let upper_estimate_meters = estimate_distance(signal, calibration, self.options.bias_min)?;
        let lower_estimate_meters = estimate_distance(signal, calibration, self.options.bias_max)?;
        let assessment = ConfidenceAssessment {
            signal,
            calibration,
            upper_estimate_meters,
            lower_estimate_meters,
            level: get_confidence_level_from_estimates(
                upper_estimate_meters,
                lower_estimate_meters,
                self.options.proximity_threshold_meters,
            ),
            axiomatic: calibration <= signal,
        };
        self.observer.on_classification(&assessment);
        Ok(assessment)
    }

    /// Confidence that `signal` was received within the proximity threshold of a transmitter
    /// calibrated at `calibration`.
    pub fn classify(
        &self,
        signal: f64,
        calibration: f64,
    ) -> Result<ConfidenceLevel, ConfidenceError> {
        Ok(self.assess(signal, calibration)?.level)
    }

    /// Same as [`classify`](Self::classify), for when the transmitter's TxPower is unknown and
    /// `default_calibration` stands in for it.
    pub fn classify_with_default(
        &self,
        signal: f64,
        default_calibration: f64,
    ) -> Result<ConfidenceLevel, ConfidenceError> {
        self.classify(signal, default_calibration)
    }

    /// Assesses every (RSSI, TxPower) pair on `grid`, in grid order.
    pub fn confidence_table(
        &self,
        grid: &SweepGrid,
    ) -> Result<Vec<ConfidenceAssessment>, ConfidenceError> {
        grid.iter()
            .map(|(signal, calibration)| self.assess(signal, calibration))
            .collect()
    }
}

/// Classifies readings from transmitters that do not publish a TxPower, using a fixed
/// default calibration instead.
#[derive(Clone)]
pub struct FallbackClassifier {
    classifier: ConfidenceClassifier,
    default_calibration: f64,
}

impl Default for FallbackClassifier {
    fn default() -> Self {
        FallbackClassifier::new(ConfidenceClassifier::default(), DEFAULT_TX_POWER)
    }
}

impl FallbackClassifier {
    /// Wraps `classifier` with `default_calibration` standing in for the unknown TxPower.
    pub fn new(classifier: ConfidenceClassifier, default_calibration: f64) -> Self {
        FallbackClassifier {
            classifier,
            default_calibration,
        }
    }

    /// Builds the fallback from the classifier options and default TxPower of `config`.
    pub fn from_config(config: &SweepConfig) -> Result<Self, ConfidenceError> {
        Ok(FallbackClassifier::new(
            ConfidenceClassifier::new(config.classifier)?,
            config.sweep.default_tx_power,
        ))
    }

    /// TxPower assumed for every reading.
    pub fn default_calibration(&self) -> f64 {
        self.default_calibration
    }

    /// Confidence for `signal` assuming the default calibration.
    pub fn classify(&self, signal: f64) -> Result<ConfidenceLevel, ConfidenceError> {
        self.classifier
            .classify_with_default(signal, self.default_calibration)
    }
}

/// Classifies with the default options.
pub fn classify(signal: f64, calibration: f64) -> Result<ConfidenceLevel, ConfidenceError> {
    ConfidenceClassifier::default().classify(signal, calibration)
}

/// Classifies with the default options and `default_calibration` in place of the unknown
/// TxPower. Pass [`DEFAULT_TX_POWER`] for the stock fallback.
pub fn classify_with_default(
    signal: f64,
    default_calibration: f64,
) -> Result<ConfidenceLevel, ConfidenceError> {
    ConfidenceClassifier::default().classify_with_default(signal, default_calibration)
}

/// Assesses every pair on `grid` with the default options.
pub fn confidence_table(grid: &SweepGrid) -> Result<Vec<ConfidenceAssessment>, ConfidenceError> {
    ConfidenceClassifier::default().confidence_table(grid)
}
