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

#![deny(
    missing_docs,
    clippy::indexing_slicing,
    clippy::unwrap_used,
    clippy::panic,
    clippy::expect_used
)]

//! Estimates whether two BLE devices are within a proximity threshold from a single RSSI
//! reading and a TxPower calibration, and sweeps candidate fallback TxPower values for when
//! the true calibration is unknown.

/// Shared types, defaults and options
pub mod confidence_utils;

/// Confidence classification from RSSI and TxPower
pub mod confidence_classifier;

/// Selection of the best fallback TxPower over a candidate grid
pub mod default_selector;

/// Path loss distance estimation
pub mod distance_estimator;

/// Library error type
pub mod error;

/// Weighting of sweep samples
pub mod prior;

/// Agreement of a fallback TxPower against ground truth
pub mod sweep_evaluator;

/// Quantized sweep ranges and grids
pub mod sweep_grid;

pub use confidence_classifier::{
    classify, classify_with_default, confidence_table, ClassificationObserver,
    ConfidenceClassifier, FallbackClassifier, LogObserver, NoopObserver,
};
pub use confidence_utils::*;
pub use default_selector::{
    select_best_default, DefaultSelector, Selection, SelectionResult, TiedCandidates,
};
pub use distance_estimator::estimate_distance;
pub use error::ConfidenceError;
pub use prior::{SamplePrior, UniformPrior};
pub use sweep_evaluator::{check_ground_truth, evaluate_default, SweepEvaluator, SweepResult};
pub use sweep_grid::{QuantizedRange, SweepGrid};

#[cfg(test)]
mod distance_estimator_test;
