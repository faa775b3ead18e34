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

use serde::{Deserialize, Serialize};

use crate::error::ConfidenceError;

/// Bias for the upper distance estimate: high false alarms, low miss rate (less noisy).
pub const DEFAULT_BIAS_MIN: f64 = 2.0;
/// Bias for the lower distance estimate: high hit rate, low correct rejections (more noisy).
pub const DEFAULT_BIAS_MAX: f64 = 4.0;
/// Distance of interest for contact detection.
pub const DEFAULT_PROXIMITY_THRESHOLD_METERS: f64 = 1.5;
/// TxPower assumed when the advertiser does not publish one.
pub const DEFAULT_TX_POWER: f64 = -65.0;

/// Highest TxPower swept, from observed calibrations (actual max -49.4 dBm).
pub const DEFAULT_MAX_TX_POWER: i32 = -49;
/// Lowest TxPower swept.
pub const DEFAULT_MIN_TX_POWER: i32 = -72;
/// Highest RSSI expected at roughly the proximity threshold for those calibrations.
pub const DEFAULT_MAX_RSSI: i32 = -60;
/// Lowest RSSI expected at roughly the proximity threshold.
pub const DEFAULT_MIN_RSSI: i32 = -81;
/// Grid steps per dBm: 10 for one decimal place, 100 for two. Cost grows quadratically.
pub const DEFAULT_GRANULARITY: u32 = 10;

/// Classifier options used when none are configured.
pub const DEFAULT_CLASSIFIER_OPTIONS: ClassifierOptions = ClassifierOptions {
    bias_min: DEFAULT_BIAS_MIN,
    bias_max: DEFAULT_BIAS_MAX,
    proximity_threshold_meters: DEFAULT_PROXIMITY_THRESHOLD_METERS,
};

/// Sweep options used when none are configured.
pub const DEFAULT_SWEEP_OPTIONS: SweepOptions = SweepOptions {
    max_tx_power: DEFAULT_MAX_TX_POWER as f64,
    min_tx_power: DEFAULT_MIN_TX_POWER as f64,
    max_rssi: DEFAULT_MAX_RSSI as f64,
    min_rssi: DEFAULT_MIN_RSSI as f64,
    granularity: DEFAULT_GRANULARITY,
    default_tx_power: DEFAULT_TX_POWER,
};

/// Certainty that a reading represents a distance within the proximity threshold.
///
/// Ordered by certainty, so `High > Moderate > Low`.
#[derive(Debug, Eq, Hash, Copy, Clone, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfidenceLevel {
    /// Neither estimate is within the threshold.
    Low,
    /// Only the pessimistic (high bias) estimate is within the threshold.
    Moderate,
    /// Even the optimistic (low bias) estimate is within the threshold.
    High,
}

impl std::fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ConfidenceLevel::Low => "LOW",
            ConfidenceLevel::Moderate => "MODERATE",
            ConfidenceLevel::High => "HIGH",
        };
        f.write_str(name)
    }
}

/// Tunable terms of the classifier.
///
/// The biases incorporate unknown physical variables such as fade margin and path loss. A
/// range of 2-4 is considered sensible.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierOptions {
    /// Path loss exponent used for the upper distance estimate.
    pub bias_min: f64,
    /// Path loss exponent used for the lower distance estimate.
    pub bias_max: f64,
    /// Distance cutoff, in meters, that both estimates are compared against.
    pub proximity_threshold_meters: f64,
}

impl Default for ClassifierOptions {
    fn default() -> Self {
        DEFAULT_CLASSIFIER_OPTIONS
    }
}

impl ClassifierOptions {
    /// Checks that both biases are strictly positive and the threshold is a positive distance.
    pub fn validate(&self) -> Result<(), ConfidenceError> {
        for bias in [self.bias_min, self.bias_max] {
            if bias.is_nan() || bias <= 0.0 {
                return Err(ConfidenceError::NonPositiveBias(bias));
            }
        }
        let threshold = self.proximity_threshold_meters;
        if !threshold.is_finite() || threshold <= 0.0 {
            return Err(ConfidenceError::InvalidThreshold(threshold));
        }
        Ok(())
    }
}

/// Bounds and resolution of the fallback TxPower sweep.
///
/// Every RSSI and TxPower value in range is treated as equally likely unless a different
/// [`SamplePrior`](crate::prior::SamplePrior) is supplied. This is naive and almost
/// certainly untrue of real deployments.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepOptions {
    /// Highest TxPower, in dBm, on both the calibration and the candidate grid.
    pub max_tx_power: f64,
    /// Lowest TxPower, in dBm, on both the calibration and the candidate grid.
    pub min_tx_power: f64,
    /// Highest RSSI, in dBm, on the signal grid.
    pub max_rssi: f64,
    /// Lowest RSSI, in dBm, on the signal grid.
    pub min_rssi: f64,
    /// Grid steps per dBm.
    pub granularity: u32,
    /// TxPower used by the fallback classifier outside of a sweep.
    pub default_tx_power: f64,
}

impl Default for SweepOptions {
    fn default() -> Self {
        DEFAULT_SWEEP_OPTIONS
    }
}

impl SweepOptions {
    /// RSSI bounds as `(min, max)`.
    pub fn signal_range(&self) -> (f64, f64) {
        (self.min_rssi, self.max_rssi)
    }

    /// TxPower bounds as `(min, max)`, used for both calibrations and candidates.
    pub fn calibration_range(&self) -> (f64, f64) {
        (self.min_tx_power, self.max_tx_power)
    }
}

/// Classifier and sweep options, loadable from a JSON document.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    /// Classifier options.
    pub classifier: ClassifierOptions,
    /// Sweep options.
    pub sweep: SweepOptions,
}

impl SweepConfig {
    /// Parses a configuration document. Missing fields take their default values.
    pub fn from_json_str(json: &str) -> Result<Self, ConfidenceError> {
        let config: SweepConfig =
            serde_json::from_str(json).map_err(|e| ConfidenceError::Config(e.to_string()))?;
        config.classifier.validate()?;
        if config.sweep.granularity == 0 {
            return Err(ConfidenceError::ZeroGranularity);
        }
        Ok(config)
    }
}

/// Everything the classifier derived for one (RSSI, TxPower) pair.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct ConfidenceAssessment {
    /// Measured RSSI in dBm.
    pub signal: f64,
    /// TxPower (expected RSSI at 1 meter) in dBm.
    pub calibration: f64,
    /// Distance estimate using the low bias.
    pub upper_estimate_meters: f64,
    /// Distance estimate using the high bias.
    pub lower_estimate_meters: f64,
    /// Resulting confidence.
    pub level: ConfidenceLevel,
    /// True when `calibration <= signal`, which puts the device within 1 meter by definition.
    pub axiomatic: bool,
}
