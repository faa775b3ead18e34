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

use thiserror::Error;

use crate::confidence_utils::ConfidenceLevel;

/// Library error type.
#[non_exhaustive]
#[derive(Error, Debug, PartialEq, Clone)]
pub enum ConfidenceError {
    /// Reported when a path loss bias is zero, negative or NaN. The distance formula divides
    /// by the bias.
    #[error("bias exponent must be strictly positive, got {0}")]
    NonPositiveBias(f64),
    /// Reported when the proximity threshold is not a positive, finite distance.
    #[error("proximity threshold must be a positive distance, got {0}")]
    InvalidThreshold(f64),
    /// Reported when a sweep range is quantized with zero steps per unit.
    #[error("granularity must be at least 1")]
    ZeroGranularity,
    /// Reported when a sweep range bound is NaN or infinite.
    #[error("sweep range bounds must be finite, got [{min}, {max}]")]
    NonFiniteRange {
        /// Lower bound as given.
        min: f64,
        /// Upper bound as given.
        max: f64,
    },
    /// Reported when a sweep range bound, scaled by the granularity, lies beyond the steps an
    /// f64 represents exactly (2^53).
    #[error("sweep range [{min}, {max}] is too large to quantize at granularity {granularity}")]
    RangeTooLarge {
        /// Lower bound as given.
        min: f64,
        /// Upper bound as given.
        max: f64,
        /// Steps per unit.
        granularity: u32,
    },
    /// Reported when no step of the granularity lies within a sweep range.
    #[error("sweep range [{min}, {max}] contains no step at granularity {granularity}")]
    EmptyRange {
        /// Lower bound as given.
        min: f64,
        /// Upper bound as given.
        max: f64,
        /// Steps per unit.
        granularity: u32,
    },
    /// Reported when a candidate was evaluated over zero total sample weight, so no agreement
    /// ratio exists.
    #[error("no samples to compute agreement for default TxPower {candidate}")]
    EmptyAgreement {
        /// Candidate default TxPower.
        candidate: f64,
    },
    /// Reported when a reading that is within 1 meter by definition did not classify as
    /// `High`. This is a bug in the classifier, never in the input.
    #[error(
        "classifier reported {level} for RSSI {signal} with TxPower {calibration} (expected HIGH)"
    )]
    InvariantViolation {
        /// RSSI of the offending sample.
        signal: f64,
        /// TxPower of the offending sample.
        calibration: f64,
        /// Level the classifier produced.
        level: ConfidenceLevel,
    },
    /// Reported when a sample prior returned a negative, NaN or infinite weight.
    #[error("invalid prior weight {weight} for RSSI {signal} with TxPower {calibration}")]
    InvalidWeight {
        /// RSSI of the sample.
        signal: f64,
        /// TxPower of the sample.
        calibration: f64,
        /// Weight the prior returned.
        weight: f64,
    },
    /// Reported when a configuration document could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(String),
    /// Reported when a bug occurs inside the library. Whenever a seemingly
    /// impossible error condition arises where you could call `expect()`,
    /// return this error instead.
    #[error("internal error: {0}")]
    Internal(String),
}
