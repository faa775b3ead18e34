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

use crate::distance_estimator::estimate_distance;
use crate::error::ConfidenceError;

const TOLERANCE: f64 = 1e-9;

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < TOLERANCE,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn test_one_meter_when_signal_equals_calibration() {
    assert_eq!(estimate_distance(-65.0, -65.0, 2.0), Ok(1.0));
    assert_eq!(estimate_distance(-65.0, -65.0, 4.0), Ok(1.0));
}

#[test]
fn test_weak_signal_low_bias() {
    // 10^((-65 + 70) / 20) = 10^0.25
    assert_close(estimate_distance(-70.0, -65.0, 2.0).unwrap(), 1.778_279_410_038_922_8);
}

#[test]
fn test_weak_signal_high_bias() {
    // 10^((-65 + 70) / 40) = 10^0.125
    assert_close(estimate_distance(-70.0, -65.0, 4.0).unwrap(), 1.333_521_432_163_324);
}

#[test]
fn test_strong_signal() {
    assert_close(estimate_distance(-45.0, -65.0, 2.0).unwrap(), 0.1);
    assert_close(estimate_distance(-63.5, -65.0, 2.0).unwrap(), 0.841_395_141_645_195);
}

#[test]
fn test_large_distance() {
    assert_close(estimate_distance(-85.0, -65.0, 2.0).unwrap(), 10.0);
}

#[test]
fn test_zero_bias() {
    assert_eq!(
        estimate_distance(-70.0, -65.0, 0.0),
        Err(ConfidenceError::NonPositiveBias(0.0))
    );
}

#[test]
fn test_negative_bias() {
    assert_eq!(
        estimate_distance(-70.0, -65.0, -2.0),
        Err(ConfidenceError::NonPositiveBias(-2.0))
    );
}

#[test]
fn test_nan_bias() {
    assert!(matches!(
        estimate_distance(-70.0, -65.0, f64::NAN),
        Err(ConfidenceError::NonPositiveBias(_))
    ));
}

#[test]
fn test_repeated_calls_are_bit_identical() {
    let first = estimate_distance(-71.3, -58.9, 3.1).unwrap();
    let second = estimate_distance(-71.3, -58.9, 3.1).unwrap();
    assert_eq!(first.to_bits(), second.to_bits());
}
