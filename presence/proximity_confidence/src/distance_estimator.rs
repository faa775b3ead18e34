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

use crate::error::ConfidenceError;

/// Estimates the distance in meters between advertiser and scanner.
///
/// Inverse of the log-distance path loss model, solved for distance:
/// `10 ^ ((calibration - signal) / (10 * bias))`, where `calibration` is the TxPower (expected
/// RSSI at 1 meter) and `signal` the measured RSSI, both in dBm. A larger `bias` flattens the
/// relationship between signal and distance, modelling a noisier environment.
///
/// Fails with [`ConfidenceError::NonPositiveBias`] unless `bias` is strictly positive.
pub fn estimate_distance(
    signal: f64,
    calibration: f64,
    bias: f64,
) -> Result<f64, ConfidenceError> {
    if bias.is_nan() || bias <= 0.0 {
        return Err(ConfidenceError::NonPositiveBias(bias));
    }
    let base: f64 = 10.0;
    Ok(base.powf((calibration - signal) / (10.0 * bias)))
}
