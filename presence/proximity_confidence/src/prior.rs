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

/// Relative likelihood of observing a given (RSSI, TxPower) pair in the field.
///
/// The sweep weights each grid point's vote by this value. Weights must be finite and
/// non-negative.
pub trait SamplePrior: Send + Sync {
    /// Weight of the sample at `signal` dBm from a transmitter calibrated at `calibration`.
    fn weight(&self, signal: f64, calibration: f64) -> f64;
}

/// Treats every RSSI and TxPower in range as equally likely.
///
/// This is naive and almost certainly untrue. With real observations it would be better to
/// weight by their empirical distribution, or to estimate distance from where a reading
/// falls within its encounter set rather than from a fixed default TxPower.
#[derive(Debug, Default, Copy, Clone)]
pub struct UniformPrior;

impl SamplePrior for UniformPrior {
    fn weight(&self, _signal: f64, _calibration: f64) -> f64 {
        1.0
    }
}

impl<F> SamplePrior for F
where
    F: Fn(f64, f64) -> f64 + Send + Sync,
{
    fn weight(&self, signal: f64, calibration: f64) -> f64 {
        self(signal, calibration)
    }
}
