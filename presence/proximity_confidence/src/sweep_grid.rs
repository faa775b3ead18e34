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

use itertools::Itertools;

use crate::error::ConfidenceError;

// Largest step index an f64 represents exactly
const MAX_STEP: f64 = 9_007_199_254_740_992.0;

// Absorbs representation error when a bound is meant to sit on a step, e.g. -60.4 * 10
const STEP_TOLERANCE: f64 = 1e-9;

// Steps from `high_step` down to `low_step` inclusive, saturating at `usize::MAX`
fn count_steps(high_step: i64, low_step: i64) -> usize {
    if high_step < low_step {
        return 0;
    }
    high_step
        .checked_sub(low_step)
        .and_then(|span| span.checked_add(1))
        .and_then(|count| usize::try_from(count).ok())
        .unwrap_or(usize::MAX)
}

/// A closed range quantized at `1 / granularity`, walked from the larger bound down to the
/// smaller one. Bounds that fall between steps snap inward, so every value lies within the
/// requested range; bounds on a step are included.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct QuantizedRange {
    high_step: i64,
    low_step: i64,
    granularity: u32,
}

impl QuantizedRange {
    /// Quantizes the range between `bound_a` and `bound_b`, which may be given in either
    /// order.
    pub fn new(bound_a: f64, bound_b: f64, granularity: u32) -> Result<Self, ConfidenceError> {
        if granularity == 0 {
            return Err(ConfidenceError::ZeroGranularity);
        }
        if !bound_a.is_finite() || !bound_b.is_finite() {
            return Err(ConfidenceError::NonFiniteRange {
                min: bound_a.min(bound_b),
                max: bound_a.max(bound_b),
            });
        }
        let (min, max) = (bound_a.min(bound_b), bound_a.max(bound_b));
        let scale = f64::from(granularity);
        let high = (max * scale + STEP_TOLERANCE).floor();
        let low = (min * scale - STEP_TOLERANCE).ceil();
        if high.abs() > MAX_STEP || low.abs() > MAX_STEP {
            return Err(ConfidenceError::RangeTooLarge { min, max, granularity });
        }
        if low > high {
            return Err(ConfidenceError::EmptyRange { min, max, granularity });
        }
        Ok(QuantizedRange {
            high_step: high as i64,
            low_step: low as i64,
            granularity,
        })
    }

    /// Convenience for a `(min, max)` tuple.
    pub fn from_bounds(bounds: (f64, f64), granularity: u32) -> Result<Self, ConfidenceError> {
        QuantizedRange::new(bounds.0, bounds.1, granularity)
    }

    /// Steps per unit.
    pub fn granularity(&self) -> u32 {
        self.granularity
    }

    /// Number of values in the range. Never zero.
    pub fn len(&self) -> usize {
        count_steps(self.high_step, self.low_step)
    }

    /// Always false, kept alongside [`len`](Self::len).
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Values from the larger bound down to the smaller. Each call restarts the walk.
    pub fn iter(&self) -> QuantizedValues {
        QuantizedValues {
            next_step: Some(self.high_step),
            low_step: self.low_step,
            scale: f64::from(self.granularity),
        }
    }
}

impl IntoIterator for &QuantizedRange {
    type Item = f64;
    type IntoIter = QuantizedValues;

    fn into_iter(self) -> QuantizedValues {
        self.iter()
    }
}

/// Iterator over the values of a [`QuantizedRange`].
#[derive(Debug, Clone)]
pub struct QuantizedValues {
    next_step: Option<i64>,
    low_step: i64,
    scale: f64,
}

impl Iterator for QuantizedValues {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        let step = self.next_step.filter(|step| *step >= self.low_step)?;
        self.next_step = step.checked_sub(1);
        Some(step as f64 / self.scale)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self
            .next_step
            .map_or(0, |step| count_steps(step, self.low_step));
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for QuantizedValues {}

/// Every (RSSI, TxPower) pair of two quantized ranges. Signals vary slowest.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SweepGrid {
    signals: QuantizedRange,
    calibrations: QuantizedRange,
}

impl SweepGrid {
    /// Quantizes both ranges, given as `(min, max)`, at the same granularity.
    pub fn new(
        signal_range: (f64, f64),
        calibration_range: (f64, f64),
        granularity: u32,
    ) -> Result<Self, ConfidenceError> {
        Ok(SweepGrid {
            signals: QuantizedRange::from_bounds(signal_range, granularity)?,
            calibrations: QuantizedRange::from_bounds(calibration_range, granularity)?,
        })
    }

    /// Signal (RSSI) axis.
    pub fn signals(&self) -> &QuantizedRange {
        &self.signals
    }

    /// Calibration (TxPower) axis.
    pub fn calibrations(&self) -> &QuantizedRange {
        &self.calibrations
    }

    /// Number of grid points, saturating at `usize::MAX`.
    pub fn len(&self) -> usize {
        self.signals.len().saturating_mul(self.calibrations.len())
    }

    /// Always false, kept alongside [`len`](Self::len).
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Lazily yields `(signal, calibration)` pairs. Each call restarts the walk.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + Clone {
        self.signals.iter().cartesian_product(self.calibrations.iter())
    }
}
