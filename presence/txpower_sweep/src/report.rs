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

use proximity_confidence::{ClassifierOptions, ConfidenceAssessment, SelectionResult};

/// Summary of a default TxPower sweep.
pub(crate) fn selection_lines(result: &SelectionResult) -> Vec<String> {
    let mut lines = vec![
        format!(
            "best = {} (agreement {:.4})",
            result.best_default, result.best_agreement
        ),
        format!(
            "worst = {} (agreement {:.4})",
            result.worst_default, result.worst_agreement
        ),
    ];
    if let Some((min, max)) = result.tied_range {
        lines.push(format!("equal best from {min} to {max}"));
    }
    if result.worst_candidates.len() > 1 {
        lines.push(format!(
            "equal worst at {}",
            result
                .worst_candidates
                .iter()
                .map(|candidate| candidate.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ));
    }
    lines
}

/// Agreement of the default TxPower currently in use, for comparison with the best.
pub(crate) fn configured_default_line(default_tx_power: f64, agreement: f64) -> String {
    format!("configured default = {default_tx_power} (agreement {agreement:.4})")
}

/// One confidence table entry.
pub(crate) fn assessment_lines(
    assessment: &ConfidenceAssessment,
    options: ClassifierOptions,
) -> Vec<String> {
    let mut lines = vec![
        format!(
            "RSSI: {}  TxPower: {}",
            assessment.signal, assessment.calibration
        ),
        format!(
            "upper estimate (bias = {}): {:.2}m",
            options.bias_min, assessment.upper_estimate_meters
        ),
        format!(
            "lower estimate (bias = {}): {:.2}m",
            options.bias_max, assessment.lower_estimate_meters
        ),
        format!("confidence: {}", assessment.level),
    ];
    if assessment.axiomatic {
        lines.push(format!(
            "Axiomatic (TxPower {} <= RSSI {})",
            assessment.calibration, assessment.signal
        ));
    }
    lines
}
