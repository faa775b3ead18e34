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

use std::cmp::Ordering;
use std::sync::Arc;

use log::info;
use rayon::prelude::*;

use crate::confidence_classifier::{ClassificationObserver, ConfidenceClassifier};
use crate::confidence_utils::SweepConfig;
use crate::error::ConfidenceError;
use crate::prior::SamplePrior;
use crate::sweep_evaluator::SweepEvaluator;
use crate::sweep_grid::{QuantizedRange, SweepGrid};

/// Candidates sharing one agreement ratio.
#[derive(Debug, Clone, PartialEq)]
pub struct TiedCandidates {
    /// Agreement ratio shared by every candidate.
    pub agreement: f64,
    /// Candidate default TxPowers, in no particular order.
    pub candidates: Vec<f64>,
}

impl TiedCandidates {
    fn new(candidate: f64, agreement: f64) -> Self {
        TiedCandidates {
            agreement,
            candidates: vec![candidate],
        }
    }

    // Strongest TxPower first
    fn sorted(mut self) -> TiedCandidates {
        self.candidates.sort_by(|a, b| b.total_cmp(a));
        self.candidates.dedup();
        self
    }

    // Keeps whichever side `prefer` favours, pooling candidates on a tie
    fn merge(self, other: TiedCandidates, prefer: Ordering) -> TiedCandidates {
        match other.agreement.partial_cmp(&self.agreement) {
            Some(ordering) if ordering == prefer => other,
            Some(Ordering::Equal) => {
                let mut candidates = self.candidates;
                candidates.extend(other.candidates);
                TiedCandidates {
                    agreement: self.agreement,
                    candidates,
                }
            }
            _ => self,
        }
    }
}

fn merge_extreme(
    current: Option<TiedCandidates>,
    other: Option<TiedCandidates>,
    prefer: Ordering,
) -> Option<TiedCandidates> {
    match (current, other) {
        (Some(current), Some(other)) => Some(current.merge(other, prefer)),
        (current, None) => current,
        (None, other) => other,
    }
}

/// Running best and worst candidates. Merging is associative and commutative, so partial
/// selections over any partition of the candidates combine into the same result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    best: Option<TiedCandidates>,
    worst: Option<TiedCandidates>,
}

impl Selection {
    /// Records the agreement ratio of one candidate.
    pub fn observe(&mut self, candidate: f64, agreement: f64) {
        let observed = Selection {
            best: Some(TiedCandidates::new(candidate, agreement)),
            worst: Some(TiedCandidates::new(candidate, agreement)),
        };
        *self = std::mem::take(self).merge(observed);
    }

    /// Combines two partial selections.
    pub fn merge(self, other: Selection) -> Selection {
        Selection {
            best: merge_extreme(self.best, other.best, Ordering::Greater),
            worst: merge_extreme(self.worst, other.worst, Ordering::Less),
        }
    }

    /// Candidates with the highest agreement seen so far.
    pub fn best(&self) -> Option<&TiedCandidates> {
        self.best.as_ref()
    }

    /// Candidates with the lowest agreement seen so far.
    pub fn worst(&self) -> Option<&TiedCandidates> {
        self.worst.as_ref()
    }

    /// Final result, or `None` if nothing was observed.
    pub fn finish(self) -> Option<SelectionResult> {
        SelectionResult::from_ties(self.best?.sorted(), self.worst?.sorted())
    }
}

/// Outcome of sweeping every candidate default TxPower.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionResult {
    /// Highest candidate among those with the best agreement, i.e. the first one met when
    /// sweeping from the strongest TxPower down.
    pub best_default: f64,
    /// Best agreement ratio.
    pub best_agreement: f64,
    /// Every candidate achieving the best agreement, strongest first.
    pub best_candidates: Vec<f64>,
    /// `(min, max)` spanned by the tied best candidates, when there is more than one.
    pub tied_range: Option<(f64, f64)>,
    /// Highest candidate among those with the worst agreement.
    pub worst_default: f64,
    /// Worst agreement ratio.
    pub worst_agreement: f64,
    /// Every candidate achieving the worst agreement, strongest first.
    pub worst_candidates: Vec<f64>,
}

impl SelectionResult {
    fn from_ties(best: TiedCandidates, worst: TiedCandidates) -> Option<Self> {
        let best_candidates = best.candidates;
        let worst_candidates = worst.candidates;
        let best_default = *best_candidates.first()?;
        let tied_range = match (best_candidates.last(), best_candidates.len()) {
            (Some(lowest), len) if len > 1 => Some((*lowest, best_default)),
            _ => None,
        };
        Some(SelectionResult {
            best_default,
            best_agreement: best.agreement,
            best_candidates,
            tied_range,
            worst_default: *worst_candidates.first()?,
            worst_agreement: worst.agreement,
            worst_candidates,
        })
    }
}

/// Picks the least bad default TxPower for transmitters that do not publish one.
pub struct DefaultSelector {
    evaluator: SweepEvaluator,
    candidates: QuantizedRange,
}

impl DefaultSelector {
    /// Evaluates every value of `candidates` with `evaluator`.
    pub fn new(evaluator: SweepEvaluator, candidates: QuantizedRange) -> Self {
        DefaultSelector {
            evaluator,
            candidates,
        }
    }

    /// Builds a selector from `config`. Candidates span the same TxPower range as the
    /// calibrations they stand in for.
    pub fn from_config(config: &SweepConfig) -> Result<Self, ConfidenceError> {
        let sweep = &config.sweep;
        let classifier = ConfidenceClassifier::new(config.classifier)?;
        let grid = SweepGrid::new(
            sweep.signal_range(),
            sweep.calibration_range(),
            sweep.granularity,
        )?;
        let candidates = QuantizedRange::from_bounds(sweep.calibration_range(), sweep.granularity)?;
        Ok(DefaultSelector::new(
            SweepEvaluator::new(classifier, grid),
            candidates,
        ))
    }

    /// Evaluator applied to every candidate.
    pub fn evaluator(&self) -> &SweepEvaluator {
        &self.evaluator
    }

    /// Replaces the weighting of grid points.
    pub fn with_prior(mut self, prior: Arc<dyn SamplePrior>) -> Self {
        self.evaluator = self.evaluator.with_prior(prior);
        self
    }

    /// Replaces the observer of the underlying classifier.
    pub fn with_observer(mut self, observer: Arc<dyn ClassificationObserver>) -> Self {
        self.evaluator = self.evaluator.with_observer(observer);
        self
    }

    /// Sweeps all candidates in parallel and reduces them to the best and worst.
    pub fn select(&self) -> Result<SelectionResult, ConfidenceError> {
        info!(
            "Sweeping {} candidate default TxPowers over {} samples each",
            self.candidates.len(),
            self.evaluator.grid().len()
        );
        let candidates: Vec<f64> = self.candidates.iter().collect();
        let selection = candidates
            .into_par_iter()
            .map(|candidate| {
                let agreement = self.evaluator.evaluate_default(candidate)?.agreement()?;
                Ok::<(f64, f64), ConfidenceError>((candidate, agreement))
            })
            .try_fold(Selection::default, |mut selection, evaluated| {
                let (candidate, agreement) = evaluated?;
                selection.observe(candidate, agreement);
                Ok::<Selection, ConfidenceError>(selection)
            })
            .try_reduce(Selection::default, |a, b| Ok(a.merge(b)))?;
        let result = selection.finish().ok_or_else(|| {
            ConfidenceError::Internal(String::from("no candidate default TxPower was evaluated"))
        })?;
        info!(
            "Best default TxPower {} (agreement {:.4}), worst {} (agreement {:.4})",
            result.best_default, result.best_agreement, result.worst_default, result.worst_agreement
        );
        Ok(result)
    }
}

/// Sweeps candidate defaults over `candidate_range` against every (RSSI, TxPower) pair of
/// `signal_range` and `calibration_range`, all `(min, max)` and quantized at `granularity`
/// steps per dBm, with the default classifier and a uniform prior.
pub fn select_best_default(
    candidate_range: (f64, f64),
    granularity: u32,
    signal_range: (f64, f64),
    calibration_range: (f64, f64),
) -> Result<SelectionResult, ConfidenceError> {
    let grid = SweepGrid::new(signal_range, calibration_range, granularity)?;
    let candidates = QuantizedRange::from_bounds(candidate_range, granularity)?;
    DefaultSelector::new(
        SweepEvaluator::new(ConfidenceClassifier::default(), grid),
        candidates,
    )
    .select()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observe_tracks_ties_both_ways() {
        let mut selection = Selection::default();
        selection.observe(-49.0, 0.5);
        selection.observe(-50.0, 0.7);
        selection.observe(-51.0, 0.7);
        selection.observe(-52.0, 0.2);
        selection.observe(-53.0, 0.2);
        let result = selection.finish().unwrap();
        assert_eq!(result.best_default, -50.0);
        assert_eq!(result.best_agreement, 0.7);
        assert_eq!(result.best_candidates, vec![-50.0, -51.0]);
        assert_eq!(result.tied_range, Some((-51.0, -50.0)));
        assert_eq!(result.worst_default, -52.0);
        assert_eq!(result.worst_agreement, 0.2);
        assert_eq!(result.worst_candidates, vec![-52.0, -53.0]);
    }

    #[test]
    fn test_single_best_has_no_tied_range() {
        let mut selection = Selection::default();
        selection.observe(-60.0, 0.9);
        selection.observe(-61.0, 0.8);
        let result = selection.finish().unwrap();
        assert_eq!(result.best_default, -60.0);
        assert_eq!(result.tied_range, None);
        assert_eq!(result.worst_default, -61.0);
    }

    #[test]
    fn test_empty_selection() {
        assert_eq!(Selection::default().finish(), None);
    }

    #[test]
    fn test_merge_is_order_independent() {
        let observations = [(-49.0, 0.4), (-50.0, 0.6), (-51.0, 0.6), (-52.0, 0.1), (-53.0, 0.6)];
        let mut sequential = Selection::default();
        for (candidate, agreement) in observations {
            sequential.observe(candidate, agreement);
        }
        let mut left = Selection::default();
        let mut right = Selection::default();
        for (index, (candidate, agreement)) in observations.into_iter().enumerate() {
            if index % 2 == 0 {
                left.observe(candidate, agreement);
            } else {
                right.observe(candidate, agreement);
            }
        }
        assert_eq!(
            right.clone().merge(left.clone()).finish(),
            sequential.clone().finish()
        );
        assert_eq!(left.merge(right).finish(), sequential.finish());
    }

    #[test]
    fn test_documented_range_whole_dbm() {
        let result =
            select_best_default((-72.0, -49.0), 1, (-81.0, -60.0), (-72.0, -49.0)).unwrap();
        assert_eq!(result.best_default, -60.0);
        assert_eq!(result.best_agreement, 332.0 / 528.0);
        assert_eq!(result.best_candidates, vec![-60.0, -61.0]);
        assert_eq!(result.tied_range, Some((-61.0, -60.0)));
        assert_eq!(result.worst_default, -72.0);
        assert_eq!(result.worst_agreement, 194.0 / 528.0);
        assert_eq!(result.worst_candidates, vec![-72.0]);
    }

    #[test]
    fn test_half_dbm_granularity() {
        let result =
            select_best_default((-72.0, -49.0), 2, (-81.0, -60.0), (-72.0, -49.0)).unwrap();
        assert_eq!(result.best_default, -60.5);
        assert_eq!(result.best_agreement, 1294.0 / 2021.0);
        assert_eq!(result.tied_range, None);
        assert_eq!(result.worst_default, -72.0);
    }

    #[test]
    fn test_zero_granularity() {
        assert_eq!(
            select_best_default((-72.0, -49.0), 0, (-81.0, -60.0), (-72.0, -49.0)),
            Err(ConfidenceError::ZeroGranularity)
        );
    }

    #[test]
    fn test_huge_bounds_fail_instead_of_overflowing() {
        assert!(matches!(
            select_best_default((-1e300, -1e300), 1, (-1e300, -1e300), (-65.0, -65.0)),
            Err(ConfidenceError::RangeTooLarge { .. })
        ));
        assert!(matches!(
            select_best_default((-72.0, -49.0), 1, (-81.0, -60.0), (-1e300, 1e300)),
            Err(ConfidenceError::RangeTooLarge { .. })
        ));
    }

    #[test]
    fn test_from_default_config() {
        let mut config = SweepConfig::default();
        config.sweep.granularity = 1;
        let result = DefaultSelector::from_config(&config).unwrap().select().unwrap();
        assert_eq!(result.best_default, -60.0);
        assert_eq!(result.tied_range, Some((-61.0, -60.0)));
    }

    #[test]
    fn test_zero_weight_prior_fails() {
        let mut config = SweepConfig::default();
        config.sweep.granularity = 1;
        let result = DefaultSelector::from_config(&config)
            .unwrap()
            .with_prior(Arc::new(|_signal: f64, _calibration: f64| 0.0))
            .select();
        assert!(matches!(result, Err(ConfidenceError::EmptyAgreement { .. })));
    }
}
