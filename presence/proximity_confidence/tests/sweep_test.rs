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

use proximity_confidence::*;

#[test]
fn test_select_best_default_documented_ranges() {
    let result = select_best_default(
        (DEFAULT_MIN_TX_POWER as f64, DEFAULT_MAX_TX_POWER as f64),
        1,
        (DEFAULT_MIN_RSSI as f64, DEFAULT_MAX_RSSI as f64),
        (DEFAULT_MIN_TX_POWER as f64, DEFAULT_MAX_TX_POWER as f64),
    )
    .unwrap();
    assert!(result.best_default <= DEFAULT_MAX_TX_POWER as f64);
    assert!(result.best_default >= DEFAULT_MIN_TX_POWER as f64);
    assert!(result.best_agreement > 0.0 && result.best_agreement <= 1.0);
    assert!(result.worst_agreement <= result.best_agreement);
    // Close to the -60.4 found at one decimal place
    assert!((-61.0..=-60.0).contains(&result.best_default));
    assert_eq!(result.tied_range, Some((-61.0, -60.0)));
}

#[test]
fn test_best_default_beats_stock_default() {
    let stock = evaluate_default(DEFAULT_TX_POWER, (-81.0, -60.0), (-72.0, -49.0), 1)
        .unwrap()
        .agreement()
        .unwrap();
    let result = select_best_default((-72.0, -49.0), 1, (-81.0, -60.0), (-72.0, -49.0)).unwrap();
    assert!(result.best_agreement > stock);
}

#[test]
fn test_selector_from_json_config() {
    let config = SweepConfig::from_json_str(
        r#"{
            "classifier": { "proximity_threshold_meters": 1.5 },
            "sweep": { "granularity": 1, "min_tx_power": -66.0, "max_tx_power": -55.0 }
        }"#,
    )
    .unwrap();
    assert_eq!(config.classifier, DEFAULT_CLASSIFIER_OPTIONS);
    assert_eq!(config.sweep.max_rssi, -60.0);
    let result = DefaultSelector::from_config(&config).unwrap().select().unwrap();
    assert!((-66.0..=-55.0).contains(&result.best_default));
    assert!((-66.0..=-55.0).contains(&result.worst_default));
}

#[test]
fn test_empty_config_is_default() {
    assert_eq!(SweepConfig::from_json_str("{}"), Ok(SweepConfig::default()));
}

#[test]
fn test_invalid_configs() {
    assert_eq!(
        SweepConfig::from_json_str(r#"{ "sweep": { "granularity": 0 } }"#),
        Err(ConfidenceError::ZeroGranularity)
    );
    assert_eq!(
        SweepConfig::from_json_str(r#"{ "classifier": { "bias_min": 0.0 } }"#),
        Err(ConfidenceError::NonPositiveBias(0.0))
    );
    assert!(matches!(
        SweepConfig::from_json_str(r#"{ "sweep": { "granularity": -1 } }"#),
        Err(ConfidenceError::Config(_))
    ));
    assert!(matches!(
        SweepConfig::from_json_str("not json"),
        Err(ConfidenceError::Config(_))
    ));
}

#[test]
fn test_log_observer_does_not_change_result() {
    let mut config = SweepConfig::default();
    config.sweep.granularity = 1;
    let silent = DefaultSelector::from_config(&config).unwrap().select().unwrap();
    let logged = DefaultSelector::from_config(&config)
        .unwrap()
        .with_observer(Arc::new(LogObserver))
        .select()
        .unwrap();
    assert_eq!(silent, logged);
}

#[test]
fn test_uniform_prior_matches_unweighted_counts() {
    let grid = SweepGrid::new((-81.0, -60.0), (-72.0, -49.0), 1).unwrap();
    let result = SweepEvaluator::new(ConfidenceClassifier::default(), grid)
        .with_prior(Arc::new(UniformPrior))
        .evaluate_default(-61.0)
        .unwrap();
    assert_eq!(
        result.agreement().unwrap(),
        result.matches as f64 / result.samples() as f64
    );
}
