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

//! Sweeps candidate default TxPowers to find the least bad one for advertisers that do not
//! publish their calibration, or prints the confidence table behind it.
//!
//! Usage: `txpower_sweep [sweep|table] [config.json]`. Set `RUST_LOG=trace` to see every
//! classification.

mod report;

use std::env;
use std::fs;
use std::sync::Arc;

use anyhow::{bail, Context};
use log::info;
use proximity_confidence::{
    ConfidenceClassifier, DefaultSelector, LogObserver, SweepConfig, SweepGrid,
};

fn load_config(path: &str) -> Result<SweepConfig, anyhow::Error> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("couldn't read config {path}"))?;
    let config = SweepConfig::from_json_str(&contents)?;
    info!("Loaded sweep config from {}", path);
    Ok(config)
}

fn run_sweep(config: &SweepConfig) -> Result<(), anyhow::Error> {
    let selector = DefaultSelector::from_config(config)?.with_observer(Arc::new(LogObserver));
    let result = selector.select()?;
    for line in report::selection_lines(&result) {
        println!("{line}");
    }
    let configured_default = config.sweep.default_tx_power;
    let configured_agreement = selector
        .evaluator()
        .evaluate_default(configured_default)?
        .agreement()?;
    println!(
        "{}",
        report::configured_default_line(configured_default, configured_agreement)
    );
    Ok(())
}

fn run_table(config: &SweepConfig) -> Result<(), anyhow::Error> {
    let sweep = &config.sweep;
    let grid = SweepGrid::new(
        sweep.signal_range(),
        sweep.calibration_range(),
        sweep.granularity,
    )?;
    let classifier =
        ConfidenceClassifier::new(config.classifier)?.with_observer(Arc::new(LogObserver));
    for assessment in classifier.confidence_table(&grid)? {
        for line in report::assessment_lines(&assessment, config.classifier) {
            println!("{line}");
        }
        println!();
    }
    Ok(())
}

fn main() -> Result<(), anyhow::Error> {
    env_logger::init();

    let mut args = env::args().skip(1);
    let mode = args.next().unwrap_or_else(|| String::from("sweep"));
    let config = match args.next() {
        Some(path) => load_config(&path)?,
        None => SweepConfig::default(),
    };
    match mode.as_str() {
        "sweep" => run_sweep(&config),
        "table" => run_table(&config),
        other => bail!("unknown mode `{other}`, expected `sweep` or `table`"),
    }
}
