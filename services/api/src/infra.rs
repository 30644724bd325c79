use clap::Args;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use wahlmatch::config::{AppConfig, DisplayConfig};
use wahlmatch::error::AppError;
use wahlmatch::workflows::dataset::{DataFormat, Dataset};
use wahlmatch::workflows::matching::{Answers, InvariantViolation, Stance, ThesisId, WeightSet};
use wahlmatch::workflows::share::{BackgroundSource, ShareRenderer};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) dataset: Arc<Dataset>,
    pub(crate) display: Arc<DisplayConfig>,
    pub(crate) backgrounds: Arc<dyn BackgroundSource>,
    pub(crate) renderer: Arc<ShareRenderer>,
}

/// Overrides for where the dataset and display config are read from.
#[derive(Args, Debug, Default, Clone)]
pub(crate) struct DataArgs {
    /// Directory holding parteien/positionen files
    #[arg(long)]
    pub(crate) data_dir: Option<PathBuf>,
    /// Dataset format: csv or json
    #[arg(long, value_parser = parse_format)]
    pub(crate) data_format: Option<DataFormat>,
    /// Display config document (colors, texts, share card)
    #[arg(long)]
    pub(crate) display_config: Option<PathBuf>,
}

impl DataArgs {
    pub(crate) fn apply(self, config: &mut AppConfig) {
        if let Some(dir) = self.data_dir {
            config.data.dir = dir;
        }
        if let Some(format) = self.data_format {
            config.data.format = format;
        }
        if let Some(path) = self.display_config {
            config.display_config_path = path;
        }
    }
}

fn parse_format(raw: &str) -> Result<DataFormat, String> {
    DataFormat::parse(raw).ok_or_else(|| format!("unknown data format '{raw}' (csv or json)"))
}

pub(crate) fn load_dataset(config: &AppConfig) -> Result<Arc<Dataset>, AppError> {
    let dataset = Dataset::load(
        &config.data.dir,
        config.data.format,
        config.data.normalize_options(),
    )?;
    Ok(Arc::new(dataset))
}

/// Wire form of a scoring request: stance codes keyed by thesis id.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct MatchRequest {
    pub(crate) answers: BTreeMap<String, i64>,
    #[serde(default)]
    pub(crate) weighted: Vec<String>,
    #[serde(default = "default_ranked")]
    pub(crate) ranked: bool,
}

fn default_ranked() -> bool {
    true
}

impl MatchRequest {
    pub(crate) fn inputs(&self) -> Result<(Answers, WeightSet), InvariantViolation> {
        let answers = self
            .answers
            .iter()
            .map(|(id, code)| Ok((ThesisId(id.clone()), Stance::try_from(*code)?)))
            .collect::<Result<Answers, InvariantViolation>>()?;
        let weights = self.weighted.iter().cloned().map(ThesisId).collect();
        Ok((answers, weights))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_request_rejects_out_of_domain_codes() {
        let request: MatchRequest =
            serde_json::from_str(r#"{"answers": {"t1": 1, "t2": 3}}"#).expect("parses");
        assert!(request.ranked);
        assert_eq!(
            request.inputs().expect_err("invalid code"),
            InvariantViolation::StanceOutOfRange(3)
        );
    }

    #[test]
    fn match_request_builds_answers_and_weights() {
        let request: MatchRequest = serde_json::from_str(
            r#"{"answers": {"t1": -1, "t2": 0}, "weighted": ["t1"], "ranked": false}"#,
        )
        .expect("parses");
        let (answers, weights) = request.inputs().expect("valid");

        assert_eq!(answers.get(&ThesisId::from("t1")), Some(&Stance::Disagree));
        assert_eq!(answers.get(&ThesisId::from("t2")), Some(&Stance::Neutral));
        assert_eq!(weights.weight_for(&ThesisId::from("t1")), 2);
        assert!(!request.ranked);
    }
}
