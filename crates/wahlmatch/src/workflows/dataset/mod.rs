//! Normalization of raw party and thesis records into the typed model.
//!
//! Both delimited text and JSON documents are reduced to [`RawRecord`]s first,
//! so the two sources go through the same normalization rules.

mod fields;
mod normalizer;
mod parser;

pub use parser::RawRecord;

use crate::workflows::matching::{Party, PartyId, Thesis, ThesisId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::info;

pub const PARTIES_STEM: &str = "parteien";
pub const THESES_STEM: &str = "positionen";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Party,
    Thesis,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Party => f.write_str("party"),
            RecordKind::Thesis => f.write_str("thesis"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("{kind} record {row} has no id")]
    MalformedRecord { kind: RecordKind, row: usize },
    #[error("{kind} record {row} repeats id '{id}'")]
    DuplicateId {
        kind: RecordKind,
        row: usize,
        id: String,
    },
    #[error("thesis '{thesis}' has stance '{raw}' for party '{party}' outside {{-1, 0, 1}}")]
    InvalidStance {
        thesis: String,
        party: String,
        raw: String,
    },
    #[error("thesis '{thesis}' references unknown party '{party}'")]
    UnknownParty { thesis: ThesisId, party: PartyId },
    #[error("malformed document: {reason}")]
    MalformedDocument { reason: String },
    #[error("invalid delimited data: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid JSON document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("data unavailable at {}: {source}", .path.display())]
    DataUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DatasetError {
    /// Errors confined to a single record, which the skip policy may drop.
    pub fn is_record_level(&self) -> bool {
        matches!(
            self,
            DatasetError::MalformedRecord { .. }
                | DatasetError::DuplicateId { .. }
                | DatasetError::InvalidStance { .. }
        )
    }
}

/// What to do with a record that fails normalization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BatchPolicy {
    #[default]
    AbortAll,
    SkipInvalid,
}

impl BatchPolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "abort" | "abort-all" | "abort_all" => Some(Self::AbortAll),
            "skip" | "skip-invalid" | "skip_invalid" => Some(Self::SkipInvalid),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    Csv,
    Json,
}

impl DataFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            DataFormat::Csv => "csv",
            DataFormat::Json => "json",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizeOptions {
    pub delimiter: u8,
    pub policy: BatchPolicy,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            delimiter: b';',
            policy: BatchPolicy::AbortAll,
        }
    }
}

/// Normalized parties and theses, in file order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "DatasetParts")]
pub struct Dataset {
    parties: Vec<Party>,
    theses: Vec<Thesis>,
}

/// Unchecked wire form; deserialization goes through [`Dataset::new`].
#[derive(Deserialize)]
struct DatasetParts {
    parties: Vec<Party>,
    theses: Vec<Thesis>,
}

impl TryFrom<DatasetParts> for Dataset {
    type Error = DatasetError;

    fn try_from(parts: DatasetParts) -> Result<Self, Self::Error> {
        Dataset::new(parts.parties, parts.theses)
    }
}

impl Dataset {
    /// Builds a dataset, rejecting theses that name parties not in `parties`.
    pub fn new(parties: Vec<Party>, theses: Vec<Thesis>) -> Result<Self, DatasetError> {
        for thesis in &theses {
            if let Some(unknown) = thesis
                .positions
                .keys()
                .find(|id| !parties.iter().any(|party| &party.id == *id))
            {
                return Err(DatasetError::UnknownParty {
                    thesis: thesis.id.clone(),
                    party: unknown.clone(),
                });
            }
        }

        Ok(Self { parties, theses })
    }

    pub fn from_records(
        party_records: &[RawRecord],
        thesis_records: &[RawRecord],
        policy: BatchPolicy,
    ) -> Result<Self, DatasetError> {
        let parties = normalizer::normalize_parties(party_records, policy)?;
        let theses = normalizer::normalize_theses(thesis_records, &parties, policy)?;
        Self::new(parties, theses)
    }

    pub fn from_delimited<P: Read, T: Read>(
        parties: P,
        theses: T,
        options: NormalizeOptions,
    ) -> Result<Self, DatasetError> {
        let party_records = parser::read_delimited(parties, options.delimiter)?;
        let thesis_records = parser::read_delimited(theses, options.delimiter)?;
        Self::from_records(&party_records, &thesis_records, options.policy)
    }

    pub fn from_documents<P: Read, T: Read>(
        parties: P,
        theses: T,
        options: NormalizeOptions,
    ) -> Result<Self, DatasetError> {
        let party_records = parser::read_document(parties)?;
        let thesis_records = parser::read_document(theses)?;
        Self::from_records(&party_records, &thesis_records, options.policy)
    }

    /// Loads `parteien.<ext>` and `positionen.<ext>` from `dir`.
    pub fn load<D: AsRef<Path>>(
        dir: D,
        format: DataFormat,
        options: NormalizeOptions,
    ) -> Result<Self, DatasetError> {
        let dir = dir.as_ref();
        let parties = open(&dir.join(format!("{PARTIES_STEM}.{}", format.extension())))?;
        let theses = open(&dir.join(format!("{THESES_STEM}.{}", format.extension())))?;

        let dataset = match format {
            DataFormat::Csv => Self::from_delimited(parties, theses, options)?,
            DataFormat::Json => Self::from_documents(parties, theses, options)?,
        };

        info!(
            dir = %dir.display(),
            parties = dataset.parties.len(),
            theses = dataset.theses.len(),
            "dataset loaded"
        );
        Ok(dataset)
    }

    pub fn parties(&self) -> &[Party] {
        &self.parties
    }

    pub fn theses(&self) -> &[Thesis] {
        &self.theses
    }

    pub fn party(&self, id: &PartyId) -> Option<&Party> {
        self.parties.iter().find(|party| &party.id == id)
    }

    pub fn thesis(&self, id: &ThesisId) -> Option<&Thesis> {
        self.theses.iter().find(|thesis| &thesis.id == id)
    }
}

fn open(path: &Path) -> Result<File, DatasetError> {
    File::open(path).map_err(|source| DatasetError::DataUnavailable {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::matching::{PartyPosition, Stance};
    use std::collections::BTreeMap;
    use std::io::Cursor;

    #[test]
    fn new_rejects_positions_for_unknown_parties() {
        let thesis = Thesis {
            id: ThesisId::from("t1"),
            statement: String::new(),
            explanation: String::new(),
            positions: BTreeMap::from([(
                PartyId::from("ghost"),
                PartyPosition {
                    stance: Stance::Agree,
                    justification: String::new(),
                },
            )]),
        };

        let error = Dataset::new(Vec::new(), vec![thesis]).expect_err("unknown party");
        assert!(matches!(error, DatasetError::UnknownParty { .. }));
    }

    #[test]
    fn deserialized_dataset_keeps_party_references_checked() {
        let json = r#"{
            "parties": [{"id": "a", "name": "Alpha", "short_name": "A", "color": ""}],
            "theses": [{"id": "t1", "statement": "S", "positions": {"ghost": {"stance": 1}}}]
        }"#;

        let error = serde_json::from_str::<Dataset>(json).expect_err("unknown party");
        assert!(error.to_string().contains("unknown party 'ghost'"));

        let valid = json.replace("ghost", "a");
        let dataset: Dataset = serde_json::from_str(&valid).expect("known party");
        assert_eq!(dataset.theses()[0].stance_for(&PartyId::from("a")), Stance::Agree);
    }

    #[test]
    fn load_reports_missing_files_as_unavailable() {
        let error = Dataset::load(
            "./does-not-exist",
            DataFormat::Csv,
            NormalizeOptions::default(),
        )
        .expect_err("missing dir");

        match error {
            DatasetError::DataUnavailable { path, .. } => {
                assert!(path.ends_with("parteien.csv"));
            }
            other => panic!("expected unavailable data, got {other:?}"),
        }
    }

    #[test]
    fn document_errors_are_not_record_level() {
        let error = DatasetError::MalformedDocument {
            reason: "broken".to_string(),
        };
        assert!(!error.is_record_level());
    }

    #[test]
    fn normalized_dataset_survives_json_round_trip() {
        let dataset = Dataset::from_delimited(
            Cursor::new("id;name\na;Alpha\n"),
            Cursor::new("id;these;partei_a\nt1;Statement;-1\n"),
            NormalizeOptions::default(),
        )
        .expect("dataset");

        let encoded = serde_json::to_string(&dataset).expect("encode");
        let decoded: Dataset = serde_json::from_str(&encoded).expect("decode");
        assert_eq!(decoded, dataset);
        assert_eq!(
            decoded.theses()[0].stance_for(&PartyId::from("a")),
            Stance::Disagree
        );
    }

    #[test]
    fn batch_policy_and_format_parse_from_config_values() {
        assert_eq!(BatchPolicy::parse("Skip"), Some(BatchPolicy::SkipInvalid));
        assert_eq!(BatchPolicy::parse("abort"), Some(BatchPolicy::AbortAll));
        assert_eq!(BatchPolicy::parse("other"), None);
        assert_eq!(DataFormat::parse("JSON"), Some(DataFormat::Json));
        assert_eq!(DataFormat::parse("xml"), None);
    }
}
