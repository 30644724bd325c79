use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Stable identifier of a party within a loaded dataset.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartyId(pub String);

/// Stable identifier of a thesis within a loaded dataset.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThesisId(pub String);

impl PartyId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ThesisId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PartyId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<&str> for ThesisId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for PartyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for ThesisId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Position on a thesis, shared by party positions and user answers.
///
/// The numeric encoding (`+1`, `0`, `-1`) only exists on the wire; scoring
/// compares variants directly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i8")]
pub enum Stance {
    Agree,
    #[default]
    Neutral,
    Disagree,
}

impl Stance {
    pub fn code(self) -> i8 {
        match self {
            Stance::Agree => 1,
            Stance::Neutral => 0,
            Stance::Disagree => -1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Stance::Agree => "agree",
            Stance::Neutral => "neutral",
            Stance::Disagree => "disagree",
        }
    }
}

impl TryFrom<i64> for Stance {
    type Error = InvariantViolation;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Stance::Agree),
            0 => Ok(Stance::Neutral),
            -1 => Ok(Stance::Disagree),
            other => Err(InvariantViolation::StanceOutOfRange(other)),
        }
    }
}

impl From<Stance> for i8 {
    fn from(value: Stance) -> Self {
        value.code()
    }
}

/// Raised when a value crossing the serialization boundary falls outside the
/// domain the engine accepts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    #[error("stance code {0} is outside {{-1, 0, 1}}")]
    StanceOutOfRange(i64),
}

/// Party metadata as loaded from the dataset. Absent text fields are empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    pub id: PartyId,
    pub name: String,
    pub short_name: String,
    pub color: String,
    #[serde(default)]
    pub logo: String,
    #[serde(default)]
    pub description: String,
}

/// A party's recorded stance on one thesis together with its justification.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PartyPosition {
    pub stance: Stance,
    #[serde(default)]
    pub justification: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thesis {
    pub id: ThesisId,
    pub statement: String,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub positions: BTreeMap<PartyId, PartyPosition>,
}

impl Thesis {
    /// Stance of `party`, `Neutral` when the thesis carries no entry for it.
    pub fn stance_for(&self, party: &PartyId) -> Stance {
        self.positions
            .get(party)
            .map(|position| position.stance)
            .unwrap_or_default()
    }

    pub fn justification_for(&self, party: &PartyId) -> &str {
        self.positions
            .get(party)
            .map(|position| position.justification.as_str())
            .unwrap_or("")
    }
}

/// User answers keyed by thesis. A thesis without an entry is unanswered.
pub type Answers = BTreeMap<ThesisId, Stance>;

/// Per-thesis breakdown attached to a scored result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionDetail {
    pub thesis_id: ThesisId,
    pub statement: String,
    pub user_stance: Stance,
    pub party_stance: Stance,
    pub party_justification: String,
    pub weight: u32,
}

/// Outcome of scoring one party against the user's answers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredResult {
    pub party: Party,
    pub percentage: f64,
    pub points: u32,
    pub max_points: u32,
    pub agree_count: u32,
    pub neutral_count: u32,
    pub disagree_count: u32,
    pub positions: Vec<PositionDetail>,
}

impl ScoredResult {
    pub fn answered(&self) -> u32 {
        self.agree_count + self.neutral_count + self.disagree_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stance_codes_round_trip_through_serde() {
        let encoded = serde_json::to_string(&vec![Stance::Agree, Stance::Neutral, Stance::Disagree])
            .expect("serialize stances");
        assert_eq!(encoded, "[1,0,-1]");

        let decoded: Vec<Stance> = serde_json::from_str("[-1,1,0]").expect("decode stances");
        assert_eq!(decoded, vec![Stance::Disagree, Stance::Agree, Stance::Neutral]);
    }

    #[test]
    fn out_of_range_stance_is_rejected() {
        assert_eq!(
            Stance::try_from(2),
            Err(InvariantViolation::StanceOutOfRange(2))
        );
        assert!(serde_json::from_str::<Stance>("-2").is_err());
    }

    #[test]
    fn missing_position_reads_as_neutral() {
        let thesis = Thesis {
            id: ThesisId::from("t1"),
            statement: "More bike lanes".to_string(),
            explanation: String::new(),
            positions: BTreeMap::new(),
        };

        let party = PartyId::from("green");
        assert_eq!(thesis.stance_for(&party), Stance::Neutral);
        assert_eq!(thesis.justification_for(&party), "");
    }
}
