use super::fields;
use super::parser::RawRecord;
use super::{BatchPolicy, DatasetError, RecordKind};
use crate::workflows::matching::{Party, PartyId, PartyPosition, Stance, Thesis, ThesisId};
use std::collections::{BTreeMap, HashSet};
use tracing::warn;

pub(crate) fn normalize_parties(
    records: &[RawRecord],
    policy: BatchPolicy,
) -> Result<Vec<Party>, DatasetError> {
    let mut parties = Vec::with_capacity(records.len());
    let mut seen = HashSet::new();

    for (index, record) in records.iter().enumerate() {
        let outcome = party_from_record(index + 1, record).and_then(|party| {
            unique(RecordKind::Party, index + 1, party.id.as_str(), &mut seen).map(|_| party)
        });
        admit(policy, outcome, &mut parties)?;
    }

    Ok(parties)
}

pub(crate) fn normalize_theses(
    records: &[RawRecord],
    parties: &[Party],
    policy: BatchPolicy,
) -> Result<Vec<Thesis>, DatasetError> {
    let mut theses = Vec::with_capacity(records.len());
    let mut seen = HashSet::new();

    for (index, record) in records.iter().enumerate() {
        let outcome = thesis_from_record(index + 1, record, parties).and_then(|thesis| {
            unique(RecordKind::Thesis, index + 1, thesis.id.as_str(), &mut seen).map(|_| thesis)
        });
        admit(policy, outcome, &mut theses)?;
    }

    Ok(theses)
}

fn party_from_record(row: usize, record: &RawRecord) -> Result<Party, DatasetError> {
    let id = record_id(RecordKind::Party, row, record)?;

    Ok(Party {
        id: PartyId(id),
        name: record.first_of(fields::PARTY_NAME).to_string(),
        short_name: record.first_of(fields::PARTY_SHORT_NAME).to_string(),
        color: record.first_of(fields::PARTY_COLOR).to_string(),
        logo: record.first_of(fields::PARTY_LOGO).to_string(),
        description: record.first_of(fields::PARTY_DESCRIPTION).to_string(),
    })
}

fn thesis_from_record(
    row: usize,
    record: &RawRecord,
    parties: &[Party],
) -> Result<Thesis, DatasetError> {
    let id = record_id(RecordKind::Thesis, row, record)?;
    let mut positions = BTreeMap::new();

    for party in parties {
        let raw_stance = record.first_of(&fields::stance_columns(party.id.as_str()));
        let stance = parse_stance(raw_stance).ok_or_else(|| DatasetError::InvalidStance {
            thesis: id.clone(),
            party: party.id.to_string(),
            raw: raw_stance.to_string(),
        })?;
        let justification = record
            .first_of(&fields::justification_columns(party.id.as_str()))
            .to_string();

        positions.insert(
            party.id.clone(),
            PartyPosition {
                stance,
                justification,
            },
        );
    }

    Ok(Thesis {
        id: ThesisId(id),
        statement: record.first_of(fields::THESIS_STATEMENT).to_string(),
        explanation: record.first_of(fields::THESIS_EXPLANATION).to_string(),
        positions,
    })
}

fn record_id(kind: RecordKind, row: usize, record: &RawRecord) -> Result<String, DatasetError> {
    match record.get(fields::ID).map(str::trim) {
        Some(id) if !id.is_empty() => Ok(id.to_string()),
        _ => Err(DatasetError::MalformedRecord { kind, row }),
    }
}

fn unique(
    kind: RecordKind,
    row: usize,
    id: &str,
    seen: &mut HashSet<String>,
) -> Result<(), DatasetError> {
    if seen.insert(id.to_string()) {
        Ok(())
    } else {
        Err(DatasetError::DuplicateId {
            kind,
            row,
            id: id.to_string(),
        })
    }
}

fn admit<T>(
    policy: BatchPolicy,
    outcome: Result<T, DatasetError>,
    accepted: &mut Vec<T>,
) -> Result<(), DatasetError> {
    match outcome {
        Ok(item) => {
            accepted.push(item);
            Ok(())
        }
        Err(err) if policy == BatchPolicy::SkipInvalid && err.is_record_level() => {
            warn!(error = %err, "skipping invalid record");
            Ok(())
        }
        Err(err) => Err(err),
    }
}

/// Integer-prefix parse: optional sign then leading digits, anything else is
/// `Neutral`. Returns `None` for numbers outside the stance domain.
pub(crate) fn parse_stance(raw: &str) -> Option<Stance> {
    let trimmed = raw.trim();
    let (negative, unsigned) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits_len = unsigned
        .bytes()
        .take_while(|byte| byte.is_ascii_digit())
        .count();
    if digits_len == 0 {
        return Some(Stance::Neutral);
    }

    let magnitude = unsigned[..digits_len].parse::<i64>().ok()?;
    let value = if negative { -magnitude } else { magnitude };
    Stance::try_from(value).ok()
}
