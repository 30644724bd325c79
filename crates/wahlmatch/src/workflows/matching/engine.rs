use super::domain::{Answers, Party, PositionDetail, ScoredResult, Stance, Thesis};
use super::weights::WeightSet;
use tracing::debug;

/// Points awarded for a single thesis before weighting.
const FULL_MATCH: u32 = 2;
const PARTIAL_MATCH: u32 = 1;
const NO_MATCH: u32 = 0;

/// Tally bucket a compared thesis falls into, seen from the user's side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Tally {
    Agree,
    Neutral,
    Disagree,
}

/// Compares one answer with one party position, first matching rule wins.
///
/// On opposite non-neutral stances the tally records whether the user sides
/// with the party's orientation: a user who agrees with a thesis the party
/// rejects counts as disagreeing, and vice versa.
pub(crate) fn compare(user: Stance, party: Stance) -> (u32, Tally) {
    if user == party {
        let tally = match user {
            Stance::Agree => Tally::Agree,
            Stance::Disagree => Tally::Disagree,
            Stance::Neutral => Tally::Neutral,
        };
        return (FULL_MATCH, tally);
    }

    if user == Stance::Neutral || party == Stance::Neutral {
        return (PARTIAL_MATCH, Tally::Neutral);
    }

    match (user, party) {
        (Stance::Agree, Stance::Disagree) => (NO_MATCH, Tally::Disagree),
        _ => (NO_MATCH, Tally::Agree),
    }
}

/// Scores every party independently against `answers`.
///
/// Results come back in the order of `parties`; ranking is left to the
/// caller. Unanswered theses contribute nothing. An empty party list yields
/// an empty result list.
pub fn score(
    parties: &[Party],
    theses: &[Thesis],
    answers: &Answers,
    weighted: &WeightSet,
) -> Vec<ScoredResult> {
    debug!(
        parties = parties.len(),
        theses = theses.len(),
        answered = answers.len(),
        weighted = weighted.len(),
        "scoring answers"
    );

    parties
        .iter()
        .map(|party| score_party(party, theses, answers, weighted))
        .collect()
}

fn score_party(
    party: &Party,
    theses: &[Thesis],
    answers: &Answers,
    weighted: &WeightSet,
) -> ScoredResult {
    let mut points = 0;
    let mut max_points = 0;
    let mut agree_count = 0;
    let mut neutral_count = 0;
    let mut disagree_count = 0;
    let mut positions = Vec::new();

    for thesis in theses {
        let Some(&user_stance) = answers.get(&thesis.id) else {
            continue;
        };

        let weight = weighted.weight_for(&thesis.id);
        max_points += FULL_MATCH * weight;

        let party_stance = thesis.stance_for(&party.id);
        let (thesis_points, tally) = compare(user_stance, party_stance);
        match tally {
            Tally::Agree => agree_count += 1,
            Tally::Neutral => neutral_count += 1,
            Tally::Disagree => disagree_count += 1,
        }
        points += thesis_points * weight;

        positions.push(PositionDetail {
            thesis_id: thesis.id.clone(),
            statement: thesis.statement.clone(),
            user_stance,
            party_stance,
            party_justification: thesis.justification_for(&party.id).to_string(),
            weight,
        });
    }

    let percentage = if max_points > 0 {
        f64::from(points) / f64::from(max_points) * 100.0
    } else {
        0.0
    };

    ScoredResult {
        party: party.clone(),
        percentage,
        points,
        max_points,
        agree_count,
        neutral_count,
        disagree_count,
        positions,
    }
}
