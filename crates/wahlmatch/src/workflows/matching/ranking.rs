use super::domain::ScoredResult;

/// Orders results by percentage, highest first. Ties keep their input order.
pub fn rank(mut results: Vec<ScoredResult>) -> Vec<ScoredResult> {
    results.sort_by(|left, right| right.percentage.total_cmp(&left.percentage));
    results
}

/// Highest-scoring result; the earliest one wins a tie.
pub fn top_result(results: &[ScoredResult]) -> Option<&ScoredResult> {
    results.iter().fold(None, |best, candidate| match best {
        Some(current) if current.percentage >= candidate.percentage => Some(current),
        _ => Some(candidate),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::matching::domain::{Party, PartyId};

    fn result(id: &str, percentage: f64) -> ScoredResult {
        ScoredResult {
            party: Party {
                id: PartyId::from(id),
                name: id.to_string(),
                short_name: id.to_string(),
                color: String::new(),
                logo: String::new(),
                description: String::new(),
            },
            percentage,
            points: 0,
            max_points: 0,
            agree_count: 0,
            neutral_count: 0,
            disagree_count: 0,
            positions: Vec::new(),
        }
    }

    fn ids(results: &[ScoredResult]) -> Vec<&str> {
        results.iter().map(|r| r.party.id.as_str()).collect()
    }

    #[test]
    fn rank_sorts_descending_and_keeps_ties_stable() {
        let ranked = rank(vec![
            result("a", 50.0),
            result("b", 75.0),
            result("c", 50.0),
            result("d", 100.0),
        ]);
        assert_eq!(ids(&ranked), vec!["d", "b", "a", "c"]);
    }

    #[test]
    fn top_result_prefers_first_on_tie() {
        let results = vec![result("a", 20.0), result("b", 80.0), result("c", 80.0)];
        let top = top_result(&results).expect("top result");
        assert_eq!(top.party.id.as_str(), "b");
        assert!(top_result(&[]).is_none());
    }
}
