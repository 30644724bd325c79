use super::domain::ThesisId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Theses the user marked as counting double.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeightSet(BTreeSet<ThesisId>);

impl WeightSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &ThesisId) -> bool {
        self.0.contains(id)
    }

    pub fn weight_for(&self, id: &ThesisId) -> u32 {
        if self.contains(id) {
            2
        } else {
            1
        }
    }

    /// Symmetric difference with `{id}`; `self` is left untouched.
    pub fn toggled(&self, id: &ThesisId) -> Self {
        let mut next = self.clone();
        next.toggle(id);
        next
    }

    pub fn toggle(&mut self, id: &ThesisId) {
        if !self.0.remove(id) {
            self.0.insert(id.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ThesisId> {
        self.0.iter()
    }
}

impl FromIterator<ThesisId> for WeightSet {
    fn from_iter<I: IntoIterator<Item = ThesisId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Free-function form of [`WeightSet::toggled`].
pub fn toggle_weight(set: &WeightSet, id: &ThesisId) -> WeightSet {
    set.toggled(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggling_twice_restores_membership() {
        let original: WeightSet = [ThesisId::from("t1"), ThesisId::from("t3")]
            .into_iter()
            .collect();
        let id = ThesisId::from("t2");

        let once = toggle_weight(&original, &id);
        assert!(once.contains(&id));
        assert_eq!(once.weight_for(&id), 2);

        let twice = toggle_weight(&once, &id);
        assert_eq!(twice, original);
        assert_eq!(twice.weight_for(&id), 1);
    }

    #[test]
    fn toggled_leaves_source_untouched() {
        let original = WeightSet::new();
        let updated = original.toggled(&ThesisId::from("unknown"));
        assert!(original.is_empty());
        assert_eq!(updated.len(), 1);
    }
}
