use std::collections::BTreeSet;

use log::warn;

use super::EntityKind;

/// Warn-once bookkeeping for conditions the stepper absorbs instead of
/// failing. Owned by the caller, so its lifetime is theirs to choose.
#[derive(Debug, Default)]
pub struct Diagnostics {
    unhandled: BTreeSet<(EntityKind, EntityKind)>,
    budget_overruns: usize,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a kind pair that may interact but has no response rule.
    /// Returns `true` the first time the pair is seen.
    pub fn unhandled_pair(&mut self, a: EntityKind, b: EntityKind) -> bool {
        let key = if a <= b { (a, b) } else { (b, a) };
        let first = self.unhandled.insert(key);
        if first {
            warn!("No collision rule for \"{}-{}\", ignoring", key.0, key.1);
        }
        first
    }

    pub fn budget_exceeded(&mut self, t0: f64, t1: f64, max_substeps: usize) {
        self.budget_overruns += 1;
        warn!(
            "Frame {t0}..{t1} needed more than {max_substeps} collision sub-steps, committing remainder unchecked"
        );
    }

    pub fn unhandled_pairs(&self) -> impl Iterator<Item = &(EntityKind, EntityKind)> {
        self.unhandled.iter()
    }

    pub fn budget_overruns(&self) -> usize {
        self.budget_overruns
    }
}

#[cfg(test)]
mod diagnostics_tests {
    use super::*;

    #[test]
    fn warns_once_per_unordered_pair() {
        let mut diagnostics = Diagnostics::new();
        assert!(diagnostics.unhandled_pair(EntityKind::Craft, EntityKind::Vapour));
        assert!(!diagnostics.unhandled_pair(EntityKind::Vapour, EntityKind::Craft));
        assert!(diagnostics.unhandled_pair(EntityKind::Craft, EntityKind::Debris));
        assert_eq!(diagnostics.unhandled_pairs().count(), 2);
    }

    #[test]
    fn counts_overruns() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.budget_exceeded(0., 1., 4);
        diagnostics.budget_exceeded(1., 2., 4);
        assert_eq!(diagnostics.budget_overruns(), 2);
    }
}
