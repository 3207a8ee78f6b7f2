//! Pareto frontiers of packed criteria.
//!
//! A [`ParetoFront`] is the frozen, read-only set of optimal criteria for one
//! station. It is produced by a [`ParetoFrontBuilder`], which keeps its
//! buffer sorted by payload-free key and prunes dominated criteria on every
//! insertion.

use std::fmt;
use std::slice::Iter as SliceIter;

use super::criteria::{Criteria, CriteriaError};

/// An immutable Pareto frontier.
///
/// Members are sorted by ascending payload-free key and no member dominates
/// another.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct ParetoFront {
    criteria: Box<[Criteria]>,
}

impl ParetoFront {
    /// The empty frontier.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of criteria.
    pub fn len(&self) -> usize {
        self.criteria.len()
    }

    /// Returns true if the frontier holds no criteria.
    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    /// Returns the member with exactly this arrival and change count.
    ///
    /// The departure and payload of the member are returned as stored.
    pub fn get(&self, arr_mins: i32, changes: u32) -> Option<Criteria> {
        self.criteria
            .iter()
            .copied()
            .find(|c| c.arr_mins() == arr_mins && c.changes() == changes)
    }

    /// Iterates over members in ascending order.
    pub fn iter(&self) -> SliceIter<'_, Criteria> {
        self.criteria.iter()
    }

    /// Members as a slice.
    pub fn as_slice(&self) -> &[Criteria] {
        &self.criteria
    }
}

impl<'a> IntoIterator for &'a ParetoFront {
    type Item = &'a Criteria;
    type IntoIter = SliceIter<'a, Criteria>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Debug for ParetoFront {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.criteria.iter()).finish()
    }
}

impl fmt::Display for ParetoFront {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, c) in self.criteria.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{c}")?;
        }
        write!(f, "]")
    }
}

/// Mutable builder for a [`ParetoFront`].
///
/// The buffer only grows through [`add`](Self::add) and shrinks through the
/// compaction `add` performs, so the non-domination invariant cannot be
/// broken from outside.
///
/// # Examples
///
/// ```
/// use transit_server::profile::{Criteria, ParetoFrontBuilder};
///
/// let mut builder = ParetoFrontBuilder::new();
/// builder.add(Criteria::pack(600, 2, 0).unwrap()).unwrap();
/// builder.add(Criteria::pack(600, 1, 0).unwrap()).unwrap();
/// builder.add(Criteria::pack(650, 0, 0).unwrap()).unwrap();
///
/// let front = builder.build();
/// assert_eq!(front.len(), 2);
/// assert!(front.get(600, 2).is_none());
/// assert!(front.get(600, 1).is_some());
/// ```
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ParetoFrontBuilder {
    buf: Vec<Criteria>,
}

impl ParetoFrontBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder holding the members of a frozen frontier.
    pub fn from_front(front: &ParetoFront) -> Self {
        Self {
            buf: front.criteria.to_vec(),
        }
    }

    /// Number of criteria currently held.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns true if the builder holds no criteria.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Removes every criterion, keeping the allocation.
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Iterates over the current criteria in ascending order.
    pub fn iter(&self) -> SliceIter<'_, Criteria> {
        self.buf.iter()
    }

    /// Inserts `candidate` unless an existing criterion dominates or equals it,
    /// removing every criterion it dominates.
    ///
    /// # Errors
    ///
    /// Returns [`CriteriaError::MixedDepartures`] if the candidate's departure
    /// presence differs from the criteria already held.
    pub fn add(&mut self, candidate: Criteria) -> Result<(), CriteriaError> {
        let Some(first) = self.buf.first() else {
            self.buf.push(candidate);
            return Ok(());
        };
        if first.has_dep_mins() != candidate.has_dep_mins() {
            return Err(CriteriaError::MixedDepartures);
        }

        let key = candidate.key();
        let pos = self.buf.partition_point(|c| c.key() <= key);

        // Dominance implies a smaller or equal key, so only the prefix can
        // dominate the candidate and only the suffix can be dominated by it.
        if self.buf[..pos]
            .iter()
            .any(|c| c.dominates_unchecked(&candidate))
        {
            return Ok(());
        }

        let mut dst = pos;
        for src in pos..self.buf.len() {
            let c = self.buf[src];
            if !candidate.dominates_unchecked(&c) {
                self.buf[dst] = c;
                dst += 1;
            }
        }
        self.buf.truncate(dst);
        self.buf.insert(pos, candidate);
        Ok(())
    }

    /// Packs and inserts a criterion without departure.
    pub fn add_packed(
        &mut self,
        arr_mins: i32,
        changes: u32,
        payload: u32,
    ) -> Result<(), CriteriaError> {
        self.add(Criteria::pack(arr_mins, changes, payload)?)
    }

    /// Inserts every criterion of `other`.
    pub fn add_all(&mut self, other: &ParetoFrontBuilder) -> Result<(), CriteriaError> {
        for &c in &other.buf {
            self.add(c)?;
        }
        Ok(())
    }

    /// Returns true if every criterion of `other`, once given departure
    /// `dep_mins`, is dominated or equalled by a criterion of `self`.
    ///
    /// Criteria of `self` must carry departures; any departure already
    /// attached to `other`'s criteria is replaced.
    pub fn fully_dominates(
        &self,
        other: &ParetoFrontBuilder,
        dep_mins: i32,
    ) -> Result<bool, CriteriaError> {
        for c in &other.buf {
            let timed = c.with_dep_mins(dep_mins)?;
            let mut dominated = false;
            for mine in &self.buf {
                if mine.dominates_or_is_equal(&timed)? {
                    dominated = true;
                    break;
                }
            }
            if !dominated {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Freezes the current content.
    pub fn build(&self) -> ParetoFront {
        ParetoFront {
            criteria: self.buf.clone().into_boxed_slice(),
        }
    }

    /// Freezes the content, consuming the builder.
    pub fn into_front(self) -> ParetoFront {
        ParetoFront {
            criteria: self.buf.into_boxed_slice(),
        }
    }
}

impl fmt::Debug for ParetoFrontBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.buf.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(arr: i32, changes: u32) -> Criteria {
        Criteria::pack(arr, changes, 0).unwrap()
    }

    fn cd(dep: i32, arr: i32, changes: u32) -> Criteria {
        c(arr, changes).with_dep_mins(dep).unwrap()
    }

    fn pairs(front: &ParetoFront) -> Vec<(i32, u32)> {
        front.iter().map(|c| (c.arr_mins(), c.changes())).collect()
    }

    #[test]
    fn staircase_keeps_everything() {
        let mut b = ParetoFrontBuilder::new();
        for (arr, ch) in [(500, 4), (600, 3), (700, 2), (800, 1), (900, 0)] {
            b.add(c(arr, ch)).unwrap();
        }
        let front = b.build();
        assert_eq!(front.len(), 5);
        assert_eq!(
            pairs(&front),
            vec![(500, 4), (600, 3), (700, 2), (800, 1), (900, 0)]
        );
    }

    #[test]
    fn staircase_in_reverse_order() {
        let mut b = ParetoFrontBuilder::new();
        for (arr, ch) in [(900, 0), (800, 1), (700, 2), (600, 3), (500, 4)] {
            b.add(c(arr, ch)).unwrap();
        }
        assert_eq!(b.len(), 5);
    }

    #[test]
    fn more_changes_same_arrival_is_dropped() {
        let mut b = ParetoFrontBuilder::new();
        b.add(c(600, 2)).unwrap();
        b.add(c(600, 3)).unwrap();
        assert_eq!(pairs(&b.build()), vec![(600, 2)]);
    }

    #[test]
    fn fewer_changes_same_arrival_replaces() {
        let mut b = ParetoFrontBuilder::new();
        b.add(c(600, 2)).unwrap();
        b.add(c(600, 1)).unwrap();
        assert_eq!(pairs(&b.build()), vec![(600, 1)]);
    }

    #[test]
    fn new_criterion_can_remove_several() {
        let mut b = ParetoFrontBuilder::new();
        b.add(c(600, 3)).unwrap();
        b.add(c(650, 2)).unwrap();
        b.add(c(700, 1)).unwrap();
        b.add(c(550, 5)).unwrap();
        b.add(c(580, 1)).unwrap();
        assert_eq!(pairs(&b.build()), vec![(550, 5), (580, 1)]);
    }

    #[test]
    fn adding_twice_is_idempotent() {
        let mut b = ParetoFrontBuilder::new();
        b.add(cd(480, 600, 1)).unwrap();
        b.add(cd(480, 600, 1).with_payload(99)).unwrap();
        assert_eq!(b.len(), 1);
        assert_eq!(b.iter().next().unwrap().payload(), 0);
    }

    #[test]
    fn later_departure_dominates() {
        let mut b = ParetoFrontBuilder::new();
        b.add(cd(480, 600, 1)).unwrap();
        b.add(cd(490, 600, 1)).unwrap();
        let front = b.build();
        assert_eq!(front.len(), 1);
        assert_eq!(front.iter().next().unwrap().dep_mins(), Some(490));
    }

    #[test]
    fn mixed_departures_rejected() {
        let mut b = ParetoFrontBuilder::new();
        b.add(cd(480, 600, 1)).unwrap();
        assert_eq!(b.add(c(600, 0)), Err(CriteriaError::MixedDepartures));
        assert_eq!(b.len(), 1);
    }

    #[test]
    fn add_packed_and_add_all() {
        let mut a = ParetoFrontBuilder::new();
        a.add_packed(600, 1, 0).unwrap();
        let mut b = ParetoFrontBuilder::new();
        b.add_packed(590, 2, 0).unwrap();
        b.add_packed(610, 1, 0).unwrap();

        a.add_all(&b).unwrap();
        assert_eq!(pairs(&a.build()), vec![(590, 2), (600, 1)]);
    }

    #[test]
    fn clear_empties() {
        let mut b = ParetoFrontBuilder::new();
        b.add(c(600, 1)).unwrap();
        assert!(!b.is_empty());
        b.clear();
        assert!(b.is_empty());
        // Departure presence is free again after clearing
        b.add(cd(500, 600, 1)).unwrap();
        assert_eq!(b.len(), 1);
    }

    #[test]
    fn fully_dominates_example() {
        let mut mine = ParetoFrontBuilder::new();
        mine.add(cd(500, 600, 1)).unwrap();
        mine.add(cd(500, 650, 0)).unwrap();

        let mut other = ParetoFrontBuilder::new();
        other.add(c(620, 3)).unwrap();
        other.add(c(630, 2)).unwrap();

        assert!(mine.fully_dominates(&other, 500).unwrap());
        // Departing later than anything we know is not dominated
        assert!(!mine.fully_dominates(&other, 501).unwrap());
    }

    #[test]
    fn fully_dominates_counterexample() {
        let mut mine = ParetoFrontBuilder::new();
        mine.add(cd(500, 600, 1)).unwrap();

        let mut other = ParetoFrontBuilder::new();
        other.add(c(620, 3)).unwrap();
        other.add(c(590, 2)).unwrap();

        assert!(!mine.fully_dominates(&other, 500).unwrap());
    }

    #[test]
    fn empty_builder_dominates_only_empty() {
        let empty = ParetoFrontBuilder::new();
        let mut other = ParetoFrontBuilder::new();
        assert!(empty.fully_dominates(&other, 500).unwrap());
        other.add(c(600, 0)).unwrap();
        assert!(!empty.fully_dominates(&other, 500).unwrap());
    }

    #[test]
    fn get_finds_exact_pair() {
        let mut b = ParetoFrontBuilder::new();
        b.add(cd(480, 540, 0).with_payload(7)).unwrap();
        b.add(cd(500, 530, 1).with_payload(8)).unwrap();
        let front = b.build();

        assert_eq!(front.get(540, 0).unwrap().payload(), 7);
        assert_eq!(front.get(530, 1).unwrap().dep_mins(), Some(500));
        assert!(front.get(540, 1).is_none());
    }

    #[test]
    fn from_front_roundtrip() {
        let mut b = ParetoFrontBuilder::new();
        b.add(c(600, 1)).unwrap();
        b.add(c(580, 2)).unwrap();
        let front = b.build();

        let mut copy = ParetoFrontBuilder::from_front(&front);
        assert_eq!(copy, b);
        copy.add(c(570, 0)).unwrap();
        assert_eq!(copy.len(), 1);
        assert_eq!(front.len(), 2);
    }

    #[test]
    fn display_lists_members() {
        let mut b = ParetoFrontBuilder::new();
        b.add(cd(480, 540, 0)).unwrap();
        assert_eq!(b.build().to_string(), "[08:00–09:00 (0 ch.)]");
        assert_eq!(ParetoFront::empty().to_string(), "[]");
    }
}
