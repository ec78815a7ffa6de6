//! Dense bitset over row positions.
//!
//! Used for the multi-selection state and for collecting the positions of a
//! batch removal so they can be flushed as contiguous runs.

use std::fmt;

const WORD_BITS: usize = u64::BITS as usize;

/// A growable set of `usize` positions stored as packed 64-bit words.
///
/// Trailing zero words are trimmed after every shrinking operation so that
/// two sets with the same members compare equal.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Bitset {
    words: Vec<u64>,
}

impl Bitset {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a set holding `start..start + n`.
    pub fn from_range(start: usize, n: usize) -> Self {
        let mut set = Self::new();
        set.add_range(start, n);
        set
    }

    #[inline]
    fn split(value: usize) -> (usize, u64) {
        (value / WORD_BITS, 1u64 << (value % WORD_BITS))
    }

    fn trim(&mut self) {
        while self.words.last() == Some(&0) {
            self.words.pop();
        }
    }

    /// Adds `value`, returning true if it was not already present.
    pub fn add(&mut self, value: usize) -> bool {
        let (word, mask) = Self::split(value);
        if word >= self.words.len() {
            self.words.resize(word + 1, 0);
        }
        let was_set = self.words[word] & mask != 0;
        self.words[word] |= mask;
        !was_set
    }

    /// Removes `value`, returning true if it was present.
    pub fn remove(&mut self, value: usize) -> bool {
        let (word, mask) = Self::split(value);
        let Some(bits) = self.words.get_mut(word) else {
            return false;
        };
        let was_set = *bits & mask != 0;
        *bits &= !mask;
        self.trim();
        was_set
    }

    #[inline]
    pub fn contains(&self, value: usize) -> bool {
        let (word, mask) = Self::split(value);
        self.words.get(word).is_some_and(|bits| bits & mask != 0)
    }

    /// Adds every value in `start..start + n`.
    pub fn add_range(&mut self, start: usize, n: usize) {
        for value in start..start.saturating_add(n) {
            self.add(value);
        }
    }

    /// Removes every value in `start..start + n`.
    pub fn remove_range(&mut self, start: usize, n: usize) {
        let end = start.saturating_add(n).min(self.words.len() * WORD_BITS);
        for value in start..end {
            let (word, mask) = Self::split(value);
            self.words[word] &= !mask;
        }
        self.trim();
    }

    pub fn clear(&mut self) {
        self.words.clear();
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Returns the number of members.
    pub fn len(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn min(&self) -> Option<usize> {
        self.iter().next()
    }

    pub fn max(&self) -> Option<usize> {
        let word = self.words.len().checked_sub(1)?;
        let bits = self.words[word];
        Some(word * WORD_BITS + (WORD_BITS - 1 - bits.leading_zeros() as usize))
    }

    /// Iterates members in ascending order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            words: &self.words,
            word: 0,
            current: self.words.first().copied().unwrap_or(0),
        }
    }

    /// Iterates members in descending order.
    pub fn iter_rev(&self) -> IterRev<'_> {
        IterRev {
            words: &self.words,
            word: self.words.len(),
            current: 0,
        }
    }

    /// Iterates maximal runs of consecutive members as `(start, len)`,
    /// starting from the highest run.
    pub fn runs_rev(&self) -> RunsRev<'_> {
        RunsRev {
            inner: self.iter_rev().peekable(),
        }
    }

    /// Members of `self` restricted to `start..start + n`.
    pub fn slice(&self, start: usize, n: usize) -> Bitset {
        let end = start.saturating_add(n);
        self.iter()
            .skip_while(|&v| v < start)
            .take_while(|&v| v < end)
            .collect()
    }

    pub fn union(&self, other: &Bitset) -> Bitset {
        let len = self.words.len().max(other.words.len());
        let mut words = Vec::with_capacity(len);
        for i in 0..len {
            words.push(self.word(i) | other.word(i));
        }
        Self::from_words(words)
    }

    pub fn intersection(&self, other: &Bitset) -> Bitset {
        let len = self.words.len().min(other.words.len());
        let words = (0..len).map(|i| self.words[i] & other.words[i]).collect();
        Self::from_words(words)
    }

    pub fn difference(&self, other: &Bitset) -> Bitset {
        let words = (0..self.words.len())
            .map(|i| self.words[i] & !other.word(i))
            .collect();
        Self::from_words(words)
    }

    pub fn symmetric_difference(&self, other: &Bitset) -> Bitset {
        let len = self.words.len().max(other.words.len());
        let words = (0..len).map(|i| self.word(i) ^ other.word(i)).collect();
        Self::from_words(words)
    }

    /// Renumbers members as if `removed` positions starting at `position`
    /// were replaced by `added` new ones. Members inside the replaced range
    /// are dropped; the new positions start out unset.
    pub fn splice(&mut self, position: usize, removed: usize, added: usize) {
        if removed == 0 && added == 0 {
            return;
        }
        let tail = position + removed;
        let spliced: Bitset = self
            .iter()
            .filter(|&v| v < position || v >= tail)
            .map(|v| if v < position { v } else { v - removed + added })
            .collect();
        *self = spliced;
    }

    #[inline]
    fn word(&self, i: usize) -> u64 {
        self.words.get(i).copied().unwrap_or(0)
    }

    fn from_words(words: Vec<u64>) -> Bitset {
        let mut set = Bitset { words };
        set.trim();
        set
    }
}

impl FromIterator<usize> for Bitset {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut set = Bitset::new();
        for value in iter {
            set.add(value);
        }
        set
    }
}

impl<'a> IntoIterator for &'a Bitset {
    type Item = usize;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Debug for Bitset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Ascending iterator over a `Bitset`.
pub struct Iter<'a> {
    words: &'a [u64],
    word: usize,
    current: u64,
}

impl Iterator for Iter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        loop {
            if self.current != 0 {
                let bit = self.current.trailing_zeros() as usize;
                self.current &= self.current - 1;
                return Some(self.word * WORD_BITS + bit);
            }
            self.word += 1;
            self.current = *self.words.get(self.word)?;
        }
    }
}

/// Descending iterator over a `Bitset`.
pub struct IterRev<'a> {
    words: &'a [u64],
    word: usize,
    current: u64,
}

impl Iterator for IterRev<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        loop {
            if self.current != 0 {
                let bit = WORD_BITS - 1 - self.current.leading_zeros() as usize;
                self.current &= !(1u64 << bit);
                return Some(self.word * WORD_BITS + bit);
            }
            self.word = self.word.checked_sub(1)?;
            self.current = self.words[self.word];
        }
    }
}

/// Descending iterator over maximal runs of a `Bitset`.
pub struct RunsRev<'a> {
    inner: std::iter::Peekable<IterRev<'a>>,
}

impl Iterator for RunsRev<'_> {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<(usize, usize)> {
        let mut start = self.inner.next()?;
        let mut len = 1;
        // The start of the run is a moving target that walks down while the
        // previous member is contiguous.
        while start > 0 && self.inner.peek() == Some(&(start - 1)) {
            self.inner.next();
            start -= 1;
            len += 1;
        }
        Some((start, len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_remove_contains() {
        let mut set = Bitset::new();
        assert!(set.add(3));
        assert!(!set.add(3));
        assert!(set.add(130));
        assert!(set.contains(3));
        assert!(set.contains(130));
        assert!(!set.contains(4));
        assert_eq!(set.len(), 2);

        assert!(set.remove(130));
        assert!(!set.remove(130));
        assert!(!set.remove(9999));
        assert_eq!(set, Bitset::from_iter([3]));
    }

    #[test]
    fn iteration_in_both_directions() {
        let set: Bitset = [0, 5, 63, 64, 200].into_iter().collect();
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![0, 5, 63, 64, 200]);
        assert_eq!(set.iter_rev().collect::<Vec<_>>(), vec![200, 64, 63, 5, 0]);
        assert_eq!(set.min(), Some(0));
        assert_eq!(set.max(), Some(200));
        assert_eq!(Bitset::new().max(), None);
    }

    #[test]
    fn runs_are_reported_from_the_highest() {
        let set: Bitset = [1, 2, 3, 7, 9, 10, 63, 64, 65].into_iter().collect();
        let runs: Vec<_> = set.runs_rev().collect();
        assert_eq!(runs, vec![(63, 3), (9, 2), (7, 1), (1, 3)]);
    }

    #[test]
    fn run_starting_at_zero() {
        let set = Bitset::from_range(0, 4);
        assert_eq!(set.runs_rev().collect::<Vec<_>>(), vec![(0, 4)]);
    }

    #[test]
    fn set_algebra() {
        let a: Bitset = [1, 2, 3, 100].into_iter().collect();
        let b: Bitset = [3, 4, 100].into_iter().collect();

        assert_eq!(a.union(&b), [1, 2, 3, 4, 100].into_iter().collect());
        assert_eq!(a.intersection(&b), [3, 100].into_iter().collect());
        assert_eq!(a.difference(&b), [1, 2].into_iter().collect());
        assert_eq!(a.symmetric_difference(&b), [1, 2, 4].into_iter().collect());
        assert!(a.difference(&a).is_empty());
    }

    #[test]
    fn splice_shifts_tail_and_drops_replaced_range() {
        let mut set: Bitset = [0, 2, 3, 6, 9].into_iter().collect();
        // Replace positions 2..5 with a single new position.
        set.splice(2, 3, 1);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![0, 4, 7]);

        // Pure insertion shifts everything at or after the position.
        set.splice(4, 0, 2);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![0, 6, 9]);
    }

    #[test]
    fn slice_and_remove_range() {
        let mut set = Bitset::from_range(10, 10);
        assert_eq!(set.slice(12, 3), Bitset::from_range(12, 3));
        set.remove_range(0, 15);
        assert_eq!(set, Bitset::from_range(15, 5));
        set.remove_range(15, 5);
        assert!(set.is_empty());
    }
}
