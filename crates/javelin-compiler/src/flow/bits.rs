//! Fixed-width bit set indexed by local id.

/// One bit per local: set when the local is definitely assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Bits {
    words: Vec<u64>,
}

impl Bits {
    fn words_for(width: usize) -> usize {
        width.div_ceil(64).max(1)
    }

    pub fn empty(width: usize) -> Self {
        Self {
            words: vec![0; Self::words_for(width)],
        }
    }

    /// Every bit set. The state after a jump: anything holds vacuously.
    pub fn full(width: usize) -> Self {
        Self {
            words: vec![u64::MAX; Self::words_for(width)],
        }
    }

    #[inline]
    pub fn get(&self, index: usize) -> bool {
        self.words
            .get(index / 64)
            .is_some_and(|word| word & (1 << (index % 64)) != 0)
    }

    #[inline]
    pub fn set(&mut self, index: usize) {
        if let Some(word) = self.words.get_mut(index / 64) {
            *word |= 1 << (index % 64);
        }
    }

    #[inline]
    pub fn clear(&mut self, index: usize) {
        if let Some(word) = self.words.get_mut(index / 64) {
            *word &= !(1 << (index % 64));
        }
    }

    pub fn intersect_with(&mut self, other: &Bits) {
        for (word, other) in self.words.iter_mut().zip(&other.words) {
            *word &= other;
        }
    }

    pub fn union_with(&mut self, other: &Bits) {
        for (word, other) in self.words.iter_mut().zip(&other.words) {
            *word |= other;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_clear() {
        let mut bits = Bits::empty(130);
        assert!(!bits.get(129));
        bits.set(129);
        bits.set(3);
        assert!(bits.get(129) && bits.get(3));
        bits.clear(3);
        assert!(!bits.get(3));
        assert!(!bits.get(500));
    }

    #[test]
    fn meet_and_join() {
        let mut a = Bits::empty(8);
        a.set(1);
        a.set(2);
        let mut b = Bits::empty(8);
        b.set(2);
        b.set(5);

        let mut meet = a.clone();
        meet.intersect_with(&b);
        assert!(meet.get(2) && !meet.get(1) && !meet.get(5));

        a.union_with(&b);
        assert!(a.get(1) && a.get(2) && a.get(5));

        let mut full = Bits::full(8);
        full.intersect_with(&b);
        assert_eq!(full, b);
    }
}
