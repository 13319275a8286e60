/// A prefix of the discovered users plus how many there were before truncation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample<T> {
    pub items: Vec<T>,
    pub original_count: usize,
}

impl<T> Sample<T> {
    pub fn sampled_count(&self) -> usize {
        self.items.len()
    }

    pub fn was_truncated(&self) -> bool {
        self.items.len() < self.original_count
    }
}

/// Keep the first `min(cap, len)` items in their original order.
/// A cap larger than the set returns the whole set.
pub fn sample<T>(mut items: Vec<T>, cap: usize) -> Sample<T> {
    let original_count = items.len();
    items.truncate(cap);
    Sample {
        items,
        original_count,
    }
}
