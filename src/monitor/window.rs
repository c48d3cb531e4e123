/// Fixed-capacity lookback ring. Always holds exactly `capacity` slots;
/// unwritten slots read as `T::default()`.
///
/// The write index always points at the oldest slot, i.e. the one the next
/// `push` overwrites, so `value_at(0)` is the sample `capacity - 1` pushes
/// behind the newest once the ring is full.
#[derive(Debug, Clone)]
pub struct SlidingWindow<T> {
    slots: Box<[T]>,
    index: usize,
}

impl<T: Copy + Default> SlidingWindow<T> {
    /// A zero capacity is bumped to one.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![T::default(); capacity.max(1)].into_boxed_slice(),
            index: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Overwrite the oldest slot and advance.
    pub fn push(&mut self, value: T) {
        self.slots[self.index] = value;
        self.index = (self.index + 1) % self.slots.len();
    }

    /// Slot `offset` positions after the oldest, wrapping.
    pub fn value_at(&self, offset_from_oldest: usize) -> T {
        let len = self.slots.len();
        self.slots[(self.index + offset_from_oldest % len) % len]
    }

    pub fn newest(&self) -> T {
        self.value_at(self.slots.len() - 1)
    }

    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        (0..self.slots.len()).map(move |offset| self.value_at(offset))
    }

    /// All slots, oldest first.
    pub fn all(&self) -> Vec<T> {
        self.iter().collect()
    }

    pub fn reset(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = T::default());
        self.index = 0;
    }
}

impl<T: Copy + Default + PartialOrd> SlidingWindow<T> {
    /// True when every slot holds a value `>= threshold`.
    pub fn all_at_least(&self, threshold: T) -> bool {
        self.slots.iter().all(|value| *value >= threshold)
    }
}
