//! The stepped, inclusive range of contrast thresholds swept per asset.

/// Thresholds `0, step, 2*step, ...` up to and including `max`.
///
/// When `max` is not a multiple of `step` it is still swept, as a final
/// shorter step: `max = 25, step = 10` gives `0, 10, 20, 25`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdRange {
    max: u32,
    step: u32,
}

impl ThresholdRange {
    /// Creates a range. A zero step is treated as a step of one.
    pub fn new(max: u32, step: u32) -> Self {
        Self {
            max,
            step: step.max(1),
        }
    }

    /// Largest threshold in the range.
    pub fn max(&self) -> u32 {
        self.max
    }

    /// Distance between consecutive thresholds.
    pub fn step(&self) -> u32 {
        self.step
    }

    /// Number of thresholds swept. Never zero: `0` is always included.
    pub fn len(&self) -> usize {
        let regular = (self.max / self.step) as usize + 1;
        if self.max % self.step == 0 {
            regular
        } else {
            regular + 1
        }
    }

    /// Always false; kept for symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Iterates the thresholds in increasing order.
    pub fn iter(&self) -> Thresholds {
        Thresholds {
            next: Some(0),
            max: self.max,
            step: self.step,
        }
    }
}

impl IntoIterator for ThresholdRange {
    type Item = u32;
    type IntoIter = Thresholds;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for &ThresholdRange {
    type Item = u32;
    type IntoIter = Thresholds;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over a [`ThresholdRange`].
#[derive(Debug, Clone)]
pub struct Thresholds {
    next: Option<u32>,
    max: u32,
    step: u32,
}

impl Iterator for Thresholds {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        let current = self.next?;
        self.next = if current >= self.max {
            None
        } else {
            Some(
                current
                    .checked_add(self.step)
                    .map_or(self.max, |n| n.min(self.max)),
            )
        };
        Some(current)
    }
}
