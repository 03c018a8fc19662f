//! Band and linear scales.

/// Splits `[start, end)` into `count` equal steps, each holding one band
/// separated from its neighbours by `padding` of a step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandScale {
    start: f64,
    step: f64,
    padding: f64,
    count: usize,
}

impl BandScale {
    /// `padding` is clamped to `[0, 0.95]`; a zero `count` is treated as one.
    pub fn new(start: f64, end: f64, count: usize, padding: f64) -> Self {
        let count = count.max(1);
        let padding = if padding.is_finite() {
            padding.clamp(0.0, 0.95)
        } else {
            0.0
        };
        Self {
            start,
            step: (end - start) / count as f64,
            padding,
            count,
        }
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    /// Width of one band after padding.
    pub fn bandwidth(&self) -> f64 {
        self.step * (1.0 - self.padding)
    }

    /// Start of band `i`. Half the padding sits on each side of a band.
    pub fn position(&self, i: usize) -> f64 {
        self.start + self.step * i as f64 + self.step * self.padding / 2.0
    }

    pub fn center(&self, i: usize) -> f64 {
        self.position(i) + self.bandwidth() / 2.0
    }

    /// Index of the step containing `value`, if any.
    pub fn step_at(&self, value: f64) -> Option<usize> {
        if self.step <= 0.0 || value < self.start {
            return None;
        }
        let i = ((value - self.start) / self.step).floor() as usize;
        (i < self.count).then_some(i)
    }

    pub fn count(&self) -> usize {
        self.count
    }
}

/// Maps `[domain.0, domain.1]` onto `[range.0, range.1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    /// A degenerate domain maps everything to the start of the range.
    pub fn map(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if d1 == d0 {
            return r0;
        }
        r0 + (value - d0) / (d1 - d0) * (r1 - r0)
    }
}
