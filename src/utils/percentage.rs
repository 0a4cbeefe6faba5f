use std::{fmt::Display, ops::Deref};

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Percentage(f64);

impl Display for Percentage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.0}%", self.0)
    }
}

impl Percentage {
    pub const ZERO: Percentage = Percentage(0.);
    pub const FULL: Percentage = Percentage(100.);

    /// Share of `value` in `whole`. A zero `whole` gives 0% rather than a division by zero, so an
    /// unset goal never reads as met.
    pub fn of(value: u64, whole: u64) -> Percentage {
        if whole == 0 {
            Percentage::ZERO
        } else {
            Percentage(value as f64 / whole as f64 * 100.)
        }
    }

    /// Value limited to `[0, 100]`. Meant for progress bars, the real value is still what gets
    /// printed.
    pub fn clamped(self) -> Percentage {
        Percentage(self.0.min(100.))
    }
}

impl Deref for Percentage {
    type Target = f64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
