use std::{
    iter::Sum,
    ops::{Add, AddAssign},
    str::FromStr,
};

/// a count of scheduler clock ticks.
#[derive(Clone, Copy, Debug, Default, Eq, Ord, PartialEq, PartialOrd)]
pub struct UserHz(u64);

// === impl UserHz ===

impl UserHz {
    /// the number of clock ticks in a second.
    ///
    /// this can be obtained via `getconf(1)` and `CLK_TCK`, or `sysconf(_SC_CLK_TCK)`. usually,
    /// this is 100Hz, so it is hard-coded for now.
    pub const FREQ: u32 = 100;

    pub const ZERO: Self = Self(0);

    pub const fn new(ticks: u64) -> Self {
        Self(ticks)
    }

    /// returns the ticks accrued since `earlier`, if any.
    ///
    /// a counter that went backwards (wraparound, or a reused thread id) and one that did not
    /// move both yield `None`.
    pub fn since(self, earlier: Self) -> Option<Self> {
        let (Self(now), Self(then)) = (self, earlier);
        now.checked_sub(then).filter(|d| *d > 0).map(Self)
    }

    pub fn as_f64(self) -> f64 {
        let Self(ticks) = self;
        ticks as f64
    }
}

impl FromStr for UserHz {
    type Err = <u64 as FromStr>::Err;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

impl Add for UserHz {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        let (Self(lhs), Self(rhs)) = (self, rhs);
        Self(lhs.saturating_add(rhs))
    }
}

impl AddAssign for UserHz {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sum for UserHz {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}
