//! Scheduling contexts
//!
//! A scheduling context funds a thread's execution: `budget` ticks of CPU
//! time every `period` ticks. The dispatch core charges consumed time
//! against the remaining budget on every kernel entry and replenishes the
//! context once its period has elapsed. A context that is neither funded
//! nor due for replenishment is postponed to the release queue, which
//! lives outside this crate.

use core::fmt;

/// Kernel time, in timer ticks.
pub type Ticks = u64;

/// Smallest budget a scheduling context may be configured with. Two
/// worst-case kernel entries must fit inside one budget, or a thread could
/// never retire a single operation.
pub const MIN_BUDGET: Ticks = 2 * 10;

/// Smallest period; a period shorter than the budget is meaningless.
pub const MIN_PERIOD: Ticks = MIN_BUDGET;

/// Budget accounting state for one thread.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct SchedContext {
    /// Budget quantum granted each period.
    pub budget: Ticks,
    /// Replenishment period.
    pub period: Ticks,
    /// Budget remaining in the current period.
    pub remaining: Ticks,
    /// Timestamp of the last replenishment.
    pub period_start: Ticks,
}

impl SchedContext {
    /// Create a context with a full budget, started at time zero.
    #[must_use]
    pub const fn new(budget: Ticks, period: Ticks) -> Self {
        Self {
            budget,
            period,
            remaining: budget,
            period_start: 0,
        }
    }

    /// Charge consumed time against the remaining budget.
    #[inline]
    pub fn consume(&mut self, amount: Ticks) {
        self.remaining = self.remaining.saturating_sub(amount);
    }

    /// Check whether any budget remains.
    #[inline]
    #[must_use]
    pub const fn has_budget(&self) -> bool {
        self.remaining > 0
    }

    /// Check whether the remaining budget covers `amount` more ticks.
    #[inline]
    #[must_use]
    pub const fn budget_sufficient(&self, amount: Ticks) -> bool {
        self.remaining >= amount
    }

    /// Check whether the context may run at `now`: either budget remains,
    /// or a full period has elapsed since the last replenishment.
    #[inline]
    #[must_use]
    pub fn is_ready(&self, now: Ticks) -> bool {
        self.has_budget() || now.saturating_sub(self.period_start) >= self.period
    }

    /// Refill the budget and start a new period at `now`.
    #[inline]
    pub fn replenish(&mut self, now: Ticks) {
        self.remaining = self.budget;
        self.period_start = now;
    }

    /// Budget as a percentage of the period, for diagnostics.
    #[must_use]
    pub const fn utilisation_percent(&self) -> u64 {
        if self.period == 0 {
            return 100;
        }
        self.budget * 100 / self.period
    }
}

impl fmt::Debug for SchedContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SchedContext({}/{} ticks, {} remaining)",
            self.budget, self.period, self.remaining
        )
    }
}
