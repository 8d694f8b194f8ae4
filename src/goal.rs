//! The per-user daily income target and progress against it.

use crate::error::{Error, Result};
use crate::model::Ledger;
use crate::users::UserStore;
use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Percentage at or above which a day's goal counts as met.
pub const MET_PERCENT: f64 = 100.0;
/// Percentage at or above which progress is reported as "near".
pub const NEAR_PERCENT: f64 = 75.0;
/// Percentage at or above which progress is reported as "halfway".
pub const HALFWAY_PERCENT: f64 = 50.0;

/// The coarse progress band a UI renders. The thresholds are a policy choice, kept here as
/// named constants rather than buried in formatting code.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalBand {
    Met,
    Near,
    Halfway,
    Behind,
}

serde_plain::derive_display_from_serialize!(GoalBand);
serde_plain::derive_fromstr_from_deserialize!(GoalBand);

impl GoalBand {
    pub fn from_percent(percent: f64) -> Self {
        if percent >= MET_PERCENT {
            GoalBand::Met
        } else if percent >= NEAR_PERCENT {
            GoalBand::Near
        } else if percent >= HALFWAY_PERCENT {
            GoalBand::Halfway
        } else {
            GoalBand::Behind
        }
    }
}

/// Progress toward the daily goal on a given date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    /// Sum of amounts recorded on the date.
    pub earned: Decimal,
    /// `earned / goal * 100`, or 0.0 with no active goal.
    pub percent: f64,
    /// How much is left before the goal is met, floored at zero.
    pub remaining: Decimal,
    pub met: bool,
    pub band: GoalBand,
}

/// Computes progress for `as_of` against `goal`. Pure; the ledger is not consulted for any
/// other date. With `goal <= 0` there is no active goal and progress is all zeros.
pub fn progress(ledger: &Ledger, goal: Decimal, as_of: NaiveDate) -> Progress {
    let earned: Decimal = ledger
        .iter()
        .filter(|r| r.date == as_of)
        .map(|r| r.amount.value())
        .sum();

    if goal <= Decimal::ZERO {
        return Progress {
            earned,
            percent: 0.0,
            remaining: Decimal::ZERO,
            met: false,
            band: GoalBand::Behind,
        };
    }

    let percent = (earned / goal * Decimal::from(100))
        .to_f64()
        .unwrap_or_default();
    let remaining = (goal - earned).max(Decimal::ZERO);
    Progress {
        earned,
        percent,
        remaining,
        met: earned >= goal,
        band: GoalBand::from_percent(percent),
    }
}

/// Reads and writes the `daily_goal` field of a user's profile. This is the only profile field
/// the ledger side of the application touches.
#[derive(Debug, Clone)]
pub struct GoalTracker {
    users: UserStore,
}

impl GoalTracker {
    pub fn new(users: UserStore) -> Self {
        Self { users }
    }

    /// The user's daily goal. Zero means no goal is set.
    pub async fn goal(&self, user: &str) -> Result<Decimal> {
        self.users.daily_goal(user).await
    }

    /// Sets the user's daily goal. Zero clears it; negative values are rejected before anything
    /// is persisted.
    pub async fn set_goal(&self, user: &str, value: Decimal) -> Result<()> {
        if value < Decimal::ZERO {
            return Err(Error::InvalidGoal(value));
        }
        self.users.set_daily_goal(user, value).await
    }
}
