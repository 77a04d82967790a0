//! Equation/unknown count check of a synthesized system.

use std::fmt;

use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum BalanceStatus {
    Balanced,
    /// More equations than unknowns.
    OverDetermined,
    /// Fewer equations than unknowns.
    UnderDetermined,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BalanceResult {
    pub num_equations: usize,
    pub num_unknowns: usize,
    pub status: BalanceStatus,
}

impl BalanceResult {
    pub fn new(num_equations: usize, num_unknowns: usize) -> Self {
        let status = match num_equations.cmp(&num_unknowns) {
            std::cmp::Ordering::Equal => BalanceStatus::Balanced,
            std::cmp::Ordering::Greater => BalanceStatus::OverDetermined,
            std::cmp::Ordering::Less => BalanceStatus::UnderDetermined,
        };
        Self {
            num_equations,
            num_unknowns,
            status,
        }
    }

    pub fn is_balanced(&self) -> bool {
        self.status == BalanceStatus::Balanced
    }

    /// Equations minus unknowns.
    pub fn difference(&self) -> i64 {
        self.num_equations as i64 - self.num_unknowns as i64
    }
}

impl fmt::Display for BalanceResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            BalanceStatus::Balanced => write!(
                f,
                "balanced: {} equations, {} unknowns",
                self.num_equations, self.num_unknowns
            ),
            BalanceStatus::OverDetermined => write!(
                f,
                "over-determined by {}: {} equations, {} unknowns",
                self.difference(),
                self.num_equations,
                self.num_unknowns
            ),
            BalanceStatus::UnderDetermined => write!(
                f,
                "under-determined by {}: {} equations, {} unknowns",
                -self.difference(),
                self.num_equations,
                self.num_unknowns
            ),
        }
    }
}
