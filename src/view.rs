//! # Status View
//!
//! Pure projection of the last fetched airdrop snapshot into a display
//! model. No state, no I/O; entirely derived from what the lifecycle
//! controller holds.

use crate::state::AirdropStatus;

/// Winner display, with an explicit no-winners state distinct from an
/// empty list with no message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WinnersDisplay {
    NoneYet,
    Rows(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusDisplay {
    pub status_label: String,
    pub winners: WinnersDisplay,
}

impl StatusDisplay {
    pub fn project(status: &AirdropStatus) -> Self {
        let winners = if status.winners.is_empty() {
            WinnersDisplay::NoneYet
        } else {
            WinnersDisplay::Rows(
                status
                    .winners
                    .iter()
                    .map(|(address, prize)| {
                        format!("{}: {} {}", address, prize.amount, prize.symbol)
                    })
                    .collect(),
            )
        };
        Self {
            status_label: status.status.as_str().to_string(),
            winners,
        }
    }
}
