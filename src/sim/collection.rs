//! Collected toys and the win condition

use serde::{Deserialize, Serialize};

use super::toy::ToyKind;
use crate::consts::SQUEEZE_AFTER;

/// One token in the collection display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectedToken {
    pub kind: ToyKind,
    /// Drawn overlapped once the display fills up
    pub squeeze: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    count: u32,
    total: u32,
    tokens: Vec<CollectedToken>,
    victory_signalled: bool,
}

impl Collection {
    pub fn new(total: u32) -> Self {
        Self {
            count: 0,
            total,
            tokens: Vec::new(),
            victory_signalled: false,
        }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn tokens(&self) -> &[CollectedToken] {
        &self.tokens
    }

    pub fn victory_signalled(&self) -> bool {
        self.victory_signalled
    }

    /// Count a collected toy and append its display token
    pub fn record(&mut self, kind: ToyKind) -> CollectedToken {
        self.count += 1;
        let token = CollectedToken {
            kind,
            squeeze: self.count > SQUEEZE_AFTER,
        };
        self.tokens.push(token);
        token
    }

    /// True exactly once, when every placed toy has been collected
    pub fn check_win(&mut self) -> bool {
        if self.victory_signalled || self.count < self.total {
            return false;
        }
        self.victory_signalled = true;
        true
    }

    /// Signal victory regardless of the count (still at most once)
    pub fn force_win(&mut self) -> bool {
        if self.victory_signalled {
            return false;
        }
        self.victory_signalled = true;
        true
    }

    pub fn reset(&mut self) {
        self.count = 0;
        self.tokens.clear();
        self.victory_signalled = false;
    }
}
