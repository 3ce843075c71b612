//! Cyclic phase sequence driving when financial settlement happens.

use serde::{Deserialize, Serialize};

/// One phase of the corporation's market cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CorpState {
    /// Settlement: profits of the previous cycle are booked.
    Start,
    Purchase,
    Production,
    Export,
    Sale,
}

impl CorpState {
    /// Transition table, in cycle order.
    pub const ORDER: [CorpState; 5] = [
        CorpState::Start,
        CorpState::Purchase,
        CorpState::Production,
        CorpState::Export,
        CorpState::Sale,
    ];

    /// The phase during which revenue, valuation, dividends and share price settle.
    pub const SETTLEMENT: CorpState = CorpState::Start;

    /// Position of this phase in [`CorpState::ORDER`].
    pub fn index(self) -> usize {
        match self {
            CorpState::Start => 0,
            CorpState::Purchase => 1,
            CorpState::Production => 2,
            CorpState::Export => 3,
            CorpState::Sale => 4,
        }
    }

    /// The phase that follows this one, wrapping after the last.
    pub fn next(self) -> CorpState {
        Self::ORDER[(self.index() + 1) % Self::ORDER.len()]
    }

    pub fn is_settlement(self) -> bool {
        self == Self::SETTLEMENT
    }

    pub fn name(self) -> &'static str {
        match self {
            CorpState::Start => "START",
            CorpState::Purchase => "PURCHASE",
            CorpState::Production => "PRODUCTION",
            CorpState::Export => "EXPORT",
            CorpState::Sale => "SALE",
        }
    }
}

impl std::fmt::Display for CorpState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Current and previous phase. Has no terminal state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateMachine {
    current: CorpState,
    previous: CorpState,
}

impl Default for StateMachine {
    fn default() -> Self {
        Self {
            current: CorpState::ORDER[0],
            previous: CorpState::ORDER[CorpState::ORDER.len() - 1],
        }
    }
}

impl StateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> CorpState {
        self.current
    }

    pub fn previous(&self) -> CorpState {
        self.previous
    }

    /// Move to the next phase and return it.
    pub fn advance(&mut self) -> CorpState {
        self.previous = self.current;
        self.current = self.current.next();
        self.current
    }
}
