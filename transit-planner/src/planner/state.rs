//! Search states and reconstructed routes.
//!
//! The engine keeps its states in an arena and links them with integer
//! parent indices. A finished search copies the chain from the root to the
//! terminal state into a [`Route`], re-indexing the parents so the route is
//! self-contained once the arena is dropped.

use chrono::Duration;

use crate::domain::{Hop, LineId, Ride, StopId, TransitTime, group_hops};

/// Identity of a search state.
///
/// Two states are the same iff they sit at the same stop, aboard the same
/// line (or none yet), having come from the same previous stop. Tracking the
/// line separates arrivals that would need a transfer from those that would
/// not; tracking the predecessor lets the engine tell "carry on along the
/// line" apart from "ride the same line straight back".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateKey {
    pub stop: StopId,
    pub line: Option<LineId>,
    pub predecessor: Option<StopId>,
}

impl StateKey {
    /// Key of a fresh search root at `stop`: no line, no predecessor.
    pub fn origin(stop: StopId) -> Self {
        Self {
            stop,
            line: None,
            predecessor: None,
        }
    }
}

/// Index of a state in the arena (or in a [`Route`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateId(pub usize);

/// A label of the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchState {
    pub key: StateKey,
    /// Cost of the hop that produced this state.
    pub edge_cost: u64,
    /// Accumulated cost since the search root.
    pub total: u64,
    /// Estimated remaining cost to the destination.
    pub heuristic: u64,
    /// `total + heuristic`
    pub f: u64,
    /// Absolute arrival time at `key.stop`.
    pub arrival: TransitTime,
    pub parent: Option<StateId>,
    /// The trip that produced this state; `None` for a root.
    pub via: Option<Hop>,
    /// Whether boarding `via` was a line change.
    pub transfer: bool,
}

impl SearchState {
    /// A search root: zero cost at `arrival`, no parent.
    pub fn root(key: StateKey, arrival: TransitTime, heuristic: u64) -> Self {
        Self {
            key,
            edge_cost: 0,
            total: 0,
            heuristic,
            f: heuristic,
            arrival,
            parent: None,
            via: None,
            transfer: false,
        }
    }

    pub fn stop(&self) -> StopId {
        self.key.stop
    }
}

/// The optimal state chain of one search, root first.
///
/// # Invariants
///
/// - Never empty
/// - `states[0]` is the root and has no parent
/// - `states[i].parent == Some(StateId(i - 1))` for `i > 0`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    states: Vec<SearchState>,
    start_time: TransitTime,
    expansions: usize,
}

impl Route {
    /// Copy the chain ending at `terminal` out of an arena.
    pub(crate) fn from_arena(
        arena: &[SearchState],
        terminal: StateId,
        start_time: TransitTime,
        expansions: usize,
    ) -> Self {
        let mut chain = Vec::new();
        let mut cursor = Some(terminal);
        while let Some(id) = cursor {
            let state = arena[id.0];
            chain.push(state);
            cursor = state.parent;
        }
        chain.reverse();

        for (idx, state) in chain.iter_mut().enumerate() {
            state.parent = idx.checked_sub(1).map(StateId);
        }

        Self {
            states: chain,
            start_time,
            expansions,
        }
    }

    /// All states from root to terminal.
    pub fn states(&self) -> &[SearchState] {
        &self.states
    }

    pub fn root(&self) -> &SearchState {
        &self.states[0]
    }

    /// The state at the destination.
    pub fn terminal(&self) -> &SearchState {
        &self.states[self.states.len() - 1]
    }

    /// Parent of a state of this route.
    pub fn parent(&self, state: &SearchState) -> Option<&SearchState> {
        state.parent.and_then(|id| self.states.get(id.0))
    }

    /// Optimal cost under the mode the route was searched with.
    pub fn total_cost(&self) -> u64 {
        self.terminal().total
    }

    /// Time the query started at.
    pub fn start_time(&self) -> TransitTime {
        self.start_time
    }

    pub fn arrival(&self) -> TransitTime {
        self.terminal().arrival
    }

    /// Departure of the first hop, or `None` for a zero-hop route.
    pub fn departure(&self) -> Option<TransitTime> {
        self.hops().next().map(|hop| hop.departure)
    }

    /// Wait at the origin before the first departure.
    pub fn initial_wait(&self) -> Duration {
        self.departure()
            .map(|dep| dep.signed_duration_since(self.start_time))
            .unwrap_or_else(Duration::zero)
    }

    /// Scheduled trips taken, in order.
    pub fn hops(&self) -> impl Iterator<Item = &Hop> {
        self.states.iter().filter_map(|s| s.via.as_ref())
    }

    /// Number of line changes along the route.
    pub fn transfers(&self) -> usize {
        self.states.iter().filter(|s| s.transfer).count()
    }

    /// Hops merged into rides.
    pub fn rides(&self) -> Vec<Ride> {
        group_hops(
            self.states
                .iter()
                .filter_map(|s| s.via.as_ref().map(|hop| (hop, s.transfer))),
        )
    }

    /// States expanded by the search that produced this route.
    pub fn expansions(&self) -> usize {
        self.expansions
    }
}
