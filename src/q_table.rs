use std::collections::HashMap;
use serde::{Deserialize, Serialize};
use crate::board::StateKey;
use crate::utils::*;

/// One persisted (state, action) estimate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QEntry {
    pub state: StateKey,
    pub action: Coord,
    pub value: Reward,
}

/// Learned value of clicking each tile from each state.
/// Entries appear on first update and are only removed by [`QTable::clear`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(into = "Vec<QEntry>", from = "Vec<QEntry>")]
pub struct QTable {
    values: HashMap<StateKey, HashMap<Coord, Reward>>,
}

impl QTable {
    pub fn new() -> Self { Self::default() }

    /// The recorded estimate, if this pair has ever been updated
    pub fn get(&self, state: &StateKey, action: Coord) -> Option<Reward> {
        self.values.get(state)?.get(&action).copied()
    }

    /// The estimate with unseen pairs reading as 0.0
    pub fn value(&self, state: &StateKey, action: Coord) -> Reward {
        self.get(state, action).unwrap_or(0.0)
    }

    pub fn set(&mut self, state: &StateKey, action: Coord, value: Reward) {
        if let Some(actions) = self.values.get_mut(state) {
            actions.insert(action, value);
        } else {
            self.values.insert(state.clone(), HashMap::from([(action, value)]));
        }
    }

    pub fn contains_state(&self, state: &StateKey) -> bool {
        self.values.get(state).is_some_and(|a| !a.is_empty())
    }

    /// Highest recorded estimate among `actions` (unrecorded actions are skipped)
    pub fn best_value(&self, state: &StateKey, actions: &[Coord]) -> Option<Reward> {
        let recorded = self.values.get(state)?;
        actions.iter()
            .filter_map(|a| recorded.get(a).copied())
            .fold(None, |best, v| Some(best.map_or(v, |b: Reward| b.max(v))))
    }

    /// Highest recorded estimate for any action in this state
    pub fn max_value(&self, state: &StateKey) -> Option<Reward> {
        self.values.get(state)?.values().copied().reduce(Reward::max)
    }

    /// Number of (state, action) pairs
    pub fn len(&self) -> usize {
        self.values.values().map(|a| a.len()).sum()
    }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    pub fn num_states(&self) -> usize { self.values.len() }

    pub fn clear(&mut self) { self.values.clear(); }

    /// Entries sorted by state then action, so saved files diff cleanly
    pub fn entries(&self) -> Vec<QEntry> {
        let mut out: Vec<QEntry> = self.values.iter()
            .flat_map(|(state, actions)| actions.iter().map(move |(&action, &value)| QEntry {
                state: state.clone(),
                action,
                value,
            }))
            .collect();
        out.sort_by(|a, b| a.state.cmp(&b.state).then(a.action.cmp(&b.action)));
        out
    }
}

impl From<Vec<QEntry>> for QTable {
    fn from(entries: Vec<QEntry>) -> Self {
        let mut table = QTable::new();
        for e in entries {
            table.set(&e.state, e.action, e.value);
        }
        table
    }
}

impl From<QTable> for Vec<QEntry> {
    fn from(table: QTable) -> Self { table.entries() }
}
