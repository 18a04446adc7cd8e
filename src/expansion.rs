use std::collections::BTreeSet;

use clap::ValueEnum;
use tracing::{debug, trace};

use crate::record::RecordId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ExpansionMode {
    /// One flag shared by every row.
    #[default]
    Global,
    /// Each record opens and closes on its own.
    PerRecord,
}

/// Which detail panels are open. Keyed by record id, so the state survives
/// sorting, filtering and paging.
#[derive(Debug, Clone, PartialEq)]
pub enum ExpansionState {
    Global(bool),
    PerRecord(BTreeSet<RecordId>),
}

impl ExpansionState {
    pub fn new(mode: ExpansionMode) -> Self {
        match mode {
            ExpansionMode::Global => ExpansionState::Global(false),
            ExpansionMode::PerRecord => ExpansionState::PerRecord(BTreeSet::new()),
        }
    }

    pub fn mode(&self) -> ExpansionMode {
        match self {
            ExpansionState::Global(_) => ExpansionMode::Global,
            ExpansionState::PerRecord(_) => ExpansionMode::PerRecord,
        }
    }

    pub fn toggle(&mut self, id: RecordId) {
        match self {
            ExpansionState::Global(_) => {
                debug!("Ignoring toggle of record {id}, expansion is global");
            }
            ExpansionState::PerRecord(expanded) => {
                if !expanded.remove(&id) {
                    expanded.insert(id);
                }
                trace!("Record {id} expanded: {}", expanded.contains(&id));
            }
        }
    }

    /// Flips the global flag. In per-record mode the given ids are all opened,
    /// unless every one of them already is, in which case they are closed.
    pub fn toggle_all(&mut self, visible: impl IntoIterator<Item = RecordId>) {
        match self {
            ExpansionState::Global(all) => {
                *all = !*all;
                trace!("Global expansion: {all}");
            }
            ExpansionState::PerRecord(expanded) => {
                let visible: Vec<RecordId> = visible.into_iter().collect();
                if visible.iter().all(|id| expanded.contains(id)) {
                    for id in &visible {
                        expanded.remove(id);
                    }
                } else {
                    expanded.extend(visible.iter().copied());
                }
                trace!("Expanded records: {:?}", expanded);
            }
        }
    }

    pub fn is_expanded(&self, id: RecordId) -> bool {
        match self {
            ExpansionState::Global(all) => *all,
            ExpansionState::PerRecord(expanded) => expanded.contains(&id),
        }
    }
}
