//! Sorting: direction cycle, stable sort, default comparator and the two
//! sort algorithms.
//!
//! Sort state lives inside the algorithm, not in the pipeline: a
//! `SortAlgorithm` owns a reactive cell holding which columns are sorted
//! in which direction, and the pipeline re-runs whenever that cell emits.
//! The multi-column variant keeps columns in activation order and the most
//! recently applied column dominates the ordering, with earlier columns
//! breaking its ties.

use crate::cell::{Cell, Subscription};
use crate::column::{ColumnDefinition, SortComparatorFn};
use crate::value::{CellValue, Record};
use std::cmp::Ordering;
use std::rc::Rc;

use icu_collator::{Collator, CollatorOptions, Strength};
use serde::{Deserialize, Serialize};

/// Sort direction of one column. `Default` means "not sorted".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Default,
    Ascending,
    Descending,
}

impl SortDirection {
    /// The user-facing toggle cycle: Default -> Ascending -> Descending ->
    /// Default.
    pub fn next_in_cycle(self) -> SortDirection {
        match self {
            SortDirection::Default => SortDirection::Ascending,
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Default,
        }
    }
}

/// One column's entry in the sort state.
#[derive(Clone)]
pub struct ColumnSortState {
    pub column: Rc<ColumnDefinition>,
    pub direction: SortDirection,
}

thread_local! {
    static COLLATOR: Collator = {
        let mut options = CollatorOptions::new();
        options.strength = Some(Strength::Tertiary);
        Collator::try_new(&Default::default(), options)
            .expect("root locale collation data is compiled in")
    };
}

/// Orders two cell values: empty values first, strings by locale-aware
/// collation, everything else numerically.
pub fn compare_values(a: &CellValue, b: &CellValue) -> Ordering {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => match (a, b) {
            (CellValue::String(x), CellValue::String(y)) => COLLATOR.with(|c| c.compare(x, y)),
            _ => a
                .to_number()
                .partial_cmp(&b.to_number())
                .unwrap_or(Ordering::Equal),
        },
    }
}

/// The comparator columns fall back to when none is supplied.
pub fn default_comparator() -> SortComparatorFn {
    Rc::new(|a: &Record, b: &Record, column: &ColumnDefinition| {
        compare_values(&column.cell_value(a), &column.cell_value(b))
    })
}

/// Stable sort that returns a new vector. Ties keep their input order,
/// enforced explicitly by pairing every item with its original index.
pub fn stable_sort<T: Clone>(
    items: &[T],
    mut compare: impl FnMut(&T, &T) -> Ordering,
) -> Vec<T> {
    let mut indexed: Vec<(usize, T)> = items.iter().cloned().enumerate().collect();
    indexed.sort_unstable_by(|(ia, a), (ib, b)| compare(a, b).then(ia.cmp(ib)));
    indexed.into_iter().map(|(_, item)| item).collect()
}

/// Applies the given sort states in activation order. Each pass is a
/// stable sort, so the last state dominates and earlier states survive as
/// tie-breakers. States with `Default` direction or a sort-disabled column
/// are skipped.
fn apply_states(rows: &[Record], states: &[ColumnSortState]) -> Vec<Record> {
    let mut sorted = rows.to_vec();
    for state in states {
        if state.direction == SortDirection::Default || !state.column.sort_enabled.get() {
            continue;
        }
        let comparator = state.column.sort_comparator.get();
        let column = Rc::clone(&state.column);
        let descending = state.direction == SortDirection::Descending;
        sorted = stable_sort(&sorted, |a, b| {
            let ordering = comparator(a, b, &column);
            if descending {
                ordering.reverse()
            } else {
                ordering
            }
        });
    }
    sorted
}

/// Sort algorithm holding at most one sorted column; applying a new column
/// discards the previous one.
#[derive(Clone)]
pub struct SingleColumnSort {
    state: Cell<Option<ColumnSortState>>,
}

impl SingleColumnSort {
    pub fn new() -> Self {
        SingleColumnSort {
            state: Cell::new(None),
        }
    }
}

/// Sort algorithm accumulating columns in activation order.
#[derive(Clone)]
pub struct MultiColumnSort {
    states: Cell<Vec<ColumnSortState>>,
}

impl MultiColumnSort {
    pub fn new() -> Self {
        MultiColumnSort {
            states: Cell::new(Vec::new()),
        }
    }
}

/// Strategy deciding how many columns may be sorted at once. Cloning an
/// algorithm shares its state cell.
#[derive(Clone)]
pub enum SortAlgorithm {
    SingleColumn(SingleColumnSort),
    MultiColumn(MultiColumnSort),
}

impl Default for SortAlgorithm {
    fn default() -> Self {
        SortAlgorithm::MultiColumn(MultiColumnSort::new())
    }
}

impl SortAlgorithm {
    pub fn single_column() -> Self {
        SortAlgorithm::SingleColumn(SingleColumnSort::new())
    }

    pub fn multi_column() -> Self {
        SortAlgorithm::MultiColumn(MultiColumnSort::new())
    }

    /// Snapshot of the current sort state in activation order.
    pub fn columns_sort_state(&self) -> Vec<ColumnSortState> {
        match self {
            SortAlgorithm::SingleColumn(s) => s.state.get().into_iter().collect(),
            SortAlgorithm::MultiColumn(m) => m.states.get(),
        }
    }

    /// Observes sort state changes. The observer fires immediately with
    /// the current state and then after every `apply_column_sort` or
    /// `reset_sort`.
    pub fn subscribe_columns_sort_state(
        &self,
        observer: impl Fn(&[ColumnSortState]) + 'static,
    ) -> Subscription {
        match self {
            SortAlgorithm::SingleColumn(s) => s.state.subscribe(move |state| {
                let snapshot: Vec<ColumnSortState> = state.clone().into_iter().collect();
                observer(&snapshot);
            }),
            SortAlgorithm::MultiColumn(m) => m.states.subscribe(move |states| observer(states)),
        }
    }

    /// Records a direction for a column. Single-column mode replaces the
    /// previous entry; multi-column mode removes any earlier entry for the
    /// same column (by reference) and appends the new one, making it the
    /// dominant sort key.
    pub fn apply_column_sort(&self, column: Rc<ColumnDefinition>, direction: SortDirection) {
        match self {
            SortAlgorithm::SingleColumn(s) => {
                s.state.set(Some(ColumnSortState { column, direction }));
            }
            SortAlgorithm::MultiColumn(m) => {
                let mut states = m.states.get();
                states.retain(|state| !Rc::ptr_eq(&state.column, &column));
                states.push(ColumnSortState { column, direction });
                m.states.set(states);
            }
        }
    }

    /// Clears all sort state.
    pub fn reset_sort(&self) {
        match self {
            SortAlgorithm::SingleColumn(s) => s.state.set(None),
            SortAlgorithm::MultiColumn(m) => m.states.set(Vec::new()),
        }
    }

    /// Sorts a row set according to the current state. The input order is
    /// the final tie-breaker.
    pub fn sort(&self, rows: &[Record]) -> Vec<Record> {
        apply_states(rows, &self.columns_sort_state())
    }
}
