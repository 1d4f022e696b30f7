//! The filter -> sort -> paginate pipeline.
//!
//! `TablePipeline` ties the pieces together: it subscribes to the source
//! rows, every reactive field of every column, the configuration fields
//! and the sort algorithm's state, and recomputes the derived row sets
//! whenever any of them emits. All derived stages are exposed both as
//! snapshots and as subscriptions.
//!
//! Recomputation is synchronous and runs the stages in dependency order:
//! filtered rows feed the sort, the sorted length drives the page count,
//! the clamped active page selects the slice, and the slice becomes the
//! processed output. Debounced inputs (typed page numbers and filter
//! queries) are committed from the host's `tick` call.

use crate::cell::{Cell, Subscription};
use crate::column::ColumnDefinition;
use crate::config::TableConfiguration;
use crate::debounce::Debouncer;
use crate::sort::SortDirection;
use crate::value::{CellValue, Record};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Page navigation request relative to the current page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangePageType {
    First,
    Previous,
    Next,
    Last,
}

/// Effective sort direction of every current column, keyed by column
/// reference. Columns excluded from sorting (their own flag or the global
/// one) read as `Default`; columns not in the pipeline's column set have
/// no entry.
#[derive(Clone, Default)]
pub struct SortDirectionMap {
    entries: Vec<(Rc<ColumnDefinition>, SortDirection)>,
}

impl SortDirectionMap {
    pub fn direction_for(&self, column: &Rc<ColumnDefinition>) -> Option<SortDirection> {
        self.entries
            .iter()
            .find(|(c, _)| Rc::ptr_eq(c, column))
            .map(|(_, direction)| *direction)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Rc<ColumnDefinition>, SortDirection)> {
        self.entries.iter().map(|(c, d)| (c, *d))
    }
}

/// Subscriptions and debouncers, torn down and rebuilt when the cell they
/// hang off is replaced.
#[derive(Default)]
struct Wiring {
    root_subs: Vec<Subscription>,
    config_subs: Vec<Subscription>,
    column_subs: Vec<Subscription>,
    sort_subs: Vec<Subscription>,
    page_debouncer: Debouncer<usize>,
    filter_debouncers: Vec<(Rc<ColumnDefinition>, Debouncer<CellValue>)>,
}

struct PipelineShared {
    source: Cell<Vec<Record>>,
    columns: Cell<Vec<Rc<ColumnDefinition>>>,
    configuration: Cell<TableConfiguration>,

    filtered_source: Cell<Vec<Record>>,
    sorted_source: Cell<Vec<Record>>,
    amount_of_pages: Cell<usize>,
    active_page: Cell<usize>,
    paginated_source: Cell<Vec<Record>>,
    processed_source: Cell<Vec<Record>>,
    columns_sort_direction: Cell<SortDirectionMap>,

    wiring: RefCell<Wiring>,
}

/// Reactive grid processor. Cloning shares the underlying pipeline.
#[derive(Clone)]
pub struct TablePipeline {
    shared: Rc<PipelineShared>,
}

impl TablePipeline {
    pub fn new() -> Self {
        Self::with(Vec::new(), Vec::new(), TableConfiguration::new())
    }

    pub fn with(
        rows: Vec<Record>,
        columns: Vec<Rc<ColumnDefinition>>,
        configuration: TableConfiguration,
    ) -> Self {
        let shared = Rc::new(PipelineShared {
            source: Cell::new(rows),
            columns: Cell::new(columns),
            configuration: Cell::new(configuration),
            filtered_source: Cell::new(Vec::new()),
            sorted_source: Cell::new(Vec::new()),
            amount_of_pages: Cell::new(1),
            active_page: Cell::new(1),
            paginated_source: Cell::new(Vec::new()),
            processed_source: Cell::new(Vec::new()),
            columns_sort_direction: Cell::new(SortDirectionMap::default()),
            wiring: RefCell::new(Wiring::default()),
        });
        wire_roots(&shared);
        TablePipeline { shared }
    }

    // ----- inputs -----

    pub fn set_source(&self, rows: Vec<Record>) {
        self.shared.source.set(rows);
    }

    pub fn set_columns(&self, columns: Vec<Rc<ColumnDefinition>>) {
        self.shared.columns.set(columns);
    }

    pub fn set_configuration(&self, configuration: TableConfiguration) {
        self.shared.configuration.set(configuration);
    }

    pub fn source(&self) -> Vec<Record> {
        self.shared.source.get()
    }

    pub fn columns(&self) -> Vec<Rc<ColumnDefinition>> {
        self.shared.columns.get()
    }

    pub fn configuration(&self) -> TableConfiguration {
        self.shared.configuration.get()
    }

    // ----- derived snapshots -----

    pub fn filtered_source(&self) -> Vec<Record> {
        self.shared.filtered_source.get()
    }

    pub fn sorted_source(&self) -> Vec<Record> {
        self.shared.sorted_source.get()
    }

    pub fn paginated_source(&self) -> Vec<Record> {
        self.shared.paginated_source.get()
    }

    /// The final output: filtered, sorted and paginated rows.
    pub fn processed_source(&self) -> Vec<Record> {
        self.shared.processed_source.get()
    }

    /// Total page count; at least 1, even for an empty row set.
    pub fn amount_of_pages(&self) -> usize {
        self.shared.amount_of_pages.get()
    }

    /// The configured page clamped to the valid range.
    pub fn active_page(&self) -> usize {
        self.shared.active_page.get()
    }

    pub fn columns_sort_direction(&self) -> SortDirectionMap {
        self.shared.columns_sort_direction.get()
    }

    // ----- derived subscriptions -----

    pub fn subscribe_processed_source(
        &self,
        observer: impl Fn(&Vec<Record>) + 'static,
    ) -> Subscription {
        self.shared.processed_source.subscribe(observer)
    }

    pub fn subscribe_amount_of_pages(&self, observer: impl Fn(&usize) + 'static) -> Subscription {
        self.shared.amount_of_pages.subscribe(observer)
    }

    pub fn subscribe_active_page(&self, observer: impl Fn(&usize) + 'static) -> Subscription {
        self.shared.active_page.subscribe(observer)
    }

    pub fn subscribe_columns_sort_direction(
        &self,
        observer: impl Fn(&SortDirectionMap) + 'static,
    ) -> Subscription {
        self.shared.columns_sort_direction.subscribe(observer)
    }

    // ----- operations -----

    /// Applies a column's current value accessor to a record.
    pub fn get_cell_value(&self, record: &Record, column: &ColumnDefinition) -> CellValue {
        column.cell_value(record)
    }

    /// Advances a column through the sort cycle Default -> Ascending ->
    /// Descending -> Default, reading the column's current effective
    /// direction off the direction map rather than a local counter. The
    /// click is dropped outright when sorting is globally off, when the
    /// column's `sort_enabled` is false, or when the column is not part of
    /// the pipeline's column set, so recorded sort state is never touched
    /// while gated.
    pub fn toggle_column_sort(&self, column: &Rc<ColumnDefinition>) {
        let config = self.shared.configuration.get();
        if !config.sort_enabled.get() || !column.sort_enabled.get() {
            return;
        }
        let map = self.shared.columns_sort_direction.get();
        let direction = match map.direction_for(column) {
            Some(direction) => direction,
            None => return,
        };
        config
            .sort_algorithm
            .get()
            .apply_column_sort(Rc::clone(column), direction.next_in_cycle());
    }

    /// Clears all sort state on the current algorithm.
    pub fn reset_sort(&self) {
        self.shared.configuration.get().sort_algorithm.get().reset_sort();
    }

    /// Navigates relative to the current page, clamped to the valid range.
    pub fn change_page(&self, change: ChangePageType) {
        let pages = self.shared.amount_of_pages.get() as i64;
        let current = self.shared.active_page.get() as i64;
        let target = match change {
            ChangePageType::First => 1,
            ChangePageType::Previous => current - 1,
            ChangePageType::Next => current + 1,
            ChangePageType::Last => pages,
        }
        .clamp(1, pages);
        self.shared.configuration.get().active_page.set(target);
    }

    /// Handles a typed page number. Unparseable, out-of-range and
    /// already-active values are dropped; valid ones are committed after
    /// the configured debounce time, via `tick`.
    pub fn request_page(&self, input: &str) {
        let page = match input.trim().parse::<i64>() {
            Ok(page) => page,
            Err(_) => return,
        };
        let pages = self.shared.amount_of_pages.get() as i64;
        if page < 1 || page > pages {
            return;
        }
        if page == self.shared.active_page.get() as i64 {
            return;
        }
        let delay = self
            .shared
            .configuration
            .get()
            .active_page_control_debounce_time
            .get();
        self.shared
            .wiring
            .borrow_mut()
            .page_debouncer
            .submit(page as usize, delay);
    }

    /// Handles typed filter input for one column, committed after the
    /// column's debounce time via `tick`. Unknown columns are ignored.
    pub fn request_filter(&self, column: &Rc<ColumnDefinition>, query: impl Into<CellValue>) {
        let delay = column.filter_debounce_time.get();
        let mut wiring = self.shared.wiring.borrow_mut();
        if let Some((_, debouncer)) = wiring
            .filter_debouncers
            .iter_mut()
            .find(|(c, _)| Rc::ptr_eq(c, column))
        {
            debouncer.submit(query.into(), delay);
        }
    }

    /// Cycles a checkbox column's filter query: match-all -> checked ->
    /// unchecked -> match-all. Applied immediately, no debounce.
    pub fn cycle_checkbox_filter(&self, column: &Rc<ColumnDefinition>) {
        let next = match column.filter_query.get() {
            CellValue::Bool(true) => CellValue::Bool(false),
            CellValue::Bool(false) => CellValue::String(String::new()),
            _ => CellValue::Bool(true),
        };
        column.filter_query.set(next);
    }

    /// Commits debounced inputs whose deadline has passed. Call this from
    /// the host's tick loop.
    pub fn tick(&self) {
        let page_commit;
        let mut filter_commits = Vec::new();
        {
            let mut wiring = self.shared.wiring.borrow_mut();
            page_commit = wiring.page_debouncer.poll();
            for (column, debouncer) in wiring.filter_debouncers.iter_mut() {
                if let Some(query) = debouncer.poll() {
                    filter_commits.push((Rc::clone(column), query));
                }
            }
        }
        // Cell sets recompute the pipeline, so the wiring borrow must be
        // released first. `set_if_changed` compares against the live cell,
        // which suppresses redundant commits without going stale when the
        // target was moved through another path in the meantime.
        if let Some(page) = page_commit {
            log::trace!("debounce commit: page {page}");
            self.shared
                .configuration
                .get()
                .active_page
                .set_if_changed(page as i64);
        }
        for (column, query) in filter_commits {
            log::trace!("debounce commit: filter on '{}'", column.title.get());
            column.filter_query.set_if_changed(query);
        }
    }
}

impl Default for TablePipeline {
    fn default() -> Self {
        Self::new()
    }
}

fn recompute_weak(weak: &Weak<PipelineShared>) {
    if let Some(shared) = weak.upgrade() {
        recompute(&shared);
    }
}

/// A column takes part in filtering when its own flag is on and its query
/// is anything other than the empty string. A boolean query (checkbox
/// filters) always counts.
fn filter_query_present(query: &CellValue) -> bool {
    !matches!(query, CellValue::String(s) if s.is_empty())
}

fn recompute(shared: &Rc<PipelineShared>) {
    let rows = shared.source.get();
    let columns = shared.columns.get();
    let config = shared.configuration.get();

    let filtered: Vec<Record> = if config.filter_enabled.get() {
        let active: Vec<&Rc<ColumnDefinition>> = columns
            .iter()
            .filter(|c| c.filter_enabled.get() && filter_query_present(&c.filter_query.get()))
            .collect();
        if active.is_empty() {
            rows.clone()
        } else {
            rows.iter()
                .filter(|row| active.iter().all(|c| (c.filter_function.get())(row, c)))
                .cloned()
                .collect()
        }
    } else {
        rows.clone()
    };

    let algorithm = config.sort_algorithm.get();
    let sorted = if config.sort_enabled.get() {
        algorithm.sort(&filtered)
    } else {
        filtered.clone()
    };

    let page_size = config.effective_page_size();
    let pages = if sorted.is_empty() {
        1
    } else {
        (sorted.len() + page_size - 1) / page_size
    };
    let active = config.active_page.get().clamp(1, pages as i64) as usize;

    let paginated = if config.pagination_enabled.get() {
        let start = (active - 1) * page_size;
        let end = (start + page_size).min(sorted.len());
        if start >= sorted.len() {
            Vec::new()
        } else {
            sorted[start..end].to_vec()
        }
    } else {
        sorted.clone()
    };

    let states = if config.sort_enabled.get() {
        algorithm.columns_sort_state()
    } else {
        Vec::new()
    };
    let directions: Vec<(Rc<ColumnDefinition>, SortDirection)> = columns
        .iter()
        .map(|column| {
            let direction = if column.sort_enabled.get() {
                states
                    .iter()
                    .find(|state| Rc::ptr_eq(&state.column, column))
                    .map(|state| state.direction)
                    .unwrap_or(SortDirection::Default)
            } else {
                SortDirection::Default
            };
            (Rc::clone(column), direction)
        })
        .collect();

    log::debug!(
        "pipeline recompute: {} rows -> {} filtered, page {}/{}",
        rows.len(),
        filtered.len(),
        active,
        pages
    );

    shared.filtered_source.set(filtered);
    shared.sorted_source.set(sorted);
    shared.amount_of_pages.set_if_changed(pages);
    shared.active_page.set_if_changed(active);
    shared.paginated_source.set(paginated.clone());
    shared.processed_source.set(paginated);
    shared
        .columns_sort_direction
        .set(SortDirectionMap { entries: directions });
}

fn wire_roots(shared: &Rc<PipelineShared>) {
    let mut subs = Vec::with_capacity(3);

    let weak = Rc::downgrade(shared);
    subs.push(shared.source.subscribe(move |_| recompute_weak(&weak)));

    let weak = Rc::downgrade(shared);
    subs.push(shared.columns.subscribe(move |_| {
        if let Some(shared) = weak.upgrade() {
            rewire_columns(&shared);
            recompute(&shared);
        }
    }));

    let weak = Rc::downgrade(shared);
    subs.push(shared.configuration.subscribe(move |_| {
        if let Some(shared) = weak.upgrade() {
            rewire_configuration(&shared);
            recompute(&shared);
        }
    }));

    shared.wiring.borrow_mut().root_subs = subs;
}

/// Resubscribes to every reactive field of the current column set and
/// rebuilds the per-column filter debouncers, keeping the debouncer of any
/// column that survived the change.
fn rewire_columns(shared: &Rc<PipelineShared>) {
    let columns = shared.columns.get();

    let mut subs = Vec::with_capacity(columns.len() * 6);
    for column in &columns {
        let weak = Rc::downgrade(shared);
        subs.push(column.value.subscribe(move |_| recompute_weak(&weak)));
        let weak = Rc::downgrade(shared);
        subs.push(column.filter_enabled.subscribe(move |_| recompute_weak(&weak)));
        let weak = Rc::downgrade(shared);
        subs.push(column.filter_query.subscribe(move |_| recompute_weak(&weak)));
        let weak = Rc::downgrade(shared);
        subs.push(column.filter_function.subscribe(move |_| recompute_weak(&weak)));
        let weak = Rc::downgrade(shared);
        subs.push(column.sort_enabled.subscribe(move |_| recompute_weak(&weak)));
        let weak = Rc::downgrade(shared);
        subs.push(column.sort_comparator.subscribe(move |_| recompute_weak(&weak)));
    }

    let mut wiring = shared.wiring.borrow_mut();
    let mut old_debouncers = std::mem::take(&mut wiring.filter_debouncers);
    let mut debouncers = Vec::with_capacity(columns.len());
    for column in &columns {
        let debouncer = match old_debouncers
            .iter()
            .position(|(c, _)| Rc::ptr_eq(c, column))
        {
            Some(index) => old_debouncers.swap_remove(index).1,
            None => Debouncer::new(),
        };
        debouncers.push((Rc::clone(column), debouncer));
    }
    wiring.filter_debouncers = debouncers;
    wiring.column_subs = subs;
}

/// Resubscribes to the fields of the current configuration object.
fn rewire_configuration(shared: &Rc<PipelineShared>) {
    let config = shared.configuration.get();

    let mut subs = Vec::with_capacity(7);
    let weak = Rc::downgrade(shared);
    subs.push(config.filter_enabled.subscribe(move |_| recompute_weak(&weak)));
    let weak = Rc::downgrade(shared);
    subs.push(config.sort_enabled.subscribe(move |_| recompute_weak(&weak)));
    let weak = Rc::downgrade(shared);
    subs.push(config.pagination_enabled.subscribe(move |_| recompute_weak(&weak)));
    let weak = Rc::downgrade(shared);
    subs.push(config.page_size.subscribe(move |_| recompute_weak(&weak)));
    let weak = Rc::downgrade(shared);
    subs.push(config.active_page.subscribe(move |_| recompute_weak(&weak)));

    // Swapping the algorithm re-wires its state subscription too.
    let weak = Rc::downgrade(shared);
    subs.push(config.sort_algorithm.subscribe(move |_| {
        if let Some(shared) = weak.upgrade() {
            rewire_sort(&shared);
            recompute(&shared);
        }
    }));

    shared.wiring.borrow_mut().config_subs = subs;
}

fn rewire_sort(shared: &Rc<PipelineShared>) {
    let algorithm = shared.configuration.get().sort_algorithm.get();
    let weak = Rc::downgrade(shared);
    let sub = algorithm.subscribe_columns_sort_state(move |_| recompute_weak(&weak));
    shared.wiring.borrow_mut().sort_subs = vec![sub];
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{CellRenderer, ColumnDefinitionSource};
    use crate::config::TableConfigurationSource;
    use crate::value::record;
    use std::time::Duration;

    fn people() -> Vec<Record> {
        vec![
            record([
                ("name", CellValue::from("Carla")),
                ("age", CellValue::Int(35)),
            ]),
            record([
                ("name", CellValue::from("Alice")),
                ("age", CellValue::Int(30)),
            ]),
            record([
                ("name", CellValue::from("Bob")),
                ("age", CellValue::Int(25)),
            ]),
        ]
    }

    fn numbered_rows(n: usize) -> Vec<Record> {
        (0..n)
            .map(|i| record([("i", CellValue::Int(i as i64))]))
            .collect()
    }

    fn names(rows: &[Record]) -> Vec<String> {
        rows.iter()
            .map(|r| r.get("name").unwrap().display_string())
            .collect()
    }

    fn name_column() -> Rc<ColumnDefinition> {
        ColumnDefinitionSource::new()
            .title("Name")
            .value_key("name")
            .build()
    }

    fn age_column() -> Rc<ColumnDefinition> {
        ColumnDefinitionSource::new()
            .title("Age")
            .value_key("age")
            .renderer(CellRenderer::Number)
            .build()
    }

    #[test]
    fn test_passthrough_with_no_filters_or_sort() {
        let pipeline = TablePipeline::with(
            people(),
            vec![name_column(), age_column()],
            TableConfiguration::new(),
        );
        assert_eq!(names(&pipeline.processed_source()), vec!["Carla", "Alice", "Bob"]);
        assert_eq!(pipeline.amount_of_pages(), 1);
        assert_eq!(pipeline.active_page(), 1);
    }

    #[test]
    fn test_filter_stage() {
        let name = name_column();
        let pipeline = TablePipeline::with(
            people(),
            vec![Rc::clone(&name), age_column()],
            TableConfiguration::new(),
        );

        name.filter_query.set(CellValue::from("al"));
        assert_eq!(names(&pipeline.processed_source()), vec!["Alice"]);

        // Disabling the stage globally restores the full set without
        // touching the query.
        pipeline.configuration().filter_enabled.set(false);
        assert_eq!(names(&pipeline.processed_source()), vec!["Carla", "Alice", "Bob"]);
        pipeline.configuration().filter_enabled.set(true);
        assert_eq!(names(&pipeline.processed_source()), vec!["Alice"]);
    }

    #[test]
    fn test_multiple_column_filters_conjoin() {
        let name = name_column();
        let age = age_column();
        let pipeline = TablePipeline::with(
            people(),
            vec![Rc::clone(&name), Rc::clone(&age)],
            TableConfiguration::new(),
        );

        name.filter_query.set(CellValue::from("a"));
        age.filter_query.set(CellValue::from(">=30"));
        assert_eq!(names(&pipeline.processed_source()), vec!["Carla", "Alice"]);
    }

    #[test]
    fn test_toggle_column_sort_cycle() {
        let name = name_column();
        let pipeline = TablePipeline::with(
            people(),
            vec![Rc::clone(&name)],
            TableConfiguration::new(),
        );

        pipeline.toggle_column_sort(&name);
        assert_eq!(
            pipeline.columns_sort_direction().direction_for(&name),
            Some(SortDirection::Ascending)
        );
        assert_eq!(names(&pipeline.processed_source()), vec!["Alice", "Bob", "Carla"]);

        pipeline.toggle_column_sort(&name);
        assert_eq!(names(&pipeline.processed_source()), vec!["Carla", "Bob", "Alice"]);

        // Third toggle returns to the source order.
        pipeline.toggle_column_sort(&name);
        assert_eq!(
            pipeline.columns_sort_direction().direction_for(&name),
            Some(SortDirection::Default)
        );
        assert_eq!(names(&pipeline.processed_source()), vec!["Carla", "Alice", "Bob"]);
    }

    #[test]
    fn test_disabled_column_stays_at_default_direction() {
        let locked = ColumnDefinitionSource::new()
            .value_key("name")
            .sort_enabled(false)
            .build();
        let pipeline = TablePipeline::with(
            people(),
            vec![Rc::clone(&locked)],
            TableConfiguration::new(),
        );

        assert_eq!(
            pipeline.columns_sort_direction().direction_for(&locked),
            Some(SortDirection::Default)
        );
        // The click is dropped, not latched: the row order is untouched
        // and the effective direction stays Default.
        pipeline.toggle_column_sort(&locked);
        assert_eq!(names(&pipeline.processed_source()), vec!["Carla", "Alice", "Bob"]);
        assert_eq!(
            pipeline.columns_sort_direction().direction_for(&locked),
            Some(SortDirection::Default)
        );

        // Enabling the column afterwards must not resurrect the dropped
        // click; the rows stay in source order until a fresh toggle.
        locked.sort_enabled.set(true);
        assert_eq!(names(&pipeline.processed_source()), vec!["Carla", "Alice", "Bob"]);
        assert_eq!(
            pipeline.columns_sort_direction().direction_for(&locked),
            Some(SortDirection::Default)
        );

        // A column the pipeline does not know about has no entry at all.
        let stranger = name_column();
        assert_eq!(pipeline.columns_sort_direction().direction_for(&stranger), None);
    }

    #[test]
    fn test_global_sort_disabled_reads_default_and_passes_through() {
        let name = name_column();
        let pipeline = TablePipeline::with(
            people(),
            vec![Rc::clone(&name)],
            TableConfiguration::new(),
        );
        // Two toggles record Descending.
        pipeline.toggle_column_sort(&name);
        pipeline.toggle_column_sort(&name);
        assert_eq!(names(&pipeline.processed_source()), vec!["Carla", "Bob", "Alice"]);

        pipeline.configuration().sort_enabled.set(false);
        assert_eq!(
            pipeline.columns_sort_direction().direction_for(&name),
            Some(SortDirection::Default)
        );
        assert_eq!(names(&pipeline.processed_source()), vec!["Carla", "Alice", "Bob"]);

        // A click while globally disabled is dropped and must not
        // overwrite the recorded Descending state.
        pipeline.toggle_column_sort(&name);

        // Re-enabling restores the recorded sort state untouched.
        pipeline.configuration().sort_enabled.set(true);
        assert_eq!(
            pipeline.columns_sort_direction().direction_for(&name),
            Some(SortDirection::Descending)
        );
        assert_eq!(names(&pipeline.processed_source()), vec!["Carla", "Bob", "Alice"]);
    }

    #[test]
    fn test_reset_sort() {
        let name = name_column();
        let pipeline = TablePipeline::with(
            people(),
            vec![Rc::clone(&name)],
            TableConfiguration::new(),
        );
        pipeline.toggle_column_sort(&name);
        assert_eq!(names(&pipeline.processed_source()), vec!["Alice", "Bob", "Carla"]);

        pipeline.reset_sort();
        assert_eq!(names(&pipeline.processed_source()), vec!["Carla", "Alice", "Bob"]);
        assert_eq!(
            pipeline.columns_sort_direction().direction_for(&name),
            Some(SortDirection::Default)
        );
    }

    #[test]
    fn test_pagination_and_page_count() {
        let config = TableConfigurationSource::new().page_size(10).build();
        let pipeline = TablePipeline::with(numbered_rows(45), Vec::new(), config);

        assert_eq!(pipeline.amount_of_pages(), 5);
        assert_eq!(pipeline.processed_source().len(), 10);

        pipeline.change_page(ChangePageType::Last);
        assert_eq!(pipeline.active_page(), 5);
        assert_eq!(pipeline.processed_source().len(), 5);

        pipeline.change_page(ChangePageType::Next);
        assert_eq!(pipeline.active_page(), 5);

        pipeline.change_page(ChangePageType::Previous);
        assert_eq!(pipeline.active_page(), 4);

        pipeline.change_page(ChangePageType::First);
        assert_eq!(pipeline.active_page(), 1);
        pipeline.change_page(ChangePageType::Previous);
        assert_eq!(pipeline.active_page(), 1);

        // Direct configuration writes clamp too: zero, negative and
        // too-large values resolve to the nearest valid page.
        pipeline.configuration().active_page.set(0);
        assert_eq!(pipeline.active_page(), 1);
        pipeline.configuration().active_page.set(-2);
        assert_eq!(pipeline.active_page(), 1);
        pipeline.configuration().active_page.set(99);
        assert_eq!(pipeline.active_page(), 5);
    }

    #[test]
    fn test_page_size_fallback() {
        let config = TableConfigurationSource::new().page_size(0).build();
        let pipeline = TablePipeline::with(numbered_rows(45), Vec::new(), config);
        assert_eq!(pipeline.amount_of_pages(), 3);
        assert_eq!(pipeline.processed_source().len(), 20);
    }

    #[test]
    fn test_empty_source_has_one_page() {
        let pipeline = TablePipeline::new();
        assert_eq!(pipeline.amount_of_pages(), 1);
        assert_eq!(pipeline.active_page(), 1);
        assert!(pipeline.processed_source().is_empty());
    }

    #[test]
    fn test_active_page_clamps_when_rows_shrink() {
        let name = name_column();
        let config = TableConfigurationSource::new()
            .page_size(1)
            .active_page(3)
            .build();
        let pipeline = TablePipeline::with(people(), vec![Rc::clone(&name)], config);
        assert_eq!(pipeline.active_page(), 3);

        // The filter drops to one row, so the view snaps back to page 1
        // while the configured value stays put.
        name.filter_query.set(CellValue::from("bob"));
        assert_eq!(pipeline.active_page(), 1);
        assert_eq!(pipeline.configuration().active_page.get(), 3);
        assert_eq!(names(&pipeline.processed_source()), vec!["Bob"]);

        // Clearing the filter restores the configured page.
        name.filter_query.set(CellValue::from(""));
        assert_eq!(pipeline.active_page(), 3);
    }

    #[test]
    fn test_pagination_disabled_returns_all_rows() {
        let config = TableConfigurationSource::new()
            .page_size(10)
            .pagination_enabled(false)
            .build();
        let pipeline = TablePipeline::with(numbered_rows(45), Vec::new(), config);
        assert_eq!(pipeline.processed_source().len(), 45);
    }

    #[test]
    fn test_request_page_debounced() {
        let config = TableConfigurationSource::new()
            .page_size(10)
            .active_page_control_debounce_time(Duration::ZERO)
            .build();
        let pipeline = TablePipeline::with(numbered_rows(45), Vec::new(), config);

        pipeline.request_page("3");
        assert_eq!(pipeline.active_page(), 1);
        pipeline.tick();
        assert_eq!(pipeline.active_page(), 3);

        // Garbage, out-of-range and already-active inputs are dropped.
        pipeline.request_page("abc");
        pipeline.request_page("0");
        pipeline.request_page("6");
        pipeline.request_page("3");
        pipeline.tick();
        assert_eq!(pipeline.active_page(), 3);
    }

    #[test]
    fn test_request_filter_debounced() {
        let name = ColumnDefinitionSource::new()
            .value_key("name")
            .filter_debounce_time(Duration::ZERO)
            .build();
        let pipeline = TablePipeline::with(
            people(),
            vec![Rc::clone(&name)],
            TableConfiguration::new(),
        );

        pipeline.request_filter(&name, "al");
        assert_eq!(pipeline.processed_source().len(), 3);
        pipeline.tick();
        assert_eq!(names(&pipeline.processed_source()), vec!["Alice"]);
    }

    #[test]
    fn test_retyped_page_lands_after_button_navigation() {
        let config = TableConfigurationSource::new()
            .page_size(10)
            .active_page_control_debounce_time(Duration::ZERO)
            .build();
        let pipeline = TablePipeline::with(numbered_rows(45), Vec::new(), config);

        pipeline.request_page("3");
        pipeline.tick();
        assert_eq!(pipeline.active_page(), 3);

        // Navigate away with a button, then type the same page again; the
        // earlier committed value must not shadow the new request.
        pipeline.change_page(ChangePageType::Previous);
        assert_eq!(pipeline.active_page(), 2);
        pipeline.request_page("3");
        pipeline.tick();
        assert_eq!(pipeline.active_page(), 3);
    }

    #[test]
    fn test_retyped_filter_lands_after_direct_query_write() {
        let name = ColumnDefinitionSource::new()
            .value_key("name")
            .filter_debounce_time(Duration::ZERO)
            .build();
        let pipeline = TablePipeline::with(
            people(),
            vec![Rc::clone(&name)],
            TableConfiguration::new(),
        );

        pipeline.request_filter(&name, "al");
        pipeline.tick();
        assert_eq!(names(&pipeline.processed_source()), vec!["Alice"]);

        // The query is cleared through the cell directly, then the same
        // text is typed again.
        name.filter_query.set(CellValue::from(""));
        assert_eq!(pipeline.processed_source().len(), 3);
        pipeline.request_filter(&name, "al");
        pipeline.tick();
        assert_eq!(names(&pipeline.processed_source()), vec!["Alice"]);
    }

    #[test]
    fn test_cycle_checkbox_filter() {
        let rows = vec![
            record([("done", CellValue::Bool(true))]),
            record([("done", CellValue::Bool(false))]),
        ];
        let done = ColumnDefinitionSource::new()
            .value_key("done")
            .renderer(CellRenderer::Checkbox)
            .build();
        let pipeline = TablePipeline::with(rows, vec![Rc::clone(&done)], TableConfiguration::new());
        assert_eq!(pipeline.processed_source().len(), 2);

        pipeline.cycle_checkbox_filter(&done);
        assert_eq!(done.filter_query.get(), CellValue::Bool(true));
        assert_eq!(pipeline.processed_source().len(), 1);
        assert_eq!(
            pipeline.processed_source()[0].get("done"),
            Some(&CellValue::Bool(true))
        );

        pipeline.cycle_checkbox_filter(&done);
        assert_eq!(
            pipeline.processed_source()[0].get("done"),
            Some(&CellValue::Bool(false))
        );

        pipeline.cycle_checkbox_filter(&done);
        assert_eq!(done.filter_query.get(), CellValue::from(""));
        assert_eq!(pipeline.processed_source().len(), 2);
    }

    #[test]
    fn test_source_replacement_reprocesses() {
        let name = name_column();
        let pipeline = TablePipeline::with(
            people(),
            vec![Rc::clone(&name)],
            TableConfiguration::new(),
        );
        name.filter_query.set(CellValue::from("a"));
        assert_eq!(names(&pipeline.processed_source()), vec!["Carla", "Alice"]);

        pipeline.set_source(vec![
            record([("name", CellValue::from("Anna"))]),
            record([("name", CellValue::from("Zoe"))]),
        ]);
        assert_eq!(names(&pipeline.processed_source()), vec!["Anna"]);
    }

    #[test]
    fn test_subscription_emits_on_reprocess() {
        let name = name_column();
        let pipeline = TablePipeline::with(
            people(),
            vec![Rc::clone(&name)],
            TableConfiguration::new(),
        );

        let counts = Rc::new(RefCell::new(Vec::new()));
        let counts_clone = Rc::clone(&counts);
        let _sub = pipeline
            .subscribe_processed_source(move |rows| counts_clone.borrow_mut().push(rows.len()));
        assert_eq!(*counts.borrow(), vec![3]);

        name.filter_query.set(CellValue::from("bob"));
        assert_eq!(counts.borrow().last(), Some(&1));
    }

    #[test]
    fn test_processed_round_trip_is_deterministic() {
        let name = name_column();
        let pipeline = TablePipeline::with(
            people(),
            vec![Rc::clone(&name)],
            TableConfiguration::new(),
        );
        name.filter_query.set(CellValue::from("a"));
        pipeline.toggle_column_sort(&name);

        let first = names(&pipeline.processed_source());
        pipeline.set_source(pipeline.source());
        let second = names(&pipeline.processed_source());
        assert_eq!(first, second);
    }

    #[test]
    fn test_configuration_replacement_rewires() {
        let pipeline = TablePipeline::with(numbered_rows(30), Vec::new(), TableConfiguration::new());
        assert_eq!(pipeline.amount_of_pages(), 2);

        let replacement = TableConfigurationSource::new().page_size(5).build();
        pipeline.set_configuration(replacement.clone());
        assert_eq!(pipeline.amount_of_pages(), 6);

        // Fields of the new configuration are live.
        replacement.page_size.set(30);
        assert_eq!(pipeline.amount_of_pages(), 1);
    }
}
