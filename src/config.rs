//! Table configuration.
//!
//! Mirrors the column definition pattern: every field is a reactive `Cell`
//! resolved once from a source object, and any field can be a shared cell
//! driven from outside. The pipeline subscribes to all of them and re-runs
//! the affected stage on change.

use crate::cell::Cell;
use crate::column::Setting;
use crate::sort::SortAlgorithm;
use std::time::Duration;

/// Page size used when the configured one is not positive.
pub const FALLBACK_PAGE_SIZE: i64 = 20;

/// Source object for a table configuration. Absent fields keep the
/// defaults.
#[derive(Default)]
pub struct TableConfigurationSource {
    pub filter_enabled: Option<Setting<bool>>,
    pub sort_enabled: Option<Setting<bool>>,
    pub sort_algorithm: Option<Setting<SortAlgorithm>>,
    pub pagination_enabled: Option<Setting<bool>>,
    pub page_size: Option<Setting<i64>>,
    pub active_page: Option<Setting<i64>>,
    pub active_page_control_debounce_time: Option<Setting<Duration>>,
}

impl TableConfigurationSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter_enabled(mut self, enabled: bool) -> Self {
        self.filter_enabled = Some(Setting::Value(enabled));
        self
    }

    pub fn filter_enabled_cell(mut self, cell: Cell<bool>) -> Self {
        self.filter_enabled = Some(Setting::Shared(cell));
        self
    }

    pub fn sort_enabled(mut self, enabled: bool) -> Self {
        self.sort_enabled = Some(Setting::Value(enabled));
        self
    }

    pub fn sort_enabled_cell(mut self, cell: Cell<bool>) -> Self {
        self.sort_enabled = Some(Setting::Shared(cell));
        self
    }

    pub fn sort_algorithm(mut self, algorithm: SortAlgorithm) -> Self {
        self.sort_algorithm = Some(Setting::Value(algorithm));
        self
    }

    pub fn sort_algorithm_cell(mut self, cell: Cell<SortAlgorithm>) -> Self {
        self.sort_algorithm = Some(Setting::Shared(cell));
        self
    }

    pub fn pagination_enabled(mut self, enabled: bool) -> Self {
        self.pagination_enabled = Some(Setting::Value(enabled));
        self
    }

    pub fn pagination_enabled_cell(mut self, cell: Cell<bool>) -> Self {
        self.pagination_enabled = Some(Setting::Shared(cell));
        self
    }

    pub fn page_size(mut self, size: i64) -> Self {
        self.page_size = Some(Setting::Value(size));
        self
    }

    pub fn page_size_cell(mut self, cell: Cell<i64>) -> Self {
        self.page_size = Some(Setting::Shared(cell));
        self
    }

    pub fn active_page(mut self, page: i64) -> Self {
        self.active_page = Some(Setting::Value(page));
        self
    }

    pub fn active_page_cell(mut self, cell: Cell<i64>) -> Self {
        self.active_page = Some(Setting::Shared(cell));
        self
    }

    pub fn active_page_control_debounce_time(mut self, time: Duration) -> Self {
        self.active_page_control_debounce_time = Some(Setting::Value(time));
        self
    }

    pub fn active_page_control_debounce_time_cell(mut self, cell: Cell<Duration>) -> Self {
        self.active_page_control_debounce_time = Some(Setting::Shared(cell));
        self
    }

    pub fn build(self) -> TableConfiguration {
        TableConfiguration::from_source(self)
    }
}

/// Reactive table-level settings. Cloning shares every underlying cell.
#[derive(Clone)]
pub struct TableConfiguration {
    pub filter_enabled: Cell<bool>,
    pub sort_enabled: Cell<bool>,
    pub sort_algorithm: Cell<SortAlgorithm>,
    pub pagination_enabled: Cell<bool>,
    pub page_size: Cell<i64>,
    pub active_page: Cell<i64>,
    pub active_page_control_debounce_time: Cell<Duration>,
}

impl TableConfiguration {
    /// Configuration with all defaults: every stage enabled, multi-column
    /// sorting, 20 rows per page, page 1 active.
    pub fn new() -> Self {
        Self::from_source(TableConfigurationSource::default())
    }

    pub fn from_source(source: TableConfigurationSource) -> Self {
        let filter_enabled = source
            .filter_enabled
            .map(Setting::into_cell)
            .unwrap_or_else(|| Cell::new(true));
        let sort_enabled = source
            .sort_enabled
            .map(Setting::into_cell)
            .unwrap_or_else(|| Cell::new(true));
        let sort_algorithm = source
            .sort_algorithm
            .map(Setting::into_cell)
            .unwrap_or_else(|| Cell::new(SortAlgorithm::default()));
        let pagination_enabled = source
            .pagination_enabled
            .map(Setting::into_cell)
            .unwrap_or_else(|| Cell::new(true));
        let page_size = source
            .page_size
            .map(Setting::into_cell)
            .unwrap_or_else(|| Cell::new(FALLBACK_PAGE_SIZE));
        let active_page = source
            .active_page
            .map(Setting::into_cell)
            .unwrap_or_else(|| Cell::new(1));
        let active_page_control_debounce_time = source
            .active_page_control_debounce_time
            .map(Setting::into_cell)
            .unwrap_or_else(|| Cell::new(Duration::from_millis(300)));

        TableConfiguration {
            filter_enabled,
            sort_enabled,
            sort_algorithm,
            pagination_enabled,
            page_size,
            active_page,
            active_page_control_debounce_time,
        }
    }

    /// Effective page size: the configured value when positive, the
    /// fallback otherwise.
    pub fn effective_page_size(&self) -> usize {
        let size = self.page_size.get();
        if size > 0 {
            size as usize
        } else {
            FALLBACK_PAGE_SIZE as usize
        }
    }
}

impl Default for TableConfiguration {
    fn default() -> Self {
        Self::new()
    }
}
