//! Column definitions.
//!
//! A `ColumnDefinition` describes how to extract, label, filter and compare
//! one attribute of every record. Every field is a reactive `Cell`, so
//! external code can either push values into a column or hand several
//! columns the same shared cell and drive them from one place.
//!
//! Columns are identified by reference: the pipeline and the sort
//! algorithms compare `Rc<ColumnDefinition>` handles by pointer, never by
//! title or position.

use crate::cell::Cell;
use crate::filter::{non_strict_filter, number_filter, strict_filter};
use crate::sort::default_comparator;
use crate::value::{CellValue, Record};
use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How a cell (and its filter input) is rendered by the consuming layer.
/// The pipeline only uses this to pick default filter behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellRenderer {
    Text,
    Number,
    Checkbox,
}

/// Calculates the cell value of a record for one column.
pub type ValueFn = Rc<dyn Fn(&Record) -> CellValue>;

/// Calculates extra CSS class names of a record for one column.
pub type ClassNamesFn = Rc<dyn Fn(&Record) -> String>;

/// Filter predicate: does this record match the column's current query?
pub type FilterFn = Rc<dyn Fn(&Record, &ColumnDefinition) -> bool>;

/// Orders two records by one column.
pub type SortComparatorFn = Rc<dyn Fn(&Record, &Record, &ColumnDefinition) -> Ordering>;

/// One configuration field of a source object: either a literal value or a
/// pre-built cell adopted by reference.
pub enum Setting<T> {
    Value(T),
    Shared(Cell<T>),
}

impl<T: Clone + 'static> Setting<T> {
    pub(crate) fn into_cell(self) -> Cell<T> {
        match self {
            Setting::Value(v) => Cell::new(v),
            Setting::Shared(cell) => cell,
        }
    }
}

/// The value accessor accepts one extra shape: a plain record key.
pub enum ValueSetting {
    Key(String),
    Computed(ValueFn),
    Shared(Cell<ValueFn>),
}

impl ValueSetting {
    fn into_cell(self) -> Cell<ValueFn> {
        match self {
            ValueSetting::Key(key) => {
                let accessor: ValueFn = Rc::new(move |record: &Record| {
                    record.get(&key).cloned().unwrap_or(CellValue::Null)
                });
                Cell::new(accessor)
            }
            ValueSetting::Computed(f) => Cell::new(f),
            ValueSetting::Shared(cell) => cell,
        }
    }
}

/// Source object for a new column definition. Absent fields keep the
/// class defaults.
#[derive(Default)]
pub struct ColumnDefinitionSource {
    pub title: Option<Setting<String>>,
    pub value: Option<ValueSetting>,
    pub class_names: Option<Setting<ClassNamesFn>>,
    pub renderer: Option<Setting<CellRenderer>>,
    pub filter_enabled: Option<Setting<bool>>,
    pub filter_renderer: Option<Setting<CellRenderer>>,
    pub filter_query: Option<Setting<CellValue>>,
    pub filter_function: Option<Setting<FilterFn>>,
    pub filter_debounce_time: Option<Setting<Duration>>,
    pub sort_comparator: Option<Setting<SortComparatorFn>>,
    pub sort_enabled: Option<Setting<bool>>,
}

impl ColumnDefinitionSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(Setting::Value(title.into()));
        self
    }

    pub fn title_cell(mut self, cell: Cell<String>) -> Self {
        self.title = Some(Setting::Shared(cell));
        self
    }

    /// Value accessor reading the given record key.
    pub fn value_key(mut self, key: impl Into<String>) -> Self {
        self.value = Some(ValueSetting::Key(key.into()));
        self
    }

    pub fn value_fn(mut self, f: impl Fn(&Record) -> CellValue + 'static) -> Self {
        self.value = Some(ValueSetting::Computed(Rc::new(f)));
        self
    }

    pub fn value_cell(mut self, cell: Cell<ValueFn>) -> Self {
        self.value = Some(ValueSetting::Shared(cell));
        self
    }

    pub fn class_names_fn(mut self, f: impl Fn(&Record) -> String + 'static) -> Self {
        self.class_names = Some(Setting::Value(Rc::new(f)));
        self
    }

    pub fn class_names_cell(mut self, cell: Cell<ClassNamesFn>) -> Self {
        self.class_names = Some(Setting::Shared(cell));
        self
    }

    pub fn renderer(mut self, renderer: CellRenderer) -> Self {
        self.renderer = Some(Setting::Value(renderer));
        self
    }

    pub fn renderer_cell(mut self, cell: Cell<CellRenderer>) -> Self {
        self.renderer = Some(Setting::Shared(cell));
        self
    }

    pub fn filter_enabled(mut self, enabled: bool) -> Self {
        self.filter_enabled = Some(Setting::Value(enabled));
        self
    }

    pub fn filter_enabled_cell(mut self, cell: Cell<bool>) -> Self {
        self.filter_enabled = Some(Setting::Shared(cell));
        self
    }

    pub fn filter_renderer(mut self, renderer: CellRenderer) -> Self {
        self.filter_renderer = Some(Setting::Value(renderer));
        self
    }

    pub fn filter_renderer_cell(mut self, cell: Cell<CellRenderer>) -> Self {
        self.filter_renderer = Some(Setting::Shared(cell));
        self
    }

    pub fn filter_query(mut self, query: impl Into<CellValue>) -> Self {
        self.filter_query = Some(Setting::Value(query.into()));
        self
    }

    pub fn filter_query_cell(mut self, cell: Cell<CellValue>) -> Self {
        self.filter_query = Some(Setting::Shared(cell));
        self
    }

    pub fn filter_function(
        mut self,
        f: impl Fn(&Record, &ColumnDefinition) -> bool + 'static,
    ) -> Self {
        self.filter_function = Some(Setting::Value(Rc::new(f)));
        self
    }

    pub fn filter_function_cell(mut self, cell: Cell<FilterFn>) -> Self {
        self.filter_function = Some(Setting::Shared(cell));
        self
    }

    pub fn filter_debounce_time(mut self, time: Duration) -> Self {
        self.filter_debounce_time = Some(Setting::Value(time));
        self
    }

    pub fn filter_debounce_time_cell(mut self, cell: Cell<Duration>) -> Self {
        self.filter_debounce_time = Some(Setting::Shared(cell));
        self
    }

    pub fn sort_comparator(
        mut self,
        f: impl Fn(&Record, &Record, &ColumnDefinition) -> Ordering + 'static,
    ) -> Self {
        self.sort_comparator = Some(Setting::Value(Rc::new(f)));
        self
    }

    pub fn sort_comparator_cell(mut self, cell: Cell<SortComparatorFn>) -> Self {
        self.sort_comparator = Some(Setting::Shared(cell));
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

    /// Resolves this source into a column wrapped for identity-by-reference
    /// use. Shorthand for `Rc::new(ColumnDefinition::from_source(self))`.
    pub fn build(self) -> Rc<ColumnDefinition> {
        Rc::new(ColumnDefinition::from_source(self))
    }
}

/// Per-column reactive state used by the pipeline to process and by the
/// consuming layer to display one attribute of every record.
pub struct ColumnDefinition {
    pub title: Cell<String>,
    pub value: Cell<ValueFn>,
    pub class_names: Cell<ClassNamesFn>,
    pub renderer: Cell<CellRenderer>,
    pub filter_enabled: Cell<bool>,
    pub filter_renderer: Cell<CellRenderer>,
    pub filter_query: Cell<CellValue>,
    pub filter_function: Cell<FilterFn>,
    pub filter_debounce_time: Cell<Duration>,
    pub sort_comparator: Cell<SortComparatorFn>,
    pub sort_enabled: Cell<bool>,
}

impl ColumnDefinition {
    /// Column with all defaults: empty title, constant-empty value accessor,
    /// text renderer, filtering and sorting enabled.
    pub fn new() -> Self {
        Self::from_source(ColumnDefinitionSource::default())
    }

    /// Resolves a source object once, at construction. A shared cell is
    /// adopted by reference, so later pushes from outside are observed.
    pub fn from_source(source: ColumnDefinitionSource) -> Self {
        let title = source
            .title
            .map(Setting::into_cell)
            .unwrap_or_else(|| Cell::new(String::new()));
        let value = source.value.map(ValueSetting::into_cell).unwrap_or_else(|| {
            let constant: ValueFn = Rc::new(|_: &Record| CellValue::String(String::new()));
            Cell::new(constant)
        });
        let class_names = source
            .class_names
            .map(Setting::into_cell)
            .unwrap_or_else(|| {
                let constant: ClassNamesFn = Rc::new(|_: &Record| String::new());
                Cell::new(constant)
            });
        let renderer = source
            .renderer
            .map(Setting::into_cell)
            .unwrap_or_else(|| Cell::new(CellRenderer::Text));
        let filter_enabled = source
            .filter_enabled
            .map(Setting::into_cell)
            .unwrap_or_else(|| Cell::new(true));
        // An unset filter renderer snapshots the column renderer's current
        // value instead of aliasing it.
        let filter_renderer = source
            .filter_renderer
            .map(Setting::into_cell)
            .unwrap_or_else(|| Cell::new(renderer.get()));
        let filter_query = source
            .filter_query
            .map(Setting::into_cell)
            .unwrap_or_else(|| Cell::new(CellValue::String(String::new())));
        let filter_function = source
            .filter_function
            .map(Setting::into_cell)
            .unwrap_or_else(|| Cell::new(default_filter_for(filter_renderer.get())));
        let filter_debounce_time = source
            .filter_debounce_time
            .map(Setting::into_cell)
            .unwrap_or_else(|| Cell::new(Duration::from_millis(300)));
        let sort_comparator = source
            .sort_comparator
            .map(Setting::into_cell)
            .unwrap_or_else(|| Cell::new(default_comparator()));
        let sort_enabled = source
            .sort_enabled
            .map(Setting::into_cell)
            .unwrap_or_else(|| Cell::new(true));

        ColumnDefinition {
            title,
            value,
            class_names,
            renderer,
            filter_enabled,
            filter_renderer,
            filter_query,
            filter_function,
            filter_debounce_time,
            sort_comparator,
            sort_enabled,
        }
    }

    /// Applies the current value accessor to a record.
    pub fn cell_value(&self, record: &Record) -> CellValue {
        (self.value.get())(record)
    }
}

impl Default for ColumnDefinition {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ColumnDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ColumnDefinition {{ title: '{}', renderer: {:?}, filter_enabled: {}, sort_enabled: {} }}",
            self.title.get(),
            self.renderer.get(),
            self.filter_enabled.get(),
            self.sort_enabled.get(),
        )
    }
}

/// Default filter predicate for a filter renderer kind.
fn default_filter_for(renderer: CellRenderer) -> FilterFn {
    match renderer {
        CellRenderer::Text => Rc::new(non_strict_filter),
        CellRenderer::Number => Rc::new(number_filter),
        CellRenderer::Checkbox => Rc::new(strict_filter),
    }
}
