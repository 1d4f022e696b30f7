/// GridFlow - Reactive Data-Grid Processing Pipeline
///
/// A reactive data-grid processing library: observable cells, column
/// definitions with per-column filtering and sorting, table configuration,
/// and a filter -> sort -> paginate pipeline that recomputes its output
/// whenever any input changes.

pub mod cell;
pub mod column;
pub mod config;
pub mod debounce;
pub mod filter;
pub mod pipeline;
pub mod sort;
pub mod value;

pub use cell::{Cell, Subscription};
pub use column::{
    CellRenderer, ClassNamesFn, ColumnDefinition, ColumnDefinitionSource, FilterFn, Setting,
    SortComparatorFn, ValueFn, ValueSetting,
};
pub use config::{TableConfiguration, TableConfigurationSource, FALLBACK_PAGE_SIZE};
pub use debounce::Debouncer;
pub use filter::{non_strict_filter, number_filter, strict_filter};
pub use pipeline::{ChangePageType, SortDirectionMap, TablePipeline};
pub use sort::{
    compare_values, default_comparator, stable_sort, ColumnSortState, MultiColumnSort,
    SingleColumnSort, SortAlgorithm, SortDirection,
};
pub use value::{record, record_from_json, CellValue, Record};

#[cfg(test)]
mod integration_tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn test_complete_workflow() {
        // An inventory grid: name, quantity, price and a computed total.
        let rows = vec![
            record([
                ("product", CellValue::from("Widget")),
                ("quantity", CellValue::Int(10)),
                ("price", CellValue::Float(9.99)),
            ]),
            record([
                ("product", CellValue::from("Gadget")),
                ("quantity", CellValue::Int(5)),
                ("price", CellValue::Float(19.99)),
            ]),
            record([
                ("product", CellValue::from("Doohickey")),
                ("quantity", CellValue::Int(15)),
                ("price", CellValue::Float(4.99)),
            ]),
        ];

        let product = ColumnDefinitionSource::new()
            .title("Product")
            .value_key("product")
            .build();
        let quantity = ColumnDefinitionSource::new()
            .title("Quantity")
            .value_key("quantity")
            .renderer(CellRenderer::Number)
            .build();
        let total = ColumnDefinitionSource::new()
            .title("Total")
            .value_fn(|row| {
                let quantity = row.get("quantity").map(|v| v.to_number()).unwrap_or(0.0);
                let price = row.get("price").map(|v| v.to_number()).unwrap_or(0.0);
                CellValue::Float(quantity * price)
            })
            .renderer(CellRenderer::Number)
            .build();

        let pipeline = TablePipeline::with(
            rows,
            vec![Rc::clone(&product), Rc::clone(&quantity), Rc::clone(&total)],
            TableConfiguration::new(),
        );

        // Computed column values are readable through the pipeline.
        let first = &pipeline.source()[0];
        let value = pipeline.get_cell_value(first, &total);
        assert!((value.to_number() - 99.90).abs() < 0.01);

        // Sort by the computed total, descending.
        pipeline.toggle_column_sort(&total);
        pipeline.toggle_column_sort(&total);
        let products: Vec<String> = pipeline
            .processed_source()
            .iter()
            .map(|r| r.get("product").unwrap().display_string())
            .collect();
        assert_eq!(products, vec!["Gadget", "Widget", "Doohickey"]);

        // Filter down by quantity, keeping the sort.
        quantity.filter_query.set(CellValue::from(">=10"));
        let products: Vec<String> = pipeline
            .processed_source()
            .iter()
            .map(|r| r.get("product").unwrap().display_string())
            .collect();
        assert_eq!(products, vec!["Widget", "Doohickey"]);
    }
}
