//! Small end-to-end walk through the pipeline: build a grid, filter it,
//! sort it, and page through the result.
//!
//! Run with `cargo run --example basic_grid`.

use gridflow::*;
use std::rc::Rc;

fn print_rows(label: &str, rows: &[Record]) {
    println!("{label}:");
    for row in rows {
        let name = row.get("name").map(|v| v.display_string()).unwrap_or_default();
        let age = row.get("age").map(|v| v.display_string()).unwrap_or_default();
        println!("  {name:<10} {age}");
    }
}

fn main() {
    env_logger::init();

    let rows = vec![
        record([("name", CellValue::from("Carla")), ("age", CellValue::Int(35))]),
        record([("name", CellValue::from("Alice")), ("age", CellValue::Int(30))]),
        record([("name", CellValue::from("Bob")), ("age", CellValue::Int(25))]),
        record([("name", CellValue::from("Dave")), ("age", CellValue::Int(30))]),
        record([("name", CellValue::from("Erin")), ("age", CellValue::Int(28))]),
    ];

    let name = ColumnDefinitionSource::new()
        .title("Name")
        .value_key("name")
        .build();
    let age = ColumnDefinitionSource::new()
        .title("Age")
        .value_key("age")
        .renderer(CellRenderer::Number)
        .build();

    let config = TableConfigurationSource::new().page_size(3).build();
    let pipeline = TablePipeline::with(
        rows,
        vec![Rc::clone(&name), Rc::clone(&age)],
        config,
    );

    print_rows("initial", &pipeline.processed_source());

    age.filter_query.set(CellValue::from(">=28"));
    print_rows("age >= 28", &pipeline.processed_source());

    pipeline.toggle_column_sort(&name);
    print_rows("sorted by name", &pipeline.processed_source());
    for (column, direction) in pipeline.columns_sort_direction().iter() {
        println!("  sort: {} -> {:?}", column.title.get(), direction);
    }

    pipeline.change_page(ChangePageType::Next);
    println!(
        "page {}/{}",
        pipeline.active_page(),
        pipeline.amount_of_pages()
    );
    print_rows("next page", &pipeline.processed_source());
}
