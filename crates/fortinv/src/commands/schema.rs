//! Schema handler: print the canonical column header.

use serde::Serialize;
use tabled::Tabled;

use fortinv_core::header;

use crate::cli::GlobalOpts;
use crate::output;

#[derive(Debug, Serialize)]
struct Column {
    index: usize,
    name: &'static str,
}

#[derive(Tabled)]
struct ColumnRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Column")]
    name: &'static str,
}

fn column_row(c: &Column) -> ColumnRow {
    ColumnRow {
        index: c.index,
        name: c.name,
    }
}

pub fn handle(global: &GlobalOpts) {
    let columns: Vec<Column> = header()
        .into_iter()
        .enumerate()
        .map(|(i, name)| Column {
            index: i + 1,
            name,
        })
        .collect();

    let out = output::render_list(&global.output, &columns, column_row, |c| {
        c.name.to_owned()
    });
    output::print_output(&out, global.quiet);
}
