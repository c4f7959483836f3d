/// Table cards: the whole dataset in the grid library, current row marked

use std::collections::HashMap;
use std::rc::Rc;

use serde::Serialize;
use serde_json::{Map, Value};
use web_sys::Element;
use yew::prelude::*;

use crate::bridge;
use crate::card::{RenderArgs, RowCard, TableData};
use crate::highlight::{CellStyle, HighlightIndex, RuleSet};
use crate::ui::components::Pills;

/// Everything `grid.js` needs to build one grid
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GridSpec<'a> {
    columns: &'a [String],
    rows: Vec<Map<String, Value>>,
    cell_styles: HashMap<String, CellStyle>,
    center_row: Option<usize>,
    center_column: Option<&'a str>,
}

impl<'a> GridSpec<'a> {
    fn new(
        table: &'a TableData,
        index: &HighlightIndex,
        center_row: Option<usize>,
        center_column: Option<&'a str>,
    ) -> GridSpec<'a> {
        let rows = table
            .rows
            .iter()
            .map(|row| {
                table
                    .columns
                    .iter()
                    .enumerate()
                    .map(|(i, col)| {
                        let value = match row.get(i) {
                            None | Some(Value::Null) => Value::String(String::new()),
                            Some(v) => v.clone(),
                        };
                        (col.clone(), value)
                    })
                    .collect()
            })
            .collect();

        GridSpec {
            columns: &table.columns,
            rows,
            cell_styles: index.keyed_by_field(table),
            center_row,
            center_column,
        }
    }
}

#[derive(Properties, PartialEq)]
pub struct TableCardProps {
    pub args: Rc<RenderArgs>,
    pub card: RowCard,
}

#[function_component(TableCard)]
pub fn table_card(props: &TableCardProps) -> Html {
    let grid_ref = use_node_ref();
    let fallback = use_state(|| false);

    let index = use_memo((props.args.clone(), props.card.clone()), |(args, card)| {
        args.table_data.as_ref().map(|table| {
            HighlightIndex::build(table, &RuleSet::for_card(args, card), Some(card.row_index))
        })
    });

    // Build the grid once the container is in the DOM; destroy it when the
    // card leaves the stack.
    {
        let grid_ref = grid_ref.clone();
        let fallback = fallback.clone();
        let index = index.clone();
        let args = props.args.clone();
        let card = props.card.clone();

        use_effect_with((), move |_| {
            let mut grid = None;
            let center_row = card
                .center_table_row
                .or(args.center_table_row)
                .or(Some(card.row_index));
            let center_column = card
                .center_table_column
                .as_deref()
                .or(args.center_table_column.as_deref());

            if let (Some(container), Some(table), Some(index)) = (
                grid_ref.cast::<Element>(),
                args.table_data.as_ref(),
                (*index).as_ref(),
            ) {
                let spec = GridSpec::new(table, index, center_row, center_column);
                match bridge::create_grid(&container, &spec) {
                    Ok(handle) => grid = Some(handle),
                    Err(e) => {
                        log::error!("Error creating grid for row {}: {}", card.row_index, e);
                        fallback.set(true);
                    }
                }
            }

            move || {
                if let Some(handle) = grid {
                    bridge::destroy_grid(&handle);
                }
            }
        });
    }

    html! {
        <>
            <div class={classes!("table-card-image", (*fallback).then_some("fallback"))}>
                if *fallback {
                    <FallbackTable args={props.args.clone()} index={index.clone()} />
                } else {
                    <div class="ag-grid-container ag-theme-alpine" ref={grid_ref} />
                }
            </div>
            <div class="card-content">
                <h3 class="card-name">{props.card.title()}</h3>
                <p class="card-description">{props.card.subtitle()}</p>
                <Pills labels={props.card.pill_labels()} />
            </div>
        </>
    }
}

#[derive(Properties, PartialEq)]
struct FallbackTableProps {
    args: Rc<RenderArgs>,
    index: Rc<Option<HighlightIndex>>,
}

/// Plain HTML table used when the grid library is unavailable
#[function_component(FallbackTable)]
fn fallback_table(props: &FallbackTableProps) -> Html {
    let Some(table) = props.args.table_data.as_ref() else {
        return html! {};
    };
    let index = (*props.index).as_ref();

    html! {
        <table class="data-table fallback-table">
            <thead>
                <tr>
                    {for table.columns.iter().map(|col| html! { <th>{col}</th> })}
                </tr>
            </thead>
            <tbody>
                {for (0..table.rows.len()).map(|r| {
                    let is_current = index.and_then(|i| i.current_row()) == Some(r);
                    html! {
                        <tr class={classes!(is_current.then_some("current-row"))}>
                            {for (0..table.columns.len()).map(|c| {
                                let style = index.and_then(|i| i.style(r, c)).map(CellStyle::to_css);
                                html! { <td style={style}>{table.cell_text(r, c)}</td> }
                            })}
                        </tr>
                    }
                })}
            </tbody>
        </table>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{ColumnRef, HighlightRule};
    use serde_json::json;

    fn create_test_table() -> TableData {
        TableData {
            columns: vec!["name".to_string(), "age".to_string()],
            rows: vec![vec![json!("Alice"), json!(28)], vec![json!("Bob")]],
            total_rows: None,
            total_columns: None,
        }
    }

    #[test]
    fn test_grid_spec_serialization() {
        let table = create_test_table();
        let rules = RuleSet {
            cells: vec![HighlightRule {
                row: Some(0),
                column: Some(ColumnRef::from("age")),
                color: Some("#FF0000".to_string()),
            }],
            ..RuleSet::default()
        };
        let index = HighlightIndex::build(&table, &rules, Some(1));

        let spec = GridSpec::new(&table, &index, Some(1), Some("age"));
        let json = serde_json::to_value(&spec).unwrap();

        assert_eq!(json["columns"], json!(["name", "age"]));
        assert_eq!(json["rows"][0], json!({"name": "Alice", "age": 28}));
        assert_eq!(json["rows"][1], json!({"name": "Bob", "age": ""}));
        assert_eq!(json["cellStyles"]["0:age"]["backgroundColor"], "#FF0000");
        assert_eq!(json["cellStyles"]["0:age"]["fontWeight"], "bold");
        assert!(json["cellStyles"]["0:name"].is_null());
        assert_eq!(json["cellStyles"]["1:name"]["backgroundColor"], "rgba(0, 123, 255, 0.1)");
        assert_eq!(json["centerRow"], 1);
        assert_eq!(json["centerColumn"], "age");
    }
}
