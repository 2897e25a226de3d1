use chrono_tz::Tz;
use shared::{Column, GridRow, SortDirection, TransactionGrid};
use web_sys::HtmlSelectElement;
use yew::prelude::*;

use crate::hooks::use_transaction_grid::UseTransactionGridActions;

#[derive(Properties, PartialEq)]
pub struct TransactionTableProps {
    pub grid: TransactionGrid,
    pub tz: Tz,
    pub row_select_title: String,
    pub actions: UseTransactionGridActions,
}

fn sort_marker(grid: &TransactionGrid, column: Column) -> &'static str {
    match grid.sort() {
        Some((sorted, SortDirection::Ascending)) if sorted == column => " \u{25b2}",
        Some((sorted, SortDirection::Descending)) if sorted == column => " \u{25bc}",
        _ => "",
    }
}

#[function_component(TransactionTable)]
pub fn transaction_table(props: &TransactionTableProps) -> Html {
    let grid = &props.grid;

    html! {
        <div class="table-container">
            <table class="table table-sm table-hover transactions-table">
                <thead>
                    <tr>
                        <th class="row-select">{&props.row_select_title}</th>
                        {for Column::ALL.iter().map(|column| {
                            let column = *column;
                            let sort_by = props.actions.sort_by.clone();
                            let onclick = Callback::from(move |_: MouseEvent| sort_by.emit(column));
                            html! {
                                <th class={classes!("sortable", column.field())} {onclick}>
                                    {column.title()}{sort_marker(grid, column)}
                                </th>
                            }
                        })}
                    </tr>
                </thead>
                <tbody>
                    {for grid.rows().iter().map(|row| html! {
                        <TransactionRowView
                            key={row.idx()}
                            row={row.clone()}
                            edited={Column::ALL.iter().filter(|c| grid.is_edited(row.idx(), **c)).copied().collect::<Vec<_>>()}
                            category_names={grid.options().names().to_vec()}
                            tz={props.tz}
                            actions={props.actions.clone()}
                        />
                    })}
                </tbody>
            </table>
        </div>
    }
}

#[derive(Properties, PartialEq)]
struct TransactionRowViewProps {
    row: GridRow,
    edited: Vec<Column>,
    category_names: Vec<String>,
    tz: Tz,
    actions: UseTransactionGridActions,
}

#[function_component(TransactionRowView)]
fn transaction_row_view(props: &TransactionRowViewProps) -> Html {
    let row = &props.row;
    let idx = row.idx();
    let current = &row.current;

    let on_select = {
        let click_row = props.actions.click_row.clone();
        Callback::from(move |e: MouseEvent| click_row.emit((idx, e.shift_key())))
    };

    let on_category = {
        let edit_category = props.actions.edit_category.clone();
        Callback::from(move |e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            edit_category.emit((idx, select.value()));
        })
    };

    let on_override = {
        let set_override = props.actions.set_override.clone();
        let value = !current.cat_o;
        Callback::from(move |_: MouseEvent| set_override.emit((idx, value)))
    };

    let cell_class = |column: Column| {
        classes!(
            column.field(),
            props.edited.contains(&column).then_some("edited")
        )
    };

    html! {
        <tr class={classes!(row.selected.then_some("table-danger"), row.selected.then_some("selected"))}>
            <td class="row-select" onclick={on_select}>
                <span class="row-select-mark">{if row.selected { "\u{2716}" } else { "" }}</span>
            </td>
            {for Column::ALL.iter().map(|column| {
                let column = *column;
                match column {
                    Column::Category => html! {
                        <td class={cell_class(column)}>
                            <select class="form-select form-select-sm" onchange={on_category.clone()}>
                                if !props.category_names.contains(&current.cat) {
                                    <option value={current.cat.clone()} selected=true>{&current.cat}</option>
                                }
                                {for props.category_names.iter().map(|name| html! {
                                    <option value={name.clone()} selected={*name == current.cat}>{name}</option>
                                })}
                            </select>
                        </td>
                    },
                    Column::Override => html! {
                        <td class={cell_class(column)}>
                            <button
                                type="button"
                                class={classes!("btn", "btn-sm", "btn-link", "override-toggle", current.cat_o.then_some("active"))}
                                aria-pressed={current.cat_o.to_string()}
                                onclick={on_override.clone()}
                            >
                                {column.display(current, props.tz)}
                            </button>
                        </td>
                    },
                    _ => html! {
                        <td class={cell_class(column)}>{column.display(current, props.tz)}</td>
                    },
                }
            })}
        </tr>
    }
}
