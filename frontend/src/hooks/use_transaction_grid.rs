use shared::{CategoryOptions, Column, TransactionGrid};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::services::{api::ApiClient, logging::Logger, page};

const COMPONENT: &str = "table-editor";

#[derive(Clone, PartialEq)]
pub struct TransactionGridState {
    pub grid: TransactionGrid,
    pub loading: bool,
    pub saving: bool,
    pub error: Option<String>,
}

pub struct UseTransactionGridResult {
    pub state: TransactionGridState,
    pub actions: UseTransactionGridActions,
}

#[derive(Clone, PartialEq)]
pub struct UseTransactionGridActions {
    pub edit_category: Callback<(i64, String)>,
    pub set_override: Callback<(i64, bool)>,
    /// Row index and whether the click extends a range.
    pub click_row: Callback<(i64, bool)>,
    pub sort_by: Callback<Column>,
    pub confirm: Callback<()>,
    pub cancel: Callback<()>,
}

fn update<F>(grid: &UseStateHandle<TransactionGrid>, action: &str, edit: F)
where
    F: FnOnce(&mut TransactionGrid) -> shared::Result<()>,
{
    let mut next = (**grid).clone();
    match edit(&mut next) {
        Ok(()) => grid.set(next),
        Err(e) => Logger::warn_with_component(COMPONENT, &format!("{} rejected: {}", action, e)),
    }
}

/// Sends a save or cancel and follows the server's redirect. A failed
/// request only logs its status; the user can simply try again.
fn follow_response(result: Result<String, String>, saving: &UseStateHandle<bool>) {
    match result {
        Ok(url) => page::navigate(&url),
        Err(e) => {
            gloo::console::error!(e);
            saving.set(false);
        }
    }
}

#[hook]
pub fn use_transaction_grid(api_client: &ApiClient, options: &CategoryOptions) -> UseTransactionGridResult {
    let grid = use_state(|| TransactionGrid::new(Vec::new(), options.clone()));
    let loading = use_state(|| true);
    let saving = use_state(|| false);
    let error = use_state(|| Option::<String>::None);

    // Load rows on mount
    {
        let api_client = api_client.clone();
        let options = options.clone();
        let grid = grid.clone();
        let loading = loading.clone();
        let error = error.clone();
        use_effect_with((), move |_| {
            spawn_local(async move {
                match api_client.get_table_rows().await {
                    Ok(rows) => {
                        Logger::info_with_component(COMPONENT, &format!("loaded {} transactions", rows.len()));
                        grid.set(TransactionGrid::new(rows, options));
                    }
                    Err(e) => {
                        Logger::error_with_component(COMPONENT, &e);
                        error.set(Some(e));
                    }
                }
                loading.set(false);
            });
            || ()
        });
    }

    let edit_category = {
        let grid = grid.clone();
        Callback::from(move |(idx, name): (i64, String)| {
            update(&grid, "category edit", |g| g.edit_category(idx, &name));
        })
    };

    let set_override = {
        let grid = grid.clone();
        Callback::from(move |(idx, value): (i64, bool)| {
            update(&grid, "override edit", |g| g.set_override(idx, value));
        })
    };

    let click_row = {
        let grid = grid.clone();
        Callback::from(move |(idx, range): (i64, bool)| {
            update(&grid, "selection", |g| g.click_row(idx, range));
        })
    };

    let sort_by = {
        let grid = grid.clone();
        Callback::from(move |column: Column| {
            update(&grid, "sort", |g| {
                g.sort_by(column);
                Ok(())
            });
        })
    };

    let confirm = {
        let api_client = api_client.clone();
        let grid = grid.clone();
        let saving = saving.clone();
        Callback::from(move |_: ()| {
            let changes = match grid.changeset() {
                Ok(changes) => changes,
                Err(e) => {
                    Logger::error_with_component(COMPONENT, &format!("cannot build changes: {}", e));
                    return;
                }
            };
            Logger::info_with_component(
                COMPONENT,
                &format!("saving {} edits, {} deletions", changes.changes.len(), changes.deleted.len()),
            );
            let api_client = api_client.clone();
            let saving = saving.clone();
            saving.set(true);
            spawn_local(async move {
                let result = api_client.confirm_changes(&changes).await;
                follow_response(result, &saving);
            });
        })
    };

    let cancel = {
        let api_client = api_client.clone();
        let saving = saving.clone();
        Callback::from(move |_: ()| {
            let api_client = api_client.clone();
            let saving = saving.clone();
            saving.set(true);
            spawn_local(async move {
                let result = api_client.cancel_changes().await;
                follow_response(result, &saving);
            });
        })
    };

    UseTransactionGridResult {
        state: TransactionGridState {
            grid: (*grid).clone(),
            loading: *loading,
            saving: *saving,
            error: (*error).clone(),
        },
        actions: UseTransactionGridActions {
            edit_category,
            set_override,
            click_row,
            sort_by,
            confirm,
            cancel,
        },
    }
}
