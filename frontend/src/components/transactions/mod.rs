pub mod grid_actions;
pub mod transaction_table;

use shared::{dates, CategoryOptions};
use yew::prelude::*;

use crate::hooks::use_transaction_grid;
use crate::services::{api::ApiClient, logging::Logger, page::PageConfig, tooltips};
use grid_actions::GridActions;
use transaction_table::TransactionTable;

#[derive(Properties, PartialEq)]
pub struct TransactionEditorAppProps {
    pub page: PageConfig,
    pub options: CategoryOptions,
}

#[function_component(TransactionEditorApp)]
pub fn transaction_editor_app(props: &TransactionEditorAppProps) -> Html {
    let api_client = use_memo(props.page.clone(), |page| ApiClient::new(page));
    let tz = use_memo(props.page.editor.timezone.clone(), |name| {
        dates::parse_timezone(name).unwrap_or_else(|e| {
            Logger::warn_with_component("table-editor", &format!("{}, using {}", e, dates::DEFAULT_TIMEZONE));
            chrono_tz::America::Los_Angeles
        })
    });
    let grid = use_transaction_grid(&api_client, &props.options);
    let state = &grid.state;

    // Runs on mount for the page's own tooltips and again once rows arrive.
    use_effect_with(state.loading, |loading| {
        let bound = tooltips::init();
        Logger::debug_with_component(
            "table-editor",
            &format!("{} tooltips bound (loading: {})", bound, loading),
        );
        || ()
    });

    let body = if state.loading {
        html! { <div class="loading">{"Loading transactions..."}</div> }
    } else if let Some(error) = &state.error {
        html! { <div class="alert alert-danger">{error}</div> }
    } else if state.grid.rows().is_empty() {
        html! { <div class="empty-state">{"No transactions to review."}</div> }
    } else {
        html! {
            <TransactionTable
                grid={state.grid.clone()}
                tz={*tz}
                row_select_title={props.page.editor.row_select_title.clone()}
                actions={grid.actions.clone()}
            />
        }
    };

    html! {
        <section class="transactions-section">
            <GridActions
                edited={state.grid.edited_rows().len()}
                deleted={state.grid.selected_indices().len()}
                saving={state.saving}
                on_confirm={grid.actions.confirm.clone()}
                on_cancel={grid.actions.cancel.clone()}
            />
            {body}
        </section>
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use std::time::Duration;

    use gloo::timers::future::sleep;
    use shared::EditorConfig;
    use wasm_bindgen_test::*;

    use super::*;
    use crate::services::tooltips::test_support::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    async fn test_mount_binds_page_tooltips() {
        install_fake_bootstrap();
        let help = tooltip_element();

        let document = gloo::utils::document();
        let root = document.create_element("div").unwrap();
        document.body().unwrap().append_child(&root).unwrap();
        let page = PageConfig {
            editor: EditorConfig {
                page_url: "/no-such-page/".to_string(),
                ..EditorConfig::default()
            },
            csrf_token: "token".to_string(),
        };
        let options = CategoryOptions::from_json(r#"[[1, "Rent"]]"#).unwrap();
        yew::Renderer::<TransactionEditorApp>::with_root_and_props(
            root,
            TransactionEditorAppProps { page, options },
        )
        .render();
        sleep(Duration::from_millis(10)).await;

        assert!(has_tooltip(&help));
    }
}
