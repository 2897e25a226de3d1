use anyhow::{anyhow, Context};
use shared::{CategoryOptions, CategoryRulesEditor};
use web_sys::Element;

mod components;
mod hooks;
mod services;

use components::category_rules::{CategoryRulesApp, CategoryRulesAppProps};
use components::transactions::{TransactionEditorApp, TransactionEditorAppProps};
use services::logging::Logger;
use services::page::{self, PageConfig};

const CATEGORY_RULES_ROOT: &str = "category-rules-root";
const CATEGORY_RULES_DATA: &str = "category-rules-data";
const TABLE_ROOT: &str = "txn-table-root";
const TABLE_OPTIONS: &str = "options";

fn mount_category_rules(root: Element, page: PageConfig) -> anyhow::Result<()> {
    let json = page::json_script(CATEGORY_RULES_DATA)
        .ok_or_else(|| anyhow!("missing #{} script", CATEGORY_RULES_DATA))?;
    let editor = CategoryRulesEditor::from_json(&json).context("invalid category data")?;
    Logger::info_with_component(
        "main",
        &format!("category editor with {} forms", editor.categories().total_forms()),
    );
    yew::Renderer::<CategoryRulesApp>::with_root_and_props(
        root,
        CategoryRulesAppProps {
            editor,
            csrf_token: page.csrf_token,
            page_url: page.editor.page_url,
        },
    )
    .render();
    Ok(())
}

fn mount_transaction_table(root: Element, page: PageConfig) -> anyhow::Result<()> {
    let json = page::json_script(TABLE_OPTIONS)
        .ok_or_else(|| anyhow!("missing #{} script", TABLE_OPTIONS))?;
    let options = CategoryOptions::from_json(&json).context("invalid category options")?;
    Logger::info_with_component("main", &format!("{} category options", options.names().len()));
    yew::Renderer::<TransactionEditorApp>::with_root_and_props(
        root,
        TransactionEditorAppProps { page, options },
    )
    .render();
    Ok(())
}

fn run() -> anyhow::Result<()> {
    let document = gloo::utils::document();
    if let Some(root) = document.get_element_by_id(CATEGORY_RULES_ROOT) {
        let page = PageConfig::from_root(&root);
        Logger::init(page.editor.log_level);
        return mount_category_rules(root, page);
    }
    if let Some(root) = document.get_element_by_id(TABLE_ROOT) {
        let page = PageConfig::from_root(&root);
        Logger::init(page.editor.log_level);
        return mount_transaction_table(root, page);
    }
    Logger::debug_with_component("main", "no editor root on this page");
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        Logger::error_with_component("main", &format!("{:#}", e));
    }
}
