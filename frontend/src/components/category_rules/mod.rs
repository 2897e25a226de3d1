pub mod category_card;
pub mod hidden_fields;
pub mod rule_preview;
pub mod rule_row;

use shared::category_rules::{NAME_FIELD, PRIORITY_FIELD};
use shared::CategoryRulesEditor;
use yew::prelude::*;

use crate::hooks::use_category_rules;
use crate::services::{logging::Logger, tooltips};
use category_card::CategoryCard;
use hidden_fields::HiddenFields;
use rule_preview::RulePreview;

#[derive(Properties, PartialEq)]
pub struct CategoryRulesAppProps {
    pub editor: CategoryRulesEditor,
    pub csrf_token: String,
    /// Form action; the page posts back to itself.
    pub page_url: String,
}

/// Category and rule editor. Everything is one classic form post; the app
/// only keeps the formset fields consistent while the user edits.
#[function_component(CategoryRulesApp)]
pub fn category_rules_app(props: &CategoryRulesAppProps) -> Html {
    let rules = use_category_rules(&props.editor);
    let editor = &rules.state.editor;
    let actions = rules.actions.clone();
    let dragging = use_state(|| Option::<usize>::None);

    // Tooltips need to be attached after cards are on the page.
    let card_count = editor.categories().total_forms();
    use_effect_with(card_count, |count| {
        let bound = tooltips::init();
        Logger::debug_with_component(
            "category-rules",
            &format!("{} cards, {} tooltips bound", count, bound),
        );
        || ()
    });

    let on_drag_start = {
        let dragging = dragging.clone();
        Callback::from(move |position: usize| dragging.set(Some(position)))
    };

    let on_drop = {
        let dragging = dragging.clone();
        let move_category = actions.move_category.clone();
        Callback::from(move |position: usize| {
            if let Some(from) = *dragging {
                move_category.emit((from, position));
            }
            dragging.set(None);
        })
    };

    let on_add_category = {
        let add_category = actions.add_category.clone();
        Callback::from(move |_: MouseEvent| add_category.emit(()))
    };

    let onsubmit = {
        let problems = editor.validation_errors();
        Callback::from(move |e: SubmitEvent| {
            if !problems.is_empty() {
                e.prevent_default();
                for (category, rule, message) in &problems {
                    Logger::warn_with_component(
                        "category-rules",
                        &format!("category {} rule {}: {}", category, rule, message),
                    );
                }
            }
        })
    };

    let categories = editor.categories();
    let preview = editor.preview(&rules.state.preview_text);

    html! {
        <form method="post" action={props.page_url.clone()} class="category-rules" {onsubmit}>
            <input type="hidden" name="csrfmiddlewaretoken" value={props.csrf_token.clone()} />
            <HiddenFields fields={categories.management_fields()} />

            {for categories.non_form_errors.iter().map(|message| html! {
                <div class="alert alert-danger">{message}</div>
            })}

            <RulePreview
                text={rules.state.preview_text.clone()}
                result={preview}
                on_text={actions.set_preview_text.clone()}
            />

            <div class="category-list">
                {for categories.items().iter().enumerate().map(|(position, category)| html! {
                    <CategoryCard
                        key={category.index}
                        category={category.clone()}
                        {position}
                        name_field={categories.field_name(category.index, NAME_FIELD)}
                        priority_field={categories.field_name(category.index, PRIORITY_FIELD)}
                        hidden={categories.bookkeeping_fields(category)}
                        actions={actions.clone()}
                        on_drag_start={on_drag_start.clone()}
                        on_drop={on_drop.clone()}
                    />
                })}
            </div>

            <div class="d-flex gap-2">
                <button type="button" class="btn btn-outline-secondary" onclick={on_add_category}>
                    <i class="bi bi-plus-lg"></i>{" Add category"}
                </button>
                <button type="submit" class="btn btn-primary">{"Save"}</button>
            </div>
        </form>
    }
}
