use shared::category_rules::{is_drag_handle, MATCH_TEXT_FIELD, MATCH_TYPE_FIELD};
use shared::formset::field_id;
use shared::{CategoryForm, FormInstance};
use web_sys::{Element, HtmlInputElement};
use yew::prelude::*;

use super::hidden_fields::HiddenFields;
use super::rule_row::RuleRow;
use crate::hooks::use_category_rules::UseCategoryRulesActions;

#[derive(Properties, PartialEq)]
pub struct CategoryCardProps {
    pub category: FormInstance<CategoryForm>,
    /// Display position, used for drag-and-drop.
    pub position: usize,
    pub name_field: String,
    pub priority_field: String,
    pub hidden: Vec<(String, String)>,
    pub actions: UseCategoryRulesActions,
    pub on_drag_start: Callback<usize>,
    pub on_drop: Callback<usize>,
}

/// Walks from the pressed element up to its card; any control on the way
/// (an icon inside a button, say) disqualifies the press.
fn pressed_on_handle(target: Option<Element>) -> bool {
    let mut current = target;
    while let Some(element) = current {
        if !is_drag_handle(&element.tag_name()) {
            return false;
        }
        if element.matches(".category-card").unwrap_or(false) {
            break;
        }
        current = element.parent_element();
    }
    true
}

#[function_component(CategoryCard)]
pub fn category_card(props: &CategoryCardProps) -> Html {
    let category = &props.category;
    let index = category.index;
    let form = &category.data;
    let rules = &form.rules;
    let actions = &props.actions;

    // `dragstart` always targets the card itself, so the filter runs on the
    // element the press landed on.
    let press_is_handle = use_mut_ref(|| true);

    let onmousedown = {
        let press_is_handle = press_is_handle.clone();
        Callback::from(move |e: MouseEvent| {
            *press_is_handle.borrow_mut() = pressed_on_handle(e.target_dyn_into::<Element>());
        })
    };

    let ondragstart = {
        let on_drag_start = props.on_drag_start.clone();
        let position = props.position;
        Callback::from(move |e: DragEvent| {
            if !*press_is_handle.borrow() {
                e.prevent_default();
                return;
            }
            if let Some(transfer) = e.data_transfer() {
                transfer.set_effect_allowed("move");
                let _ = transfer.set_data("text/plain", &position.to_string());
            }
            on_drag_start.emit(position);
        })
    };

    let ondragover = Callback::from(|e: DragEvent| {
        e.prevent_default();
        if let Some(transfer) = e.data_transfer() {
            transfer.set_drop_effect("move");
        }
    });

    let ondrop = {
        let on_drop = props.on_drop.clone();
        let position = props.position;
        Callback::from(move |e: DragEvent| {
            e.prevent_default();
            on_drop.emit(position);
        })
    };

    let on_toggle = {
        let toggle_expand = actions.toggle_expand.clone();
        Callback::from(move |_: MouseEvent| toggle_expand.emit(index))
    };

    let on_name = {
        let set_category_name = actions.set_category_name.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            set_category_name.emit((index, input.value()));
        })
    };

    let on_delete = {
        let delete_category = actions.delete_category.clone();
        Callback::from(move |_: MouseEvent| delete_category.emit(index))
    };

    let on_add_rule = {
        let add_rule = actions.add_rule.clone();
        Callback::from(move |_: MouseEvent| add_rule.emit(index))
    };

    let rules_id = format!("rules-{}", rules.prefix);

    html! {
        <div
            class="card category-card mb-3"
            id={format!("category-card-{}", index)}
            style={if category.is_visible() { "" } else { "display: none" }}
            draggable="true"
            {onmousedown}
            {ondragstart}
            {ondragover}
            {ondrop}
        >
            <div class="card-header d-flex align-items-center gap-2">
                <HiddenFields fields={props.hidden.clone()} />
                <input
                    type="hidden"
                    name={props.priority_field.clone()}
                    id={field_id(&props.priority_field)}
                    value={form.priority.to_string()}
                />
                <button
                    type="button"
                    class={classes!("btn", "btn-link", "chevron", form.expanded.then_some("rotated"))}
                    aria-expanded={form.expanded.to_string()}
                    aria-controls={rules_id.clone()}
                    onclick={on_toggle}
                >
                    <i class="bi bi-chevron-right"></i>
                </button>
                <div class="flex-grow-1">
                    <input
                        type="text"
                        class={classes!("form-control", (!category.errors.is_empty()).then_some("is-invalid"))}
                        name={props.name_field.clone()}
                        id={field_id(&props.name_field)}
                        placeholder="Category name"
                        value={form.name.clone()}
                        oninput={on_name}
                    />
                    {for category.errors.iter().map(|message| html! {
                        <div class="invalid-feedback">{message}</div>
                    })}
                </div>
                <span class="badge text-bg-secondary" title="Rules">{rules.visible_count()}</span>
                <button
                    type="button"
                    class="btn btn-outline-danger category-delete"
                    title="Delete category"
                    data-bs-toggle="tooltip"
                    onclick={on_delete}
                >
                    <i class="bi bi-trash"></i>
                </button>
            </div>
            <div
                class={classes!("collapse", form.expanded.then_some("show"))}
                id={rules_id}
            >
                <div class="card-body">
                    <HiddenFields fields={rules.management_fields()} />
                    <div class="rules-wrapper">
                        {for rules.items().iter().map(|rule| {
                            let rule_index = rule.index;
                            let on_text = {
                                let set_rule_text = actions.set_rule_text.clone();
                                Callback::from(move |text: String| set_rule_text.emit((index, rule_index, text)))
                            };
                            let on_match_type = {
                                let set_rule_match_type = actions.set_rule_match_type.clone();
                                Callback::from(move |match_type| set_rule_match_type.emit((index, rule_index, match_type)))
                            };
                            let on_delete = {
                                let delete_rule = actions.delete_rule.clone();
                                Callback::from(move |_: ()| delete_rule.emit((index, rule_index)))
                            };
                            html! {
                                <RuleRow
                                    key={rule_index}
                                    rule={rule.clone()}
                                    text_name={rules.field_name(rule_index, MATCH_TEXT_FIELD)}
                                    type_name={rules.field_name(rule_index, MATCH_TYPE_FIELD)}
                                    hidden={rules.bookkeeping_fields(rule)}
                                    {on_text}
                                    {on_match_type}
                                    {on_delete}
                                />
                            }
                        })}
                    </div>
                    <button type="button" class="btn btn-outline-primary btn-sm" onclick={on_add_rule}>
                        <i class="bi bi-plus-lg"></i>{" Add rule"}
                    </button>
                </div>
            </div>
        </div>
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    use gloo::timers::future::sleep;
    use shared::CategoryRulesEditor;
    use wasm_bindgen::JsCast;
    use wasm_bindgen_test::*;
    use web_sys::{DragEventInit, HtmlElement, MouseEventInit};

    use super::*;

    wasm_bindgen_test_configure!(run_in_browser);

    const PAGE: &str = r#"{
        "initial_forms": 1,
        "categories": [
            {"pk": 3, "name": "Groceries", "rules": {"initial_forms": 1, "rules": [
                {"pk": 30, "match_text": "safeway"}
            ]}}
        ]
    }"#;

    fn actions() -> UseCategoryRulesActions {
        UseCategoryRulesActions {
            toggle_expand: Callback::noop(),
            add_rule: Callback::noop(),
            delete_rule: Callback::noop(),
            add_category: Callback::noop(),
            delete_category: Callback::noop(),
            move_category: Callback::noop(),
            set_category_name: Callback::noop(),
            set_rule_text: Callback::noop(),
            set_rule_match_type: Callback::noop(),
            set_preview_text: Callback::noop(),
        }
    }

    async fn render_card(started: Rc<RefCell<Vec<usize>>>) -> Element {
        let editor = CategoryRulesEditor::from_json(PAGE).unwrap();
        let category = editor.categories().items()[0].clone();
        let document = gloo::utils::document();
        let root = document.create_element("div").unwrap();
        document.body().unwrap().append_child(&root).unwrap();

        let props = CategoryCardProps {
            category,
            position: 0,
            name_field: "category_set-0-name".to_string(),
            priority_field: "category_set-0-priority".to_string(),
            hidden: Vec::new(),
            actions: actions(),
            on_drag_start: Callback::from(move |position| started.borrow_mut().push(position)),
            on_drop: Callback::noop(),
        };
        yew::Renderer::<CategoryCard>::with_root_and_props(root.clone(), props).render();
        sleep(Duration::from_millis(10)).await;
        root
    }

    fn press_then_drag(root: &Element, pressed: &str) {
        let mouse = MouseEventInit::new();
        mouse.set_bubbles(true);
        let down = web_sys::MouseEvent::new_with_mouse_event_init_dict("mousedown", &mouse).unwrap();
        let target = root.query_selector(pressed).unwrap().unwrap();
        target.dispatch_event(&down).unwrap();

        let drag = DragEventInit::new();
        drag.set_bubbles(true);
        drag.set_cancelable(true);
        let start = web_sys::DragEvent::new_with_event_init_dict("dragstart", &drag).unwrap();
        let card: HtmlElement = root.query_selector(".category-card").unwrap().unwrap().unchecked_into();
        card.dispatch_event(&start).unwrap();
    }

    #[wasm_bindgen_test]
    async fn test_drag_from_controls_is_cancelled() {
        let started = Rc::new(RefCell::new(Vec::new()));
        let root = render_card(started.clone()).await;

        for control in ["button.category-delete", "button.category-delete i", "input[type=text]", "select"] {
            press_then_drag(&root, control);
        }
        assert!(started.borrow().is_empty());
    }

    #[wasm_bindgen_test]
    async fn test_drag_from_card_header_starts() {
        let started = Rc::new(RefCell::new(Vec::new()));
        let root = render_card(started.clone()).await;

        press_then_drag(&root, ".card-header");
        assert_eq!(*started.borrow(), vec![0]);
    }
}
