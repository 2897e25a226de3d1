use shared::{CategoryRulesEditor, MatchType};
use yew::prelude::*;

use crate::services::{logging::Logger, page};

const COMPONENT: &str = "category-rules";

#[derive(Clone, PartialEq)]
pub struct CategoryRulesState {
    pub editor: CategoryRulesEditor,
    pub preview_text: String,
}

pub struct UseCategoryRulesResult {
    pub state: CategoryRulesState,
    pub actions: UseCategoryRulesActions,
}

#[derive(Clone, PartialEq)]
pub struct UseCategoryRulesActions {
    pub toggle_expand: Callback<usize>,
    pub add_rule: Callback<usize>,
    pub delete_rule: Callback<(usize, usize)>,
    pub add_category: Callback<()>,
    pub delete_category: Callback<usize>,
    pub move_category: Callback<(usize, usize)>,
    pub set_category_name: Callback<(usize, String)>,
    pub set_rule_text: Callback<(usize, usize, String)>,
    pub set_rule_match_type: Callback<(usize, usize, MatchType)>,
    pub set_preview_text: Callback<String>,
}

/// Applies an edit to a copy of the editor and stores it. Failed edits are
/// logged and leave the page untouched.
fn update<F>(editor: &UseStateHandle<CategoryRulesEditor>, action: &str, edit: F)
where
    F: FnOnce(&mut CategoryRulesEditor) -> shared::Result<()>,
{
    let mut next = (**editor).clone();
    match edit(&mut next) {
        Ok(()) => editor.set(next),
        Err(e) => Logger::error_with_component(COMPONENT, &format!("{} failed: {}", action, e)),
    }
}

#[hook]
pub fn use_category_rules(initial: &CategoryRulesEditor) -> UseCategoryRulesResult {
    let editor = use_state(|| initial.clone());
    let preview_text = use_state(String::new);

    // New rows and cards pull focus once they are on the page; the target
    // is consumed so it fires once.
    {
        let editor = editor.clone();
        let focus_target = editor.focus().map(str::to_string);
        use_effect_with(focus_target, move |target| {
            if let Some(id) = target {
                page::focus_element(id);
                let mut next = (*editor).clone();
                next.take_focus();
                editor.set(next);
            }
            || ()
        });
    }

    let toggle_expand = {
        let editor = editor.clone();
        Callback::from(move |category: usize| {
            update(&editor, "toggle", |e| e.toggle_expand(category));
        })
    };

    let add_rule = {
        let editor = editor.clone();
        Callback::from(move |category: usize| {
            update(&editor, "add rule", |e| e.add_rule(category, false).map(|_| ()));
        })
    };

    let delete_rule = {
        let editor = editor.clone();
        Callback::from(move |(category, rule): (usize, usize)| {
            update(&editor, "delete rule", |e| e.delete_rule(category, rule));
        })
    };

    let add_category = {
        let editor = editor.clone();
        Callback::from(move |_: ()| {
            update(&editor, "add category", |e| {
                let index = e.add_category()?;
                Logger::debug_with_component(COMPONENT, &format!("added category form {}", index));
                Ok(())
            });
        })
    };

    let delete_category = {
        let editor = editor.clone();
        Callback::from(move |category: usize| {
            update(&editor, "delete category", |e| e.delete_category(category));
        })
    };

    let move_category = {
        let editor = editor.clone();
        Callback::from(move |(from, to): (usize, usize)| {
            if from != to {
                update(&editor, "reorder", |e| e.move_category(from, to));
            }
        })
    };

    let set_category_name = {
        let editor = editor.clone();
        Callback::from(move |(category, name): (usize, String)| {
            update(&editor, "rename", |e| e.set_category_name(category, name));
        })
    };

    let set_rule_text = {
        let editor = editor.clone();
        Callback::from(move |(category, rule, text): (usize, usize, String)| {
            update(&editor, "edit rule", |e| e.set_rule_text(category, rule, text));
        })
    };

    let set_rule_match_type = {
        let editor = editor.clone();
        Callback::from(move |(category, rule, match_type): (usize, usize, MatchType)| {
            update(&editor, "edit rule", |e| e.set_rule_match_type(category, rule, match_type));
        })
    };

    let set_preview_text = {
        let preview_text = preview_text.clone();
        Callback::from(move |text: String| preview_text.set(text))
    };

    UseCategoryRulesResult {
        state: CategoryRulesState {
            editor: (*editor).clone(),
            preview_text: (*preview_text).clone(),
        },
        actions: UseCategoryRulesActions {
            toggle_expand,
            add_rule,
            delete_rule,
            add_category,
            delete_category,
            move_category,
            set_category_name,
            set_rule_text,
            set_rule_match_type,
            set_preview_text,
        },
    }
}
