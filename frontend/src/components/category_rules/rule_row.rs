use shared::formset::field_id;
use shared::{FormInstance, MatchType, RuleForm};
use web_sys::{HtmlInputElement, HtmlSelectElement};
use yew::prelude::*;

use super::hidden_fields::HiddenFields;

#[derive(Properties, PartialEq)]
pub struct RuleRowProps {
    pub rule: FormInstance<RuleForm>,
    pub text_name: String,
    pub type_name: String,
    /// `id`, parent key and `DELETE`.
    pub hidden: Vec<(String, String)>,
    pub on_text: Callback<String>,
    pub on_match_type: Callback<MatchType>,
    pub on_delete: Callback<()>,
}

#[function_component(RuleRow)]
pub fn rule_row(props: &RuleRowProps) -> Html {
    let rule = &props.rule;
    let problem = rule.data.validate();
    let invalid = problem.is_some() || !rule.errors.is_empty();

    let oninput = {
        let on_text = props.on_text.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            on_text.emit(input.value());
        })
    };

    let onchange = {
        let on_match_type = props.on_match_type.clone();
        Callback::from(move |e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            if let Ok(match_type) = select.value().parse::<MatchType>() {
                on_match_type.emit(match_type);
            }
        })
    };

    let ondelete = {
        let on_delete = props.on_delete.clone();
        Callback::from(move |_: MouseEvent| on_delete.emit(()))
    };

    html! {
        <div
            class="rule-row d-flex align-items-start gap-2 mb-2"
            style={if rule.is_visible() { "display: flex" } else { "display: none" }}
        >
            <HiddenFields fields={props.hidden.clone()} />
            <select
                class="form-select rule-match-type"
                name={props.type_name.clone()}
                id={field_id(&props.type_name)}
                {onchange}
            >
                {for MatchType::ALL.iter().map(|match_type| html! {
                    <option
                        value={match_type.as_str()}
                        selected={*match_type == rule.data.match_type}
                    >
                        {match_type.label()}
                    </option>
                })}
            </select>
            <div class="flex-grow-1">
                <input
                    type="text"
                    class={classes!("form-control", invalid.then_some("is-invalid"))}
                    name={props.text_name.clone()}
                    id={field_id(&props.text_name)}
                    value={rule.data.match_text.clone()}
                    {oninput}
                />
                {for rule.errors.iter().chain(problem.iter()).map(|message| html! {
                    <div class="invalid-feedback">{message}</div>
                })}
            </div>
            <button
                type="button"
                class="btn btn-outline-danger rule-delete"
                title="Delete rule"
                data-bs-toggle="tooltip"
                onclick={ondelete}
            >
                <i class="bi bi-x-lg"></i>
            </button>
        </div>
    }
}
