use shared::PreviewMatch;
use web_sys::HtmlInputElement;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct RulePreviewProps {
    pub text: String,
    pub result: Option<PreviewMatch>,
    pub on_text: Callback<String>,
}

/// Shows which category a sample description would land in.
#[function_component(RulePreview)]
pub fn rule_preview(props: &RulePreviewProps) -> Html {
    let oninput = {
        let on_text = props.on_text.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            on_text.emit(input.value());
        })
    };

    let outcome = if props.text.trim().is_empty() {
        html! { <span class="text-muted">{"Type a description to see where it would go."}</span> }
    } else {
        match &props.result {
            Some(found) => html! {
                <span class="text-success">
                    {"Matches "}<strong>{&found.category_name}</strong>
                    {format!(" (rule {})", found.rule_index + 1)}
                </span>
            },
            None => html! { <span class="text-warning">{"No rule matches."}</span> },
        }
    };

    html! {
        <div class="rule-preview card card-body mb-3">
            <label class="form-label" for="rule-preview-input">{"Try a description"}</label>
            <input
                type="text"
                class="form-control mb-2"
                id="rule-preview-input"
                value={props.text.clone()}
                {oninput}
            />
            {outcome}
        </div>
    }
}
