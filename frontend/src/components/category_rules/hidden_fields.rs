use shared::formset::field_id;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct HiddenFieldsProps {
    pub fields: Vec<(String, String)>,
}

/// Management counters and per-form bookkeeping inputs.
#[function_component(HiddenFields)]
pub fn hidden_fields(props: &HiddenFieldsProps) -> Html {
    html! {
        <>
            {for props.fields.iter().map(|(name, value)| {
                html! {
                    <input
                        type="hidden"
                        name={name.clone()}
                        id={field_id(name)}
                        value={value.clone()}
                    />
                }
            })}
        </>
    }
}
