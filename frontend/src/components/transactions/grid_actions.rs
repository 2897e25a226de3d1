use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct GridActionsProps {
    pub edited: usize,
    pub deleted: usize,
    pub saving: bool,
    pub on_confirm: Callback<()>,
    pub on_cancel: Callback<()>,
}

/// Confirm and cancel buttons with a summary of what a save would send.
#[function_component(GridActions)]
pub fn grid_actions(props: &GridActionsProps) -> Html {
    let on_confirm = {
        let on_confirm = props.on_confirm.clone();
        Callback::from(move |_: MouseEvent| on_confirm.emit(()))
    };
    let on_cancel = {
        let on_cancel = props.on_cancel.clone();
        Callback::from(move |_: MouseEvent| on_cancel.emit(()))
    };

    html! {
        <div class="grid-actions d-flex align-items-center gap-2 my-3">
            <button type="button" class="btn btn-success" disabled={props.saving} onclick={on_confirm}>
                {"Confirm"}
            </button>
            <button type="button" class="btn btn-outline-danger" disabled={props.saving} onclick={on_cancel}>
                {"Cancel"}
            </button>
            <span class="text-muted small">
                {format!("{} edited, {} marked for deletion", props.edited, props.deleted)}
            </span>
        </div>
    }
}
