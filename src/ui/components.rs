/// Reusable pieces of the swipe widget

use patternfly_yew::prelude::{Button, ButtonVariant};
use yew::prelude::*;

use crate::stack::SwipeDirection;

#[derive(Properties, PartialEq)]
pub struct ActionIndicatorsProps {
    #[prop_or_default]
    pub intent: Option<SwipeDirection>,
}

/// Like/pass badges previewed while dragging
#[function_component(ActionIndicators)]
pub fn action_indicators(props: &ActionIndicatorsProps) -> Html {
    let show = |direction: SwipeDirection| (props.intent == Some(direction)).then_some("show");

    html! {
        <>
            <div class={classes!("action-indicator", "like", show(SwipeDirection::Right))}>{"💚"}</div>
            <div class={classes!("action-indicator", "pass", show(SwipeDirection::Left))}>{"❌"}</div>
        </>
    }
}

#[derive(Properties, PartialEq)]
pub struct ActionButtonsProps {
    pub on_pass: Callback<MouseEvent>,
    pub on_back: Callback<MouseEvent>,
    pub on_like: Callback<MouseEvent>,
    #[prop_or(false)]
    pub busy: bool,
    #[prop_or(false)]
    pub can_swipe: bool,
    #[prop_or(false)]
    pub can_go_back: bool,
}

#[function_component(ActionButtons)]
pub fn action_buttons(props: &ActionButtonsProps) -> Html {
    let swipe_disabled = props.busy || !props.can_swipe;
    let back_disabled = props.busy || !props.can_go_back;

    html! {
        <div class="action-buttons">
            <button
                class="action-btn btn-pass"
                title="Pass"
                disabled={swipe_disabled}
                onclick={props.on_pass.clone()}
            >
                {"❌"}
            </button>
            <button
                class="action-btn btn-back"
                title="Go back"
                disabled={back_disabled}
                onclick={props.on_back.clone()}
            >
                {"↶"}
            </button>
            <button
                class="action-btn btn-like"
                title="Like"
                disabled={swipe_disabled}
                onclick={props.on_like.clone()}
            >
                {"💚"}
            </button>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct ResultsSectionProps {
    pub counter: String,
    #[prop_or_default]
    pub on_results: Option<Callback<MouseEvent>>,
}

/// Results button plus the swipe counter
#[function_component(ResultsSection)]
pub fn results_section(props: &ResultsSectionProps) -> Html {
    html! {
        <div class="results-section">
            if let Some(on_results) = props.on_results.clone() {
                <Button onclick={on_results} variant={ButtonVariant::Primary}>
                    {"📊 Get Results"}
                </Button>
            }
            <div class="swipe-counter">{&props.counter}</div>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct PlaceholderProps {
    pub title: String,
    pub message: String,
    #[prop_or_default]
    pub children: Children,
}

/// Full-card message shown instead of the stack
#[function_component(Placeholder)]
pub fn placeholder(props: &PlaceholderProps) -> Html {
    html! {
        <div class="no-more-cards">
            <h3>{&props.title}</h3>
            <p>{&props.message}</p>
            {props.children.clone()}
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct PillsProps {
    pub labels: Vec<String>,
}

/// Tag row under a card's description; renders nothing without labels
#[function_component(Pills)]
pub fn pills(props: &PillsProps) -> Html {
    if props.labels.is_empty() {
        return html! {};
    }

    html! {
        <div class="card-pills">
            {for props.labels.iter().map(|label| html! {
                <span class="card-pill">{label}</span>
            })}
        </div>
    }
}
