/// The swipe deck: card stack, drag handling, buttons and results

use std::rc::Rc;

use wasm_bindgen_futures::spawn_local;
use web_sys::{Element, PointerEvent};
use yew::prelude::*;

use crate::bridge;
use crate::card::{Card, DisplayMode, RenderArgs};
use crate::error::describe;
use crate::stack::{CardStack, Point, StackAction, SwipeDirection, SwipeResults, SETTLE_DELAY_MS};
use crate::ui::card_view::{ImageCardView, RowCardView};
use crate::ui::components::{ActionButtons, ActionIndicators, Placeholder, ResultsSection};
use crate::ui::table::TableCard;

const POSITION_CLASSES: [&str; 3] = ["card-front", "card-second", "card-third"];

impl Reducible for CardStack {
    type Action = StackAction;

    fn reduce(self: Rc<Self>, action: StackAction) -> Rc<Self> {
        let mut next = (*self).clone();
        if !next.apply(action) {
            return self;
        }

        match action {
            StackAction::Settle => {
                if let Some(last) = next.last_action() {
                    log::info!(
                        "Swiped card {} {:?}; {} remaining",
                        last.card_index,
                        last.action,
                        next.remaining()
                    );
                }
            }
            StackAction::Back => log::info!("Went back to card {}", next.cursor()),
            StackAction::Release => log::debug!("Released front card: {:?}", next.phase()),
            _ => {}
        }

        Rc::new(next)
    }
}

#[derive(Properties, PartialEq)]
pub struct SwipeDeckProps {
    pub args: Rc<RenderArgs>,
    pub on_results: Callback<SwipeResults>,
}

#[function_component(SwipeDeck)]
pub fn swipe_deck(props: &SwipeDeckProps) -> Html {
    let stack = use_reducer({
        let args = props.args.clone();
        move || CardStack::new(args.cards.clone())
    });
    let front_ref = use_node_ref();

    // A committed swipe settles after the animation delay. New gestures are
    // refused until then.
    {
        let dispatcher = stack.dispatcher();
        use_effect_with((stack.animating(), stack.cursor()), move |(animating, _)| {
            if animating.is_some() {
                spawn_local(async move {
                    bridge::sleep(SETTLE_DELAY_MS).await;
                    dispatcher.dispatch(StackAction::Settle);
                });
            }
            || ()
        });
    }

    let container_class = classes!(
        "swipe-container",
        (props.args.display_mode == DisplayMode::Table).then_some("table-mode")
    );

    if stack.is_empty() {
        return html! {
            <div class={container_class}>
                <Placeholder
                    title={"📱 No Cards Available"}
                    message={"Please provide card data to start swiping!"}
                >
                    <ResultsSection counter={"Ready to swipe when you add cards"} />
                </Placeholder>
            </div>
        };
    }

    let on_pointer_down = {
        let stack = stack.clone();
        let front_ref = front_ref.clone();
        Callback::from(move |e: PointerEvent| {
            e.prevent_default();
            if let Some(card) = front_ref.cast::<Element>() {
                if let Err(err) = card.set_pointer_capture(e.pointer_id()) {
                    log::warn!("Could not capture pointer: {}", describe(&err));
                }
            }
            stack.dispatch(StackAction::Press(pointer_position(&e)));
        })
    };

    let on_pointer_move = {
        let stack = stack.clone();
        Callback::from(move |e: PointerEvent| {
            if stack.drag().is_some() {
                e.prevent_default();
                stack.dispatch(StackAction::Move(pointer_position(&e)));
            }
        })
    };

    let on_pointer_up = {
        let stack = stack.clone();
        Callback::from(move |_: PointerEvent| {
            stack.dispatch(StackAction::Release);
        })
    };

    let on_swipe = |direction: SwipeDirection| {
        let stack = stack.clone();
        Callback::from(move |_: MouseEvent| {
            stack.dispatch(StackAction::Swipe(direction));
        })
    };

    let on_back = {
        let stack = stack.clone();
        Callback::from(move |_: MouseEvent| {
            stack.dispatch(StackAction::Back);
        })
    };

    let on_results = {
        let stack = stack.clone();
        let on_results = props.on_results.clone();
        Callback::from(move |_: MouseEvent| {
            on_results.emit(stack.results());
        })
    };

    let busy = stack.animating().is_some();
    let buttons = html! {
        <ActionButtons
            on_pass={on_swipe(SwipeDirection::Left)}
            on_back={on_back}
            on_like={on_swipe(SwipeDirection::Right)}
            busy={busy}
            can_swipe={stack.front().is_some()}
            can_go_back={!stack.history().is_empty()}
        />
    };

    if stack.is_exhausted() {
        return html! {
            <div class={container_class}>
                <Placeholder title={"🎉 All done!"} message={"No more cards to swipe"}>
                    {buttons}
                    <ResultsSection
                        counter={format!("Total swiped: {}", stack.history().len())}
                        on_results={on_results}
                    />
                </Placeholder>
            </div>
        };
    }

    let cards = stack
        .visible()
        .map(|(index, card)| {
            let position = index - stack.cursor();
            let body = card_body(card, &props.args);

            if position == 0 {
                let drag = stack.drag();
                let class = classes!(
                    "swipe-card",
                    POSITION_CLASSES[0],
                    drag.is_some().then_some("dragging"),
                    stack.animating().map(|d| format!("swiped-{}", d.as_str()))
                );
                let style = drag.map(|d| format!("transform: {};", d.transform()));

                html! {
                    <div
                        key={index}
                        class={class}
                        style={style}
                        data-index={index.to_string()}
                        ref={front_ref.clone()}
                        onpointerdown={on_pointer_down.clone()}
                        onpointermove={on_pointer_move.clone()}
                        onpointerup={on_pointer_up.clone()}
                        onpointercancel={on_pointer_up.clone()}
                    >
                        {body}
                        <ActionIndicators intent={drag.and_then(|d| d.intent())} />
                    </div>
                }
            } else {
                html! {
                    <div
                        key={index}
                        class={classes!("swipe-card", POSITION_CLASSES[position])}
                        data-index={index.to_string()}
                    >
                        {body}
                        <ActionIndicators />
                    </div>
                }
            }
        })
        .collect::<Html>();

    html! {
        <div class={container_class}>
            <div class="cards-stack">
                {cards}
            </div>
            {buttons}
            <ResultsSection
                counter={format!(
                    "Swiped: {} | Remaining: {}",
                    stack.history().len(),
                    stack.remaining()
                )}
                on_results={on_results}
            />
        </div>
    }
}

/// Face of one card for the current display mode
fn card_body(card: &Card, args: &Rc<RenderArgs>) -> Html {
    match card {
        Card::Image(image) => html! { <ImageCardView card={image.clone()} /> },
        Card::Row(row) if args.display_mode == DisplayMode::Table && args.table_data.is_some() => {
            html! { <TableCard args={args.clone()} card={row.clone()} /> }
        }
        Card::Row(row) => html! { <RowCardView card={row.clone()} /> },
    }
}

fn pointer_position(e: &PointerEvent) -> Point {
    Point::new(f64::from(e.client_x()), f64::from(e.client_y()))
}
