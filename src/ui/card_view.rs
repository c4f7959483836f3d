/// Card faces: image cards and row cards outside table mode

use serde_json::Value;
use yew::prelude::*;

use crate::card::{display_value, ImageCard, RowCard};
use crate::ui::components::Pills;

#[derive(Properties, PartialEq)]
pub struct ImageCardViewProps {
    pub card: ImageCard,
}

#[function_component(ImageCardView)]
pub fn image_card_view(props: &ImageCardViewProps) -> Html {
    let broken = use_state(|| false);
    let card = &props.card;

    // A broken image is dropped and its space handed to the caption
    let onerror = {
        let broken = broken.clone();
        let src = card.image.clone();
        Callback::from(move |_: Event| {
            log::warn!("Image failed to load: {}", src);
            broken.set(true);
        })
    };

    html! {
        <>
            if !*broken {
                <img
                    src={card.image.clone()}
                    alt={card.name.clone()}
                    class="card-image"
                    draggable="false"
                    {onerror}
                />
            }
            <div class="card-content" style={(*broken).then_some("padding-top: 40px;")}>
                <h3 class="card-name">{&card.name}</h3>
                <p class="card-description">{&card.description}</p>
                <Pills labels={card.pill_labels()} />
            </div>
        </>
    }
}

#[derive(Properties, PartialEq)]
pub struct RowCardViewProps {
    pub card: RowCard,
}

/// A row card without a table to show it in: caption plus its fields
#[function_component(RowCardView)]
pub fn row_card_view(props: &RowCardViewProps) -> Html {
    let card = &props.card;

    html! {
        <div class="card-content row-card">
            <h3 class="card-name">{card.title()}</h3>
            <p class="card-description">{card.subtitle()}</p>
            <Pills labels={card.pill_labels()} />
            if let Value::Object(fields) = &card.data {
                <dl class="row-fields">
                    {for fields.iter().map(|(name, value)| html! {
                        <div key={name.clone()} class="row-field">
                            <dt>{name}</dt>
                            <dd>{display_value(value)}</dd>
                        </div>
                    })}
                </dl>
            }
        </div>
    }
}
