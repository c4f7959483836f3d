/// UI module exports
pub mod card_view;
pub mod components;
pub mod deck;
pub mod table;

pub use deck::{SwipeDeck, SwipeDeckProps};
