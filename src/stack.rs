/// Card stack lifecycle and the swipe gesture state machine
///
/// The stack owns the deck, a cursor into it, the history of committed
/// swipes and the current gesture phase. `cursor == history.len()` holds
/// after every operation.
use std::rc::Rc;

use serde::Serialize;

use crate::card::Card;

/// Released horizontal displacement needed to commit a swipe
pub const SWIPE_THRESHOLD: f64 = 100.0;
/// Horizontal displacement at which like/pass intent is previewed
pub const INTENT_THRESHOLD: f64 = 50.0;
/// Degrees of rotation per pixel of horizontal drag
pub const ROTATION_PER_PX: f64 = 0.1;
/// Delay between a committed swipe and the stack advancing
pub const SETTLE_DELAY_MS: i32 = 300;
/// How many cards are rendered at once
pub const VISIBLE_CARDS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SwipeDirection {
    Left,
    Right,
}

impl SwipeDirection {
    /// Direction of a released drag, if it travelled far enough
    pub fn from_release(dx: f64) -> Option<SwipeDirection> {
        if dx.abs() <= SWIPE_THRESHOLD {
            None
        } else if dx > 0.0 {
            Some(SwipeDirection::Right)
        } else {
            Some(SwipeDirection::Left)
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SwipeDirection::Left => "left",
            SwipeDirection::Right => "right",
        }
    }
}

/// A terminal decision as reported to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Left,
    Right,
    Back,
}

impl From<SwipeDirection> for Action {
    fn from(direction: SwipeDirection) -> Self {
        match direction {
            SwipeDirection::Left => Action::Left,
            SwipeDirection::Right => Action::Right,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Point {
        Point { x, y }
    }
}

/// An in-progress drag of the front card
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Drag {
    pub start: Point,
    pub current: Point,
}

impl Drag {
    pub fn dx(&self) -> f64 {
        self.current.x - self.start.x
    }

    pub fn dy(&self) -> f64 {
        self.current.y - self.start.y
    }

    pub fn rotation(&self) -> f64 {
        self.dx() * ROTATION_PER_PX
    }

    /// Previewed direction; never commits anything
    pub fn intent(&self) -> Option<SwipeDirection> {
        let dx = self.dx();
        if dx > INTENT_THRESHOLD {
            Some(SwipeDirection::Right)
        } else if dx < -INTENT_THRESHOLD {
            Some(SwipeDirection::Left)
        } else {
            None
        }
    }

    /// CSS transform following the pointer
    pub fn transform(&self) -> String {
        format!(
            "translate({}px, {}px) rotate({:.1}deg)",
            self.dx(),
            self.dy(),
            self.rotation()
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase {
    Idle,
    Dragging(Drag),
    Animating(SwipeDirection),
    Exhausted,
}

/// Outcome of letting go of the front card
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Release {
    Committed(SwipeDirection),
    SnappedBack,
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub card: Card,
    pub action: SwipeDirection,
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LastAction {
    pub card: Card,
    pub action: Action,
    #[serde(rename = "cardIndex")]
    pub card_index: usize,
}

/// Value delivered to the host when results are requested
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwipeResults {
    pub swiped_cards: Vec<HistoryEntry>,
    pub last_action: Option<LastAction>,
    pub total_swiped: usize,
    pub remaining_cards: usize,
}

/// Everything the UI can ask the stack to do
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StackAction {
    Press(Point),
    Move(Point),
    Release,
    Swipe(SwipeDirection),
    Settle,
    Back,
}

#[derive(Debug, Clone)]
pub struct CardStack {
    deck: Rc<[Card]>,
    cursor: usize,
    history: Rc<Vec<HistoryEntry>>,
    last_action: Option<Rc<LastAction>>,
    phase: Phase,
}

impl CardStack {
    pub fn new(cards: Vec<Card>) -> CardStack {
        let phase = if cards.is_empty() {
            Phase::Exhausted
        } else {
            Phase::Idle
        };

        CardStack {
            deck: cards.into(),
            cursor: 0,
            history: Rc::new(Vec::new()),
            last_action: None,
            phase,
        }
    }

    pub fn len(&self) -> usize {
        self.deck.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deck.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn last_action(&self) -> Option<&LastAction> {
        self.last_action.as_deref()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn remaining(&self) -> usize {
        self.deck.len() - self.cursor
    }

    pub fn is_exhausted(&self) -> bool {
        self.phase == Phase::Exhausted
    }

    /// Direction of the swipe waiting to settle, if any
    pub fn animating(&self) -> Option<SwipeDirection> {
        match self.phase {
            Phase::Animating(direction) => Some(direction),
            _ => None,
        }
    }

    pub fn drag(&self) -> Option<Drag> {
        match self.phase {
            Phase::Dragging(drag) => Some(drag),
            _ => None,
        }
    }

    pub fn front(&self) -> Option<&Card> {
        self.deck.get(self.cursor)
    }

    /// Up to three cards from the cursor on, front first, with deck indices
    pub fn visible(&self) -> impl Iterator<Item = (usize, &Card)> {
        self.deck
            .iter()
            .enumerate()
            .skip(self.cursor)
            .take(VISIBLE_CARDS)
    }

    /// Pointer went down on the front card
    pub fn press(&mut self, at: Point) -> bool {
        if self.phase != Phase::Idle || self.front().is_none() {
            return false;
        }

        self.phase = Phase::Dragging(Drag {
            start: at,
            current: at,
        });
        true
    }

    /// Pointer moved; returns the updated drag while one is active
    pub fn move_to(&mut self, at: Point) -> Option<Drag> {
        match &mut self.phase {
            Phase::Dragging(drag) => {
                drag.current = at;
                Some(*drag)
            }
            _ => None,
        }
    }

    /// Pointer released: commit past the threshold, otherwise snap back
    pub fn release(&mut self) -> Release {
        let Phase::Dragging(drag) = self.phase else {
            return Release::Ignored;
        };

        match SwipeDirection::from_release(drag.dx()) {
            Some(direction) => {
                self.phase = Phase::Animating(direction);
                Release::Committed(direction)
            }
            None => {
                self.phase = Phase::Idle;
                Release::SnappedBack
            }
        }
    }

    /// Button swipe of the front card
    pub fn swipe(&mut self, direction: SwipeDirection) -> bool {
        if !matches!(self.phase, Phase::Idle | Phase::Dragging(_)) || self.front().is_none() {
            return false;
        }

        self.phase = Phase::Animating(direction);
        true
    }

    /// Finish a pending swipe: record it and advance the cursor
    pub fn settle(&mut self) -> Option<SwipeDirection> {
        let direction = self.animating()?;
        let card = self.deck.get(self.cursor)?.clone();

        Rc::make_mut(&mut self.history).push(HistoryEntry {
            card: card.clone(),
            action: direction,
            index: self.cursor,
        });
        self.last_action = Some(Rc::new(LastAction {
            card,
            action: direction.into(),
            card_index: self.cursor,
        }));
        self.cursor += 1;
        self.phase = self.resting_phase();

        Some(direction)
    }

    /// Undo the most recent swipe
    pub fn go_back(&mut self) -> bool {
        if self.animating().is_some() {
            return false;
        }
        let Some(entry) = Rc::make_mut(&mut self.history).pop() else {
            return false;
        };

        self.cursor = entry.index;
        self.last_action = Some(Rc::new(LastAction {
            card: entry.card,
            action: Action::Back,
            card_index: self.cursor,
        }));
        self.phase = self.resting_phase();
        true
    }

    /// Snapshot for the host; never changes the stack
    pub fn results(&self) -> SwipeResults {
        SwipeResults {
            swiped_cards: self.history.to_vec(),
            last_action: self.last_action.as_deref().cloned(),
            total_swiped: self.history.len(),
            remaining_cards: self.remaining(),
        }
    }

    /// Apply a UI action; returns whether anything changed
    pub fn apply(&mut self, action: StackAction) -> bool {
        match action {
            StackAction::Press(at) => self.press(at),
            StackAction::Move(at) => self.move_to(at).is_some(),
            StackAction::Release => self.release() != Release::Ignored,
            StackAction::Swipe(direction) => self.swipe(direction),
            StackAction::Settle => self.settle().is_some(),
            StackAction::Back => self.go_back(),
        }
    }

    fn resting_phase(&self) -> Phase {
        if self.cursor >= self.deck.len() {
            Phase::Exhausted
        } else {
            Phase::Idle
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::ImageCard;

    fn create_test_deck(n: usize) -> Vec<Card> {
        (0..n)
            .map(|i| {
                Card::Image(ImageCard::new(
                    format!("https://example.com/{}.jpg", i),
                    format!("Person {}", i),
                    "Likes hiking",
                ))
            })
            .collect()
    }

    fn swipe_and_settle(stack: &mut CardStack, direction: SwipeDirection) {
        assert!(stack.swipe(direction));
        assert_eq!(stack.settle(), Some(direction));
        assert_eq!(stack.cursor(), stack.history().len());
    }

    fn drag_and_release(stack: &mut CardStack, dx: f64, dy: f64) -> Release {
        assert!(stack.press(Point::new(200.0, 300.0)));
        stack.move_to(Point::new(200.0 + dx, 300.0 + dy));
        stack.release()
    }

    #[test]
    fn test_new_stack() {
        let stack = CardStack::new(create_test_deck(3));

        assert_eq!(stack.len(), 3);
        assert_eq!(stack.cursor(), 0);
        assert_eq!(stack.remaining(), 3);
        assert_eq!(stack.phase(), Phase::Idle);
        assert!(stack.last_action().is_none());
    }

    #[test]
    fn test_empty_stack_is_exhausted() {
        let mut stack = CardStack::new(Vec::new());

        assert!(stack.is_exhausted());
        assert!(!stack.press(Point::new(0.0, 0.0)));
        assert!(!stack.swipe(SwipeDirection::Right));
        assert!(!stack.go_back());
    }

    #[test]
    fn test_swipe_right_right_left_scenario() {
        let mut stack = CardStack::new(create_test_deck(3));

        swipe_and_settle(&mut stack, SwipeDirection::Right);
        swipe_and_settle(&mut stack, SwipeDirection::Right);
        swipe_and_settle(&mut stack, SwipeDirection::Left);

        let results = stack.results();
        assert_eq!(results.total_swiped, 3);
        assert_eq!(results.remaining_cards, 0);
        assert_eq!(results.last_action.as_ref().unwrap().action, Action::Left);
        assert_eq!(results.last_action.as_ref().unwrap().card_index, 2);
        assert!(stack.is_exhausted());
    }

    #[test]
    fn test_swipes_then_undos_restore_cursor() {
        let mut stack = CardStack::new(create_test_deck(5));

        for direction in [SwipeDirection::Left, SwipeDirection::Right, SwipeDirection::Right] {
            swipe_and_settle(&mut stack, direction);
        }
        for _ in 0..3 {
            assert!(stack.go_back());
            assert_eq!(stack.cursor(), stack.history().len());
        }

        assert_eq!(stack.cursor(), 0);
        assert!(stack.history().is_empty());
        assert_eq!(stack.last_action().unwrap().action, Action::Back);
        assert_eq!(stack.last_action().unwrap().card_index, 0);
    }

    #[test]
    fn test_undo_with_empty_history_is_noop() {
        let mut stack = CardStack::new(create_test_deck(2));

        assert!(!stack.go_back());
        assert_eq!(stack.cursor(), 0);
        assert!(stack.last_action().is_none());
    }

    #[test]
    fn test_undo_leaves_exhausted() {
        let mut stack = CardStack::new(create_test_deck(1));
        swipe_and_settle(&mut stack, SwipeDirection::Right);
        assert!(stack.is_exhausted());

        assert!(stack.go_back());
        assert_eq!(stack.phase(), Phase::Idle);
        assert_eq!(stack.remaining(), 1);
    }

    #[test]
    fn test_release_commits_past_threshold() {
        let mut stack = CardStack::new(create_test_deck(3));

        assert_eq!(
            drag_and_release(&mut stack, 101.0, -40.0),
            Release::Committed(SwipeDirection::Right)
        );
        assert_eq!(stack.animating(), Some(SwipeDirection::Right));
        stack.settle();

        assert_eq!(
            drag_and_release(&mut stack, -150.0, 80.0),
            Release::Committed(SwipeDirection::Left)
        );
        stack.settle();
        assert_eq!(stack.history()[1].action, SwipeDirection::Left);
    }

    #[test]
    fn test_release_at_threshold_snaps_back() {
        let mut stack = CardStack::new(create_test_deck(3));

        assert_eq!(drag_and_release(&mut stack, 100.0, 0.0), Release::SnappedBack);
        assert_eq!(drag_and_release(&mut stack, -100.0, 0.0), Release::SnappedBack);
        assert_eq!(drag_and_release(&mut stack, 30.0, 400.0), Release::SnappedBack);

        assert_eq!(stack.phase(), Phase::Idle);
        assert_eq!(stack.cursor(), 0);
        assert!(stack.history().is_empty());
    }

    #[test]
    fn test_release_without_press_is_ignored() {
        let mut stack = CardStack::new(create_test_deck(1));

        assert_eq!(stack.release(), Release::Ignored);
        assert!(stack.move_to(Point::new(10.0, 10.0)).is_none());
    }

    #[test]
    fn test_drag_feedback() {
        let mut stack = CardStack::new(create_test_deck(1));
        stack.press(Point::new(100.0, 100.0));

        let drag = stack.move_to(Point::new(160.0, 90.0)).unwrap();
        assert_eq!(drag.dx(), 60.0);
        assert_eq!(drag.dy(), -10.0);
        assert_eq!(drag.intent(), Some(SwipeDirection::Right));
        assert!((drag.rotation() - 6.0).abs() < 1e-9);

        let drag = stack.move_to(Point::new(60.0, 100.0)).unwrap();
        assert_eq!(drag.intent(), None);

        let drag = stack.move_to(Point::new(40.0, 100.0)).unwrap();
        assert_eq!(drag.intent(), Some(SwipeDirection::Left));
        assert_eq!(drag.transform(), "translate(-60px, 0px) rotate(-6.0deg)");
    }

    #[test]
    fn test_no_new_gesture_while_animating() {
        let mut stack = CardStack::new(create_test_deck(3));
        swipe_and_settle(&mut stack, SwipeDirection::Right);
        assert!(stack.swipe(SwipeDirection::Left));

        assert!(!stack.press(Point::new(0.0, 0.0)));
        assert!(!stack.swipe(SwipeDirection::Right));
        assert!(!stack.go_back());

        assert_eq!(stack.settle(), Some(SwipeDirection::Left));
        assert_eq!(stack.history().len(), 2);
    }

    #[test]
    fn test_settle_without_pending_swipe() {
        let mut stack = CardStack::new(create_test_deck(2));

        assert_eq!(stack.settle(), None);
        assert_eq!(stack.cursor(), 0);
    }

    #[test]
    fn test_results_is_pure() {
        let mut stack = CardStack::new(create_test_deck(3));
        swipe_and_settle(&mut stack, SwipeDirection::Left);
        stack.press(Point::new(0.0, 0.0));
        stack.move_to(Point::new(30.0, 0.0));

        let first = stack.results();
        let second = stack.results();

        assert_eq!(first, second);
        assert!(stack.drag().is_some());
        assert_eq!(first.total_swiped, 1);
        assert_eq!(first.remaining_cards, 2);
    }

    #[test]
    fn test_visible_cards() {
        let mut stack = CardStack::new(create_test_deck(5));
        let indices: Vec<usize> = stack.visible().map(|(i, _)| i).collect();
        assert_eq!(indices, vec![0, 1, 2]);

        for _ in 0..3 {
            swipe_and_settle(&mut stack, SwipeDirection::Right);
        }
        let indices: Vec<usize> = stack.visible().map(|(i, _)| i).collect();
        assert_eq!(indices, vec![3, 4]);
    }

    #[test]
    fn test_apply_actions() {
        let mut stack = CardStack::new(create_test_deck(2));

        assert!(stack.apply(StackAction::Press(Point::new(0.0, 0.0))));
        assert!(stack.apply(StackAction::Move(Point::new(-120.0, 0.0))));
        assert!(stack.apply(StackAction::Release));
        assert!(stack.apply(StackAction::Settle));
        assert!(!stack.apply(StackAction::Settle));
        assert!(stack.apply(StackAction::Back));
        assert_eq!(stack.cursor(), 0);
    }

    #[test]
    fn test_results_serialization() {
        let mut stack = CardStack::new(create_test_deck(2));
        swipe_and_settle(&mut stack, SwipeDirection::Right);

        let json = serde_json::to_value(stack.results()).unwrap();

        assert_eq!(json["totalSwiped"], 1);
        assert_eq!(json["remainingCards"], 1);
        assert_eq!(json["swipedCards"][0]["action"], "right");
        assert_eq!(json["swipedCards"][0]["index"], 0);
        assert_eq!(json["swipedCards"][0]["card"]["name"], "Person 0");
        assert_eq!(json["lastAction"]["action"], "right");
        assert_eq!(json["lastAction"]["cardIndex"], 0);
    }

    #[test]
    fn test_results_without_actions_has_null_last_action() {
        let stack = CardStack::new(create_test_deck(1));
        let json = serde_json::to_value(stack.results()).unwrap();

        assert!(json["lastAction"].is_null());
        assert_eq!(json["swipedCards"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn test_clone_shares_history_until_changed() {
        let mut stack = CardStack::new(create_test_deck(3));
        swipe_and_settle(&mut stack, SwipeDirection::Right);
        swipe_and_settle(&mut stack, SwipeDirection::Left);

        let mut dragged = stack.clone();
        assert!(Rc::ptr_eq(&stack.history, &dragged.history));
        assert!(dragged.apply(StackAction::Press(Point::new(0.0, 0.0))));
        assert!(dragged.apply(StackAction::Move(Point::new(30.0, 0.0))));
        assert!(Rc::ptr_eq(&stack.history, &dragged.history));

        let mut undone = stack.clone();
        assert!(undone.apply(StackAction::Back));
        assert!(!Rc::ptr_eq(&stack.history, &undone.history));
        assert_eq!(stack.history().len(), 2);
        assert_eq!(undone.history().len(), 1);
    }
}
