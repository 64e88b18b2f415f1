//! Pointer input types and touch translation.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    #[default]
    Left,
    Middle,
    Right,
}

impl MouseButton {
    /// Left is the primary action; every other button is secondary.
    pub fn is_primary(self) -> bool {
        self == MouseButton::Left
    }

    /// Map a DOM `MouseEvent.button` value (0 = left, 1 = middle, 2 = right).
    pub fn from_dom(button: i16) -> Self {
        match button {
            0 => MouseButton::Left,
            1 => MouseButton::Middle,
            _ => MouseButton::Right,
        }
    }
}

/// Pointer event in viewport-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerEvent {
    Down {
        position: Point,
        #[serde(default)]
        button: MouseButton,
    },
    Move {
        position: Point,
    },
    Up {
        position: Point,
    },
}

impl PointerEvent {
    pub fn position(&self) -> Point {
        match self {
            PointerEvent::Down { position, .. }
            | PointerEvent::Move { position }
            | PointerEvent::Up { position } => *position,
        }
    }

    /// The pointer event a touch phase stands for. Touches always act as
    /// the primary button.
    pub fn from_touch(phase: TouchPhase, position: Point) -> Self {
        match phase {
            TouchPhase::Start => PointerEvent::Down {
                position,
                button: MouseButton::Left,
            },
            TouchPhase::Move => PointerEvent::Move { position },
            TouchPhase::End | TouchPhase::Cancel => PointerEvent::Up { position },
        }
    }
}

/// Phase of a touch point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TouchPhase {
    Start,
    Move,
    End,
    Cancel,
}

impl TouchPhase {
    /// Map a DOM touch event type (`touchstart`, ...).
    pub fn from_dom(event_type: &str) -> Option<Self> {
        match event_type {
            "touchstart" => Some(TouchPhase::Start),
            "touchmove" => Some(TouchPhase::Move),
            "touchend" => Some(TouchPhase::End),
            "touchcancel" => Some(TouchPhase::Cancel),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_roles() {
        assert!(MouseButton::Left.is_primary());
        assert!(!MouseButton::Middle.is_primary());
        assert!(!MouseButton::Right.is_primary());
        assert_eq!(MouseButton::from_dom(2), MouseButton::Right);
        assert_eq!(MouseButton::from_dom(0), MouseButton::Left);
    }

    #[test]
    fn test_touch_translation() {
        let p = Point::new(4.0, 2.0);
        assert_eq!(
            PointerEvent::from_touch(TouchPhase::Start, p),
            PointerEvent::Down {
                position: p,
                button: MouseButton::Left
            }
        );
        assert_eq!(
            PointerEvent::from_touch(TouchPhase::Move, p),
            PointerEvent::Move { position: p }
        );
        assert_eq!(
            PointerEvent::from_touch(TouchPhase::Cancel, p),
            PointerEvent::Up { position: p }
        );
        assert_eq!(TouchPhase::from_dom("touchend"), Some(TouchPhase::End));
        assert_eq!(TouchPhase::from_dom("click"), None);
    }
}
