use crate::draw::model::Point;

/// On-screen rectangle of an element in device-independent pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ClientRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

/// The element the overlay is stacked on. Its rect is queried on every event
/// because it can scroll or reflow between events.
pub trait ViewportElement {
    fn client_rect(&self) -> ClientRect;
}

impl ViewportElement for ClientRect {
    fn client_rect(&self) -> ClientRect {
        *self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PointerEvent {
    MouseDown { client: Point },
    MouseMove { client: Point },
    MouseUp,
    TouchStart { touches: Vec<Point> },
    TouchMove { touches: Vec<Point> },
    TouchEnd,
    Wheel { delta_y: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputCommand {
    ExitDrawMode,
}

impl PointerEvent {
    pub fn phase(&self) -> Option<PointerPhase> {
        match self {
            Self::MouseDown { .. } | Self::TouchStart { .. } => Some(PointerPhase::Down),
            Self::MouseMove { .. } | Self::TouchMove { .. } => Some(PointerPhase::Move),
            Self::MouseUp | Self::TouchEnd => Some(PointerPhase::Up),
            Self::Wheel { .. } => None,
        }
    }

    /// Client position of the mouse, or of the first active touch.
    pub fn client_position(&self) -> Option<Point> {
        match self {
            Self::MouseDown { client } | Self::MouseMove { client } => Some(*client),
            Self::TouchStart { touches } | Self::TouchMove { touches } => touches.first().copied(),
            Self::MouseUp | Self::TouchEnd | Self::Wheel { .. } => None,
        }
    }
}

pub fn client_to_local(client: Point, rect: ClientRect) -> Point {
    Point::new(client.x - rect.left, client.y - rect.top)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_touch_wins() {
        let event = PointerEvent::TouchMove {
            touches: vec![Point::new(5.0, 6.0), Point::new(50.0, 60.0)],
        };
        assert_eq!(event.client_position(), Some(Point::new(5.0, 6.0)));
        assert_eq!(event.phase(), Some(PointerPhase::Move));
    }

    #[test]
    fn touch_without_points_has_no_position() {
        let event = PointerEvent::TouchStart { touches: vec![] };
        assert_eq!(event.client_position(), None);
    }

    #[test]
    fn client_point_is_offset_by_element_origin() {
        let rect = ClientRect {
            left: 100.0,
            top: 40.0,
            width: 300.0,
            height: 200.0,
        };
        assert_eq!(
            client_to_local(Point::new(130.0, 45.0), rect),
            Point::new(30.0, 5.0)
        );
    }

    #[test]
    fn wheel_has_no_pointer_phase() {
        assert_eq!(PointerEvent::Wheel { delta_y: 3.0 }.phase(), None);
    }
}
