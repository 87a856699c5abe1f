mod inject;

pub use inject::*;

use crate::geometry::AbsVec;
use crate::message::{Message, MouseButtons};

/// Pointer state tracked by the root across injected events.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MouseState {
    pub position: AbsVec,
    pub buttons: MouseButtons,
    /// False after the pointer left the window.
    pub inside: bool,
    /// A geometry change moved an element under the pointer; the next root
    /// draw injects a synthetic move.
    pub(crate) pending_move: bool,
}

impl MouseState {
    /// Folds `event` into the tracked state and stamps the event with the
    /// buttons held afterwards.
    pub fn update(&mut self, event: &mut Message) {
        let down = match event {
            Message::MouseDown(_) | Message::TouchBegin(_) => Some(true),
            Message::MouseUp(_) | Message::TouchEnd(_) => Some(false),
            _ => None,
        };
        match event {
            Message::MouseOn(_) => self.inside = true,
            Message::MouseOff(_) => self.inside = false,
            _ => {}
        }
        let Some(mouse) = event_mouse_mut(event) else {
            return;
        };
        self.position = AbsVec::new(mouse.x, mouse.y);
        self.inside = true;
        if let (Some(button), Some(down)) = (mouse.button, down) {
            self.buttons.set(button, down);
        }
        mouse.buttons = self.buttons;
    }
}

fn event_mouse_mut(event: &mut Message) -> Option<&mut crate::message::MouseEvent> {
    match event {
        Message::MouseDown(m)
        | Message::MouseUp(m)
        | Message::MouseMove(m)
        | Message::MouseDblClick(m)
        | Message::MouseScroll(m)
        | Message::TouchBegin(m)
        | Message::TouchEnd(m)
        | Message::TouchMove(m)
        | Message::DragOver(m)
        | Message::Drop(m) => Some(m),
        _ => None,
    }
}
