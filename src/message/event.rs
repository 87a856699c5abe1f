use crate::geometry::AbsVec;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Back,
    Forward,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MouseButtons {
    pub left: bool,
    pub right: bool,
    pub middle: bool,
    pub back: bool,
    pub forward: bool,
}

impl MouseButtons {
    pub fn set(&mut self, button: MouseButton, down: bool) {
        match button {
            MouseButton::Left => self.left = down,
            MouseButton::Right => self.right = down,
            MouseButton::Middle => self.middle = down,
            MouseButton::Back => self.back = down,
            MouseButton::Forward => self.forward = down,
        }
    }

    pub fn any(&self) -> bool {
        self.left || self.right || self.middle || self.back || self.forward
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyModifiers {
    pub alt: bool,
    pub ctrl: bool,
    pub shift: bool,
    pub meta: bool,
}

/// Pointer payload shared by mouse, touch and drag messages.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MouseEvent {
    pub x: f32,
    pub y: f32,
    /// Button that changed, for down/up/double-click.
    pub button: Option<MouseButton>,
    /// Every button held after this event.
    pub buttons: MouseButtons,
    /// Vertical and horizontal wheel deltas, for scroll.
    pub scroll: AbsVec,
}

impl MouseEvent {
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            ..Self::default()
        }
    }

    pub fn with_button(mut self, button: MouseButton) -> Self {
        self.button = Some(button);
        self
    }

    pub fn with_scroll(mut self, vertical: f32, horizontal: f32) -> Self {
        self.scroll = AbsVec::new(vertical, horizontal);
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyEvent {
    /// Virtual key code, `0..=255`.
    pub code: u8,
    /// Character produced, for key-char messages.
    pub ch: Option<char>,
    pub modifiers: KeyModifiers,
}

impl KeyEvent {
    pub fn key(code: u8) -> Self {
        Self {
            code,
            ..Self::default()
        }
    }

    pub fn char(ch: char) -> Self {
        Self {
            ch: Some(ch),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct JoyEvent {
    pub button: i16,
    pub axis: i16,
    pub value: f32,
    pub down: bool,
}
