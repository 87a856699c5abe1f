use super::Root;
use crate::element::ElementId;
use crate::message::{Cursor, Message, MsgCode, Reply, UserData};
use crate::render::ClipboardKind;
use std::rc::Rc;

/// An in-progress drag-and-drop.
#[derive(Clone, Debug)]
pub struct Drag {
    pub kind: ClipboardKind,
    pub data: UserData,
    /// Element drawn under the pointer while dragging. When it is a direct
    /// child of the root it is moved with the pointer, otherwise it is drawn
    /// at the pointer after everything else.
    pub draw: Option<ElementId>,
}

impl Root {
    /// Begins a drag. Until the next mouse up, moves arrive as `DragOver`
    /// and the release as `Drop`.
    pub fn start_drag(&mut self, kind: ClipboardKind, data: UserData, draw: Option<ElementId>) {
        let draw = draw.filter(|&id| self.tree.contains(id));
        self.backend.drag_start(kind, &data, draw);
        tracing::debug!(?kind, ?draw, "drag started");
        self.drag = Some(Drag { kind, data, draw });
    }

    pub fn drag(&self) -> Option<&Drag> {
        self.drag.as_ref()
    }

    /// Feeds a platform input event into the tree.
    ///
    /// Keyboard and joystick events bubble from the focused element (or the
    /// root) up through its ancestors. Pointer events go to the captured
    /// element, then the topmost one, then the tree; the first acceptance
    /// wins.
    pub fn inject(&mut self, mut event: Message) -> Reply {
        self.mouse.update(&mut event);
        if self.drag.is_some() {
            event = match event {
                Message::MouseMove(m) => Message::DragOver(m),
                Message::MouseUp(m) => Message::Drop(m),
                other => other,
            };
        }

        match &event {
            Message::KeyDown(key) | Message::KeyUp(key) => {
                self.set_key(key.code, matches!(event, Message::KeyDown(_)));
                self.bubble(&event)
            }
            Message::KeyChar(_)
            | Message::JoyButtonDown(_)
            | Message::JoyButtonUp(_)
            | Message::JoyAxis(_) => self.bubble(&event),
            Message::MouseScroll(m)
            | Message::MouseDblClick(m)
            | Message::MouseDown(m)
            | Message::MouseUp(m)
            | Message::MouseMove(m)
            | Message::TouchBegin(m)
            | Message::TouchEnd(m)
            | Message::TouchMove(m) => {
                let (x, y) = (m.x, m.y);
                self.move_drag_visual(x, y);
                let code = event.code();
                let event = Rc::new(event.clone());
                for target in [self.capture, self.topmost, Some(self.id)].into_iter().flatten() {
                    let reply = self.send(
                        target,
                        &Message::Inject {
                            event: event.clone(),
                            area: None,
                        },
                    );
                    self.process_cursor(&reply, code, None);
                    if reply.is_accepted() {
                        return Reply::Accepted;
                    }
                }
                if code == MsgCode::MouseMove {
                    self.process_cursor(&Reply::Cursor(Cursor::Arrow), code, None);
                    self.clear_hover(&event);
                }
                Reply::Rejected
            }
            Message::MouseOff(_) => {
                self.clear_hover(&event);
                Reply::Rejected
            }
            Message::DragOver(m) | Message::Drop(m) => {
                self.move_drag_visual(m.x, m.y);
                let code = event.code();
                let is_drop = code == MsgCode::Drop;
                let id = self.id;
                let reply = self.send(
                    id,
                    &Message::Inject {
                        event: Rc::new(event.clone()),
                        area: None,
                    },
                );
                self.process_cursor(&reply, code, Some(Cursor::No));
                if is_drop {
                    self.end_drag();
                }
                reply
            }
            _ => Reply::Rejected,
        }
    }

    fn bubble(&mut self, event: &Message) -> Reply {
        let mut cur = Some(self.focus.unwrap_or(self.id));
        while let Some(id) = cur {
            if self.send(id, event).is_accepted() {
                return Reply::Accepted;
            }
            cur = self.tree.parent(id);
        }
        Reply::Rejected
    }

    fn move_drag_visual(&mut self, x: f32, y: f32) {
        let root = self.id;
        let Some(visual) = self.drag.as_ref().and_then(|d| d.draw) else {
            return;
        };
        if self.tree.parent(visual) == Some(root)
            && let Some(element) = self.tree.get_mut(visual)
        {
            element.geometry.transform.area.move_to(x, y);
            self.dirty(visual);
        }
    }

    fn clear_hover(&mut self, event: &Message) {
        let Some(old) = self.hover.take() else {
            return;
        };
        let mouse = event.mouse().copied().unwrap_or_default();
        self.send(old, &Message::MouseOff(mouse));
    }

    fn end_drag(&mut self) {
        let Some(drag) = self.drag.take() else {
            return;
        };
        if let Some(visual) = drag.draw
            && self.tree.parent(visual) == Some(self.id)
        {
            self.destroy(visual);
        }
        tracing::debug!(kind = ?drag.kind, "drag ended");
    }

    /// Updates the platform cursor after an input reply. Only moves change
    /// the cursor; other events re-assert the current one.
    fn process_cursor(&mut self, reply: &Reply, code: MsgCode, fallback: Option<Cursor>) {
        let cursor = if matches!(code, MsgCode::MouseMove | MsgCode::DragOver) {
            reply.cursor().or(fallback)
        } else {
            self.cursor
        };
        let Some(cursor) = cursor else {
            return;
        };
        self.cursor = Some(cursor);
        let data = self.cursor_map.get(&cursor).map(Vec::as_slice);
        self.backend.set_cursor(cursor, data);
    }
}

#[cfg(test)]
mod tests {
    use crate::geometry::CRect;
    use crate::message::{Cursor, Message, MouseButton, MouseEvent, MsgCode, UserData};
    use crate::render::{ClipboardKind, HeadlessBackend};
    use crate::root::{ElementDesc, Root, RootConfig};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn cursor_of(root: &Root) -> Option<Cursor> {
        root.backend_as::<HeadlessBackend>().and_then(|b| b.cursor)
    }

    #[test]
    fn unhandled_moves_reset_cursor_and_hover() {
        let mut root = Root::headless(RootConfig::default());
        let top = root.id();
        let button = root
            .create(
                Some(top),
                ElementDesc::new("control").area(CRect::from_abs(0.0, 0.0, 50.0, 50.0)),
            )
            .expect("button");

        assert!(root.inject(Message::MouseMove(MouseEvent::at(10.0, 10.0))).is_accepted());
        assert_eq!(root.hover(), Some(button));
        assert_eq!(cursor_of(&root), Some(Cursor::Arrow));

        assert!(!root.inject(Message::MouseMove(MouseEvent::at(100.0, 100.0))).is_accepted());
        assert_eq!(root.hover(), None);
        assert_eq!(root.cursor(), Some(Cursor::Arrow));
    }

    #[test]
    fn capture_sees_events_outside_its_area() {
        let mut root = Root::headless(RootConfig::default());
        let top = root.id();
        let slider = root
            .create(
                Some(top),
                ElementDesc::new("control").area(CRect::from_abs(0.0, 0.0, 20.0, 20.0)),
            )
            .expect("slider");
        root.set_capture(Some(slider));
        let down = MouseEvent::at(300.0, 300.0).with_button(MouseButton::Left);
        assert!(root.inject(Message::MouseDown(down)).is_accepted());
        assert_eq!(root.focus(), Some(slider));
        assert!(root.mouse().buttons.left);
    }

    #[test]
    fn drags_turn_moves_into_drag_over_and_release_into_drop() {
        let mut root = Root::headless(RootConfig::default());
        let top = root.id();
        let log = Rc::new(RefCell::new(Vec::new()));
        let target = root
            .create(
                Some(top),
                ElementDesc::new("element").area(CRect::from_abs(0.0, 0.0, 100.0, 100.0)),
            )
            .expect("target");
        for code in [MsgCode::DragOver, MsgCode::Drop] {
            let sink = log.clone();
            root.add_listener(target, code, move |_, _, msg| sink.borrow_mut().push(msg.code()));
        }
        let ghost = root
            .create(
                Some(top),
                ElementDesc::new("element").area(CRect::from_abs(0.0, 0.0, 8.0, 8.0)),
            )
            .expect("ghost");

        root.start_drag(ClipboardKind::Text, UserData::new("payload"), Some(ghost));
        assert_eq!(
            root.backend_as::<HeadlessBackend>().map(|b| b.drags.len()),
            Some(1)
        );
        root.inject(Message::MouseMove(MouseEvent::at(40.0, 40.0)));
        assert_eq!(root.tree().resolve_rect(ghost).left, 40.0);
        // the plain element rejects DragOver, so the fallback cursor applies
        assert_eq!(root.cursor(), Some(Cursor::No));

        root.inject(Message::MouseUp(MouseEvent::at(50.0, 50.0).with_button(MouseButton::Left)));
        assert_eq!(*log.borrow(), vec![MsgCode::DragOver, MsgCode::Drop]);
        assert!(root.drag().is_none());
        assert!(!root.tree().contains(ghost));
    }

    #[test]
    fn key_events_bubble_from_focus_to_root() {
        let mut root = Root::headless(RootConfig::default());
        let top = root.id();
        let form = root
            .create(Some(top), ElementDesc::new("control").area(CRect::fill()))
            .expect("form");
        let field = root
            .create(Some(form), ElementDesc::new("control").area(CRect::fill()))
            .expect("field");
        let seen = Rc::new(RefCell::new(Vec::new()));
        for id in [form, field] {
            let sink = seen.clone();
            root.add_listener(id, MsgCode::KeyChar, move |_, id, _| sink.borrow_mut().push(id));
        }
        assert!(root.set_focus(field));
        let reply = root.inject(Message::KeyChar(crate::message::KeyEvent::char('a')));
        assert!(!reply.is_accepted());
        assert_eq!(*seen.borrow(), vec![field, form]);
    }
}
