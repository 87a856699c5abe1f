use super::element_message;
use crate::element::{ElementFlags, ElementId};
use crate::message::{Message, MouseEvent, Reply};
use crate::root::Root;

/// Behavior of focusable elements: focus transfer, hover tracking and
/// click-to-focus on top of the base element.
pub fn control_message(root: &mut Root, id: ElementId, msg: &Message) -> Reply {
    match msg {
        Message::GotFocus => {
            let disabled = root
                .tree
                .get(id)
                .is_none_or(|e| e.flags.contains(ElementFlags::DISABLE));
            if disabled {
                return Reply::Rejected;
            }
            if root.focus == Some(id) {
                return Reply::Accepted;
            }
            if let Some(old) = root.focus {
                root.send(old, &Message::LostFocus);
            }
            root.focus = Some(id);
            Reply::Accepted
        }
        Message::LostFocus => {
            if root.focus == Some(id) {
                root.focus = None;
            }
            Reply::Accepted
        }
        Message::MouseMove(m) => {
            hover(root, id, m);
            Reply::Accepted
        }
        Message::MouseDown(m) => {
            hover(root, id, m);
            if root.focus != Some(id) {
                root.send(id, &Message::GotFocus);
            }
            Reply::Accepted
        }
        Message::MouseUp(m) => {
            hover(root, id, m);
            Reply::Accepted
        }
        Message::GetClassName => Reply::ClassName("Control"),
        _ => element_message(root, id, msg),
    }
}

/// Makes `id` the hovered element, sending `MouseOff` to the previous one
/// and `MouseOn` to `id`.
fn hover(root: &mut Root, id: ElementId, event: &MouseEvent) {
    if root.hover == Some(id) {
        return;
    }
    if let Some(old) = root.hover.take() {
        root.send(old, &Message::MouseOff(*event));
    }
    root.hover = Some(id);
    root.send(id, &Message::MouseOn(*event));
}

#[cfg(test)]
mod tests {
    use crate::element::{ElementFlags, ElementId};
    use crate::geometry::CRect;
    use crate::message::{Message, MouseEvent, MsgCode};
    use crate::root::{ElementDesc, Root, RootConfig};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn control(root: &mut Root, area: CRect) -> ElementId {
        let top = root.id();
        root.create(Some(top), ElementDesc::new("control").area(area))
            .expect("control")
    }

    #[test]
    fn focus_moves_between_controls() {
        let mut root = Root::headless(RootConfig::default());
        let a = control(&mut root, CRect::fill());
        let b = control(&mut root, CRect::fill());
        let lost = Rc::new(RefCell::new(0));
        let sink = lost.clone();
        root.add_listener(a, MsgCode::LostFocus, move |_, _, _| *sink.borrow_mut() += 1);

        assert!(root.set_focus(a));
        assert_eq!(root.focus(), Some(a));
        assert!(root.set_focus(b));
        assert_eq!(root.focus(), Some(b));
        assert_eq!(*lost.borrow(), 1);
    }

    #[test]
    fn disabled_controls_refuse_focus() {
        let mut root = Root::headless(RootConfig::default());
        let a = control(&mut root, CRect::fill());
        root.send(a, &Message::SetFlag(ElementFlags::DISABLE, true));
        assert!(!root.set_focus(a));
        assert_eq!(root.focus(), None);
    }

    #[test]
    fn hover_switches_with_on_and_off() {
        let mut root = Root::headless(RootConfig::default());
        let left = control(&mut root, CRect::from_abs(0.0, 0.0, 100.0, 100.0));
        let right = control(&mut root, CRect::from_abs(100.0, 0.0, 200.0, 100.0));
        let log = Rc::new(RefCell::new(Vec::new()));
        for id in [left, right] {
            for code in [MsgCode::MouseOn, MsgCode::MouseOff] {
                let sink = log.clone();
                root.add_listener(id, code, move |_, id, msg| sink.borrow_mut().push((id, msg.code())));
            }
        }

        root.inject(Message::MouseMove(MouseEvent::at(50.0, 50.0)));
        root.inject(Message::MouseMove(MouseEvent::at(150.0, 50.0)));
        root.inject(Message::MouseMove(MouseEvent::at(500.0, 500.0)));
        assert_eq!(
            *log.borrow(),
            vec![
                (left, MsgCode::MouseOn),
                (left, MsgCode::MouseOff),
                (right, MsgCode::MouseOn),
                (right, MsgCode::MouseOff),
            ]
        );
        assert_eq!(root.hover(), None);
    }
}
