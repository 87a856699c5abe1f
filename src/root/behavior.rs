use super::Root;
use crate::behavior::{Behavior, control_message, element_message};
use crate::element::ElementId;
use crate::geometry::{AbsVec, CRect};
use crate::message::{DrawArgs, DrawAux, Message, Reply};

/// Behavior of the root element. Input that reaches it was rejected by
/// everything else, and it never takes focus.
#[derive(Clone, Copy, Debug, Default)]
pub struct RootBehavior;

impl Behavior for RootBehavior {
    fn message(&self, root: &mut Root, id: ElementId, msg: &Message) -> Reply {
        root_message(root, id, msg)
    }

    fn destroy(&self, _root: &mut Root, _id: ElementId) {
        tracing::warn!("refusing to destroy the root element");
    }
}

pub fn root_message(root: &mut Root, id: ElementId, msg: &Message) -> Reply {
    match msg {
        Message::MouseMove(_)
        | Message::MouseDown(_)
        | Message::MouseUp(_)
        | Message::MouseOn(_)
        | Message::MouseOff(_)
        | Message::MouseDblClick(_)
        | Message::MouseScroll(_)
        | Message::TouchBegin(_)
        | Message::TouchEnd(_)
        | Message::TouchMove(_)
        | Message::KeyDown(_)
        | Message::KeyUp(_)
        | Message::KeyChar(_)
        | Message::JoyButtonDown(_)
        | Message::JoyButtonUp(_)
        | Message::JoyAxis(_)
        | Message::DragOver(_)
        | Message::Drop(_)
        | Message::GotFocus => Reply::Rejected,
        Message::GetClassName => Reply::ClassName("Root"),
        Message::Draw(_) => {
            draw(root, id);
            Reply::Accepted
        }
        Message::GetDpi => Reply::Dpi(root.config.dpi),
        Message::SetDpi(dpi) => {
            let old = root.config.dpi;
            let scale = AbsVec::new(
                if old.x == 0 { 1.0 } else { dpi.x as f32 / old.x as f32 },
                if old.y == 0 { 1.0 } else { dpi.y as f32 / old.y as f32 },
            );
            let Some(area) = root.tree.get(id).map(|e| e.geometry.transform.area) else {
                return Reply::Rejected;
            };
            let scaled = CRect::from_abs(
                area.left.abs * scale.x,
                area.top.abs * scale.y,
                area.right.abs * scale.x,
                area.bottom.abs * scale.y,
            );
            root.config.dpi = *dpi;
            tracing::debug!(?dpi, "root dpi changed");
            root.send(id, &Message::SetArea(scaled))
        }
        Message::GetLineHeight => Reply::Float(root.config.line_height),
        Message::SetLineHeight(height) => {
            root.config.line_height = *height;
            Reply::Accepted
        }
        Message::GetStyle => Reply::Style(Some(0)),
        _ => control_message(root, id, msg),
    }
}

/// Draws the tree, then the topmost element, then a free-floating drag
/// visual at the pointer.
fn draw(root: &mut Root, id: ElementId) {
    root.flush_mouse_move();
    let aux = DrawAux {
        dpi: root.config.dpi,
        ..DrawAux::default()
    };
    let args = DrawArgs {
        area: root.tree.resolve_rect(id),
        aux,
        culled: false,
    };
    element_message(root, id, &Message::Draw(args));

    if let Some(topmost) = root.topmost {
        let area = root.tree.resolve_rect(topmost);
        root.send(
            topmost,
            &Message::Draw(DrawArgs {
                area,
                aux,
                culled: false,
            }),
        );
    }

    let visual = root.drag.as_ref().and_then(|d| d.draw);
    if let Some(visual) = visual
        && root.tree.parent(visual) != Some(id)
    {
        let rect = root.tree.resolve_rect(visual);
        let position = root.mouse.position;
        let area = crate::geometry::AbsRect::new(
            position.x,
            position.y,
            position.x + rect.width(),
            position.y + rect.height(),
        );
        root.send(
            visual,
            &Message::Draw(DrawArgs {
                area,
                aux,
                culled: false,
            }),
        );
    }
}
