use crate::element::{ChildOrder, ElementFlags, ElementId};
use crate::geometry::AbsRect;
use crate::message::{Message, Reply};
use crate::root::Root;
use std::rc::Rc;

/// Default inject handler: routes `event` to the deepest accepting
/// descendant, topmost child first.
///
/// `area` is the parent's resolved rectangle; `None` resolves the whole
/// chain and always counts as a hit. On a miss only no-clip children are
/// searched and the element's own handler is never reached.
pub fn standard_inject(
    root: &mut Root,
    id: ElementId,
    event: &Rc<Message>,
    area: Option<&AbsRect>,
) -> Reply {
    let Some(element) = root.tree.get(id) else {
        return Reply::Rejected;
    };
    if element.is_hidden() {
        return Reply::Rejected;
    }
    let rect = match area {
        Some(last) => root.tree.resolve_rect_in(id, last),
        None => root.tree.resolve_rect(id),
    };
    let miss = area.is_some() && !event.hits(&rect);
    let order = if miss {
        ChildOrder::NoClip
    } else {
        ChildOrder::Inject
    };

    let mut cur = root.tree.get(id).and_then(|e| e.last_child(order));
    while let Some(child) = cur {
        cur = root.tree.prev_sibling(child, order);
        let ignored = root
            .tree
            .get(child)
            .is_none_or(|c| c.flags.contains(ElementFlags::IGNORE));
        if ignored {
            continue;
        }
        let reply = root.send(
            child,
            &Message::Inject {
                event: event.clone(),
                area: Some(rect),
            },
        );
        if reply.is_accepted() {
            return reply;
        }
    }

    if miss {
        return Reply::Rejected;
    }
    let reply = root.send(id, event);
    if reply.is_accepted() {
        tracing::trace!(?id, code = ?event.code(), "input accepted");
    }
    reply
}
