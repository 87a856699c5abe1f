use super::style::{get_skin, set_skin, set_style};
use super::default_layout;
use crate::element::{ChildOrder, ElementFlags, ElementId};
use crate::geometry::{AbsRect, AbsVec, CRect, MoveFlags, Transform};
use crate::input::standard_inject;
use crate::message::{DimKind, LayoutChangeKind, Message, MouseButton, MouseEvent, MsgCode, Reply};
use crate::render::standard_draw;
use crate::root::Root;
use smol_str::SmolStr;

/// Base behavior every other behavior eventually forwards to.
///
/// Structural messages (geometry, parenting, skin, style, naming) are
/// answered here; input and widget messages are rejected so the caller keeps
/// looking for a handler.
pub fn element_message(root: &mut Root, id: ElementId, msg: &Message) -> Reply {
    let Some(element) = root.tree.get(id) else {
        return Reply::Rejected;
    };
    match msg {
        Message::Construct | Message::Destroy | Message::ParentChange { .. } => Reply::Accepted,
        Message::Move { cause, child, diff } => on_move(root, id, *cause, *child, *diff),
        Message::SetArea(area) => set_area(root, id, area),
        Message::SetTransform(transform) => set_transform(root, id, transform),
        Message::SetFlag(flag, on) => {
            let mut flags = element.flags;
            flags.set(*flag, *on);
            set_flags(root, id, flags)
        }
        Message::SetFlags(flags) => set_flags(root, id, *flags),
        Message::GetFlags => Reply::Flags(element.flags),
        Message::SetMargin(margin) => set_inset(root, id, margin, MoveFlags::MARGIN),
        Message::GetMargin => Reply::Rect(element.geometry.margin),
        Message::SetPadding(padding) => set_inset(root, id, padding, MoveFlags::PADDING),
        Message::GetPadding => Reply::Rect(element.geometry.padding),
        Message::SetParent { parent, next } => set_parent(root, id, *parent, *next),
        Message::GetParent => Reply::Element(element.parent),
        Message::AddChild { child, next } => add_child(root, id, *child, *next),
        Message::RemoveChild(child) => remove_child(root, id, *child),
        Message::LayoutChange { kind, target, .. } => layout_change(root, id, *kind, *target),
        Message::LayoutFunction {
            kind,
            target,
            dim,
            force,
        } => {
            let flags = element.flags;
            if *force || flags.intersects(ElementFlags::EXPAND) {
                let leaving = target.filter(|_| *kind == LayoutChangeKind::Remove);
                Reply::Vec(default_layout(&root.tree, id, flags, *dim, leaving))
            } else {
                Reply::Rejected
            }
        }
        Message::Draw(args) => {
            standard_draw(root, id, args);
            Reply::Accepted
        }
        Message::Inject { event, area } => standard_inject(root, id, event, area.as_ref()),
        Message::GetClassName => Reply::ClassName("Element"),
        Message::GetSkin(child) => get_skin(root, id, *child),
        Message::SetSkin(skin) => set_skin(root, id, skin.clone()),
        Message::SetStyle(change) => set_style(root, id, change),
        Message::GetStyle => match (element.style, element.parent) {
            (Some(style), _) => Reply::Style(Some(style)),
            (None, Some(parent)) => root.send(parent, msg),
            (None, None) => Reply::Style(None),
        },
        Message::GetName => Reply::Name(element.name.clone()),
        Message::SetName(name) => {
            if let Some(element) = root.tree.get_mut(id) {
                element.name = name.clone();
            }
            root.send(id, &Message::SetSkin(None));
            Reply::Accepted
        }
        Message::GetDpi | Message::GetLineHeight | Message::GotFocus => match element.parent {
            Some(parent) => root.send(parent, msg),
            None => Reply::Rejected,
        },
        Message::SetDpi(_) => {
            let mut cur = element.first_child(ChildOrder::All);
            while let Some(child) = cur {
                cur = root.tree.next_sibling(child, ChildOrder::All);
                root.send(child, msg);
            }
            root.send(
                id,
                &Message::Move {
                    cause: MsgCode::SetDpi,
                    child: None,
                    diff: MoveFlags::RESIZE,
                },
            );
            Reply::Accepted
        }
        Message::TouchBegin(m) => touch(root, id, m, true, Message::MouseDown),
        Message::TouchEnd(m) => touch(root, id, m, false, Message::MouseUp),
        Message::TouchMove(m) => touch(root, id, m, true, Message::MouseMove),
        Message::MouseDblClick(m) => root.send(id, &Message::MouseDown(*m)),
        Message::GetUserData(key) => Reply::UserData(match key {
            None => element.user_data.clone(),
            Some(key) => element.user_table.get(key).cloned(),
        }),
        Message::SetUserData { key, value } => {
            set_user_data(root, id, key.as_ref(), value.clone());
            Reply::Accepted
        }
        Message::SetDim(kind, dim) => set_dim(root, id, *kind, *dim),
        Message::GetDim(kind) => Reply::Vec(match kind {
            DimKind::Min => element.geometry.min_dim,
            DimKind::Max => element.geometry.max_dim,
        }),
        Message::SetScaling(scaling) => {
            if element.geometry.scaling != *scaling {
                root.dirty(id);
                if let Some(element) = root.tree.get_mut(id) {
                    element.geometry.scaling = *scaling;
                }
            }
            Reply::Accepted
        }
        Message::GetScaling => Reply::Vec(element.geometry.scaling),
        _ => Reply::Rejected,
    }
}

/// Default destroy: detaches, destroys children, clears every root
/// reference to the element and frees it.
pub fn element_destroy(root: &mut Root, id: ElementId) {
    if !root.tree.contains(id) {
        return;
    }
    root.ids.remove_element(id);
    root.send(id, &Message::Destroy);

    let parent = root.tree.parent(id);
    if root.focus == Some(id) {
        root.focus = None;
        if let Some(parent) = parent {
            root.send(parent, &Message::GotFocus);
        }
    }
    if let Some(parent) = parent {
        root.send(parent, &Message::RemoveChild(id));
    }
    if root.tree.parent(id).is_some() {
        root.detach(id);
        if let Some(element) = root.tree.get_mut(id) {
            element.parent = None;
        }
    }

    while let Some(child) = root.tree.get(id).and_then(|e| e.first_child(ChildOrder::All)) {
        root.destroy(child);
        if root.tree.contains(child) {
            debug_assert!(false, "child survived destruction");
            break;
        }
    }

    root.release(id);
    debug_assert!(
        !root.references(id),
        "destroyed element still referenced by the root"
    );
    root.tree.remove(id);
    tracing::debug!(?id, "element destroyed");
}

/// Reports the area change to the parent, forwards layout notifications to
/// children, and turns child changes into `LayoutChange`.
fn on_move(
    root: &mut Root,
    id: ElementId,
    cause: MsgCode,
    child: Option<ElementId>,
    diff: MoveFlags,
) -> Reply {
    let parent = root.tree.parent(id);
    if child.is_none()
        && let Some(parent) = parent
    {
        root.send(
            parent,
            &Message::Move {
                cause,
                child: Some(id),
                diff: diff | MoveFlags::PROPAGATE,
            },
        );
    }

    if diff.contains(MoveFlags::PROPAGATE) {
        let moved = diff - MoveFlags::PROPAGATE;
        let background = child
            .and_then(|c| root.tree.get(c))
            .is_some_and(|c| c.flags.contains(ElementFlags::BACKGROUND));
        if !moved.is_empty() && !background {
            root.send(
                id,
                &Message::LayoutChange {
                    kind: LayoutChangeKind::Move,
                    target: child,
                    old: None,
                    diff: moved,
                },
            );
        }
        return Reply::Accepted;
    }
    if diff.is_empty() {
        return Reply::Accepted;
    }

    if diff.intersects(MoveFlags::RESIZE | MoveFlags::PADDING | MoveFlags::MARGIN) {
        root.send(
            id,
            &Message::LayoutChange {
                kind: LayoutChangeKind::Resize,
                target: None,
                old: None,
                diff,
            },
        );
    }

    let source = child.unwrap_or(id);
    let mut cur = root.tree.get(id).and_then(|e| e.first_child(ChildOrder::All));
    while let Some(c) = cur {
        cur = root.tree.next_sibling(c, ChildOrder::All);
        let Some(element) = root.tree.get(c) else {
            continue;
        };
        let mut pass = element.geometry.transform.area.potential_resize() & diff;
        // The content box shifts with this element's margin, and with its
        // padding for everything but backgrounds.
        let background = element.flags.contains(ElementFlags::BACKGROUND);
        if diff.contains(MoveFlags::MARGIN) || (diff.contains(MoveFlags::PADDING) && !background) {
            pass |= diff & MoveFlags::MOVE;
        }
        if !pass.is_empty() {
            root.send(
                c,
                &Message::Move {
                    cause,
                    child: Some(source),
                    diff: pass,
                },
            );
        }
    }
    Reply::Accepted
}

fn set_area(root: &mut Root, id: ElementId, area: &CRect) -> Reply {
    let Some(element) = root.tree.get(id) else {
        return Reply::Rejected;
    };
    let diff = element.geometry.transform.area.diff(area);
    if diff.is_empty() {
        return Reply::Moved(diff);
    }
    root.invalidate(id);
    if let Some(element) = root.tree.get_mut(id) {
        element.geometry.transform.area = *area;
    }
    root.invalidate(id);
    root.send(
        id,
        &Message::Move {
            cause: MsgCode::SetArea,
            child: None,
            diff,
        },
    );
    Reply::Moved(diff)
}

fn set_transform(root: &mut Root, id: ElementId, transform: &Transform) -> Reply {
    let mut diff = root.send(id, &Message::SetArea(transform.area)).moved();
    let Some(element) = root.tree.get(id) else {
        return Reply::Rejected;
    };
    let pivot = element.geometry.transform.pivot_diff(transform);
    if !pivot.is_empty() {
        root.invalidate(id);
        if let Some(element) = root.tree.get_mut(id) {
            element.geometry.transform.center = transform.center;
            element.geometry.transform.rotation = transform.rotation;
        }
        root.invalidate(id);
        root.send(
            id,
            &Message::Move {
                cause: MsgCode::SetTransform,
                child: None,
                diff: pivot,
            },
        );
        diff |= pivot;
    }
    Reply::Moved(diff)
}

fn set_inset(root: &mut Root, id: ElementId, value: &AbsRect, which: MoveFlags) -> Reply {
    let Some(element) = root.tree.get(id) else {
        return Reply::Rejected;
    };
    let geometry = &element.geometry;
    let old = if which == MoveFlags::MARGIN {
        geometry.margin
    } else {
        geometry.padding
    };
    let diff = old.diff(value);
    if diff.is_empty() {
        return Reply::Moved(diff);
    }
    root.invalidate(id);
    if let Some(element) = root.tree.get_mut(id) {
        if which == MoveFlags::MARGIN {
            element.geometry.margin = *value;
        } else {
            element.geometry.padding = *value;
        }
    }
    root.invalidate(id);
    let cause = if which == MoveFlags::MARGIN {
        MsgCode::SetMargin
    } else {
        MsgCode::SetPadding
    };
    root.send(
        id,
        &Message::Move {
            cause,
            child: None,
            diff: diff | which,
        },
    );
    Reply::Moved(diff | which)
}

fn set_dim(root: &mut Root, id: ElementId, kind: DimKind, dim: AbsVec) -> Reply {
    let Some(element) = root.tree.get(id) else {
        return Reply::Rejected;
    };
    let old = match kind {
        DimKind::Min => element.geometry.min_dim,
        DimKind::Max => element.geometry.max_dim,
    };
    let diff = resize_bits(old, dim);
    if diff.is_empty() {
        return Reply::Moved(diff);
    }
    root.invalidate(id);
    if let Some(element) = root.tree.get_mut(id) {
        match kind {
            DimKind::Min => element.geometry.min_dim = dim,
            DimKind::Max => element.geometry.max_dim = dim,
        }
    }
    root.invalidate(id);
    root.send(
        id,
        &Message::Move {
            cause: MsgCode::SetDim,
            child: None,
            diff,
        },
    );
    Reply::Moved(diff)
}

pub(crate) fn resize_bits(old: AbsVec, new: AbsVec) -> MoveFlags {
    let mut diff = MoveFlags::empty();
    if old.x != new.x {
        diff |= MoveFlags::RESIZE_X;
    }
    if old.y != new.y {
        diff |= MoveFlags::RESIZE_Y;
    }
    diff
}

fn set_flags(root: &mut Root, id: ElementId, flags: ElementFlags) -> Reply {
    let Some(element) = root.tree.get(id) else {
        return Reply::Rejected;
    };
    let old = element.flags;
    let parent = element.parent;
    let change = old ^ flags;
    if change.is_empty() {
        return Reply::Accepted;
    }

    if let Some(parent) = parent
        && change.contains(ElementFlags::BACKGROUND)
        && !old.contains(ElementFlags::BACKGROUND)
    {
        root.send(parent, &layout_notice(LayoutChangeKind::Remove, id));
    }

    if parent.is_some() && change.intersects(ElementFlags::IGNORE | ElementFlags::NOCLIP) {
        // Pointer checks only count while the element is hit-testable.
        if !old.contains(ElementFlags::IGNORE) {
            root.mouse_move_check(id);
        }
        if let Some(element) = root.tree.get_mut(id) {
            element.flags = flags;
        }
        root.tree.refresh_membership(id, old);
        if !flags.contains(ElementFlags::IGNORE) {
            root.mouse_move_check(id);
        }
    } else if let Some(element) = root.tree.get_mut(id) {
        element.flags = flags;
    }

    if let Some(parent) = parent
        && change.contains(ElementFlags::BACKGROUND)
        && !flags.contains(ElementFlags::BACKGROUND)
    {
        root.send(parent, &layout_notice(LayoutChangeKind::Add, id));
    }

    let expanded = change & ElementFlags::EXPAND & flags;
    if !expanded.is_empty() {
        if let Some(element) = root.tree.get_mut(id) {
            if expanded.contains(ElementFlags::EXPANDX) {
                element.geometry.layout_dim.x = 0.0;
            }
            if expanded.contains(ElementFlags::EXPANDY) {
                element.geometry.layout_dim.y = 0.0;
            }
        }
        root.send(
            id,
            &Message::LayoutChange {
                kind: LayoutChangeKind::Reset,
                target: None,
                old: None,
                diff: MoveFlags::empty(),
            },
        );
    }

    if change.intersects(ElementFlags::HIDDEN | ElementFlags::NOCLIP) {
        root.dirty(id);
    }
    Reply::Accepted
}

fn layout_notice(kind: LayoutChangeKind, target: ElementId) -> Message {
    Message::LayoutChange {
        kind,
        target: Some(target),
        old: None,
        diff: MoveFlags::empty(),
    }
}

fn set_parent(
    root: &mut Root,
    id: ElementId,
    parent: Option<ElementId>,
    next: Option<ElementId>,
) -> Reply {
    if let Some(parent) = parent
        && root.tree.is_within(parent, id)
    {
        return Reply::Rejected;
    }
    let current = root.tree.parent(id);
    if current == parent {
        let Some(parent) = parent else {
            return Reply::Accepted;
        };
        let old = root.tree.next_sibling(id, ChildOrder::All);
        if old == next || next == Some(id) {
            return Reply::Accepted;
        }
        if next.is_some_and(|n| root.tree.parent(n) != Some(parent)) {
            return Reply::Rejected;
        }
        root.detach(id);
        root.attach(id, next);
        let background = root
            .tree
            .get(id)
            .is_some_and(|e| e.flags.contains(ElementFlags::BACKGROUND));
        if !background {
            root.send(
                parent,
                &Message::LayoutChange {
                    kind: LayoutChangeKind::Reorder,
                    target: Some(id),
                    old,
                    diff: MoveFlags::empty(),
                },
            );
        }
        return Reply::Accepted;
    }

    // A rejected move must leave the tree unchanged.
    if next.is_some_and(|n| parent.is_none() || root.tree.parent(n) != parent) {
        return Reply::Rejected;
    }
    if let Some(current) = current {
        root.send(current, &Message::RemoveChild(id));
    }
    match parent {
        Some(parent) => root.send(parent, &Message::AddChild { child: id, next }),
        None => Reply::Accepted,
    }
}

fn add_child(root: &mut Root, id: ElementId, child: ElementId, next: Option<ElementId>) -> Reply {
    let Some(element) = root.tree.get(child) else {
        return Reply::Rejected;
    };
    if element.parent.is_some() {
        return root.send(
            child,
            &Message::SetParent {
                parent: Some(id),
                next,
            },
        );
    }
    if root.tree.is_within(id, child) || next.is_some_and(|n| root.tree.parent(n) != Some(id)) {
        return Reply::Rejected;
    }
    let background = element.flags.contains(ElementFlags::BACKGROUND);

    if let Some(element) = root.tree.get_mut(child) {
        element.parent = Some(id);
    }
    root.send(child, &Message::SetSkin(None));
    root.attach(child, next);
    if !background {
        root.send(id, &layout_notice(LayoutChangeKind::Add, child));
    }
    debug_assert!(root.tree.verify_orderings(id));

    let potential = parent_potential_resize(root, id);
    root.send(
        child,
        &Message::Move {
            cause: MsgCode::SetParent,
            child: None,
            diff: potential,
        },
    );
    root.send(
        child,
        &Message::ParentChange {
            new: Some(id),
            old: None,
        },
    );
    Reply::Accepted
}

fn remove_child(root: &mut Root, id: ElementId, child: ElementId) -> Reply {
    let Some(element) = root.tree.get(child) else {
        return Reply::Rejected;
    };
    if element.parent != Some(id) {
        return Reply::Rejected;
    }
    if !element.flags.contains(ElementFlags::BACKGROUND) {
        root.send(id, &layout_notice(LayoutChangeKind::Remove, child));
    }
    root.detach(child);
    if let Some(element) = root.tree.get_mut(child) {
        element.parent = None;
    }
    debug_assert!(root.tree.verify_orderings(id));

    root.send(child, &Message::SetSkin(None));
    let potential = parent_potential_resize(root, id);
    root.send(
        child,
        &Message::Move {
            cause: MsgCode::SetParent,
            child: None,
            diff: potential,
        },
    );
    root.send(
        child,
        &Message::ParentChange {
            new: None,
            old: Some(id),
        },
    );
    Reply::Accepted
}

fn parent_potential_resize(root: &Root, id: ElementId) -> MoveFlags {
    root.tree
        .get(id)
        .map(|e| e.geometry.transform.area.potential_resize())
        .unwrap_or_default()
}

/// Recomputes the auto-size of an expanding element and resizes it if the
/// result changed.
fn layout_change(
    root: &mut Root,
    id: ElementId,
    kind: LayoutChangeKind,
    target: Option<ElementId>,
) -> Reply {
    let Some(element) = root.tree.get(id) else {
        return Reply::Rejected;
    };
    let flags = element.flags;
    if !flags.intersects(ElementFlags::EXPAND) {
        return Reply::Accepted;
    }
    let current = element.geometry.layout_dim;
    let dim = root
        .send(
            id,
            &Message::LayoutFunction {
                kind,
                target,
                dim: current,
                force: false,
            },
        )
        .vec()
        .unwrap_or(current);
    debug_assert!(!dim.is_nan(), "layout function produced NaN");

    let mut diff = resize_bits(current, dim);
    if !flags.contains(ElementFlags::EXPANDX) {
        diff -= MoveFlags::RESIZE_X;
    }
    if !flags.contains(ElementFlags::EXPANDY) {
        diff -= MoveFlags::RESIZE_Y;
    }
    if diff.is_empty() {
        return Reply::Accepted;
    }
    root.invalidate(id);
    if let Some(element) = root.tree.get_mut(id) {
        element.geometry.layout_dim = dim;
    }
    root.invalidate(id);
    root.send(
        id,
        &Message::Move {
            cause: MsgCode::LayoutChange,
            child: None,
            diff,
        },
    );
    Reply::Accepted
}

fn touch(
    root: &mut Root,
    id: ElementId,
    event: &MouseEvent,
    down: bool,
    wrap: fn(MouseEvent) -> Message,
) -> Reply {
    root.mouse.buttons.left = down;
    let event = MouseEvent {
        button: Some(MouseButton::Left),
        buttons: root.mouse.buttons,
        ..*event
    };
    root.send(id, &wrap(event))
}

fn set_user_data(
    root: &mut Root,
    id: ElementId,
    key: Option<&SmolStr>,
    value: Option<crate::message::UserData>,
) {
    let Some(element) = root.tree.get_mut(id) else {
        return;
    };
    match (key, value) {
        (None, value) => element.user_data = value,
        (Some(key), Some(value)) => {
            element.user_table.insert(key.clone(), value);
        }
        (Some(key), None) => {
            element.user_table.remove(key);
        }
    }
}
