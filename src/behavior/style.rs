use crate::element::{ChildOrder, ElementId};
use crate::message::{Message, Reply, StyleChange};
use crate::root::Root;
use crate::skin::{STYLE_FLAG_MASK, Skin, SkinLayer, StyleOverrides, StyleTarget, same_skin, set_bits};
use std::rc::Rc;

/// `GetSkin`: with a child, looks for a sub-skin keyed by the child's name
/// and then its class name, asking ancestors when this skin has none.
pub(super) fn get_skin(root: &mut Root, id: ElementId, child: Option<ElementId>) -> Reply {
    let Some(element) = root.tree.get(id) else {
        return Reply::Rejected;
    };
    let Some(child) = child else {
        return Reply::Skin(element.skin.clone());
    };
    let skin = element.skin.clone();
    let parent = element.parent;

    if let Some(skin) = skin {
        for query in [Message::GetName, Message::GetClassName] {
            let found = root
                .send(child, &query)
                .name()
                .and_then(|key| skin.find_subskin(&key));
            if found.is_some() {
                return Reply::Skin(found);
            }
        }
    }
    match parent {
        Some(parent) => root.send(parent, &Message::GetSkin(Some(child))),
        None => Reply::Skin(None),
    }
}

/// `SetSkin`: `None` re-derives the skin from the parent. A changed skin
/// rebuilds the element's stored overrides and applies the element-targeted
/// ones; children are always re-skinned and the style recalculated.
pub(super) fn set_skin(root: &mut Root, id: ElementId, skin: Option<Rc<Skin>>) -> Reply {
    let Some(element) = root.tree.get(id) else {
        return Reply::Rejected;
    };
    let skin = match (skin, element.parent) {
        (Some(skin), _) => Some(skin),
        (None, Some(parent)) => root.send(parent, &Message::GetSkin(Some(id))).skin(),
        (None, None) => None,
    };

    let changed = root
        .tree
        .get(id)
        .is_some_and(|e| !same_skin(&e.skin, &skin));
    if changed {
        root.dirty(id);
        let mut own = Vec::new();
        if let Some(element) = root.tree.get_mut(id) {
            element.skin_style.clear();
            if let Some(skin) = &skin {
                for skin in skin.chain() {
                    for message in &skin.style.messages {
                        element.skin_style.insert(StyleTarget::Own, message.clone());
                    }
                }
            }
            element.skin = skin;
            let layout = element.layout_style.clone();
            element.skin_style.merge(&layout);
            own.extend(element.skin_style.for_target(StyleTarget::Own).cloned());
        }
        for message in &own {
            root.send(id, message);
        }
    }

    let mut cur = root.tree.get(id).and_then(|e| e.first_child(ChildOrder::All));
    while let Some(child) = cur {
        cur = root.tree.next_sibling(child, ChildOrder::All);
        root.send(child, &Message::SetSkin(None));
    }
    root.send(id, &Message::SetStyle(StyleChange::RECALC));
    Reply::Accepted
}

/// `SetStyle`: updates the element's style index, recalculates children,
/// then applies every matching skin style.
pub(super) fn set_style(root: &mut Root, id: ElementId, change: &StyleChange) -> Reply {
    if let StyleChange::Apply(style) = change {
        for message in &style.messages {
            root.send(id, message);
        }
        return Reply::Accepted;
    }
    let Some(index) = update_index(root, id, change) else {
        return Reply::Rejected;
    };

    let mut cur = root.tree.get(id).and_then(|e| e.first_child(ChildOrder::All));
    while let Some(child) = cur {
        cur = root.tree.next_sibling(child, ChildOrder::All);
        root.send(child, &Message::SetStyle(StyleChange::RECALC));
    }

    let Some(element) = root.tree.get(id) else {
        return Reply::Rejected;
    };
    let Some(skin) = element.skin.clone() else {
        return Reply::Accepted;
    };
    let flags = element.style.unwrap_or(index) & STYLE_FLAG_MASK;
    let index = index & !STYLE_FLAG_MASK;

    if let Some(element) = root.tree.get_mut(id) {
        for skin in skin.chain() {
            for layer in &skin.layers {
                store_layer_styles(&mut element.skin_style, layer, index, flags);
            }
        }
    }
    for bit in set_bits(index) {
        if let Some(style) = skin.style_for(bit, flags) {
            root.send(id, &Message::SetStyle(StyleChange::Apply(style)));
        }
    }
    Reply::Accepted
}

/// Applies `change` to the stored index and returns the index to apply.
fn update_index(root: &mut Root, id: ElementId, change: &StyleChange) -> Option<u32> {
    let (bits, set) = match change {
        StyleChange::Index { index, mask } => return update_masked(root, id, *index, *mask),
        StyleChange::Name { name, mask } => {
            let index = root.style_names.get_or_alloc(name, false)?;
            return update_masked(root, id, Some(index), *mask);
        }
        StyleChange::SetFlag(name) => (root.style_names.get_or_alloc(name, true)?, true),
        StyleChange::RemoveFlag(name) => (root.style_names.get_or_alloc(name, true)?, false),
        StyleChange::SetFlagIndex(bits) => (*bits, true),
        StyleChange::RemoveFlagIndex(bits) => (*bits, false),
        StyleChange::Apply(_) => return None,
    };
    let element = root.tree.get_mut(id)?;
    let mut style = element.style.unwrap_or(0);
    if set {
        style |= bits;
    } else {
        style &= !bits;
    }
    element.style = Some(style);
    Some(style)
}

fn update_masked(root: &mut Root, id: ElementId, index: Option<u32>, mask: u32) -> Option<u32> {
    let Some(index) = index else {
        return Some(root.send(id, &Message::GetStyle).style().unwrap_or(0));
    };
    let element = root.tree.get_mut(id)?;
    element.style = Some(match element.style {
        Some(style) => index | (style & !mask),
        None => index,
    });
    Some(index)
}

fn store_layer_styles(overrides: &mut StyleOverrides, layer: &SkinLayer, index: u32, flags: u32) {
    for bit in set_bits(index) {
        if let Some(style) = layer.style_for(bit, flags) {
            for message in &style.messages {
                overrides.insert(StyleTarget::Layer(layer.id), message.clone());
            }
        }
    }
    for child in &layer.children {
        store_layer_styles(overrides, child, index, flags);
    }
}
