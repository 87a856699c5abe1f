use crate::element::{ChildOrder, ElementFlags, ElementId};
use crate::geometry::AbsRect;
use crate::message::{DrawArgs, DrawAux, Message};
use crate::root::Root;
use crate::skin::{LayerPass, Skin, SkinLayer, StyleTarget, resolve_layer};
use std::borrow::Cow;
use std::rc::Rc;

/// Clip state while walking one level: whether this level pushed a clip
/// that is still on the backend's stack.
#[derive(Clone, Copy, Debug, Default)]
struct ClipLevel {
    clipping: bool,
}

impl ClipLevel {
    /// Clipping children get `area` pushed once; a no-clip child pops it
    /// again until the next clipping sibling.
    fn enter(&mut self, root: &mut Root, flags: ElementFlags, area: &AbsRect, aux: &DrawAux) {
        let noclip = flags.contains(ElementFlags::NOCLIP);
        if !self.clipping && !noclip {
            root.backend.push_clip(area, aux);
            self.clipping = true;
        } else if self.clipping && noclip {
            root.backend.pop_clip(aux);
            self.clipping = false;
        }
    }

    fn leave(self, root: &mut Root, aux: &DrawAux) {
        if self.clipping {
            root.backend.pop_clip(aux);
        }
    }
}

/// Default draw handler: background skin layers, visible children in
/// z-order, then foreground skin layers.
///
/// A culled element only walks its no-clip children and no-clip skin layers,
/// since nothing else inside it can be on screen.
pub fn standard_draw(root: &mut Root, id: ElementId, args: &DrawArgs) {
    let Some(element) = root.tree.get(id) else {
        return;
    };
    let skin = element.skin.clone();
    let order = if args.culled {
        ChildOrder::NoClip
    } else {
        ChildOrder::All
    };
    let mut clip = ClipLevel::default();

    if let Some(skin) = &skin {
        draw_skin(root, id, skin, args, LayerPass::Background, &mut clip);
    }

    let mut cur = root.tree.get(id).and_then(|e| e.first_child(order));
    while let Some(child) = cur {
        cur = root.tree.next_sibling(child, order);
        draw_child(root, child, args, &mut clip);
    }

    if let Some(skin) = &skin {
        draw_skin(root, id, skin, args, LayerPass::Foreground, &mut clip);
    }
    clip.leave(root, &args.aux);
}

fn draw_child(root: &mut Root, child: ElementId, args: &DrawArgs, clip: &mut ClipLevel) {
    let Some(element) = root.tree.get(child) else {
        return;
    };
    if element.is_hidden() || root.topmost == Some(child) {
        return;
    }
    let flags = element.flags;
    let area = root.tree.resolve_rect_in(child, &args.area);
    clip.enter(root, flags, &args.area, &args.aux);
    let culled = !area.intersects(&root.backend.peek_clip(&args.aux));
    root.send(
        child,
        &Message::Draw(DrawArgs {
            area,
            aux: args.aux,
            culled,
        }),
    );
}

fn draw_skin(
    root: &mut Root,
    id: ElementId,
    skin: &Rc<Skin>,
    args: &DrawArgs,
    pass: LayerPass,
    clip: &mut ClipLevel,
) {
    let padding = root.tree.get(id).map(|e| e.geometry.padding);
    for skin in skin.chain() {
        for layer in skin.layers.iter().filter(|layer| layer.pass == pass) {
            let layer = styled_layer(root, id, layer);
            if args.culled && !layer.flags.contains(ElementFlags::NOCLIP) {
                continue;
            }
            draw_layer(root, id, &layer, &args.area, padding.as_ref(), &args.aux, clip);
        }
    }
}

/// Applies the element's layer-targeted overrides to a copy of `layer`.
fn styled_layer<'a>(root: &Root, id: ElementId, layer: &'a SkinLayer) -> Cow<'a, SkinLayer> {
    let Some(element) = root.tree.get(id) else {
        return Cow::Borrowed(layer);
    };
    let mut overrides = element
        .skin_style
        .for_target(StyleTarget::Layer(layer.id))
        .peekable();
    if overrides.peek().is_none() {
        return Cow::Borrowed(layer);
    }
    let mut copy = layer.clone();
    for message in overrides {
        copy.apply(message);
    }
    Cow::Owned(copy)
}

fn draw_layer(
    root: &mut Root,
    id: ElementId,
    layer: &SkinLayer,
    area: &AbsRect,
    padding: Option<&AbsRect>,
    aux: &DrawAux,
    clip: &mut ClipLevel,
) {
    if layer.flags.contains(ElementFlags::HIDDEN) {
        return;
    }
    let padding = padding.filter(|_| !layer.flags.contains(ElementFlags::BACKGROUND));
    let rect = resolve_layer(layer, area, padding);
    clip.enter(root, layer.flags, area, aux);
    if rect.intersects(&root.backend.peek_clip(aux)) {
        root.backend.draw_visual(&layer.visual, &rect, aux);
    }

    let mut inner = ClipLevel::default();
    for child in &layer.children {
        let child = styled_layer(root, id, child);
        draw_layer(root, id, &child, &rect, Some(&layer.geometry.padding), aux, &mut inner);
    }
    inner.leave(root, aux);
}

#[cfg(test)]
mod tests {
    use crate::element::{ElementFlags, ElementId};
    use crate::geometry::{AbsRect, CRect};
    use crate::message::{Message, StyleChange};
    use crate::render::{DrawCommand, HeadlessBackend};
    use crate::root::{ElementDesc, Root, RootConfig};
    use crate::skin::{Skin, SkinLayer, Style, Visual};
    use std::rc::Rc;

    fn rect(fill: u32) -> Visual {
        Visual::Rect {
            fill,
            edge: 0,
            outline: 0.0,
        }
    }

    fn child(root: &mut Root, parent: ElementId, area: CRect, flags: ElementFlags) -> ElementId {
        root.create(
            Some(parent),
            ElementDesc::new("element").area(area).flags(flags),
        )
        .expect("element")
    }

    fn headless(root: &Root) -> &HeadlessBackend {
        root.backend_as::<HeadlessBackend>().expect("headless backend")
    }

    #[test]
    fn clip_pushes_and_pops_balance() {
        let mut root = Root::headless(RootConfig::default());
        let top = root.id();
        let panel = child(&mut root, top, CRect::from_abs(0.0, 0.0, 100.0, 100.0), ElementFlags::empty());
        child(&mut root, panel, CRect::from_abs(0.0, 0.0, 10.0, 10.0), ElementFlags::empty());
        child(&mut root, panel, CRect::from_abs(90.0, 90.0, 300.0, 300.0), ElementFlags::NOCLIP);
        child(&mut root, panel, CRect::from_abs(20.0, 20.0, 30.0, 30.0), ElementFlags::empty());

        root.draw();
        let backend = headless(&root);
        assert_eq!(backend.clip_depth(), 0);
        let pushes = backend
            .commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::PushClip(_)))
            .count();
        let pops = backend
            .commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::PopClip))
            .count();
        assert_eq!(pushes, pops);
        assert!(pushes >= 3);
    }

    #[test]
    fn skin_layers_draw_around_children_inherited_first() {
        let base = Rc::new(Skin::new().with_layer(SkinLayer::new(1, CRect::fill().into(), rect(1))));
        let skin = Rc::new(
            Skin::inheriting(base)
                .with_layer(SkinLayer::new(2, CRect::fill().into(), rect(2)))
                .with_layer(SkinLayer::new(3, CRect::fill().into(), rect(3)).foreground()),
        );
        let mut root = Root::headless(RootConfig::default());
        let top = root.id();
        let panel = child(&mut root, top, CRect::from_abs(0.0, 0.0, 100.0, 100.0), ElementFlags::empty());
        root.send(panel, &Message::SetSkin(Some(skin)));
        let inner = child(&mut root, panel, CRect::from_abs(0.0, 0.0, 10.0, 10.0), ElementFlags::empty());
        let inner_skin = Rc::new(Skin::new().with_layer(SkinLayer::new(9, CRect::fill().into(), rect(9))));
        root.send(inner, &Message::SetSkin(Some(inner_skin)));

        root.draw();
        let fills: Vec<u32> = headless(&root)
            .visuals()
            .filter_map(|(visual, _)| match visual {
                Visual::Rect { fill, .. } => Some(*fill),
                _ => None,
            })
            .collect();
        assert_eq!(fills, vec![1, 2, 9, 3]);
    }

    #[test]
    fn layer_overrides_apply_to_a_copy() {
        let skin = Rc::new(
            Skin::new()
                .with_layer(
                    SkinLayer::new(4, CRect::fill().into(), rect(0)).with_style(
                        1,
                        Style::new().with(Message::SetColor {
                            slot: 0,
                            color: 0xabcdef,
                        }),
                    ),
                ),
        );
        let mut root = Root::headless(RootConfig::default());
        let top = root.id();
        let panel = child(&mut root, top, CRect::from_abs(0.0, 0.0, 50.0, 50.0), ElementFlags::empty());
        root.send(panel, &Message::SetSkin(Some(skin.clone())));
        root.send(
            panel,
            &Message::SetStyle(StyleChange::Index {
                index: Some(1),
                mask: u32::MAX,
            }),
        );

        root.draw();
        let (visual, area) = headless(&root).visuals().next().expect("layer drawn");
        assert!(matches!(visual, Visual::Rect { fill: 0xabcdef, .. }));
        assert_eq!(*area, AbsRect::new(0.0, 0.0, 50.0, 50.0));
        assert!(matches!(skin.layers[0].visual, Visual::Rect { fill: 0, .. }));
    }

    #[test]
    fn hidden_and_topmost_children_are_skipped_in_tree_order() {
        let skin = Rc::new(Skin::new().with_layer(SkinLayer::new(1, CRect::fill().into(), rect(7))));
        let mut root = Root::headless(RootConfig::default());
        let top = root.id();
        let hidden = child(&mut root, top, CRect::from_abs(0.0, 0.0, 10.0, 10.0), ElementFlags::HIDDEN);
        let popup = child(&mut root, top, CRect::from_abs(0.0, 0.0, 10.0, 10.0), ElementFlags::empty());
        root.send(hidden, &Message::SetSkin(Some(skin.clone())));
        root.send(popup, &Message::SetSkin(Some(skin)));
        root.set_topmost(Some(popup));

        root.draw();
        let backend = headless(&root);
        let drawn: Vec<_> = backend.visuals().collect();
        assert_eq!(drawn, vec![(&rect(7), &AbsRect::new(0.0, 0.0, 10.0, 10.0))]);
        assert_eq!(backend.clip_depth(), 0);
    }

    fn fills(root: &Root) -> Vec<u32> {
        headless(root)
            .visuals()
            .filter_map(|(visual, _)| match visual {
                Visual::Rect { fill, .. } => Some(*fill),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn offscreen_parent_still_draws_noclip_descendants_and_layers() {
        let mut root = Root::headless(RootConfig::default());
        let top = root.id();
        let parent = child(
            &mut root,
            top,
            CRect::from_abs(2000.0, 2000.0, 2100.0, 2100.0),
            ElementFlags::empty(),
        );
        let overflow = SkinLayer {
            flags: ElementFlags::NOCLIP,
            ..SkinLayer::new(2, CRect::from_abs(-2000.0, -2000.0, -1900.0, -1900.0).into(), rect(2))
        };
        let skin = Rc::new(
            Skin::new()
                .with_layer(SkinLayer::new(1, CRect::fill().into(), rect(1)))
                .with_layer(overflow),
        );
        root.send(parent, &Message::SetSkin(Some(skin)));

        let escaped = child(
            &mut root,
            parent,
            CRect::from_abs(-2000.0, -2000.0, -1950.0, -1950.0),
            ElementFlags::NOCLIP,
        );
        let clipped = child(
            &mut root,
            parent,
            CRect::from_abs(-2000.0, -2000.0, -1950.0, -1950.0),
            ElementFlags::empty(),
        );
        root.send(
            escaped,
            &Message::SetSkin(Some(Rc::new(
                Skin::new().with_layer(SkinLayer::new(5, CRect::fill().into(), rect(5))),
            ))),
        );
        root.send(
            clipped,
            &Message::SetSkin(Some(Rc::new(
                Skin::new().with_layer(SkinLayer::new(6, CRect::fill().into(), rect(6))),
            ))),
        );

        root.draw();
        assert_eq!(fills(&root), vec![2, 5]);
        let (_, area) = headless(&root)
            .visuals()
            .find(|(visual, _)| matches!(visual, Visual::Rect { fill: 5, .. }))
            .expect("no-clip child drawn");
        assert_eq!(*area, AbsRect::new(0.0, 0.0, 50.0, 50.0));
        assert_eq!(headless(&root).clip_depth(), 0);
    }
}
