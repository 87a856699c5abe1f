mod overrides;

pub use overrides::*;

use crate::element::ElementFlags;
use crate::geometry::{AbsRect, Geometry, Transform};
use crate::message::{DimKind, Message};
use crate::render::{AssetId, FontId};
use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use std::rc::Rc;

/// Style-index bits reserved for flag styles (hover, pressed, ...); the lower
/// half holds mutually exclusive named styles.
pub const STYLE_FLAG_MASK: u32 = 0xFFFF_0000;

/// A list of messages applied to an element when the style is selected.
#[derive(Clone, Debug, Default)]
pub struct Style {
    pub messages: Vec<Message>,
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }
}

/// Which side of an element's children a skin layer is drawn on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LayerPass {
    #[default]
    Background,
    Foreground,
}

/// What a skin layer puts on screen. Handles are owned by the backend.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Visual {
    #[default]
    Empty,
    Rect {
        fill: u32,
        edge: u32,
        outline: f32,
    },
    Asset {
        asset: AssetId,
        color: u32,
    },
    Text {
        font: FontId,
        text: SmolStr,
        color: u32,
    },
}

impl Visual {
    fn set_color(&mut self, slot: u16, value: u32) {
        match self {
            Visual::Rect { fill, edge, .. } => {
                if slot == 0 {
                    *fill = value;
                } else {
                    *edge = value;
                }
            }
            Visual::Asset { color, .. } | Visual::Text { color, .. } => *color = value,
            Visual::Empty => {}
        }
    }
}

/// A decoration node drawn around an element's children. Layers are plain
/// data; styling is applied to a copy at draw time.
#[derive(Clone, Debug, Default)]
pub struct SkinLayer {
    /// Key used by layer-targeted style overrides.
    pub id: u32,
    pub geometry: Geometry,
    pub flags: ElementFlags,
    pub pass: LayerPass,
    pub visual: Visual,
    pub styles: FxHashMap<u32, Rc<Style>>,
    pub children: Vec<SkinLayer>,
}

impl SkinLayer {
    pub fn new(id: u32, transform: Transform, visual: Visual) -> Self {
        Self {
            id,
            geometry: Geometry::new(transform),
            visual,
            ..Self::default()
        }
    }

    pub fn foreground(mut self) -> Self {
        self.pass = LayerPass::Foreground;
        self
    }

    pub fn with_style(mut self, index: u32, style: Style) -> Self {
        self.styles.insert(index, Rc::new(style));
        self
    }

    pub fn with_child(mut self, child: SkinLayer) -> Self {
        self.children.push(child);
        self
    }

    /// Applies a stored override to this layer. Returns `false` for messages
    /// a layer has no state for.
    pub fn apply(&mut self, message: &Message) -> bool {
        match message {
            Message::SetArea(area) => self.geometry.transform.area = *area,
            Message::SetTransform(transform) => self.geometry.transform = *transform,
            Message::SetMargin(margin) => self.geometry.margin = *margin,
            Message::SetPadding(padding) => self.geometry.padding = *padding,
            Message::SetFlags(flags) => self.flags = *flags,
            Message::SetFlag(flag, on) => self.flags.set(*flag, *on),
            Message::SetDim(DimKind::Min, dim) => self.geometry.min_dim = *dim,
            Message::SetDim(DimKind::Max, dim) => self.geometry.max_dim = *dim,
            Message::SetScaling(scaling) => self.geometry.scaling = *scaling,
            Message::SetColor { slot, color } => self.visual.set_color(*slot, *color),
            _ => return false,
        }
        true
    }

    /// Style stored for `index`, falling back to the flag-less index.
    pub fn style_for(&self, index: u32, flags: u32) -> Option<Rc<Style>> {
        lookup_style(&self.styles, index, flags)
    }
}

/// Visual description shared by many elements. A skin optionally inherits
/// from another skin, whose layers and base style apply first.
#[derive(Clone, Debug, Default)]
pub struct Skin {
    pub inherit: Option<Rc<Skin>>,
    /// Messages applied to the element whenever this skin is set.
    pub style: Style,
    pub styles: FxHashMap<u32, Rc<Style>>,
    pub layers: Vec<SkinLayer>,
    /// Skins for descendants, keyed by element name or class name.
    pub subskins: FxHashMap<SmolStr, Rc<Skin>>,
}

impl Skin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inheriting(inherit: Rc<Skin>) -> Self {
        Self {
            inherit: Some(inherit),
            ..Self::default()
        }
    }

    pub fn with_layer(mut self, layer: SkinLayer) -> Self {
        self.layers.push(layer);
        self
    }

    pub fn with_style(mut self, index: u32, style: Style) -> Self {
        self.styles.insert(index, Rc::new(style));
        self
    }

    pub fn with_subskin(mut self, key: impl Into<SmolStr>, skin: Rc<Skin>) -> Self {
        self.subskins.insert(key.into(), skin);
        self
    }

    /// Sub-skin for `key`, searching inherited skins as well.
    pub fn find_subskin(&self, key: &str) -> Option<Rc<Skin>> {
        self.subskins
            .get(key)
            .cloned()
            .or_else(|| self.inherit.as_ref().and_then(|s| s.find_subskin(key)))
    }

    /// Style for `index | flags`, falling back to `index` and then to the
    /// inherited skin.
    pub fn style_for(&self, index: u32, flags: u32) -> Option<Rc<Style>> {
        lookup_style(&self.styles, index, flags)
            .or_else(|| self.inherit.as_ref().and_then(|s| s.style_for(index, flags)))
    }

    /// Inherited skins first, then this one.
    pub fn chain(self: &Rc<Self>) -> Vec<Rc<Skin>> {
        let mut chain: Vec<Rc<Skin>> =
            std::iter::successors(Some(self.clone()), |s| s.inherit.clone()).collect();
        chain.reverse();
        chain
    }
}

fn lookup_style(styles: &FxHashMap<u32, Rc<Style>>, index: u32, flags: u32) -> Option<Rc<Style>> {
    styles
        .get(&(index | flags))
        .or_else(|| (flags != 0).then(|| styles.get(&index)).flatten())
        .cloned()
}

pub(crate) fn same_skin(a: &Option<Rc<Skin>>, b: &Option<Rc<Skin>>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => Rc::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}

/// Allocates style bits for style names. Plain names get bits from the
/// lower half, flag names from [`STYLE_FLAG_MASK`].
#[derive(Debug, Default)]
pub struct StyleNames {
    names: FxHashMap<SmolStr, u32>,
    next_plain: u32,
    next_flag: u32,
}

impl StyleNames {
    /// Bit for `name`, allocating one if needed. Returns `None` once the
    /// relevant half is exhausted.
    pub fn get_or_alloc(&mut self, name: &str, flag: bool) -> Option<u32> {
        if let Some(&bit) = self.names.get(name) {
            return Some(bit);
        }
        let bit = if flag {
            let shift = 16 + self.next_flag;
            (shift < 32).then(|| {
                self.next_flag += 1;
                1u32 << shift
            })?
        } else {
            (self.next_plain < 16).then(|| {
                self.next_plain += 1;
                1u32 << (self.next_plain - 1)
            })?
        };
        self.names.insert(SmolStr::new(name), bit);
        Some(bit)
    }

    pub fn get(&self, name: &str) -> Option<u32> {
        self.names.get(name).copied()
    }
}

/// Iterates the set bits of `bits` from most to least significant.
pub(crate) fn set_bits(mut bits: u32) -> impl Iterator<Item = u32> {
    std::iter::from_fn(move || {
        if bits == 0 {
            return None;
        }
        let bit = 1u32 << (31 - bits.leading_zeros());
        bits ^= bit;
        Some(bit)
    })
}

/// Resolves a layer's rectangle inside the element's area, mirroring element
/// resolution.
pub fn resolve_layer(layer: &SkinLayer, area: &AbsRect, padding: Option<&AbsRect>) -> AbsRect {
    crate::geometry::resolve_standard(&layer.geometry, layer.flags, area, padding)
}

#[cfg(test)]
mod tests {
    use super::{STYLE_FLAG_MASK, Skin, SkinLayer, Style, StyleNames, Visual, set_bits};
    use crate::geometry::{AbsRect, CRect};
    use crate::message::Message;
    use std::rc::Rc;

    #[test]
    fn style_names_allocate_distinct_bits() {
        let mut names = StyleNames::default();
        let hover = names.get_or_alloc("hover", true).expect("flag bit");
        let big = names.get_or_alloc("big", false).expect("plain bit");
        assert_ne!(hover & STYLE_FLAG_MASK, 0);
        assert_eq!(big & STYLE_FLAG_MASK, 0);
        assert_eq!(names.get_or_alloc("hover", true), Some(hover));
        assert_eq!(names.get("missing"), None);
    }

    #[test]
    fn set_bits_walks_high_to_low() {
        assert_eq!(set_bits(0b1010).collect::<Vec<_>>(), vec![0b1000, 0b10]);
        assert_eq!(set_bits(0).count(), 0);
    }

    #[test]
    fn styles_fall_back_to_flagless_index_then_inherit() {
        let base = Rc::new(Skin::new().with_style(1, Style::new().with(Message::GotFocus)));
        let derived = Skin::inheriting(base.clone()).with_style(2, Style::new());
        assert!(derived.style_for(1, 1 << 16).is_some());
        assert!(derived.style_for(2, 0).is_some());
        assert!(derived.style_for(4, 0).is_none());
        assert_eq!(Rc::new(derived).chain().len(), 2);
    }

    #[test]
    fn subskins_are_found_through_inheritance() {
        let button = Rc::new(Skin::new());
        let base = Rc::new(Skin::new().with_subskin("Button", button.clone()));
        let derived = Skin::inheriting(base);
        let found = derived.find_subskin("Button").expect("subskin");
        assert!(Rc::ptr_eq(&found, &button));
    }

    #[test]
    fn layers_apply_geometry_and_color_overrides() {
        let mut layer = SkinLayer::new(
            7,
            CRect::fill().into(),
            Visual::Rect {
                fill: 0,
                edge: 0,
                outline: 1.0,
            },
        );
        assert!(layer.apply(&Message::SetMargin(AbsRect::new(1.0, 1.0, 1.0, 1.0))));
        assert!(layer.apply(&Message::SetColor { slot: 0, color: 0xff00ff }));
        assert!(!layer.apply(&Message::GotFocus));
        assert_eq!(layer.geometry.margin.left, 1.0);
        assert!(matches!(layer.visual, Visual::Rect { fill: 0xff00ff, .. }));
    }
}
