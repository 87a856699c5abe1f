mod draw;
mod headless;

pub use draw::*;
pub use headless::*;

use crate::element::ElementId;
use crate::geometry::{AbsRect, AbsVec, IntVec};
use crate::message::{Cursor, DrawAux, UserData};
use crate::skin::Visual;
use std::any::Any;

/// Backend handle for a decoded image or vector asset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AssetId(pub u64);

/// Backend handle for a loaded font face at a given size.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FontId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ClipboardKind {
    Text,
    Wave,
    Bitmap,
    File,
    Element,
    Custom,
}

/// Font request passed to [`Backend::create_font`].
#[derive(Clone, Debug, PartialEq)]
pub struct FontDesc<'a> {
    pub family: &'a str,
    pub weight: u16,
    pub italic: bool,
    /// Point size.
    pub size: u32,
    pub dpi: IntVec,
}

/// Platform services the tree calls into.
///
/// Only the clip stack is required; every other method has an inert default
/// so a backend implements what the platform actually offers. Failed resource
/// calls return `None` and the tree treats that as "no visual".
pub trait Backend: Any {
    /// Pushes `area` intersected with the current clip.
    fn push_clip(&mut self, area: &AbsRect, aux: &DrawAux);
    fn peek_clip(&self, aux: &DrawAux) -> AbsRect;
    fn pop_clip(&mut self, aux: &DrawAux);

    fn draw_visual(&mut self, _visual: &Visual, _area: &AbsRect, _aux: &DrawAux) {}

    fn draw_lines(&mut self, _points: &[AbsVec], _color: u32, _aux: &DrawAux) {}

    /// Called when something inside `id`'s rectangle needs repainting.
    fn dirty_element(&mut self, _id: ElementId) {}

    /// `data` is the payload registered for `cursor` on the root, if any.
    fn set_cursor(&mut self, _cursor: Cursor, _data: Option<&[u8]>) {}

    fn drag_start(&mut self, _kind: ClipboardKind, _data: &UserData, _draw: Option<ElementId>) {}

    fn clipboard_copy(&mut self, _kind: ClipboardKind, _data: &[u8]) -> bool {
        false
    }

    fn clipboard_exists(&self, _kind: ClipboardKind) -> bool {
        false
    }

    fn clipboard_paste(&mut self, _kind: ClipboardKind) -> Option<Vec<u8>> {
        None
    }

    fn clipboard_clear(&mut self) {}

    fn create_asset(&mut self, _data: &[u8]) -> Option<AssetId> {
        None
    }

    fn destroy_asset(&mut self, _asset: AssetId) {}

    fn asset_size(&self, _asset: AssetId, _dpi: IntVec) -> Option<AbsVec> {
        None
    }

    fn create_font(&mut self, _desc: &FontDesc<'_>) -> Option<FontId> {
        None
    }

    fn destroy_font(&mut self, _font: FontId) {}

    /// Size of `text` laid out with `font`, wrapped to `max_width` when set.
    fn measure_text(
        &self,
        _font: FontId,
        _text: &str,
        _line_height: f32,
        _max_width: Option<f32>,
    ) -> Option<AbsVec> {
        None
    }

    /// Pumps platform events. Returns `false` once the application should quit.
    fn process_messages(&mut self) -> bool {
        true
    }

    fn load_extension(&mut self, _name: &str) -> bool {
        false
    }

    fn terminate(&mut self) {}

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}
