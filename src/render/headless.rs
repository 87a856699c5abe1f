use super::{AssetId, Backend, ClipboardKind, FontDesc, FontId};
use crate::element::ElementId;
use crate::geometry::{AbsRect, AbsVec, IntVec};
use crate::message::{Cursor, DrawAux, UserData};
use crate::skin::Visual;
use rustc_hash::FxHashMap;
use std::any::Any;

/// One recorded backend call.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    PushClip(AbsRect),
    PopClip,
    Visual { visual: Visual, area: AbsRect },
    Lines { points: Vec<AbsVec>, color: u32 },
}

/// In-memory backend. Records every call so tests can assert on what the
/// tree asked for; resources are bookkeeping entries only.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    pub commands: Vec<DrawCommand>,
    pub dirty: Vec<ElementId>,
    pub cursor: Option<Cursor>,
    pub drags: Vec<(ClipboardKind, Option<ElementId>)>,
    pub terminated: bool,
    clips: Vec<AbsRect>,
    max_clip_depth: usize,
    clipboard: FxHashMap<ClipboardKind, Vec<u8>>,
    assets: FxHashMap<AssetId, usize>,
    fonts: FxHashMap<FontId, u32>,
    next_handle: u64,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current clip stack depth; zero between frames when pushes and pops
    /// balance.
    pub fn clip_depth(&self) -> usize {
        self.clips.len()
    }

    pub fn max_clip_depth(&self) -> usize {
        self.max_clip_depth
    }

    /// Visuals drawn since the last [`HeadlessBackend::clear`], in order.
    pub fn visuals(&self) -> impl Iterator<Item = (&Visual, &AbsRect)> {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Visual { visual, area } => Some((visual, area)),
            _ => None,
        })
    }

    pub fn clear(&mut self) {
        self.commands.clear();
        self.dirty.clear();
        self.max_clip_depth = self.clips.len();
    }

    fn handle(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }
}

impl Backend for HeadlessBackend {
    fn push_clip(&mut self, area: &AbsRect, _aux: &DrawAux) {
        let clip = self
            .clips
            .last()
            .map_or(*area, |top| top.intersection(area));
        self.clips.push(clip);
        self.max_clip_depth = self.max_clip_depth.max(self.clips.len());
        self.commands.push(DrawCommand::PushClip(clip));
    }

    fn peek_clip(&self, _aux: &DrawAux) -> AbsRect {
        self.clips.last().copied().unwrap_or(AbsRect::INFINITE)
    }

    fn pop_clip(&mut self, _aux: &DrawAux) {
        debug_assert!(!self.clips.is_empty(), "clip stack underflow");
        self.clips.pop();
        self.commands.push(DrawCommand::PopClip);
    }

    fn draw_visual(&mut self, visual: &Visual, area: &AbsRect, _aux: &DrawAux) {
        self.commands.push(DrawCommand::Visual {
            visual: visual.clone(),
            area: *area,
        });
    }

    fn draw_lines(&mut self, points: &[AbsVec], color: u32, _aux: &DrawAux) {
        self.commands.push(DrawCommand::Lines {
            points: points.to_vec(),
            color,
        });
    }

    fn dirty_element(&mut self, id: ElementId) {
        self.dirty.push(id);
    }

    fn set_cursor(&mut self, cursor: Cursor, _data: Option<&[u8]>) {
        self.cursor = Some(cursor);
    }

    fn drag_start(&mut self, kind: ClipboardKind, _data: &UserData, draw: Option<ElementId>) {
        self.drags.push((kind, draw));
    }

    fn clipboard_copy(&mut self, kind: ClipboardKind, data: &[u8]) -> bool {
        self.clipboard.insert(kind, data.to_vec());
        true
    }

    fn clipboard_exists(&self, kind: ClipboardKind) -> bool {
        self.clipboard.contains_key(&kind)
    }

    fn clipboard_paste(&mut self, kind: ClipboardKind) -> Option<Vec<u8>> {
        self.clipboard.get(&kind).cloned()
    }

    fn clipboard_clear(&mut self) {
        self.clipboard.clear();
    }

    fn create_asset(&mut self, data: &[u8]) -> Option<AssetId> {
        if data.is_empty() {
            return None;
        }
        let id = AssetId(self.handle());
        self.assets.insert(id, data.len());
        Some(id)
    }

    fn destroy_asset(&mut self, asset: AssetId) {
        self.assets.remove(&asset);
    }

    fn asset_size(&self, asset: AssetId, _dpi: IntVec) -> Option<AbsVec> {
        self.assets.get(&asset).map(|_| AbsVec::ZERO)
    }

    fn create_font(&mut self, desc: &FontDesc<'_>) -> Option<FontId> {
        if desc.family.is_empty() || desc.size == 0 {
            return None;
        }
        let id = FontId(self.handle());
        self.fonts.insert(id, desc.size);
        Some(id)
    }

    fn destroy_font(&mut self, font: FontId) {
        self.fonts.remove(&font);
    }

    /// Fixed-advance metrics: every character is half the point size wide.
    fn measure_text(
        &self,
        font: FontId,
        text: &str,
        line_height: f32,
        max_width: Option<f32>,
    ) -> Option<AbsVec> {
        let size = *self.fonts.get(&font)? as f32;
        let advance = size * 0.5;
        let width = text.chars().count() as f32 * advance;
        Some(match max_width {
            Some(max) if max > 0.0 && width > max => {
                let lines = (width / max).ceil();
                AbsVec::new(max, lines * line_height)
            }
            _ => AbsVec::new(width, line_height),
        })
    }

    fn terminate(&mut self) {
        self.terminated = true;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::{DrawCommand, HeadlessBackend};
    use crate::geometry::{AbsRect, AbsVec, IntVec};
    use crate::message::DrawAux;
    use crate::render::{Backend, ClipboardKind, FontDesc};

    #[test]
    fn clips_intersect_with_the_enclosing_clip() {
        let mut backend = HeadlessBackend::new();
        let aux = DrawAux::default();
        assert_eq!(backend.peek_clip(&aux), AbsRect::INFINITE);
        backend.push_clip(&AbsRect::new(0.0, 0.0, 100.0, 100.0), &aux);
        backend.push_clip(&AbsRect::new(50.0, 50.0, 200.0, 200.0), &aux);
        assert_eq!(backend.peek_clip(&aux), AbsRect::new(50.0, 50.0, 100.0, 100.0));
        backend.pop_clip(&aux);
        backend.pop_clip(&aux);
        assert_eq!(backend.clip_depth(), 0);
        assert_eq!(backend.max_clip_depth(), 2);
        assert_eq!(backend.commands.last(), Some(&DrawCommand::PopClip));
    }

    #[test]
    fn clipboard_round_trips_per_kind() {
        let mut backend = HeadlessBackend::new();
        assert!(!backend.clipboard_exists(ClipboardKind::Text));
        assert!(backend.clipboard_copy(ClipboardKind::Text, b"hello"));
        assert_eq!(backend.clipboard_paste(ClipboardKind::Text).as_deref(), Some(&b"hello"[..]));
        assert!(backend.clipboard_paste(ClipboardKind::Bitmap).is_none());
        backend.clipboard_clear();
        assert!(!backend.clipboard_exists(ClipboardKind::Text));
    }

    #[test]
    fn failed_resource_calls_return_no_handle() {
        let mut backend = HeadlessBackend::new();
        assert!(backend.create_asset(&[]).is_none());
        let desc = FontDesc {
            family: "",
            weight: 400,
            italic: false,
            size: 12,
            dpi: IntVec::new(96, 96),
        };
        assert!(backend.create_font(&desc).is_none());

        let font = backend
            .create_font(&FontDesc {
                family: "mono",
                ..desc
            })
            .expect("font");
        assert_eq!(
            backend.measure_text(font, "abcd", 14.0, None),
            Some(AbsVec::new(24.0, 14.0))
        );
        assert_eq!(
            backend.measure_text(font, "abcd", 14.0, Some(12.0)),
            Some(AbsVec::new(12.0, 28.0))
        );
        backend.destroy_font(font);
        assert!(backend.measure_text(font, "abcd", 14.0, None).is_none());
    }
}
