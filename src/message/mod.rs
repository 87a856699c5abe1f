mod event;

pub use event::*;

use crate::element::{ElementFlags, ElementId};
use crate::geometry::{AbsRect, AbsVec, CRect, IntVec, MoveFlags, Transform};
use crate::skin::{Skin, Style};
use smol_str::SmolStr;
use std::any::Any;
use std::fmt;
use std::rc::Rc;

/// Every operation an element can be asked to perform.
///
/// Derived behaviors match the variants they care about and hand everything
/// else to the base behavior.
#[derive(Clone, Debug)]
pub enum Message {
    Construct,
    Destroy,
    /// Layout notification. `child` is `None` when the element itself changed,
    /// otherwise the element the change originated from.
    Move {
        cause: MsgCode,
        child: Option<ElementId>,
        diff: MoveFlags,
    },
    SetArea(CRect),
    SetTransform(Transform),
    SetFlag(ElementFlags, bool),
    SetFlags(ElementFlags),
    GetFlags,
    SetMargin(AbsRect),
    GetMargin,
    SetPadding(AbsRect),
    GetPadding,
    /// Detach from the current parent and attach before `next` under `parent`.
    SetParent {
        parent: Option<ElementId>,
        next: Option<ElementId>,
    },
    GetParent,
    AddChild {
        child: ElementId,
        next: Option<ElementId>,
    },
    RemoveChild(ElementId),
    ParentChange {
        new: Option<ElementId>,
        old: Option<ElementId>,
    },
    LayoutChange {
        kind: LayoutChangeKind,
        target: Option<ElementId>,
        old: Option<ElementId>,
        diff: MoveFlags,
    },
    /// Computes an auto-size; answered with `Reply::Vec`.
    LayoutFunction {
        kind: LayoutChangeKind,
        target: Option<ElementId>,
        dim: AbsVec,
        /// Run even without an expand flag.
        force: bool,
    },
    Draw(DrawArgs),
    /// Hit-test `event` against this subtree. `area` is the parent's resolved
    /// rectangle, or `None` to resolve the full chain.
    Inject {
        event: Rc<Message>,
        area: Option<AbsRect>,
    },
    GetClassName,
    /// With `Some(child)`, looks up the skin the child should inherit.
    GetSkin(Option<ElementId>),
    /// `None` re-derives the skin from the parent.
    SetSkin(Option<Rc<Skin>>),
    SetStyle(StyleChange),
    GetStyle,
    GetName,
    SetName(Option<SmolStr>),
    GetDpi,
    SetDpi(IntVec),
    GetLineHeight,
    SetLineHeight(f32),
    /// `None` addresses the untyped slot, `Some(key)` the keyed table.
    GetUserData(Option<SmolStr>),
    SetUserData {
        key: Option<SmolStr>,
        value: Option<UserData>,
    },
    SetDim(DimKind, AbsVec),
    GetDim(DimKind),
    SetScaling(AbsVec),
    GetScaling,
    GotFocus,
    LostFocus,
    MouseDown(MouseEvent),
    MouseUp(MouseEvent),
    MouseMove(MouseEvent),
    MouseOn(MouseEvent),
    MouseOff(MouseEvent),
    MouseDblClick(MouseEvent),
    MouseScroll(MouseEvent),
    TouchBegin(MouseEvent),
    TouchEnd(MouseEvent),
    TouchMove(MouseEvent),
    KeyDown(KeyEvent),
    KeyUp(KeyEvent),
    KeyChar(KeyEvent),
    JoyButtonDown(JoyEvent),
    JoyButtonUp(JoyEvent),
    JoyAxis(JoyEvent),
    DragOver(MouseEvent),
    Drop(MouseEvent),
    GetValue(ValueKind),
    SetValue(Value),
    GetRange(ValueKind),
    SetRange(Value),
    GetItem(usize),
    SetColor {
        slot: u16,
        color: u32,
    },
}

/// Fieldless discriminant of [`Message`], used as a key for listeners and
/// style overrides.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MsgCode {
    Construct,
    Destroy,
    Move,
    SetArea,
    SetTransform,
    SetFlag,
    SetFlags,
    GetFlags,
    SetMargin,
    GetMargin,
    SetPadding,
    GetPadding,
    SetParent,
    GetParent,
    AddChild,
    RemoveChild,
    ParentChange,
    LayoutChange,
    LayoutFunction,
    Draw,
    Inject,
    GetClassName,
    GetSkin,
    SetSkin,
    SetStyle,
    GetStyle,
    GetName,
    SetName,
    GetDpi,
    SetDpi,
    GetLineHeight,
    SetLineHeight,
    GetUserData,
    SetUserData,
    SetDim,
    GetDim,
    SetScaling,
    GetScaling,
    GotFocus,
    LostFocus,
    MouseDown,
    MouseUp,
    MouseMove,
    MouseOn,
    MouseOff,
    MouseDblClick,
    MouseScroll,
    TouchBegin,
    TouchEnd,
    TouchMove,
    KeyDown,
    KeyUp,
    KeyChar,
    JoyButtonDown,
    JoyButtonUp,
    JoyAxis,
    DragOver,
    Drop,
    GetValue,
    SetValue,
    GetRange,
    SetRange,
    GetItem,
    SetColor,
}

impl Message {
    pub fn code(&self) -> MsgCode {
        match self {
            Message::Construct => MsgCode::Construct,
            Message::Destroy => MsgCode::Destroy,
            Message::Move { .. } => MsgCode::Move,
            Message::SetArea(_) => MsgCode::SetArea,
            Message::SetTransform(_) => MsgCode::SetTransform,
            Message::SetFlag(..) => MsgCode::SetFlag,
            Message::SetFlags(_) => MsgCode::SetFlags,
            Message::GetFlags => MsgCode::GetFlags,
            Message::SetMargin(_) => MsgCode::SetMargin,
            Message::GetMargin => MsgCode::GetMargin,
            Message::SetPadding(_) => MsgCode::SetPadding,
            Message::GetPadding => MsgCode::GetPadding,
            Message::SetParent { .. } => MsgCode::SetParent,
            Message::GetParent => MsgCode::GetParent,
            Message::AddChild { .. } => MsgCode::AddChild,
            Message::RemoveChild(_) => MsgCode::RemoveChild,
            Message::ParentChange { .. } => MsgCode::ParentChange,
            Message::LayoutChange { .. } => MsgCode::LayoutChange,
            Message::LayoutFunction { .. } => MsgCode::LayoutFunction,
            Message::Draw(_) => MsgCode::Draw,
            Message::Inject { .. } => MsgCode::Inject,
            Message::GetClassName => MsgCode::GetClassName,
            Message::GetSkin(_) => MsgCode::GetSkin,
            Message::SetSkin(_) => MsgCode::SetSkin,
            Message::SetStyle(_) => MsgCode::SetStyle,
            Message::GetStyle => MsgCode::GetStyle,
            Message::GetName => MsgCode::GetName,
            Message::SetName(_) => MsgCode::SetName,
            Message::GetDpi => MsgCode::GetDpi,
            Message::SetDpi(_) => MsgCode::SetDpi,
            Message::GetLineHeight => MsgCode::GetLineHeight,
            Message::SetLineHeight(_) => MsgCode::SetLineHeight,
            Message::GetUserData(_) => MsgCode::GetUserData,
            Message::SetUserData { .. } => MsgCode::SetUserData,
            Message::SetDim(..) => MsgCode::SetDim,
            Message::GetDim(_) => MsgCode::GetDim,
            Message::SetScaling(_) => MsgCode::SetScaling,
            Message::GetScaling => MsgCode::GetScaling,
            Message::GotFocus => MsgCode::GotFocus,
            Message::LostFocus => MsgCode::LostFocus,
            Message::MouseDown(_) => MsgCode::MouseDown,
            Message::MouseUp(_) => MsgCode::MouseUp,
            Message::MouseMove(_) => MsgCode::MouseMove,
            Message::MouseOn(_) => MsgCode::MouseOn,
            Message::MouseOff(_) => MsgCode::MouseOff,
            Message::MouseDblClick(_) => MsgCode::MouseDblClick,
            Message::MouseScroll(_) => MsgCode::MouseScroll,
            Message::TouchBegin(_) => MsgCode::TouchBegin,
            Message::TouchEnd(_) => MsgCode::TouchEnd,
            Message::TouchMove(_) => MsgCode::TouchMove,
            Message::KeyDown(_) => MsgCode::KeyDown,
            Message::KeyUp(_) => MsgCode::KeyUp,
            Message::KeyChar(_) => MsgCode::KeyChar,
            Message::JoyButtonDown(_) => MsgCode::JoyButtonDown,
            Message::JoyButtonUp(_) => MsgCode::JoyButtonUp,
            Message::JoyAxis(_) => MsgCode::JoyAxis,
            Message::DragOver(_) => MsgCode::DragOver,
            Message::Drop(_) => MsgCode::Drop,
            Message::GetValue(_) => MsgCode::GetValue,
            Message::SetValue(_) => MsgCode::SetValue,
            Message::GetRange(_) => MsgCode::GetRange,
            Message::SetRange(_) => MsgCode::SetRange,
            Message::GetItem(_) => MsgCode::GetItem,
            Message::SetColor { .. } => MsgCode::SetColor,
        }
    }

    /// Secondary key for operations whose payload meaning depends on a slot.
    pub fn subtype(&self) -> u16 {
        match self {
            Message::SetDim(kind, _) | Message::GetDim(kind) => *kind as u16,
            Message::SetColor { slot, .. } => *slot,
            _ => 0,
        }
    }

    /// Pointer payload for mouse, touch and drag messages.
    pub fn mouse(&self) -> Option<&MouseEvent> {
        match self {
            Message::MouseDown(m)
            | Message::MouseUp(m)
            | Message::MouseMove(m)
            | Message::MouseOn(m)
            | Message::MouseOff(m)
            | Message::MouseDblClick(m)
            | Message::MouseScroll(m)
            | Message::TouchBegin(m)
            | Message::TouchEnd(m)
            | Message::TouchMove(m)
            | Message::DragOver(m)
            | Message::Drop(m) => Some(m),
            _ => None,
        }
    }

    pub fn point(&self) -> Option<AbsVec> {
        self.mouse().map(|m| AbsVec::new(m.x, m.y))
    }

    /// Hit test used by injection. Messages without a pointer always hit.
    pub fn hits(&self, rect: &AbsRect) -> bool {
        self.point().is_none_or(|p| rect.contains(p.x, p.y))
    }

    pub fn is_keyboard(&self) -> bool {
        matches!(
            self,
            Message::KeyDown(_)
                | Message::KeyUp(_)
                | Message::KeyChar(_)
                | Message::JoyButtonDown(_)
                | Message::JoyButtonUp(_)
                | Message::JoyAxis(_)
        )
    }
}

/// Handler result. `Rejected` means "not handled, try elsewhere".
#[derive(Clone, Debug, Default)]
pub enum Reply {
    #[default]
    Rejected,
    Accepted,
    Value(i64),
    Float(f32),
    Flags(ElementFlags),
    Moved(MoveFlags),
    Element(Option<ElementId>),
    Skin(Option<Rc<Skin>>),
    Name(Option<SmolStr>),
    ClassName(&'static str),
    Vec(AbsVec),
    Rect(AbsRect),
    Dpi(IntVec),
    Style(Option<u32>),
    UserData(Option<UserData>),
    Cursor(Cursor),
}

impl Reply {
    pub fn is_accepted(&self) -> bool {
        !matches!(self, Reply::Rejected)
    }

    pub fn from_bool(accepted: bool) -> Self {
        if accepted {
            Reply::Accepted
        } else {
            Reply::Rejected
        }
    }

    pub fn element(&self) -> Option<ElementId> {
        match self {
            Reply::Element(id) => *id,
            _ => None,
        }
    }

    pub fn skin(&self) -> Option<Rc<Skin>> {
        match self {
            Reply::Skin(skin) => skin.clone(),
            _ => None,
        }
    }

    pub fn name(&self) -> Option<SmolStr> {
        match self {
            Reply::Name(name) => name.clone(),
            Reply::ClassName(name) => Some(SmolStr::new_static(name)),
            _ => None,
        }
    }

    pub fn vec(&self) -> Option<AbsVec> {
        match self {
            Reply::Vec(v) => Some(*v),
            _ => None,
        }
    }

    pub fn rect(&self) -> Option<AbsRect> {
        match self {
            Reply::Rect(r) => Some(*r),
            _ => None,
        }
    }

    pub fn flags(&self) -> Option<ElementFlags> {
        match self {
            Reply::Flags(f) => Some(*f),
            _ => None,
        }
    }

    pub fn moved(&self) -> MoveFlags {
        match self {
            Reply::Moved(diff) => *diff,
            _ => MoveFlags::empty(),
        }
    }

    pub fn dpi(&self) -> Option<IntVec> {
        match self {
            Reply::Dpi(dpi) => Some(*dpi),
            _ => None,
        }
    }

    pub fn float(&self) -> Option<f32> {
        match self {
            Reply::Float(f) => Some(*f),
            Reply::Value(v) => Some(*v as f32),
            _ => None,
        }
    }

    pub fn value(&self) -> Option<i64> {
        match self {
            Reply::Value(v) => Some(*v),
            _ => None,
        }
    }

    pub fn style(&self) -> Option<u32> {
        match self {
            Reply::Style(style) => *style,
            _ => None,
        }
    }

    pub fn user_data(&self) -> Option<UserData> {
        match self {
            Reply::UserData(data) => data.clone(),
            _ => None,
        }
    }

    /// Cursor an input reply asks for. Plain acceptance means the arrow.
    pub fn cursor(&self) -> Option<Cursor> {
        match self {
            Reply::Rejected => None,
            Reply::Cursor(cursor) => Some(*cursor),
            _ => Some(Cursor::Arrow),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LayoutChangeKind {
    /// A child moved or resized.
    Move,
    /// This element resized, padding or margin changed.
    Resize,
    Add,
    Remove,
    Reorder,
    /// Recompute everything, e.g. after an expand flag changed.
    Reset,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum DimKind {
    Min = 1,
    Max = 2,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Int,
    Float,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f32),
}

/// Ways of changing an element's style index.
#[derive(Clone, Debug)]
pub enum StyleChange {
    /// Replace the bits selected by `mask` with `index`; `None` recomputes
    /// from the current (or inherited) index.
    Index { index: Option<u32>, mask: u32 },
    /// Like `Index`, with the index looked up by style name.
    Name { name: SmolStr, mask: u32 },
    SetFlag(SmolStr),
    RemoveFlag(SmolStr),
    SetFlagIndex(u32),
    RemoveFlagIndex(u32),
    /// Apply the style's stored messages directly.
    Apply(Rc<Style>),
}

impl StyleChange {
    /// Forces a recalculation of this element and its children.
    pub const RECALC: StyleChange = StyleChange::Index {
        index: None,
        mask: u32::MAX,
    };
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cursor {
    Arrow,
    IBeam,
    Cross,
    Wait,
    Hand,
    ResizeNS,
    ResizeWE,
    ResizeNWSE,
    ResizeNESW,
    ResizeAll,
    No,
    Help,
    Drag,
    Custom(u32),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawAux {
    pub dpi: IntVec,
    pub scale: AbsVec,
    pub translate: AbsVec,
}

impl Default for DrawAux {
    fn default() -> Self {
        Self {
            dpi: IntVec::new(96, 96),
            scale: AbsVec::ONE,
            translate: AbsVec::ZERO,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawArgs {
    /// Resolved standard rectangle of the element being drawn.
    pub area: AbsRect,
    pub aux: DrawAux,
    /// Outside the current clip; only no-clip descendants are visited.
    pub culled: bool,
}

/// Opaque value attached to an element.
#[derive(Clone)]
pub struct UserData(Rc<dyn Any>);

impl UserData {
    pub fn new<T: Any>(value: T) -> Self {
        Self(Rc::new(value))
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref()
    }

    pub fn ptr_eq(&self, other: &UserData) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for UserData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("UserData").finish_non_exhaustive()
    }
}
