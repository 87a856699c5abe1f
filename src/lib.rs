//! Retained-mode element tree.
//!
//! Every element lives in an arena owned by a [`Root`] and is driven by
//! [`Message`]s sent through [`Root::send`]. Element kinds are registered
//! by name and each one is a [`Behavior`] that handles what it cares about
//! and forwards the rest to a base behavior. Geometry is resolved on demand
//! from relative/absolute coordinates, input is routed by hit testing, and
//! drawing goes through a pluggable [`Backend`].

pub mod behavior;
pub mod element;
mod error;
pub mod geometry;
pub mod input;
pub mod message;
pub mod render;
pub mod root;
pub mod skin;

pub use behavior::{Behavior, ControlBehavior, ElementBehavior};
pub use element::{ChildOrder, Element, ElementFlags, ElementId, ElementTree};
pub use error::TreeError;
pub use geometry::{AbsRect, AbsVec, CRect, CVec, Coord, MoveFlags, Transform};
pub use message::{Message, MsgCode, Reply};
pub use render::{Backend, HeadlessBackend};
pub use root::{ElementDesc, Root, RootConfig};
pub use skin::{Skin, SkinLayer, Style};
