use crate::element::ElementId;
use smol_str::SmolStr;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    #[error("no element kind registered as `{0}`")]
    UnknownKind(SmolStr),
    #[error("element {0:?} does not exist")]
    MissingElement(ElementId),
    #[error("element {next:?} is not a child of {parent:?}")]
    ForeignSibling {
        next: ElementId,
        parent: Option<ElementId>,
    },
    #[error("element {0:?} refused its parent")]
    ParentRejected(ElementId),
}
