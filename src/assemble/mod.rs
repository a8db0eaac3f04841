//! Entity assembly without reverse references.

pub mod basic;
pub mod nice;

use serde::Serialize;

pub use basic::BasicEntity;
pub use nice::NiceEntity;

use crate::data::snapshot::EntityKind;

/// One assembled entity in either shape.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum EntityBody {
    Basic(BasicEntity),
    Nice(NiceEntity),
}

impl EntityBody {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Basic(entity) => entity.kind(),
            Self::Nice(entity) => entity.kind(),
        }
    }

    pub fn id(&self) -> i64 {
        match self {
            Self::Basic(entity) => entity.id(),
            Self::Nice(entity) => entity.id(),
        }
    }

    pub fn is_basic(&self) -> bool {
        matches!(self, Self::Basic(_))
    }
}
