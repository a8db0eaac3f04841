use serde::Serialize;

use crate::assemble::EntityBody;
use crate::data::snapshot::EntityKind;
use crate::hydrate::RelationLevel;

/// Referencing entities grouped by their kind. A list is present when its
/// relation was queried, even if empty.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReverseSlot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function: Option<Vec<HydratedEntity>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skill: Option<Vec<HydratedEntity>>,
    #[serde(rename = "NP", skip_serializing_if = "Option::is_none")]
    pub noble_phantasm: Option<Vec<HydratedEntity>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub servant: Option<Vec<HydratedEntity>>,
    #[serde(rename = "MC", skip_serializing_if = "Option::is_none")]
    pub mystic_code: Option<Vec<HydratedEntity>>,
    #[serde(rename = "CC", skip_serializing_if = "Option::is_none")]
    pub command_code: Option<Vec<HydratedEntity>>,
}

impl ReverseSlot {
    pub fn list(&self, kind: EntityKind) -> Option<&[HydratedEntity]> {
        let list = match kind {
            EntityKind::Buff => return None,
            EntityKind::Function => &self.function,
            EntityKind::Skill => &self.skill,
            EntityKind::NoblePhantasm => &self.noble_phantasm,
            EntityKind::Servant => &self.servant,
            EntityKind::MysticCode => &self.mystic_code,
            EntityKind::CommandCode => &self.command_code,
        };
        list.as_deref()
    }

    pub(crate) fn set(&mut self, kind: EntityKind, entities: Vec<HydratedEntity>) {
        let slot = match kind {
            // Nothing references a buff through another buff.
            EntityKind::Buff => return,
            EntityKind::Function => &mut self.function,
            EntityKind::Skill => &mut self.skill,
            EntityKind::NoblePhantasm => &mut self.noble_phantasm,
            EntityKind::Servant => &mut self.servant,
            EntityKind::MysticCode => &mut self.mystic_code,
            EntityKind::CommandCode => &mut self.command_code,
        };
        *slot = Some(entities);
    }

    /// Every direct child, in slot order.
    pub fn entities(&self) -> impl Iterator<Item = &HydratedEntity> {
        [
            &self.function,
            &self.skill,
            &self.noble_phantasm,
            &self.servant,
            &self.mystic_code,
            &self.command_code,
        ]
        .into_iter()
        .flatten()
        .flatten()
    }

    pub fn is_empty(&self) -> bool {
        self.entities().next().is_none()
    }
}

/// An assembled entity with its optional reverse references.
#[derive(Debug, Clone, Serialize)]
pub struct HydratedEntity {
    #[serde(flatten)]
    pub body: EntityBody,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reverse: Option<ReverseSlot>,
}

impl HydratedEntity {
    pub fn kind(&self) -> EntityKind {
        self.body.kind()
    }

    pub fn id(&self) -> i64 {
        self.body.id()
    }

    pub fn level(&self) -> RelationLevel {
        RelationLevel::of(self.kind())
    }

    /// Deepest relation level expanded anywhere in this tree, 0 when nothing was.
    pub fn deepest_level(&self) -> u8 {
        match &self.reverse {
            None => 0,
            Some(slot) => slot
                .entities()
                .map(HydratedEntity::deepest_level)
                .fold(self.level().ordinal(), u8::max),
        }
    }

    /// Number of entities in the tree, this one included.
    pub fn node_count(&self) -> usize {
        1 + self
            .reverse
            .iter()
            .flat_map(|slot| slot.entities())
            .map(HydratedEntity::node_count)
            .sum::<usize>()
    }
}
