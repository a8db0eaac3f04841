//! Reverse hydration: expand an entity into everything that references it.
//!
//! Relations form three levels (buff -> function -> skill/NP -> servant family).
//! A node expands to the next level only when reverse expansion is requested for it
//! and the depth bound reaches its level; basic-shaped entities never expand further.

mod tree;
mod worklist;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use tree::{HydratedEntity, ReverseSlot};

use crate::assemble::{basic, nice, EntityBody};
use crate::data::index::RelationKind;
use crate::data::snapshot::{EntityKind, MasterSnapshot};
use crate::error::EngineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReverseDepth {
    Function = 1,
    SkillNp = 2,
    Servant = 3,
}

impl ReverseDepth {
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    /// The level an entity of `kind` expands into first.
    pub fn default_for(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Buff => Self::Function,
            EntityKind::Function => Self::SkillNp,
            _ => Self::Servant,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Function => "function",
            Self::SkillNp => "skillNp",
            Self::Servant => "servant",
        }
    }
}

impl fmt::Display for ReverseDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReverseDepth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "function" => Ok(Self::Function),
            "skillNp" => Ok(Self::SkillNp),
            "servant" => Ok(Self::Servant),
            other => Err(format!(
                "unknown reverse depth '{other}' (expected function, skillNp or servant)"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReverseData {
    Basic,
    #[default]
    Nice,
}

impl fmt::Display for ReverseData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Basic => "basic",
            Self::Nice => "nice",
        })
    }
}

impl FromStr for ReverseData {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "basic" => Ok(Self::Basic),
            "nice" => Ok(Self::Nice),
            other => Err(format!("unknown reverse data '{other}' (expected basic or nice)")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RelationLevel {
    Buff,
    Function,
    SkillOrDevice,
    /// Servants, mystic codes and command codes. Nothing references them.
    ServantFamily,
}

impl RelationLevel {
    pub fn of(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Buff => Self::Buff,
            EntityKind::Function => Self::Function,
            EntityKind::Skill | EntityKind::NoblePhantasm => Self::SkillOrDevice,
            EntityKind::Servant | EntityKind::MysticCode | EntityKind::CommandCode => {
                Self::ServantFamily
            }
        }
    }

    pub fn ordinal(self) -> u8 {
        match self {
            Self::Buff => 1,
            Self::Function => 2,
            Self::SkillOrDevice => 3,
            Self::ServantFamily => 4,
        }
    }

    pub fn is_terminal(self) -> bool {
        self == Self::ServantFamily
    }
}

/// Per-call hydration settings, threaded through the whole tree by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReverseContext {
    pub reverse: bool,
    pub depth: ReverseDepth,
    pub data: ReverseData,
}

impl ReverseContext {
    pub fn new(reverse: bool, depth: ReverseDepth, data: ReverseData) -> Self {
        Self {
            reverse,
            depth,
            data,
        }
    }

    /// No reverse expansion, with the depth an entity of `kind` would default to.
    pub fn none(kind: EntityKind) -> Self {
        Self::new(false, ReverseDepth::default_for(kind), ReverseData::Nice)
    }

    pub fn expands(&self, level: RelationLevel) -> bool {
        self.reverse && !level.is_terminal() && self.depth.ordinal() >= level.ordinal()
    }

    /// Context for entities discovered one level down. Basic children never expand.
    pub fn child(&self) -> Self {
        Self {
            reverse: self.reverse && self.data == ReverseData::Nice,
            ..*self
        }
    }
}

/// One outgoing reverse edge: the kind it yields and the relations feeding it.
/// Several relations are merged into one ascending, de-duplicated list.
struct Edge {
    child: EntityKind,
    relations: &'static [RelationKind],
}

impl Edge {
    fn sources(&self, snapshot: &MasterSnapshot, target: i64) -> Vec<i64> {
        match self.relations {
            [relation] => snapshot.inverse_lookup(*relation, target).to_vec(),
            relations => {
                let mut ids: Vec<i64> = relations
                    .iter()
                    .flat_map(|&relation| snapshot.inverse_lookup(relation, target))
                    .copied()
                    .collect();
                ids.sort_unstable();
                ids.dedup();
                ids
            }
        }
    }
}

fn edges(kind: EntityKind) -> &'static [Edge] {
    const BUFF: &[Edge] = &[Edge {
        child: EntityKind::Function,
        relations: &[RelationKind::BuffToFunction],
    }];
    const FUNCTION: &[Edge] = &[
        Edge {
            child: EntityKind::Skill,
            relations: &[RelationKind::FunctionToSkill],
        },
        Edge {
            child: EntityKind::NoblePhantasm,
            relations: &[RelationKind::FunctionToNoblePhantasm],
        },
    ];
    const SKILL: &[Edge] = &[
        Edge {
            child: EntityKind::Servant,
            relations: &[
                RelationKind::ActiveSkillToServant,
                RelationKind::PassiveSkillToServant,
            ],
        },
        Edge {
            child: EntityKind::MysticCode,
            relations: &[RelationKind::SkillToMysticCode],
        },
        Edge {
            child: EntityKind::CommandCode,
            relations: &[RelationKind::SkillToCommandCode],
        },
    ];
    const NOBLE_PHANTASM: &[Edge] = &[Edge {
        child: EntityKind::Servant,
        relations: &[RelationKind::NoblePhantasmToServant],
    }];

    match kind {
        EntityKind::Buff => BUFF,
        EntityKind::Function => FUNCTION,
        EntityKind::Skill => SKILL,
        EntityKind::NoblePhantasm => NOBLE_PHANTASM,
        EntityKind::Servant | EntityKind::MysticCode | EntityKind::CommandCode => &[],
    }
}

fn assemble_body(
    snapshot: &MasterSnapshot,
    kind: EntityKind,
    id: i64,
    data: ReverseData,
) -> Result<EntityBody, EngineError> {
    Ok(match data {
        ReverseData::Basic => EntityBody::Basic(basic::assemble(snapshot, kind, id)?),
        ReverseData::Nice => EntityBody::Nice(nice::assemble(snapshot, kind, id)?),
    })
}

/// Assemble `kind`/`id` in the `root` shape and hydrate its reverse references.
/// A basic root always gets a basic reverse payload.
pub fn get_entity(
    snapshot: &MasterSnapshot,
    kind: EntityKind,
    id: i64,
    root: ReverseData,
    ctx: ReverseContext,
) -> Result<HydratedEntity, EngineError> {
    let ctx = match root {
        ReverseData::Basic => ReverseContext {
            data: ReverseData::Basic,
            ..ctx
        },
        ReverseData::Nice => ctx,
    };
    let body = assemble_body(snapshot, kind, id, root)?;
    worklist::expand(snapshot, body, ctx)
}
