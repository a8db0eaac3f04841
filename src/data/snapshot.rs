//! One region's read-only master data: ID-keyed tables plus their inverted indices.
//! Immutable after construction; shared across requests through `Arc`.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::data::index::{InvertedIndex, RelationKind};
use crate::data::records::{
    BuffRow, CommandCodeRow, CommandCodeSkillRow, FunctionRow, MasterTables, MysticCodeRow,
    MysticCodeSkillRow, NoblePhantasmLevelRow, NoblePhantasmRow, ServantNoblePhantasmRow,
    ServantRow, ServantSkillRow, SkillLevelRow, SkillRow,
};
use crate::data::registry::Region;
use crate::decode::{FuncType, FuncTypeLookup};

/// Entity kinds served by the API. Path names match the reverse slot names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EntityKind {
    #[serde(rename = "buff")]
    Buff,
    #[serde(rename = "function")]
    Function,
    #[serde(rename = "skill")]
    Skill,
    #[serde(rename = "NP")]
    NoblePhantasm,
    #[serde(rename = "servant")]
    Servant,
    #[serde(rename = "MC")]
    MysticCode,
    #[serde(rename = "CC")]
    CommandCode,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Buff => "buff",
            Self::Function => "function",
            Self::Skill => "skill",
            Self::NoblePhantasm => "NP",
            Self::Servant => "servant",
            Self::MysticCode => "MC",
            Self::CommandCode => "CC",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "buff" => Ok(Self::Buff),
            "function" => Ok(Self::Function),
            "skill" => Ok(Self::Skill),
            "NP" | "np" => Ok(Self::NoblePhantasm),
            "servant" | "svt" => Ok(Self::Servant),
            "MC" | "mc" => Ok(Self::MysticCode),
            "CC" | "cc" => Ok(Self::CommandCode),
            other => Err(format!("unknown entity kind '{other}'")),
        }
    }
}

/// Skill row with its levels, ascending by level.
#[derive(Debug, Clone)]
pub struct SkillEntry {
    pub row: SkillRow,
    pub levels: Vec<SkillLevelRow>,
}

#[derive(Debug, Clone)]
pub struct NoblePhantasmEntry {
    pub row: NoblePhantasmRow,
    pub levels: Vec<NoblePhantasmLevelRow>,
}

/// Servant row with its skill and noble phantasm slots, ordered by (num, priority).
#[derive(Debug, Clone)]
pub struct ServantEntry {
    pub row: ServantRow,
    pub skills: Vec<ServantSkillRow>,
    pub noble_phantasms: Vec<ServantNoblePhantasmRow>,
}

#[derive(Debug, Clone)]
pub struct MysticCodeEntry {
    pub row: MysticCodeRow,
    pub skills: Vec<MysticCodeSkillRow>,
}

#[derive(Debug, Clone)]
pub struct CommandCodeEntry {
    pub row: CommandCodeRow,
    pub skills: Vec<CommandCodeSkillRow>,
}

/// Borrowed row of any kind, as returned by [MasterSnapshot::fetch_by_id].
#[derive(Debug, Clone, Copy)]
pub enum RawRow<'a> {
    Buff(&'a BuffRow),
    Function(&'a FunctionRow),
    Skill(&'a SkillEntry),
    NoblePhantasm(&'a NoblePhantasmEntry),
    Servant(&'a ServantEntry),
    MysticCode(&'a MysticCodeEntry),
    CommandCode(&'a CommandCodeEntry),
}

impl RawRow<'_> {
    pub fn id(&self) -> i64 {
        match self {
            Self::Buff(row) => row.id,
            Self::Function(row) => row.id,
            Self::Skill(entry) => entry.row.id,
            Self::NoblePhantasm(entry) => entry.row.id,
            Self::Servant(entry) => entry.row.id,
            Self::MysticCode(entry) => entry.row.id,
            Self::CommandCode(entry) => entry.row.id,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotVersion {
    pub region: Region,
    /// Increments on every reload of the region.
    pub generation: u64,
    pub loaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TableSizes {
    pub buff: usize,
    pub function: usize,
    pub skill: usize,
    #[serde(rename = "NP")]
    pub noble_phantasm: usize,
    pub servant: usize,
    #[serde(rename = "MC")]
    pub mystic_code: usize,
    #[serde(rename = "CC")]
    pub command_code: usize,
}

#[derive(Debug)]
pub struct MasterSnapshot {
    version: SnapshotVersion,
    buffs: HashMap<i64, BuffRow>,
    functions: HashMap<i64, FunctionRow>,
    skills: HashMap<i64, SkillEntry>,
    noble_phantasms: HashMap<i64, NoblePhantasmEntry>,
    servants: HashMap<i64, ServantEntry>,
    mystic_codes: HashMap<i64, MysticCodeEntry>,
    command_codes: HashMap<i64, CommandCodeEntry>,
    index: InvertedIndex,
}

impl MasterSnapshot {
    pub fn from_tables(region: Region, tables: MasterTables) -> Self {
        Self::with_generation(region, tables, 1)
    }

    pub fn with_generation(region: Region, tables: MasterTables, generation: u64) -> Self {
        let index = InvertedIndex::build(&tables);
        let MasterTables {
            buffs,
            functions,
            skills,
            mut skill_levels,
            noble_phantasms,
            mut noble_phantasm_levels,
            servants,
            mut servant_skills,
            mut servant_noble_phantasms,
            mystic_codes,
            mut mystic_code_skills,
            command_codes,
            mut command_code_skills,
        } = tables;

        skill_levels.sort_by_key(|level| (level.skill_id, level.lv));
        noble_phantasm_levels.sort_by_key(|level| (level.treaure_device_id, level.lv));
        servant_skills.sort_by_key(|slot| (slot.svt_id, slot.num, slot.priority));
        servant_noble_phantasms.sort_by_key(|slot| (slot.svt_id, slot.num, slot.priority));
        mystic_code_skills.sort_by_key(|slot| (slot.equip_id, slot.num));
        command_code_skills.sort_by_key(|slot| (slot.command_code_id, slot.num, slot.priority));

        let mut skill_levels = group_by(skill_levels, |level| level.skill_id);
        let mut np_levels = group_by(noble_phantasm_levels, |level| level.treaure_device_id);
        let mut svt_skills = group_by(servant_skills, |slot| slot.svt_id);
        let mut svt_nps = group_by(servant_noble_phantasms, |slot| slot.svt_id);
        let mut mc_skills = group_by(mystic_code_skills, |slot| slot.equip_id);
        let mut cc_skills = group_by(command_code_skills, |slot| slot.command_code_id);

        Self {
            version: SnapshotVersion {
                region,
                generation,
                loaded_at: Utc::now(),
            },
            buffs: buffs.into_iter().map(|row| (row.id, row)).collect(),
            functions: functions.into_iter().map(|row| (row.id, row)).collect(),
            skills: skills
                .into_iter()
                .map(|row| {
                    let levels = skill_levels.remove(&row.id).unwrap_or_default();
                    (row.id, SkillEntry { row, levels })
                })
                .collect(),
            noble_phantasms: noble_phantasms
                .into_iter()
                .map(|row| {
                    let levels = np_levels.remove(&row.id).unwrap_or_default();
                    (row.id, NoblePhantasmEntry { row, levels })
                })
                .collect(),
            servants: servants
                .into_iter()
                .map(|row| {
                    let skills = svt_skills.remove(&row.id).unwrap_or_default();
                    let noble_phantasms = svt_nps.remove(&row.id).unwrap_or_default();
                    (
                        row.id,
                        ServantEntry {
                            row,
                            skills,
                            noble_phantasms,
                        },
                    )
                })
                .collect(),
            mystic_codes: mystic_codes
                .into_iter()
                .map(|row| {
                    let skills = mc_skills.remove(&row.id).unwrap_or_default();
                    (row.id, MysticCodeEntry { row, skills })
                })
                .collect(),
            command_codes: command_codes
                .into_iter()
                .map(|row| {
                    let skills = cc_skills.remove(&row.id).unwrap_or_default();
                    (row.id, CommandCodeEntry { row, skills })
                })
                .collect(),
            index,
        }
    }

    pub fn version(&self) -> &SnapshotVersion {
        &self.version
    }

    pub fn region(&self) -> Region {
        self.version.region
    }

    pub fn table_sizes(&self) -> TableSizes {
        TableSizes {
            buff: self.buffs.len(),
            function: self.functions.len(),
            skill: self.skills.len(),
            noble_phantasm: self.noble_phantasms.len(),
            servant: self.servants.len(),
            mystic_code: self.mystic_codes.len(),
            command_code: self.command_codes.len(),
        }
    }

    pub fn buff(&self, id: i64) -> Option<&BuffRow> {
        self.buffs.get(&id)
    }

    pub fn function(&self, id: i64) -> Option<&FunctionRow> {
        self.functions.get(&id)
    }

    pub fn skill(&self, id: i64) -> Option<&SkillEntry> {
        self.skills.get(&id)
    }

    pub fn noble_phantasm(&self, id: i64) -> Option<&NoblePhantasmEntry> {
        self.noble_phantasms.get(&id)
    }

    pub fn servant(&self, id: i64) -> Option<&ServantEntry> {
        self.servants.get(&id)
    }

    pub fn mystic_code(&self, id: i64) -> Option<&MysticCodeEntry> {
        self.mystic_codes.get(&id)
    }

    pub fn command_code(&self, id: i64) -> Option<&CommandCodeEntry> {
        self.command_codes.get(&id)
    }

    pub fn functions(&self) -> impl Iterator<Item = &FunctionRow> {
        self.functions.values()
    }

    pub fn skills(&self) -> impl Iterator<Item = &SkillEntry> {
        self.skills.values()
    }

    pub fn noble_phantasms(&self) -> impl Iterator<Item = &NoblePhantasmEntry> {
        self.noble_phantasms.values()
    }

    pub fn servants(&self) -> impl Iterator<Item = &ServantEntry> {
        self.servants.values()
    }

    pub fn mystic_codes(&self) -> impl Iterator<Item = &MysticCodeEntry> {
        self.mystic_codes.values()
    }

    pub fn command_codes(&self) -> impl Iterator<Item = &CommandCodeEntry> {
        self.command_codes.values()
    }

    pub fn fetch_by_id(&self, kind: EntityKind, id: i64) -> Option<RawRow<'_>> {
        match kind {
            EntityKind::Buff => self.buff(id).map(RawRow::Buff),
            EntityKind::Function => self.function(id).map(RawRow::Function),
            EntityKind::Skill => self.skill(id).map(RawRow::Skill),
            EntityKind::NoblePhantasm => self.noble_phantasm(id).map(RawRow::NoblePhantasm),
            EntityKind::Servant => self.servant(id).map(RawRow::Servant),
            EntityKind::MysticCode => self.mystic_code(id).map(RawRow::MysticCode),
            EntityKind::CommandCode => self.command_code(id).map(RawRow::CommandCode),
        }
    }

    /// Rows for `ids` in the given order; absent ids are skipped.
    pub fn fetch_many(&self, kind: EntityKind, ids: &[i64]) -> Vec<RawRow<'_>> {
        ids.iter()
            .filter_map(|&id| self.fetch_by_id(kind, id))
            .collect()
    }

    pub fn inverse_lookup(&self, relation: RelationKind, target: i64) -> &[i64] {
        self.index.lookup(relation, target)
    }

    pub fn index(&self) -> &InvertedIndex {
        &self.index
    }
}

impl FuncTypeLookup for MasterSnapshot {
    fn func_type(&self, func_id: i64) -> Option<FuncType> {
        self.function(func_id)
            .map(|func| FuncType::from_code(func.func_type))
    }
}

fn group_by<T>(rows: Vec<T>, key: impl Fn(&T) -> i64) -> HashMap<i64, Vec<T>> {
    let mut grouped: HashMap<i64, Vec<T>> = HashMap::new();
    for row in rows {
        grouped.entry(key(&row)).or_default().push(row);
    }
    grouped
}
