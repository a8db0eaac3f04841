//! Inverted indices: target id -> ids of the rows that reference it.
//! Built once per snapshot; source lists are ascending and de-duplicated.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::Serialize;

use crate::data::records::MasterTables;
use crate::decode::FuncType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RelationKind {
    BuffToFunction,
    FunctionToSkill,
    FunctionToNoblePhantasm,
    NoblePhantasmToServant,
    ActiveSkillToServant,
    PassiveSkillToServant,
    SkillToMysticCode,
    SkillToCommandCode,
}

impl RelationKind {
    pub const ALL: [RelationKind; 8] = [
        Self::BuffToFunction,
        Self::FunctionToSkill,
        Self::FunctionToNoblePhantasm,
        Self::NoblePhantasmToServant,
        Self::ActiveSkillToServant,
        Self::PassiveSkillToServant,
        Self::SkillToMysticCode,
        Self::SkillToCommandCode,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::BuffToFunction => "buffToFunction",
            Self::FunctionToSkill => "functionToSkill",
            Self::FunctionToNoblePhantasm => "functionToNoblePhantasm",
            Self::NoblePhantasmToServant => "noblePhantasmToServant",
            Self::ActiveSkillToServant => "activeSkillToServant",
            Self::PassiveSkillToServant => "passiveSkillToServant",
            Self::SkillToMysticCode => "skillToMysticCode",
            Self::SkillToCommandCode => "skillToCommandCode",
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default)]
pub struct InvertedIndex {
    relations: HashMap<RelationKind, BTreeMap<i64, Vec<i64>>>,
}

impl InvertedIndex {
    pub fn build(tables: &MasterTables) -> Self {
        let mut index = Self::default();

        for func in &tables.functions {
            if FuncType::from_code(func.func_type).grants_buff() {
                for &buff_id in &func.vals {
                    index.add(RelationKind::BuffToFunction, buff_id, func.id);
                }
            }
        }
        for level in &tables.skill_levels {
            for &func_id in &level.func_id {
                index.add(RelationKind::FunctionToSkill, func_id, level.skill_id);
            }
        }
        for level in &tables.noble_phantasm_levels {
            for &func_id in &level.func_id {
                index.add(
                    RelationKind::FunctionToNoblePhantasm,
                    func_id,
                    level.treaure_device_id,
                );
            }
        }
        for row in &tables.servant_noble_phantasms {
            index.add(
                RelationKind::NoblePhantasmToServant,
                row.treasure_device_id,
                row.svt_id,
            );
        }
        for row in &tables.servant_skills {
            index.add(RelationKind::ActiveSkillToServant, row.skill_id, row.svt_id);
        }
        for servant in &tables.servants {
            for &skill_id in &servant.class_passive {
                index.add(RelationKind::PassiveSkillToServant, skill_id, servant.id);
            }
        }
        for row in &tables.mystic_code_skills {
            index.add(RelationKind::SkillToMysticCode, row.skill_id, row.equip_id);
        }
        for row in &tables.command_code_skills {
            index.add(
                RelationKind::SkillToCommandCode,
                row.skill_id,
                row.command_code_id,
            );
        }

        index.finish();
        index
    }

    fn add(&mut self, kind: RelationKind, target: i64, source: i64) {
        self.relations
            .entry(kind)
            .or_default()
            .entry(target)
            .or_default()
            .push(source);
    }

    fn finish(&mut self) {
        for sources in self.relations.values_mut().flat_map(BTreeMap::values_mut) {
            sources.sort_unstable();
            sources.dedup();
        }
    }

    /// Sources referencing `target`, ascending. Absent keys mean no references.
    pub fn lookup(&self, kind: RelationKind, target: i64) -> &[i64] {
        self.relations
            .get(&kind)
            .and_then(|targets| targets.get(&target))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of distinct targets with at least one reference.
    pub fn target_count(&self, kind: RelationKind) -> usize {
        self.relations.get(&kind).map_or(0, BTreeMap::len)
    }
}
