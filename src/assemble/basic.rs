//! Minimal shapes: enough to identify an entity in a list, nothing decoded.

use serde::Serialize;

use crate::data::records::{BuffRow, FunctionRow};
use crate::data::snapshot::{
    CommandCodeEntry, EntityKind, MasterSnapshot, MysticCodeEntry, NoblePhantasmEntry,
    RawRow, ServantEntry, SkillEntry,
};
use crate::decode::FuncType;
use crate::error::EngineError;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicBuff {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub buff_type: i32,
    pub icon_id: i32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicFunction {
    pub func_id: i64,
    pub func_type: FuncType,
    pub func_target_type: i32,
    pub func_target_team: i32,
    pub buffs: Vec<BasicBuff>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicSkill {
    pub id: i64,
    pub name: String,
    pub ruby: String,
    #[serde(rename = "type")]
    pub skill_type: i32,
    pub icon_id: i32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicNoblePhantasm {
    pub id: i64,
    pub name: String,
    pub ruby: String,
    pub rank: String,
    #[serde(rename = "type")]
    pub type_text: String,
    pub card: i32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicServant {
    pub id: i64,
    pub collection_no: i32,
    pub name: String,
    pub class_id: i32,
    pub rarity: i32,
    #[serde(rename = "type")]
    pub svt_type: i32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicMysticCode {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicCommandCode {
    pub id: i64,
    pub collection_no: i32,
    pub name: String,
    pub rarity: i32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum BasicEntity {
    Buff(BasicBuff),
    Function(BasicFunction),
    Skill(BasicSkill),
    NoblePhantasm(BasicNoblePhantasm),
    Servant(BasicServant),
    MysticCode(BasicMysticCode),
    CommandCode(BasicCommandCode),
}

impl BasicEntity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Buff(_) => EntityKind::Buff,
            Self::Function(_) => EntityKind::Function,
            Self::Skill(_) => EntityKind::Skill,
            Self::NoblePhantasm(_) => EntityKind::NoblePhantasm,
            Self::Servant(_) => EntityKind::Servant,
            Self::MysticCode(_) => EntityKind::MysticCode,
            Self::CommandCode(_) => EntityKind::CommandCode,
        }
    }

    pub fn id(&self) -> i64 {
        match self {
            Self::Buff(buff) => buff.id,
            Self::Function(func) => func.func_id,
            Self::Skill(skill) => skill.id,
            Self::NoblePhantasm(np) => np.id,
            Self::Servant(servant) => servant.id,
            Self::MysticCode(mystic_code) => mystic_code.id,
            Self::CommandCode(command_code) => command_code.id,
        }
    }
}

pub fn assemble(
    snapshot: &MasterSnapshot,
    kind: EntityKind,
    id: i64,
) -> Result<BasicEntity, EngineError> {
    let row = snapshot
        .fetch_by_id(kind, id)
        .ok_or(EngineError::NotFound { kind, id })?;
    Ok(match row {
        RawRow::Buff(buff) => BasicEntity::Buff(basic_buff(buff)),
        RawRow::Function(func) => BasicEntity::Function(basic_function(snapshot, func)),
        RawRow::Skill(skill) => BasicEntity::Skill(basic_skill(skill)),
        RawRow::NoblePhantasm(np) => BasicEntity::NoblePhantasm(basic_noble_phantasm(np)),
        RawRow::Servant(servant) => BasicEntity::Servant(basic_servant(servant)),
        RawRow::MysticCode(mystic_code) => BasicEntity::MysticCode(basic_mystic_code(mystic_code)),
        RawRow::CommandCode(command_code) => {
            BasicEntity::CommandCode(basic_command_code(command_code))
        }
    })
}

pub fn basic_buff(buff: &BuffRow) -> BasicBuff {
    BasicBuff {
        id: buff.id,
        name: buff.name.clone(),
        buff_type: buff.buff_type,
        icon_id: buff.icon_id,
    }
}

pub fn basic_function(snapshot: &MasterSnapshot, func: &FunctionRow) -> BasicFunction {
    let func_type = FuncType::from_code(func.func_type);
    let buffs = if func_type.grants_buff() {
        func.vals
            .iter()
            .filter_map(|&buff_id| snapshot.buff(buff_id))
            .map(basic_buff)
            .collect()
    } else {
        Vec::new()
    };
    BasicFunction {
        func_id: func.id,
        func_type,
        func_target_type: func.target_type,
        func_target_team: func.apply_target,
        buffs,
    }
}

fn basic_skill(skill: &SkillEntry) -> BasicSkill {
    BasicSkill {
        id: skill.row.id,
        name: skill.row.name.clone(),
        ruby: skill.row.ruby.clone(),
        skill_type: skill.row.skill_type,
        icon_id: skill.row.icon_id,
    }
}

fn basic_noble_phantasm(np: &NoblePhantasmEntry) -> BasicNoblePhantasm {
    BasicNoblePhantasm {
        id: np.row.id,
        name: np.row.name.clone(),
        ruby: np.row.ruby.clone(),
        rank: np.row.rank.clone(),
        type_text: np.row.type_text.clone(),
        card: np.row.card,
    }
}

fn basic_servant(servant: &ServantEntry) -> BasicServant {
    BasicServant {
        id: servant.row.id,
        collection_no: servant.row.collection_no,
        name: servant.row.name.clone(),
        class_id: servant.row.class_id,
        rarity: servant.row.rarity,
        svt_type: servant.row.svt_type,
    }
}

fn basic_mystic_code(mystic_code: &MysticCodeEntry) -> BasicMysticCode {
    BasicMysticCode {
        id: mystic_code.row.id,
        name: mystic_code.row.name.clone(),
    }
}

fn basic_command_code(command_code: &CommandCodeEntry) -> BasicCommandCode {
    BasicCommandCode {
        id: command_code.row.id,
        collection_no: command_code.row.collection_no,
        name: command_code.row.name.clone(),
        rarity: command_code.row.rarity,
    }
}
