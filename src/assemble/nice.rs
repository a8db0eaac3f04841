//! Full shapes: every nested function carries its decoded dataVals, one record per
//! level (and per overcharge tier for noble phantasms).

use serde::Serialize;
use tracing::{error, warn};

use crate::data::records::{BuffRow, FunctionRow};
use crate::data::snapshot::{
    CommandCodeEntry, EntityKind, MasterSnapshot, MysticCodeEntry, NoblePhantasmEntry, RawRow,
    ServantEntry, SkillEntry,
};
use crate::decode::{decode_field_record, FieldRecord, FuncType};
use crate::error::EngineError;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NiceBuff {
    pub id: i64,
    pub name: String,
    pub detail: String,
    #[serde(rename = "type")]
    pub buff_type: i32,
    pub buff_group: i32,
    pub vals: Vec<i32>,
    pub tvals: Vec<i32>,
    pub ck_self_indv: Vec<i32>,
    pub ck_op_indv: Vec<i32>,
    pub max_rate: i32,
    pub icon_id: i32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NiceFunction {
    pub func_id: i64,
    pub func_type: FuncType,
    pub func_target_type: i32,
    pub func_target_team: i32,
    pub func_popup_text: String,
    #[serde(rename = "functvals")]
    pub tvals: Vec<i32>,
    #[serde(rename = "funcquestTvals")]
    pub quest_tvals: Vec<i32>,
    pub buffs: Vec<NiceBuff>,
    pub svals: Vec<FieldRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub svals2: Option<Vec<FieldRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub svals3: Option<Vec<FieldRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub svals4: Option<Vec<FieldRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub svals5: Option<Vec<FieldRecord>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NiceSkill {
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
    pub name: String,
    pub ruby: String,
    pub detail: String,
    #[serde(rename = "type")]
    pub skill_type: i32,
    pub icon_id: i32,
    pub cool_down: Vec<i32>,
    pub functions: Vec<NiceFunction>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NiceNoblePhantasm {
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
    pub name: String,
    pub ruby: String,
    pub rank: String,
    #[serde(rename = "type")]
    pub type_text: String,
    pub card: i32,
    pub individuality: Vec<i32>,
    pub np_gauge: Vec<i32>,
    pub functions: Vec<NiceFunction>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NiceServant {
    pub id: i64,
    pub collection_no: i32,
    pub name: String,
    pub class_id: i32,
    pub rarity: i32,
    #[serde(rename = "type")]
    pub svt_type: i32,
    pub skills: Vec<NiceSkill>,
    pub class_passive: Vec<NiceSkill>,
    pub noble_phantasms: Vec<NiceNoblePhantasm>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NiceMysticCode {
    pub id: i64,
    pub name: String,
    pub detail: String,
    pub max_lv: i32,
    pub skills: Vec<NiceSkill>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NiceCommandCode {
    pub id: i64,
    pub collection_no: i32,
    pub name: String,
    pub rarity: i32,
    pub skills: Vec<NiceSkill>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum NiceEntity {
    Buff(NiceBuff),
    Function(NiceFunction),
    Skill(NiceSkill),
    NoblePhantasm(NiceNoblePhantasm),
    Servant(NiceServant),
    MysticCode(NiceMysticCode),
    CommandCode(NiceCommandCode),
}

impl NiceEntity {
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
) -> Result<NiceEntity, EngineError> {
    let row = snapshot
        .fetch_by_id(kind, id)
        .ok_or(EngineError::NotFound { kind, id })?;
    Ok(match row {
        RawRow::Buff(buff) => NiceEntity::Buff(nice_buff(buff)),
        RawRow::Function(func) => {
            // A bare function has no level rows, so no dataVals to decode.
            NiceEntity::Function(nice_function(snapshot, func, &[])?)
        }
        RawRow::Skill(skill) => NiceEntity::Skill(nice_skill(snapshot, skill, None)?),
        RawRow::NoblePhantasm(np) => {
            NiceEntity::NoblePhantasm(nice_noble_phantasm(snapshot, np, None)?)
        }
        RawRow::Servant(servant) => NiceEntity::Servant(nice_servant(snapshot, servant)?),
        RawRow::MysticCode(mystic_code) => {
            NiceEntity::MysticCode(nice_mystic_code(snapshot, mystic_code)?)
        }
        RawRow::CommandCode(command_code) => {
            NiceEntity::CommandCode(nice_command_code(snapshot, command_code)?)
        }
    })
}

pub fn nice_buff(buff: &BuffRow) -> NiceBuff {
    NiceBuff {
        id: buff.id,
        name: buff.name.clone(),
        detail: buff.detail.clone(),
        buff_type: buff.buff_type,
        buff_group: buff.buff_group,
        vals: buff.vals.clone(),
        tvals: buff.tvals.clone(),
        ck_self_indv: buff.ck_self_indv.clone(),
        ck_op_indv: buff.ck_op_indv.clone(),
        max_rate: buff.max_rate,
        icon_id: buff.icon_id,
    }
}

/// `tiers[0]` holds one raw dataVals string per level; `tiers[1..]` are the
/// higher overcharge series, dropped when empty.
pub fn nice_function(
    snapshot: &MasterSnapshot,
    func: &FunctionRow,
    tiers: &[Vec<&str>],
) -> Result<NiceFunction, EngineError> {
    let func_type = FuncType::from_code(func.func_type);
    let buffs = if func_type.grants_buff() {
        func.vals
            .iter()
            .filter_map(|&buff_id| {
                let buff = snapshot.buff(buff_id);
                if buff.is_none() {
                    warn!(func_id = func.id, buff_id, "function grants an unknown buff");
                }
                buff
            })
            .map(nice_buff)
            .collect()
    } else {
        Vec::new()
    };

    let mut decoded = Vec::with_capacity(tiers.len());
    for tier in tiers {
        decoded.push(decode_series(snapshot, func, func_type, tier)?);
    }
    let mut decoded = decoded.into_iter();
    let svals = decoded.next().unwrap_or_default();
    let mut higher = decoded.map(|series| (!series.is_empty()).then_some(series));

    Ok(NiceFunction {
        func_id: func.id,
        func_type,
        func_target_type: func.target_type,
        func_target_team: func.apply_target,
        func_popup_text: func.popup_text.clone(),
        tvals: func.tvals.clone(),
        quest_tvals: func.quest_tvals.clone(),
        buffs,
        svals,
        svals2: higher.next().flatten(),
        svals3: higher.next().flatten(),
        svals4: higher.next().flatten(),
        svals5: higher.next().flatten(),
    })
}

fn decode_series(
    snapshot: &MasterSnapshot,
    func: &FunctionRow,
    func_type: FuncType,
    series: &[&str],
) -> Result<Vec<FieldRecord>, EngineError> {
    series
        .iter()
        .map(|raw| {
            decode_field_record(raw, func_type, snapshot).map_err(|source| {
                error!(
                    func_id = func.id,
                    func_type = %func_type,
                    raw = %raw,
                    error = %source,
                    "dataVals decode failed"
                );
                EngineError::Decode {
                    func_id: func.id,
                    func_type,
                    raw: raw.to_string(),
                    source,
                }
            })
        })
        .collect()
}

fn lookup_function(snapshot: &MasterSnapshot, func_id: i64) -> Result<&FunctionRow, EngineError> {
    snapshot.function(func_id).ok_or(EngineError::MissingSource {
        kind: EntityKind::Function,
        id: func_id,
    })
}

/// `slot` is the (num, priority) the skill occupies on its owner, if any.
pub fn nice_skill(
    snapshot: &MasterSnapshot,
    skill: &SkillEntry,
    slot: Option<(i32, i32)>,
) -> Result<NiceSkill, EngineError> {
    let func_ids = skill
        .levels
        .first()
        .map(|level| level.func_id.as_slice())
        .unwrap_or_default();
    let mut functions = Vec::with_capacity(func_ids.len());
    for (position, &func_id) in func_ids.iter().enumerate() {
        let func = lookup_function(snapshot, func_id)?;
        let per_level: Vec<&str> = skill
            .levels
            .iter()
            .map(|level| level.svals.get(position).map_or("", String::as_str))
            .collect();
        functions.push(nice_function(snapshot, func, &[per_level])?);
    }

    Ok(NiceSkill {
        id: skill.row.id,
        num: slot.map(|(num, _)| num),
        priority: slot.map(|(_, priority)| priority),
        name: skill.row.name.clone(),
        ruby: skill.row.ruby.clone(),
        detail: skill
            .levels
            .first()
            .map(|level| level.detail.clone())
            .unwrap_or_default(),
        skill_type: skill.row.skill_type,
        icon_id: skill.row.icon_id,
        cool_down: skill.levels.iter().map(|level| level.charge_turn).collect(),
        functions,
    })
}

pub fn nice_noble_phantasm(
    snapshot: &MasterSnapshot,
    np: &NoblePhantasmEntry,
    slot: Option<(i32, i32)>,
) -> Result<NiceNoblePhantasm, EngineError> {
    let func_ids = np
        .levels
        .first()
        .map(|level| level.func_id.as_slice())
        .unwrap_or_default();
    let mut functions = Vec::with_capacity(func_ids.len());
    for (position, &func_id) in func_ids.iter().enumerate() {
        let func = lookup_function(snapshot, func_id)?;
        // One entry per level in every tier that exists, so svals[k] stays level k+1.
        let tiers: Vec<Vec<&str>> = (0..5)
            .map(|tier| {
                let present = tier == 0
                    || np
                        .levels
                        .iter()
                        .any(|level| !level.overcharge_series()[tier].is_empty());
                if !present {
                    return Vec::new();
                }
                np.levels
                    .iter()
                    .map(|level| {
                        level.overcharge_series()[tier]
                            .get(position)
                            .map_or("", String::as_str)
                    })
                    .collect()
            })
            .collect();
        functions.push(nice_function(snapshot, func, &tiers)?);
    }

    Ok(NiceNoblePhantasm {
        id: np.row.id,
        num: slot.map(|(num, _)| num),
        priority: slot.map(|(_, priority)| priority),
        name: np.row.name.clone(),
        ruby: np.row.ruby.clone(),
        rank: np.row.rank.clone(),
        type_text: np.row.type_text.clone(),
        card: np.row.card,
        individuality: np.row.individuality.clone(),
        np_gauge: np.levels.iter().map(|level| level.gauge_count).collect(),
        functions,
    })
}

fn lookup_skill(snapshot: &MasterSnapshot, skill_id: i64) -> Result<&SkillEntry, EngineError> {
    snapshot.skill(skill_id).ok_or(EngineError::MissingSource {
        kind: EntityKind::Skill,
        id: skill_id,
    })
}

pub fn nice_servant(
    snapshot: &MasterSnapshot,
    servant: &ServantEntry,
) -> Result<NiceServant, EngineError> {
    let skills = servant
        .skills
        .iter()
        .map(|slot| {
            let skill = lookup_skill(snapshot, slot.skill_id)?;
            nice_skill(snapshot, skill, Some((slot.num, slot.priority)))
        })
        .collect::<Result<Vec<_>, _>>()?;
    let class_passive = servant
        .row
        .class_passive
        .iter()
        .map(|&skill_id| nice_skill(snapshot, lookup_skill(snapshot, skill_id)?, None))
        .collect::<Result<Vec<_>, _>>()?;
    let noble_phantasms = servant
        .noble_phantasms
        .iter()
        .map(|slot| {
            let np = snapshot
                .noble_phantasm(slot.treasure_device_id)
                .ok_or(EngineError::MissingSource {
                    kind: EntityKind::NoblePhantasm,
                    id: slot.treasure_device_id,
                })?;
            nice_noble_phantasm(snapshot, np, Some((slot.num, slot.priority)))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(NiceServant {
        id: servant.row.id,
        collection_no: servant.row.collection_no,
        name: servant.row.name.clone(),
        class_id: servant.row.class_id,
        rarity: servant.row.rarity,
        svt_type: servant.row.svt_type,
        skills,
        class_passive,
        noble_phantasms,
    })
}

pub fn nice_mystic_code(
    snapshot: &MasterSnapshot,
    mystic_code: &MysticCodeEntry,
) -> Result<NiceMysticCode, EngineError> {
    let skills = mystic_code
        .skills
        .iter()
        .map(|slot| {
            let skill = lookup_skill(snapshot, slot.skill_id)?;
            nice_skill(snapshot, skill, Some((slot.num, 0)))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(NiceMysticCode {
        id: mystic_code.row.id,
        name: mystic_code.row.name.clone(),
        detail: mystic_code.row.detail.clone(),
        max_lv: mystic_code.row.max_lv,
        skills,
    })
}

pub fn nice_command_code(
    snapshot: &MasterSnapshot,
    command_code: &CommandCodeEntry,
) -> Result<NiceCommandCode, EngineError> {
    let skills = command_code
        .skills
        .iter()
        .map(|slot| {
            let skill = lookup_skill(snapshot, slot.skill_id)?;
            nice_skill(snapshot, skill, Some((slot.num, slot.priority)))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(NiceCommandCode {
        id: command_code.row.id,
        collection_no: command_code.row.collection_no,
        name: command_code.row.name.clone(),
        rarity: command_code.row.rarity,
        skills,
    })
}
