//! Raw master rows, one struct per table dump. Field names follow the dumps (camelCase).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuffRow {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub detail: String,
    #[serde(rename = "type")]
    pub buff_type: i32,
    #[serde(default)]
    pub buff_group: i32,
    #[serde(default)]
    pub vals: Vec<i32>,
    #[serde(default)]
    pub tvals: Vec<i32>,
    #[serde(default)]
    pub ck_self_indv: Vec<i32>,
    #[serde(default)]
    pub ck_op_indv: Vec<i32>,
    #[serde(default)]
    pub max_rate: i32,
    #[serde(default)]
    pub icon_id: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionRow {
    pub id: i64,
    pub func_type: i32,
    #[serde(default)]
    pub target_type: i32,
    #[serde(default)]
    pub apply_target: i32,
    #[serde(default)]
    pub popup_text: String,
    /// Buff ids for state-granting function types.
    #[serde(default)]
    pub vals: Vec<i64>,
    #[serde(default)]
    pub tvals: Vec<i32>,
    #[serde(default)]
    pub quest_tvals: Vec<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillRow {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub ruby: String,
    #[serde(rename = "type", default)]
    pub skill_type: i32,
    #[serde(default)]
    pub icon_id: i32,
    #[serde(default)]
    pub max_lv: i32,
}

/// `mstSkillLv`: one row per skill level. `svals[i]` belongs to `func_id[i]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillLevelRow {
    pub skill_id: i64,
    pub lv: i32,
    #[serde(default)]
    pub func_id: Vec<i64>,
    #[serde(default)]
    pub svals: Vec<String>,
    #[serde(default)]
    pub charge_turn: i32,
    #[serde(default)]
    pub detail: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoblePhantasmRow {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub ruby: String,
    #[serde(default)]
    pub rank: String,
    #[serde(default)]
    pub type_text: String,
    #[serde(default)]
    pub card: i32,
    #[serde(default)]
    pub individuality: Vec<i32>,
}

/// `mstTreasureDeviceLv`: `svals` is overcharge 1; `svals2`..`svals5` the higher tiers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoblePhantasmLevelRow {
    // Spelled this way in the dump.
    pub treaure_device_id: i64,
    pub lv: i32,
    #[serde(default)]
    pub func_id: Vec<i64>,
    #[serde(default)]
    pub svals: Vec<String>,
    #[serde(default)]
    pub svals2: Vec<String>,
    #[serde(default)]
    pub svals3: Vec<String>,
    #[serde(default)]
    pub svals4: Vec<String>,
    #[serde(default)]
    pub svals5: Vec<String>,
    #[serde(default)]
    pub gauge_count: i32,
}

impl NoblePhantasmLevelRow {
    /// The five overcharge series, lowest first.
    pub fn overcharge_series(&self) -> [&[String]; 5] {
        [
            &self.svals,
            &self.svals2,
            &self.svals3,
            &self.svals4,
            &self.svals5,
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServantRow {
    pub id: i64,
    #[serde(default)]
    pub collection_no: i32,
    pub name: String,
    #[serde(default)]
    pub class_id: i32,
    #[serde(default)]
    pub rarity: i32,
    #[serde(rename = "type", default)]
    pub svt_type: i32,
    #[serde(default)]
    pub class_passive: Vec<i64>,
}

/// `mstSvtSkill`: active skill slots.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServantSkillRow {
    pub svt_id: i64,
    pub num: i32,
    #[serde(default)]
    pub priority: i32,
    pub skill_id: i64,
    #[serde(default)]
    pub cond_quest_id: i64,
    #[serde(default)]
    pub cond_lv: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServantNoblePhantasmRow {
    pub svt_id: i64,
    pub num: i32,
    #[serde(default)]
    pub priority: i32,
    pub treasure_device_id: i64,
    #[serde(default)]
    pub cond_quest_id: i64,
}

/// `mstEquip`: mystic codes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MysticCodeRow {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub detail: String,
    #[serde(default)]
    pub max_lv: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MysticCodeSkillRow {
    pub equip_id: i64,
    pub num: i32,
    pub skill_id: i64,
    #[serde(default)]
    pub cond_lv: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandCodeRow {
    pub id: i64,
    #[serde(default)]
    pub collection_no: i32,
    pub name: String,
    #[serde(default)]
    pub rarity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandCodeSkillRow {
    pub command_code_id: i64,
    pub num: i32,
    #[serde(default)]
    pub priority: i32,
    pub skill_id: i64,
}

/// Every table of one region, as loaded from disk.
#[derive(Debug, Clone, Default)]
pub struct MasterTables {
    pub buffs: Vec<BuffRow>,
    pub functions: Vec<FunctionRow>,
    pub skills: Vec<SkillRow>,
    pub skill_levels: Vec<SkillLevelRow>,
    pub noble_phantasms: Vec<NoblePhantasmRow>,
    pub noble_phantasm_levels: Vec<NoblePhantasmLevelRow>,
    pub servants: Vec<ServantRow>,
    pub servant_skills: Vec<ServantSkillRow>,
    pub servant_noble_phantasms: Vec<ServantNoblePhantasmRow>,
    pub mystic_codes: Vec<MysticCodeRow>,
    pub mystic_code_skills: Vec<MysticCodeSkillRow>,
    pub command_codes: Vec<CommandCodeRow>,
    pub command_code_skills: Vec<CommandCodeSkillRow>,
}
