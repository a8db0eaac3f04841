//! Snapshot consistency checks: every dataVals string decodes and every id reference resolves.

use std::fmt;

use rayon::prelude::*;
use serde::Serialize;

use crate::data::snapshot::MasterSnapshot;
use crate::decode::{decode_field_record, FuncType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationSeverity {
    Error,
    Warning,
    Info,
}

impl ValidationSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for ValidationSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationDiagnostic {
    pub severity: ValidationSeverity,
    pub context: String,
    pub message: String,
}

impl ValidationDiagnostic {
    fn new(severity: ValidationSeverity, context: String, message: impl Into<String>) -> Self {
        Self {
            severity,
            context,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub diagnostics: Vec<ValidationDiagnostic>,
}

impl ValidationReport {
    pub fn push(
        &mut self,
        severity: ValidationSeverity,
        context: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.diagnostics
            .push(ValidationDiagnostic::new(severity, context.into(), message));
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diag| diag.severity == ValidationSeverity::Error)
    }

    pub fn count(&self, severity: ValidationSeverity) -> usize {
        self.diagnostics
            .iter()
            .filter(|diag| diag.severity == severity)
            .count()
    }
}

/// One `func_id[i]` / `svals[i]` column of a level row.
struct LevelColumns<'a> {
    context: String,
    func_ids: &'a [i64],
    svals: &'a [String],
}

pub fn validate_snapshot(snapshot: &MasterSnapshot) -> ValidationReport {
    let mut columns = Vec::new();
    for skill in snapshot.skills() {
        for level in &skill.levels {
            columns.push(LevelColumns {
                context: format!("skill[{}].lv[{}]", skill.row.id, level.lv),
                func_ids: &level.func_id,
                svals: &level.svals,
            });
        }
    }
    for np in snapshot.noble_phantasms() {
        for level in &np.levels {
            for (tier, series) in level.overcharge_series().into_iter().enumerate() {
                if tier > 0 && series.is_empty() {
                    continue;
                }
                columns.push(LevelColumns {
                    context: format!("NP[{}].lv[{}].oc[{}]", np.row.id, level.lv, tier + 1),
                    func_ids: &level.func_id,
                    svals: series,
                });
            }
        }
    }

    let mut diagnostics: Vec<ValidationDiagnostic> = columns
        .par_iter()
        .flat_map_iter(|column| check_columns(snapshot, column))
        .collect();
    diagnostics.extend(check_references(snapshot));
    diagnostics.sort_by(|a, b| {
        a.severity
            .cmp(&b.severity)
            .then_with(|| a.context.cmp(&b.context))
    });

    let mut report = ValidationReport { diagnostics };
    let sizes = snapshot.table_sizes();
    report.push(
        ValidationSeverity::Info,
        snapshot.region().as_str(),
        format!(
            "{} functions, {} skills, {} NPs, {} servants checked",
            sizes.function, sizes.skill, sizes.noble_phantasm, sizes.servant
        ),
    );
    report
}

fn check_columns(snapshot: &MasterSnapshot, column: &LevelColumns<'_>) -> Vec<ValidationDiagnostic> {
    let mut out = Vec::new();
    if column.func_ids.len() != column.svals.len() {
        out.push(ValidationDiagnostic::new(
            ValidationSeverity::Error,
            column.context.clone(),
            format!(
                "{} functions but {} dataVals strings",
                column.func_ids.len(),
                column.svals.len()
            ),
        ));
    }
    for (&func_id, raw) in column.func_ids.iter().zip(column.svals) {
        let context = format!("{}.func[{func_id}]", column.context);
        let Some(func) = snapshot.function(func_id) else {
            out.push(ValidationDiagnostic::new(
                ValidationSeverity::Error,
                context,
                "unknown function",
            ));
            continue;
        };
        let func_type = FuncType::from_code(func.func_type);
        if let FuncType::Unknown(code) = func_type {
            out.push(ValidationDiagnostic::new(
                ValidationSeverity::Warning,
                context.clone(),
                format!("unrecognised funcType {code}"),
            ));
        }
        if let Err(err) = decode_field_record(raw, func_type, snapshot) {
            out.push(ValidationDiagnostic::new(
                ValidationSeverity::Error,
                context,
                format!("{raw:?}: {err}"),
            ));
        }
    }
    out
}

fn check_references(snapshot: &MasterSnapshot) -> Vec<ValidationDiagnostic> {
    let mut out = Vec::new();
    let mut dangling = |context: String, message: String| {
        out.push(ValidationDiagnostic::new(
            ValidationSeverity::Warning,
            context,
            message,
        ));
    };

    for func in snapshot.functions() {
        if !FuncType::from_code(func.func_type).grants_buff() {
            continue;
        }
        for &buff_id in &func.vals {
            if snapshot.buff(buff_id).is_none() {
                dangling(format!("function[{}]", func.id), format!("unknown buff {buff_id}"));
            }
        }
    }
    for servant in snapshot.servants() {
        let context = format!("servant[{}]", servant.row.id);
        let skill_ids = servant
            .skills
            .iter()
            .map(|slot| slot.skill_id)
            .chain(servant.row.class_passive.iter().copied());
        for skill_id in skill_ids {
            if snapshot.skill(skill_id).is_none() {
                dangling(context.clone(), format!("unknown skill {skill_id}"));
            }
        }
        for slot in &servant.noble_phantasms {
            if snapshot.noble_phantasm(slot.treasure_device_id).is_none() {
                dangling(
                    context.clone(),
                    format!("unknown NP {}", slot.treasure_device_id),
                );
            }
        }
    }
    for mystic_code in snapshot.mystic_codes() {
        for slot in &mystic_code.skills {
            if snapshot.skill(slot.skill_id).is_none() {
                dangling(
                    format!("MC[{}]", mystic_code.row.id),
                    format!("unknown skill {}", slot.skill_id),
                );
            }
        }
    }
    for command_code in snapshot.command_codes() {
        for slot in &command_code.skills {
            if snapshot.skill(slot.skill_id).is_none() {
                dangling(
                    format!("CC[{}]", command_code.row.id),
                    format!("unknown skill {}", slot.skill_id),
                );
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::records::{FunctionRow, MasterTables, SkillLevelRow, SkillRow};
    use crate::data::registry::Region;

    fn tables(svals: &str) -> MasterTables {
        MasterTables {
            functions: vec![FunctionRow {
                id: 1,
                func_type: 16,
                target_type: 0,
                apply_target: 3,
                popup_text: String::new(),
                vals: vec![99],
                tvals: Vec::new(),
                quest_tvals: Vec::new(),
            }],
            skills: vec![SkillRow {
                id: 10,
                name: "test".to_string(),
                ruby: String::new(),
                skill_type: 1,
                icon_id: 0,
                max_lv: 1,
            }],
            skill_levels: vec![SkillLevelRow {
                skill_id: 10,
                lv: 1,
                func_id: vec![1, 2],
                svals: vec![svals.to_string(), "[1000]".to_string()],
                charge_turn: 7,
                detail: String::new(),
            }],
            ..MasterTables::default()
        }
    }

    #[test]
    fn reports_unknown_function_and_dangling_buff() {
        let snapshot = MasterSnapshot::from_tables(Region::Jp, tables("[1000,3,-1,300]"));
        let report = validate_snapshot(&snapshot);
        assert!(report.has_errors());
        assert!(report
            .diagnostics
            .iter()
            .any(|d| d.context == "skill[10].lv[1].func[2]" && d.message == "unknown function"));
        assert!(report
            .diagnostics
            .iter()
            .any(|d| d.severity == ValidationSeverity::Warning && d.message == "unknown buff 99"));
    }

    #[test]
    fn reports_undecodable_data_vals() {
        let snapshot = MasterSnapshot::from_tables(Region::Jp, tables("[1000,oops]"));
        let report = validate_snapshot(&snapshot);
        assert!(report
            .diagnostics
            .iter()
            .any(|d| d.context == "skill[10].lv[1].func[1]" && d.message.contains("oops")));
    }
}
