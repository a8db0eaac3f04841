//! Load one region's master dumps from `<data_dir>/<REGION>/mst*.json`.
//! A missing table file loads as empty; a missing region directory is an error.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, info};

use crate::data::records::MasterTables;
use crate::data::registry::Region;

pub const BUFF_FILE: &str = "mstBuff.json";
pub const FUNC_FILE: &str = "mstFunc.json";
pub const SKILL_FILE: &str = "mstSkill.json";
pub const SKILL_LV_FILE: &str = "mstSkillLv.json";
pub const TREASURE_DEVICE_FILE: &str = "mstTreasureDevice.json";
pub const TREASURE_DEVICE_LV_FILE: &str = "mstTreasureDeviceLv.json";
pub const SVT_FILE: &str = "mstSvt.json";
pub const SVT_SKILL_FILE: &str = "mstSvtSkill.json";
pub const SVT_TREASURE_DEVICE_FILE: &str = "mstSvtTreasureDevice.json";
pub const EQUIP_FILE: &str = "mstEquip.json";
pub const EQUIP_SKILL_FILE: &str = "mstEquipSkill.json";
pub const COMMAND_CODE_FILE: &str = "mstCommandCode.json";
pub const COMMAND_CODE_SKILL_FILE: &str = "mstCommandCodeSkill.json";

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("region directory {} not found", path.display())]
    MissingRegion { path: PathBuf },
    #[error("region {0} is not served")]
    RegionNotServed(Region),
    #[error("unable to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("unable to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub fn region_dir(data_dir: &Path, region: Region) -> PathBuf {
    data_dir.join(region.as_str())
}

pub fn load_region(data_dir: &Path, region: Region) -> Result<MasterTables, LoadError> {
    let dir = region_dir(data_dir, region);
    if !dir.is_dir() {
        return Err(LoadError::MissingRegion { path: dir });
    }

    let tables = MasterTables {
        buffs: load_table(&dir, BUFF_FILE)?,
        functions: load_table(&dir, FUNC_FILE)?,
        skills: load_table(&dir, SKILL_FILE)?,
        skill_levels: load_table(&dir, SKILL_LV_FILE)?,
        noble_phantasms: load_table(&dir, TREASURE_DEVICE_FILE)?,
        noble_phantasm_levels: load_table(&dir, TREASURE_DEVICE_LV_FILE)?,
        servants: load_table(&dir, SVT_FILE)?,
        servant_skills: load_table(&dir, SVT_SKILL_FILE)?,
        servant_noble_phantasms: load_table(&dir, SVT_TREASURE_DEVICE_FILE)?,
        mystic_codes: load_table(&dir, EQUIP_FILE)?,
        mystic_code_skills: load_table(&dir, EQUIP_SKILL_FILE)?,
        command_codes: load_table(&dir, COMMAND_CODE_FILE)?,
        command_code_skills: load_table(&dir, COMMAND_CODE_SKILL_FILE)?,
    };
    info!(
        region = %region,
        functions = tables.functions.len(),
        skills = tables.skills.len(),
        servants = tables.servants.len(),
        "loaded master tables"
    );
    Ok(tables)
}

fn load_table<T: DeserializeOwned>(dir: &Path, file: &str) -> Result<Vec<T>, LoadError> {
    let path = dir.join(file);
    let raw = match fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "table file missing, loading as empty");
            return Ok(Vec::new());
        }
        Err(source) => return Err(LoadError::Io { path, source }),
    };
    serde_json::from_str(&raw).map_err(|source| LoadError::Parse { path, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("atlas-loader-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(dir.join("JP")).unwrap();
        dir
    }

    #[test]
    fn missing_files_load_as_empty_tables() {
        let dir = scratch_dir("empty");
        fs::write(
            dir.join("JP").join(FUNC_FILE),
            r#"[{"id": 1, "funcType": 16, "vals": [10]}]"#,
        )
        .unwrap();
        let tables = load_region(&dir, Region::Jp).unwrap();
        assert_eq!(tables.functions.len(), 1);
        assert_eq!(tables.functions[0].vals, vec![10]);
        assert!(tables.buffs.is_empty());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_region_is_an_error() {
        let dir = scratch_dir("region");
        let err = load_region(&dir, Region::Na).unwrap_err();
        assert!(matches!(err, LoadError::MissingRegion { .. }));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn malformed_json_reports_the_file() {
        let dir = scratch_dir("parse");
        fs::write(dir.join("JP").join(BUFF_FILE), "{not json").unwrap();
        let err = load_region(&dir, Region::Jp).unwrap_err();
        assert!(err.to_string().contains(BUFF_FILE));
        let _ = fs::remove_dir_all(&dir);
    }
}
