//! Shared fixtures: the JP master dump under tests/fixtures/master.
//!
//! Fixture graph:
//! buff 101 <- function 201 (addState) <- skills 301, 302, 303 and NP 401
//! skill 301 -> servant 100100 (active), skill 302 -> servant 100200 (active and passive)
//! skill 303 -> mystic code 1, skill 304 (function 205) -> command code 5001
//! NP 401 -> servant 100100

#![allow(dead_code)]

use std::path::PathBuf;

use atlas::data::loader::load_region;
use atlas::data::{MasterSnapshot, Region};
use atlas::hydrate::HydratedEntity;

pub fn fixture_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/master")
}

pub fn fixture_snapshot() -> MasterSnapshot {
    let tables = load_region(&fixture_dir(), Region::Jp).expect("fixture tables should load");
    MasterSnapshot::from_tables(Region::Jp, tables)
}

/// Every entity below `root`, depth-first, root excluded.
pub fn descendants(root: &HydratedEntity) -> Vec<&HydratedEntity> {
    let mut out = Vec::new();
    let mut stack: Vec<&HydratedEntity> = root
        .reverse
        .iter()
        .flat_map(|slot| slot.entities())
        .collect();
    while let Some(entity) = stack.pop() {
        out.push(entity);
        if let Some(slot) = &entity.reverse {
            stack.extend(slot.entities());
        }
    }
    out
}

pub fn ids(entities: &[HydratedEntity]) -> Vec<i64> {
    entities.iter().map(HydratedEntity::id).collect()
}
