//! Request parameters and response payloads for the HTTP API.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::data::index::RelationKind;
use crate::data::registry::Region;
use crate::data::snapshot::{EntityKind, MasterSnapshot, SnapshotVersion, TableSizes};
use crate::hydrate::{ReverseContext, ReverseData, ReverseDepth};
use crate::server::error::{ApiError, ApiResult};

/// `?reverse=&reverseDepth=&reverseData=` on entity routes.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityQuery {
    #[serde(default)]
    pub reverse: bool,
    pub reverse_depth: Option<String>,
    pub reverse_data: Option<String>,
}

impl EntityQuery {
    pub fn context(&self, kind: EntityKind) -> ApiResult<ReverseContext> {
        let depth = match self.reverse_depth.as_deref() {
            Some(raw) => raw.parse::<ReverseDepth>().map_err(ApiError::BadRequest)?,
            None => ReverseDepth::default_for(kind),
        };
        let data = match self.reverse_data.as_deref() {
            Some(raw) => raw.parse::<ReverseData>().map_err(ApiError::BadRequest)?,
            None => ReverseData::default(),
        };
        Ok(ReverseContext::new(self.reverse, depth, data))
    }
}

/// `?raw=&funcType=` on the decode utility.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodeQuery {
    pub raw: String,
    pub func_type: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub regions: Vec<Region>,
}

impl HealthResponse {
    pub fn new(regions: Vec<Region>) -> Self {
        Self {
            status: "ok",
            service: "atlas",
            version: env!("CARGO_PKG_VERSION"),
            regions,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InfoResponse {
    #[serde(flatten)]
    pub version: SnapshotVersion,
    pub tables: TableSizes,
    /// Distinct referenced targets per relation.
    pub index: BTreeMap<&'static str, usize>,
}

impl InfoResponse {
    pub fn from_snapshot(snapshot: &MasterSnapshot) -> Self {
        let index = RelationKind::ALL
            .iter()
            .map(|&relation| (relation.as_str(), snapshot.index().target_count(relation)))
            .collect();
        Self {
            version: snapshot.version().clone(),
            tables: snapshot.table_sizes(),
            index,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReloadResponse {
    pub status: &'static str,
    pub region: Region,
    pub generation: u64,
}

pub fn parse_region(raw: &str) -> ApiResult<Region> {
    raw.parse::<Region>().map_err(ApiError::NotFound)
}

pub fn parse_kind(raw: &str) -> ApiResult<EntityKind> {
    raw.parse::<EntityKind>().map_err(ApiError::NotFound)
}

pub fn parse_id(raw: &str) -> ApiResult<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| ApiError::BadRequest(format!("invalid id '{raw}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_query_defaults_depth_by_kind() {
        let query = EntityQuery {
            reverse: true,
            ..EntityQuery::default()
        };
        let ctx = query.context(EntityKind::Function).unwrap();
        assert_eq!(ctx.depth, ReverseDepth::SkillNp);
        assert_eq!(ctx.data, ReverseData::Nice);
        assert!(ctx.reverse);
    }

    #[test]
    fn entity_query_rejects_unknown_depth() {
        let query = EntityQuery {
            reverse_depth: Some("quest".to_string()),
            ..EntityQuery::default()
        };
        let err = query.context(EntityKind::Buff).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn path_segments_parse() {
        assert_eq!(parse_region("JP").unwrap(), Region::Jp);
        assert!(matches!(parse_region("EU"), Err(ApiError::NotFound(_))));
        assert_eq!(parse_kind("NP").unwrap(), EntityKind::NoblePhantasm);
        assert!(matches!(parse_id("12a"), Err(ApiError::BadRequest(_))));
    }
}
