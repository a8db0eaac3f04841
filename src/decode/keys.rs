//! Key tables for `Key:Value` dataVals tokens.

/// Prefix for positional values whose name is not known yet.
pub const TEMP_PREFIX: &str = "aa";

pub const DEPEND_FUNC_ID_KEY: &str = "DependFuncId1";
pub const DEPEND_FUNC_VALS_KEY: &str = "DependFuncVals1";
pub const DEPEND_FUNC_ID: &str = "DependFuncId";
pub const DEPEND_FUNC_VALS: &str = "DependFuncVals";

/// Each occurrence is kept under its own key and also collected into [EXTRA_INDIVIDUALITY_LIST].
/// The misspelling matches the game data.
pub const EXTRA_INDIVIDUALITY_KEY: &str = "AddIndividualty";
pub const EXTRA_INDIVIDUALITY_LIST: &str = "AddIndividualtyList";

/// Values split on `/` (or `&`) into integers.
pub const INT_LIST_KEYS: &[&str] = &[
    "TargetList",
    "TargetRarityList",
    "AndCheckIndividualityList",
    "ParamAddSelfIndividuality",
    "ParamAddOpIndividuality",
    "ParamAddFieldIndividuality",
    "SnapShotParamAddSelfIndv",
    "SnapShotParamAddOpIndv",
    "SnapShotParamAddFieldIndv",
    "NotTargetSkillIdArray",
    "TargetFunctionIndividuality",
    "TargetBuffIndividuality",
    "FieldIndividuality",
    "CopyTargetFunctionType",
    "CopyTargetBuffType",
    "NotSkillCopyTargetFuncIds",
    "NotSkillCopyTargetIndividualities",
];

/// Values split on `|` into groups, each group split like [INT_LIST_KEYS].
pub const INT_MATRIX_KEYS: &[&str] = &[
    "AndOrCheckIndividualityList",
    "ParamAddSelfIndividualityAndCheck",
    "ParamAddOpIndividualityAndCheck",
    "ParamAddFieldIndividualityAndCheck",
];

/// Values split on `/` and kept as strings.
pub const STR_LIST_KEYS: &[&str] = &["ApplyValueUp", "IgnoreValueUp"];

/// Values kept verbatim.
pub const RAW_STRING_KEYS: &[&str] = &["PopValueText", "PopLabel", "PopLabelColor"];

pub fn is_temp_key(key: &str) -> bool {
    temp_index(key).is_some()
}

pub fn temp_index(key: &str) -> Option<usize> {
    key.strip_prefix(TEMP_PREFIX)?.parse().ok()
}

pub fn temp_key(index: usize) -> String {
    format!("{TEMP_PREFIX}{index}")
}

/// `Prefix_<n>` -> `(Prefix, n)`.
pub fn phase_key(key: &str) -> Option<(&str, i64)> {
    let (prefix, suffix) = key.rsplit_once('_')?;
    if prefix.is_empty() || suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((prefix, suffix.parse().ok()?))
}

/// Split a list value on `/`, or on `&` when no `/` is present.
pub fn parse_int_list(value: &str) -> Option<Vec<i64>> {
    let sep = if value.contains('/') { '/' } else { '&' };
    value
        .split(sep)
        .map(|part| part.trim().parse::<i64>().ok())
        .collect()
}

pub fn parse_int_matrix(value: &str) -> Option<Vec<Vec<i64>>> {
    value.split('|').map(parse_int_list).collect()
}
