//! dataVals decoder.
//!
//! A function's parameters are stored as one string such as
//! `[1000,3,3,300,DependFuncId1:123,DependFuncVals1:[1000,500]]`. Bare integers are
//! named by position through the function type's [FieldLayout]; `Key:Value` tokens are
//! named by their key. Decoding is a pure function of the raw string, the function type,
//! and (for dependent functions) a function-type lookup.

mod func_type;
pub mod keys;
mod record;
pub mod split;

use std::collections::HashMap;

use thiserror::Error;
use tracing::warn;

pub use func_type::{FieldLayout, FuncType};
pub use record::{FieldRecord, FieldValue};

use keys::{
    is_temp_key, phase_key, temp_index, temp_key, DEPEND_FUNC_ID, DEPEND_FUNC_ID_KEY,
    DEPEND_FUNC_VALS, DEPEND_FUNC_VALS_KEY, EXTRA_INDIVIDUALITY_KEY, EXTRA_INDIVIDUALITY_LIST,
    INT_LIST_KEYS, INT_MATRIX_KEYS, RAW_STRING_KEYS, STR_LIST_KEYS,
};

/// Nesting limit for `DependFuncVals1` chains.
pub const MAX_DEPEND_DEPTH: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("token {index} ({token:?}) is neither an integer nor a key:value pair")]
    MalformedToken { index: usize, token: String },
    #[error("{key} must be an integer, got {value:?}")]
    InvalidAdministrativeValue { key: &'static str, value: String },
    #[error("DependFuncVals1 appears before DependFuncId1")]
    DependValsBeforeId,
    #[error("dependent function values nested deeper than {0} levels")]
    NestingTooDeep(usize),
}

/// Resolves the type of a function referenced by `DependFuncId1`.
pub trait FuncTypeLookup {
    fn func_type(&self, func_id: i64) -> Option<FuncType>;
}

/// Lookup that knows no functions; dependent values decode with the default layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLookup;

impl FuncTypeLookup for NoLookup {
    fn func_type(&self, _func_id: i64) -> Option<FuncType> {
        None
    }
}

impl FuncTypeLookup for HashMap<i64, FuncType> {
    fn func_type(&self, func_id: i64) -> Option<FuncType> {
        self.get(&func_id).copied()
    }
}

/// Decode without dependent-function resolution.
pub fn decode(raw: &str, func_type: FuncType) -> Result<FieldRecord, DecodeError> {
    decode_field_record(raw, func_type, &NoLookup)
}

/// Decode one dataVals string for a function of type `func_type`.
pub fn decode_field_record(
    raw: &str,
    func_type: FuncType,
    lookup: &dyn FuncTypeLookup,
) -> Result<FieldRecord, DecodeError> {
    Decoding::new(Some(func_type), lookup, 0).run(raw)
}

struct Decoding<'a> {
    func_type: Option<FuncType>,
    layout: FieldLayout,
    lookup: &'a dyn FuncTypeLookup,
    depth: usize,
    record: FieldRecord,
    tokens: usize,
    // Tokens merged into a field that already existed (phase lists, repeated
    // extra individuality, the post-pass discriminator).
    folded: usize,
}

impl<'a> Decoding<'a> {
    fn new(func_type: Option<FuncType>, lookup: &'a dyn FuncTypeLookup, depth: usize) -> Self {
        Self {
            func_type,
            layout: func_type.map_or(FieldLayout::Standard, FuncType::layout),
            lookup,
            depth,
            record: FieldRecord::new(),
            tokens: 0,
            folded: 0,
        }
    }

    fn run(mut self, raw: &str) -> Result<FieldRecord, DecodeError> {
        self.consume(raw)?;
        self.check_field_count(raw);
        Ok(self.record)
    }

    fn consume(&mut self, raw: &str) -> Result<(), DecodeError> {
        for (index, token) in split::tokens(raw).into_iter().enumerate() {
            self.push_token(index, token)?;
        }
        self.reinterpret_deferred();
        Ok(())
    }

    fn push_token(&mut self, index: usize, token: &str) -> Result<(), DecodeError> {
        let token = token.trim();
        if token.is_empty() {
            return Ok(());
        }
        self.tokens += 1;

        if let Ok(value) = token.parse::<i64>() {
            let name = match self.layout.name_at(index) {
                Some(name) => name.to_string(),
                None => temp_key(index),
            };
            self.record.insert(name, value);
            return Ok(());
        }

        match split::split_once_top_level(token, ':') {
            Some((key, value)) if !key.trim().is_empty() => {
                self.push_keyed(key.trim(), value.trim())
            }
            _ => Err(DecodeError::MalformedToken {
                index,
                token: token.to_string(),
            }),
        }
    }

    fn push_keyed(&mut self, key: &str, value: &str) -> Result<(), DecodeError> {
        match key {
            DEPEND_FUNC_ID_KEY => {
                let id = value
                    .parse::<i64>()
                    .map_err(|_| DecodeError::InvalidAdministrativeValue {
                        key: DEPEND_FUNC_ID_KEY,
                        value: value.to_string(),
                    })?;
                self.record.insert(DEPEND_FUNC_ID, id);
            }
            DEPEND_FUNC_VALS_KEY => {
                let nested = self.decode_dependent(value)?;
                self.record.insert(DEPEND_FUNC_VALS, nested);
            }
            k if INT_LIST_KEYS.contains(&k) => {
                let parsed = keys::parse_int_list(value)
                    .map_or_else(|| FieldValue::from(value), FieldValue::IntList);
                self.record.insert(k, parsed);
            }
            k if INT_MATRIX_KEYS.contains(&k) => {
                let parsed = keys::parse_int_matrix(value)
                    .map_or_else(|| FieldValue::from(value), FieldValue::IntMatrix);
                self.record.insert(k, parsed);
            }
            k if STR_LIST_KEYS.contains(&k) => {
                let list = value.split('/').map(str::to_string).collect();
                self.record.insert(k, FieldValue::StrList(list));
            }
            k if RAW_STRING_KEYS.contains(&k) => {
                self.record.insert(k, value);
            }
            k => match phase_key(k) {
                Some((prefix, phase)) => self.push_phase(k, prefix, phase, value),
                None => self.push_scalar(k, value),
            },
        }
        Ok(())
    }

    fn decode_dependent(&self, value: &str) -> Result<FieldRecord, DecodeError> {
        let func_id = self
            .record
            .get_int(DEPEND_FUNC_ID)
            .ok_or(DecodeError::DependValsBeforeId)?;
        if self.depth + 1 > MAX_DEPEND_DEPTH {
            return Err(DecodeError::NestingTooDeep(MAX_DEPEND_DEPTH));
        }
        let func_type = self.lookup.func_type(func_id);
        if func_type.is_none() {
            warn!(func_id, "dependent function not found, decoding with default layout");
        }
        Decoding::new(func_type, self.lookup, self.depth + 1).run(value)
    }

    fn push_phase(&mut self, key: &str, prefix: &str, phase: i64, value: &str) {
        let Ok(value) = value.parse::<i64>() else {
            self.record.insert(key, value);
            return;
        };
        match self.record.get_mut(prefix) {
            Some(FieldValue::IntMatrix(pairs)) => {
                let at = pairs.partition_point(|pair| pair.first().copied().unwrap_or(0) <= phase);
                pairs.insert(at, vec![phase, value]);
                self.folded += 1;
            }
            Some(_) => {
                warn!(key, "phase prefix collides with an existing field");
                self.record.insert(key, value);
            }
            None => {
                self.record.insert(prefix, FieldValue::IntMatrix(vec![vec![phase, value]]));
            }
        }
    }

    fn push_scalar(&mut self, key: &str, value: &str) {
        let parsed = match value.parse::<i64>() {
            Ok(number) => FieldValue::Int(number),
            Err(_) => FieldValue::from(value),
        };
        if key == EXTRA_INDIVIDUALITY_KEY {
            if let FieldValue::Int(number) = parsed {
                match self.record.get_mut(EXTRA_INDIVIDUALITY_LIST) {
                    Some(FieldValue::IntList(list)) => {
                        list.push(number);
                        self.folded += 1;
                    }
                    _ => {
                        self.record.insert(EXTRA_INDIVIDUALITY_LIST, vec![number]);
                    }
                }
            }
        }
        self.record.insert(key, parsed);
    }

    /// Rename the second deferred value using the first as discriminator.
    fn reinterpret_deferred(&mut self) {
        let table = self.layout.deferred_names();
        if table.is_empty() {
            return;
        }
        let mut temps: Vec<(usize, String)> = self
            .record
            .keys()
            .filter_map(|key| temp_index(key).map(|index| (index, key.to_string())))
            .collect();
        temps.sort_unstable();
        let [(_, discriminator_key), (_, value_key), ..] = temps.as_slice() else {
            return;
        };
        let Some(discriminator) = self.record.get_int(discriminator_key) else {
            return;
        };
        let Some(&(_, name)) = table.iter().find(|(code, _)| *code == discriminator) else {
            warn!(
                func_type = ?self.func_type,
                discriminator,
                "unrecognised deferred dataVals discriminator"
            );
            return;
        };
        self.record.rename(value_key, name);
        self.record.remove(discriminator_key);
        self.folded += 1;
    }

    /// `(named, expected)`: named fields against the tokens they should account for.
    /// `None` for the "none" function type, which carries no meaningful values.
    fn field_count(&self) -> Option<(usize, usize)> {
        if self.func_type == Some(FuncType::None) {
            return None;
        }
        let named = self
            .record
            .keys()
            .filter(|key| !is_temp_key(key) && *key != EXTRA_INDIVIDUALITY_LIST)
            .count();
        Some((named, self.tokens.saturating_sub(self.folded)))
    }

    /// Advisory: warn when the named fields do not account for every token.
    fn check_field_count(&self, raw: &str) {
        let Some((named, expected)) = self.field_count() else {
            return;
        };
        if named != expected {
            warn!(
                func_type = ?self.func_type,
                raw,
                named,
                expected,
                "dataVals field count mismatch"
            );
        }
    }
}
