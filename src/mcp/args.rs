//! Typed access to tool call arguments.
//!
//! Every accessor reports violations as [`BitbucketError::InvalidInput`]
//! naming the offending argument. `null` is treated the same as an absent
//! argument.

use std::ops::RangeInclusive;

use serde_json::{Map, Value};

use crate::bitbucket::error::BitbucketError;

/// Inclusive bounds for `limit` arguments.
pub const LIMIT_RANGE: RangeInclusive<u32> = 1..=100;

/// Borrowed view over the `arguments` object of a tool call.
#[derive(Debug, Clone, Copy)]
pub struct ToolArguments<'a> {
    values: &'a Map<String, Value>,
}

fn empty_map() -> &'static Map<String, Value> {
    static EMPTY: std::sync::OnceLock<Map<String, Value>> = std::sync::OnceLock::new();
    EMPTY.get_or_init(Map::new)
}

impl<'a> ToolArguments<'a> {
    /// Wraps the raw `arguments` value; `null` behaves as an empty object.
    ///
    /// # Errors
    ///
    /// Returns [`BitbucketError::InvalidInput`] when the value is neither an
    /// object nor `null`.
    pub fn new(raw: &'a Value) -> Result<Self, BitbucketError> {
        match raw {
            Value::Object(values) => Ok(Self { values }),
            Value::Null => Ok(Self {
                values: empty_map(),
            }),
            _ => Err(BitbucketError::invalid_input(
                "tool arguments must be an object",
            )),
        }
    }

    fn present(&self, key: &str) -> Option<&'a Value> {
        self.values.get(key).filter(|value| !value.is_null())
    }

    /// Optional string argument.
    ///
    /// # Errors
    ///
    /// Returns [`BitbucketError::InvalidInput`] when the value is not a string.
    pub fn optional_str(&self, key: &str) -> Result<Option<&'a str>, BitbucketError> {
        self.present(key)
            .map(|value| {
                value
                    .as_str()
                    .ok_or_else(|| BitbucketError::invalid_input(format!("{key} must be a string")))
            })
            .transpose()
    }

    /// Required, non-blank string argument.
    ///
    /// # Errors
    ///
    /// Returns [`BitbucketError::InvalidInput`] when the argument is missing,
    /// blank, or not a string.
    pub fn required_str(&self, key: &str) -> Result<&'a str, BitbucketError> {
        self.optional_str(key)?
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| BitbucketError::invalid_input(format!("{key} is required")))
    }

    /// Optional integer argument within `range`.
    ///
    /// # Errors
    ///
    /// Returns [`BitbucketError::InvalidInput`] when the value is not an
    /// integer or falls outside `range`.
    pub fn bounded_u32(
        &self,
        key: &str,
        range: &RangeInclusive<u32>,
    ) -> Result<Option<u32>, BitbucketError> {
        let Some(value) = self.present(key) else {
            return Ok(None);
        };
        let out_of_range = || {
            BitbucketError::invalid_input(format!(
                "{key} must be between {} and {}",
                range.start(),
                range.end()
            ))
        };
        if value.as_i64().is_some_and(|number| number < 0) {
            return Err(out_of_range());
        }
        let number = value
            .as_u64()
            .ok_or_else(|| BitbucketError::invalid_input(format!("{key} must be an integer")))?;
        u32::try_from(number)
            .ok()
            .filter(|candidate| range.contains(candidate))
            .map(Some)
            .ok_or_else(out_of_range)
    }

    /// Optional boolean argument.
    ///
    /// # Errors
    ///
    /// Returns [`BitbucketError::InvalidInput`] when the value is not a boolean.
    pub fn optional_bool(&self, key: &str) -> Result<Option<bool>, BitbucketError> {
        self.present(key)
            .map(|value| {
                value
                    .as_bool()
                    .ok_or_else(|| BitbucketError::invalid_input(format!("{key} must be a boolean")))
            })
            .transpose()
    }

    /// Optional object argument.
    ///
    /// # Errors
    ///
    /// Returns [`BitbucketError::InvalidInput`] when the value is not an object.
    pub fn optional_object(
        &self,
        key: &str,
    ) -> Result<Option<&'a Map<String, Value>>, BitbucketError> {
        self.present(key)
            .map(|value| {
                value
                    .as_object()
                    .ok_or_else(|| BitbucketError::invalid_input(format!("{key} must be an object")))
            })
            .transpose()
    }

    /// Required object argument.
    ///
    /// # Errors
    ///
    /// Returns [`BitbucketError::InvalidInput`] when the argument is missing
    /// or not an object.
    pub fn required_object(&self, key: &str) -> Result<&'a Map<String, Value>, BitbucketError> {
        self.optional_object(key)?
            .ok_or_else(|| BitbucketError::invalid_input(format!("{key} is required")))
    }

    /// Optional array argument.
    ///
    /// # Errors
    ///
    /// Returns [`BitbucketError::InvalidInput`] when the value is not an array.
    pub fn optional_array(&self, key: &str) -> Result<Option<&'a [Value]>, BitbucketError> {
        self.present(key)
            .map(|value| {
                value
                    .as_array()
                    .map(Vec::as_slice)
                    .ok_or_else(|| BitbucketError::invalid_input(format!("{key} must be an array")))
            })
            .transpose()
    }

    /// Optional array of strings.
    ///
    /// # Errors
    ///
    /// Returns [`BitbucketError::InvalidInput`] when the value is not an array
    /// or any element is not a string.
    pub fn optional_string_list(&self, key: &str) -> Result<Option<Vec<String>>, BitbucketError> {
        self.optional_array(key)?
            .map(|items| {
                items
                    .iter()
                    .map(|item| {
                        item.as_str().map(str::to_owned).ok_or_else(|| {
                            BitbucketError::invalid_input(format!(
                                "{key} must contain only strings"
                            ))
                        })
                    })
                    .collect()
            })
            .transpose()
    }
}
