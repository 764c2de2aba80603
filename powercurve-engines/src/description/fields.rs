//! Typed access to numbered JSON fields.

use serde_json::{Map, Value};

use super::DescriptionError;

pub(crate) type Object = Map<String, Value>;

/// A JSON object together with its dotted path, for error messages.
#[derive(Clone, Copy)]
pub(crate) struct Section<'a> {
    pub(crate) path: &'a str,
    pub(crate) map: &'a Object,
}

impl<'a> Section<'a> {
    pub(crate) fn new(path: &'a str, map: &'a Object) -> Self {
        Self { path, map }
    }

    pub(crate) fn contains(&self, key: &str) -> bool {
        !matches!(self.map.get(key), None | Some(Value::Null))
    }

    pub(crate) fn number(&self, key: &str) -> Result<Option<f64>, DescriptionError> {
        match self.map.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Number(n)) => Ok(n.as_f64()),
            Some(other) => Err(self.wrong_type(key, "a number", other)),
        }
    }

    pub(crate) fn flag(&self, key: &str) -> Result<Option<bool>, DescriptionError> {
        match self.map.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(other) => Err(self.wrong_type(key, "a boolean", other)),
        }
    }

    pub(crate) fn text(&self, key: &str) -> Result<Option<&'a str>, DescriptionError> {
        match self.map.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(other) => Err(self.wrong_type(key, "a string", other)),
        }
    }

    pub(crate) fn object(&self, key: &str) -> Result<Option<&'a Object>, DescriptionError> {
        match self.map.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Object(map)) => Ok(Some(map)),
            Some(other) => Err(self.wrong_type(key, "an object", other)),
        }
    }

    /// Returns `(index, key)` for every key of the form `{prefix}{digits}`,
    /// sorted by index.
    pub(crate) fn indexed_keys(&self, prefix: &str) -> Vec<(usize, &'a str)> {
        indexed_keys(self.map, prefix)
    }

    pub(crate) fn child_path(&self, key: &str) -> String {
        if self.path.is_empty() {
            key.to_owned()
        } else {
            format!("{}.{key}", self.path)
        }
    }

    fn wrong_type(&self, key: &str, expected: &'static str, found: &Value) -> DescriptionError {
        DescriptionError::WrongType {
            field: self.child_path(key),
            expected,
            found: json_kind(found),
        }
    }
}

pub(crate) fn indexed_keys<'a>(map: &'a Object, prefix: &str) -> Vec<(usize, &'a str)> {
    let mut keys: Vec<_> = map
        .keys()
        .filter_map(|key| {
            let index = key.strip_prefix(prefix)?;
            if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            Some((index.parse().ok()?, key.as_str()))
        })
        .collect();
    keys.sort_unstable();
    keys
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
