//! Sealed, typed access to the keys of one raw object.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::{Map, Value};

use super::error::HydrationError;
use super::{hydrate_at, Document};

/// The keys of a raw object, checked against a template's declared keys.
///
/// A `Fields` only exists once the object has been sealed: any key the
/// template does not declare has already been rejected.
pub struct Fields<'r> {
    template: &'static str,
    path: String,
    object: &'r Map<String, Value>,
}

impl<'r> Fields<'r> {
    /// Seals `raw` against the keys declared by `D`.
    pub(crate) fn seal<D: Document>(raw: &'r Value, path: String) -> Result<Self, HydrationError> {
        let object = match raw {
            Value::Object(object) => object,
            other => {
                return Err(HydrationError::TypeMismatch {
                    path,
                    expected: "an object",
                    found: kind_of(other),
                })
            }
        };

        if let Some(key) = object.keys().find(|key| !D::KEYS.contains(&key.as_str())) {
            return Err(HydrationError::UnexpectedKey {
                path,
                template: D::TEMPLATE,
                key: key.clone(),
            });
        }

        Ok(Self {
            template: D::TEMPLATE,
            path,
            object,
        })
    }

    /// JSON pointer of the sealed object.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// JSON pointer of one of the object's keys.
    pub fn path_of(&self, key: &str) -> String {
        child(&self.path, key)
    }

    pub fn required<S: Scalar>(&self, key: &str) -> Result<S, HydrationError> {
        let raw = self.get(key)?;
        S::from_raw(raw, &self.path_of(key))
    }

    /// A scalar that may be absent or null.
    pub fn optional<S: Scalar>(&self, key: &str) -> Result<Option<S>, HydrationError> {
        match self.object.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(raw) => S::from_raw(raw, &self.path_of(key)).map(Some),
        }
    }

    pub fn document<D: Document>(&self, key: &str) -> Result<D, HydrationError> {
        let raw = self.get(key)?;
        hydrate_at(raw, self.path_of(key))
    }

    /// A nested document that may be absent or null.
    pub fn optional_document<D: Document>(&self, key: &str) -> Result<Option<D>, HydrationError> {
        match self.object.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(raw) => hydrate_at(raw, self.path_of(key)).map(Some),
        }
    }

    /// A repeated document, hydrated element by element in order.
    ///
    /// An absent key yields an empty list.
    pub fn documents<D: Document>(&self, key: &str) -> Result<Vec<D>, HydrationError> {
        self.elements(key)?
            .iter()
            .enumerate()
            .map(|(index, raw)| hydrate_at(raw, child(&self.path_of(key), &index.to_string())))
            .collect()
    }

    pub fn scalars<S: Scalar>(&self, key: &str) -> Result<Vec<S>, HydrationError> {
        self.elements(key)?
            .iter()
            .enumerate()
            .map(|(index, raw)| S::from_raw(raw, &child(&self.path_of(key), &index.to_string())))
            .collect()
    }

    fn get(&self, key: &str) -> Result<&'r Value, HydrationError> {
        self.object.get(key).ok_or_else(|| HydrationError::MissingKey {
            path: self.path.clone(),
            template: self.template,
            key: key.to_string(),
        })
    }

    fn elements(&self, key: &str) -> Result<&'r [Value], HydrationError> {
        match self.object.get(key) {
            None => Ok(&[]),
            Some(Value::Array(elements)) => Ok(elements),
            Some(other) => Err(HydrationError::TypeMismatch {
                path: self.path_of(key),
                expected: "an array",
                found: kind_of(other),
            }),
        }
    }
}

/// A leaf value assigned from the raw tree unchanged, after a type check.
pub trait Scalar: Sized {
    fn from_raw(raw: &Value, path: &str) -> Result<Self, HydrationError>;
}

impl Scalar for String {
    fn from_raw(raw: &Value, path: &str) -> Result<Self, HydrationError> {
        raw.as_str()
            .map(str::to_string)
            .ok_or_else(|| mismatch(path, "a string", raw))
    }
}

impl Scalar for bool {
    fn from_raw(raw: &Value, path: &str) -> Result<Self, HydrationError> {
        raw.as_bool().ok_or_else(|| mismatch(path, "a boolean", raw))
    }
}

macro_rules! unsigned_scalar {
    ($($ty:ty),*) => {
        $(
            impl Scalar for $ty {
                fn from_raw(raw: &Value, path: &str) -> Result<Self, HydrationError> {
                    let value = raw
                        .as_u64()
                        .ok_or_else(|| mismatch(path, "a non-negative integer", raw))?;
                    <$ty>::try_from(value).map_err(|_| HydrationError::InvalidValue {
                        path: path.to_string(),
                        reason: format!("{value} does not fit in {}", stringify!($ty)),
                    })
                }
            }
        )*
    };
}

unsigned_scalar!(u8, u16, u32);

macro_rules! chrono_scalar {
    ($($ty:ty => $format:literal),*) => {
        $(
            impl Scalar for $ty {
                fn from_raw(raw: &Value, path: &str) -> Result<Self, HydrationError> {
                    let text = raw.as_str().ok_or_else(|| mismatch(path, "a string", raw))?;
                    <$ty>::parse_from_str(text, $format).map_err(|e| HydrationError::InvalidValue {
                        path: path.to_string(),
                        reason: format!("`{text}` is not a valid {}: {e}", stringify!($ty)),
                    })
                }
            }
        )*
    };
}

chrono_scalar!(
    NaiveDate => "%Y-%m-%d",
    NaiveDateTime => "%Y-%m-%dT%H:%M:%S",
    NaiveTime => "%H:%M:%S"
);

/// Appends `key` to a JSON pointer, escaping it.
fn child(path: &str, key: &str) -> String {
    format!("{path}/{}", key.replace('~', "~0").replace('/', "~1"))
}

fn mismatch(path: &str, expected: &'static str, raw: &Value) -> HydrationError {
    HydrationError::TypeMismatch {
        path: path.to_string(),
        expected,
        found: kind_of(raw),
    }
}

pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
