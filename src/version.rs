//! Version tags and how they are read from and written into a persisted blob.
//!
//! Two layouts are supported (see [`VersionLayout`]):
//!
//! ```text
//! KeyField("__VERSION"):  {"rounds": [], "rules": {..}, "__VERSION": 3}
//! Envelope:               {"version": 3, "document": {"rounds": [], "rules": {..}}}
//! ```
//!
//! Either way the upgrade and integrity logic only ever sees the bare document
//! and the tag as a separate value.

use crate::config::VersionLayout;
use crate::error::{StoreError, StoreResult};
use derive_more::{Display, Into};
use serde_json::{Map, Value};

const ENVELOPE_VERSION: &str = "version";
const ENVELOPE_DOCUMENT: &str = "document";

/// A schema version. Always at least [`Version::FIRST`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Into)]
pub struct Version(u32);

impl Version {
    /// The implicit version of a document no migration has touched.
    pub const FIRST: Version = Version(1);

    pub fn new(version: u32) -> Option<Self> {
        (version >= 1).then_some(Version(version))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn next(self) -> Version {
        Version(self.0.saturating_add(1))
    }

    /// Interpret a raw tag value. Only JSON integers `>= 1` are versions.
    ///
    /// ```
    /// use keepsake::version::Version;
    /// use serde_json::json;
    ///
    /// assert_eq!(Version::from_tag(&json!(3)), Some(Version::new(3).unwrap()));
    /// assert_eq!(Version::from_tag(&json!(2.0)), Some(Version::new(2).unwrap()));
    /// assert_eq!(Version::from_tag(&json!(0)), None);
    /// assert_eq!(Version::from_tag(&json!(1.5)), None);
    /// assert_eq!(Version::from_tag(&json!("3")), None);
    /// ```
    pub fn from_tag(tag: &Value) -> Option<Version> {
        let Value::Number(number) = tag else {
            return None;
        };
        let raw = match number.as_u64() {
            Some(raw) => raw,
            None => {
                let float = number.as_f64()?;
                if float.fract() != 0.0 || float < 1.0 || float > u32::MAX as f64 {
                    return None;
                }
                float as u64
            }
        };
        u32::try_from(raw).ok().and_then(Version::new)
    }
}

/// A blob split into its document and raw (not yet validated) version tag.
#[derive(Debug, Clone, PartialEq)]
pub struct Tagged {
    pub document: Value,
    pub tag: Option<Value>,
}

/// Split a parsed blob into document and tag according to `layout`.
///
/// A missing tag is reported as `tag: None`; interpreting it is left to the
/// caller. Under `KeyField` the reserved field is removed from the document.
pub fn split(blob: Value, layout: &VersionLayout) -> Tagged {
    match (layout, blob) {
        (VersionLayout::KeyField(field), Value::Object(mut object)) => {
            let tag = object.remove(field);
            Tagged {
                document: Value::Object(object),
                tag,
            }
        }
        (VersionLayout::Envelope, Value::Object(mut object))
            if object.contains_key(ENVELOPE_DOCUMENT) =>
        {
            let tag = object.remove(ENVELOPE_VERSION);
            let document = object.remove(ENVELOPE_DOCUMENT).unwrap_or(Value::Null);
            Tagged { document, tag }
        }
        (_, document) => Tagged {
            document,
            tag: None,
        },
    }
}

/// Attach `version` to `document` according to `layout`.
pub fn stamp(document: Value, version: Version, layout: &VersionLayout) -> StoreResult<Value> {
    match layout {
        VersionLayout::KeyField(field) => match document {
            Value::Object(mut object) => {
                object.insert(field.clone(), Value::from(version.get()));
                Ok(Value::Object(object))
            }
            other => Err(StoreError::Save {
                message: format!(
                    "cannot embed version field '{}' into a non-object document: {}",
                    field,
                    kind_name(&other)
                ),
                source: None,
            }),
        },
        VersionLayout::Envelope => {
            let mut object = Map::new();
            object.insert(ENVELOPE_VERSION.to_string(), Value::from(version.get()));
            object.insert(ENVELOPE_DOCUMENT.to_string(), document);
            Ok(Value::Object(object))
        }
    }
}

pub(crate) fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
