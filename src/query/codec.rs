//! Schema-driven query string codec.
//!
//! A [`QsSchema`] lists the fields a screen understands. Decoding coerces raw
//! strings into numbers or enum members and silently swaps anything invalid
//! for the field default; encoding writes back only the fields that differ
//! from their default. Unknown keys are ignored in both directions.

use std::{collections::BTreeMap, fmt, sync::Arc};

use url::form_urlencoded;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum QsValue {
    Number(i64),
    Text(String),
}

impl QsValue {
    pub fn as_number(&self) -> Option<i64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Number(_) => None,
        }
    }
}

impl fmt::Display for QsValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for QsValue {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl From<u32> for QsValue {
    fn from(value: u32) -> Self {
        Self::Number(i64::from(value))
    }
}

impl From<&str> for QsValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for QsValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Sanitized parameter map, keyed by schema field name.
pub type QsMap = BTreeMap<&'static str, QsValue>;

pub type Validator = Arc<dyn Fn(&QsValue) -> bool + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Number,
    Text,
    Enum(Vec<String>),
}

#[derive(Clone)]
pub struct FieldSpec {
    name: &'static str,
    kind: FieldKind,
    default: Option<QsValue>,
    validator: Option<Validator>,
}

impl fmt::Debug for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSpec")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("default", &self.default)
            .field("validator", &self.validator.is_some())
            .finish()
    }
}

impl FieldSpec {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn default_value(&self) -> Option<&QsValue> {
        self.default.as_ref()
    }

    /// Coerces a value into this field's kind. Empty text counts as absent.
    fn coerce(&self, value: &QsValue) -> Option<QsValue> {
        match (&self.kind, value) {
            (FieldKind::Number, QsValue::Number(n)) => Some(QsValue::Number(*n)),
            (FieldKind::Number, QsValue::Text(s)) => s.trim().parse().ok().map(QsValue::Number),
            (FieldKind::Text, QsValue::Text(s)) if s.is_empty() => None,
            (FieldKind::Text, v) => Some(QsValue::Text(v.to_string())),
            (FieldKind::Enum(allowed), v) => {
                let text = v.to_string();
                allowed.contains(&text).then_some(QsValue::Text(text))
            }
        }
    }

    fn accept(&self, value: &QsValue) -> Option<QsValue> {
        let coerced = self.coerce(value)?;
        match &self.validator {
            Some(valid) if !valid(&coerced) => None,
            _ => Some(coerced),
        }
    }

    fn resolve(&self, value: Option<&QsValue>) -> Option<QsValue> {
        match value {
            None => self.default.clone(),
            Some(v) => self.accept(v).or_else(|| {
                tracing::debug!(field = self.name, value = %v, "invalid query value, using default");
                self.default.clone()
            }),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct QsSchema {
    fields: Vec<FieldSpec>,
}

impl QsSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn number(self, name: &'static str, default: Option<i64>) -> Self {
        self.field(name, FieldKind::Number, default.map(QsValue::Number))
    }

    pub fn text(self, name: &'static str, default: Option<&str>) -> Self {
        self.field(name, FieldKind::Text, default.map(QsValue::from))
    }

    pub fn one_of<I, S>(self, name: &'static str, allowed: I, default: Option<&str>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let allowed = allowed.into_iter().map(Into::into).collect();
        self.field(name, FieldKind::Enum(allowed), default.map(QsValue::from))
    }

    /// Attaches a validator to the most recently added field.
    pub fn validate<F>(mut self, validator: F) -> Self
    where
        F: Fn(&QsValue) -> bool + Send + Sync + 'static,
    {
        if let Some(last) = self.fields.last_mut() {
            last.validator = Some(Arc::new(validator));
        }
        self
    }

    /// Adds the fields of `other` after this schema's own.
    pub fn extend(mut self, other: QsSchema) -> Self {
        for field in other.fields {
            self.fields.retain(|f| f.name != field.name);
            self.fields.push(field);
        }
        self
    }

    fn field(mut self, name: &'static str, kind: FieldKind, default: Option<QsValue>) -> Self {
        self.fields.retain(|f| f.name != name);
        self.fields.push(FieldSpec {
            name,
            kind,
            default,
            validator: None,
        });
        self
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Parses a raw query string (leading `?` allowed). The first occurrence
    /// of a key wins.
    pub fn decode(&self, raw: &str) -> QsMap {
        let raw = raw.strip_prefix('?').unwrap_or(raw);
        let mut seen: BTreeMap<String, String> = BTreeMap::new();
        for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
            seen.entry(key.into_owned()).or_insert_with(|| value.into_owned());
        }

        self.fields
            .iter()
            .filter_map(|field| {
                let value = seen.get(field.name).map(|v| QsValue::Text(v.clone()));
                field.resolve(value.as_ref()).map(|v| (field.name, v))
            })
            .collect()
    }

    pub fn sanitize(&self, values: &QsMap) -> QsMap {
        self.fields
            .iter()
            .filter_map(|field| {
                field
                    .resolve(values.get(field.name))
                    .map(|v| (field.name, v))
            })
            .collect()
    }

    /// Serializes the defined, non-default fields in schema order.
    pub fn encode(&self, values: &QsMap) -> String {
        let sanitized = self.sanitize(values);
        let mut out = form_urlencoded::Serializer::new(String::new());
        for field in &self.fields {
            match sanitized.get(field.name) {
                Some(v) if Some(v) != field.default.as_ref() => {
                    out.append_pair(field.name, &v.to_string());
                }
                _ => {}
            }
        }
        out.finish()
    }
}
