//! # Filters and Field Updates
//!
//! A [`Filter`] is a conjunction of immutable predicate clauses over dotted
//! field paths (`"account.accountId"`). Base filters are built once per
//! operation and never change for the run's lifetime; per-record clauses are
//! appended onto a clone.
//!
//! [`FieldUpdate`] is the write-side counterpart: an ordered set of targeted
//! path-to-value assignments. Handlers never replace whole documents.

use serde_json::Value;

/// A single predicate clause over one field path.
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    /// Field equals the value.
    Eq(Value),
    /// Field differs from the value; a missing field also matches.
    Ne(Value),
    /// Field equals one of the values.
    In(Vec<Value>),
    /// Field is present (`true`) or absent (`false`).
    Exists(bool),
}

/// A conjunction of clauses over dotted field paths.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    clauses: Vec<(String, Clause)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `field == value`.
    pub fn eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.clauses.push((field.to_string(), Clause::Eq(value.into())));
        self
    }

    /// Require `field != value`. A record without the field matches.
    pub fn ne(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.clauses.push((field.to_string(), Clause::Ne(value.into())));
        self
    }

    /// Require the field to equal one of `values`.
    pub fn is_in<I, V>(mut self, field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.clauses.push((field.to_string(), Clause::In(values)));
        self
    }

    /// Require the field to be present (`true`) or absent (`false`).
    pub fn exists(mut self, field: &str, exists: bool) -> Self {
        self.clauses.push((field.to_string(), Clause::Exists(exists)));
        self
    }

    /// The clauses in insertion order.
    pub fn clauses(&self) -> &[(String, Clause)] {
        &self.clauses
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Evaluate the conjunction against a document.
    pub fn matches(&self, doc: &Value) -> bool {
        self.clauses.iter().all(|(path, clause)| {
            let field = field_at(doc, path);
            match clause {
                Clause::Eq(value) => field == Some(value),
                Clause::Ne(value) => field != Some(value),
                Clause::In(values) => field.is_some_and(|f| values.contains(f)),
                Clause::Exists(true) => field.is_some(),
                Clause::Exists(false) => field.is_none(),
            }
        })
    }
}

/// Resolve a dotted path inside a document.
pub fn field_at<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(doc, |value, segment| value.get(segment))
}

/// An ordered set of targeted field assignments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldUpdate {
    fields: Vec<(String, Value)>,
}

impl FieldUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign `value` to the dotted `field` path.
    pub fn set(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.fields.push((field.to_string(), value.into()));
        self
    }

    /// The assignments in insertion order.
    pub fn fields(&self) -> &[(String, Value)] {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Apply the assignments in place, creating intermediate objects for
    /// nested paths as needed.
    pub fn apply(&self, doc: &mut Value) {
        for (path, value) in &self.fields {
            set_field(doc, path, value.clone());
        }
    }
}

fn set_field(doc: &mut Value, path: &str, value: Value) {
    let mut current = doc;
    let mut segments = path.split('.').peekable();
    while let Some(segment) = segments.next() {
        if !current.is_object() {
            *current = Value::Object(serde_json::Map::new());
        }
        let map = current.as_object_mut().expect("object ensured above");
        if segments.peek().is_none() {
            map.insert(segment.to_string(), value);
            return;
        }
        current = map
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(serde_json::Map::new()));
    }
}
