//! Filters and queries accepted by model backends.

use serde_json::{Map, Value};

/// A stored record: field name to value.
pub type Record = Map<String, Value>;

/// Predicate tree over records.
#[derive(Debug, Clone, PartialEq)]
pub enum Where {
    /// Every listed field equals its value. A `null` value also matches an
    /// absent field. An empty map matches every record.
    Fields(Record),
    /// All clauses match.
    And(Vec<Where>),
    /// At least one clause matches.
    Or(Vec<Where>),
}

impl Default for Where {
    fn default() -> Self {
        Where::all()
    }
}

impl Where {
    /// Matches every record.
    pub fn all() -> Self {
        Where::Fields(Record::new())
    }

    /// Single field equality.
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut fields = Record::new();
        fields.insert(field.into(), value.into());
        Where::Fields(fields)
    }

    /// Conjunction of exactly these two clauses, in order.
    pub fn and(left: Where, right: Where) -> Self {
        Where::And(vec![left, right])
    }

    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Where::Fields(fields) => fields.iter().all(|(name, expected)| {
                match record.get(name) {
                    Some(actual) => actual == expected,
                    None => expected.is_null(),
                }
            }),
            Where::And(clauses) => clauses.iter().all(|c| c.matches(record)),
            Where::Or(clauses) => clauses.iter().any(|c| c.matches(record)),
        }
    }
}

impl From<Record> for Where {
    fn from(fields: Record) -> Self {
        Where::Fields(fields)
    }
}

/// Whether logically deleted records take part in a read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Deleted {
    /// Only records that are not logically deleted.
    #[default]
    Hidden,
    /// Every record, deleted or not.
    Included,
}

/// A read request: filter plus paging and the deleted-records flag.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filter: Option<Where>,
    pub deleted: Deleted,
    pub limit: Option<usize>,
    pub skip: usize,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: impl Into<Where>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Opt out of hiding logically deleted records.
    pub fn with_deleted(mut self) -> Self {
        self.deleted = Deleted::Included;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn skip(mut self, skip: usize) -> Self {
        self.skip = skip;
        self
    }

    pub fn includes_deleted(&self) -> bool {
        self.deleted == Deleted::Included
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.filter.as_ref().map_or(true, |f| f.matches(record))
    }
}
