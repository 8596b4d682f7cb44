//! Record storage behind the reference backend.
//!
//! The store is generic over entity kinds and holds every record as a JSON
//! object, keyed by its `id`. Shape checks and reference handling happen in
//! the resource layer; the store only assigns identifiers, sorts and pages.
//!
//! # Example
//!
//! ```
//! use etudiant_rs_server::store::InMemoryStore;
//! use etudiant_rs_model::EntityKind;
//!
//! let store = InMemoryStore::new();
//! assert_eq!(store.count(EntityKind::Country), 0);
//! ```

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use etudiant_rs_core::{AppError, AppResult};
use etudiant_rs_model::{EntityKind, Id};

/// Parameters of a list query.
///
/// Pages are zero-indexed. Sort clauses read `field` or `field,asc|desc`
/// and apply in order, the first one deciding first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListParams {
    pub page: usize,
    pub size: usize,
    pub sort: Vec<String>,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: 0,
            size: 20,
            sort: Vec::new(),
        }
    }
}

impl ListParams {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn page(mut self, page: usize) -> Self {
        self.page = page;
        self
    }

    #[must_use]
    pub const fn size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    #[must_use]
    pub fn sort(mut self, clause: impl Into<String>) -> Self {
        self.sort.push(clause.into());
        self
    }
}

/// One page of stored records plus the collection's total.
#[derive(Debug, Clone, PartialEq)]
pub struct ListResult {
    pub items: Vec<Value>,
    pub total: usize,
}

/// Storage operations on JSON records, per entity kind.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Returns one sorted page and the total count.
    async fn list(&self, kind: EntityKind, params: &ListParams) -> AppResult<ListResult>;

    /// Fetches a record by identifier.
    async fn get(&self, kind: EntityKind, id: Id) -> AppResult<Option<Value>>;

    /// Returns `true` if a record with this identifier exists.
    async fn exists(&self, kind: EntityKind, id: Id) -> AppResult<bool> {
        Ok(self.get(kind, id).await?.is_some())
    }

    /// Stores a new record under a fresh identifier and returns it.
    async fn insert(&self, kind: EntityKind, record: Value) -> AppResult<Value>;

    /// Replaces a stored record. Returns `None` if it does not exist.
    async fn replace(&self, kind: EntityKind, id: Id, record: Value) -> AppResult<Option<Value>>;

    /// Deletes a record. Returns `false` if it did not exist.
    async fn delete(&self, kind: EntityKind, id: Id) -> AppResult<bool>;
}

#[derive(Debug, Clone)]
struct Table {
    rows: Vec<Value>,
    next_id: Id,
}

impl Table {
    const fn new() -> Self {
        Self {
            rows: Vec::new(),
            next_id: 1,
        }
    }

    fn position(&self, id: Id) -> Option<usize> {
        self.rows.iter().position(|row| row_id(row) == Some(id))
    }
}

fn row_id(row: &Value) -> Option<Id> {
    row.get("id").and_then(Value::as_i64)
}

/// [`RecordStore`] held in memory.
///
/// Clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<HashMap<EntityKind, Table>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records of a kind.
    pub fn count(&self, kind: EntityKind) -> usize {
        let tables = self.tables.read().unwrap_or_else(PoisonError::into_inner);
        tables.get(&kind).map_or(0, |t| t.rows.len())
    }

    /// Every record of a kind, in insertion order.
    pub fn all(&self, kind: EntityKind) -> Vec<Value> {
        let tables = self.tables.read().unwrap_or_else(PoisonError::into_inner);
        tables.get(&kind).map_or_else(Vec::new, |t| t.rows.clone())
    }

    /// Empties every table and restarts identifiers at 1.
    pub fn clear(&self) {
        self.tables
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn list(&self, kind: EntityKind, params: &ListParams) -> AppResult<ListResult> {
        let rows = apply_sort(self.all(kind), &params.sort)?;
        let total = rows.len();
        let size = params.size.max(1);
        let items = rows
            .into_iter()
            .skip(params.page.saturating_mul(size))
            .take(size)
            .collect();
        Ok(ListResult { items, total })
    }

    async fn get(&self, kind: EntityKind, id: Id) -> AppResult<Option<Value>> {
        let tables = self.tables.read().unwrap_or_else(PoisonError::into_inner);
        Ok(tables
            .get(&kind)
            .and_then(|t| t.position(id).map(|i| t.rows[i].clone())))
    }

    async fn insert(&self, kind: EntityKind, mut record: Value) -> AppResult<Value> {
        let Value::Object(fields) = &mut record else {
            return Err(AppError::BadRequest("record must be a JSON object".into()));
        };
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        let table = tables.entry(kind).or_insert_with(Table::new);
        let id = table.next_id;
        table.next_id += 1;
        fields.insert("id".to_string(), Value::from(id));
        table.rows.push(record.clone());
        tracing::debug!(%kind, id, "stored new record");
        Ok(record)
    }

    async fn replace(&self, kind: EntityKind, id: Id, mut record: Value) -> AppResult<Option<Value>> {
        let Value::Object(fields) = &mut record else {
            return Err(AppError::BadRequest("record must be a JSON object".into()));
        };
        fields.insert("id".to_string(), Value::from(id));
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        let Some(table) = tables.get_mut(&kind) else {
            return Ok(None);
        };
        let Some(index) = table.position(id) else {
            return Ok(None);
        };
        table.rows[index] = record.clone();
        Ok(Some(record))
    }

    async fn delete(&self, kind: EntityKind, id: Id) -> AppResult<bool> {
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        let Some(table) = tables.get_mut(&kind) else {
            return Ok(false);
        };
        match table.position(id) {
            Some(index) => {
                table.rows.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Parses `field` or `field,asc|desc` into the field and whether it is
/// descending.
fn parse_sort_clause(clause: &str) -> AppResult<(&str, bool)> {
    let mut parts = clause.split(',').map(str::trim);
    let field = parts.next().filter(|f| !f.is_empty()).ok_or_else(|| {
        AppError::BadRequest(format!("invalid sort clause '{clause}'"))
    })?;
    let descending = match parts.next().map(str::to_ascii_lowercase).as_deref() {
        None | Some("asc") => false,
        Some("desc") => true,
        Some(other) => {
            return Err(AppError::BadRequest(format!(
                "invalid sort direction '{other}'"
            )))
        }
    };
    Ok((field, descending))
}

/// Sorts rows by the given clauses; rows keep insertion order otherwise.
fn apply_sort(mut rows: Vec<Value>, clauses: &[String]) -> AppResult<Vec<Value>> {
    let keys = clauses
        .iter()
        .map(|c| parse_sort_clause(c))
        .collect::<AppResult<Vec<_>>>()?;
    if keys.is_empty() {
        return Ok(rows);
    }
    rows.sort_by(|a, b| {
        keys.iter()
            .map(|(field, descending)| {
                let cmp = compare_json_values(a.get(*field), b.get(*field));
                if *descending {
                    cmp.reverse()
                } else {
                    cmp
                }
            })
            .find(|c| c.is_ne())
            .unwrap_or(Ordering::Equal)
    });
    Ok(rows)
}

/// Orders missing and null before any value; strings, numbers and booleans
/// compare naturally; nested objects compare by their `id`.
fn compare_json_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => {
            if let (Some(x), Some(y)) = (a.as_str(), b.as_str()) {
                x.cmp(y)
            } else if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
                x.cmp(&y)
            } else if let (Some(x), Some(y)) = (a.as_f64(), b.as_f64()) {
                x.partial_cmp(&y).unwrap_or(Ordering::Equal)
            } else if let (Some(x), Some(y)) = (a.as_bool(), b.as_bool()) {
                x.cmp(&y)
            } else if a.is_object() && b.is_object() {
                compare_json_values(a.get("id"), b.get("id"))
            } else {
                a.to_string().cmp(&b.to_string())
            }
        }
    }
}
