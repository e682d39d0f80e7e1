//! Filter evaluation, update application, projection and sorting over
//! in-memory documents.
//!
//! Field names may be dotted paths (`"address.city"`). Comparisons between
//! values of different types never match, so `{"age": "7"}` does not select
//! a document whose `age` is the number `7`.

use std::cmp::Ordering;

use serde_json::{Map, Value};

use docstore_core::error::AppError;
use docstore_core::result::AppResult;
use docstore_core::types::{Document, FilterOp, ID_FIELD, SortDirection, SortField, UpdateOp};

/// Returns whether `document` satisfies `filter`. An empty filter matches
/// everything.
pub fn matches(document: &Document, filter: &Document) -> AppResult<bool> {
    for (key, condition) in filter {
        let satisfied = match key.as_str() {
            "$and" => all_clauses(document, condition)?.iter().all(|hit| *hit),
            "$or" => all_clauses(document, condition)?.iter().any(|hit| *hit),
            op if op.starts_with('$') => {
                return Err(AppError::validation(format!(
                    "Unsupported top-level filter operator '{op}'"
                )));
            }
            path => matches_field(lookup(document, path), condition)?,
        };
        if !satisfied {
            return Ok(false);
        }
    }
    Ok(true)
}

fn all_clauses(document: &Document, clauses: &Value) -> AppResult<Vec<bool>> {
    let Value::Array(clauses) = clauses else {
        return Err(AppError::validation("$and/$or expects an array of filters"));
    };
    clauses
        .iter()
        .map(|clause| match clause {
            Value::Object(clause) => matches(document, clause),
            _ => Err(AppError::validation("$and/$or clauses must be documents")),
        })
        .collect()
}

fn matches_field(actual: Option<&Value>, condition: &Value) -> AppResult<bool> {
    match condition {
        Value::Object(ops) if is_operator_document(ops) => {
            for (keyword, operand) in ops {
                let op = FilterOp::parse(keyword).ok_or_else(|| {
                    AppError::validation(format!("Unsupported filter operator '{keyword}'"))
                })?;
                if !apply_filter_op(op, actual, operand)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        expected => Ok(equals(actual, expected)),
    }
}

fn is_operator_document(ops: &Map<String, Value>) -> bool {
    !ops.is_empty() && ops.keys().all(|k| k.starts_with('$'))
}

fn apply_filter_op(op: FilterOp, actual: Option<&Value>, operand: &Value) -> AppResult<bool> {
    Ok(match op {
        FilterOp::Eq => equals(actual, operand),
        FilterOp::Ne => !equals(actual, operand),
        FilterOp::Gt => compare(actual, operand).is_some_and(Ordering::is_gt),
        FilterOp::Gte => compare(actual, operand).is_some_and(Ordering::is_ge),
        FilterOp::Lt => compare(actual, operand).is_some_and(Ordering::is_lt),
        FilterOp::Lte => compare(actual, operand).is_some_and(Ordering::is_le),
        FilterOp::In => list_operand(op, operand)?
            .iter()
            .any(|candidate| equals(actual, candidate)),
        FilterOp::Nin => !list_operand(op, operand)?
            .iter()
            .any(|candidate| equals(actual, candidate)),
        FilterOp::Exists => {
            let wanted = operand.as_bool().unwrap_or(true);
            actual.is_some() == wanted
        }
    })
}

fn list_operand(op: FilterOp, operand: &Value) -> AppResult<&Vec<Value>> {
    operand
        .as_array()
        .ok_or_else(|| AppError::validation(format!("{op} expects an array")))
}

/// Equality with array-element semantics: an array field matches a scalar
/// it contains. A missing field equals `null`.
fn equals(actual: Option<&Value>, expected: &Value) -> bool {
    match actual {
        None => expected.is_null(),
        Some(Value::Array(items)) if !expected.is_array() => {
            items.iter().any(|item| same_value(item, expected))
        }
        Some(value) => same_value(value, expected),
    }
}

fn same_value(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

fn compare(actual: Option<&Value>, operand: &Value) -> Option<Ordering> {
    match (actual?, operand) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

/// Resolves a dotted path inside a document.
pub fn lookup<'d>(document: &'d Document, path: &str) -> Option<&'d Value> {
    let mut segments = path.split('.');
    let mut current = document.get(segments.next()?)?;
    for segment in segments {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Applies an operator update to `document`. Returns whether anything
/// changed.
pub fn apply_update(document: &mut Document, update: &Document) -> AppResult<bool> {
    if update.is_empty() {
        return Err(AppError::validation("Update document must not be empty"));
    }

    let mut changed = false;
    for (keyword, fields) in update {
        let op = UpdateOp::parse(keyword).ok_or_else(|| {
            AppError::validation(format!(
                "Update document may only contain operators, found '{keyword}'"
            ))
        })?;
        let Value::Object(fields) = fields else {
            return Err(AppError::validation(format!("{op} expects a document")));
        };

        for (path, value) in fields {
            if path == ID_FIELD {
                if op == UpdateOp::Set && document.get(ID_FIELD) == Some(value) {
                    continue;
                }
                return Err(AppError::validation(
                    "Performing an update on '_id' would modify an immutable field",
                ));
            }
            changed |= match op {
                UpdateOp::Set => set_path(document, path, value.clone())?,
                UpdateOp::Unset => unset_path(document, path),
                UpdateOp::Inc => inc_path(document, path, value)?,
            };
        }
    }
    Ok(changed)
}

fn set_path(document: &mut Document, path: &str, value: Value) -> AppResult<bool> {
    let (parent, leaf) = parent_mut(document, path)?;
    if parent.get(leaf) == Some(&value) {
        return Ok(false);
    }
    parent.insert(leaf.to_string(), value);
    Ok(true)
}

fn unset_path(document: &mut Document, path: &str) -> bool {
    let mut segments: Vec<&str> = path.split('.').collect();
    let Some(leaf) = segments.pop() else {
        return false;
    };
    let mut current = document;
    for segment in segments {
        match current.get_mut(segment) {
            Some(Value::Object(map)) => current = map,
            _ => return false,
        }
    }
    current.remove(leaf).is_some()
}

fn inc_path(document: &mut Document, path: &str, delta: &Value) -> AppResult<bool> {
    let Value::Number(delta) = delta else {
        return Err(AppError::validation(format!(
            "$inc on '{path}' expects a number"
        )));
    };
    let (parent, leaf) = parent_mut(document, path)?;
    let next = match parent.get(leaf) {
        None | Some(Value::Null) => Value::Number(delta.clone()),
        Some(Value::Number(current)) => add_numbers(current, delta),
        Some(_) => {
            return Err(AppError::validation(format!(
                "Cannot apply $inc to non-numeric field '{path}'"
            )));
        }
    };
    parent.insert(leaf.to_string(), next);
    Ok(true)
}

fn add_numbers(a: &serde_json::Number, b: &serde_json::Number) -> Value {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        if let Some(sum) = x.checked_add(y) {
            return Value::from(sum);
        }
    }
    let sum = a.as_f64().unwrap_or(0.0) + b.as_f64().unwrap_or(0.0);
    serde_json::Number::from_f64(sum)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

/// Walks to the parent object of `path`, creating intermediate documents.
fn parent_mut<'d, 'p>(
    document: &'d mut Document,
    path: &'p str,
) -> AppResult<(&'d mut Document, &'p str)> {
    let mut segments: Vec<&str> = path.split('.').collect();
    let leaf = match segments.pop() {
        Some(leaf) if !leaf.is_empty() => leaf,
        _ => return Err(AppError::validation("Update field path must not be empty")),
    };

    let mut current = document;
    for segment in segments {
        let entry = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        current = match entry {
            Value::Object(map) => map,
            _ => {
                return Err(AppError::validation(format!(
                    "Cannot create field '{path}': '{segment}' is not a document"
                )));
            }
        };
    }
    Ok((current, leaf))
}

/// Applies an inclusion or exclusion projection. `_id` is kept unless
/// explicitly excluded.
pub fn project(document: &Document, projection: &Document) -> AppResult<Document> {
    if projection.is_empty() {
        return Ok(document.clone());
    }

    let flag = |value: &Value| match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        _ => true,
    };
    let include_id = projection.get(ID_FIELD).is_none_or(flag);
    let fields: Vec<(&String, bool)> = projection
        .iter()
        .filter(|(key, _)| key.as_str() != ID_FIELD)
        .map(|(key, value)| (key, flag(value)))
        .collect();

    let inclusive = fields.iter().any(|(_, on)| *on);
    if inclusive && fields.iter().any(|(_, on)| !*on) {
        return Err(AppError::validation(
            "Projection cannot mix inclusion and exclusion",
        ));
    }

    let mut projected = if inclusive {
        let mut out = Document::new();
        for (key, _) in &fields {
            if let Some(value) = document.get(key.as_str()) {
                out.insert((*key).clone(), value.clone());
            }
        }
        if let Some(id) = document.get(ID_FIELD) {
            out.insert(ID_FIELD.to_string(), id.clone());
        }
        out
    } else {
        let mut out = document.clone();
        for (key, _) in &fields {
            out.remove(key.as_str());
        }
        out
    };

    if !include_id {
        projected.remove(ID_FIELD);
    }
    Ok(projected)
}

/// Sorts documents in place by the given keys. Missing fields sort first.
pub fn sort_documents(documents: &mut [Document], sort: &[SortField]) {
    if sort.is_empty() {
        return;
    }
    documents.sort_by(|a, b| {
        for key in sort {
            let ordering = order_values(lookup(a, &key.field), lookup(b, &key.field));
            let ordering = match key.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
}

fn type_rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Number(_)) => 1,
        Some(Value::String(_)) => 2,
        Some(Value::Object(_)) => 3,
        Some(Value::Array(_)) => 4,
        Some(Value::Bool(_)) => 5,
    }
}

fn order_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    type_rank(a)
        .cmp(&type_rank(b))
        .then_with(|| compare(a, b.unwrap_or(&Value::Null)).unwrap_or(Ordering::Equal))
}
