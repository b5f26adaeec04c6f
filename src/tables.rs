//! Lookup tables shipped next to the rules.
//!
//! Tables are small comma-separated files loaded on first use and cached per
//! [`TableCache`]; nothing here is shared between threads.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::parse::parse_csv_record;
use crate::types::{TableError, Value};

pub const RELATING_ATTRIBUTES: &str = "relating_entity_attributes.csv";
pub const RELATED_ATTRIBUTES: &str = "related_entity_attributes.csv";

/// Parsed, non-blank records of a table file with their 1-based line numbers.
fn read_records(path: &Path) -> Result<Vec<(usize, Vec<String>)>, TableError> {
    let text = std::fs::read_to_string(path).map_err(|source| TableError::Io {
        path: path.to_owned(),
        source,
    })?;
    let mut records = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let line = line.trim_start_matches('\u{feff}');
        if line.trim().is_empty() {
            continue;
        }
        let record = parse_csv_record(line).map_err(|e| TableError::Malformed {
            path: path.to_owned(),
            line: index + 1,
            message: e.message().to_owned(),
        })?;
        records.push((index + 1, record));
    }
    Ok(records)
}

/// Header row of relationship types and one row of attribute names.
fn read_role_row(path: &Path) -> Result<Vec<(String, String)>, TableError> {
    let mut records = read_records(path)?.into_iter();
    let Some((_, header)) = records.next() else {
        return Err(TableError::Empty {
            path: path.to_owned(),
        });
    };
    let Some((_, row)) = records.next() else {
        return Err(TableError::ColumnCount {
            path: path.to_owned(),
            expected: header.len(),
            found: 0,
        });
    };
    if row.len() != header.len() {
        return Err(TableError::ColumnCount {
            path: path.to_owned(),
            expected: header.len(),
            found: row.len(),
        });
    }
    Ok(header.into_iter().zip(row).collect())
}

/// The attributes holding each side of a relationship entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipRoles {
    pub relating: String,
    pub related: String,
}

/// Relationship type to role attributes, keyed case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct RelationshipTable {
    roles: HashMap<String, RelationshipRoles>,
}

impl RelationshipTable {
    /// Load `relating_entity_attributes.csv` and `related_entity_attributes.csv`
    /// from `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`TableError`] if either file is missing or malformed.
    pub fn load(dir: &Path) -> Result<Self, TableError> {
        let relating = read_role_row(&dir.join(RELATING_ATTRIBUTES))?;
        let related: HashMap<String, String> = read_role_row(&dir.join(RELATED_ATTRIBUTES))?
            .into_iter()
            .map(|(rel, attr)| (rel.to_ascii_lowercase(), attr))
            .collect();

        let mut roles = HashMap::new();
        for (rel, relating_attr) in relating {
            let key = rel.to_ascii_lowercase();
            match related.get(&key) {
                Some(related_attr) => {
                    roles.insert(
                        key,
                        RelationshipRoles {
                            relating: relating_attr,
                            related: related_attr.clone(),
                        },
                    );
                }
                None => warn!(relationship = %rel, "no related attribute listed; skipping"),
            }
        }
        debug!(count = roles.len(), "loaded relationship roles");
        Ok(Self { roles })
    }

    #[must_use]
    pub fn roles(&self, relationship: &str) -> Option<&RelationshipRoles> {
        self.roles.get(&relationship.to_ascii_lowercase())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.roles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}

/// Applicable entity type to its allowed relationship targets.
///
/// Built from a two-column file whose header names the entity column and the
/// relationship attribute to read; repeated entity rows accumulate.
#[derive(Debug, Clone)]
pub struct AggregationTable {
    entity_column: String,
    attribute: String,
    rows: Vec<(String, Vec<String>)>,
}

impl AggregationTable {
    /// # Errors
    ///
    /// Returns [`TableError`] if the file cannot be read or its header does not
    /// have exactly two columns. Data rows with a different column count are
    /// skipped with a warning.
    pub fn load(path: &Path) -> Result<Self, TableError> {
        let mut records = read_records(path)?.into_iter();
        let Some((_, header)) = records.next() else {
            return Err(TableError::Empty {
                path: path.to_owned(),
            });
        };
        let [entity_column, attribute]: [String; 2] =
            header.try_into().map_err(|h: Vec<String>| TableError::ColumnCount {
                path: path.to_owned(),
                expected: 2,
                found: h.len(),
            })?;

        let mut rows: Vec<(String, Vec<String>)> = Vec::new();
        for (line, record) in records {
            let [entity, target]: [String; 2] = match record.try_into() {
                Ok(pair) => pair,
                Err(other) => {
                    let other: Vec<String> = other;
                    warn!(path = %path.display(), line, columns = other.len(), "skipping malformed row");
                    continue;
                }
            };
            match rows.iter_mut().find(|(e, _)| e.eq_ignore_ascii_case(&entity)) {
                Some((_, targets)) => {
                    if !targets.iter().any(|t| t.eq_ignore_ascii_case(&target)) {
                        targets.push(target);
                    }
                }
                None => rows.push((entity, vec![target])),
            }
        }
        debug!(path = %path.display(), entities = rows.len(), "loaded aggregation table");
        Ok(Self {
            entity_column,
            attribute,
            rows,
        })
    }

    /// Header of the entity column.
    #[must_use]
    pub fn entity_column(&self) -> &str {
        &self.entity_column
    }

    /// Relationship attribute holding the targets, from the second header.
    #[must_use]
    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    /// Applicable entity types in file order.
    pub fn entity_types(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|(e, _)| e.as_str())
    }

    #[must_use]
    pub fn allowed(&self, entity: &str) -> Option<&[String]> {
        self.rows
            .iter()
            .find(|(e, _)| e.eq_ignore_ascii_case(entity))
            .map(|(_, targets)| targets.as_slice())
    }
}

/// A single column of allowed values; the first row is the header.
#[derive(Debug, Clone)]
pub struct ValueList {
    header: String,
    values: Vec<Value>,
}

impl ValueList {
    /// # Errors
    ///
    /// Returns [`TableError`] if the file cannot be read or has no header.
    pub fn load(path: &Path) -> Result<Self, TableError> {
        let mut records = read_records(path)?.into_iter();
        let Some((_, header)) = records.next() else {
            return Err(TableError::Empty {
                path: path.to_owned(),
            });
        };
        let values = records
            .filter_map(|(line, record)| {
                let first = record.into_iter().next();
                if first.is_none() {
                    warn!(path = %path.display(), line, "skipping empty row");
                }
                first
            })
            .map(|cell| cell_value(&cell))
            .collect();
        Ok(Self {
            header: header.into_iter().next().unwrap_or_default(),
            values,
        })
    }

    #[must_use]
    pub fn header(&self) -> &str {
        &self.header
    }

    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

fn cell_value(cell: &str) -> Value {
    if let Ok(i) = cell.parse::<i64>() {
        return Value::Int(i);
    }
    if let Ok(f) = cell.parse::<f64>() {
        if f.is_finite() {
            return Value::Float(f);
        }
    }
    Value::String(cell.to_owned())
}

/// Tables loaded by one engine, keyed by resolved path.
#[derive(Debug)]
pub struct TableCache {
    dir: PathBuf,
    relationships: Option<RelationshipTable>,
    aggregations: HashMap<PathBuf, AggregationTable>,
    value_lists: HashMap<PathBuf, ValueList>,
}

impl TableCache {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            relationships: None,
            aggregations: HashMap::new(),
            value_lists: HashMap::new(),
        }
    }

    /// Resolve a table name against the resource directory; absolute paths are
    /// used as is.
    #[must_use]
    pub fn resolve(&self, name: &str) -> PathBuf {
        let path = Path::new(name);
        if path.is_absolute() {
            path.to_owned()
        } else {
            self.dir.join(path)
        }
    }

    /// # Errors
    ///
    /// See [`RelationshipTable::load`].
    pub fn relationships(&mut self) -> Result<&RelationshipTable, TableError> {
        if self.relationships.is_none() {
            self.relationships = Some(RelationshipTable::load(&self.dir)?);
        }
        Ok(self.relationships.get_or_insert_with(RelationshipTable::default))
    }

    /// # Errors
    ///
    /// See [`AggregationTable::load`].
    pub fn aggregation(&mut self, name: &str) -> Result<&AggregationTable, TableError> {
        let path = self.resolve(name);
        if !self.aggregations.contains_key(&path) {
            let table = AggregationTable::load(&path)?;
            self.aggregations.insert(path.clone(), table);
        }
        self.aggregations
            .get(&path)
            .ok_or(TableError::Empty { path })
    }

    /// # Errors
    ///
    /// See [`ValueList::load`].
    pub fn value_list(&mut self, name: &str) -> Result<&ValueList, TableError> {
        let path = self.resolve(name);
        if !self.value_lists.contains_key(&path) {
            let list = ValueList::load(&path)?;
            self.value_lists.insert(path.clone(), list);
        }
        self.value_lists.get(&path).ok_or(TableError::Empty { path })
    }
}
