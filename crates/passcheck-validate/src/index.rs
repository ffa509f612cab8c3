//! Keyed views over requirement rows and configuration records.

use std::collections::HashMap;
use std::hash::Hash;

use tracing::debug;

use passcheck_model::{RequirementRow, Scalar, parse_int};

/// What a key function makes of one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOf<K> {
    Key(K),
    /// No key at all: skipped by flat indices, a continuation row for grouped ones.
    Blank,
    /// A key that cannot be read; the record is excluded and listed as rejected.
    Malformed(String),
}

/// Insertion-ordered map with last-write-wins duplicate handling.
///
/// A repeated key replaces the earlier record in place, so iteration order
/// stays that of first appearance.
#[derive(Debug, Clone)]
pub struct Index<K, V> {
    entries: Vec<(K, V)>,
    positions: HashMap<K, usize>,
    rejected: Vec<String>,
    duplicates: Vec<K>,
}

impl<K, V> Default for Index<K, V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            positions: HashMap::new(),
            rejected: Vec::new(),
            duplicates: Vec::new(),
        }
    }
}

impl<K: Eq + Hash + Clone, V> Index<K, V> {
    pub fn build<I, F>(items: I, mut key_fn: F) -> Self
    where
        I: IntoIterator<Item = V>,
        F: FnMut(&V) -> KeyOf<K>,
    {
        let mut index = Self::default();
        for item in items {
            match key_fn(&item) {
                KeyOf::Key(key) => index.insert(key, item),
                KeyOf::Blank => {}
                KeyOf::Malformed(raw) => index.rejected.push(raw),
            }
        }
        debug!(
            entries = index.entries.len(),
            rejected = index.rejected.len(),
            duplicates = index.duplicates.len(),
            "built index"
        );
        index
    }

    fn insert(&mut self, key: K, value: V) {
        match self.positions.get(&key) {
            Some(&position) => {
                self.entries[position].1 = value;
                self.duplicates.push(key);
            }
            None => {
                self.positions.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
            }
        }
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.positions
            .get(key)
            .map(|&position| &self.entries[position].1)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.positions.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.iter().map(|(key, _)| key)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter().map(|(key, value)| (key, value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Raw keys that could not be read.
    pub fn rejected(&self) -> &[String] {
        &self.rejected
    }

    /// Keys seen more than once, one element per overwrite.
    pub fn duplicates(&self) -> &[K] {
        &self.duplicates
    }
}

/// Rows grouped under keyed header rows.
#[derive(Debug, Clone)]
pub struct Grouped<K, V> {
    pub groups: Index<K, Vec<V>>,
    /// Continuation rows that appeared before any keyed row.
    pub orphans: Vec<V>,
}

impl<K: Eq + Hash + Clone, V> Index<K, Vec<V>> {
    /// Group continuation rows (blank key) under the last keyed row.
    ///
    /// A repeated key starts a fresh group that replaces the earlier one.
    /// Rows following a malformed key are dropped with it.
    pub fn grouped<I, F>(rows: I, mut key_fn: F) -> Grouped<K, V>
    where
        I: IntoIterator<Item = V>,
        F: FnMut(&V) -> KeyOf<K>,
    {
        let mut pending: Vec<(KeyOf<K>, Vec<V>)> = Vec::new();
        let mut orphans = Vec::new();
        for row in rows {
            match key_fn(&row) {
                KeyOf::Blank => match pending.last_mut() {
                    Some((_, group)) => group.push(row),
                    None => orphans.push(row),
                },
                key => pending.push((key, vec![row])),
            }
        }
        let groups = Index::build(pending, |(key, _)| key.clone()).map_values(|(_, rows)| rows);
        Grouped { groups, orphans }
    }

    /// Group rows by a key column; rows with a blank key are skipped.
    pub fn group_by<I, F>(rows: I, mut key_fn: F) -> Self
    where
        I: IntoIterator<Item = V>,
        F: FnMut(&V) -> KeyOf<K>,
    {
        let mut index: Index<K, Vec<V>> = Index::default();
        for row in rows {
            match key_fn(&row) {
                KeyOf::Key(key) => match index.positions.get(&key) {
                    Some(&position) => index.entries[position].1.push(row),
                    None => index.insert(key, vec![row]),
                },
                KeyOf::Blank => {}
                KeyOf::Malformed(raw) => index.rejected.push(raw),
            }
        }
        index
    }
}

impl<K, V> Index<K, V> {
    fn map_values<W>(self, mut f: impl FnMut(V) -> W) -> Index<K, W> {
        Index {
            entries: self
                .entries
                .into_iter()
                .map(|(key, value)| (key, f(value)))
                .collect(),
            positions: self.positions,
            rejected: self.rejected,
            duplicates: self.duplicates,
        }
    }
}

/// Integer key from a requirement cell.
pub fn int_column(row: &RequirementRow, column: &str) -> KeyOf<i64> {
    match row.value(column) {
        None => KeyOf::Blank,
        Some(raw) => match parse_int(raw) {
            Ok(id) => KeyOf::Key(id),
            Err(_) => KeyOf::Malformed(raw.to_string()),
        },
    }
}

/// String key from a requirement cell.
pub fn text_column(row: &RequirementRow, column: &str) -> KeyOf<String> {
    match row.value(column) {
        None => KeyOf::Blank,
        Some(raw) => KeyOf::Key(raw.to_string()),
    }
}

/// Integer key from a JSON id.
pub fn scalar_id(id: Option<&Scalar>) -> KeyOf<i64> {
    match id {
        None => KeyOf::Blank,
        Some(value) if value.is_blank() => KeyOf::Blank,
        Some(value) => match value.as_i64() {
            Some(id) => KeyOf::Key(id),
            None => KeyOf::Malformed(value.to_string()),
        },
    }
}
