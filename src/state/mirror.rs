//! Generic in-memory mirror of a persisted record set.
//!
//! A `Mirror` is an insertion-ordered list of owned records with
//! case-insensitive unique keys. It is hydrated once from the store and then
//! mutated in place by the dispatcher, which persists every change itself.

/// A record that can live in a [`Mirror`].
pub trait MirrorRecord {
    /// The record's unique key, already normalized.
    fn key(&self) -> &str;

    /// Rewrite the record's key in place.
    fn set_key(&mut self, key: String);

    /// A record with default attributes for `key`.
    fn with_key(key: String) -> Self;
}

/// Normalize a key for comparison and storage.
pub fn normalize_key(key: &str) -> String {
    key.to_lowercase()
}

/// Insertion-ordered, single-writer cache of records.
#[derive(Debug)]
pub struct Mirror<R> {
    records: Vec<R>,
}

impl<R> Default for Mirror<R> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
        }
    }
}

impl<R: MirrorRecord> Mirror<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the mirror's contents wholesale.
    pub fn load_all(&mut self, records: Vec<R>) {
        self.records = records;
    }

    fn position(&self, normalized: &str) -> Option<usize> {
        self.records.iter().position(|r| r.key() == normalized)
    }

    /// Find a record without creating it.
    pub fn lookup(&self, key: &str) -> Option<&R> {
        let key = normalize_key(key);
        self.position(&key).map(|idx| &self.records[idx])
    }

    /// Find a record, appending a default one if it doesn't exist.
    ///
    /// The boolean is `true` when the record was created by this call.
    pub fn get_or_create(&mut self, key: &str) -> (&mut R, bool) {
        let key = normalize_key(key);
        match self.position(&key) {
            Some(idx) => (&mut self.records[idx], false),
            None => {
                self.records.push(R::with_key(key));
                let idx = self.records.len() - 1;
                (&mut self.records[idx], true)
            }
        }
    }

    /// Remove a record by key.
    pub fn remove(&mut self, key: &str) -> Option<R> {
        let key = normalize_key(key);
        self.position(&key).map(|idx| self.records.remove(idx))
    }

    /// Move the record under `from` to `to`.
    ///
    /// A record already stored under `to` is dropped, not merged. If `from`
    /// doesn't exist it is created with default attributes first.
    pub fn rename(&mut self, from: &str, to: &str) -> &mut R {
        let from = normalize_key(from);
        let to = normalize_key(to);

        if from != to
            && let Some(idx) = self.position(&to)
        {
            self.records.remove(idx);
        }

        let (record, _) = self.get_or_create(&from);
        record.set_key(to);
        record
    }

    pub fn iter(&self) -> impl Iterator<Item = &R> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
