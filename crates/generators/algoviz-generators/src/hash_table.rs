//! Hash table with open addressing (linear or quadratic probing) or
//! separate chaining.
//!
//! The hash is `key mod capacity`, using the Euclidean remainder so negative
//! keys land in range. Deleting from an open-addressing table leaves a
//! tombstone so later probes keep walking past the hole.

use algoviz_player_core::{FrameRecorder, FrameSequence};
use serde::{Deserialize, Serialize};

use crate::error::GenerateError;
use crate::limits::GeneratorLimits;
use crate::Result;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Linear,
    Quadratic,
    Chaining,
}

impl Strategy {
    fn open_addressing(self) -> bool {
        !matches!(self, Self::Chaining)
    }

    /// Offset of the `i`th probe from the home bucket.
    fn offset(self, i: usize) -> usize {
        match self {
            Self::Linear | Self::Chaining => i,
            Self::Quadratic => i * i,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    /// At most one entry under open addressing; the chain otherwise.
    pub entries: Vec<i64>,
    pub tombstone: bool,
}

impl Bucket {
    fn is_free(&self) -> bool {
        self.entries.is_empty() && !self.tombstone
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashTable {
    pub strategy: Strategy,
    pub buckets: Vec<Bucket>,
}

impl HashTable {
    pub fn new(capacity: usize, strategy: Strategy) -> Result<Self> {
        let max = GeneratorLimits::default().max_hash_capacity;
        if !(1..=max).contains(&capacity) {
            return Err(GenerateError::out_of_range(
                "capacity",
                capacity as i64,
                1,
                max as i64,
            ));
        }
        Ok(Self {
            strategy,
            buckets: vec![Bucket::default(); capacity],
        })
    }

    /// Table holding `keys`, inserted in order.
    pub fn from_keys(capacity: usize, strategy: Strategy, keys: &[i64]) -> Result<Self> {
        GeneratorLimits::default().check_values("keys", keys)?;
        let mut trace = HashTrace::silent(Self::new(capacity, strategy)?);
        for &k in keys {
            match trace.insert(k) {
                Outcome::Inserted => {}
                Outcome::Duplicate => {
                    return Err(GenerateError::malformed(format!(
                        "key {k} appears more than once"
                    )))
                }
                _ => {
                    return Err(GenerateError::malformed(format!(
                        "no free bucket for key {k}"
                    )))
                }
            }
        }
        Ok(trace.s.table)
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    pub fn len(&self) -> usize {
        self.buckets.iter().map(|b| b.entries.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, key: i64) -> bool {
        self.buckets.iter().any(|b| b.entries.contains(&key))
    }

    #[inline]
    pub fn hash(&self, key: i64) -> usize {
        key.rem_euclid(self.capacity().max(1) as i64) as usize
    }

    /// Tables built outside `new` (deserialized, or assembled by hand) must
    /// still have a legal capacity and one entry per open-addressing bucket.
    pub fn validate(&self) -> Result<()> {
        let limits = GeneratorLimits::default();
        let max = limits.max_hash_capacity;
        if !(1..=max).contains(&self.capacity()) {
            return Err(GenerateError::out_of_range(
                "capacity",
                self.capacity() as i64,
                1,
                max as i64,
            ));
        }
        for (b, bucket) in self.buckets.iter().enumerate() {
            if self.strategy.open_addressing() && bucket.entries.len() > 1 {
                return Err(GenerateError::malformed(format!(
                    "bucket {b} holds {} entries under open addressing",
                    bucket.entries.len()
                )));
            }
            limits.check_values("bucket entries", &bucket.entries)?;
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Inserted,
    Duplicate,
    Found,
    NotFound,
    Deleted,
    Full,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashSnapshot {
    pub table: HashTable,
    pub key: i64,
    /// Home bucket, once computed.
    pub hash: Option<usize>,
    /// Bucket being inspected.
    pub probe: Option<usize>,
    pub probes: usize,
    pub outcome: Option<Outcome>,
}

struct HashTrace {
    s: HashSnapshot,
    rec: Option<FrameRecorder<HashSnapshot>>,
}

impl HashTrace {
    fn silent(table: HashTable) -> Self {
        Self {
            s: HashSnapshot {
                table,
                key: 0,
                hash: None,
                probe: None,
                probes: 0,
                outcome: None,
            },
            rec: None,
        }
    }

    fn recording(table: &HashTable, key: i64) -> Self {
        let mut t = Self::silent(table.clone());
        t.s.key = key;
        t.rec = Some(FrameRecorder::new());
        t
    }

    fn record(&mut self, desc: impl Into<String>) {
        if let Some(rec) = self.rec.as_mut() {
            rec.record(&self.s, desc);
        }
    }

    fn home(&mut self, key: i64) -> usize {
        self.s.key = key;
        self.s.probes = 0;
        self.s.outcome = None;
        let cap = self.s.table.capacity();
        let h = self.s.table.hash(key);
        self.s.hash = Some(h);
        self.s.probe = None;
        self.record(format!("hash({key}) = {key} mod {cap} = {h}"));
        h
    }

    fn probe(&mut self, bucket: usize, desc: impl Into<String>) {
        self.s.probe = Some(bucket);
        self.s.probes += 1;
        self.record(desc);
    }

    fn done(&mut self, outcome: Outcome, desc: impl Into<String>) -> Outcome {
        self.s.outcome = Some(outcome);
        self.record(desc);
        outcome
    }

    /// Buckets visited by an open-addressing probe from `home`.
    fn sequence(&self, home: usize) -> impl Iterator<Item = usize> {
        let cap = self.s.table.capacity();
        let strategy = self.s.table.strategy;
        (0..cap).map(move |i| (home + strategy.offset(i)) % cap)
    }

    fn insert(&mut self, key: i64) -> Outcome {
        let h = self.home(key);
        if !self.s.table.strategy.open_addressing() {
            for (i, &k) in self.s.table.buckets[h].entries.clone().iter().enumerate() {
                if k == key {
                    self.probe(h, format!("Chain entry {i} is {key}"));
                    return self.done(Outcome::Duplicate, format!("{key} is already present"));
                }
                self.probe(h, format!("Chain entry {i} is {k}, not {key}"));
            }
            self.s.table.buckets[h].entries.push(key);
            self.s.probe = Some(h);
            return self.done(Outcome::Inserted, format!("Append {key} to chain {h}"));
        }

        let mut reuse = None;
        let order: Vec<usize> = self.sequence(h).collect();
        for b in order {
            let bucket = &self.s.table.buckets[b];
            if bucket.entries.first() == Some(&key) {
                self.probe(b, format!("Bucket {b} holds {key}"));
                return self.done(Outcome::Duplicate, format!("{key} is already present"));
            }
            if bucket.is_free() {
                self.probe(b, format!("Bucket {b} is empty"));
                let at = reuse.unwrap_or(b);
                return self.place(at, key);
            }
            if bucket.tombstone {
                self.probe(b, format!("Bucket {b} is a tombstone: remember it"));
                reuse.get_or_insert(b);
            } else {
                let other = bucket.entries[0];
                self.probe(b, format!("Bucket {b} holds {other}: collision"));
            }
        }
        match reuse {
            Some(at) => self.place(at, key),
            None => {
                self.s.probe = None;
                self.done(Outcome::Full, format!("Table is full: no bucket for {key}"))
            }
        }
    }

    fn place(&mut self, at: usize, key: i64) -> Outcome {
        let bucket = &mut self.s.table.buckets[at];
        bucket.entries = vec![key];
        bucket.tombstone = false;
        self.s.probe = Some(at);
        self.done(Outcome::Inserted, format!("Store {key} in bucket {at}"))
    }

    /// Bucket (and chain position) holding `key`, narrating the probe.
    fn find(&mut self, key: i64) -> Option<(usize, usize)> {
        let h = self.home(key);
        if !self.s.table.strategy.open_addressing() {
            for (i, &k) in self.s.table.buckets[h].entries.clone().iter().enumerate() {
                if k == key {
                    self.probe(h, format!("Chain entry {i} is {key}"));
                    return Some((h, i));
                }
                self.probe(h, format!("Chain entry {i} is {k}, not {key}"));
            }
            if self.s.table.buckets[h].entries.is_empty() {
                self.probe(h, format!("Chain {h} is empty"));
            }
            return None;
        }
        let order: Vec<usize> = self.sequence(h).collect();
        for b in order {
            let bucket = &self.s.table.buckets[b];
            if bucket.entries.first() == Some(&key) {
                self.probe(b, format!("Bucket {b} holds {key}"));
                return Some((b, 0));
            }
            if bucket.is_free() {
                self.probe(b, format!("Bucket {b} is empty: stop"));
                return None;
            }
            let what = if bucket.tombstone {
                "a tombstone".to_string()
            } else {
                bucket.entries[0].to_string()
            };
            self.probe(b, format!("Bucket {b} holds {what}: keep probing"));
        }
        None
    }
}

fn check_key(key: i64) -> Result<()> {
    GeneratorLimits::default().check_value("key", key)
}

pub fn hash_insert(table: &HashTable, key: i64) -> Result<FrameSequence<HashSnapshot>> {
    check_key(key)?;
    table.validate()?;
    let mut t = HashTrace::recording(table, key);
    t.record(format!("Insert {key}"));
    t.insert(key);
    Ok(t.rec.take().map(FrameRecorder::finish).unwrap_or_default())
}

pub fn hash_search(table: &HashTable, key: i64) -> Result<FrameSequence<HashSnapshot>> {
    check_key(key)?;
    table.validate()?;
    let mut t = HashTrace::recording(table, key);
    t.record(format!("Search for {key}"));
    match t.find(key) {
        Some((b, _)) => {
            t.done(Outcome::Found, format!("Found {key} in bucket {b}"));
        }
        None => {
            t.s.probe = None;
            t.done(Outcome::NotFound, format!("{key} is not in the table"));
        }
    }
    Ok(t.rec.take().map(FrameRecorder::finish).unwrap_or_default())
}

pub fn hash_delete(table: &HashTable, key: i64) -> Result<FrameSequence<HashSnapshot>> {
    check_key(key)?;
    table.validate()?;
    let mut t = HashTrace::recording(table, key);
    t.record(format!("Delete {key}"));
    match t.find(key) {
        Some((b, i)) => {
            let open = t.s.table.strategy.open_addressing();
            let bucket = &mut t.s.table.buckets[b];
            bucket.entries.remove(i);
            if open {
                bucket.tombstone = true;
                t.done(Outcome::Deleted, format!("Remove {key}, leaving a tombstone in bucket {b}"));
            } else {
                t.done(Outcome::Deleted, format!("Unlink {key} from chain {b}"));
            }
        }
        None => {
            t.s.probe = None;
            t.done(Outcome::NotFound, format!("{key} is not in the table"));
        }
    }
    Ok(t.rec.take().map(FrameRecorder::finish).unwrap_or_default())
}
