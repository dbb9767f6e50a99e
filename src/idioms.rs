//! Idiom records and the dataset they are drawn from.
//!
//! The host may hand us a JSON document (`{"idioms": [{"idiom": .., "pinyin": ..}]}`
//! or a bare array of records). Anything unusable falls back to the bundled list so a
//! level can always be built.

use std::collections::HashSet;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::IdiomDataError;

/// Full idiom list shipped with the crate.
const BUNDLED_JSON: &str = include_str!("../data/idioms.json");

/// Last-resort list used if the bundled JSON ever fails to decode.
pub const DEFAULT_IDIOMS: &[(&str, &str)] = &[
    ("一心一意", "yi xin yi yi"),
    ("三心二意", "san xin er yi"),
    ("四面八方", "si mian ba fang"),
    ("五光十色", "wu guang shi se"),
    ("六神无主", "liu shen wu zhu"),
    ("七上八下", "qi shang ba xia"),
    ("八仙过海", "ba xian guo hai"),
    ("守株待兔", "shou zhu dai tu"),
    ("愚公移山", "yu gong yi shan"),
];

/// One target idiom. Pinyin is display-only; matching uses `idiom`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdiomRecord {
    pub idiom: String,
    #[serde(default)]
    pub pinyin: String,
}

impl IdiomRecord {
    pub fn new(idiom: impl Into<String>, pinyin: impl Into<String>) -> Self {
        Self {
            idiom: idiom.into(),
            pinyin: pinyin.into(),
        }
    }

    pub fn characters(&self) -> Vec<char> {
        self.idiom.chars().collect()
    }

    pub fn len(&self) -> usize {
        self.idiom.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.idiom.is_empty()
    }
}

impl AsRef<str> for IdiomRecord {
    fn as_ref(&self) -> &str {
        &self.idiom
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DataFile {
    Wrapped { idioms: Vec<IdiomRecord> },
    Bare(Vec<IdiomRecord>),
}

/// Characters per idiom. Level sizes assume every target fills four tiles.
pub const IDIOM_LEN: usize = 4;

/// Deduplicated, validated idiom list.
#[derive(Clone, Debug, Default)]
pub struct IdiomLibrary {
    records: Vec<IdiomRecord>,
}

impl IdiomLibrary {
    /// Build from records, dropping anything that is not exactly [`IDIOM_LEN`]
    /// non-space characters and exact duplicates (first wins).
    pub fn from_records(records: impl IntoIterator<Item = IdiomRecord>) -> Self {
        let mut seen = HashSet::new();
        let mut kept = Vec::new();
        for mut rec in records {
            rec.idiom = rec.idiom.trim().to_string();
            if rec.idiom.chars().count() != IDIOM_LEN || rec.idiom.chars().any(char::is_whitespace) {
                log::warn!("skipping malformed idiom record {:?}", rec.idiom);
                continue;
            }
            if seen.insert(rec.idiom.clone()) {
                kept.push(rec);
            }
        }
        Self { records: kept }
    }

    pub fn from_json(text: &str) -> Result<Self, IdiomDataError> {
        let records = match serde_json::from_str::<DataFile>(text)? {
            DataFile::Wrapped { idioms } => idioms,
            DataFile::Bare(idioms) => idioms,
        };
        let lib = Self::from_records(records);
        if lib.is_empty() {
            return Err(IdiomDataError::Empty);
        }
        Ok(lib)
    }

    /// The list compiled into the crate.
    pub fn bundled() -> Self {
        match Self::from_json(BUNDLED_JSON) {
            Ok(lib) => lib,
            Err(err) => {
                log::warn!("bundled idiom data unreadable ({err}); using default list");
                Self::defaults()
            }
        }
    }

    pub fn defaults() -> Self {
        Self::from_records(
            DEFAULT_IDIOMS
                .iter()
                .map(|(idiom, pinyin)| IdiomRecord::new(*idiom, *pinyin)),
        )
    }

    /// Parse host data if present, otherwise (or on any failure) use the bundled list.
    pub fn load_or_bundled(text: Option<&str>) -> Self {
        match text.map(Self::from_json) {
            Some(Ok(lib)) => {
                log::info!("loaded {} idioms from host data", lib.len());
                lib
            }
            Some(Err(err)) => {
                log::warn!("idiom data load failed ({err}); falling back to bundled list");
                Self::bundled()
            }
            None => Self::bundled(),
        }
    }

    pub fn records(&self) -> &[IdiomRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Draw up to `count` records at distinct indices, in draw order.
    pub fn sample<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Vec<IdiomRecord> {
        let amount = count.min(self.records.len());
        rand::seq::index::sample(rng, self.records.len(), amount)
            .into_iter()
            .map(|i| self.records[i].clone())
            .collect()
    }
}
