use crate::scoring::EngineKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Info,
    Warning,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Normal,
    High,
    Urgent,
}

/// Clinician-facing alert tagged with the engine that raised it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub title: String,
    pub body: String,
    pub source: EngineKind,
    pub severity: AlertSeverity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub title: String,
    pub body: String,
    pub source: EngineKind,
    pub priority: Priority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

/// Items that deduplicate on their `{title, source}` pair.
pub trait Mergeable {
    fn merge_key(&self) -> (&str, EngineKind);
}

impl Mergeable for Alert {
    fn merge_key(&self) -> (&str, EngineKind) {
        (&self.title, self.source)
    }
}

impl Mergeable for Recommendation {
    fn merge_key(&self) -> (&str, EngineKind) {
        (&self.title, self.source)
    }
}

/// Concatenate lists in order, keeping the first occurrence of every key.
pub fn merge_deduplicated<'a, T, I>(lists: I) -> Vec<T>
where
    T: Mergeable + Clone + 'a,
    I: IntoIterator<Item = &'a [T]>,
{
    let mut seen: BTreeSet<(String, EngineKind)> = BTreeSet::new();
    let mut merged = Vec::new();

    for list in lists {
        for item in list {
            let (title, source) = item.merge_key();
            if seen.insert((title.to_string(), source)) {
                merged.push(item.clone());
            }
        }
    }

    merged
}
