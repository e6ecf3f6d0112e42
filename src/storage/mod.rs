//! Key-value persistence for planner collections.
//!
//! Each logical collection is stored as a single JSON document and is always
//! replaced as a whole. Loading is lenient: a corrupt entry is skipped with a
//! warning so one bad record never takes the rest of its collection down.

pub mod json_backend;
pub mod memory;

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::calendar;
use crate::errors::{PlannerError, Result};

pub use json_backend::JsonFileStore;
pub use memory::MemoryStore;

/// Abstraction over persistence backends that hold whole JSON documents by key.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Value>>;
    fn put(&self, key: &str, value: &Value) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Logical collections the planner reads at startup and rewrites on mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    RecurringEvents,
    AgendaEvents,
    Bills,
    ExpenseYearly,
    DailyGoals,
    FinanceTransactions,
    FutureIncomes,
    AcademicTasks,
    WeeklyClasses,
    LastOpenDate,
}

impl Collection {
    pub const ALL: [Collection; 10] = [
        Collection::RecurringEvents,
        Collection::AgendaEvents,
        Collection::Bills,
        Collection::ExpenseYearly,
        Collection::DailyGoals,
        Collection::FinanceTransactions,
        Collection::FutureIncomes,
        Collection::AcademicTasks,
        Collection::WeeklyClasses,
        Collection::LastOpenDate,
    ];

    pub const fn key(self) -> &'static str {
        match self {
            Collection::RecurringEvents => "recurringEvents",
            Collection::AgendaEvents => "agendaEvents",
            Collection::Bills => "bills",
            Collection::ExpenseYearly => "expenseYearly",
            Collection::DailyGoals => "dailyGoals",
            Collection::FinanceTransactions => "financeTransactions",
            Collection::FutureIncomes => "futureIncomes",
            Collection::AcademicTasks => "academicTasks",
            Collection::WeeklyClasses => "weeklyClasses",
            Collection::LastOpenDate => "lastOpenDate",
        }
    }
}

pub fn save_collection<S, T>(store: &S, collection: Collection, value: &T) -> Result<()>
where
    S: KeyValueStore + ?Sized,
    T: Serialize + ?Sized,
{
    let document = serde_json::to_value(value)?;
    store.put(collection.key(), &document)?;
    tracing::trace!(collection = collection.key(), "collection persisted");
    Ok(())
}

/// Reads a collection document; an unparseable document counts as absent.
fn read_document<S>(store: &S, collection: Collection) -> Result<Option<Value>>
where
    S: KeyValueStore + ?Sized,
{
    match store.get(collection.key()) {
        Ok(value) => Ok(value),
        Err(PlannerError::Serde(err)) => {
            tracing::warn!(
                collection = collection.key(),
                error = %err,
                "stored collection is not valid JSON; starting empty"
            );
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

fn lenient_list<T: DeserializeOwned>(collection: Collection, value: Value) -> Vec<T> {
    let Value::Array(items) = value else {
        tracing::warn!(
            collection = collection.key(),
            "expected a list; ignoring stored value"
        );
        return Vec::new();
    };
    items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item) {
            Ok(parsed) => Some(parsed),
            Err(err) => {
                tracing::warn!(
                    collection = collection.key(),
                    index,
                    error = %err,
                    "skipping unreadable entry"
                );
                None
            }
        })
        .collect()
}

fn lenient_object(collection: Collection, value: Value) -> serde_json::Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => {
            tracing::warn!(
                collection = collection.key(),
                "expected an object; ignoring stored value"
            );
            serde_json::Map::new()
        }
    }
}

/// Loads a list collection, skipping entries that fail to deserialize.
pub fn load_list<S, T>(store: &S, collection: Collection) -> Result<Vec<T>>
where
    S: KeyValueStore + ?Sized,
    T: DeserializeOwned,
{
    Ok(read_document(store, collection)?
        .map(|value| lenient_list(collection, value))
        .unwrap_or_default())
}

/// Loads a `YYYY-MM-DD -> [entry]` collection. Malformed date keys and
/// unreadable entries are skipped; days left empty are dropped.
pub fn load_dated_lists<S, T>(
    store: &S,
    collection: Collection,
) -> Result<BTreeMap<NaiveDate, Vec<T>>>
where
    S: KeyValueStore + ?Sized,
    T: DeserializeOwned,
{
    let Some(document) = read_document(store, collection)? else {
        return Ok(BTreeMap::new());
    };
    let mut result = BTreeMap::new();
    for (key, value) in lenient_object(collection, document) {
        let date = match calendar::from_iso(&key) {
            Ok(date) => date,
            Err(err) => {
                tracing::warn!(collection = collection.key(), key = %key, error = %err, "skipping day");
                continue;
            }
        };
        let entries: Vec<T> = lenient_list(collection, value);
        if !entries.is_empty() {
            result.insert(date, entries);
        }
    }
    Ok(result)
}

/// Loads a map collection whose keys parse into `K`, skipping bad keys and
/// unreadable values.
pub fn load_keyed<S, K, T>(store: &S, collection: Collection) -> Result<BTreeMap<K, T>>
where
    S: KeyValueStore + ?Sized,
    K: std::str::FromStr + Ord,
    T: DeserializeOwned,
{
    let Some(document) = read_document(store, collection)? else {
        return Ok(BTreeMap::new());
    };
    let mut result = BTreeMap::new();
    for (key, value) in lenient_object(collection, document) {
        let Ok(parsed_key) = key.parse::<K>() else {
            tracing::warn!(collection = collection.key(), key = %key, "skipping malformed key");
            continue;
        };
        match serde_json::from_value(value) {
            Ok(parsed) => {
                result.insert(parsed_key, parsed);
            }
            Err(err) => {
                tracing::warn!(collection = collection.key(), key = %key, error = %err, "skipping entry");
            }
        }
    }
    Ok(result)
}

/// Loads a scalar date such as `lastOpenDate`; an unreadable value counts as absent.
pub fn load_date<S>(store: &S, collection: Collection) -> Result<Option<NaiveDate>>
where
    S: KeyValueStore + ?Sized,
{
    let Some(document) = read_document(store, collection)? else {
        return Ok(None);
    };
    match document {
        Value::String(text) => match calendar::from_iso(&text) {
            Ok(date) => Ok(Some(date)),
            Err(err) => {
                tracing::warn!(collection = collection.key(), error = %err, "ignoring stored date");
                Ok(None)
            }
        },
        Value::Null => Ok(None),
        _ => {
            tracing::warn!(collection = collection.key(), "stored date is not a string");
            Ok(None)
        }
    }
}

pub fn save_date<S>(store: &S, collection: Collection, date: NaiveDate) -> Result<()>
where
    S: KeyValueStore + ?Sized,
{
    store.put(collection.key(), &Value::String(calendar::to_iso(date)))
}
