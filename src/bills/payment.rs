use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// When an occurrence was paid. `ts` is epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub on: NaiveDate,
    #[serde(default)]
    pub ts: Option<i64>,
}

/// Shapes a payment entry has taken in stored data.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredPayment {
    Record {
        #[serde(default, alias = "date")]
        on: Option<NaiveDate>,
        #[serde(default)]
        ts: Option<i64>,
    },
    Flag(bool),
    PaidOn(NaiveDate),
}

impl StoredPayment {
    fn normalize(self, occurrence: NaiveDate) -> Option<PaymentRecord> {
        match self {
            StoredPayment::Record { on, ts } => Some(PaymentRecord {
                on: on.unwrap_or(occurrence),
                ts,
            }),
            StoredPayment::Flag(true) => Some(PaymentRecord {
                on: occurrence,
                ts: None,
            }),
            StoredPayment::Flag(false) => None,
            StoredPayment::PaidOn(on) => Some(PaymentRecord { on, ts: None }),
        }
    }
}

pub(crate) fn deserialize_paid<'de, D>(
    deserializer: D,
) -> Result<BTreeMap<NaiveDate, PaymentRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<BTreeMap<NaiveDate, StoredPayment>>::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(occurrence, stored)| {
            stored
                .normalize(occurrence)
                .map(|record| (occurrence, record))
        })
        .collect())
}
