use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Vault price-per-share observed at `timestamp` (Unix seconds).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceSnapshot {
    pub timestamp: i64,
    pub price_per_share: Decimal,
}

impl PriceSnapshot {
    pub fn new(timestamp: i64, price_per_share: Decimal) -> Self {
        PriceSnapshot {
            timestamp,
            price_per_share,
        }
    }
}

/// Price history of one vault, ascending by timestamp as supplied.
///
/// An empty series is valid; every lookup on it resolves to a price of 1.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceSeries {
    snapshots: Vec<PriceSnapshot>,
}

impl PriceSeries {
    pub fn new(snapshots: Vec<PriceSnapshot>) -> Self {
        PriceSeries { snapshots }
    }

    pub fn snapshots(&self) -> &[PriceSnapshot] {
        &self.snapshots
    }

    pub fn earliest(&self) -> Option<&PriceSnapshot> {
        self.snapshots.first()
    }

    pub fn latest(&self) -> Option<&PriceSnapshot> {
        self.snapshots.last()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

impl From<Vec<PriceSnapshot>> for PriceSeries {
    fn from(snapshots: Vec<PriceSnapshot>) -> Self {
        PriceSeries::new(snapshots)
    }
}

impl FromIterator<PriceSnapshot> for PriceSeries {
    fn from_iter<T: IntoIterator<Item = PriceSnapshot>>(iter: T) -> Self {
        PriceSeries {
            snapshots: iter.into_iter().collect(),
        }
    }
}
