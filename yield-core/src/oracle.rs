use rust_decimal::Decimal;

use crate::models::{PriceSeries, PriceSnapshot, VaultId};

impl PriceSeries {
    /// Last known price-per-share, or 1 when the series is empty.
    pub fn latest_price(&self) -> Decimal {
        self.latest()
            .map(|snapshot| snapshot.price_per_share)
            .unwrap_or(Decimal::ONE)
    }

    /// Price of the snapshot closest in time to `timestamp`.
    ///
    /// On equal distance the earlier snapshot in series order wins. An empty
    /// series prices at 1.
    pub fn price_at(&self, timestamp: i64) -> Decimal {
        let mut snapshots = self.snapshots().iter();
        let Some(first) = snapshots.next() else {
            return Decimal::ONE;
        };

        let mut closest = first;
        let mut min_diff = timestamp.abs_diff(first.timestamp);
        for snapshot in snapshots {
            let diff = timestamp.abs_diff(snapshot.timestamp);
            if diff < min_diff {
                min_diff = diff;
                closest = snapshot;
            }
        }
        closest.price_per_share
    }
}

/// Read-only view over the price history of both vaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceOracle {
    usd: PriceSeries,
    plus: PriceSeries,
}

impl PriceOracle {
    pub fn new(usd: PriceSeries, plus: PriceSeries) -> Self {
        PriceOracle { usd, plus }
    }

    pub fn series(&self, vault: VaultId) -> &PriceSeries {
        match vault {
            VaultId::Usd => &self.usd,
            VaultId::Plus => &self.plus,
        }
    }

    pub fn latest_price(&self, vault: VaultId) -> Decimal {
        self.series(vault).latest_price()
    }

    pub fn price_at(&self, timestamp: i64, vault: VaultId) -> Decimal {
        self.series(vault).price_at(timestamp)
    }

    pub fn earliest_snapshot(&self, vault: VaultId) -> Option<&PriceSnapshot> {
        self.series(vault).earliest()
    }
}
