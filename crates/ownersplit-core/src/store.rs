//! Read-only access to car ledgers.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::convert::Infallible;

use crate::ledger::CarLedger;

/// Key identifying a ledger: car id and year.
pub type LedgerKey = (String, i32);

/// Read-only source of car ledgers.
///
/// Implementations fetch the snapshot for a `(car, year)` pair. A missing
/// ledger is `Ok(None)`, not an error; errors are reserved for failures of the
/// underlying storage.
pub trait LedgerAccessor {
    /// Storage failure type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetch the ledger for a car and year.
    fn ledger(&self, car_id: &str, year: i32) -> Result<Option<Cow<'_, CarLedger>>, Self::Error>;
}

/// In-memory ledger collection.
#[derive(Debug, Clone, Default)]
pub struct LedgerStore {
    ledgers: BTreeMap<LedgerKey, CarLedger>,
}

impl LedgerStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a ledger, returning the one it replaced.
    pub fn insert(&mut self, ledger: CarLedger) -> Option<CarLedger> {
        self.ledgers
            .insert((ledger.car_id.clone(), ledger.year), ledger)
    }

    /// Look up a ledger.
    #[must_use]
    pub fn get(&self, car_id: &str, year: i32) -> Option<&CarLedger> {
        self.ledgers.get(&(car_id.to_string(), year))
    }

    /// Whether a ledger exists for the key.
    #[must_use]
    pub fn contains(&self, car_id: &str, year: i32) -> bool {
        self.get(car_id, year).is_some()
    }

    /// Iterate over ledgers ordered by car id, then year.
    pub fn iter(&self) -> impl Iterator<Item = &CarLedger> {
        self.ledgers.values()
    }

    /// Number of ledgers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ledgers.len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ledgers.is_empty()
    }
}

impl FromIterator<CarLedger> for LedgerStore {
    fn from_iter<I: IntoIterator<Item = CarLedger>>(iter: I) -> Self {
        let mut store = Self::new();
        for ledger in iter {
            store.insert(ledger);
        }
        store
    }
}

impl LedgerAccessor for LedgerStore {
    type Error = Infallible;

    fn ledger(&self, car_id: &str, year: i32) -> Result<Option<Cow<'_, CarLedger>>, Infallible> {
        Ok(self.get(car_id, year).map(Cow::Borrowed))
    }
}
