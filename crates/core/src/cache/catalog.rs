use std::collections::HashMap;

use crate::errors::CoreError;
use crate::models::coin::{Coin, RawCoin};

/// Select the catalog window from the full upstream list.
///
/// Walks `raw` from `offset`, dropping an entry whose symbol equals the
/// symbol of the entry right before it in `raw` (whether that one was kept or
/// dropped). Every dropped entry pushes the window end one slot to the right,
/// so the result holds `window` coins whenever `raw` has enough of them.
pub fn select_window(raw: &[RawCoin], offset: usize, window: usize) -> Vec<Coin> {
    let mut selected = Vec::with_capacity(window);
    let mut index = offset;

    while selected.len() < window && index < raw.len() {
        let entry = &raw[index];
        if index > offset && entry.same_symbol_as(&raw[index - 1]) {
            index += 1;
            continue;
        }
        selected.push(Coin::from(entry));
        index += 1;
    }

    selected
}

/// In-memory index of the coin catalog, addressable by id or by symbol.
#[derive(Debug, Clone, Default)]
pub struct CatalogCache {
    coins: Vec<Coin>,
    by_id: HashMap<String, usize>,
    by_symbol: HashMap<String, usize>,
}

impl CatalogCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a cache directly from already-selected coins.
    pub fn from_coins(coins: Vec<Coin>) -> Self {
        let mut cache = Self::new();
        cache.replace(coins);
        cache
    }

    /// Replace the contents with the window selected from `raw`.
    pub fn load(&mut self, raw: &[RawCoin], offset: usize, window: usize) -> &[Coin] {
        self.replace(select_window(raw, offset, window));
        &self.coins
    }

    fn replace(&mut self, coins: Vec<Coin>) {
        self.by_id.clear();
        self.by_symbol.clear();
        for (idx, coin) in coins.iter().enumerate() {
            self.by_id.entry(coin.id.clone()).or_insert(idx);
            if !coin.symbol.is_empty() {
                self.by_symbol
                    .entry(coin.symbol.to_lowercase())
                    .or_insert(idx);
            }
        }
        self.coins = coins;
    }

    pub fn coins(&self) -> &[Coin] {
        &self.coins
    }

    pub fn len(&self) -> usize {
        self.coins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coins.is_empty()
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Coin> {
        self.by_id.get(id).map(|&idx| &self.coins[idx])
    }

    /// Symbol lookup, case-insensitive.
    pub fn find_by_symbol(&self, symbol: &str) -> Option<&Coin> {
        self.by_symbol
            .get(&symbol.to_lowercase())
            .map(|&idx| &self.coins[idx])
    }

    /// Resolve a user search query to one coin.
    ///
    /// Blank queries are rejected before any lookup.
    pub fn search(&self, query: &str) -> Result<&Coin, CoreError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(CoreError::InvalidInput(
                "search query must not be empty".into(),
            ));
        }
        self.find_by_symbol(query)
            .ok_or_else(|| CoreError::NotFound(query.to_string()))
    }
}
