use serde::{Deserialize, Serialize};

/// A raw record from the bulk coins-list endpoint.
///
/// Upstream entries occasionally lack fields, so everything except the id is
/// optional here. Extra fields (platforms etc.) are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCoin {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl RawCoin {
    pub fn new(id: impl Into<String>, symbol: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            symbol: Some(symbol.into()),
            name: Some(name.into()),
        }
    }

    /// Adjacent-duplicate test used when windowing the catalog.
    /// A missing symbol never matches anything, including another missing one.
    pub fn same_symbol_as(&self, other: &RawCoin) -> bool {
        match (&self.symbol, &other.symbol) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

/// A catalog entry. Immutable once loaded.
///
/// Price lookups are keyed on `symbol`, not `id`, which is why the catalog
/// drops same-symbol neighbours.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coin {
    /// Upstream identifier (e.g., "bitcoin")
    pub id: String,

    /// Lowercase ticker as served upstream (e.g., "btc"); empty if the feed omitted it
    pub symbol: String,

    /// Display name (e.g., "Bitcoin")
    pub name: String,
}

impl Coin {
    pub fn new(id: impl Into<String>, symbol: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            symbol: symbol.into(),
            name: name.into(),
        }
    }

    /// Symbol in the form the batch price feed keys its response by.
    pub fn quote_symbol(&self) -> String {
        self.symbol.to_uppercase()
    }
}

impl From<&RawCoin> for Coin {
    fn from(raw: &RawCoin) -> Self {
        Self {
            id: raw.id.clone(),
            symbol: raw.symbol.clone().unwrap_or_default(),
            name: raw.name.clone().unwrap_or_default(),
        }
    }
}
