//! The fixed list of series the pipeline fetches.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{CoreError, ProviderKind, SeriesId, Ticker, ValidationError};

/// One catalog row: display name, provider identifier and provider family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    pub id: String,
    pub kind: ProviderKind,
    #[serde(default)]
    pub description: String,
}

impl CatalogEntry {
    pub fn market(
        name: impl Into<String>,
        ticker: &str,
        description: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let ticker = Ticker::parse(ticker)?;
        Self::checked(name.into(), ticker.into(), ProviderKind::Market, description.into())
    }

    pub fn macro_series(
        name: impl Into<String>,
        series_id: &str,
        description: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let series_id = SeriesId::parse(series_id)?;
        Self::checked(
            name.into(),
            series_id.into(),
            ProviderKind::Macro,
            description.into(),
        )
    }

    fn checked(
        name: String,
        id: String,
        kind: ProviderKind,
        description: String,
    ) -> Result<Self, ValidationError> {
        let entry = Self {
            name,
            id,
            kind,
            description,
        };
        entry.validate()?;
        Ok(entry)
    }

    /// Re-check an entry, e.g. one read from a catalog file.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyEntryName);
        }
        match self.kind {
            ProviderKind::Market => Ticker::parse(&self.id).map(|_| ()),
            ProviderKind::Macro => SeriesId::parse(&self.id).map(|_| ()),
        }
    }
}

/// Ordered, validated set of catalog entries. Column order of every table
/// follows catalog order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SeriesCatalog {
    entries: Vec<CatalogEntry>,
}

impl SeriesCatalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Result<Self, ValidationError> {
        if entries.is_empty() {
            return Err(ValidationError::EmptyCatalog);
        }

        let mut seen = HashSet::with_capacity(entries.len());
        for entry in &entries {
            entry.validate()?;
            if !seen.insert(entry.name.as_str()) {
                return Err(ValidationError::DuplicateEntry {
                    name: entry.name.clone(),
                });
            }
        }

        Ok(Self { entries })
    }

    /// Parse a JSON array of entries.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let entries: Vec<CatalogEntry> = serde_json::from_str(json)?;
        Ok(Self::new(entries)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, CoreError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.name.as_str()).collect()
    }

    pub fn of_kind(&self, kind: ProviderKind) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter().filter(move |entry| entry.kind == kind)
    }

    pub fn get(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }
}

impl Default for SeriesCatalog {
    /// Five market tickers followed by four Federal Reserve liquidity series.
    fn default() -> Self {
        let market = [
            ("TLT", "^TYX", "30-year Treasury yield"),
            ("DXY", "DX-Y.NYB", "US dollar index"),
            ("SPY", "SPY", "S&P 500 ETF"),
            ("QQQ", "QQQ", "Nasdaq 100 ETF"),
            ("VIX", "^VIX", "Volatility index"),
        ];
        let macro_series = [
            (
                "Fed_Reserve_Balances",
                "WRESBAL",
                "Reserve balances with Federal Reserve Banks",
            ),
            ("Fed_Total_Assets", "WALCL", "Federal Reserve total assets"),
            ("Treasury_Cash", "WTREGEN", "Treasury General Account"),
            (
                "Reverse_Repo",
                "RRPONTSYD",
                "Overnight reverse repurchase agreements",
            ),
        ];

        let entries = market
            .into_iter()
            .map(|(name, id, description)| CatalogEntry {
                name: name.to_owned(),
                id: id.to_owned(),
                kind: ProviderKind::Market,
                description: description.to_owned(),
            })
            .chain(
                macro_series
                    .into_iter()
                    .map(|(name, id, description)| CatalogEntry {
                        name: name.to_owned(),
                        id: id.to_owned(),
                        kind: ProviderKind::Macro,
                        description: description.to_owned(),
                    }),
            )
            .collect();

        Self { entries }
    }
}
