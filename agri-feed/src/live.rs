//! Generated live feed
//!
//! Five base market signals priced from a mock price board. Quotes are
//! randomized around fixed base prices; no real market data is fetched.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use agri_core::Signal;

use crate::{SignalSource, SourceError};

/// Provenance tag on generated signals
pub const LIVE_SOURCE: &str = "Live Market Data";

/// A commodity price quote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub symbol: String,
    pub name: String,
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
    pub last_update: DateTime<Utc>,
}

struct MockPrice {
    commodity: &'static str,
    symbol: &'static str,
    name: &'static str,
    base: f64,
    /// Full width of the uniform jitter around `base`
    spread: f64,
    change: f64,
    change_percent: f64,
}

const MOCK_PRICES: &[MockPrice] = &[
    MockPrice {
        commodity: "corn",
        symbol: "CORN",
        name: "Corn",
        base: 4.25,
        spread: 0.5,
        change: -0.12,
        change_percent: -2.8,
    },
    MockPrice {
        commodity: "wheat",
        symbol: "WHEAT",
        name: "Wheat",
        base: 5.85,
        spread: 0.8,
        change: 0.23,
        change_percent: 4.1,
    },
    MockPrice {
        commodity: "coffee",
        symbol: "COFFEE",
        name: "Coffee",
        base: 1.65,
        spread: 0.3,
        change: 0.08,
        change_percent: 5.2,
    },
    MockPrice {
        commodity: "cattle",
        symbol: "CATTLE",
        name: "Live Cattle",
        base: 1.45,
        spread: 0.2,
        change: -0.03,
        change_percent: -2.1,
    },
    MockPrice {
        commodity: "sugar",
        symbol: "SUGAR",
        name: "Sugar",
        base: 0.22,
        spread: 0.05,
        change: 0.01,
        change_percent: 4.8,
    },
];

/// Mock quotes for the tracked commodities
#[derive(Debug, Clone, Copy, Default)]
pub struct PriceBoard;

impl PriceBoard {
    /// Commodities with a mock quote
    pub fn commodities(&self) -> Vec<&'static str> {
        MOCK_PRICES.iter().map(|m| m.commodity).collect()
    }

    /// Quote for a commodity, `None` if it is not tracked
    pub fn quote<R: Rng>(
        &self,
        commodity: &str,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> Option<PriceQuote> {
        let wanted = commodity.to_lowercase();
        let mock = MOCK_PRICES.iter().find(|m| m.commodity == wanted)?;
        let jitter = (rng.gen::<f64>() - 0.5) * mock.spread;

        Some(PriceQuote {
            symbol: mock.symbol.to_string(),
            name: mock.name.to_string(),
            price: mock.base + jitter,
            change: mock.change,
            change_percent: mock.change_percent,
            last_update: now,
        })
    }
}

struct BaseSignal {
    headline: &'static str,
    city: &'static str,
    state: Option<&'static str>,
    country: Option<&'static str>,
    commodity: &'static str,
    so_what: &'static str,
    who_bleeds: &'static str,
    who_benefits: &'static str,
    signal_strength: &'static str,
}

const BASE_SIGNALS: &[BaseSignal] = &[
    BaseSignal {
        headline: "McDonald's slashes combo prices 15% amid beef price volatility",
        city: "Chicago",
        state: Some("IL"),
        country: None,
        commodity: "cattle",
        so_what: "Lower margins, volume recovery → beef demand stabilizes.",
        who_bleeds: "Chili's, Applebee's (lost fast-food edge).",
        who_benefits: "McDonald's suppliers, beef futures.",
        signal_strength: "Short casual dining, Long beef suppliers.",
    },
    BaseSignal {
        headline: "Brazil coffee harvest yields drop 20% - global supply shock",
        city: "São Paulo",
        state: None,
        country: Some("Brazil"),
        commodity: "coffee",
        so_what: "Global coffee shortage → Starbucks margin compression.",
        who_bleeds: "Coffee chains, consumer discretionary.",
        who_benefits: "Colombian exporters, coffee futures.",
        signal_strength: "Long coffee futures, Short SBUX.",
    },
    BaseSignal {
        headline: "Midwest drought threatens corn belt - futures spike expected",
        city: "Des Moines",
        state: Some("IA"),
        country: None,
        commodity: "corn",
        so_what: "Crop insurance payouts + ethanol supply disruption.",
        who_bleeds: "Ethanol producers, livestock feed costs.",
        who_benefits: "Crop insurance, alternative feed suppliers.",
        signal_strength: "Long corn futures, Short ethanol stocks.",
    },
    BaseSignal {
        headline: "Ukraine wheat exports resume - global grain markets stabilize",
        city: "Kyiv",
        state: None,
        country: Some("Ukraine"),
        commodity: "wheat",
        so_what: "Black Sea corridor reopens → grain price normalization.",
        who_bleeds: "US wheat exporters, premium grain suppliers.",
        who_benefits: "Global food security, emerging markets.",
        signal_strength: "Short wheat futures, Long food security ETFs.",
    },
    BaseSignal {
        headline: "Indian sugar export ban triggers global shortage fears",
        city: "Mumbai",
        state: None,
        country: Some("India"),
        commodity: "sugar",
        so_what: "20% of global supply offline → price spike imminent.",
        who_bleeds: "Food manufacturers, beverage companies.",
        who_benefits: "Brazilian sugar, alternative sweeteners.",
        signal_strength: "Long sugar futures, Short food processing.",
    },
];

/// Generated market signals
#[derive(Debug, Clone, Default)]
pub struct LiveSignalSource {
    board: PriceBoard,
}

impl LiveSignalSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the live set with an explicit random source and clock
    pub fn generate<R: Rng>(&self, rng: &mut R, now: DateTime<Utc>) -> Vec<Signal> {
        BASE_SIGNALS
            .iter()
            .enumerate()
            .map(|(idx, base)| {
                // integer score in 80..=99
                let score = (rng.gen::<f64>() * 20.0).floor() + 80.0;

                let mut builder = Signal::builder(format!("live-{}", idx + 1), base.headline)
                    .commodity(base.commodity)
                    .city(base.city)
                    .score(score)
                    .so_what(base.so_what)
                    .who_bleeds(base.who_bleeds)
                    .who_benefits(base.who_benefits)
                    .signal_strength(base.signal_strength)
                    .timestamp(now)
                    .source(LIVE_SOURCE);

                if let Some(state) = base.state {
                    builder = builder.state(state);
                }
                if let Some(country) = base.country {
                    builder = builder.country(country);
                }
                if let Some(quote) = self.board.quote(base.commodity, rng, now) {
                    builder = builder.market(quote.price, quote.change, quote.change_percent);
                }

                builder.build()
            })
            .collect()
    }
}

#[async_trait]
impl SignalSource for LiveSignalSource {
    fn name(&self) -> &str {
        "generated"
    }

    async fn fetch_all(&self) -> Result<Vec<Signal>, SourceError> {
        Ok(self.generate(&mut rand::thread_rng(), Utc::now()))
    }
}
