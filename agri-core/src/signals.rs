//! Commodity intelligence signals
//!
//! A signal describes one commodity, regulatory or geographic event together
//! with a numeric risk score. Records are created once per load and shared as
//! immutable snapshots; the score is the only field that ever changes, and it
//! only changes by building a new record through [`Signal::with_score`].

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{MAX_SCORE, MIN_SCORE};

/// An immutable, cheaply cloned sequence of signals
pub type Snapshot = Arc<[Signal]>;

/// Signal identifier; feeds use both numeric and string ids
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SignalId {
    Num(i64),
    Text(String),
}

impl fmt::Display for SignalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalId::Num(n) => write!(f, "{}", n),
            SignalId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for SignalId {
    fn from(n: i64) -> Self {
        SignalId::Num(n)
    }
}

impl From<&str> for SignalId {
    fn from(s: &str) -> Self {
        SignalId::Text(s.to_string())
    }
}

impl From<String> for SignalId {
    fn from(s: String) -> Self {
        SignalId::Text(s)
    }
}

impl SignalId {
    /// Parse user input: all-digit strings become numeric ids
    pub fn parse(raw: &str) -> Self {
        match raw.trim().parse::<i64>() {
            Ok(n) => SignalId::Num(n),
            Err(_) => SignalId::Text(raw.trim().to_string()),
        }
    }
}

/// A commodity signal record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    /// Stable identifier within a session
    pub id: SignalId,

    /// Free-text description of the event
    pub headline: String,

    /// Commodity tag (coffee, cattle, corn, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commodity: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,

    /// Risk/confidence score (0 - 100)
    pub score: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub so_what: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub who_bleeds: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub who_benefits: Option<String>,

    #[serde(
        default,
        rename = "signalStrength",
        alias = "signal_strength",
        skip_serializing_if = "Option::is_none"
    )]
    pub signal_strength: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tradecraft: Option<String>,

    /// Market price, only for commodity-linked signals
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change: Option<f64>,

    #[serde(
        default,
        rename = "changePercent",
        alias = "change_percent",
        skip_serializing_if = "Option::is_none"
    )]
    pub change_percent: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Signal {
    /// Create a new signal builder
    pub fn builder(id: impl Into<SignalId>, headline: &str) -> SignalBuilder {
        SignalBuilder::new(id.into(), headline)
    }

    /// Copy of this signal carrying a new score
    pub fn with_score(&self, score: f64) -> Signal {
        Signal {
            score,
            ..self.clone()
        }
    }

    /// Location label: city and state/country when known
    pub fn location(&self) -> String {
        let region = self.state.as_deref().or(self.country.as_deref());
        match (self.city.as_deref(), region) {
            (Some(city), Some(region)) => format!("{}, {}", city, region),
            (Some(city), None) => city.to_string(),
            (None, Some(region)) => region.to_string(),
            (None, None) => String::new(),
        }
    }

    /// Whether this signal carries market price fields
    pub fn has_market_data(&self) -> bool {
        self.price.is_some()
    }
}

/// Builder for signals
pub struct SignalBuilder {
    signal: Signal,
}

impl SignalBuilder {
    pub fn new(id: SignalId, headline: &str) -> Self {
        Self {
            signal: Signal {
                id,
                headline: headline.to_string(),
                commodity: None,
                city: None,
                state: None,
                country: None,
                score: 0.0,
                so_what: None,
                who_bleeds: None,
                who_benefits: None,
                signal_strength: None,
                tradecraft: None,
                price: None,
                change: None,
                change_percent: None,
                timestamp: None,
                source: None,
            },
        }
    }

    pub fn commodity(mut self, commodity: &str) -> Self {
        self.signal.commodity = Some(commodity.to_string());
        self
    }

    pub fn city(mut self, city: &str) -> Self {
        self.signal.city = Some(city.to_string());
        self
    }

    pub fn state(mut self, state: &str) -> Self {
        self.signal.state = Some(state.to_string());
        self
    }

    pub fn country(mut self, country: &str) -> Self {
        self.signal.country = Some(country.to_string());
        self
    }

    /// Score is clamped to the 0 - 100 domain
    pub fn score(mut self, score: f64) -> Self {
        self.signal.score = score.clamp(MIN_SCORE, MAX_SCORE);
        self
    }

    pub fn so_what(mut self, text: &str) -> Self {
        self.signal.so_what = Some(text.to_string());
        self
    }

    pub fn who_bleeds(mut self, text: &str) -> Self {
        self.signal.who_bleeds = Some(text.to_string());
        self
    }

    pub fn who_benefits(mut self, text: &str) -> Self {
        self.signal.who_benefits = Some(text.to_string());
        self
    }

    pub fn signal_strength(mut self, text: &str) -> Self {
        self.signal.signal_strength = Some(text.to_string());
        self
    }

    pub fn tradecraft(mut self, text: &str) -> Self {
        self.signal.tradecraft = Some(text.to_string());
        self
    }

    pub fn market(mut self, price: f64, change: f64, change_percent: f64) -> Self {
        self.signal.price = Some(price);
        self.signal.change = Some(change);
        self.signal.change_percent = Some(change_percent);
        self
    }

    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.signal.timestamp = Some(timestamp);
        self
    }

    pub fn source(mut self, source: &str) -> Self {
        self.signal.source = Some(source.to_string());
        self
    }

    pub fn build(self) -> Signal {
        self.signal
    }
}

/// The "alpha" view of a signal: the trade thesis without provenance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alpha {
    pub headline: String,
    pub so_what: Option<String>,
    pub who_bleeds: Option<String>,
    pub who_benefits: Option<String>,
    pub tradecraft: Option<String>,
}

impl From<&Signal> for Alpha {
    fn from(signal: &Signal) -> Self {
        Alpha {
            headline: signal.headline.clone(),
            so_what: signal.so_what.clone(),
            who_bleeds: signal.who_bleeds.clone(),
            who_benefits: signal.who_benefits.clone(),
            tradecraft: signal.tradecraft.clone(),
        }
    }
}
