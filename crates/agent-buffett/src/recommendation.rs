//! Parsing and validation of the quant stage's JSON report
//!
//! The quant stage is asked for a bare JSON object, but the text is model
//! output and is treated as untrusted: it may be wrapped in Markdown fences
//! or prose, and its numbers may be out of range.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::warn;

const MAX_TICKER_LEN: usize = 10;
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Reasons a quant report is rejected
#[derive(Debug, Error)]
pub enum ReportError {
    /// No complete `{ ... }` object in the text
    #[error("no JSON object found in output")]
    NoJson,

    /// The object does not have the expected shape
    #[error("malformed report: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The recommendation map is empty
    #[error("report contains no tickers")]
    NoTickers,

    /// A ticker symbol is not plausible
    #[error("invalid ticker '{0}'")]
    InvalidTicker(String),

    /// A percentage is above 100
    #[error("{ticker}: {field} = {value} is outside 0..=100")]
    PercentOutOfRange {
        ticker: String,
        field: &'static str,
        value: u32,
    },
}

/// Market sentiment, matched case-insensitively
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl FromStr for Sentiment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "positive" => Ok(Self::Positive),
            "neutral" => Ok(Self::Neutral),
            "negative" => Ok(Self::Negative),
            other => Err(format!("unknown sentiment '{other}'")),
        }
    }
}

impl TryFrom<String> for Sentiment {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Positive => "Positive",
            Self::Neutral => "Neutral",
            Self::Negative => "Negative",
        };
        f.write_str(s)
    }
}

/// Percentage split across the five ratings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingSplit {
    pub strong_buy: u32,
    pub buy: u32,
    pub hold: u32,
    pub sell: u32,
    pub strong_sell: u32,
}

impl RatingSplit {
    fn fields(&self) -> [(&'static str, u32); 5] {
        [
            ("strongBuy", self.strong_buy),
            ("buy", self.buy),
            ("hold", self.hold),
            ("sell", self.sell),
            ("strongSell", self.strong_sell),
        ]
    }

    pub fn total(&self) -> u32 {
        self.fields().iter().map(|(_, v)| v).sum()
    }
}

/// Recommendation for a single ticker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerRecommendation {
    pub sentiment: Sentiment,
    pub rec: RatingSplit,
    #[serde(default)]
    pub reasoning: String,
}

/// The structured report produced by the quant stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantReport {
    /// Report time as written by the model (`YYYY-MM-DD HH:MM`)
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub summary: String,
    pub sentiment: Sentiment,
    pub recommendation: BTreeMap<String, TickerRecommendation>,
    #[serde(default)]
    pub detailed_report: String,
}

impl QuantReport {
    /// Extract, deserialize and validate a report from raw model output
    pub fn parse(text: &str) -> Result<Self, ReportError> {
        let json = extract_json(text).ok_or(ReportError::NoJson)?;
        let mut report: QuantReport = serde_json::from_str(json)?;

        report.recommendation = std::mem::take(&mut report.recommendation)
            .into_iter()
            .map(|(ticker, rec)| (ticker.trim().to_string(), rec))
            .collect();
        report.validate()?;

        Ok(report)
    }

    /// Check tickers and percentages
    ///
    /// A split that does not add up to 100 is logged, not rejected.
    pub fn validate(&self) -> Result<(), ReportError> {
        if self.recommendation.is_empty() {
            return Err(ReportError::NoTickers);
        }

        for (ticker, rec) in &self.recommendation {
            if !is_valid_ticker(ticker) {
                return Err(ReportError::InvalidTicker(ticker.clone()));
            }

            if let Some((field, value)) = rec.rec.fields().into_iter().find(|(_, v)| *v > 100) {
                return Err(ReportError::PercentOutOfRange {
                    ticker: ticker.clone(),
                    field,
                    value,
                });
            }

            let total = rec.rec.total();
            if total != 100 {
                warn!("Rating split for {} sums to {}", ticker, total);
            }
        }

        Ok(())
    }

    /// Parsed report time, if the model followed the format
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(self.time.trim(), TIME_FORMAT).ok()
    }

    /// Tickers in the report
    pub fn tickers(&self) -> impl Iterator<Item = &str> {
        self.recommendation.keys().map(String::as_str)
    }
}

/// The JSON object in model output
///
/// A fenced code block wins over the surrounding prose. Otherwise the first
/// `{` that starts a complete JSON object is taken, so stray braces in the
/// prose are skipped.
fn extract_json(text: &str) -> Option<&str> {
    text.split("```")
        .skip(1)
        .step_by(2)
        .find_map(first_object)
        .or_else(|| first_object(text))
}

fn first_object(text: &str) -> Option<&str> {
    text.match_indices('{').find_map(|(start, _)| {
        let rest = &text[start..];
        let mut values = serde_json::Deserializer::from_str(rest).into_iter::<Value>();
        match values.next() {
            Some(Ok(Value::Object(_))) => Some(&rest[..values.byte_offset()]),
            _ => None,
        }
    })
}

fn is_valid_ticker(ticker: &str) -> bool {
    (1..=MAX_TICKER_LEN).contains(&ticker.len())
        && ticker
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '.' || c == '-')
}
