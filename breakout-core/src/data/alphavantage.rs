//! AlphaVantage data provider.
//!
//! Fetches the full daily history from the `TIME_SERIES_DAILY` endpoint.
//! AlphaVantage reports problems inside a 200 response: `"Error Message"` for
//! unknown symbols, `"Note"` or `"Information"` when the key is over its
//! quota. Quota responses are retried with exponential backoff; every request
//! passes through a [`Throttle`] first.

use super::provider::{bars_in_range, DataError, DataProvider, DataSource, FetchResult};
use super::throttle::Throttle;
use crate::domain::DailyBar;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_API_KEY_VAR: &str = "ALPHAVANTAGE_API_KEY";
const BASE_URL: &str = "https://www.alphavantage.co/query";

/// `TIME_SERIES_DAILY` response. Exactly one of the fields is normally set.
#[derive(Debug, Deserialize)]
pub struct DailyResponse {
    #[serde(rename = "Time Series (Daily)")]
    time_series: Option<BTreeMap<String, DailyEntry>>,
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DailyEntry {
    #[serde(rename = "1. open")]
    open: Option<String>,
    #[serde(rename = "2. high")]
    high: Option<String>,
    #[serde(rename = "3. low")]
    low: Option<String>,
    #[serde(rename = "4. close")]
    close: Option<String>,
    #[serde(rename = "5. volume")]
    volume: Option<String>,
}

/// Convert a response body into bars sorted by date.
///
/// A missing, non-numeric, or non-finite close is `MalformedData`. Missing
/// open/high/low fall back to the close; missing volume to zero.
pub fn parse_daily(symbol: &str, resp: DailyResponse) -> Result<Vec<DailyBar>, DataError> {
    if resp.error_message.is_some() {
        return Err(DataError::SymbolNotFound {
            symbol: symbol.to_string(),
        });
    }
    if let Some(msg) = resp.note.or(resp.information) {
        debug!(symbol, message = %msg, "quota message from provider");
        return Err(DataError::RateLimited {
            retry_after_secs: 60,
        });
    }
    let series = resp.time_series.ok_or_else(|| {
        DataError::ResponseFormatChanged("missing \"Time Series (Daily)\"".into())
    })?;

    let mut bars = Vec::with_capacity(series.len());
    for (date_str, entry) in series {
        let date: NaiveDate = date_str.parse().map_err(|_| {
            DataError::ResponseFormatChanged(format!("invalid date key: {date_str}"))
        })?;

        let malformed = |reason: String| DataError::MalformedData {
            symbol: symbol.to_string(),
            date: date_str.clone(),
            field: "close",
            reason,
        };
        let raw_close = entry.close.as_deref().ok_or_else(|| malformed("missing".into()))?;
        let close: f64 = raw_close
            .trim()
            .parse()
            .map_err(|_| malformed(format!("not a number: {raw_close:?}")))?;
        if !close.is_finite() {
            return Err(malformed(format!("not finite: {raw_close:?}")));
        }

        let price = |field: &Option<String>| {
            field
                .as_deref()
                .and_then(|v| v.trim().parse::<f64>().ok())
                .filter(|v| v.is_finite())
                .unwrap_or(close)
        };
        bars.push(DailyBar {
            date,
            open: price(&entry.open),
            high: price(&entry.high),
            low: price(&entry.low),
            close,
            volume: entry
                .volume
                .as_deref()
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(0),
        });
    }

    if bars.is_empty() {
        return Err(DataError::SymbolNotFound {
            symbol: symbol.to_string(),
        });
    }
    Ok(bars)
}

/// AlphaVantage data provider.
pub struct AlphaVantageProvider {
    client: reqwest::blocking::Client,
    api_key: Option<String>,
    throttle: Throttle,
    max_retries: u32,
    base_delay: Duration,
}

impl AlphaVantageProvider {
    pub fn new(api_key: Option<String>, min_interval: Duration) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| DataError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            throttle: Throttle::new(min_interval),
            max_retries: 3,
            base_delay: Duration::from_secs(2),
        })
    }

    /// Read the key from the environment variable `key_var`. A missing key is
    /// only reported when the first request is made.
    pub fn from_env(key_var: &str, min_interval: Duration) -> Result<Self, DataError> {
        Self::new(std::env::var(key_var).ok(), min_interval)
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    fn query_url(symbol: &str, api_key: &str) -> String {
        format!(
            "{BASE_URL}?function=TIME_SERIES_DAILY&symbol={}&outputsize=full&apikey={api_key}",
            symbol.to_uppercase()
        )
    }

    fn fetch_with_retry(&self, symbol: &str) -> Result<Vec<DailyBar>, DataError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            DataError::AuthenticationRequired(format!(
                "no AlphaVantage API key (set {DEFAULT_API_KEY_VAR} or data.api_key_env)"
            ))
        })?;

        let url = Self::query_url(symbol, api_key);
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.base_delay * 2u32.pow(attempt - 1);
                warn!(symbol, attempt, ?delay, "retrying AlphaVantage request");
                std::thread::sleep(delay);
            }
            self.throttle.wait();

            match self.client.get(&url).send() {
                Ok(resp) => {
                    let status = resp.status();

                    if status == reqwest::StatusCode::UNAUTHORIZED
                        || status == reqwest::StatusCode::FORBIDDEN
                    {
                        return Err(DataError::AuthenticationRequired(format!(
                            "AlphaVantage rejected the API key (HTTP {status})"
                        )));
                    }

                    if !status.is_success() {
                        last_error = Some(DataError::Other(format!("HTTP {status} for {symbol}")));
                        continue;
                    }

                    let body: DailyResponse = resp.json().map_err(|e| {
                        DataError::ResponseFormatChanged(format!(
                            "failed to parse response for {symbol}: {e}"
                        ))
                    })?;

                    match parse_daily(symbol, body) {
                        Err(e @ DataError::RateLimited { .. }) => {
                            last_error = Some(e);
                            continue;
                        }
                        other => return other,
                    }
                }
                Err(e) => {
                    if e.is_connect() || e.is_timeout() {
                        last_error = Some(DataError::NetworkUnreachable(e.to_string()));
                        continue;
                    }
                    return Err(DataError::NetworkUnreachable(e.to_string()));
                }
            }
        }

        Err(last_error.unwrap_or_else(|| DataError::Other("max retries exceeded".into())))
    }
}

impl DataProvider for AlphaVantageProvider {
    fn name(&self) -> &str {
        "alphavantage"
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError> {
        let bars = self.fetch_with_retry(symbol)?;
        debug!(symbol, bars = bars.len(), "fetched full daily history");
        Ok(FetchResult {
            symbol: symbol.to_uppercase(),
            bars: bars_in_range(&bars, start, end),
            source: DataSource::AlphaVantage,
        })
    }

    fn is_available(&self) -> bool {
        self.api_key.is_some()
    }
}
