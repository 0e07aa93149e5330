// src/services/yahoo.rs
//
// Read-only client for the Yahoo Finance endpoints: annual statement series
// from the fundamentals-timeseries API, scalar metadata from quoteSummary,
// and daily bars from the v8 chart API. Calls block the request until the
// provider answers; there is no timeout or retry layer.

use log::{debug, info};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

use chrono::{Duration, Utc};

use crate::models::{FinancialSnapshot, PriceHistory};
use crate::services::error::EngineError;

const QUOTE_SUMMARY_URL: &str = "https://query2.finance.yahoo.com/v10/finance/quoteSummary";
const TIMESERIES_URL: &str =
    "https://query1.finance.yahoo.com/ws/fundamentals-timeseries/v1/finance/timeseries";
const CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

// Annual statement rows consumed by the engines, one timeseries key each.
const ANNUAL_SERIES: [&str; 11] = [
    "annualTotalRevenue",
    "annualEBIT",
    "annualEBITDA",
    "annualNetIncome",
    "annualTaxProvision",
    "annualPretaxIncome",
    "annualFreeCashFlow",
    "annualDepreciationAndAmortization",
    "annualCapitalExpenditure",
    "annualCurrentAssets",
    "annualCurrentLiabilities",
];

fn build_client() -> Result<Client, EngineError> {
    Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .map_err(EngineError::from)
}

/// Fetch the full fundamentals snapshot for one ticker: all trailing annual
/// statement series plus the scalar metadata the DCF bridge needs.
pub async fn fetch_fundamentals(ticker: &str) -> Result<FinancialSnapshot, EngineError> {
    info!("Fetching fundamentals snapshot for {}", ticker);
    let client = build_client()?;

    let series = fetch_annual_series(&client, ticker).await?;
    let summary = fetch_quote_summary(&client, ticker).await?;

    let snapshot = FinancialSnapshot {
        ticker: ticker.to_string(),
        total_revenue: take_series(&series, "annualTotalRevenue", ticker)?,
        ebit: take_series(&series, "annualEBIT", ticker)?,
        ebitda: take_series(&series, "annualEBITDA", ticker)?,
        net_income: take_series(&series, "annualNetIncome", ticker)?,
        tax_provision: take_series(&series, "annualTaxProvision", ticker)?,
        pretax_income: take_series(&series, "annualPretaxIncome", ticker)?,
        free_cash_flow: take_series(&series, "annualFreeCashFlow", ticker)?,
        dep_amort: take_series(&series, "annualDepreciationAndAmortization", ticker)?,
        capex: take_series(&series, "annualCapitalExpenditure", ticker)?,
        current_assets: take_series(&series, "annualCurrentAssets", ticker)?,
        current_liabilities: take_series(&series, "annualCurrentLiabilities", ticker)?,
        total_debt: raw_field(&summary, "financialData", "totalDebt")?,
        cash_and_equivalents: raw_field(&summary, "financialData", "totalCash")?,
        beta: raw_field(&summary, "summaryDetail", "beta")?,
        current_price: raw_field(&summary, "financialData", "currentPrice")?,
        shares_outstanding: raw_field(&summary, "defaultKeyStatistics", "sharesOutstanding")?,
        trailing_eps: raw_field(&summary, "defaultKeyStatistics", "trailingEps")?,
        market_cap: raw_field(&summary, "price", "marketCap")?,
    };

    debug!(
        "Snapshot for {}: {} revenue periods, market cap {}",
        ticker,
        snapshot.total_revenue.len(),
        snapshot.market_cap
    );
    Ok(snapshot)
}

/// Fetch daily close/high/low bars for the given chart range ("1y", "2y", ...).
/// A missing symbol or an empty result maps to `DataUnavailable`.
pub async fn fetch_price_history(ticker: &str, range: &str) -> Result<PriceHistory, EngineError> {
    info!("Fetching {} price history for {}", range, ticker);
    let client = build_client()?;

    let url = format!("{}/{}", CHART_URL, ticker);
    let response = client
        .get(&url)
        .query(&[("range", range), ("interval", "1d")])
        .send()
        .await?;

    if response.status() == StatusCode::NOT_FOUND {
        return Err(EngineError::DataUnavailable(ticker.to_string()));
    }
    let body: ChartResponse = response.error_for_status()?.json().await?;

    let result = body
        .chart
        .result
        .and_then(|mut results| if results.is_empty() { None } else { Some(results.remove(0)) })
        .ok_or_else(|| EngineError::DataUnavailable(ticker.to_string()))?;

    let quote = result
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| EngineError::DataUnavailable(ticker.to_string()))?;

    let history = collect_bars(quote);
    if history.closes.is_empty() {
        return Err(EngineError::DataUnavailable(ticker.to_string()));
    }

    debug!("Fetched {} daily bars for {}", history.closes.len(), ticker);
    Ok(history)
}

async fn fetch_annual_series(
    client: &Client,
    ticker: &str,
) -> Result<HashMap<String, Vec<f64>>, EngineError> {
    let period2 = Utc::now();
    let period1 = period2 - Duration::days(6 * 365);

    let url = format!("{}/{}", TIMESERIES_URL, ticker);
    let body: Value = client
        .get(&url)
        .query(&[
            ("type", ANNUAL_SERIES.join(",")),
            ("period1", period1.timestamp().to_string()),
            ("period2", period2.timestamp().to_string()),
        ])
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    let results = body
        .pointer("/timeseries/result")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            EngineError::computation(format!("malformed timeseries response for {}", ticker))
        })?;

    let mut dated: HashMap<String, Vec<(String, f64)>> = HashMap::new();
    for entry in results {
        let kind = match entry.pointer("/meta/type/0").and_then(Value::as_str) {
            Some(kind) => kind,
            None => continue,
        };
        let rows = match entry.get(kind).and_then(Value::as_array) {
            Some(rows) => rows,
            None => continue,
        };
        let series = dated.entry(kind.to_string()).or_default();
        for row in rows {
            let as_of = row.pointer("/asOfDate").and_then(Value::as_str);
            let raw = row.pointer("/reportedValue/raw").and_then(Value::as_f64);
            if let (Some(as_of), Some(raw)) = (as_of, raw) {
                series.push((as_of.to_string(), raw));
            }
        }
    }

    // ISO dates sort lexicographically; newest first
    let mut series = HashMap::new();
    for (kind, mut rows) in dated {
        rows.sort_by(|a, b| b.0.cmp(&a.0));
        series.insert(kind, rows.into_iter().map(|(_, value)| value).collect());
    }
    Ok(series)
}

async fn fetch_quote_summary(client: &Client, ticker: &str) -> Result<Value, EngineError> {
    let url = format!("{}/{}", QUOTE_SUMMARY_URL, ticker);
    let body: Value = client
        .get(&url)
        .query(&[(
            "modules",
            "summaryDetail,defaultKeyStatistics,financialData,price",
        )])
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    Ok(body)
}

fn collect_bars(quote: QuoteBlock) -> PriceHistory {
    let mut history = PriceHistory::default();
    let closes = quote.close.unwrap_or_default();
    let highs = quote.high.unwrap_or_default();
    let lows = quote.low.unwrap_or_default();
    for (i, close) in closes.iter().enumerate() {
        // Yahoo pads halted days with nulls; skip incomplete bars
        let close = match close {
            Some(c) => *c,
            None => continue,
        };
        let high = highs.get(i).copied().flatten().unwrap_or(close);
        let low = lows.get(i).copied().flatten().unwrap_or(close);
        history.closes.push(close);
        history.highs.push(high);
        history.lows.push(low);
    }
    history
}

fn take_series(
    series: &HashMap<String, Vec<f64>>,
    key: &str,
    ticker: &str,
) -> Result<Vec<f64>, EngineError> {
    match series.get(key) {
        Some(values) if !values.is_empty() => Ok(values.clone()),
        _ => Err(EngineError::computation(format!(
            "missing statement series {} for {}",
            key, ticker
        ))),
    }
}

fn raw_field(summary: &Value, module: &str, field: &str) -> Result<f64, EngineError> {
    summary
        .pointer(&format!("/quoteSummary/result/0/{}/{}/raw", module, field))
        .and_then(Value::as_f64)
        .ok_or_else(|| EngineError::computation(format!("missing field {}.{}", module, field)))
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartEnvelope,
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteBlock>,
}

#[derive(Debug, Deserialize)]
struct QuoteBlock {
    close: Option<Vec<Option<f64>>>,
    high: Option<Vec<Option<f64>>>,
    low: Option<Vec<Option<f64>>>,
}
