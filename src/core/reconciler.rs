use crate::core::extractor::{extract, extract_date, ExtractMode, Extraction, SeriesContext};
use crate::core::{Observation, RateRecord};
use crate::domain::catalog::SeriesEntry;
use crate::domain::date::parse_upstream;
use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};

/// Newest valid observation: scans from the end, first successful extraction wins.
pub fn latest_valid(observations: &[Observation], ctx: &SeriesContext<'_>) -> Option<Extraction> {
    observations
        .iter()
        .rev()
        .find_map(|observation| extract(observation, ctx))
}

/// Current-rate mode. Returns `None` unless both sides produced a valid rate.
///
/// The buy side's date wins when both sides carry one; `fallback_date` is used
/// when neither does.
pub fn reconcile_latest(
    entry: &SeriesEntry,
    buy: &[Observation],
    sell: &[Observation],
    fallback_date: &str,
) -> Option<RateRecord> {
    let buy_ctx = SeriesContext::new(&entry.buy, entry.code, ExtractMode::Latest);
    let sell_ctx = SeriesContext::new(&entry.sell, entry.code, ExtractMode::Latest);

    let buy = latest_valid(buy, &buy_ctx);
    let sell = latest_valid(sell, &sell_ctx);

    let (buy, sell) = match (buy, sell) {
        (Some(buy), Some(sell)) => (buy, sell),
        (buy, sell) => {
            tracing::debug!(
                currency = %entry.code,
                has_buy = buy.is_some(),
                has_sell = sell.is_some(),
                "No complete buy/sell pair, omitting currency"
            );
            return None;
        }
    };

    let date = buy
        .date
        .or(sell.date)
        .unwrap_or_else(|| fallback_date.to_string());

    Some(RateRecord {
        currency: entry.code,
        buy_rate: Some(buy.rate),
        sell_rate: Some(sell.rate),
        date,
    })
}

/// Historical mode: one record per distinct raw date on either side, newest first.
pub fn reconcile_timeline(
    entry: &SeriesEntry,
    buy: &[Observation],
    sell: &[Observation],
) -> Vec<RateRecord> {
    let buy_ctx = SeriesContext::new(&entry.buy, entry.code, ExtractMode::Timeline);
    let sell_ctx = SeriesContext::new(&entry.sell, entry.code, ExtractMode::Timeline);

    let buy_rates = rates_by_date(buy, &buy_ctx);
    let sell_rates = rates_by_date(sell, &sell_ctx);

    // 只要原始資料有日期就納入，不論數值能否解析
    let mut seen = HashSet::new();
    let mut dates: Vec<String> = buy
        .iter()
        .chain(sell.iter())
        .filter_map(extract_date)
        .filter(|date| seen.insert(date.clone()))
        .collect();

    sort_dates_newest_first(&mut dates);

    dates
        .into_iter()
        .map(|date| RateRecord {
            currency: entry.code,
            buy_rate: buy_rates.get(&date).copied(),
            sell_rate: sell_rates.get(&date).copied(),
            date,
        })
        .collect()
}

/// Date -> rate for every dated, valid observation. A repeated date keeps the last value.
fn rates_by_date(observations: &[Observation], ctx: &SeriesContext<'_>) -> HashMap<String, f64> {
    observations
        .iter()
        .filter_map(|observation| extract(observation, ctx))
        .filter_map(|extraction| extraction.date.map(|date| (date, extraction.rate)))
        .collect()
}

/// Stable sort on the parsed `DD-MM-YYYY` date, newest first. Unparsable dates
/// keep their relative order and go after every parsable one.
pub fn sort_dates_newest_first(dates: &mut [String]) {
    dates.sort_by_key(|date| Reverse(parse_upstream(date)));
}
