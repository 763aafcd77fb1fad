//! One-shot cycle enumeration.
//!
//! Given the full symbol catalogue and a base asset, [`build`] enumerates
//! every triangular cycle that starts and ends in that asset along with the
//! minimal set of symbols that need a live order book subscription. Runs
//! once at startup; nothing here is safe or useful to call again after the
//! engine is live. `ComputeLoop`'s cycle queue and `DepthIngest`'s
//! subscription list are both seeded from this single pass and never rebuilt.

use std::collections::BTreeSet;

use triarb_core::{Asset, Cycle, TradingPair};

mod error;

pub use error::{Result, TopologyError};

/// The result of a single topology build.
pub struct Topology {
    pub cycles: Vec<Cycle>,
    /// Exchange symbols that need a live depth subscription, in the order
    /// first encountered.
    pub subscriptions: Vec<String>,
}

/// Enumerate all triangular cycles starting and ending in `base` over
/// `pairs`, plus the set of symbols that need subscribing.
///
/// Algorithm: let `starters` be
/// every pair touching `base`. For every unordered pair `(p, q)` of distinct
/// starters, form the synthetic middle pair `(p.other(base), q.other(base))`
/// and search the catalogue for a real pair equal to it (equality is the
/// unordered `{base, quote}` comparison `TradingPair` already implements).
/// If found, both directions `(base, p, middle, q)` and `(base, q, middle, p)`
/// are emitted as cycles. Enumeration order is deterministic: `pairs` is
/// iterated in its given order for `starters`, and the outer/inner loops walk
/// `starters` by index, matching `(p.symbol, q.symbol)` lexicographic order
/// whenever the caller's `pairs` slice is itself symbol-sorted.
pub fn build(pairs: &[TradingPair], base: &Asset) -> Topology {
    let starters: Vec<&TradingPair> = pairs.iter().filter(|p| p.has_asset(base)).collect();
    log::debug!("found {} start/end market pairs for base {base}", starters.len());

    let mut cycles = Vec::new();
    let mut subscriptions: Vec<String> = Vec::new();
    let mut seen_symbols: BTreeSet<String> = BTreeSet::new();

    let mut subscribe = |symbol: &str, subscriptions: &mut Vec<String>, seen: &mut BTreeSet<String>| {
        if seen.insert(symbol.to_string()) {
            subscriptions.push(symbol.to_string());
        }
    };

    for (i, start_pair) in starters.iter().enumerate() {
        for end_pair in starters.iter().skip(i + 1) {
            let start_other = match start_pair.other(base) {
                Some(a) => a,
                None => continue,
            };
            let end_other = match end_pair.other(base) {
                Some(a) => a,
                None => continue,
            };
            let synthetic_middle = TradingPair::synthetic(start_other, end_other);

            let Some(middle_pair) = pairs.iter().find(|m| **m == synthetic_middle) else {
                continue;
            };

            subscribe(&start_pair.symbol, &mut subscriptions, &mut seen_symbols);
            subscribe(&end_pair.symbol, &mut subscriptions, &mut seen_symbols);
            subscribe(&middle_pair.symbol, &mut subscriptions, &mut seen_symbols);

            if let Some(cycle) = Cycle::new(
                base.clone(),
                (*start_pair).clone(),
                middle_pair.clone(),
                (*end_pair).clone(),
            ) {
                cycles.push(cycle);
            }
            if let Some(cycle) = Cycle::new(
                base.clone(),
                (*end_pair).clone(),
                middle_pair.clone(),
                (*start_pair).clone(),
            ) {
                cycles.push(cycle);
            }
        }
    }

    log::info!("found {} triangular cycles", cycles.len());
    log::debug!("will need {} depth subscriptions", subscriptions.len());

    Topology {
        cycles,
        subscriptions,
    }
}

/// [`build`], but fatal if the base asset yields zero
/// cycles: a misconfigured `INVESTMENT.BASE` or an exchange catalogue
/// missing the expected pairs, either way nothing for the engine to do.
pub fn try_build(pairs: &[TradingPair], base: &Asset) -> Result<Topology> {
    let topology = build(pairs, base);
    if topology.cycles.is_empty() {
        return Err(TopologyError::NoCyclesFound(base.clone()));
    }
    Ok(topology)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn pair(symbol: &str, base: &str, quote: &str) -> TradingPair {
        TradingPair::new(symbol, base, quote, 8, 2, Decimal::new(1, 5))
    }

    #[test]
    fn enumerates_both_directions_of_a_single_triangle() {
        let _ = env_logger::try_init();
        let pairs = vec![
            pair("BTCUSDT", "BTC", "USDT"),
            pair("ETHUSDT", "ETH", "USDT"),
            pair("ETHBTC", "ETH", "BTC"),
        ];
        let base = Asset::from("USDT");
        let topology = build(&pairs, &base);

        assert_eq!(topology.cycles.len(), 2);
        let texts: BTreeSet<String> = topology.cycles.iter().map(|c| c.text()).collect();
        assert!(texts.contains("USDT -> BTC -> ETH -> USDT"));
        assert!(texts.contains("USDT -> ETH -> BTC -> USDT"));

        let subs: BTreeSet<String> = topology.subscriptions.into_iter().collect();
        assert_eq!(
            subs,
            BTreeSet::from([
                "BTCUSDT".to_string(),
                "ETHUSDT".to_string(),
                "ETHBTC".to_string()
            ])
        );
    }

    #[test]
    fn yields_zero_cycles_when_base_touches_nothing() {
        let pairs = vec![pair("BTCUSDT", "BTC", "USDT"), pair("ETHBTC", "ETH", "BTC")];
        let base = Asset::from("XRP");
        let topology = build(&pairs, &base);
        assert!(topology.cycles.is_empty());
        assert!(topology.subscriptions.is_empty());
    }

    #[test]
    fn skips_silently_when_no_middle_pair_exists() {
        let pairs = vec![
            pair("BTCUSDT", "BTC", "USDT"),
            pair("ETHUSDT", "ETH", "USDT"),
            // no ETHBTC pair: no middle exists, so no cycle should form
        ];
        let base = Asset::from("USDT");
        let topology = build(&pairs, &base);
        assert!(topology.cycles.is_empty());
        assert!(topology.subscriptions.is_empty());
    }
}
