// ═══════════════════════════════════════════════════════════════════
// Cache Tests — CatalogCache window/dedup/search, DetailCache TTL
// ═══════════════════════════════════════════════════════════════════

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use coin_watch_core::cache::catalog::select_window;
use coin_watch_core::cache::{CatalogCache, DetailCache};
use coin_watch_core::errors::CoreError;
use coin_watch_core::models::coin::{Coin, RawCoin};
use coin_watch_core::models::detail::CoinDetail;
use coin_watch_core::scheduler::TokioScheduler;

const TTL: Duration = Duration::from_millis(120_000);

/// Upstream list of `n` coins where every `dup_every`-th entry repeats the
/// previous symbol.
fn upstream(n: usize, dup_every: usize) -> Vec<RawCoin> {
    let mut out = Vec::with_capacity(n);
    let mut sym = 0usize;
    for i in 0..n {
        if i > 0 && dup_every > 0 && i % dup_every == 0 {
            out.push(RawCoin::new(format!("dup-{i}"), format!("s{sym}"), format!("Dup {i}")));
        } else {
            sym += 1;
            out.push(RawCoin::new(format!("coin-{i}"), format!("s{sym}"), format!("Coin {i}")));
        }
    }
    out
}

fn detail(id: &str, usd: f64) -> CoinDetail {
    CoinDetail::from_quotes(id, Some(usd), Some(usd), Some(usd), format!("{id}.png"))
}

// ═══════════════════════════════════════════════════════════════════
// Catalog window
// ═══════════════════════════════════════════════════════════════════

mod catalog_window {
    use super::*;

    #[test]
    fn no_two_entries_share_a_symbol() {
        let raw = upstream(2_000, 7);
        let coins = select_window(&raw, 750, 100);
        let symbols: HashSet<_> = coins.iter().map(|c| c.symbol.clone()).collect();
        assert_eq!(symbols.len(), coins.len());
    }

    #[test]
    fn window_stays_full_despite_duplicates() {
        for dup_every in [2, 3, 5, 10, 0] {
            let raw = upstream(2_000, dup_every);
            assert_eq!(select_window(&raw, 750, 100).len(), 100, "dup_every={dup_every}");
        }
    }

    #[test]
    fn keeps_relative_order() {
        let raw = upstream(1_000, 4);
        let coins = select_window(&raw, 750, 100);
        let positions: Vec<usize> = coins
            .iter()
            .map(|c| raw.iter().position(|r| r.id == c.id).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(positions[0], 750);
    }

    #[test]
    fn runs_of_three_collapse_to_one() {
        let raw = vec![
            RawCoin::new("a1", "a", "A"),
            RawCoin::new("a2", "a", "A"),
            RawCoin::new("a3", "a", "A"),
            RawCoin::new("b1", "b", "B"),
        ];
        let ids: Vec<_> = select_window(&raw, 0, 2).into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["a1", "b1"]);
    }

    #[test]
    fn load_replaces_previous_contents() {
        let mut cache = CatalogCache::new();
        cache.load(&upstream(50, 0), 0, 10);
        assert_eq!(cache.len(), 10);
        cache.load(&upstream(50, 0), 40, 10);
        assert_eq!(cache.len(), 10);
        assert!(cache.find_by_id("coin-0").is_none());
        assert!(cache.find_by_id("coin-45").is_some());
    }
}

// ═══════════════════════════════════════════════════════════════════
// Catalog lookup and search
// ═══════════════════════════════════════════════════════════════════

mod catalog_search {
    use super::*;

    fn cache() -> CatalogCache {
        CatalogCache::from_coins(vec![
            Coin::new("bitcoin", "btc", "Bitcoin"),
            Coin::new("ethereum", "eth", "Ethereum"),
            Coin::new("ripple", "xrp", "XRP"),
        ])
    }

    #[test]
    fn lookup_by_id_and_symbol() {
        let c = cache();
        assert_eq!(c.find_by_id("ethereum").unwrap().symbol, "eth");
        assert_eq!(c.find_by_symbol("XRP").unwrap().id, "ripple");
        assert!(c.contains_id("bitcoin"));
        assert!(!c.contains_id("btc"));
    }

    #[test]
    fn empty_and_blank_queries_are_invalid() {
        let c = cache();
        for query in ["", "   ", "\t\n"] {
            assert!(matches!(c.search(query), Err(CoreError::InvalidInput(_))));
        }
    }

    #[test]
    fn present_symbol_returns_that_coin() {
        let c = cache();
        assert_eq!(c.search("eth").unwrap().id, "ethereum");
        assert_eq!(c.search("  BTC ").unwrap().id, "bitcoin");
    }

    #[test]
    fn absent_symbol_is_not_found() {
        let c = cache();
        match c.search("doge") {
            Err(CoreError::NotFound(q)) => assert_eq!(q, "doge"),
            other => panic!("Expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn empty_catalog_finds_nothing() {
        assert!(matches!(
            CatalogCache::new().search("btc"),
            Err(CoreError::NotFound(_))
        ));
    }
}

// ═══════════════════════════════════════════════════════════════════
// DetailCache TTL
// ═══════════════════════════════════════════════════════════════════

mod detail_ttl {
    use super::*;

    fn new_cache() -> DetailCache {
        DetailCache::new(TTL, Arc::new(TokioScheduler))
    }

    #[tokio::test(start_paused = true)]
    async fn present_before_ttl() {
        let cache = new_cache();
        cache.put(detail("bitcoin", 1.0));

        tokio::time::sleep(TTL - Duration::from_millis(1)).await;
        assert_eq!(cache.get("bitcoin").unwrap().usd, 1.0);
    }

    #[tokio::test(start_paused = true)]
    async fn absent_at_ttl() {
        let cache = new_cache();
        cache.put(detail("bitcoin", 1.0));

        tokio::time::sleep(TTL).await;
        assert!(cache.get("bitcoin").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn timer_purges_without_reads() {
        let cache = new_cache();
        cache.put(detail("bitcoin", 1.0));
        assert_eq!(cache.len(), 1);

        tokio::time::sleep(TTL + Duration::from_millis(1)).await;
        assert_eq!(cache.len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn reads_do_not_extend_life() {
        let cache = new_cache();
        cache.put(detail("bitcoin", 1.0));
        for _ in 0..11 {
            tokio::time::sleep(Duration::from_secs(10)).await;
            assert!(cache.get("bitcoin").is_some());
        }
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(cache.get("bitcoin").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn replacement_restarts_clock_for_new_record_only() {
        let cache = new_cache();
        cache.put(detail("bitcoin", 1.0));
        tokio::time::sleep(Duration::from_secs(60)).await;
        cache.put(detail("bitcoin", 2.0));

        // First record's deadline passes; the replacement must survive it.
        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(cache.get("bitcoin").unwrap().usd, 2.0);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert!(cache.get("bitcoin").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn invalidate_removes_now() {
        let cache = new_cache();
        cache.put(detail("bitcoin", 1.0));
        assert!(cache.invalidate("bitcoin"));
        assert!(!cache.invalidate("bitcoin"));
        assert!(cache.get("bitcoin").is_none());

        // A fresh record put after invalidation keeps its own full TTL.
        tokio::time::sleep(Duration::from_secs(30)).await;
        cache.put(detail("bitcoin", 3.0));
        tokio::time::sleep(Duration::from_secs(100)).await;
        assert_eq!(cache.get("bitcoin").unwrap().usd, 3.0);
    }

    #[tokio::test(start_paused = true)]
    async fn entries_expire_independently() {
        let cache = new_cache();
        cache.put(detail("bitcoin", 1.0));
        tokio::time::sleep(Duration::from_secs(60)).await;
        cache.put(detail("ethereum", 2.0));

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert!(cache.get("bitcoin").is_none());
        assert!(cache.get("ethereum").is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn clear_empties_cache() {
        let cache = new_cache();
        cache.put(detail("a", 1.0));
        cache.put(detail("b", 1.0));
        cache.clear();
        assert!(cache.is_empty());
    }
}
