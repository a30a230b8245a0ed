mod common;

use polyalarm::models::{Alert, Direction};

use common::{make_trade, make_whale_trade, test_pipeline, MARKET_ID};

#[test]
fn test_whale_trade_emits_alert() {
    let mut pipeline = test_pipeline();

    let alerts = pipeline.process_trade_event(&make_whale_trade("0xtx1", 10_000.0, 0.5, 1_000.0));

    assert_eq!(alerts.len(), 1);
    let Alert::Whale(whale) = &alerts[0] else {
        panic!("expected whale alert, got {:?}", alerts[0]);
    };
    assert_eq!(whale.size_usd, 5_000.0);
    assert_eq!(whale.market_title, "Will the Fed cut rates in March?");
    assert_eq!(whale.outcome_name, "Yes");
    assert_eq!(whale.wallet, "0x9d84…1344");
}

#[test]
fn test_replayed_transaction_alerts_once() {
    let mut pipeline = test_pipeline();
    let trade = make_whale_trade("0xtx1", 10_000.0, 0.5, 1_000.0);

    let first = pipeline.process_trade_event(&trade);
    assert_eq!(first.len(), 1);

    // Same hash long after the cooldown has expired
    let replay = make_whale_trade("0xtx1", 10_000.0, 0.5, 100_000.0);
    let second = pipeline.process_trade_event(&replay);
    assert!(second.iter().all(|a| !matches!(a, Alert::Whale(_))));
}

#[test]
fn test_whale_cooldown_is_per_market() {
    let mut pipeline = test_pipeline();

    assert_eq!(
        pipeline
            .process_trade_event(&make_whale_trade("0xa", 10_000.0, 0.5, 0.0))
            .len(),
        1
    );

    // Different transaction inside the cooldown: suppressed
    let suppressed = pipeline.process_trade_event(&make_whale_trade("0xb", 10_000.0, 0.5, 100.0));
    assert!(suppressed.is_empty());

    // Another market is unaffected
    let mut other = make_whale_trade("0xc", 10_000.0, 0.5, 100.0);
    other.condition_id = "0xunknown".into();
    assert!(pipeline.process_trade_event(&other).is_empty(), "unknown market must be skipped");

    let after = pipeline.process_trade_event(&make_whale_trade("0xd", 10_000.0, 0.5, 300.0));
    assert_eq!(after.len(), 1);
    assert!(pipeline.whale().cooldown_until(MARKET_ID).unwrap() >= 300.0);
}

#[test]
fn test_squeeze_up_alert() {
    let mut pipeline = test_pipeline();

    assert!(pipeline.process_trade_event(&make_trade(0, 0.10, 0.0)).is_empty());
    let alerts = pipeline.process_trade_event(&make_trade(0, 0.16, 5.0));

    assert_eq!(alerts.len(), 1);
    let Alert::PriceMove(m) = &alerts[0] else {
        panic!("expected price move, got {:?}", alerts[0]);
    };
    assert_eq!(m.direction, Direction::Up);
    assert_eq!(m.duration_sec, 5);
    assert_eq!(m.price_old, 0.10);
    assert_eq!(m.price_new, 0.16);
    assert!((m.percent_change - 60.0).abs() < 1e-9);
}

#[test]
fn test_squeeze_cooldown_suppresses_repeat() {
    let mut pipeline = test_pipeline();

    pipeline.process_trade_event(&make_trade(0, 0.10, 0.0));
    assert_eq!(pipeline.process_trade_event(&make_trade(0, 0.16, 5.0)).len(), 1);

    // Same move repeated at t=6, inside the 300s cooldown
    assert!(pipeline.process_trade_event(&make_trade(0, 0.16, 6.0)).is_empty());
    assert_eq!(pipeline.squeeze().cooldown_until(MARKET_ID, 0), Some(305.0));
}

#[test]
fn test_stale_point_trimmed_before_comparison() {
    let mut pipeline = test_pipeline();

    pipeline.process_trade_event(&make_trade(0, 0.10, 0.0));
    // 61 - 0 > 60: the t=0 point is dropped, leaving a single point
    assert!(pipeline.process_trade_event(&make_trade(0, 0.50, 61.0)).is_empty());

    let window = pipeline.squeeze().window(MARKET_ID, 0);
    assert_eq!(window.len(), 1);
    assert_eq!(window[0].ts, 61.0);
}

#[test]
fn test_window_never_retains_stale_points() {
    let mut pipeline = test_pipeline();

    // Slow drift, well under the threshold between neighbours
    for step in 0..200u32 {
        let ts = f64::from(step) * 7.0;
        let price = 0.40 + f64::from(step % 5) * 0.001;
        pipeline.process_trade_event(&make_trade(1, price, ts));

        let window = pipeline.squeeze().window(MARKET_ID, 1);
        assert!(window.iter().all(|p| p.ts >= ts - 60.0));
        assert!(window.windows(2).all(|w| w[0].ts <= w[1].ts));
    }
}

#[test]
fn test_slow_drift_retriggers_after_cooldown() {
    let mut pipeline = test_pipeline();

    pipeline.process_trade_event(&make_trade(0, 0.40, 0.0));
    assert_eq!(pipeline.process_trade_event(&make_trade(0, 0.44, 30.0)).len(), 1);

    // Keep climbing inside the cooldown: nothing
    assert!(pipeline.process_trade_event(&make_trade(0, 0.48, 200.0)).is_empty());

    // Earlier points have slid out; by t=340 the cooldown (t=330) is over
    pipeline.process_trade_event(&make_trade(0, 0.50, 320.0));
    let alerts = pipeline.process_trade_event(&make_trade(0, 0.55, 340.0));
    assert_eq!(alerts.len(), 1);
    let Alert::PriceMove(m) = &alerts[0] else {
        panic!("expected price move");
    };
    assert_eq!(m.price_old, 0.50);
}

#[test]
fn test_one_trade_can_raise_both_alerts() {
    let mut pipeline = test_pipeline();

    pipeline.process_trade_event(&make_trade(0, 0.20, 0.0));
    let alerts = pipeline.process_trade_event(&make_whale_trade("0xbig", 50_000.0, 0.30, 10.0));

    assert_eq!(alerts.len(), 2);
    assert!(matches!(alerts[0], Alert::Whale(_)));
    assert!(matches!(alerts[1], Alert::PriceMove(_)));
}

#[test]
fn test_replay_into_fresh_pipeline_is_identical() {
    let mut events = Vec::new();
    for i in 0..120u32 {
        let ts = f64::from(i) * 4.0;
        let price = 0.30 + 0.05 * ((f64::from(i) / 6.0).sin());
        events.push(make_trade(i % 2, price, ts));
        if i % 9 == 0 {
            events.push(make_whale_trade(&format!("0x{:x}", i / 2), 20_000.0, price, ts));
        }
    }

    let run = |events: &[polyalarm::models::TradeEvent]| {
        let mut pipeline = test_pipeline();
        events
            .iter()
            .flat_map(|e| pipeline.process_trade_event(e))
            .collect::<Vec<_>>()
    };

    let first = run(&events);
    let second = run(&events);
    assert!(!first.is_empty());
    assert_eq!(first, second);
}
