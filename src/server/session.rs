//! One client connection's scan session.
//!
//! Lifecycle: `IDLE -> SCANNING(i/N) -> ALLOCATING -> COOLDOWN -> SCANNING ...`
//! until the control stream ends or the event channel closes (`CLOSED`).
//!
//! The scan loop and the control loop run concurrently under one `select!`.
//! They share only the active strategy and the outbound event channel. The
//! strategy lock is held only for the synchronous scan of one symbol, so a
//! reconfiguration lands between two symbol evaluations and never inside one,
//! and never waits on a provider request. A `stock_update` whose evaluation
//! finished before a switch may still be queued after the confirmation; it
//! reflects the strategy that was active when it was evaluated. Dropping the session
//! future cancels whichever loop is still pending at its current await point;
//! a cycle cut short this way emits no summary.

use futures_util::{Stream, StreamExt};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, instrument, warn};

use super::protocol::{ControlMessage, ServerEvent, StockUpdate};
use crate::alerts::{LogNotifier, Notifier};
use crate::config::{AlertConfig, Config};
use crate::error::{ScanError, TransportError};
use crate::market::MarketDataProvider;
use crate::signals::{create_strategy, Signal, Strategy};
use crate::strategy::{Allocation, CapitalAllocator, MarketScanner, ScanResult};
use crate::utils::round_display;

/// The strategy instance owned by one session.
pub type ActiveStrategy = Mutex<Box<dyn Strategy>>;

/// Per-connection scan engine. Holds no state that outlives a connection.
pub struct ScanSession {
    provider: Arc<dyn MarketDataProvider>,
    scanner: MarketScanner,
    allocator: CapitalAllocator,
    total_capital: Decimal,
    universe: Arc<[String]>,
    symbol_delay: Duration,
    cycle_cooldown: Duration,
    alerts: AlertConfig,
}

impl ScanSession {
    pub fn new(provider: Arc<dyn MarketDataProvider>, config: &Config) -> Self {
        Self {
            provider,
            scanner: MarketScanner::new(config.scanner.clone()),
            allocator: CapitalAllocator::new(config.capital.clone()),
            total_capital: config.capital.total_capital,
            universe: config.universe.clone().into(),
            symbol_delay: Duration::from_millis(config.server.symbol_delay_ms),
            cycle_cooldown: Duration::from_secs(config.server.cycle_cooldown_secs),
            alerts: config.alerts.clone(),
        }
    }

    /// Drive the session until the client goes away.
    ///
    /// Returns `Ok` when the control stream ends and `Err` when the event
    /// channel is closed underneath it.
    pub async fn run<C>(
        &self,
        initial: Box<dyn Strategy>,
        control: C,
        events: mpsc::Sender<ServerEvent>,
    ) -> Result<(), TransportError>
    where
        C: Stream<Item = String> + Unpin + Send,
    {
        info!(
            provider = self.provider.name(),
            symbols = self.universe.len(),
            strategy = %initial.kind(),
            "📡 Session started"
        );

        emit(&events, ServerEvent::strategies_list()).await?;

        let strategy: ActiveStrategy = Mutex::new(initial);
        let outcome = tokio::select! {
            res = self.scan_loop(&strategy, &events) => res,
            res = control_loop(control, &strategy, &events) => res,
        };

        info!("Session closed");
        outcome
    }

    async fn scan_loop(
        &self,
        strategy: &ActiveStrategy,
        events: &mpsc::Sender<ServerEvent>,
    ) -> Result<(), TransportError> {
        let mut notifier = LogNotifier::new(&self.alerts);
        let mut cycle: u64 = 0;

        loop {
            cycle += 1;
            self.run_cycle(cycle, strategy, events, &mut notifier).await?;

            debug!(cycle, cooldown_secs = self.cycle_cooldown.as_secs(), "Cooling down");
            tokio::time::sleep(self.cycle_cooldown).await;
        }
    }

    /// One full pass over the universe followed by allocation and a summary.
    #[instrument(skip(self, strategy, events, notifier))]
    pub async fn run_cycle(
        &self,
        cycle: u64,
        strategy: &ActiveStrategy,
        events: &mpsc::Sender<ServerEvent>,
        notifier: &mut dyn Notifier,
    ) -> Result<Vec<Allocation>, TransportError> {
        let total = self.universe.len();
        let mut results = Vec::new();

        for (index, symbol) in self.universe.iter().enumerate() {
            emit(events, ServerEvent::scanning(symbol, index + 1, total)).await?;

            if let Some(result) = self.scan_symbol(symbol, strategy, events, notifier).await? {
                results.push(result);
            }

            tokio::time::sleep(self.symbol_delay).await;
        }

        let allocations = self.allocator.allocate(&results);
        let current = strategy.lock().await.kind();

        info!(
            cycle,
            scanned = total,
            results = results.len(),
            buys = results.iter().filter(|r| r.signal == Signal::Buy).count(),
            trades = allocations.len(),
            strategy = %current,
            "📊 Cycle complete"
        );

        emit(events, ServerEvent::summary(self.total_capital, &allocations, current)).await?;
        Ok(allocations)
    }

    /// Fetch, classify and report one symbol. Data and provider problems skip
    /// the symbol; only a closed event channel is an error.
    async fn scan_symbol(
        &self,
        symbol: &str,
        strategy: &ActiveStrategy,
        events: &mpsc::Sender<ServerEvent>,
        notifier: &mut dyn Notifier,
    ) -> Result<Option<ScanResult>, TransportError> {
        let snapshot = match self.provider.fetch(symbol).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(symbol, error = %e, "Skipped: fetch failed");
                return Ok(None);
            }
        };

        // Only the pure scan step runs under the lock.
        let scanned = {
            let mut active = strategy.lock().await;
            self.scanner.scan(&snapshot, Some(active.as_mut()))
        };

        let mut result = match scanned {
            Ok(result) => result,
            Err(ScanError::DataUnavailable { have, need, .. }) => {
                debug!(symbol, have, need, "Skipped: insufficient history");
                return Ok(None);
            }
            Err(e) => {
                warn!(symbol, error = %e, "Skipped: scan failed");
                return Ok(None);
            }
        };

        if result.signal == Signal::Buy && result.headline.is_none() {
            match self.provider.latest_headline(symbol).await {
                Ok(headline) => result.headline = headline,
                Err(e) => debug!(symbol, error = %e, "Headline lookup failed"),
            }
        }

        if result.is_actionable() {
            notifier.notify(symbol, &alert_message(&result));
        }

        emit(events, ServerEvent::StockUpdate(StockUpdate::from(&result))).await?;

        Ok(Some(result))
    }
}

/// Apply control frames until the client stops sending.
async fn control_loop<C>(
    mut control: C,
    strategy: &ActiveStrategy,
    events: &mpsc::Sender<ServerEvent>,
) -> Result<(), TransportError>
where
    C: Stream<Item = String> + Unpin,
{
    while let Some(text) = control.next().await {
        apply_control(&text, strategy, events).await?;
    }

    info!("Control stream ended");
    Ok(())
}

/// Handle one control frame.
///
/// A bad name or bad parameters is answered with `strategy_update_rejected`
/// and leaves the active strategy untouched. A good one replaces the instance
/// wholesale, discarding its running state, and is confirmed while the lock is
/// still held so the confirmation precedes any result from the new strategy.
pub async fn apply_control(
    text: &str,
    strategy: &ActiveStrategy,
    events: &mpsc::Sender<ServerEvent>,
) -> Result<(), TransportError> {
    let (name, params) = match ControlMessage::parse(text) {
        Ok(ControlMessage::StrategyUpdate {
            strategy_name,
            config,
        }) => (strategy_name, config),
        Err(e) => {
            warn!(error = %e, "Rejected control message");
            return emit(events, ServerEvent::rejected("", &e)).await;
        }
    };

    let replacement = match create_strategy(&name, &params) {
        Ok(replacement) => replacement,
        Err(e) => {
            warn!(strategy = %name, error = %e, "Rejected strategy update");
            return emit(events, ServerEvent::rejected(name, &e)).await;
        }
    };

    let kind = replacement.kind();
    let mut active = strategy.lock().await;
    let previous = active.kind();
    *active = replacement;

    info!(from = %previous, to = %kind, params = %params, "🔄 Strategy switched");
    emit(events, ServerEvent::StrategyUpdateConfirmation { strategy: kind }).await
}

async fn emit(events: &mpsc::Sender<ServerEvent>, event: ServerEvent) -> Result<(), TransportError> {
    events
        .send(event)
        .await
        .map_err(|_| TransportError::ChannelClosed)
}

fn alert_message(result: &ScanResult) -> String {
    let mut message = format!(
        "{} {} at {} ({}%, RVOL {}x)",
        result.signal,
        result.symbol,
        round_display(result.price),
        round_display(result.pct_change),
        round_display(result.rvol),
    );
    if let Some(p) = &result.proposal {
        message.push_str(&format!(
            " stop {} target {}",
            round_display(p.stop_loss),
            round_display(p.target)
        ));
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CapitalConfig, ServerConfig};
    use crate::error::ProviderError;
    use crate::market::{Bar, BarSeries, MarketSnapshot, MockMarketData, MockMarketDataProvider};
    use crate::signals::StrategyKind;
    use chrono::{Duration as ChronoDuration, TimeZone, Utc};
    use rust_decimal_macros::dec;
    use tokio::task::JoinHandle;

    // =========================================================================
    // Test Helpers
    // =========================================================================

    fn make_config(universe: &[&str]) -> Config {
        Config {
            universe: universe.iter().map(|s| s.to_string()).collect(),
            server: ServerConfig {
                symbol_delay_ms: 10,
                cycle_cooldown_secs: 5,
                ..ServerConfig::default()
            },
            capital: CapitalConfig {
                total_capital: dec!(10000),
                max_positions: 3,
                max_trade_value: dec!(5000),
                min_trade_value: dec!(500),
            },
            ..Config::default()
        }
    }

    /// 29 flat daily bars at 100, then a 115 close on 10x volume.
    fn breakout_snapshot(symbol: &str) -> MarketSnapshot {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let bars = (0..30)
            .map(|d| {
                let (close, volume) = if d == 29 {
                    (dec!(115), dec!(10000))
                } else {
                    (dec!(100), dec!(1000))
                };
                Bar {
                    timestamp: start + ChronoDuration::days(d),
                    open: close,
                    high: close,
                    low: close,
                    close,
                    volume,
                }
            })
            .collect();
        MarketSnapshot::new(BarSeries::new(symbol, bars))
    }

    /// Fifteen daily bars stamped at the 14:30 UTC open. The last six form a
    /// bull flag: pole to 10.6, highs 10.9 > 10.8 > 10.7, breakout close 10.8.
    fn daily_flag_snapshot(symbol: &str) -> MarketSnapshot {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 14, 30, 0).unwrap();
        let mut rows = vec![(dec!(10), dec!(10.1), dec!(9.9), dec!(10), dec!(1000)); 10];
        rows.extend([
            (dec!(10), dec!(10.7), dec!(10), dec!(10.6), dec!(9000)),
            (dec!(10.6), dec!(10.9), dec!(10.4), dec!(10.5), dec!(4000)),
            (dec!(10.5), dec!(10.8), dec!(10.3), dec!(10.4), dec!(3000)),
            (dec!(10.4), dec!(10.7), dec!(10.35), dec!(10.5), dec!(2000)),
            (dec!(10.5), dec!(10.9), dec!(10.5), dec!(10.8), dec!(20000)),
        ]);
        let bars = rows
            .into_iter()
            .enumerate()
            .map(|(d, (open, high, low, close, volume))| Bar {
                timestamp: start + ChronoDuration::days(d as i64),
                open,
                high,
                low,
                close,
                volume,
            })
            .collect();
        MarketSnapshot::new(BarSeries::new(symbol, bars))
    }

    async fn make_provider(symbols: &[&str]) -> MockMarketData {
        let provider = MockMarketData::new();
        for symbol in symbols {
            provider.set_snapshot(breakout_snapshot(symbol)).await;
        }
        provider
    }

    struct Harness {
        control: mpsc::Sender<String>,
        events: mpsc::Receiver<ServerEvent>,
        handle: JoinHandle<Result<(), TransportError>>,
    }

    fn start(provider: MockMarketData, config: &Config, initial: &str) -> Harness {
        let session = ScanSession::new(Arc::new(provider), config);
        let strategy = create_strategy(initial, &serde_json::Value::Null).unwrap();
        let (control_tx, control_rx) = mpsc::channel::<String>(8);
        let (events_tx, events_rx) = mpsc::channel(64);

        let control = Box::pin(futures_util::stream::unfold(control_rx, |mut rx| async move {
            rx.recv().await.map(|msg| (msg, rx))
        }));

        let handle = tokio::spawn(async move { session.run(strategy, control, events_tx).await });

        Harness {
            control: control_tx,
            events: events_rx,
            handle,
        }
    }

    async fn next_event(events: &mut mpsc::Receiver<ServerEvent>) -> ServerEvent {
        events.recv().await.expect("event stream ended")
    }

    /// Collect events up to and including the next summary.
    async fn until_summary(events: &mut mpsc::Receiver<ServerEvent>) -> Vec<ServerEvent> {
        let mut seen = Vec::new();
        loop {
            let event = next_event(events).await;
            let done = matches!(event, ServerEvent::Summary(_));
            seen.push(event);
            if done {
                return seen;
            }
        }
    }

    fn stock_updates(events: &[ServerEvent]) -> Vec<&StockUpdate> {
        events
            .iter()
            .filter_map(|e| match e {
                ServerEvent::StockUpdate(update) => Some(update),
                _ => None,
            })
            .collect()
    }

    fn strategy_update(name: &str) -> String {
        format!(r#"{{"type":"strategy_update","strategy_name":"{name}","config":{{}}}}"#)
    }

    // =========================================================================
    // Cycle Tests
    // =========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_full_cycle_event_order() {
        let provider = make_provider(&["AAA", "BBB"]).await;
        let mut h = start(provider, &make_config(&["AAA", "BBB"]), "bull_flag");

        assert!(matches!(
            next_event(&mut h.events).await,
            ServerEvent::StrategiesList { .. }
        ));
        let events = until_summary(&mut h.events).await;

        assert_eq!(events.len(), 5);
        assert_eq!(events[0], ServerEvent::scanning("AAA", 1, 2));
        assert!(matches!(&events[1], ServerEvent::StockUpdate(u) if u.symbol == "AAA"));
        assert_eq!(events[2], ServerEvent::scanning("BBB", 2, 2));
        assert!(matches!(&events[3], ServerEvent::StockUpdate(u) if u.symbol == "BBB"));

        let ServerEvent::Summary(summary) = &events[4] else {
            panic!("expected summary, got {:?}", events[4]);
        };
        assert_eq!(summary.current_strategy, StrategyKind::BullFlag);
        assert_eq!(summary.suggested_trades.len(), 2);
        assert_eq!(summary.suggested_trades[0].quantity, 43);
        assert_eq!(summary.suggested_trades[0].trade_value, dec!(4945));
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_config_signals_on_daily_bars() {
        let config = Config {
            universe: vec!["FLAG".to_string()],
            ..Config::default()
        };
        let provider = MockMarketData::new();
        provider.set_snapshot(daily_flag_snapshot("FLAG")).await;
        let mut h = start(provider, &config, &config.strategy.name);

        next_event(&mut h.events).await;
        let events = until_summary(&mut h.events).await;

        let updates = stock_updates(&events);
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].signal, Signal::Buy);
        assert_eq!(updates[0].strategy, Some(StrategyKind::BullFlag));
        let proposal = updates[0].trade.as_ref().expect("strategy should propose");
        assert_eq!(proposal.stop_loss, dec!(10.3));
        assert_eq!(proposal.target, dec!(11.8));

        let ServerEvent::Summary(summary) = events.last().unwrap() else {
            panic!("expected summary");
        };
        assert_eq!(summary.suggested_trades.len(), 1);
        assert_eq!(summary.suggested_trades[0].symbol, "FLAG");
    }

    #[tokio::test(start_paused = true)]
    async fn test_provider_failure_skips_only_that_symbol() {
        let provider = make_provider(&["AAA", "BBB"]).await;
        provider.fail_symbol("X").await;
        let mut h = start(provider, &make_config(&["AAA", "X", "BBB"]), "bull_flag");

        next_event(&mut h.events).await;
        let events = until_summary(&mut h.events).await;

        let symbols: Vec<&str> = stock_updates(&events).iter().map(|u| u.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["AAA", "BBB"]);

        let ServerEvent::Summary(summary) = events.last().unwrap() else {
            panic!("expected summary");
        };
        let traded: Vec<&str> = summary
            .suggested_trades
            .iter()
            .map(|t| t.symbol.as_str())
            .collect();
        assert_eq!(traded, vec!["AAA", "BBB"]);
    }

    // =========================================================================
    // Reconfiguration Tests
    // =========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_unknown_strategy_rejected_previous_keeps_working() {
        let provider = make_provider(&["AAA"]).await;
        let mut h = start(provider, &make_config(&["AAA"]), "mean_reversion");

        next_event(&mut h.events).await;
        until_summary(&mut h.events).await;

        h.control.send(strategy_update("moonshot")).await.unwrap();
        assert_eq!(
            next_event(&mut h.events).await,
            ServerEvent::StrategyUpdateRejected {
                strategy: "moonshot".to_string(),
                error: "Unknown strategy: moonshot".to_string(),
            }
        );

        let events = until_summary(&mut h.events).await;
        let updates = stock_updates(&events);
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].signal, Signal::Sell);
        assert_eq!(updates[0].strategy, Some(StrategyKind::MeanReversion));

        let ServerEvent::Summary(summary) = events.last().unwrap() else {
            panic!("expected summary");
        };
        assert_eq!(summary.current_strategy, StrategyKind::MeanReversion);
        assert!(summary.suggested_trades.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_malformed_control_is_rejected() {
        let provider = make_provider(&["AAA"]).await;
        let mut h = start(provider, &make_config(&["AAA"]), "orb");

        next_event(&mut h.events).await;
        until_summary(&mut h.events).await;

        h.control.send("{not json".to_string()).await.unwrap();
        assert!(matches!(
            next_event(&mut h.events).await,
            ServerEvent::StrategyUpdateRejected { .. }
        ));
        assert!(!h.handle.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_mid_cycle_switch_leaves_earlier_results_alone() {
        let provider = make_provider(&["AAA", "BBB", "CCC"]).await;
        let mut h = start(provider, &make_config(&["AAA", "BBB", "CCC"]), "bull_flag");

        next_event(&mut h.events).await;
        assert_eq!(next_event(&mut h.events).await, ServerEvent::scanning("AAA", 1, 3));
        let first = next_event(&mut h.events).await;

        h.control
            .send(strategy_update("mean_reversion"))
            .await
            .unwrap();
        let rest = until_summary(&mut h.events).await;

        let ServerEvent::StockUpdate(first) = first else {
            panic!("expected stock_update, got {:?}", first);
        };
        assert_eq!(first.symbol, "AAA");
        assert_eq!(first.signal, Signal::Buy);
        assert_eq!(first.strategy, None);

        assert_eq!(
            rest[0],
            ServerEvent::StrategyUpdateConfirmation {
                strategy: StrategyKind::MeanReversion
            }
        );
        let later = stock_updates(&rest);
        assert_eq!(later.len(), 2);
        assert!(later
            .iter()
            .all(|u| u.signal == Signal::Sell && u.strategy == Some(StrategyKind::MeanReversion)));

        let ServerEvent::Summary(summary) = rest.last().unwrap() else {
            panic!("expected summary");
        };
        assert_eq!(summary.current_strategy, StrategyKind::MeanReversion);
        assert_eq!(summary.suggested_trades.len(), 1);
        assert_eq!(summary.suggested_trades[0].symbol, "AAA");
    }

    #[tokio::test(start_paused = true)]
    async fn test_switch_does_not_wait_for_headline_lookup() {
        let provider = make_provider(&["AAA", "BBB"])
            .await
            .with_headline_latency(Duration::from_secs(10));
        provider.set_headline("AAA", "AAA beats estimates").await;
        let mut h = start(provider, &make_config(&["AAA", "BBB"]), "bull_flag");

        next_event(&mut h.events).await;
        assert_eq!(next_event(&mut h.events).await, ServerEvent::scanning("AAA", 1, 2));

        let sent_at = tokio::time::Instant::now();
        h.control
            .send(strategy_update("mean_reversion"))
            .await
            .unwrap();

        assert_eq!(
            next_event(&mut h.events).await,
            ServerEvent::StrategyUpdateConfirmation {
                strategy: StrategyKind::MeanReversion
            }
        );
        assert!(sent_at.elapsed() < Duration::from_secs(1));

        let ServerEvent::StockUpdate(update) = next_event(&mut h.events).await else {
            panic!("expected stock_update for AAA");
        };
        assert_eq!(update.symbol, "AAA");
        assert_eq!(update.signal, Signal::Buy);
        assert_eq!(update.headline.as_deref(), Some("AAA beats estimates"));
        assert!(sent_at.elapsed() >= Duration::from_secs(10));
    }

    // =========================================================================
    // Shutdown Tests
    // =========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_disconnect_mid_cycle_emits_no_summary() {
        let provider = make_provider(&["AAA", "BBB"])
            .await
            .with_latency(Duration::from_secs(1));
        let probe = provider.clone();
        let mut h = start(provider, &make_config(&["AAA", "BBB"]), "orb");

        next_event(&mut h.events).await;
        assert_eq!(next_event(&mut h.events).await, ServerEvent::scanning("AAA", 1, 2));

        drop(h.control);
        assert!(h.handle.await.unwrap().is_ok());

        let mut remaining = Vec::new();
        while let Some(event) = h.events.recv().await {
            remaining.push(event);
        }
        assert!(remaining.is_empty(), "unexpected events: {:?}", remaining);
        assert_eq!(probe.fetch_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_event_channel_ends_session() {
        let provider = make_provider(&["AAA"]).await;
        let h = start(provider, &make_config(&["AAA"]), "orb");

        drop(h.events);
        let outcome = h.handle.await.unwrap();
        assert!(matches!(outcome, Err(TransportError::ChannelClosed)));
    }

    // =========================================================================
    // Provider Fault Injection
    // =========================================================================

    #[tokio::test]
    async fn test_cycle_with_mocked_provider() {
        let mut provider = MockMarketDataProvider::new();
        provider.expect_fetch().returning(|symbol| match symbol {
            "ERR" => Err(ProviderError::Status {
                status: 503,
                body: "unavailable".to_string(),
            }),
            _ => Ok(breakout_snapshot(symbol)),
        });
        provider
            .expect_latest_headline()
            .times(1)
            .returning(|symbol| Ok(Some(format!("{symbol} halted for news"))));

        let mut config = make_config(&["ERR", "GOOD"]);
        config.server.symbol_delay_ms = 0;
        let session = ScanSession::new(Arc::new(provider), &config);
        let strategy: ActiveStrategy =
            Mutex::new(create_strategy("bull_flag", &serde_json::Value::Null).unwrap());
        let (events_tx, mut events_rx) = mpsc::channel(16);
        let mut notifier = LogNotifier::new(&config.alerts);

        let allocations = session
            .run_cycle(1, &strategy, &events_tx, &mut notifier)
            .await
            .unwrap();

        assert_eq!(allocations.len(), 1);
        assert_eq!(allocations[0].symbol, "GOOD");

        drop(events_tx);
        let mut events = Vec::new();
        while let Some(event) = events_rx.recv().await {
            events.push(event);
        }
        let updates = stock_updates(&events);
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].headline.as_deref(), Some("GOOD halted for news"));
    }

    #[test]
    fn test_alert_message_mentions_levels() {
        let result = ScanResult {
            symbol: "AAA".to_string(),
            price: dec!(115),
            pct_change: dec!(15),
            rvol: dec!(10),
            signal: Signal::Buy,
            proposal: None,
            strategy: None,
            float_shares: None,
            headline: None,
        };
        assert_eq!(alert_message(&result), "BUY AAA at 115 (15%, RVOL 10x)");
    }
}
