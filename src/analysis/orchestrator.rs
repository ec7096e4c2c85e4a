use crate::api::MarketDataProvider;
use crate::error::BatchError;
use crate::models::{AnalysisResult, Granularity, SymbolOutcome, SymbolReport};
use crate::strategy::Strategy;
use futures::{Stream, StreamExt};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration};
use tracing::Instrument;
use uuid::Uuid;

/// Most symbols accepted in one batch
pub const MAX_BATCH_SYMBOLS: usize = 10;
/// Candles requested per symbol
pub const DEFAULT_WINDOW_SIZE: usize = 100;
/// Delay between consecutive symbols, keeps the provider from being hammered
pub const DEFAULT_PACING: Duration = Duration::from_millis(500);

/// A validated batch: 1..=MAX_BATCH_SYMBOLS non-blank, upper-cased symbols
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRequest {
    symbols: Vec<String>,
    granularity: Granularity,
}

impl BatchRequest {
    pub fn new<S: AsRef<str>>(symbols: &[S], granularity: Granularity) -> Result<Self, BatchError> {
        if symbols.is_empty() {
            return Err(BatchError::Empty {
                max: MAX_BATCH_SYMBOLS,
            });
        }

        if symbols.len() > MAX_BATCH_SYMBOLS {
            return Err(BatchError::TooMany {
                count: symbols.len(),
                max: MAX_BATCH_SYMBOLS,
            });
        }

        let symbols = symbols
            .iter()
            .enumerate()
            .map(|(index, symbol)| {
                let symbol = symbol.as_ref().trim();
                if symbol.is_empty() {
                    Err(BatchError::BlankSymbol { index: index + 1 })
                } else {
                    Ok(symbol.to_uppercase())
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            symbols,
            granularity,
        })
    }

    /// Build a request from comma-separated user input, e.g. `"btcusdt, ETHUSDT,"`
    ///
    /// Blank entries are skipped before the size check.
    pub fn parse(input: &str, granularity: Granularity) -> Result<Self, BatchError> {
        let symbols: Vec<&str> = input
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();

        Self::new(&symbols, granularity)
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }
}

/// Per-run knobs that do not affect validation
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOptions {
    pub window_size: usize,
    pub pacing: Duration,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            pacing: DEFAULT_PACING,
        }
    }
}

impl BatchOptions {
    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    /// Set the inter-symbol delay; zero falls back to the default
    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        if pacing.is_zero() {
            tracing::warn!(
                "Pacing delay cannot be zero, using {}ms",
                DEFAULT_PACING.as_millis()
            );
            self.pacing = DEFAULT_PACING;
        } else {
            self.pacing = pacing;
        }
        self
    }
}

/// Results of a running batch, one item per symbol in request order
///
/// Dropping the stream, or calling [`AnalysisStream::cancel`], stops the batch
/// before its next symbol. Results already produced stay readable.
pub struct AnalysisStream {
    batch_id: Uuid,
    receiver: mpsc::Receiver<SymbolReport>,
    handle: JoinHandle<()>,
}

impl AnalysisStream {
    pub fn batch_id(&self) -> Uuid {
        self.batch_id
    }

    pub fn cancel(&mut self) {
        self.receiver.close();
    }

    /// True once the producer has finished or stopped
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Stream for AnalysisStream {
    type Item = SymbolReport;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

/// Start analyzing a batch on a background task
///
/// Symbols are processed strictly one after another. A failed fetch yields a
/// `NoData` item, a short series an `InsufficientData` result; neither stops
/// the batch.
pub fn analyze_batch(
    provider: Arc<dyn MarketDataProvider>,
    strategy: Arc<dyn Strategy>,
    request: BatchRequest,
    options: BatchOptions,
) -> AnalysisStream {
    let batch_id = Uuid::new_v4();
    // Room for every result, so a slow consumer never stalls the producer
    let (sender, receiver) = mpsc::channel(request.symbols.len().max(1));

    let span = tracing::info_span!("batch", batch_id = %batch_id);
    let handle = tokio::spawn(
        run_batch(provider, strategy, request, options, sender).instrument(span),
    );

    AnalysisStream {
        batch_id,
        receiver,
        handle,
    }
}

/// Drain a batch into a vector, preserving order
pub async fn collect_batch(stream: AnalysisStream) -> Vec<SymbolReport> {
    stream.collect().await
}

async fn run_batch(
    provider: Arc<dyn MarketDataProvider>,
    strategy: Arc<dyn Strategy>,
    request: BatchRequest,
    options: BatchOptions,
    sender: mpsc::Sender<SymbolReport>,
) {
    tracing::info!(
        "Analyzing {} symbols ({}, {} candles, strategy {})",
        request.symbols.len(),
        request.granularity,
        options.window_size,
        strategy.name()
    );

    let mut emitted = 0;

    for (i, symbol) in request.symbols.iter().enumerate() {
        if i > 0 {
            sleep(options.pacing).await;
        }

        if sender.is_closed() {
            tracing::info!("Batch cancelled after {} of {} symbols", emitted, request.symbols.len());
            return;
        }

        let report = analyze_symbol(
            provider.as_ref(),
            strategy.as_ref(),
            symbol,
            request.granularity,
            options.window_size,
        )
        .await;

        if sender.send(report).await.is_err() {
            tracing::info!("Consumer went away, stopping batch");
            return;
        }
        emitted += 1;
    }

    tracing::info!("Batch complete: {} symbols", emitted);
}

async fn analyze_symbol(
    provider: &dyn MarketDataProvider,
    strategy: &dyn Strategy,
    symbol: &str,
    granularity: Granularity,
    window_size: usize,
) -> SymbolReport {
    let outcome = match provider.get_candles(symbol, granularity, window_size).await {
        Err(e) => {
            tracing::warn!(symbol = %symbol, "No data: {}", e);
            SymbolOutcome::NoData {
                reason: e.to_string(),
            }
        }
        Ok(series) => match strategy.analyze(&series) {
            Ok(result) => {
                tracing::info!(
                    symbol = %symbol,
                    trend = %result.trend,
                    signal = %result.signal,
                    "Analyzed"
                );
                SymbolOutcome::Analyzed(result)
            }
            Err(e) => {
                tracing::info!(symbol = %symbol, "Skipping analysis: {}", e);
                SymbolOutcome::Analyzed(AnalysisResult::insufficient_data())
            }
        },
    };

    SymbolReport {
        symbol: symbol.to_string(),
        outcome,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::models::{Candle, CandleSeries, TradeSignal, TrendLabel};
    use crate::strategy::TrendStrategy;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Serves canned series with per-symbol latency
    #[derive(Default)]
    struct MockProvider {
        series: HashMap<String, (usize, u64)>, // symbol -> (candle count, delay ms)
        calls: Mutex<Vec<String>>,
    }

    impl MockProvider {
        fn with(mut self, symbol: &str, candles: usize, delay_ms: u64) -> Self {
            self.series.insert(symbol.to_string(), (candles, delay_ms));
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MarketDataProvider for MockProvider {
        async fn get_candles(
            &self,
            symbol: &str,
            granularity: Granularity,
            limit: usize,
        ) -> Result<CandleSeries, FetchError> {
            self.calls.lock().unwrap().push(symbol.to_string());

            let (count, delay_ms) = self.series.get(symbol).copied().ok_or(FetchError::Api {
                code: -1121,
                msg: "Invalid symbol.".to_string(),
            })?;
            sleep(Duration::from_millis(delay_ms)).await;

            let start = Utc::now() - granularity.duration() * count as i32;
            let candles = (0..count.min(limit))
                .map(|i| {
                    let base = 100.0 + i as f64;
                    Candle {
                        timestamp: start + granularity.duration() * i as i32,
                        open: base,
                        high: base + 2.0,
                        low: base - 1.0,
                        close: base + 1.0,
                        volume: 1000.0,
                    }
                })
                .collect();

            Ok(CandleSeries::new(symbol, granularity, candles))
        }
    }

    fn fast_options() -> BatchOptions {
        BatchOptions::default().with_pacing(Duration::from_millis(5))
    }

    fn strategy() -> Arc<dyn Strategy> {
        Arc::new(TrendStrategy::default())
    }

    #[test]
    fn test_batch_size_bounds() {
        let symbols: Vec<String> = (0..11).map(|i| format!("SYM{}USDT", i)).collect();

        assert_eq!(
            BatchRequest::new(&symbols, Granularity::FourHours),
            Err(BatchError::TooMany { count: 11, max: 10 })
        );
        assert!(BatchRequest::new(&symbols[..10], Granularity::FourHours).is_ok());
        assert_eq!(
            BatchRequest::new::<&str>(&[], Granularity::FourHours),
            Err(BatchError::Empty { max: 10 })
        );
        assert_eq!(
            BatchRequest::new(&["BTCUSDT", " "], Granularity::FourHours),
            Err(BatchError::BlankSymbol { index: 2 })
        );
    }

    #[test]
    fn test_parse_user_input() {
        let request = BatchRequest::parse(" btcusdt, ethusdt ,,SOLUSDT ", Granularity::OneDay).unwrap();
        assert_eq!(request.symbols(), &["BTCUSDT", "ETHUSDT", "SOLUSDT"]);
        assert_eq!(request.granularity(), Granularity::OneDay);

        assert_eq!(
            BatchRequest::parse(" , ,", Granularity::OneDay),
            Err(BatchError::Empty { max: 10 })
        );
    }

    #[test]
    fn test_zero_pacing_uses_default() {
        let options = BatchOptions::default().with_pacing(Duration::ZERO);
        assert_eq!(options.pacing, DEFAULT_PACING);
    }

    #[tokio::test]
    async fn test_order_preserved_regardless_of_latency() {
        let provider = Arc::new(
            MockProvider::default()
                .with("AUSDT", 100, 60)
                .with("BUSDT", 100, 0)
                .with("CUSDT", 100, 30),
        );
        let request = BatchRequest::new(&["AUSDT", "BUSDT", "CUSDT"], Granularity::FourHours).unwrap();

        let results = collect_batch(analyze_batch(provider, strategy(), request, fast_options())).await;
        let symbols: Vec<&str> = results.iter().map(|r| r.symbol.as_str()).collect();

        assert_eq!(symbols, vec!["AUSDT", "BUSDT", "CUSDT"]);
    }

    #[tokio::test]
    async fn test_failed_fetch_does_not_abort_batch() {
        let provider = Arc::new(
            MockProvider::default()
                .with("BTCUSDT", 100, 0)
                .with("SOLUSDT", 100, 0),
        );
        let request =
            BatchRequest::new(&["BTCUSDT", "NOPEUSDT", "SOLUSDT"], Granularity::FourHours).unwrap();

        let results = collect_batch(analyze_batch(provider, strategy(), request, fast_options())).await;

        assert_eq!(results.len(), 3);
        assert!(results[0].analysis().is_some());
        assert!(results[1].is_no_data());
        assert!(results[2].analysis().is_some());
    }

    #[tokio::test]
    async fn test_short_series_is_insufficient_data() {
        let provider = Arc::new(MockProvider::default().with("NEWUSDT", 20, 0));
        let request = BatchRequest::new(&["NEWUSDT"], Granularity::OneDay).unwrap();

        let results = collect_batch(analyze_batch(provider, strategy(), request, fast_options())).await;
        let result = results[0].analysis().unwrap();

        assert_eq!(result.trend, TrendLabel::InsufficientData);
        assert_eq!(result.signal, TradeSignal::None);
    }

    #[tokio::test]
    async fn test_results_arrive_incrementally() {
        let provider = Arc::new(
            MockProvider::default()
                .with("AUSDT", 100, 0)
                .with("BUSDT", 100, 0),
        );
        let request = BatchRequest::new(&["AUSDT", "BUSDT"], Granularity::FourHours).unwrap();
        let options = BatchOptions::default().with_pacing(Duration::from_millis(300));

        let mut stream = analyze_batch(provider, strategy(), request, options);

        // First result must not wait for the paced second symbol
        let first = tokio::time::timeout(Duration::from_millis(200), stream.next())
            .await
            .expect("first result should stream before the batch ends")
            .unwrap();
        assert_eq!(first.symbol, "AUSDT");
        assert!(!stream.is_finished());

        let second = stream.next().await.unwrap();
        assert_eq!(second.symbol, "BUSDT");
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_cancel_stops_before_next_symbol() {
        let provider = Arc::new(
            MockProvider::default()
                .with("AUSDT", 100, 0)
                .with("BUSDT", 100, 0)
                .with("CUSDT", 100, 0),
        );
        let request =
            BatchRequest::new(&["AUSDT", "BUSDT", "CUSDT"], Granularity::FourHours).unwrap();
        let options = BatchOptions::default().with_pacing(Duration::from_millis(100));

        let mut stream = analyze_batch(provider.clone(), strategy(), request, options);

        let first = stream.next().await.unwrap();
        assert_eq!(first.symbol, "AUSDT");
        stream.cancel();

        // Nothing beyond what was already produced
        assert!(stream.next().await.is_none());
        sleep(Duration::from_millis(250)).await;
        assert_eq!(provider.calls(), vec!["AUSDT".to_string()]);
    }
}
