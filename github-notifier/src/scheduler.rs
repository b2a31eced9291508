use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{debug, error};

use crate::AppError;
use crate::engine;
use crate::notify::AlertSink;
use crate::source::NotificationSource;
use crate::token::TokenProvider;
use crate::watermark::{Watermark, WatermarkStore};

/// Timer driving the poll loop.
#[async_trait]
pub trait Ticker: Send {
    /// Waits for the next tick. Returns `false` once no further ticks will come.
    async fn tick(&mut self) -> bool;
}

/// Fixed-period ticker. The first tick fires one full period after creation, and a
/// tick that overruns delays the following ones instead of bunching them up.
#[derive(Debug)]
pub struct IntervalTicker {
    interval: Interval,
}

impl IntervalTicker {
    pub fn new(period: Duration) -> Self {
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval }
    }
}

#[async_trait]
impl Ticker for IntervalTicker {
    async fn tick(&mut self) -> bool {
        self.interval.tick().await;
        true
    }
}

/// One fetch, filter and dispatch cycle plus the collaborators it needs.
pub struct Poller {
    tokens: TokenProvider,
    source: Box<dyn NotificationSource>,
    store: Box<dyn WatermarkStore>,
    sink: Box<dyn AlertSink>,
    filter: String,
}

impl Poller {
    pub fn new(
        tokens: TokenProvider,
        source: Box<dyn NotificationSource>,
        store: Box<dyn WatermarkStore>,
        sink: Box<dyn AlertSink>,
        filter: String,
    ) -> Self {
        Self {
            tokens,
            source,
            store,
            sink,
            filter,
        }
    }

    pub async fn tick(&mut self) -> Result<Watermark, AppError> {
        let credential = self.tokens.resolve()?;
        let records = self.source.fetch(&credential).await?;
        let watermark = self.store.read()?;
        debug!(count = records.len(), %watermark, "fetched notifications");
        engine::process(
            &records,
            watermark,
            &self.filter,
            self.store.as_mut(),
            self.sink.as_mut(),
        )
        .await
    }
}

/// Runs `poller` on every tick until the ticker is exhausted. Tick errors are logged
/// and the loop carries on.
pub async fn run_scheduler<T: Ticker>(ticker: &mut T, poller: &mut Poller) {
    while ticker.tick().await {
        let start = std::time::Instant::now();
        match poller.tick().await {
            Ok(watermark) => {
                let elapsed_ms = start.elapsed().as_millis() as u64;
                debug!(%watermark, elapsed_ms, "tick finished");
            }
            Err(e) => {
                error!(error=%e, "tick failed");
            }
        }
    }
}
