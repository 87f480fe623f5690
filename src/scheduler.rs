//! Initial cycle plus periodic refresh.
//!
//! Each tick spawns a fresh cycle without waiting for or cancelling one that
//! is still in flight. Cycles only share the display surfaces, and each
//! render overwrites every slot, so overlapping cycles resolve as last write
//! wins.

use crate::display::{self, StatsDisplay};
use crate::source::StatsSource;
use crate::stats::{Aggregator, StatsResult};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{debug, info};

pub type Surfaces = Arc<Mutex<Vec<Box<dyn StatsDisplay>>>>;

pub struct Scheduler<S> {
    aggregator: Arc<Aggregator<S>>,
    identity: Arc<str>,
    surfaces: Surfaces,
    period: Duration,
}

impl<S> Clone for Scheduler<S> {
    fn clone(&self) -> Self {
        Self {
            aggregator: Arc::clone(&self.aggregator),
            identity: Arc::clone(&self.identity),
            surfaces: Arc::clone(&self.surfaces),
            period: self.period,
        }
    }
}

impl<S: StatsSource + 'static> Scheduler<S> {
    pub fn new(
        aggregator: Aggregator<S>,
        identity: impl Into<Arc<str>>,
        surfaces: Vec<Box<dyn StatsDisplay>>,
        period: Duration,
    ) -> Self {
        Self {
            aggregator: Arc::new(aggregator),
            identity: identity.into(),
            surfaces: Arc::new(Mutex::new(surfaces)),
            period,
        }
    }

    pub fn surfaces(&self) -> Surfaces {
        Arc::clone(&self.surfaces)
    }

    /// Show the loading state on every surface.
    pub async fn initialize(&self) {
        let mut surfaces = self.surfaces.lock().await;
        for surface in surfaces.iter_mut() {
            display::init_placeholders(surface.as_mut());
        }
    }

    /// Fetch, aggregate and render once.
    pub async fn run_once(&self) -> StatsResult {
        let stats = self.aggregator.run_cycle(&self.identity).await;
        let mut surfaces = self.surfaces.lock().await;
        for surface in surfaces.iter_mut() {
            display::render(surface.as_mut(), &stats);
        }
        stats
    }

    pub fn spawn_cycle(&self) -> JoinHandle<StatsResult> {
        let this = self.clone();
        tokio::spawn(async move { this.run_once().await })
    }

    /// First tick is immediate. After a stall the next cycle starts one full
    /// period later rather than catching up with a burst.
    fn ticker(&self) -> Interval {
        let mut ticker = tokio::time::interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker
    }

    /// Initialize, then start a cycle immediately and every `period` until
    /// `shutdown` resolves.
    pub async fn run<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        self.initialize().await;
        info!(
            "Refreshing stats for {} every {}s",
            self.identity,
            self.period.as_secs()
        );

        let mut ticker = self.ticker();
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Stopping refresh loop");
                    break;
                }
                _ = ticker.tick() => {
                    debug!("Starting stats cycle");
                    self.spawn_cycle();
                }
            }
        }
    }
}
