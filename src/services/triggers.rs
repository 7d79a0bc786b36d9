use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::api::ApiGateway;
use crate::services::sync::DashboardSynchronizer;

/// Why a refresh was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTrigger {
    Focus,
    Visible,
    Online,
    Timer,
}

impl RefreshTrigger {
    pub fn label(self) -> &'static str {
        match self {
            RefreshTrigger::Focus => "focus",
            RefreshTrigger::Visible => "visible",
            RefreshTrigger::Online => "online",
            RefreshTrigger::Timer => "timer",
        }
    }
}

/// Cloneable event feed into the coordinator. Hold a clone for as long as
/// the dashboard view lives; dropping every clone ends event delivery and
/// lets the coordinator wind down.
#[derive(Debug, Clone)]
pub struct TriggerSource {
    tx: mpsc::UnboundedSender<RefreshTrigger>,
}

impl TriggerSource {
    pub fn fire(&self, trigger: RefreshTrigger) {
        if self.tx.send(trigger).is_err() {
            log::debug!("refresh trigger ignored after shutdown: {:?}", trigger);
        }
    }
}

/// Owns the coordinator task. Shutting down (or dropping) the handle aborts
/// the task; triggers fired afterwards go nowhere. A refresh already handed
/// to the synchronizer runs to completion.
#[derive(Debug)]
pub struct TriggerHandle {
    task: JoinHandle<()>,
}

impl TriggerHandle {
    pub fn shutdown(self) {
        self.task.abort();
    }
}

impl Drop for TriggerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Fans focus/visible/online events and a fixed timer into
/// `DashboardSynchronizer::refresh`. Each trigger spawns its own refresh
/// attempt; overlapping attempts collapse in the synchronizer's in-flight
/// guard, so a burst of triggers costs at most one fetch. Refresh failures
/// are logged and swallowed.
pub fn start_refresh_triggers<G: ApiGateway + 'static>(
    sync: Arc<DashboardSynchronizer<G>>,
    interval_secs: u64,
) -> (TriggerSource, TriggerHandle) {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // interval fires immediately; the dashboard was just loaded, skip it
        ticker.tick().await;
        loop {
            let trigger = tokio::select! {
                _ = ticker.tick() => RefreshTrigger::Timer,
                event = rx.recv() => match event {
                    Some(trigger) => trigger,
                    None => break,
                },
            };
            log::debug!("refresh trigger: {}", trigger.label());
            // Never await the refresh in this loop: a burst of triggers has
            // to race into the in-flight guard, not line up in the channel.
            let sync = sync.clone();
            tokio::spawn(async move {
                if let Err(e) = sync.refresh().await {
                    log::warn!("background refresh failed ({}): {}", trigger.label(), e);
                }
            });
        }
    });
    (TriggerSource { tx }, TriggerHandle { task })
}
