//! # Maintenance tick.
//!
//! [`Ticker`] is the cycle's periodic housekeeping: one compaction pass per
//! tick, an occasional clock re-sync when network time is enabled, and a
//! [`EventKind::Tick`] event at the end. It is not a spawned task: the
//! supervisor drives it inline so it can borrow the board mutably.
//!
//! A failed clock re-sync is logged and ignored: wall-clock drift is not
//! worth a restart, and the next scheduled sync retries anyway.

use std::time::Duration;

use crate::config::NtpOptions;
use crate::error::HalError;
use crate::events::{Bus, Event, EventKind};
use crate::hal::{Board, WallTime};

/// Periodic maintenance driven by the supervisor's drive loop.
pub struct Ticker {
    bus: Bus,
    ntp: NtpOptions,
    ticks_per_sync: u64,
    ticks_until_sync: u64,
}

impl Ticker {
    /// Builds a ticker for one cycle.
    ///
    /// The re-sync countdown starts full: bring-up just synced the clock, so
    /// the first re-sync lands a whole interval later.
    pub(crate) fn new(bus: Bus, ntp: NtpOptions, tick_interval: Duration) -> Self {
        let tick_ms = tick_interval.as_millis().max(1);
        let ticks_per_sync = (ntp.interval.as_millis() / tick_ms).max(1) as u64;
        Self {
            bus,
            ntp,
            ticks_per_sync,
            ticks_until_sync: ticks_per_sync,
        }
    }

    /// One maintenance pass.
    pub(crate) fn tick(&mut self, board: &mut Board) {
        board.maintenance.compact();

        if self.ntp.enable {
            self.ticks_until_sync -= 1;
            if self.ticks_until_sync == 0 {
                self.ticks_until_sync = self.ticks_per_sync;
                match sync_clock(board) {
                    Ok(applied) => {
                        self.bus
                            .publish(Event::new(EventKind::ClockSynced).with_reason(applied));
                    }
                    Err(err) => {
                        self.bus.publish(
                            Event::new(EventKind::ClockSyncFailed).with_reason(err.to_string()),
                        );
                    }
                }
            }
        }

        self.bus.publish(Event::new(EventKind::Tick));
    }
}

fn sync_clock(board: &mut Board) -> Result<String, HalError> {
    let timestamp = board.network.network_time()?;
    let time = WallTime::parse(&timestamp)?;
    board.clock.set_time(time)?;
    Ok(timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::stub::{stub_board, StubOptions};

    #[tokio::test]
    async fn every_tick_compacts_and_announces() {
        let (mut board, probe) = stub_board(StubOptions::default());
        let bus = Bus::new(64);
        let mut rx = bus.subscribe();
        let mut ticker = Ticker::new(bus.clone(), NtpOptions::default(), Duration::from_secs(1));

        ticker.tick(&mut board);
        ticker.tick(&mut board);

        assert_eq!(probe.recorder.count("maintenance.compact"), 2);
        assert_eq!(rx.recv().await.unwrap().kind, EventKind::Tick);
        assert_eq!(rx.recv().await.unwrap().kind, EventKind::Tick);
    }

    #[tokio::test]
    async fn clock_resync_lands_every_interval() {
        let (mut board, probe) = stub_board(StubOptions::default());
        let bus = Bus::new(64);
        let ntp = NtpOptions {
            enable: true,
            interval: Duration::from_secs(3),
        };
        let mut ticker = Ticker::new(bus.clone(), ntp, Duration::from_secs(1));

        for _ in 0..2 {
            ticker.tick(&mut board);
        }
        assert_eq!(probe.recorder.count("network.time"), 0);

        ticker.tick(&mut board);
        assert_eq!(probe.recorder.count("network.time"), 1);
        assert_eq!(probe.clock_set.lock().unwrap().len(), 1);

        for _ in 0..3 {
            ticker.tick(&mut board);
        }
        assert_eq!(probe.recorder.count("network.time"), 2);
    }

    #[tokio::test]
    async fn failed_resync_is_announced_and_ignored() {
        let (mut board, probe) = stub_board(StubOptions {
            network_time: "not a timestamp".to_string(),
            ..StubOptions::default()
        });
        let bus = Bus::new(64);
        let mut rx = bus.subscribe();
        let ntp = NtpOptions {
            enable: true,
            interval: Duration::from_secs(1),
        };
        let mut ticker = Ticker::new(bus.clone(), ntp, Duration::from_secs(1));

        ticker.tick(&mut board);

        let first = rx.recv().await.unwrap();
        assert_eq!(first.kind, EventKind::ClockSyncFailed);
        let second = rx.recv().await.unwrap();
        assert_eq!(second.kind, EventKind::Tick);
        assert_eq!(probe.clock_set.lock().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn disabled_ntp_never_touches_the_network() {
        let (mut board, probe) = stub_board(StubOptions::default());
        let bus = Bus::new(64);
        let mut ticker = Ticker::new(bus, NtpOptions::default(), Duration::from_secs(1));

        for _ in 0..10 {
            ticker.tick(&mut board);
        }
        assert_eq!(probe.recorder.count("network.time"), 0);
    }
}
