/*
[INPUT]:  Health check config, pong events, ping send results
[OUTPUT]: Periodic pings and a disconnect once too many pongs go missing
[POS]:    WebSocket layer - heartbeat supervisor
[UPDATE]: When changing ping cadence or miss accounting
*/

use std::sync::Weak;
use std::time::Duration;

use tokio::task::AbortHandle;

use super::client::Inner;

/// Result of recording a sent ping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PingOutcome {
    Healthy { missed: u32 },
    Exceeded { missed: u32, max: u32 },
}

/// Missed-pong accounting.
///
/// A ping counts as missed as soon as it is sent, so with `max_missed_pongs = 2`
/// the third unanswered ping trips the check.
#[derive(Debug, Default)]
pub(crate) struct HealthCheck {
    missed_pongs: u32,
}

impl HealthCheck {
    pub fn missed_pongs(&self) -> u32 {
        self.missed_pongs
    }

    pub fn reset(&mut self) {
        self.missed_pongs = 0;
    }

    pub fn on_pong(&mut self) {
        self.missed_pongs = 0;
    }

    pub fn on_ping_sent(&mut self, max_missed_pongs: u32) -> PingOutcome {
        self.missed_pongs = self.missed_pongs.saturating_add(1);
        if self.missed_pongs > max_missed_pongs {
            PingOutcome::Exceeded {
                missed: self.missed_pongs,
                max: max_missed_pongs,
            }
        } else {
            PingOutcome::Healthy {
                missed: self.missed_pongs,
            }
        }
    }
}

/// Ping immediately, then every `interval`, until the tick reports a stop
pub(crate) fn spawn_supervisor(inner: Weak<Inner>, generation: u64, interval: Duration) -> AbortHandle {
    tokio::spawn(async move {
        loop {
            let Some(client) = inner.upgrade() else {
                break;
            };
            if !client.health_tick(generation) {
                break;
            }
            drop(client);
            tokio::time::sleep(interval).await;
        }
    })
    .abort_handle()
}
