//! Drives the worlds one day at a time on a single task.

use crate::reporter::Tile;
use eco_core::{Position, WorldStats};
use eco_world::{DayReport, WorldMap};
use std::collections::BTreeSet;
use tokio::sync::{mpsc, watch};
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info, instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    Paused,
    /// Terminal; the runner returns its worlds
    Stopped,
}

/// Controls a running [`SimulationRunner`]. Requests take effect between
/// days; a day that has started always finishes.
#[derive(Debug)]
pub struct RunnerHandle {
    control: watch::Sender<RunState>,
}

impl RunnerHandle {
    pub fn pause(&self) {
        self.set(RunState::Paused);
    }

    pub fn resume(&self) {
        self.set(RunState::Running);
    }

    pub fn stop(&self) {
        self.set(RunState::Stopped);
    }

    /// Flip between running and paused
    pub fn toggle(&self) {
        match self.state() {
            RunState::Running => self.pause(),
            RunState::Paused => self.resume(),
            RunState::Stopped => {}
        }
    }

    pub fn state(&self) -> RunState {
        *self.control.borrow()
    }

    fn set(&self, next: RunState) {
        self.control.send_if_modified(|state| {
            if *state == RunState::Stopped || *state == next {
                return false;
            }
            *state = next;
            true
        });
    }
}

/// One world's day as seen by the reporter
#[derive(Debug, Clone)]
pub struct Update {
    pub report: DayReport,
    pub stats: WorldStats,
    /// Content of every changed cell, read right after the day
    pub tiles: Vec<(Position, Tile)>,
}

impl Update {
    fn capture(world: &WorldMap, report: DayReport) -> Self {
        let tiles = report
            .changed
            .iter()
            .filter_map(|p| world.object_at(*p).ok().map(|object| (*p, Tile::from(object))))
            .collect();
        Self {
            report,
            stats: world.stats(),
            tiles,
        }
    }

    /// Every cell, used to seed a fresh board
    fn full(world: &WorldMap) -> Self {
        let config = world.config();
        let changed: BTreeSet<Position> = (0..config.width)
            .flat_map(|x| (0..config.height).map(move |y| Position::new(x, y)))
            .collect();
        let report = DayReport {
            day: world.day(),
            kind: world.kind(),
            changed,
        };
        Self::capture(world, report)
    }
}

pub struct SimulationRunner {
    worlds: Vec<WorldMap>,
    tick: Duration,
    max_days: Option<u64>,
    control: watch::Receiver<RunState>,
    updates: mpsc::UnboundedSender<Update>,
}

impl SimulationRunner {
    pub fn new(
        worlds: Vec<WorldMap>,
        tick: Duration,
        max_days: Option<u64>,
        start_paused: bool,
    ) -> (Self, RunnerHandle, mpsc::UnboundedReceiver<Update>) {
        let initial = if start_paused {
            RunState::Paused
        } else {
            RunState::Running
        };
        let (control_tx, control_rx) = watch::channel(initial);
        let (updates_tx, updates_rx) = mpsc::unbounded_channel();

        let runner = Self {
            worlds,
            tick,
            max_days,
            control: control_rx,
            updates: updates_tx,
        };
        (runner, RunnerHandle { control: control_tx }, updates_rx)
    }

    /// Advance every world once per tick until stopped or the day limit is
    /// reached, then hand the worlds back.
    #[instrument(skip(self), fields(worlds = self.worlds.len(), max_days = ?self.max_days))]
    pub async fn run(mut self) -> Vec<WorldMap> {
        for world in &self.worlds {
            self.publish(Update::full(world));
        }

        let mut ticker = interval(self.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            // A dropped handle can no longer resume us
            let state = self
                .control
                .wait_for(|s| *s != RunState::Paused)
                .await
                .map(|s| *s)
                .unwrap_or(RunState::Stopped);
            if state == RunState::Stopped {
                info!("Runner stopped");
                break;
            }

            ticker.tick().await;

            for world in &mut self.worlds {
                let report = world.advance_day();
                let update = Update::capture(world, report);
                if self.updates.send(update).is_err() {
                    debug!("Update receiver dropped");
                }
            }

            if let Some(max_days) = self.max_days {
                if self.worlds.iter().all(|w| w.day() >= max_days) {
                    info!(max_days, "Day limit reached");
                    break;
                }
            }
        }

        self.worlds
    }

    fn publish(&self, update: Update) {
        if self.updates.send(update).is_err() {
            debug!("Update receiver dropped");
        }
    }
}
