//! Step-wise execution of a planned path.
//!
//! A [DriveSimulator] moves the agent of a [GridWorld] one cell at a time and keeps count of
//! steps and heading changes. The timed loop in [DriveSimulator::run] sleeps between steps for a
//! delay derived from the current speed, which can be changed through a [DriveHandle] while the
//! drive is underway. Stopping through a handle wakes the loop right away and no further step is
//! taken.
//!
//! The synchronous [step](DriveSimulator::step) and [finish](DriveSimulator::finish) calls drive
//! the same state machine without any timing, which is what `run` is built from.
use crate::{
    cell::{Cell, Heading},
    error::{DriveRejection, FieldError, Result},
    grid_world::{Agent, GridWorld},
    Path,
};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::Duration;

/// Rough fuel cost of a heading change, in units of a straight step.
pub const FUEL_PER_TURN: usize = 5;

/// Maps the speed knob to a delay between steps:
/// `max(min_delay_ms, base_delay_ms - speed * per_speed_ms)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveTiming {
    pub min_delay_ms: u64,
    pub base_delay_ms: u64,
    pub per_speed_ms: u64,
}

impl Default for DriveTiming {
    fn default() -> DriveTiming {
        DriveTiming {
            min_delay_ms: 20,
            base_delay_ms: 200,
            per_speed_ms: 15,
        }
    }
}

impl DriveTiming {
    pub fn step_delay_ms(&self, speed: u32) -> u64 {
        self.base_delay_ms
            .saturating_sub(u64::from(speed).saturating_mul(self.per_speed_ms))
            .max(self.min_delay_ms)
    }

    pub fn step_delay(&self, speed: u32) -> Duration {
        Duration::from_millis(self.step_delay_ms(speed))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DriveState {
    #[default]
    Idle,
    Driving,
    Completed,
    Stopped,
}

/// Summary of a completed drive.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct DriveMetrics {
    pub steps: usize,
    pub turns: usize,
    pub fuel_estimate: usize,
    /// Steps times the step delay at completion, in seconds with one decimal.
    pub simulated_seconds: f64,
    /// Approximate share of the free cells visited. Revisits are not tracked, the visited count
    /// is taken to be `steps + 1` capped at the number of free cells.
    pub coverage_percent: u32,
}

impl DriveMetrics {
    pub fn compute(steps: usize, turns: usize, delay_ms: u64, free_cells: usize) -> DriveMetrics {
        let simulated_seconds = ((steps as u64 * delay_ms) as f64 / 100.0).round() / 10.0;
        let coverage_percent = if free_cells == 0 {
            0
        } else {
            let visited = free_cells.min(steps + 1);
            (visited as f64 / free_cells as f64 * 100.0).round() as u32
        };
        DriveMetrics {
            steps,
            turns,
            fuel_estimate: steps + turns * FUEL_PER_TURN,
            simulated_seconds,
            coverage_percent,
        }
    }
}

/// State shared between a simulator and its handles.
#[derive(Debug)]
struct DriveControl {
    state: Mutex<DriveState>,
    wake: Condvar,
    speed: AtomicU32,
}

impl DriveControl {
    fn new(state: DriveState, speed: u32) -> DriveControl {
        DriveControl {
            state: Mutex::new(state),
            wake: Condvar::new(),
            speed: AtomicU32::new(speed),
        }
    }

    /// The guarded value is a plain enum, so a poisoned lock is still usable.
    fn lock_state(&self) -> MutexGuard<'_, DriveState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn speed(&self) -> u32 {
        self.speed.load(Ordering::Acquire)
    }

    /// Sleeps for `delay` unless the drive leaves the driving state first. Returns whether the
    /// drive is still going.
    fn wait(&self, delay: Duration) -> bool {
        let state = self.lock_state();
        let (state, _) = self
            .wake
            .wait_timeout_while(state, delay, |s| *s == DriveState::Driving)
            .unwrap_or_else(|e| e.into_inner());
        *state == DriveState::Driving
    }
}

/// Remote control for one drive. Cheap to clone and usable from any thread.
#[derive(Clone, Debug)]
pub struct DriveHandle {
    control: Arc<DriveControl>,
}

impl DriveHandle {
    /// Stops the drive if it is still going. Returns whether this call stopped it.
    pub fn stop(&self) -> bool {
        let mut state = self.control.lock_state();
        if *state != DriveState::Driving {
            return false;
        }
        *state = DriveState::Stopped;
        drop(state);
        self.control.wake.notify_all();
        info!("Drive stopped");
        true
    }

    /// Takes effect from the next step delay on.
    pub fn set_speed(&self, speed: u32) {
        self.control.speed.store(speed, Ordering::Release);
        debug!("Drive speed set to {}", speed);
    }

    pub fn speed(&self) -> u32 {
        self.control.speed()
    }

    pub fn state(&self) -> DriveState {
        *self.control.lock_state()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// The agent moved to a new cell.
    Moved(Agent),
    /// The path is used up, the drive can be finished.
    Exhausted,
    /// The simulator is not driving, nothing happened.
    Halted,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DriveOutcome {
    Completed(DriveMetrics),
    Stopped { steps: usize, turns: usize },
}

/// Runs one drive at a time over a path, see the [module documentation](self).
#[derive(Debug)]
pub struct DriveSimulator {
    pub timing: DriveTiming,
    control: Arc<DriveControl>,
    path: VecDeque<Cell>,
    heading: Heading,
    steps: usize,
    turns: usize,
}

impl Default for DriveSimulator {
    fn default() -> DriveSimulator {
        DriveSimulator::new(DriveTiming::default())
    }
}

impl DriveSimulator {
    pub fn new(timing: DriveTiming) -> DriveSimulator {
        DriveSimulator {
            timing,
            control: Arc::new(DriveControl::new(DriveState::Idle, 0)),
            path: VecDeque::new(),
            heading: Heading::East,
            steps: 0,
            turns: 0,
        }
    }

    pub fn state(&self) -> DriveState {
        *self.control.lock_state()
    }

    pub fn is_driving(&self) -> bool {
        self.state() == DriveState::Driving
    }

    /// A handle to the current (or last) drive.
    pub fn handle(&self) -> DriveHandle {
        DriveHandle {
            control: Arc::clone(&self.control),
        }
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn turns(&self) -> usize {
        self.turns
    }

    /// The part of the path not driven yet. After a stop this is what a resumed drive would
    /// follow.
    pub fn remaining(&self) -> Path {
        self.path.iter().copied().collect()
    }

    /// Starts a new drive along `path`, beginning at the agent's current cell and heading.
    /// Refused while another drive is underway, for an empty path, or if the agent already
    /// stands on the goal.
    pub fn start(&mut self, world: &GridWorld, path: Path, speed: u32) -> Result<DriveHandle> {
        let rejection = if self.is_driving() {
            DriveRejection::AlreadyDriving
        } else if path.is_empty() {
            DriveRejection::EmptyPath
        } else if world.agent().cell == world.goal() {
            DriveRejection::AlreadyAtGoal
        } else {
            self.control = Arc::new(DriveControl::new(DriveState::Driving, speed));
            self.heading = world.agent().heading;
            self.path = path.into();
            self.steps = 0;
            self.turns = 0;
            info!(
                "Driving {} cells from {} at speed {}",
                self.path.len(),
                world.agent().cell,
                speed
            );
            return Ok(self.handle());
        };
        Err(FieldError::DriveNotStartable(rejection))
    }

    /// Moves the agent onto the next path cell, counting a turn whenever the heading changes.
    /// The state is checked under the same lock that a stop takes, so a step either happens fully
    /// before a stop or not at all.
    pub fn step(&mut self, world: &mut GridWorld) -> StepOutcome {
        let state = self.control.lock_state();
        if *state != DriveState::Driving {
            return StepOutcome::Halted;
        }
        let Some(next) = self.path.pop_front() else {
            return StepOutcome::Exhausted;
        };
        let heading = Heading::between(&world.agent().cell, &next);
        if heading != self.heading {
            self.turns += 1;
            self.heading = heading;
        }
        let agent = Agent {
            cell: next,
            heading,
        };
        world.set_agent(agent);
        self.steps += 1;
        drop(state);
        StepOutcome::Moved(agent)
    }

    /// Completes the drive and computes its metrics with the step delay of the current speed.
    /// Returns [None] if the simulator was not driving.
    pub fn finish(&mut self, world: &GridWorld) -> Option<DriveMetrics> {
        let mut state = self.control.lock_state();
        if *state != DriveState::Driving {
            return None;
        }
        *state = DriveState::Completed;
        drop(state);
        self.control.wake.notify_all();
        let delay_ms = self.timing.step_delay_ms(self.control.speed());
        let metrics =
            DriveMetrics::compute(self.steps, self.turns, delay_ms, world.free_cell_count());
        info!(
            "Drive completed: {} steps, {} turns, {:.1}s",
            metrics.steps, metrics.turns, metrics.simulated_seconds
        );
        Some(metrics)
    }

    /// Runs the started drive to its end. The first step is taken immediately, every further step
    /// (and the completion) after the delay for the speed read right after the previous step.
    /// Blocks the calling thread in between; stop or re-pace the drive from elsewhere through a
    /// [DriveHandle], or from within `on_step`.
    pub fn run<FS, FC>(
        &mut self,
        world: &mut GridWorld,
        mut on_step: FS,
        on_complete: FC,
    ) -> DriveOutcome
    where
        FS: FnMut(&Agent),
        FC: FnOnce(&DriveMetrics),
    {
        loop {
            match self.step(world) {
                StepOutcome::Moved(agent) => on_step(&agent),
                StepOutcome::Exhausted => {
                    if let Some(metrics) = self.finish(world) {
                        on_complete(&metrics);
                        return DriveOutcome::Completed(metrics);
                    }
                    return self.stopped();
                }
                StepOutcome::Halted => return self.stopped(),
            }
            let delay = self.timing.step_delay(self.control.speed());
            if !self.control.wait(delay) {
                return self.stopped();
            }
        }
    }

    fn stopped(&self) -> DriveOutcome {
        DriveOutcome::Stopped {
            steps: self.steps,
            turns: self.turns,
        }
    }
}
