use crate::{
    cell::Cell,
    config::FieldConfig,
    coverage::CoveragePlanner,
    drive::{DriveHandle, DriveMetrics, DriveOutcome, DriveSimulator},
    error::{DriveRejection, EditRejection, FieldError, Result},
    grid_world::{Agent, GridWorld},
    solver::{astar::AstarSolver, GridSolver},
    Path,
};
use log::{info, warn};
use rand::Rng;

/// [FieldSession] is the entry point for a front end. It owns one [GridWorld], caches the last
/// planned path and refuses edits to the field while a drive is underway, so that a path never
/// outlives the field it was planned on. Any successful edit discards the cached path.
#[derive(Debug)]
pub struct FieldSession {
    world: GridWorld,
    path: Path,
    planner: CoveragePlanner<AstarSolver>,
    simulator: DriveSimulator,
    speed: u32,
}

impl FieldSession {
    /// Creates a session on a field of the configured size, scattered with obstacles at the
    /// configured rate.
    pub fn new(config: &FieldConfig) -> Result<FieldSession> {
        Self::with_rng(config, &mut rand::thread_rng())
    }

    pub fn with_rng<R: Rng + ?Sized>(config: &FieldConfig, rng: &mut R) -> Result<FieldSession> {
        let mut world = GridWorld::new(config.width, config.height)?;
        world.randomize_obstacles(config.obstacle_rate, rng);
        Ok(FieldSession {
            world,
            path: Path::new(),
            planner: CoveragePlanner::new(AstarSolver::new()),
            simulator: DriveSimulator::new(config.timing),
            speed: config.speed,
        })
    }

    pub fn world(&self) -> &GridWorld {
        &self.world
    }

    /// The cached path, empty if nothing has been planned since the last edit.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn simulator(&self) -> &DriveSimulator {
        &self.simulator
    }

    pub fn speed(&self) -> u32 {
        self.speed
    }

    /// Also re-paces a drive that is underway.
    pub fn set_speed(&mut self, speed: u32) {
        self.speed = speed;
        self.simulator.handle().set_speed(speed);
    }

    fn ensure_idle(&self) -> Result<()> {
        if self.simulator.is_driving() {
            return Err(FieldError::InvalidEdit(EditRejection::Driving));
        }
        Ok(())
    }

    /// Replaces the field with an empty fenced one of the given size.
    pub fn reset_field(&mut self, width: usize, height: usize) -> Result<()> {
        self.ensure_idle()?;
        self.world = GridWorld::new(width, height)?;
        self.path.clear();
        Ok(())
    }

    pub fn randomize_obstacles(&mut self, rate: f64) -> Result<()> {
        self.randomize_obstacles_with(rate, &mut rand::thread_rng())
    }

    pub fn randomize_obstacles_with<R: Rng + ?Sized>(
        &mut self,
        rate: f64,
        rng: &mut R,
    ) -> Result<()> {
        self.ensure_idle()?;
        self.world.randomize_obstacles(rate, rng);
        self.path.clear();
        Ok(())
    }

    /// Returns whether the cell is now blocked.
    pub fn toggle_obstacle(&mut self, cell: Cell) -> Result<bool> {
        self.ensure_idle()?;
        let blocked = self.world.toggle_obstacle(cell)?;
        self.path.clear();
        Ok(blocked)
    }

    pub fn set_start(&mut self, cell: Cell) -> Result<()> {
        self.ensure_idle()?;
        self.world.set_start(cell)?;
        self.path.clear();
        Ok(())
    }

    pub fn set_goal(&mut self, cell: Cell) -> Result<()> {
        self.ensure_idle()?;
        self.world.set_goal(cell)?;
        self.path.clear();
        Ok(())
    }

    /// Plans a shortest path from the agent to the goal. The agent stands on the start unless a
    /// drive has moved it. An agent that already reached the goal is parked on the start first.
    pub fn plan_path(&mut self) -> Result<&Path> {
        self.ensure_idle()?;
        self.world.update();
        if self.world.agent().cell == self.world.goal() {
            self.world.park_agent();
        }
        let from = self.world.agent().cell;
        let to = self.world.goal();
        self.path = self.planner.solver.find_path(&self.world, from, to);
        if self.path.is_empty() {
            return Err(FieldError::NoRouteFound { from, to });
        }
        info!(
            "Planned path of cost {} from {} to {}",
            self.planner.solver.get_path_cost(&self.path),
            from,
            to
        );
        Ok(&self.path)
    }

    /// Plans a coverage path from the agent and moves the goal to where it ends, so that the
    /// goal matches the endpoint of the next drive.
    pub fn plan_coverage(&mut self) -> Result<&Path> {
        self.ensure_idle()?;
        self.world.update();
        self.path = self.planner.plan(&self.world, self.world.agent().cell);
        let Some(&last) = self.path.last() else {
            return Err(FieldError::NothingToCover);
        };
        if let Err(e) = self.world.set_goal(last) {
            warn!("Keeping goal {}: {}", self.world.goal(), e);
        }
        Ok(&self.path)
    }

    /// Starts driving the cached path, planning one first if there is none. The returned handle
    /// stops or re-paces the drive; [run_drive](Self::run_drive) carries it out.
    pub fn start_drive(&mut self) -> Result<DriveHandle> {
        if self.simulator.is_driving() {
            return Err(FieldError::DriveNotStartable(DriveRejection::AlreadyDriving));
        }
        if self.world.agent().cell == self.world.goal() {
            return Err(FieldError::DriveNotStartable(DriveRejection::AlreadyAtGoal));
        }
        if self.path.is_empty() {
            self.plan_path()?;
        }
        let handle = self
            .simulator
            .start(&self.world, self.path.clone(), self.speed)?;
        self.path.clear();
        Ok(handle)
    }

    /// Blocks until the started drive completes or is stopped. Whatever part of the path was not
    /// driven becomes the cached path again, so a stopped drive can be resumed.
    pub fn run_drive<FS, FC>(&mut self, on_step: FS, on_complete: FC) -> DriveOutcome
    where
        FS: FnMut(&Agent),
        FC: FnOnce(&DriveMetrics),
    {
        let outcome = self.simulator.run(&mut self.world, on_step, on_complete);
        self.path = self.simulator.remaining();
        outcome
    }

    /// Returns whether a drive was stopped.
    pub fn stop_drive(&self) -> bool {
        self.simulator.handle().stop()
    }
}
