use std::sync::mpsc;
use std::sync::mpsc::RecvTimeoutError;
use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;
use std::time::Instant;

use tokio::runtime;
use tokio::sync::watch;
use tracing::debug;
use tracing::info;
use tracing::warn;

use super::Simulation;
use super::SimulationSnapshot;
use super::TickOutcome;
use crate::config::SimulationConfig;
use crate::error::RunnerError;
use crate::error::SimulatorError;

pub enum RunnerCommand {
    Start,
    Pause,
    Step,
    Reset,
    SetConfig(SimulationConfig),
}

#[derive(Clone, Debug)]
pub struct RunnerState {
    pub running: bool,
    pub snapshot: SimulationSnapshot,
}

/// Ticks a [`Simulation`] on its own thread at the configured speed.
pub struct SimulationRunner {
    command_sender: Option<mpsc::Sender<RunnerCommand>>,
    state_receiver: watch::Receiver<RunnerState>,
    handle: Option<JoinHandle<()>>,
}

impl SimulationRunner {
    pub fn spawn(config: SimulationConfig) -> Result<Self, SimulatorError> {
        config.validate()?;
        let simulation = Simulation::new(config);
        let (command_sender, command_receiver) = mpsc::channel();
        let (state_sender, state_receiver) = watch::channel(RunnerState {
            running: false,
            snapshot: simulation.snapshot(),
        });
        let worker = Worker {
            simulation,
            running: false,
            next_tick: Instant::now(),
            command_receiver,
            state_sender,
        };
        let handle = thread::Builder::new()
            .name("simulation".to_owned())
            .spawn(move || worker.run())
            .map_err(RunnerError::Spawn)?;
        Ok(SimulationRunner {
            command_sender: Some(command_sender),
            state_receiver,
            handle: Some(handle),
        })
    }

    pub fn send(&self, command: RunnerCommand) -> Result<(), RunnerError> {
        self.command_sender
            .as_ref()
            .ok_or(RunnerError::Stopped)?
            .send(command)
            .map_err(|_| RunnerError::Stopped)
    }

    pub fn start(&self) -> Result<(), RunnerError> {
        self.send(RunnerCommand::Start)
    }

    pub fn pause(&self) -> Result<(), RunnerError> {
        self.send(RunnerCommand::Pause)
    }

    pub fn step(&self) -> Result<(), RunnerError> {
        self.send(RunnerCommand::Step)
    }

    pub fn reset(&self) -> Result<(), RunnerError> {
        self.send(RunnerCommand::Reset)
    }

    pub fn set_config(&self, config: SimulationConfig) -> Result<(), SimulatorError> {
        config.validate()?;
        Ok(self.send(RunnerCommand::SetConfig(config))?)
    }

    pub fn state(&self) -> RunnerState {
        self.state_receiver.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<RunnerState> {
        self.state_receiver.clone()
    }

    /// Blocks until a published state satisfies `pred` or `timeout` elapses.
    /// Returns `None` on timeout or when the simulation thread has exited.
    pub fn wait_for(
        &self,
        timeout: Duration,
        mut pred: impl FnMut(&RunnerState) -> bool,
    ) -> Option<RunnerState> {
        let mut receiver = self.state_receiver.clone();
        let runtime = runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .ok()?;
        runtime.block_on(async {
            let wait = async {
                loop {
                    {
                        let state = receiver.borrow_and_update();
                        if pred(&state) {
                            return Some(state.clone());
                        }
                    }
                    if receiver.changed().await.is_err() {
                        return None;
                    }
                }
            };
            tokio::time::timeout(timeout, wait).await.ok().flatten()
        })
    }
}

impl Drop for SimulationRunner {
    fn drop(&mut self) {
        self.command_sender.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("{}", RunnerError::Panicked);
            }
        }
    }
}

struct Worker {
    simulation: Simulation,
    running: bool,
    next_tick: Instant,
    command_receiver: mpsc::Receiver<RunnerCommand>,
    state_sender: watch::Sender<RunnerState>,
}

impl Worker {
    fn run(mut self) {
        loop {
            let command = if self.running {
                let timeout = self.next_tick.saturating_duration_since(Instant::now());
                match self.command_receiver.recv_timeout(timeout) {
                    Ok(command) => Some(command),
                    Err(RecvTimeoutError::Timeout) => None,
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            } else {
                match self.command_receiver.recv() {
                    Ok(command) => Some(command),
                    Err(_) => break,
                }
            };

            match command {
                Some(command) => self.process_command(command),
                None => {
                    self.next_tick += self.interval();
                    self.advance();
                }
            }
            self.publish();
        }
        debug!("Simulation thread exiting");
    }

    fn interval(&self) -> Duration {
        Duration::from_millis(self.simulation.config().speed_ms)
    }

    fn advance(&mut self) {
        if self.simulation.tick() == TickOutcome::Finished {
            self.running = false;
        }
    }

    fn process_command(&mut self, command: RunnerCommand) {
        use RunnerCommand::*;
        match command {
            Start => {
                if self.simulation.is_finished() {
                    info!("Simulation already finished; reset it before starting again");
                } else {
                    self.running = true;
                    self.next_tick = Instant::now();
                }
            }
            Pause => self.running = false,
            Step => {
                if !self.running {
                    self.advance();
                }
            }
            Reset => {
                self.running = false;
                self.simulation.reset();
            }
            SetConfig(config) => {
                info!(
                    seed = config.seed,
                    sampling_mode = %config.sampling_mode,
                    "Applying new simulation config"
                );
                self.simulation.set_config(config);
            }
        };
    }

    fn publish(&self) {
        let _ = self.state_sender.send(RunnerState {
            running: self.running,
            snapshot: self.simulation.snapshot(),
        });
    }
}
