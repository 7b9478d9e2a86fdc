//! Per-turn timer that harvests the engine's plan
//!
//! The timer runs on its own thread. Each [`TurnScheduler::start_turn`] arms
//! a deadline; when it passes, the timer disarms itself, reads the plan
//! mailbox and sends one [`TurnDecision`]. The search itself is never paused.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{after, never, select, unbounded, Receiver, Sender};
use log::{debug, error, info, warn};

use crate::engine::PlanHandle;
use crate::search::Plan;

/// Plan harvested when a turn's timer fired
#[derive(Debug, Clone)]
pub struct TurnDecision {
    /// 1-based count of decisions emitted by this scheduler
    pub turn: u64,
    pub plan: Arc<Plan>,
}

enum TimerCommand {
    Arm,
    Shutdown,
}

pub struct TurnScheduler {
    commands: Sender<TimerCommand>,
    decisions: Receiver<TurnDecision>,
    interval: Duration,
    timer: Option<JoinHandle<()>>,
}

impl TurnScheduler {
    /// Spawn a disarmed timer reading from `plans`.
    pub fn new(plans: PlanHandle, interval: Duration) -> Self {
        let (command_tx, command_rx) = unbounded();
        let (decision_tx, decision_rx) = unbounded();
        let timer = thread::spawn(move || run_timer(&plans, interval, &command_rx, &decision_tx));
        Self {
            commands: command_tx,
            decisions: decision_rx,
            interval,
            timer: Some(timer),
        }
    }

    #[inline]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Arm the timer for one interval from now, replacing any pending deadline.
    pub fn start_turn(&self) {
        if self.commands.send(TimerCommand::Arm).is_err() {
            warn!("turn timer is gone, cannot start a turn");
        }
    }

    /// Channel the decisions arrive on
    #[inline]
    pub fn decisions(&self) -> &Receiver<TurnDecision> {
        &self.decisions
    }

    /// Wait up to `timeout` for the next decision.
    pub fn next_decision(&self, timeout: Duration) -> Option<TurnDecision> {
        self.decisions.recv_timeout(timeout).ok()
    }

    /// Stop the timer thread and wait for it.
    pub fn shutdown(mut self) {
        self.stop_timer();
    }

    fn stop_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            // A closed channel means the thread already left its loop
            let _ = self.commands.send(TimerCommand::Shutdown);
            if timer.join().is_err() {
                error!("turn timer panicked");
            }
        }
    }
}

impl Drop for TurnScheduler {
    fn drop(&mut self) {
        self.stop_timer();
    }
}

fn run_timer(
    plans: &PlanHandle,
    interval: Duration,
    commands: &Receiver<TimerCommand>,
    decisions: &Sender<TurnDecision>,
) {
    let mut deadline: Option<Instant> = None;
    let mut turn = 0u64;

    loop {
        let fire = match deadline {
            Some(at) => after(at.saturating_duration_since(Instant::now())),
            None => never(),
        };

        select! {
            recv(commands) -> command => match command {
                Ok(TimerCommand::Arm) => deadline = Some(Instant::now() + interval),
                Ok(TimerCommand::Shutdown) | Err(_) => break,
            },
            recv(fire) -> _ => {
                deadline = None;
                turn += 1;
                let plan = plans.load();
                info!(
                    "turn {turn}: plan of {} moves at depth {} (score {:.4})",
                    plan.moves.len(),
                    plan.depth,
                    plan.score
                );
                if decisions.send(TurnDecision { turn, plan }).is_err() {
                    break;
                }
            },
        }
    }
    debug!("turn timer stopped after {turn} turns");
}
