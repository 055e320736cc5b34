// src/quiz/timer.rs

use std::{future::Future, ops::ControlFlow};

use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{Duration, Instant, interval_at},
};

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Result of advancing a countdown by one second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Running(u64),
    /// Reached zero on this tick. Yielded exactly once.
    Expired,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CountdownState {
    Active,
    Expired,
    Stopped,
}

/// Seconds remaining in a timed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    remaining: u64,
    state: CountdownState,
}

impl Countdown {
    pub fn new(seconds: u64) -> Self {
        Self {
            remaining: seconds,
            state: CountdownState::Active,
        }
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    pub fn is_active(&self) -> bool {
        self.state == CountdownState::Active
    }

    pub fn tick(&mut self) -> Tick {
        if self.state != CountdownState::Active {
            return Tick::Stopped;
        }

        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.state = CountdownState::Expired;
            return Tick::Expired;
        }
        Tick::Running(self.remaining)
    }

    /// Freezes the countdown at its current value.
    pub fn stop(&mut self) {
        if self.state == CountdownState::Active {
            self.state = CountdownState::Stopped;
        }
    }
}

/// Owner of a running ticker. Dropping it cancels the ticker.
#[derive(Debug)]
pub struct TimerHandle {
    cancel: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl TimerHandle {
    pub fn cancel(&self) {
        let _ = self.cancel.send(true);
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Calls `on_tick` once per second until it breaks or the handle is cancelled.
pub fn spawn_ticker<F, Fut>(on_tick: F) -> TimerHandle
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ControlFlow<()>> + Send + 'static,
{
    spawn_periodic(TICK_PERIOD, on_tick)
}

/// Calls `on_tick` every `period`, first after one full period.
pub fn spawn_periodic<F, Fut>(period: Duration, mut on_tick: F) -> TimerHandle
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ControlFlow<()>> + Send + 'static,
{
    let (cancel, mut cancelled) = watch::channel(false);

    let task = tokio::spawn(async move {
        let mut tick = interval_at(Instant::now() + period, period);
        loop {
            tokio::select! {
                _ = cancelled.changed() => break,
                _ = tick.tick() => {
                    if on_tick().await.is_break() {
                        break;
                    }
                }
            }
        }
        tracing::debug!(?period, "Ticker stopped");
    });

    TimerHandle { cancel, task }
}
