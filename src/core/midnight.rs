use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, Notify};
use tokio::task::JoinHandle;

use crate::goals::delay_until_next_rollover;

use super::planner::Planner;

/// Background task that rolls the planner over shortly after each local
/// midnight for as long as the process stays up.
#[derive(Clone)]
pub struct MidnightTimer {
    planner: Arc<Mutex<Planner>>,
    buffer: Duration,
    shutdown: Arc<Notify>,
}

impl MidnightTimer {
    pub fn new(planner: Arc<Mutex<Planner>>, buffer: Duration) -> Self {
        Self {
            planner,
            buffer,
            shutdown: Arc::new(Notify::new()),
        }
    }

    /// Handle that stops the timer when notified.
    pub fn shutdown_handle(&self) -> Arc<Notify> {
        self.shutdown.clone()
    }

    pub fn start(&self) -> JoinHandle<()> {
        let timer = self.clone();
        tokio::spawn(async move {
            timer.run_loop().await;
        })
    }

    async fn run_loop(self) {
        loop {
            // Recomputed every round so clock changes and sleeps are absorbed.
            let delay = {
                let planner = self.planner.lock().await;
                delay_until_next_rollover(planner.now(), self.buffer)
            };
            tracing::debug!(delay_secs = delay.as_secs(), "midnight rollover scheduled");
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = self.shutdown.notified() => {
                    tracing::debug!("midnight timer stopped");
                    break;
                }
            }
            let mut planner = self.planner.lock().await;
            match planner.roll_forward_to_clock() {
                Ok(days) => tracing::info!(days, today = %planner.today(), "midnight rollover done"),
                Err(err) => tracing::warn!(error = %err, "midnight rollover failed"),
            }
        }
    }
}
