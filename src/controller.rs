use std::time::Duration;

use tokio::time::{self, Instant};

use crate::acquisition::Acquisition;
use crate::errors::Error;
use crate::sampler::LightProximitySource;
use crate::sensor::EnvironmentSensor;
use crate::telemetry::EnviroTelemetry;
use crate::transmitter::TelemetrySink;

/// Shortest session the device will run; configured values at or below this
/// fall back to it.
const MIN_READ_DURATION: Duration = Duration::from_secs(15);

/// Pause between polling cycles.
const CYCLE_PAUSE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    Completed,
}

pub fn effective_duration(configured_seconds: u64) -> Duration {
    Duration::from_secs(configured_seconds).max(MIN_READ_DURATION)
}

/// Drives acquisition cycles until the session deadline passes. A cycle that
/// starts before the deadline always finishes, even when it overruns the
/// configured window.
pub struct RunController<S, L, T> {
    acquisition: Acquisition<S, L>,
    sink: T,
    read_duration: Duration,
    continue_after_cycle_error: bool,
    state: RunState,
}

impl<S, L, T> RunController<S, L, T>
where
    S: EnvironmentSensor,
    L: LightProximitySource,
    T: TelemetrySink,
{
    pub fn new(
        acquisition: Acquisition<S, L>,
        sink: T,
        configured_seconds: u64,
        continue_after_cycle_error: bool,
    ) -> Self {
        Self {
            acquisition,
            sink,
            read_duration: effective_duration(configured_seconds),
            continue_after_cycle_error,
            state: RunState::Idle,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub async fn run(&mut self) -> Result<(), Error> {
        self.state = RunState::Running;
        let deadline = Instant::now() + self.read_duration;

        while Instant::now() < deadline {
            match self.cycle().await {
                Ok(()) => {}
                Err(e) if self.continue_after_cycle_error => {
                    tracing::error!("cycle failed, continuing: {}", e);
                }
                Err(e) => return Err(e),
            }

            time::sleep(CYCLE_PAUSE).await;
        }

        self.state = RunState::Completed;
        tracing::info!("all telemetry read");

        Ok(())
    }

    async fn cycle(&mut self) -> Result<(), Error> {
        let reading = self.acquisition.run_cycle().await?;
        let record = EnviroTelemetry::from(&reading);

        self.sink.send(&record).await?;
        tracing::info!("telemetry sent");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_floor_is_enforced() {
        assert_eq!(effective_duration(5), Duration::from_secs(15));
        assert_eq!(effective_duration(15), Duration::from_secs(15));
        assert_eq!(effective_duration(30), Duration::from_secs(30));
    }
}
