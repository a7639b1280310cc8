use std::fmt;
use std::time::{Duration, Instant};

/// Per-frame stage timings, rendered into the status text so frame cost
/// is visible without a profiler.
#[derive(Debug, Default)]
pub struct FrameTimings {
    steps: Vec<(String, Duration)>,
}

impl FrameTimings {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    pub fn add_step(&mut self, name: impl Into<String>, duration: Duration) {
        self.steps.push((name.into(), duration));
    }

    pub fn total_duration(&self) -> Duration {
        self.steps.iter().map(|(_, d)| *d).sum()
    }

    pub fn steps(&self) -> &[(String, Duration)] {
        &self.steps
    }
}

impl fmt::Display for FrameTimings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, duration)) in self.steps.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{} {:.1}ms", name, duration.as_secs_f64() * 1000.0)?;
        }
        Ok(())
    }
}

pub struct Timer {
    start: Instant,
    name: String,
}

impl Timer {
    pub fn start(name: impl Into<String>) -> Self {
        Self {
            start: Instant::now(),
            name: name.into(),
        }
    }

    pub fn stop(self) -> (String, Duration) {
        (self.name, self.start.elapsed())
    }
}
