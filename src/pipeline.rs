use crate::error::Result;
use serde::Serialize;
use std::cell::RefCell;

/// Failure policy for a pipeline step.
///
/// `MustSucceed` steps abort the run on error; `BestEffort` steps turn their
/// error into a recorded warning and let the run continue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepPolicy {
    MustSucceed,
    BestEffort,
}

/// Result of a step that did not fail outright.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Success,
    Warning(String),
}

/// Sink for progress and warning lines emitted while a pipeline runs.
///
/// The CLI passes its output formatter; tests pass a recording reporter so
/// swallowed best-effort failures can be asserted on.
pub trait Reporter {
    fn step_started(&self, name: &str);
    fn info(&self, message: &str);
    fn warning(&self, message: &str);
}

pub struct Step<'a, C> {
    name: &'static str,
    policy: StepPolicy,
    #[allow(clippy::type_complexity)]
    run: Box<dyn Fn(&mut C, &dyn Reporter) -> Result<StepOutcome> + 'a>,
}

impl<'a, C> Step<'a, C> {
    pub fn must_succeed<F>(name: &'static str, run: F) -> Self
    where
        F: Fn(&mut C, &dyn Reporter) -> Result<StepOutcome> + 'a,
    {
        Self {
            name,
            policy: StepPolicy::MustSucceed,
            run: Box::new(run),
        }
    }

    pub fn best_effort<F>(name: &'static str, run: F) -> Self
    where
        F: Fn(&mut C, &dyn Reporter) -> Result<StepOutcome> + 'a,
    {
        Self {
            name,
            policy: StepPolicy::BestEffort,
            run: Box::new(run),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn policy(&self) -> StepPolicy {
        self.policy
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StepWarning {
    pub step: String,
    pub message: String,
}

/// Record of a completed pipeline run: which steps finished and every warning
/// raised along the way, in order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PipelineReport {
    pub completed_steps: Vec<String>,
    pub warnings: Vec<StepWarning>,
}

impl PipelineReport {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn warnings_for_step(&self, step: &str) -> Vec<&StepWarning> {
        self.warnings.iter().filter(|w| w.step == step).collect()
    }
}

/// An explicit ordered sequence of named steps driven over a shared context.
pub struct Pipeline<'a, C> {
    steps: Vec<Step<'a, C>>,
}

impl<'a, C> Pipeline<'a, C> {
    pub fn new(steps: Vec<Step<'a, C>>) -> Self {
        Self { steps }
    }

    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.name).collect()
    }

    /// Run every step in order. A failing must-succeed step aborts with its
    /// error; everything a best-effort step swallows ends up in the report.
    pub fn run(&self, context: &mut C, reporter: &dyn Reporter) -> Result<PipelineReport> {
        let mut report = PipelineReport::default();

        for step in &self.steps {
            reporter.step_started(step.name);

            match (step.run)(context, reporter) {
                Ok(StepOutcome::Success) => {
                    report.completed_steps.push(step.name.to_string());
                }
                Ok(StepOutcome::Warning(message)) => {
                    reporter.warning(&message);
                    report.warnings.push(StepWarning {
                        step: step.name.to_string(),
                        message,
                    });
                    report.completed_steps.push(step.name.to_string());
                }
                Err(error) => match step.policy {
                    StepPolicy::MustSucceed => return Err(error),
                    StepPolicy::BestEffort => {
                        let message = error.to_string();
                        reporter.warning(&message);
                        report.warnings.push(StepWarning {
                            step: step.name.to_string(),
                            message,
                        });
                    }
                },
            }
        }

        Ok(report)
    }
}

/// Reporter that remembers everything it was told. Single-threaded, like the
/// pipelines it observes.
#[derive(Default)]
pub struct RecordingReporter {
    lines: RefCell<Vec<(String, String)>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.lines
            .borrow()
            .iter()
            .filter(|(level, _)| level == "warning")
            .map(|(_, msg)| msg.clone())
            .collect()
    }

    pub fn steps(&self) -> Vec<String> {
        self.lines
            .borrow()
            .iter()
            .filter(|(level, _)| level == "step")
            .map(|(_, msg)| msg.clone())
            .collect()
    }
}

impl Reporter for RecordingReporter {
    fn step_started(&self, name: &str) {
        self.lines
            .borrow_mut()
            .push(("step".to_string(), name.to_string()));
    }

    fn info(&self, message: &str) {
        self.lines
            .borrow_mut()
            .push(("info".to_string(), message.to_string()));
    }

    fn warning(&self, message: &str) {
        self.lines
            .borrow_mut()
            .push(("warning".to_string(), message.to_string()));
    }
}
