use crate::solvers::{Plan, PlanningResult};
use anyhow::{Context, Result};
use std::io::Write;

/// A writer for the results of the planners.
///
/// A plan is written as one line per action, prefixed by its step, followed by a line giving the makespan:
///
/// ```text
/// 0: move(a, b)
/// 1: move(b, c)
/// makespan 2
/// ```
///
/// When no plan was found, a single `NO PLAN` line is written.
#[derive(Default)]
pub struct PlanWriter;

impl PlanWriter {
    /// Writes a planning result.
    pub fn write_result(&self, writer: &mut dyn Write, result: &PlanningResult) -> Result<()> {
        match result {
            PlanningResult::Plan(p) => self.write_plan(writer, p),
            PlanningResult::BoundReached { .. } => self.write_no_plan(writer),
        }
    }

    /// Writes a plan.
    pub fn write_plan(&self, writer: &mut dyn Write, plan: &Plan) -> Result<()> {
        let context = "while writing a plan";
        for (step, action) in plan.iter() {
            writeln!(writer, "{}: {}", step, action.name()).context(context)?;
        }
        writeln!(writer, "makespan {}", plan.makespan()).context(context)?;
        writer.flush().context(context)
    }

    /// Writes the text associated with the fact no plan was found.
    pub fn write_no_plan(&self, writer: &mut dyn Write) -> Result<()> {
        let context = "while writing the absence of plan";
        writeln!(writer, "NO PLAN").context(context)?;
        writer.flush().context(context)
    }
}
