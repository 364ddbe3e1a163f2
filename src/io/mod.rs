//! Input/output functions and objects.

mod plan_writer;
pub use plan_writer::PlanWriter;

mod problem_reader;
pub use problem_reader::ProblemReader;
pub use problem_reader::WarningHandler;
