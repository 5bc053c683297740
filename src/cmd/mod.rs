pub mod execute;
pub mod execution_plan;
pub mod report;
