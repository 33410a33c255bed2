pub mod attendance;
pub mod payroll;
pub mod rates;
pub mod report;
