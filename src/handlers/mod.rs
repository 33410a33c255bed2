pub mod attendance;
pub mod company;
pub mod employee;
pub mod general;
pub mod payroll;
pub mod rates;
pub mod salary_head;
pub mod user;
