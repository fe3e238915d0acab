pub mod diagnostic_test;
pub mod patient;

pub use diagnostic_test::*;
pub use patient::*;
