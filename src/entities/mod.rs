pub mod announcement;
pub mod application;
pub mod company;
pub mod job;
pub mod student;

pub use announcement::*;
pub use application::*;
pub use company::*;
pub use job::*;
pub use student::*;
