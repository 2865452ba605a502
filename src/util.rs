pub mod date;
pub mod rw;
pub mod sys;
