pub mod board;
pub mod pods;
