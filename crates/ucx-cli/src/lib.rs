pub mod cli;
pub mod scenario;
