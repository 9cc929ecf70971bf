pub mod config;
pub mod financial;
pub mod output;
pub mod parse;
pub mod pto;
pub mod retrospective;
pub mod schedule;
pub mod seasonal;
pub mod server;
pub mod settings;
pub mod weather;
