pub mod backup;
pub mod config;
pub mod export;
pub mod indexer;
pub mod log;
pub mod matcher;
pub mod parser;
pub mod session;
pub mod tally;
