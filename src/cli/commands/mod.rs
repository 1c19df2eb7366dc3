pub mod config;
pub mod lambda;
pub mod serve;
pub mod token;
