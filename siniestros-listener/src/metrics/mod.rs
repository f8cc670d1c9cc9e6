pub mod counters;
pub mod service;
