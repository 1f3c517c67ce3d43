pub mod aggregator;
pub mod chart;
pub mod cli;
pub mod constants;
pub mod dashboard;
pub mod error;
pub mod logging;
pub mod model;
pub mod pipeline;
pub mod resample;
pub mod session;
pub mod source;
pub mod table;
