pub mod clock;
pub mod config;
pub mod dataset;
pub mod emp_number;
pub mod employee;
pub mod engagement_score;
pub mod error;
pub mod generator;
pub mod name_generator;
pub mod pipeline;
pub mod registry;
pub mod report;
pub mod rng;
pub mod search;
pub mod skill;
pub mod store;
pub mod types;
