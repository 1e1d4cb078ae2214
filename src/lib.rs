pub mod distribution;
pub mod error;
pub mod input;
pub mod output;
pub mod per_country;
pub mod pipeline;
pub mod registry;
pub mod regularize;
