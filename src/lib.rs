pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod export;
pub mod haplogroup;
pub mod input;
pub mod utils;

// Re-export main API
pub use error::{HaploError, Result};
pub use haplogroup::{
    Classification, Phylotree, Polymorphism, RankedResult, RankingMethod, SampleFile, SampleProfile,
    SampleRange,
};
pub use utils::cache::TreeCache;
