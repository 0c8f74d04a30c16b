//! Haplogroup classification: polymorphisms, the phylotree, sample profiles,
//! ranking metrics and the per-run classification session.

pub mod annotation;
pub mod sample;
pub mod scoring;
pub mod session;
pub mod tree;
pub mod types;
pub mod validation;
pub mod weights;

pub use annotation::AnnotationTable;
pub use sample::{SampleProfile, SampleRange, SampleRecord};
pub use scoring::{DetailedResult, RankedResult, RankingMethod};
pub use session::{
    classify_sample, Classification, RejectedRecord, SampleBatch, SampleFile, TestSample,
};
pub use tree::{HaplogroupNode, NodeId, Phylotree, TreeSpec};
pub use types::{Annotation, Mutation, Polymorphism};
pub use weights::MutationRates;
