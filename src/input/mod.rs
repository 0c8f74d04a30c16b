//! Readers turning sample files into normalized [`SampleRecord`]s.

pub mod hsd;
pub mod vcf;

pub use crate::haplogroup::sample::SampleRecord;
pub use crate::haplogroup::session::SampleBatch;

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputFormat {
    #[value(name = "hsd")]
    Hsd,
    #[value(name = "vcf")]
    Vcf,
}
