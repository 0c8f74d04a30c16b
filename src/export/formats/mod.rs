pub mod haplogroup;
pub mod tabular;
