use crate::error::Result;
use crate::haplogroup::sample::SampleRecord;
use crate::haplogroup::session::SampleBatch;
use rust_htslib::bcf::{self, Read};
use std::path::Path;

const FULL_RANGE: &str = "1-16569";

/// Turn a multi-sample VCF/BCF into one record per sample.
///
/// Homoplasmic alternate calls are always kept; heteroplasmic calls only when the
/// `HF` FORMAT field reaches `heteroplasmy_threshold`. Only single-base substitutions
/// are read. Samples left without variants are dropped.
pub fn read_vcf(path: &Path, heteroplasmy_threshold: f64) -> Result<SampleBatch> {
    let mut reader = bcf::Reader::from_path(path)?;
    let samples: Vec<String> = reader
        .header()
        .samples()
        .iter()
        .map(|name| String::from_utf8_lossy(name).into_owned())
        .collect();
    let mut profiles: Vec<Vec<String>> = vec![Vec::new(); samples.len()];

    for result in reader.records() {
        let record = result?;
        let position = record.pos() + 1;
        let alleles: Vec<String> = record
            .alleles()
            .iter()
            .map(|allele| String::from_utf8_lossy(allele).to_ascii_uppercase())
            .collect();
        let genotypes = record.genotypes()?;
        let heteroplasmy: Option<Vec<f32>> = record.format(b"HF").float().ok().map(|values| {
            values
                .iter()
                .map(|per_sample| per_sample.first().copied().unwrap_or(f32::NAN))
                .collect()
        });

        for (idx, tokens) in profiles.iter_mut().enumerate() {
            let genotype = genotypes.get(idx);
            let called: Vec<u32> = genotype.iter().filter_map(|allele| allele.index()).collect();
            let alt = match called.iter().copied().find(|&allele| allele != 0) {
                Some(alt) => alt,
                None => continue,
            };
            let token = match snv_token(position, &alleles, alt as usize) {
                Some(token) => token,
                None => continue,
            };

            let homoplasmic = called.iter().all(|&allele| allele == alt);
            let frequent = heteroplasmy
                .as_ref()
                .and_then(|values| values.get(idx))
                .is_some_and(|&hf| !hf.is_nan() && f64::from(hf) >= heteroplasmy_threshold);

            if homoplasmic || frequent {
                tokens.push(token);
            } else {
                log::debug!(
                    "Dropping heteroplasmic call {} for sample '{}'",
                    token,
                    samples[idx]
                );
            }
        }
    }

    let records: Vec<SampleRecord> = samples
        .into_iter()
        .zip(profiles)
        .filter(|(_, tokens)| !tokens.is_empty())
        .map(|(id, polymorphisms)| SampleRecord {
            id,
            range: FULL_RANGE.to_string(),
            haplogroup: None,
            polymorphisms,
            line: 0,
        })
        .collect();

    log::debug!("Read {} samples with variants from VCF", records.len());
    Ok(SampleBatch {
        records,
        rejected: Vec::new(),
    })
}

fn snv_token(position: i64, alleles: &[String], alt: usize) -> Option<String> {
    let reference = alleles.first()?;
    let alternate = alleles.get(alt)?;
    let base = alternate.chars().next()?;
    if reference.len() != 1 || alternate.len() != 1 || !"ACGT".contains(base) {
        return None;
    }
    Some(format!("{}{}", position, base))
}
