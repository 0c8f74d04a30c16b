use crate::error::{HaploError, Result};
use crate::haplogroup::types::{Annotation, Polymorphism};
use std::collections::HashMap;
use std::io::BufRead;

/// Gene/codon/amino-acid annotations keyed by polymorphism.
#[derive(Debug, Clone, Default)]
pub struct AnnotationTable {
    entries: HashMap<Polymorphism, Annotation>,
}

impl AnnotationTable {
    /// Read `position  mutation  gene  codon  aa_change` rows; a non-numeric first row is a header.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut entries = HashMap::new();

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let line_no = idx + 1;
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }

            let fields: Vec<&str> = line.split('\t').map(str::trim).collect();
            if idx == 0 && fields[0].parse::<u32>().is_err() {
                continue;
            }
            if fields.len() < 3 {
                return Err(HaploError::input(
                    line_no,
                    "annotation rows need position, mutation and gene",
                ));
            }

            let poly: Polymorphism = format!("{}{}", fields[0], fields[1]).parse()?;
            let codon = match fields.get(3).filter(|f| !f.is_empty()) {
                Some(codon) => Some(codon.parse::<u32>().map_err(|_| {
                    HaploError::input(line_no, format!("bad codon number '{}'", codon))
                })?),
                None => None,
            };
            let amino_acid_change = fields
                .get(4)
                .filter(|f| !f.is_empty())
                .map(|f| f.to_string());

            entries.insert(
                poly,
                Annotation {
                    gene: fields[2].to_string(),
                    codon,
                    amino_acid_change,
                },
            );
        }

        Ok(Self { entries })
    }

    pub fn get(&self, poly: &Polymorphism) -> Option<&Annotation> {
        self.entries.get(poly)
    }

    pub fn annotate(&self, poly: Polymorphism) -> Polymorphism {
        match self.entries.get(&poly) {
            Some(annotation) => poly.with_annotation(annotation.clone()),
            None => poly,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
