use crate::haplogroup::session::SampleFile;
use crate::haplogroup::types::Polymorphism;
use std::io::{self, Write};

/// Column layout of the delimited report.
#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportLayout {
    /// Sample, range, haplogroup and score.
    #[value(name = "simple")]
    Simple,
    /// Adds the supporting polymorphism lists.
    #[value(name = "extended")]
    Extended,
}

const SIMPLE_HEADER: &str = "SampleID\tRange\tHaplogroup\tOverall_Rank";
const EXTENDED_COLUMNS: &str =
    "Not_Found_Polys\tFound_Polys\tRemaining_Polys\tAAC_In_Remainings\tInput_Sample";

fn joined<'a>(polys: impl IntoIterator<Item = &'a Polymorphism>) -> String {
    let mut rendered: Vec<&Polymorphism> = polys.into_iter().collect();
    rendered.sort();
    rendered
        .iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

fn annotated<'a>(polys: impl IntoIterator<Item = &'a Polymorphism>) -> String {
    let mut rendered: Vec<&Polymorphism> = polys.into_iter().collect();
    rendered.sort();
    rendered
        .iter()
        .filter_map(|p| {
            p.annotation().map(|a| {
                let codon = a.codon.map(|c| c.to_string()).unwrap_or_default();
                let change = a.amino_acid_change.as_deref().unwrap_or_default();
                format!("{} [{}| Codon {} | {} ]", p, change, codon, a.gene)
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Write one row per retained result, samples ordered by id.
pub fn write_report<W: Write>(
    session: &SampleFile,
    layout: ReportLayout,
    mut writer: W,
) -> io::Result<()> {
    match layout {
        ReportLayout::Simple => writeln!(writer, "{}", SIMPLE_HEADER)?,
        ReportLayout::Extended => writeln!(writer, "{}\t{}", SIMPLE_HEADER, EXTENDED_COLUMNS)?,
    }

    for sample in session.sorted_samples() {
        let profile = sample.profile();
        let classification = match sample.classification() {
            Some(classification) => classification,
            None => continue,
        };

        for result in &classification.results {
            write!(
                writer,
                "{}\t{}\t{}\t{:.4}",
                profile.id(),
                profile.range(),
                result.haplogroup,
                result.score
            )?;

            if layout == ReportLayout::Extended {
                let detailed = &result.detailed;
                write!(
                    writer,
                    "\t{}\t{}\t{}\t{}\t{}",
                    joined(&detailed.not_found),
                    joined(&detailed.found),
                    joined(&detailed.remaining),
                    annotated(&detailed.remaining),
                    joined(profile.polymorphisms())
                )?;
            }
            writeln!(writer)?;
        }
    }

    writer.flush()
}
