use crate::error::{HaploError, Result};
use crate::haplogroup::sample::SampleRecord;
use crate::haplogroup::session::{RejectedRecord, SampleBatch};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Read an HSD file (plain or compressed).
pub fn read_hsd(path: &Path) -> Result<SampleBatch> {
    let file = File::open(path)?;
    let (reader, _format) = niffler::get_reader(Box::new(file))?;
    parse_hsd(BufReader::new(reader))
}

/// Parse `id  range  haplogroup  poly...` lines.
///
/// The first content line is a header when it mentions `Range`. Lines missing a column
/// are rejected on their own; only I/O failures abort the whole file.
pub fn parse_hsd<R: BufRead>(reader: R) -> Result<SampleBatch> {
    let mut batch = SampleBatch::default();
    let mut seen_content = false;

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = idx + 1;
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }
        if !seen_content {
            seen_content = true;
            if line.contains("Range") {
                continue;
            }
        }

        let mut fields = line.split('\t').map(str::trim);
        let (id, range, haplogroup) = match (fields.next(), fields.next(), fields.next()) {
            (Some(id), Some(range), Some(haplogroup)) => (id, range, haplogroup),
            (id, _, _) => {
                let error = HaploError::input(
                    line_no,
                    "expected at least sample id, range and haplogroup columns",
                );
                log::warn!("Skipping line {}: {}", line_no, error);
                batch.rejected.push(RejectedRecord {
                    sample_id: id.unwrap_or_default().to_string(),
                    line: line_no,
                    error,
                });
                continue;
            }
        };

        let polymorphisms = fields
            .flat_map(str::split_whitespace)
            .map(str::to_string)
            .collect();

        batch.records.push(SampleRecord {
            id: id.to_string(),
            range: range.to_string(),
            haplogroup: match haplogroup {
                "" | "?" => None,
                claimed => Some(claimed.to_string()),
            },
            polymorphisms,
            line: line_no,
        });
    }

    log::debug!(
        "Read {} HSD records ({} unreadable lines)",
        batch.records.len(),
        batch.rejected.len()
    );
    Ok(batch)
}
