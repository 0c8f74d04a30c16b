use crate::error::{HaploError, Result};
use crate::haplogroup::validation::validate_position;
use std::collections::HashMap;
use std::io::BufRead;

/// Per-position instability weights loaded next to a tree.
#[derive(Debug, Clone, Default)]
pub struct MutationRates {
    weights: HashMap<u32, f64>,
}

impl MutationRates {
    /// Weight of a position missing from the table.
    pub const NEUTRAL: f64 = 1.0;

    /// Read a `site<TAB>weight` table. The site's leading digits are the position.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut weights = HashMap::new();

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut fields = line.split_whitespace();
            let (site, weight) = match (fields.next(), fields.next()) {
                (Some(site), Some(weight)) => (site, weight),
                _ => {
                    return Err(HaploError::malformed(format!(
                        "weights line {}: expected '<site> <weight>'",
                        idx + 1
                    )))
                }
            };

            let digits: String = site.chars().take_while(|c| c.is_ascii_digit()).collect();
            let position: u32 = digits.parse().map_err(|_| {
                HaploError::malformed(format!("weights line {}: bad site '{}'", idx + 1, site))
            })?;
            validate_position(position)?;

            let weight: f64 = weight.parse().map_err(|_| {
                HaploError::malformed(format!("weights line {}: bad weight '{}'", idx + 1, weight))
            })?;
            if !weight.is_finite() || weight <= 0.0 {
                return Err(HaploError::malformed(format!(
                    "weights line {}: weight must be positive, got {}",
                    idx + 1,
                    weight
                )));
            }

            weights.insert(position, weight);
        }

        Ok(Self { weights })
    }

    pub fn parse(text: &str) -> Result<Self> {
        Self::from_reader(text.as_bytes())
    }

    pub fn weight(&self, position: u32) -> f64 {
        self.weights.get(&position).copied().unwrap_or(Self::NEUTRAL)
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

impl FromIterator<(u32, f64)> for MutationRates {
    fn from_iter<I: IntoIterator<Item = (u32, f64)>>(iter: I) -> Self {
        Self {
            weights: iter.into_iter().collect(),
        }
    }
}
