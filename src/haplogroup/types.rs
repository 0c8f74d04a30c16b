use crate::error::{HaploError, Result};
use crate::haplogroup::validation::validate_position;
use serde::{Deserialize, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

// IUPAC codes accepted as substitutions. `D` is left out: it reads as a deletion.
const SUBSTITUTION_CODES: &str = "ACGTRYKMSWBHVN";
const INSERTED_BASES: &str = "ACGTN";

/// The change a polymorphism makes relative to the reference sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Mutation {
    /// Substitution to the given base, e.g. `73G`.
    Base(char),
    /// Bases inserted after the position, e.g. `315.1C`.
    Insertion { index: u32, bases: String },
    /// Deletion of the reference base, e.g. `8281d`.
    Deletion,
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mutation::Base(base) => write!(f, "{}", base),
            Mutation::Insertion { index, bases } => write!(f, ".{}{}", index, bases),
            Mutation::Deletion => write!(f, "d"),
        }
    }
}

/// Functional annotation of a coding-region polymorphism.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub gene: String,
    pub codon: Option<u32>,
    pub amino_acid_change: Option<String>,
}

/// One sequence variant. Identity is `(position, mutation)`; the annotation rides along.
#[derive(Debug, Clone)]
pub struct Polymorphism {
    position: u32,
    mutation: Mutation,
    annotation: Option<Annotation>,
}

impl Polymorphism {
    pub fn new(position: u32, mutation: Mutation) -> Result<Self> {
        validate_position(position)?;
        Ok(Self {
            position,
            mutation,
            annotation: None,
        })
    }

    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotation = Some(annotation);
        self
    }

    pub fn position(&self) -> u32 {
        self.position
    }

    pub fn mutation(&self) -> &Mutation {
        &self.mutation
    }

    pub fn annotation(&self) -> Option<&Annotation> {
        self.annotation.as_ref()
    }

    /// The site a back mutation cancels: the position, refined by insertion index.
    pub fn site(&self) -> (u32, u32) {
        match &self.mutation {
            Mutation::Insertion { index, .. } => (self.position, *index),
            _ => (self.position, 0),
        }
    }

    /// Parse one token, expanding deletion ranges such as `8281-8289d`.
    pub fn parse_token(token: &str) -> Result<Vec<Polymorphism>> {
        let token = token.trim();
        let invalid = || HaploError::InvalidPolymorphism(token.to_string());

        if let Some((start, rest)) = token.split_once('-') {
            let start: u32 = start.parse().map_err(|_| invalid())?;
            let digits = rest.len() - rest.trim_start_matches(|c: char| c.is_ascii_digit()).len();
            let end: u32 = rest[..digits].parse().map_err(|_| invalid())?;
            if !is_deletion_suffix(&rest[digits..]) {
                return Err(invalid());
            }
            crate::haplogroup::validation::validate_span(start, end)?;
            return (start..=end)
                .map(|position| Polymorphism::new(position, Mutation::Deletion))
                .collect();
        }

        token.parse().map(|poly| vec![poly])
    }
}

fn is_deletion_suffix(code: &str) -> bool {
    matches!(code, "d" | "D" | "del" | "DEL" | "Del")
}

impl FromStr for Polymorphism {
    type Err = HaploError;

    fn from_str(token: &str) -> Result<Self> {
        let token = token.trim();
        let invalid = || HaploError::InvalidPolymorphism(token.to_string());

        let digits = token.len() - token.trim_start_matches(|c: char| c.is_ascii_digit()).len();
        if digits == 0 {
            return Err(invalid());
        }
        let position: u32 = token[..digits].parse().map_err(|_| invalid())?;
        let code = &token[digits..];

        let mutation = if let Some(insertion) = code.strip_prefix('.') {
            let index_len =
                insertion.len() - insertion.trim_start_matches(|c: char| c.is_ascii_digit()).len();
            let index: u32 = insertion[..index_len].parse().map_err(|_| invalid())?;
            let bases = insertion[index_len..].to_ascii_uppercase();
            if index == 0
                || bases.is_empty()
                || !bases.chars().all(|c| INSERTED_BASES.contains(c))
            {
                return Err(invalid());
            }
            Mutation::Insertion { index, bases }
        } else if is_deletion_suffix(code) {
            Mutation::Deletion
        } else {
            let mut chars = code.chars();
            match (chars.next(), chars.next()) {
                (Some(base), None) if SUBSTITUTION_CODES.contains(base.to_ascii_uppercase()) => {
                    Mutation::Base(base.to_ascii_uppercase())
                }
                _ => return Err(invalid()),
            }
        };

        Polymorphism::new(position, mutation)
    }
}

impl fmt::Display for Polymorphism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.position, self.mutation)
    }
}

impl PartialEq for Polymorphism {
    fn eq(&self, other: &Self) -> bool {
        self.position == other.position && self.mutation == other.mutation
    }
}

impl Eq for Polymorphism {}

impl Hash for Polymorphism {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.position.hash(state);
        self.mutation.hash(state);
    }
}

impl PartialOrd for Polymorphism {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Polymorphism {
    fn cmp(&self, other: &Self) -> Ordering {
        self.position
            .cmp(&other.position)
            .then_with(|| self.mutation.cmp(&other.mutation))
    }
}

impl Serialize for Polymorphism {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
