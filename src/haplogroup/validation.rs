use crate::error::{HaploError, Result};

/// Length of the revised Cambridge Reference Sequence (rCRS).
pub const MT_LENGTH: u32 = 16569;

pub fn validate_position(position: u32) -> Result<u32> {
    if (1..=MT_LENGTH).contains(&position) {
        Ok(position)
    } else {
        Err(HaploError::InvalidRange(format!(
            "position {} is outside 1-{}",
            position, MT_LENGTH
        )))
    }
}

pub fn validate_span(start: u32, end: u32) -> Result<(u32, u32)> {
    validate_position(start)?;
    validate_position(end)?;
    if start > end {
        return Err(HaploError::InvalidRange(format!(
            "span {}-{} ends before it starts",
            start, end
        )));
    }
    Ok((start, end))
}
