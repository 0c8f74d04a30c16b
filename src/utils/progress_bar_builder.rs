use anyhow::Result;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

const SPINNER_TEMPLATE: &str = "{spinner:.green} {msg}";
const BAR_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}";

pub(crate) struct ProgressBarBuilder {
    message: String,
    length: Option<u64>,
    hidden: bool,
}

impl ProgressBarBuilder {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            length: None,
            hidden: false,
        }
    }

    /// Switch from a spinner to a bar counting up to `length`.
    pub(crate) fn with_length(mut self, length: u64) -> Self {
        self.length = Some(length);
        self
    }

    pub(crate) fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    pub(crate) fn build(self) -> Result<ProgressBar> {
        let pb = match self.length {
            Some(length) => {
                let pb = ProgressBar::new(length);
                pb.set_style(
                    ProgressStyle::default_bar()
                        .template(BAR_TEMPLATE)?
                        .progress_chars("#>-"),
                );
                pb
            }
            None => {
                let pb = ProgressBar::new_spinner();
                pb.set_style(ProgressStyle::default_spinner().template(SPINNER_TEMPLATE)?);
                pb.enable_steady_tick(Duration::from_millis(120));
                pb
            }
        };
        pb.set_message(self.message);

        if self.hidden {
            pb.set_draw_target(ProgressDrawTarget::hidden());
        }
        Ok(pb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_length() {
        let pb = ProgressBarBuilder::new("Classifying")
            .with_length(12)
            .hidden(true)
            .build()
            .unwrap();
        assert_eq!(pb.length(), Some(12));
        pb.inc(3);
        assert_eq!(pb.position(), 3);
    }
}
