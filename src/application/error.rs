use std::error::Error as StdError;

use thiserror::Error;

use crate::{application::render::RenderError, config::LoadError, infra::error::InfraError};

/// Failures surfaced by the binary.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to load configuration: {0}")]
    Config(#[from] LoadError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error("{input}: {source}")]
    Render {
        input: String,
        #[source]
        source: RenderError,
    },
    #[error("{failed} of {total} inputs failed")]
    Batch { failed: usize, total: usize },
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn render(input: impl Into<String>, source: RenderError) -> Self {
        Self::Render {
            input: input.into(),
            source,
        }
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }

    /// The error followed by each of its sources, outermost first.
    pub fn chain(&self) -> Vec<String> {
        let mut messages = vec![self.to_string()];
        let mut current = self.source();
        while let Some(inner) = current {
            messages.push(inner.to_string());
            current = inner.source();
        }
        messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_walks_sources() {
        let error = AppError::render(
            "plan.json",
            RenderError::malformed("slides", "expected 9 slides, found 8"),
        );
        assert_eq!(
            error.chain(),
            vec![
                "plan.json: malformed record at `slides`: expected 9 slides, found 8".to_string(),
                "malformed record at `slides`: expected 9 slides, found 8".to_string(),
            ]
        );
    }
}
