//! Mock backend for testing
//!
//! Returns a predictable tip list without a running LLM server.

use async_trait::async_trait;

use crate::error::{Error, Result};

use super::TextGenerator;

#[derive(Clone, Default)]
pub struct MockBackend {
    /// Whether health_check should return true
    pub healthy: bool,
    /// When set, `generate` fails with a dependency error
    pub failing: bool,
}

impl MockBackend {
    /// Create a new mock backend (healthy by default)
    pub fn new() -> Self {
        Self {
            healthy: true,
            failing: false,
        }
    }

    pub fn unhealthy() -> Self {
        Self {
            healthy: false,
            failing: false,
        }
    }

    /// A backend whose generation always fails
    pub fn failing() -> Self {
        Self {
            healthy: false,
            failing: true,
        }
    }
}

#[async_trait]
impl TextGenerator for MockBackend {
    async fn generate(&self, prompt: &str) -> Result<String> {
        if self.failing {
            return Err(Error::DependencyFailure("mock generator unavailable".into()));
        }
        Ok(format!(
            "1. Revise seus gastos recorrentes.\n2. Reserve parte da renda.\n3. Acompanhe seu orçamento.\n({} caracteres analisados)",
            prompt.chars().count()
        ))
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}
