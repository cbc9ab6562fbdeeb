//! Shared response types

use serde::{Deserialize, Serialize};

/// Body for operations that acknowledge success without data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}
