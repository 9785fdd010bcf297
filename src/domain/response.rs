//! Response envelope shared by every adapter search

use serde::{Deserialize, Serialize};

/// Paging information for a search result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    /// Results the supplier reports in total, which may exceed `data.len()`
    pub total_results: usize,
    /// 1-based page number
    pub page: u32,
}

/// Successful search result
///
/// Failures are always returned as errors, so `success` is only ever `true`
/// on a constructed envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderResponse<T> {
    pub success: bool,
    pub data: Vec<T>,
    pub provider: String,
    pub metadata: ResponseMetadata,
}

impl<T> ProviderResponse<T> {
    /// Creates the first page of results
    pub fn new(provider: impl Into<String>, data: Vec<T>, total_results: usize) -> Self {
        Self {
            success: true,
            data,
            provider: provider.into(),
            metadata: ResponseMetadata {
                total_results,
                page: 1,
            },
        }
    }

    /// Sets the page number (builder pattern)
    pub fn with_page(mut self, page: u32) -> Self {
        self.metadata.page = page;
        self
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
