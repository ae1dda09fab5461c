use crate::{config::CascadeConfig, value::Document};

/// Bytes charged per character of a document's JSON rendering.
pub const BYTES_PER_SERIALIZED_CHAR: u64 = 8;

/// Upper-bound size estimate for one document.
#[must_use]
pub fn estimate_document_bytes(doc: &Document) -> u64 {
    let chars = serde_json::to_string(doc).map_or(0, |json| json.len());

    u64::try_from(chars)
        .unwrap_or(u64::MAX)
        .saturating_mul(BYTES_PER_SERIALIZED_CHAR)
}

///
/// PageLimits
/// Clamped limits for one index scan.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PageLimits {
    pub num_items: u64,
    pub max_bytes: u64,
}

///
/// Budget
///
/// Per-step resource accounting. Created fresh for every step; never
/// persisted into a continuation.
///
/// `largest_document` is the biggest per-document average of any page
/// recorded so far. The step counts as exhausted once the remaining byte
/// allowance could not hold another document of that size.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Budget {
    documents_processed: u64,
    bytes_read: u64,
    largest_document: u64,
    max_documents: u64,
    max_bytes: u64,
}

impl Budget {
    #[must_use]
    pub const fn new(max_documents: u64, max_bytes: u64) -> Self {
        Self {
            documents_processed: 0,
            bytes_read: 0,
            largest_document: 0,
            max_documents,
            max_bytes,
        }
    }

    #[must_use]
    pub const fn from_config(config: &CascadeConfig) -> Self {
        Self::new(config.max_documents_per_step, config.max_bytes_per_step)
    }

    /// Limits for the next scan. Never below one item and one byte, so every
    /// scan can make progress.
    #[must_use]
    pub const fn clamp(&self, requested_items: u64) -> PageLimits {
        let num_items = requested_items.saturating_sub(self.documents_processed);
        let max_bytes = self.remaining_bytes();

        PageLimits {
            num_items: if num_items == 0 { 1 } else { num_items },
            max_bytes: if max_bytes == 0 { 1 } else { max_bytes },
        }
    }

    pub const fn record(&mut self, documents: u64, bytes: u64) {
        self.documents_processed = self.documents_processed.saturating_add(documents);
        self.bytes_read = self.bytes_read.saturating_add(bytes);

        if documents > 0 {
            let per_document = bytes.div_ceil(documents);
            if per_document > self.largest_document {
                self.largest_document = per_document;
            }
        }
    }

    #[must_use]
    pub const fn exceeded(&self) -> bool {
        if self.documents_processed >= self.max_documents || self.bytes_read >= self.max_bytes {
            return true;
        }

        self.largest_document > 0 && self.remaining_bytes() < self.largest_document
    }

    /// True when applying a page of `bytes` would push a step that has
    /// already done work past its byte cap. A fresh step always accepts its
    /// first page so an oversized document still makes progress.
    #[must_use]
    pub const fn would_overflow(&self, bytes: u64) -> bool {
        let started = self.documents_processed > 0 || self.bytes_read > 0;

        started && self.bytes_read.saturating_add(bytes) > self.max_bytes
    }

    const fn remaining_bytes(&self) -> u64 {
        self.max_bytes.saturating_sub(self.bytes_read)
    }

    #[must_use]
    pub const fn documents_processed(&self) -> u64 {
        self.documents_processed
    }

    #[must_use]
    pub const fn bytes_read(&self) -> u64 {
        self.bytes_read
    }
}

///
/// TESTS
///
