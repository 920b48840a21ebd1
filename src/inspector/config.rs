// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Inspector configuration

use crate::store::StoreConfig;

/// Inspector configuration
#[derive(Debug, Clone)]
pub struct InspectorConfig {
    /// Enable interception on construction and disable it on drop
    pub auto_enabled: bool,
    /// Keep request and response bodies
    pub capture_bodies: bool,
    /// Truncate string bodies to this many characters
    pub max_body_chars: Option<usize>,
    /// Maximum records to keep
    pub max_records: usize,
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self {
            auto_enabled: false,
            capture_bodies: true,
            max_body_chars: None,
            max_records: 1000,
        }
    }
}

impl InspectorConfig {
    /// Create a new inspector config
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable on construction
    pub fn auto_enabled(mut self, enabled: bool) -> Self {
        self.auto_enabled = enabled;
        self
    }

    /// Capture bodies
    pub fn capture_bodies(mut self, capture: bool) -> Self {
        self.capture_bodies = capture;
        self
    }

    /// Set body limit
    pub fn max_body_chars(mut self, limit: usize) -> Self {
        self.max_body_chars = Some(limit);
        self
    }

    /// Set max records
    pub fn max_records(mut self, max: usize) -> Self {
        self.max_records = max;
        self
    }

    pub(crate) fn store_config(&self) -> StoreConfig {
        StoreConfig {
            max_records: self.max_records,
            capture_bodies: self.capture_bodies,
            max_body_chars: self.max_body_chars,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = InspectorConfig::new()
            .auto_enabled(true)
            .capture_bodies(false)
            .max_body_chars(64)
            .max_records(10);

        let store = config.store_config();
        assert!(config.auto_enabled);
        assert!(!store.capture_bodies);
        assert_eq!(store.max_body_chars, Some(64));
        assert_eq!(store.max_records, 10);
    }
}
