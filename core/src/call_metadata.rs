// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use std::collections::HashMap;
use tonic::metadata::MetadataMap;

/// Metadata key carrying the per-call failure percentage
pub const FAIL_PERCENT_KEY: &str = "failpercent";

/// Metadata key carrying the per-call failure code list
pub const FAIL_CODES_KEY: &str = "failcodes";

/// Read-only view over the metadata attached to an inbound call.
/// Keys are always lower case.
pub trait CallMetadata {
    /// First value stored under `key`
    fn get_single(&self, key: &str) -> Option<String>;

    /// Every value stored under `key`, in arrival order
    fn get_list(&self, key: &str) -> Vec<String>;
}

// Values with non visible ASCII bytes are still reported as present. The
// replacement characters make them fail integer parsing downstream.
impl CallMetadata for MetadataMap {
    fn get_single(&self, key: &str) -> Option<String> {
        self.get(key).map(|value| lossy_text(value.as_bytes()))
    }

    fn get_list(&self, key: &str) -> Vec<String> {
        self.get_all(key)
            .iter()
            .map(|value| lossy_text(value.as_bytes()))
            .collect()
    }
}

fn lossy_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

impl CallMetadata for HashMap<String, Vec<String>> {
    fn get_single(&self, key: &str) -> Option<String> {
        self.get(key).and_then(|values| values.first()).cloned()
    }

    fn get_list(&self, key: &str) -> Vec<String> {
        self.get(key).cloned().unwrap_or_default()
    }
}
