// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::call_metadata::{FAIL_CODES_KEY, FAIL_PERCENT_KEY};
use crate::fault_config::join_fail_codes;
use tonic::metadata::errors::InvalidMetadataValue;
use tonic::metadata::{Ascii, MetadataValue};
use tonic::service::Interceptor;
use tonic::{Code, Request, Status};

/// Client side interceptor that stamps every outbound call with the
/// client's failure parameters so the server applies them to that call.
#[derive(Debug, Clone)]
pub struct FailureMetadataStamper {
    fail_percent: MetadataValue<Ascii>,
    fail_codes: Option<MetadataValue<Ascii>>,
}

impl FailureMetadataStamper {
    /// An empty `codes` list sends no `failcodes` entry, leaving the code
    /// choice to the server.
    pub fn new(fail_percent: u32, codes: &[Code]) -> Result<Self, InvalidMetadataValue> {
        let fail_codes = if codes.is_empty() {
            None
        } else {
            Some(MetadataValue::try_from(join_fail_codes(codes))?)
        };

        Ok(Self {
            fail_percent: MetadataValue::from(fail_percent),
            fail_codes,
        })
    }
}

impl Interceptor for FailureMetadataStamper {
    fn call(&mut self, mut request: Request<()>) -> Result<Request<()>, Status> {
        let metadata = request.metadata_mut();
        metadata.insert(FAIL_PERCENT_KEY, self.fail_percent.clone());
        if let Some(fail_codes) = &self.fail_codes {
            metadata.insert(FAIL_CODES_KEY, fail_codes.clone());
        }
        Ok(request)
    }
}
