//! Synchronous responses returned by the server process for each request.
//!
//! Every response leads with a signed status: zero or positive on success,
//! negative for a failure reported by the server.

use bytes::{BufMut, BytesMut};

use super::{
    Body,
    DecodeError,
    Decoder,
    Field,
    cursor::{PutFields, cstr_len},
    fixed::fixed_body,
};
use crate::types::{MessageTypes, ServiceDetails};

fixed_body! {
    /// The status-only response used by most requests.
    pub struct StatusResponse {
        pub status: i32,
    }

    /// Response to a service-record registration.
    pub struct ServiceRecordResponse {
        pub status: i32,
        pub service_record_handle: u32,
    }
}

/// Response to a current-folder query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CurrentFolderResponse {
    pub status: i32,
    pub folder_name: Option<String>,
}

impl CurrentFolderResponse {
    #[must_use]
    pub const fn size_for(name_len: usize) -> usize { Self::MIN_SIZE.saturating_add(name_len) }
}

impl Body for CurrentFolderResponse {
    const MIN_SIZE: usize = 8;

    fn size(&self) -> usize { Self::size_for(cstr_len(self.folder_name.as_deref())) }

    fn encode_body(&self, dst: &mut BytesMut) {
        let name = self.folder_name.as_deref();
        dst.put_i32(self.status);
        dst.put_len(cstr_len(name));
        dst.put_cstr(name);
    }

    fn decode_body(src: &mut Decoder<'_>) -> Result<Self, DecodeError> {
        let status = src.i32()?;
        let name_len = src.length()?;
        src.require(Self::size_for(name_len))?;
        Ok(Self {
            status,
            folder_name: src.cstr(name_len, "folder_name")?,
        })
    }
}

/// Response to a remote service parse.
///
/// Layout: status, record count, total name-buffer length, one 16-byte
/// record per service, then every service name back to back.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParseServicesResponse {
    pub status: i32,
    pub services: Vec<ServiceDetails>,
}

impl ParseServicesResponse {
    const RECORD_SIZE: usize = 16;

    #[must_use]
    pub const fn size_for(count: usize, names_len: usize) -> usize {
        Self::MIN_SIZE
            .saturating_add(count.saturating_mul(Self::RECORD_SIZE))
            .saturating_add(names_len)
    }

    fn names_len(&self) -> usize {
        self.services
            .iter()
            .map(|s| cstr_len(s.service_name.as_deref()))
            .sum()
    }
}

impl Body for ParseServicesResponse {
    const MIN_SIZE: usize = 12;

    fn size(&self) -> usize { Self::size_for(self.services.len(), self.names_len()) }

    fn encode_body(&self, dst: &mut BytesMut) {
        dst.put_i32(self.status);
        dst.put_len(self.services.len());
        dst.put_len(self.names_len());
        for service in &self.services {
            dst.put_u32(service.server_port);
            dst.put_u32(service.instance_id);
            service.supported_message_types.put(dst);
            dst.put_len(cstr_len(service.service_name.as_deref()));
        }
        for service in &self.services {
            dst.put_cstr(service.service_name.as_deref());
        }
    }

    fn decode_body(src: &mut Decoder<'_>) -> Result<Self, DecodeError> {
        let status = src.i32()?;
        let count = src.length()?;
        let names_len = src.length()?;
        src.require(Self::size_for(count, names_len))?;

        let mut records = Vec::with_capacity(count);
        for _ in 0..count {
            let server_port = src.u32()?;
            let instance_id = src.u32()?;
            let supported_message_types = MessageTypes::get(src)?;
            let name_len = src.length()?;
            records.push((server_port, instance_id, supported_message_types, name_len));
        }
        let implied: usize = records.iter().map(|r| r.3).fold(0, usize::saturating_add);
        if implied != names_len {
            return Err(DecodeError::Inconsistent {
                declared: names_len,
                implied,
            });
        }

        let services = records
            .into_iter()
            .map(|(server_port, instance_id, supported_message_types, name_len)| {
                Ok(ServiceDetails {
                    server_port,
                    instance_id,
                    supported_message_types,
                    service_name: src.cstr(name_len, "service_name")?,
                })
            })
            .collect::<Result<_, DecodeError>>()?;
        Ok(Self { status, services })
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn service() -> impl Strategy<Value = ServiceDetails> {
        (1u32..=30, 0u32..=255, 0u32..16, proptest::option::of("[ -~]{0,24}")).prop_map(
            |(server_port, instance_id, types, service_name)| ServiceDetails {
                server_port,
                instance_id,
                supported_message_types: MessageTypes::from_bits(types),
                service_name,
            },
        )
    }

    proptest! {
        #[test]
        fn parsed_services_round_trip(status in any::<i32>(), services in proptest::collection::vec(service(), 0..6)) {
            let body = ParseServicesResponse { status, services };
            let bytes = body.to_bytes();
            prop_assert_eq!(bytes.len(), body.size());
            prop_assert_eq!(ParseServicesResponse::from_bytes(&bytes), Ok(body));
        }
    }

    #[test]
    fn record_count_beyond_body_is_rejected() {
        let mut raw = BytesMut::new();
        raw.put_i32(0);
        raw.put_u32(3);
        raw.put_u32(0);
        raw.put_bytes(0, 16);
        assert_eq!(
            ParseServicesResponse::from_bytes(&raw),
            Err(DecodeError::Inconsistent {
                declared: 28,
                implied: 60
            })
        );
    }

    #[test]
    fn name_lengths_must_sum_to_buffer() {
        let body = ParseServicesResponse {
            status: 0,
            services: vec![ServiceDetails {
                server_port: 4,
                instance_id: 0,
                supported_message_types: MessageTypes::SMS_GSM,
                service_name: Some("MAS".into()),
            }],
        };
        let mut raw = BytesMut::from(&body.to_bytes()[..]);
        // Claim one fewer name byte than the record says.
        raw[8..12].copy_from_slice(&3u32.to_be_bytes());
        raw.truncate(raw.len() - 1);
        assert_eq!(
            ParseServicesResponse::from_bytes(&raw),
            Err(DecodeError::Inconsistent {
                declared: 3,
                implied: 4
            })
        );
    }

    #[test]
    fn absent_folder_name_decodes_to_none() {
        let body = CurrentFolderResponse {
            status: 0,
            folder_name: None,
        };
        assert_eq!(body.size(), CurrentFolderResponse::MIN_SIZE);
        assert_eq!(CurrentFolderResponse::from_bytes(&body.to_bytes()), Ok(body));
    }
}
