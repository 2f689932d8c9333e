//! Wire envelope carried in zenoh payloads.
//!
//! Layout: `EPN1`, a little-endian `u32` header length, the JSON metadata
//! header, then the raw data bytes. Payloads without the magic prefix are
//! taken as bare data with empty metadata, so plain publishers (a JPEG camera
//! for instance) can feed a node directly.

use serde::{de::DeserializeOwned, Serialize};

use crate::{errors::Error, Result};

/// Per-event metadata, forwarded verbatim from inputs to the outputs they produce.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

const MAGIC: &[u8; 4] = b"EPN1";
const PREFIX_LEN: usize = MAGIC.len() + 4;

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub metadata: Metadata,
    pub data: Vec<u8>,
}

impl Message {
    pub fn new(metadata: Metadata, data: Vec<u8>) -> Self {
        Self { metadata, data }
    }

    pub fn json<T: Serialize + ?Sized>(metadata: Metadata, value: &T) -> Result<Self> {
        Ok(Self::new(metadata, serde_json::to_vec(value)?))
    }

    pub fn parse<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.data)?)
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        let header = serde_json::to_vec(&self.metadata)?;
        let header_len = u32::try_from(header.len())
            .map_err(|_| Error::Envelope(format!("header too large: {} bytes", header.len())))?;
        let mut buf = Vec::with_capacity(PREFIX_LEN + header.len() + self.data.len());
        buf.extend_from_slice(MAGIC);
        buf.extend_from_slice(&header_len.to_le_bytes());
        buf.extend_from_slice(&header);
        buf.extend_from_slice(&self.data);
        Ok(buf)
    }

    pub fn decode(payload: Vec<u8>) -> Result<Self> {
        if !payload.starts_with(MAGIC) {
            return Ok(Self::new(Metadata::new(), payload));
        }
        if payload.len() < PREFIX_LEN {
            return Err(Error::Envelope(format!(
                "truncated prefix: {} bytes",
                payload.len()
            )));
        }
        let mut len_bytes = [0u8; 4];
        len_bytes.copy_from_slice(&payload[MAGIC.len()..PREFIX_LEN]);
        let header_end = PREFIX_LEN + u32::from_le_bytes(len_bytes) as usize;
        if payload.len() < header_end {
            return Err(Error::Envelope(format!(
                "header ends at {header_end} but payload has {} bytes",
                payload.len()
            )));
        }
        let metadata = serde_json::from_slice(&payload[PREFIX_LEN..header_end])?;
        Ok(Self::new(metadata, payload[header_end..].to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn envelope_keeps_metadata_and_data() {
        let mut metadata = Metadata::new();
        metadata.insert("open_telemetry_context".into(), json!("abc"));
        metadata.insert("encoding".into(), json!("bgr8"));
        let message = Message::new(metadata, vec![0, 1, 2, 255]);

        let decoded = Message::decode(message.encode().unwrap()).unwrap();
        assert_eq!(decoded, message);
    }

    #[test]
    fn bare_payload_has_empty_metadata() {
        let jpeg_start = vec![0xff, 0xd8, 0xff, 0xe0];
        let decoded = Message::decode(jpeg_start.clone()).unwrap();
        assert!(decoded.metadata.is_empty());
        assert_eq!(decoded.data, jpeg_start);
    }

    #[test]
    fn truncated_header_is_rejected() {
        let mut payload = b"EPN1".to_vec();
        payload.extend_from_slice(&100u32.to_le_bytes());
        payload.extend_from_slice(b"{}");
        assert!(matches!(Message::decode(payload), Err(Error::Envelope(_))));
        assert!(matches!(
            Message::decode(b"EPN1\x01".to_vec()),
            Err(Error::Envelope(_))
        ));
    }

    #[test]
    fn json_payload() {
        let message = Message::json(Metadata::new(), &[5i64]).unwrap();
        assert_eq!(message.data, b"[5]");
        assert_eq!(message.parse::<Vec<i64>>().unwrap(), vec![5]);
    }
}
