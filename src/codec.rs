use crate::Result;
use serde_json::{Map, Value};

/// The unit persisted in a data file: string keys to arbitrary values.
pub type Mapping = Map<String, Value>;

/// Turns a whole [`Mapping`] into bytes and back.
///
/// Implementations must round-trip: `decode(encode(m))` equals `m` for every
/// value the format can represent.
pub trait Codec: Send + Sync {
    fn encode(&self, mapping: &Mapping) -> Result<Vec<u8>>;

    fn decode(&self, bytes: &[u8]) -> Result<Mapping>;
}

/// Compact JSON object, e.g. `{"foo":"[1,2,3]"}`.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode(&self, mapping: &Mapping) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(mapping)?)
    }

    fn decode(&self, bytes: &[u8]) -> Result<Mapping> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// MessagePack map.
///
/// Values go through `serde_json::Value`, so files holding bin or ext values
/// or non-string map keys fail to decode.
#[derive(Debug, Default, Clone, Copy)]
pub struct MsgpackCodec;

impl Codec for MsgpackCodec {
    fn encode(&self, mapping: &Mapping) -> Result<Vec<u8>> {
        Ok(rmp_serde::to_vec(mapping)?)
    }

    fn decode(&self, bytes: &[u8]) -> Result<Mapping> {
        Ok(rmp_serde::from_slice(bytes)?)
    }
}
