//! # Frame Codec
//!
//! A registration travels as the single data push of an `OP_RETURN` output:
//!
//! ```text
//! [0..4)   magic "byrd" (62 79 72 64)
//! [4..36)  content hash (32 bytes)
//! [36..80) name (44 bytes)
//! ```
//!
//! Anything else is not a frame. Decoding never fails loudly: foreign
//! `OP_RETURN` data and truncated payloads are simply skipped.

use bitcoin::opcodes::all::OP_RETURN;
use bitcoin::script::Instruction;
use bitcoin::{Script, TxOut};
use shared_types::{ContentHash, Name, CONTENT_HASH_LEN, NAME_LEN};

/// Protocol tag at the start of every payload.
pub const MAGIC: [u8; 4] = *b"byrd";

/// Total payload length.
pub const FRAME_LEN: usize = MAGIC.len() + CONTENT_HASH_LEN + NAME_LEN;

/// A decoded registration payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub content_hash: ContentHash,
    pub name: Name,
}

impl Frame {
    pub fn new(name: Name, content_hash: ContentHash) -> Self {
        Self { content_hash, name }
    }

    /// `magic || contentHash || name`.
    pub fn encode(&self) -> [u8; FRAME_LEN] {
        let mut out = [0u8; FRAME_LEN];
        out[..4].copy_from_slice(&MAGIC);
        out[4..4 + CONTENT_HASH_LEN].copy_from_slice(self.content_hash.as_bytes());
        out[4 + CONTENT_HASH_LEN..].copy_from_slice(self.name.as_bytes());
        out
    }
}

/// Decode a raw payload. Returns `None` unless the magic matches and the
/// length is exactly [`FRAME_LEN`].
pub fn decode_payload(payload: &[u8]) -> Option<Frame> {
    if payload.len() != FRAME_LEN || payload[..4] != MAGIC {
        return None;
    }
    let content_hash = ContentHash::try_from(&payload[4..4 + CONTENT_HASH_LEN]).ok()?;
    let name = Name::try_from(&payload[4 + CONTENT_HASH_LEN..]).ok()?;
    Some(Frame { content_hash, name })
}

/// Extract the data carried by a null-data output: `OP_RETURN` followed by
/// exactly one push.
pub fn null_data(script: &Script) -> Option<&[u8]> {
    let mut instructions = script.instructions();
    match instructions.next()? {
        Ok(Instruction::Op(op)) if op == OP_RETURN => {}
        _ => return None,
    }
    let data = match instructions.next()? {
        Ok(Instruction::PushBytes(bytes)) => bytes.as_bytes(),
        _ => return None,
    };
    if instructions.next().is_some() {
        return None;
    }
    Some(data)
}

/// Decode the frame carried by a transaction output, if any.
pub fn decode_output(output: &TxOut) -> Option<Frame> {
    null_data(&output.script_pubkey).and_then(decode_payload)
}
