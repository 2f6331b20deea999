//! Error types for trie construction and (de)serialization.

use std::io;
use thiserror::Error;

use crate::layout::{TrieType, ValueWidth};

#[derive(Error, Debug)]
pub enum TrieError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("buffer too short for {what}: need {needed} bytes, have {available}")]
    BufferTooShort {
        what: &'static str,
        needed: usize,
        available: usize,
    },

    #[error("buffer does not contain a serialized code point trie (signature {0:#010x})")]
    BadSignature(u32),

    #[error("trie header has an unsupported type ({0})")]
    UnsupportedType(u8),

    #[error("trie header has an unsupported value width ({0})")]
    UnsupportedValueWidth(u8),

    #[error("trie header has unsupported option bits set (options {0:#06x})")]
    ReservedOptions(u16),

    #[error(
        "trie is {actual_type:?}/{actual_width:?} but {expected_type:?}/{expected_width:?} was required"
    )]
    TypeMismatch {
        expected_type: Option<TrieType>,
        actual_type: TrieType,
        expected_width: Option<ValueWidth>,
        actual_width: ValueWidth,
    },

    #[error("malformed trie structure: {0}")]
    InvalidStructure(String),
}

pub type Result<T> = std::result::Result<T, TrieError>;

impl TrieError {
    pub(crate) fn structure(msg: impl Into<String>) -> Self {
        Self::InvalidStructure(msg.into())
    }
}
