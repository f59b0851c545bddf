//! Errors raised at the JavaScript boundary.
//!
//! Layout itself never fails: bad input degrades to an empty result or a
//! recorded warning. Only decoding and encoding values across the wasm
//! boundary can go wrong.

#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("invalid {what}: {message}")]
    Decode { what: &'static str, message: String },
    #[error("failed to encode layout result: {message}")]
    Encode { message: String },
}

impl LayoutError {
    pub fn decode(what: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Decode {
            what,
            message: err.to_string(),
        }
    }

    pub fn encode(err: impl std::fmt::Display) -> Self {
        Self::Encode {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LayoutError>;
