//! Remote service providers.

pub mod gemini;
pub mod shared;

pub use shared::{
    ProviderError, ProviderErrorKind, ProviderResult, USER_AGENT, resolve_api_key,
    resolve_base_url,
};
