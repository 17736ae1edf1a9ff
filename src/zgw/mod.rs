// ZGW (target protocol) support: the canonical translation model that
// converters produce and the REST client that executes it.

pub mod client;
pub mod model;

pub use client::{HttpZgwClient, ZgwClient};
pub use model::{TranslationRequest, TranslationResult, ZgwOperation};
