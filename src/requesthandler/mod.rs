// Request handlers own execution against the target protocol for one
// operation category. The converter-to-handler mapping comes from the
// routing table; the factory only knows how to build each category.

pub mod create;
pub mod generate;
pub mod retrieve;

pub use create::CreateRequestHandler;
pub use generate::GenerateRequestHandler;
pub use retrieve::RetrieveRequestHandler;

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::HandlerCategory;
use crate::converter::Converter;
use crate::cycle::{RequestResponseCycle, TranslationResponse};
use crate::db::CycleStore;
use crate::errors::{GatewayError, Result};
use crate::zgw::client::ZgwClient;

/// Execution strategy bound to one resolved converter.
///
/// Lifecycle per request: the dispatcher calls `save` before execution
/// (fatal on failure), then `execute` exactly once, then `save` again with
/// the completed cycle. Execution is single-pass; retry is not this layer's
/// concern.
#[async_trait]
pub trait RequestHandler: Send + Sync {
    fn name(&self) -> &'static str;

    /// Idempotent upsert of the current cycle snapshot, keyed by
    /// referentienummer.
    async fn save(&self, cycle: &RequestResponseCycle) -> Result<()>;

    /// Decode, invoke the target protocol, encode the response.
    async fn execute(&self, cycle: &mut RequestResponseCycle) -> Result<TranslationResponse>;
}

/// Handler for the capability entry point. Exists so that the no-argument
/// surface resolves to a full converter/handler pair; it never executes and
/// never touches the store.
pub struct DiscoveryRequestHandler;

#[async_trait]
impl RequestHandler for DiscoveryRequestHandler {
    fn name(&self) -> &'static str {
        "DiscoveryRequestHandler"
    }

    async fn save(&self, _cycle: &RequestResponseCycle) -> Result<()> {
        Ok(())
    }

    async fn execute(&self, _cycle: &mut RequestResponseCycle) -> Result<TranslationResponse> {
        Err(GatewayError::Unknown(
            "Discovery handler is not executable".to_string(),
        ))
    }
}

/// Builds the handler variant for a resolved converter's category.
pub struct RequestHandlerFactory {
    store: Arc<dyn CycleStore>,
    client: Arc<dyn ZgwClient>,
}

impl RequestHandlerFactory {
    pub fn new(store: Arc<dyn CycleStore>, client: Arc<dyn ZgwClient>) -> Self {
        Self { store, client }
    }

    pub fn resolve(&self, converter: Arc<dyn Converter>) -> Result<Box<dyn RequestHandler>> {
        match converter.category() {
            HandlerCategory::Generate => Ok(Box::new(GenerateRequestHandler::new(
                converter,
                Arc::clone(&self.client),
                Arc::clone(&self.store),
            ))),
            HandlerCategory::Create => Ok(Box::new(CreateRequestHandler::new(
                converter,
                Arc::clone(&self.client),
                Arc::clone(&self.store),
            ))),
            HandlerCategory::Retrieve => Ok(Box::new(RetrieveRequestHandler::new(
                converter,
                Arc::clone(&self.client),
                Arc::clone(&self.store),
            ))),
            HandlerCategory::Discovery => Ok(Box::new(DiscoveryRequestHandler)),
        }
    }
}
