// Handler for generator operations: POST against a ZGW generator resource,
// answer carries the generated identification.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use crate::converter::Converter;
use crate::cycle::{RequestResponseCycle, TranslationResponse};
use crate::db::CycleStore;
use crate::errors::Result;
use crate::requesthandler::RequestHandler;
use crate::zgw::client::ZgwClient;

pub struct GenerateRequestHandler {
    converter: Arc<dyn Converter>,
    client: Arc<dyn ZgwClient>,
    store: Arc<dyn CycleStore>,
}

impl GenerateRequestHandler {
    pub fn new(
        converter: Arc<dyn Converter>,
        client: Arc<dyn ZgwClient>,
        store: Arc<dyn CycleStore>,
    ) -> Self {
        Self {
            converter,
            client,
            store,
        }
    }
}

#[async_trait]
impl RequestHandler for GenerateRequestHandler {
    fn name(&self) -> &'static str {
        "GenerateRequestHandler"
    }

    async fn save(&self, cycle: &RequestResponseCycle) -> Result<()> {
        self.store.save(cycle).await
    }

    async fn execute(&self, cycle: &mut RequestResponseCycle) -> Result<TranslationResponse> {
        let request = self.converter.decode(cycle)?;

        info!(
            referentienummer = %cycle.referentienummer,
            resource = %request.resource,
            "requesting identification from ZGW"
        );

        let result = self.client.invoke(&request).await?;
        if result.is_success() {
            cycle.kenmerk = result.identificatie().map(str::to_string);
        }

        let body = self.converter.encode(cycle, &result)?;
        let status_code = if result.is_success() { 200 } else { result.status };
        Ok(TranslationResponse { status_code, body })
    }
}
