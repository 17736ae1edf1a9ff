// Handler for create operations: POST a new resource into the ZGW registry
// and acknowledge with a Bv03.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

use crate::converter::Converter;
use crate::cycle::{RequestResponseCycle, TranslationResponse};
use crate::db::CycleStore;
use crate::errors::Result;
use crate::requesthandler::RequestHandler;
use crate::zgw::client::ZgwClient;

pub struct CreateRequestHandler {
    converter: Arc<dyn Converter>,
    client: Arc<dyn ZgwClient>,
    store: Arc<dyn CycleStore>,
}

impl CreateRequestHandler {
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
impl RequestHandler for CreateRequestHandler {
    fn name(&self) -> &'static str {
        "CreateRequestHandler"
    }

    async fn save(&self, cycle: &RequestResponseCycle) -> Result<()> {
        self.store.save(cycle).await
    }

    async fn execute(&self, cycle: &mut RequestResponseCycle) -> Result<TranslationResponse> {
        let request = self.converter.decode(cycle)?;

        info!(
            referentienummer = %cycle.referentienummer,
            resource = %request.resource,
            "creating resource in ZGW"
        );

        let result = self.client.invoke(&request).await?;
        if result.is_success() {
            if result.status != 201 {
                warn!(
                    referentienummer = %cycle.referentienummer,
                    status = result.status,
                    "ZGW create answered with a non-201 success"
                );
            }
            cycle.kenmerk = result.identificatie().map(str::to_string);
        }

        let body = self.converter.encode(cycle, &result)?;
        let status_code = if result.is_success() { 200 } else { result.status };
        Ok(TranslationResponse { status_code, body })
    }
}
