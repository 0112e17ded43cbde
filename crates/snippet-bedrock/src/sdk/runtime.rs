//! [`RuntimeApi`] over `aws_sdk_bedrockruntime`.

use aws_sdk_bedrockruntime::Client;
use aws_smithy_types::Blob;

use snippet_core::requests::invoke::InvokeModelRequest;

use crate::api::{BoxFuture, RuntimeApi};
use crate::error::BedrockError;

impl RuntimeApi for Client {
    fn invoke_model(
        &self,
        request: InvokeModelRequest,
    ) -> BoxFuture<'_, Result<Vec<u8>, BedrockError>> {
        Box::pin(async move {
            let resp = self
                .invoke_model()
                .model_id(request.model_id())
                .body(Blob::new(request.body().as_bytes()))
                .accept(request.accept())
                .content_type(request.content_type())
                .set_guardrail_identifier(request.guardrail_identifier().map(str::to_string))
                .set_guardrail_version(request.guardrail_version().map(str::to_string))
                .send()
                .await
                .map_err(|e| BedrockError::remote("bedrock-runtime:InvokeModel", &e))?;
            Ok(resp.body().as_ref().to_vec())
        })
    }
}
