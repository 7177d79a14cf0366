use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use almanac_core::{Classification, Clock};

use crate::llm::{FunctionCallRequest, FunctionCallingClient, LlmError};
use crate::tools::ToolRegistry;

/// Maps free text onto one of the registered event functions.
///
/// Errors from the service (transport, status, timeout, unparseable body) come
/// back as [`LlmError`]; the runtime answers them with the fallback text.
pub struct IntentClassifier {
    client: Arc<dyn FunctionCallingClient>,
    tools: ToolRegistry,
    clock: Arc<dyn Clock>,
    timeout: Duration,
}

impl IntentClassifier {
    pub fn new(
        client: Arc<dyn FunctionCallingClient>,
        tools: ToolRegistry,
        clock: Arc<dyn Clock>,
        timeout: Duration,
    ) -> Self {
        Self { client, tools, clock, timeout }
    }

    pub fn system_instruction(&self) -> String {
        format!(
            "You are an expert event manager. Convert the message below into a call to one of \
             the available functions and extract its arguments. Remove any typos and neatly \
             format the arguments. Dates must be written as YYYY-MM-DD. If the year is not \
             specified in the message then assume it is {}.",
            self.clock.current_year()
        )
    }

    pub async fn classify(&self, text: &str) -> Result<Classification, LlmError> {
        let request = FunctionCallRequest {
            system_instruction: self.system_instruction(),
            user_text: format!("message: {text}"),
            functions: self.tools.declarations().to_vec(),
        };

        let call = tokio::time::timeout(self.timeout, self.client.call_function(&request))
            .await
            .map_err(|_| LlmError::Timeout { timeout_secs: self.timeout.as_secs() })??;

        let Some(call) = call else {
            debug!(event_name = "agent.classifier.no_function_call", "model answered without a call");
            return Ok(Classification::None);
        };

        if self.tools.get(&call.name).is_none() {
            info!(
                event_name = "agent.classifier.unregistered_function",
                function = %call.name,
                "model called a function that was not offered"
            );
            return Ok(Classification::None);
        }

        Ok(Classification::from_function_call(&call.name, &call.args))
    }
}
