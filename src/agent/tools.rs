use std::convert::Infallible;

use chrono::{DateTime, Utc};
use chrono_tz::America::Sao_Paulo;
use rig::completion::ToolDefinition;
use rig::tool::Tool;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

/// Local time in São Paulo, laid out the way pt-BR renders it.
pub fn format_local_time(now: DateTime<Utc>) -> String {
    now.with_timezone(&Sao_Paulo)
        .format("%d/%m/%Y, %H:%M:%S")
        .to_string()
}

#[derive(Debug, Default, Deserialize)]
pub struct CurrentTimeArgs {}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct CurrentTimeOutput {
    #[serde(rename = "currentTime")]
    pub current_time: String,
}

/// Tool the model may call to learn the current date and time.
#[derive(Debug, Clone, Copy, Default)]
pub struct CurrentTime;

impl Tool for CurrentTime {
    const NAME: &'static str = "getCurrentTime";

    type Error = Infallible;
    type Args = CurrentTimeArgs;
    type Output = CurrentTimeOutput;

    async fn definition(&self, _prompt: String) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.to_string(),
            description: "Retorna a data e hora atual no formato pt-BR".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {},
                "required": []
            }),
        }
    }

    async fn call(&self, _args: Self::Args) -> Result<Self::Output, Self::Error> {
        info!("Local tool {} invoked", Self::NAME);
        Ok(CurrentTimeOutput { current_time: format_local_time(Utc::now()) })
    }
}
