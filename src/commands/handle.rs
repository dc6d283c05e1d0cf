//! Serverless entry point: one run configured from the environment, with
//! the outcome printed as an HTTP-style JSON response.

use anyhow::Result;
use serde::Serialize;
use serde_json::json;
use tracing::error;

use crate::bot;
use crate::config::Config;
use eventsbot_core::sync::events_added;

#[derive(Debug, Serialize)]
pub struct HandlerResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    /// JSON-encoded `{"message": ...}`
    pub body: String,
}

impl HandlerResponse {
    fn new(status_code: u16, message: &str) -> Self {
        HandlerResponse {
            status_code,
            body: json!({ "message": message }).to_string(),
        }
    }

    pub fn invalid_configuration() -> Self {
        Self::new(500, "Invalid configuration.")
    }

    pub fn added(created: usize) -> Self {
        if created == 0 {
            Self::new(200, "No new events found.")
        } else {
            Self::new(200, &events_added(created))
        }
    }
}

pub async fn run() -> Result<()> {
    let response = respond().await;
    println!("{}", serde_json::to_string(&response)?);
    Ok(())
}

async fn respond() -> HandlerResponse {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return HandlerResponse::invalid_configuration();
        }
    };

    let mut bot = match bot::build(&config) {
        Ok(bot) => bot,
        Err(e) => {
            error!(error = %e, "Unable to set up the bot");
            return HandlerResponse::invalid_configuration();
        }
    };

    match bot.run().await {
        Ok(report) => HandlerResponse::added(report.created),
        Err(e) => {
            error!(error = %e, "Run aborted, nothing was changed");
            HandlerResponse::added(0)
        }
    }
}
