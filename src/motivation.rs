//! The coach: a short motivational message after each logging action.
//!
//! The message comes from an external service. Any failure there is replaced
//! by [`FALLBACK_MESSAGE`] before it reaches the dashboard.

use std::sync::Arc;
use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;
use crate::error::{Error, Result};

/// Shown when the coach cannot be reached.
pub const FALLBACK_MESSAGE: &str =
    "Great job! You moved one step forward today. Keep it up tomorrow!";

const GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// What the coach is told about the logging action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MotivationRequest {
    pub task_name: String,
    pub target_time: u32,
    pub time_spent_today: u32,
    pub streak: u32,
}

impl MotivationRequest {
    pub fn goal_met(&self) -> bool {
        self.time_spent_today >= self.target_time
    }
}

/// An external source of encouragement text.
pub trait MotivationService: Send + Sync {
    fn motivational_message(&self, request: &MotivationRequest) -> Result<String>;
}

/// Picks the Gemini coach when an API key is configured, the offline coach otherwise.
pub fn coach_from_config(config: &Config) -> Result<Arc<dyn MotivationService>> {
    match &config.api_key {
        Some(key) => Ok(Arc::new(GeminiCoach::new(
            key.clone(),
            config.model.clone(),
            config.timeout,
        )?)),
        None => {
            debug!("no API key configured, using the offline coach");
            Ok(Arc::new(OfflineCoach))
        }
    }
}

/// Deterministic local messages, no network.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineCoach;

impl MotivationService for OfflineCoach {
    fn motivational_message(&self, request: &MotivationRequest) -> Result<String> {
        let streak = match request.streak {
            0 => String::new(),
            1 => " That's day one of your streak.".to_string(),
            n => format!(" You're on a {}-day streak!", n),
        };
        let msg = if request.goal_met() {
            format!(
                "You hit your {}-minute goal for \"{}\" today.{} Well earned.",
                request.target_time, request.task_name, streak
            )
        } else if request.time_spent_today == 0 {
            format!(
                "No time on \"{}\" yet today, and that's okay. Tomorrow is a fresh start.{}",
                request.task_name, streak
            )
        } else {
            format!(
                "{} of {} minutes on \"{}\" is real progress.{} Every session counts, so keep going!",
                request.time_spent_today, request.target_time, request.task_name, streak
            )
        };
        Ok(msg)
    }
}

/// Asks a Gemini model for a message.
pub struct GeminiCoach {
    client: Client,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GeminiCoach {
    pub fn new(api_key: String, model: String, timeout: Duration) -> Result<GeminiCoach> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(GeminiCoach { client, api_key, model })
    }
}

impl MotivationService for GeminiCoach {
    fn motivational_message(&self, request: &MotivationRequest) -> Result<String> {
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(build_prompt(request)),
                }],
            }],
        };
        let url = format!("{}/{}:generateContent", GEMINI_ENDPOINT, self.model);
        debug!(model = %self.model, task = %request.task_name, "requesting coach message");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()?;
        let status = response.status();
        let text = response.text()?;
        if !status.is_success() {
            return Err(Error::ExternalService(format!("coach API error {}: {}", status, text)));
        }

        let parsed: GenerateResponse = serde_json::from_str(&text)
            .map_err(|e| Error::ExternalService(format!("unexpected coach response: {}", e)))?;
        extract_text(parsed)
            .ok_or_else(|| Error::ExternalService("coach returned empty content".into()))
    }
}

fn extract_text(response: GenerateResponse) -> Option<String> {
    let text: String = response
        .candidates
        .into_iter()
        .next()?
        .content?
        .parts
        .into_iter()
        .filter_map(|p| p.text)
        .collect();
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

fn build_prompt(request: &MotivationRequest) -> String {
    format!(
        "You are an upbeat productivity coach. The user tracks daily time on a goal.\n\
         Task: \"{}\"\n\
         Daily target: {} minutes\n\
         Time spent today: {} minutes\n\
         Current streak: {} days\n\n\
         Write a short (2-3 sentences), positive message for the user.\n\
         - If the goal was met, celebrate it.\n\
         - If not, be kind rather than critical and give them hope for tomorrow.",
        request.task_name, request.target_time, request.time_spent_today, request.streak
    )
}
