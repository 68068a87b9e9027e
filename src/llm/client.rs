// src/llm/client.rs

use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::LlmConfig;
use crate::llm::prompt::LlmPrompt;
use crate::llm::{Oracle, OracleError};

const OLLAMA_URL: &str = "http://localhost:11434";
const OPENAI_URL: &str = "https://api.openai.com/v1/responses";
const ANTHROPIC_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_MAX_TOKENS: u32 = 4096;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Ollama,
    #[value(name = "openai")]
    OpenAI,
    Anthropic,
}

impl Provider {
    fn label(self) -> &'static str {
        match self {
            Provider::Ollama => "Ollama",
            Provider::OpenAI => "OpenAI",
            Provider::Anthropic => "Anthropic",
        }
    }
}

pub struct LlmClient {
    cfg: LlmConfig,
    api_key: String,
    http: Client,
}

impl LlmClient {
    pub fn new(cfg: LlmConfig) -> Result<Self, OracleError> {
        let api_key = match cfg.provider {
            Provider::Ollama => cfg.resolved_api_key().unwrap_or_default(),
            p => cfg
                .resolved_api_key()
                .ok_or(OracleError::NotConfigured(p.label()))?,
        };

        let http = Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()?;

        Ok(Self { cfg, api_key, http })
    }
}

impl Oracle for LlmClient {
    fn generate(&self, prompt: &LlmPrompt) -> Result<String, OracleError> {
        let (url, headers, body) = build_request(&self.cfg, &self.api_key, prompt);

        let mut req = self.http.post(url).json(&body);
        for (k, v) in headers {
            req = req.header(k, v);
        }

        let resp = req.send()?;
        let status = resp.status();
        let json: Value = resp.json()?;

        if !status.is_success() {
            return Err(OracleError::Status {
                status: status.as_u16(),
                body: json.to_string(),
            });
        }

        extract_text(self.cfg.provider, &json)
    }
}

fn build_request(
    cfg: &LlmConfig,
    api_key: &str,
    prompt: &LlmPrompt,
) -> (String, Vec<(&'static str, String)>, Value) {
    match cfg.provider {
        Provider::Ollama => {
            let base = cfg.base_url.clone().unwrap_or_else(|| OLLAMA_URL.into());
            let url = format!("{}/api/chat", base.trim_end_matches('/'));

            let body = serde_json::json!({
                "model": cfg.model,
                "stream": false,
                "messages": [
                    { "role": "system", "content": prompt.system },
                    { "role": "user", "content": prompt.user }
                ]
            });

            let headers = if api_key.is_empty() {
                Vec::new()
            } else {
                vec![("Authorization", format!("Bearer {}", api_key))]
            };

            (url, headers, body)
        }

        Provider::OpenAI => {
            let url = cfg.base_url.clone().unwrap_or_else(|| OPENAI_URL.into());

            let body = serde_json::json!({
                "model": cfg.model,
                "instructions": prompt.system,
                "input": prompt.user,
            });

            (
                url,
                vec![("Authorization", format!("Bearer {}", api_key))],
                body,
            )
        }

        Provider::Anthropic => {
            let url = cfg.base_url.clone().unwrap_or_else(|| ANTHROPIC_URL.into());

            let body = serde_json::json!({
                "model": cfg.model,
                "max_tokens": ANTHROPIC_MAX_TOKENS,
                "system": prompt.system,
                "messages": [
                    { "role": "user", "content": prompt.user }
                ]
            });

            (
                url,
                vec![
                    ("x-api-key", api_key.to_string()),
                    ("anthropic-version", "2023-06-01".into()),
                ],
                body,
            )
        }
    }
}

fn extract_text(provider: Provider, v: &Value) -> Result<String, OracleError> {
    let text = match provider {
        Provider::Ollama => v.pointer("/message/content").and_then(Value::as_str),

        Provider::OpenAI => v
            .get("output")
            .and_then(|o| o.as_array())
            .and_then(|arr| {
                arr.iter().find_map(|item| {
                    item.get("content")?
                        .as_array()?
                        .iter()
                        .find_map(|c| c.get("text")?.as_str())
                })
            }),

        Provider::Anthropic => v.pointer("/content/0/text").and_then(Value::as_str),
    };

    text.map(str::to_owned)
        .ok_or_else(|| OracleError::Parse(format!("{} response parse failure", provider.label())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn prompt() -> LlmPrompt {
        LlmPrompt {
            system: "sys".into(),
            user: "usr".into(),
        }
    }

    fn cfg(provider: Provider) -> LlmConfig {
        LlmConfig {
            provider,
            model: "m".into(),
            ..LlmConfig::default()
        }
    }

    #[test]
    fn ollama_request_targets_chat_endpoint() {
        let mut c = cfg(Provider::Ollama);
        c.base_url = Some("http://gpu-box:11434/".into());
        let (url, headers, body) = build_request(&c, "", &prompt());

        assert_eq!(url, "http://gpu-box:11434/api/chat");
        assert!(headers.is_empty());
        assert_eq!(body["stream"], json!(false));
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "usr");
    }

    #[test]
    fn anthropic_request_carries_key_header() {
        let (url, headers, body) = build_request(&cfg(Provider::Anthropic), "k", &prompt());
        assert_eq!(url, ANTHROPIC_URL);
        assert!(headers.contains(&("x-api-key", "k".to_string())));
        assert_eq!(body["system"], "sys");
    }

    #[test]
    fn extracts_text_per_provider() {
        let ollama = json!({ "message": { "role": "assistant", "content": "hi" } });
        assert_eq!(extract_text(Provider::Ollama, &ollama).unwrap(), "hi");

        let openai = json!({
            "output": [
                { "type": "reasoning", "content": [] },
                { "type": "message", "content": [ { "type": "output_text", "text": "code" } ] }
            ]
        });
        assert_eq!(extract_text(Provider::OpenAI, &openai).unwrap(), "code");

        let anthropic = json!({ "content": [ { "type": "text", "text": "diag" } ] });
        assert_eq!(extract_text(Provider::Anthropic, &anthropic).unwrap(), "diag");
    }

    #[test]
    fn malformed_response_is_parse_error() {
        let err = extract_text(Provider::Anthropic, &json!({})).unwrap_err();
        assert!(matches!(err, OracleError::Parse(_)));
    }

    #[test]
    fn remote_provider_without_key_is_rejected() {
        let mut c = cfg(Provider::Anthropic);
        c.api_key = Some("  ".into());
        if std::env::var("ANTHROPIC_API_KEY").is_err() {
            assert!(matches!(LlmClient::new(c), Err(OracleError::NotConfigured(_))));
        }
    }
}
