use std::env;
use std::path::PathBuf;

/// Default model endpoint for the AI collaborator.
const DEFAULT_HF_API_URL: &str =
    "https://api-inference.huggingface.co/models/HuggingFaceH4/zephyr-7b-beta";

/// Runtime configuration, read once at startup from the environment
///
/// Secrets are never embedded in the binary: the JWT signing key and the
/// Hugging Face API key both come from the environment. The API key has no
/// default at all; without it the insight endpoint serves offline fallback
/// responses only.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP server binds to
    pub bind: String,

    /// Directory holding the JSON-backed account and record stores
    pub data_dir: PathBuf,

    /// HMAC secret for session tokens
    pub jwt_secret: String,

    /// Inference endpoint of the AI collaborator
    pub hf_api_url: String,

    /// Credential for the AI collaborator, if configured
    pub hf_api_key: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        let jwt_secret = match env::var("INSIGHTXL_JWT_SECRET") {
            Ok(secret) if !secret.is_empty() => secret,
            _ => {
                log::warn!(
                    "INSIGHTXL_JWT_SECRET not set; using a development-only default. \
                     Tokens will not survive deployments that change it."
                );
                "insightxl-dev-secret".to_string()
            }
        };

        let hf_api_key = env::var("HF_API_KEY").ok().filter(|k| !k.is_empty());
        if hf_api_key.is_none() {
            log::warn!("HF_API_KEY not set; AI insights will use the offline fallback generator");
        }

        Config {
            bind: env::var("INSIGHTXL_BIND").unwrap_or_else(|_| "127.0.0.1:3000".to_string()),
            data_dir: env::var("INSIGHTXL_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("database")),
            jwt_secret,
            hf_api_url: env::var("HF_API_URL").unwrap_or_else(|_| DEFAULT_HF_API_URL.to_string()),
            hf_api_key,
        }
    }
}
