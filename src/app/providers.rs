//! Drawing provider resolution

use anyhow::{bail, Context, Result};
use monet_llm::{
    AnthropicConfig, AnthropicProvider, DrawingProvider, GeminiConfig, GeminiProvider,
};
use std::sync::Arc;
use tracing::info;

/// Provider names accepted on the command line and in config
pub const PROVIDERS: &[&str] = &["anthropic", "gemini"];

/// Build the named provider from environment credentials
pub fn make_provider(name: &str, model: Option<&str>) -> Result<Arc<dyn DrawingProvider>> {
    let provider: Arc<dyn DrawingProvider> = match name {
        "anthropic" => {
            let mut config =
                AnthropicConfig::from_env().context("Anthropic provider not available")?;
            if let Some(model) = model {
                config = config.with_model(model);
            }
            Arc::new(AnthropicProvider::new(config)?)
        }
        "gemini" => {
            let mut config = GeminiConfig::from_env().context("Gemini provider not available")?;
            if let Some(model) = model {
                config = config.with_model(model);
            }
            Arc::new(GeminiProvider::new(config)?)
        }
        other => bail!(
            "Unknown provider: {other} (expected one of: {})",
            PROVIDERS.join(", ")
        ),
    };

    info!(
        provider = provider.name(),
        model = provider.default_model(),
        "Using drawing provider"
    );
    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_provider() {
        let err = make_provider("dall-e", None).err().unwrap();
        assert!(err.to_string().contains("Unknown provider: dall-e"));
    }
}
