//! Discovery configuration: complex type strategy, endpoint URI and SOAP styles.
//!
//! The same settings can come from CLI flags or from a YAML/JSON file
//! ([`AutoDiscoverConfig::load`]); file values are applied first and flags override them.

use crate::error::{Error, Result};
use clap::ValueEnum;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Default `soap:binding` transport (SOAP over HTTP)
pub const SOAP_HTTP_TRANSPORT: &str = "http://schemas.xmlsoap.org/soap/http";
/// Default `encodingStyle` for encoded bodies
pub const SOAP_ENCODING_STYLE: &str = "http://schemas.xmlsoap.org/soap/encoding/";

/// `soap:binding` style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    /// One message part per parameter
    Rpc,
    /// One wrapper element per message
    Document,
}

impl Style {
    pub fn as_str(&self) -> &'static str {
        match self {
            Style::Rpc => "rpc",
            Style::Document => "document",
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `use` attribute of `soap:body`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BodyUse {
    Encoded,
    Literal,
}

impl BodyUse {
    pub fn as_str(&self) -> &'static str {
        match self {
            BodyUse::Encoded => "encoded",
            BodyUse::Literal => "literal",
        }
    }
}

/// Options applied to every binding operation's `soap:body`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationBodyStyle {
    #[serde(rename = "use")]
    pub use_kind: BodyUse,
    #[serde(rename = "encodingStyle", default, skip_serializing_if = "Option::is_none")]
    pub encoding_style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

impl Default for OperationBodyStyle {
    fn default() -> Self {
        Self {
            use_kind: BodyUse::Encoded,
            encoding_style: Some(SOAP_ENCODING_STYLE.to_string()),
            namespace: None,
        }
    }
}

/// Style and transport of the `soap:binding`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingStyle {
    pub style: Style,
    pub transport: String,
}

impl Default for BindingStyle {
    fn default() -> Self {
        Self {
            style: Style::Rpc,
            transport: SOAP_HTTP_TRANSPORT.to_string(),
        }
    }
}

/// Partial update of a [`BindingStyle`]; absent keys keep their current value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingStyleUpdate {
    #[serde(default)]
    pub style: Option<Style>,
    #[serde(default)]
    pub transport: Option<String>,
}

impl BindingStyle {
    pub fn merge(&mut self, update: &BindingStyleUpdate) {
        if let Some(style) = update.style {
            self.style = style;
        }
        if let Some(transport) = &update.transport {
            self.transport = transport.clone();
        }
    }
}

/// How complex types are mapped into the schema.
///
/// `true` selects the default record strategy and `false` maps every complex
/// type to `xsd:anyType`; a name picks a strategy explicitly
/// (`default`, `sequence`, `complex`, `any`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StrategySetting {
    Enabled(bool),
    Named(String),
}

impl Default for StrategySetting {
    fn default() -> Self {
        StrategySetting::Enabled(true)
    }
}

/// Validated absolute URI of the service endpoint
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EndpointUri(String);

impl EndpointUri {
    /// Accepts an absolute URI: `scheme ":" rest`, with no whitespace
    pub fn parse(uri: &str) -> Result<Self> {
        let invalid = || {
            Error::Configuration(format!(
                "'{}' is not a valid absolute URI for the service endpoint",
                uri
            ))
        };

        let (scheme, rest) = uri.split_once(':').ok_or_else(invalid)?;
        let mut scheme_chars = scheme.chars();
        let starts_alpha = scheme_chars
            .next()
            .map(|c| c.is_ascii_alphabetic())
            .unwrap_or(false);
        let scheme_ok = starts_alpha
            && scheme_chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));

        if !scheme_ok || rest.is_empty() || uri.chars().any(char::is_whitespace) {
            return Err(invalid());
        }

        Ok(Self(uri.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EndpointUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Complete discovery configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoDiscoverConfig {
    #[serde(default)]
    pub strategy: StrategySetting,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub operation_body_style: OperationBodyStyle,
    #[serde(default)]
    pub binding_style: BindingStyleUpdate,
    /// Base name for documents built from free functions
    #[serde(default)]
    pub name: Option<String>,
}

impl AutoDiscoverConfig {
    /// Load a configuration file, choosing JSON or YAML by extension
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading configuration from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|s| s.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let config: AutoDiscoverConfig = if is_json {
            serde_json::from_str(&content).map_err(|e| {
                Error::Configuration(format!("{}: {}", path.display(), e))
            })?
        } else {
            serde_yaml::from_str(&content).map_err(|e| {
                Error::Configuration(format!("{}: {}", path.display(), e))
            })?
        };

        if let Some(uri) = &config.uri {
            EndpointUri::parse(uri)?;
        }
        Ok(config)
    }
}
