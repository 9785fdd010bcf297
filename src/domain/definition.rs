//! Static provider metadata used to drive configuration screens

use super::CapabilityType;
use serde::Serialize;

/// Kind of input a credential field expects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    /// Plain text
    Text,
    /// Secret value, masked on display
    Password,
    /// Endpoint URL
    Url,
}

/// One credential a provider needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialField {
    pub key: &'static str,
    pub display_name: &'static str,
    pub input_type: InputType,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<&'static str>,
}

impl CredentialField {
    /// Creates a required field
    pub const fn required(key: &'static str, display_name: &'static str, input_type: InputType) -> Self {
        Self {
            key,
            display_name,
            input_type,
            required: true,
            placeholder: None,
        }
    }

    /// Creates an optional field
    pub const fn optional(key: &'static str, display_name: &'static str, input_type: InputType) -> Self {
        Self {
            key,
            display_name,
            input_type,
            required: false,
            placeholder: None,
        }
    }

    /// Sets the placeholder (builder pattern)
    pub const fn with_placeholder(mut self, placeholder: &'static str) -> Self {
        self.placeholder = Some(placeholder);
        self
    }

    /// Whether the value should be masked when shown
    pub fn is_secret(&self) -> bool {
        self.input_type == InputType::Password
    }
}

/// Immutable description of a provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderDefinition {
    /// Unique provider key
    pub name: &'static str,
    pub display_name: &'static str,
    pub description: &'static str,
    pub capability: CapabilityType,
    pub credential_fields: Vec<CredentialField>,
}

impl ProviderDefinition {
    /// Keys of all required credential fields
    pub fn required_keys(&self) -> Vec<&'static str> {
        self.credential_fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.key)
            .collect()
    }

    /// Looks up a credential field by key
    pub fn field(&self, key: &str) -> Option<&CredentialField> {
        self.credential_fields.iter().find(|f| f.key == key)
    }
}
