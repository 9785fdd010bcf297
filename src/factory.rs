//! Provider factory
//!
//! Owns provider configuration, per-tenant active-provider selection and
//! adapter instantiation. Every `get_*_provider` call builds a fresh adapter
//! from the registry and applies the stored config; nothing is cached.
//!
//! Locks guard plain maps and are always released before an adapter call is
//! awaited.

use crate::domain::{CapabilityType, ProviderConfig, ProviderDefinition, ProviderSettings, Tenant};
use crate::error::{ProviderError, StoreError};
use crate::providers::{ActivityProvider, FlightProvider, HotelProvider, Provider};
use crate::registry::ProviderRegistry;
use crate::store::ConfigStore;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Prefix of the store key holding a tenant's configuration blob
const STORE_KEY_PREFIX: &str = "provider-config";

/// Lifecycle of a provider name within the factory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderState {
    /// No constructor is known for this name
    Unregistered,
    /// Known, but the stored config (if any) is incomplete
    Registered,
    /// Enabled with every required credential present
    Configured,
    /// Configured and the last connection test succeeded
    Verified,
}

impl ProviderState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderState::Unregistered => "unregistered",
            ProviderState::Registered => "registered",
            ProviderState::Configured => "configured",
            ProviderState::Verified => "verified",
        }
    }
}

impl fmt::Display for ProviderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Snapshot of one provider for listing and configuration screens
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderDescription {
    pub name: String,
    pub capability: CapabilityType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<ProviderDefinition>,
    pub state: ProviderState,
    pub configured: bool,
    pub enabled: bool,
    pub missing_credentials: Vec<String>,
}

/// Persisted shape of a tenant's configuration
#[derive(Debug, Default, Serialize, Deserialize)]
struct ConfigBlob {
    #[serde(default)]
    providers: BTreeMap<String, ProviderConfig>,
    #[serde(default)]
    active: BTreeMap<String, String>,
}

/// Runtime owner of provider configuration and selection
pub struct ProviderFactory {
    registry: ProviderRegistry,
    store: Arc<dyn ConfigStore>,
    defaults: ProviderSettings,
    configs: RwLock<HashMap<String, ProviderConfig>>,
    active: RwLock<HashMap<Tenant, HashMap<CapabilityType, String>>>,
    verified: RwLock<HashSet<(CapabilityType, String)>>,
}

impl ProviderFactory {
    pub fn new(registry: ProviderRegistry, store: Arc<dyn ConfigStore>) -> Self {
        Self {
            registry,
            store,
            defaults: ProviderSettings::default(),
            configs: RwLock::new(HashMap::new()),
            active: RwLock::new(HashMap::new()),
            verified: RwLock::new(HashSet::new()),
        }
    }

    /// Fallback timeout and retry policy for configs that leave them unset
    pub fn with_default_settings(mut self, defaults: ProviderSettings) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    // ---- configuration ----

    /// Replace the whole config stored for `name`
    pub fn set_provider_config(&self, name: &str, config: ProviderConfig) {
        info!(provider = name, enabled = config.enabled, "provider config updated");
        self.configs.write().insert(name.to_string(), config);
        self.verified.write().retain(|(_, n)| n != name);
    }

    pub fn provider_config(&self, name: &str) -> Option<ProviderConfig> {
        self.configs.read().get(name).cloned()
    }

    pub fn remove_provider_config(&self, name: &str) -> Option<ProviderConfig> {
        let removed = self.configs.write().remove(name);
        if removed.is_some() {
            info!(provider = name, "provider config removed");
            self.verified.write().retain(|(_, n)| n != name);
        }
        removed
    }

    // ---- selection ----

    /// Select the provider a tenant uses for one capability type
    pub fn set_active_provider(
        &self,
        capability: CapabilityType,
        name: &str,
        tenant: &Tenant,
    ) -> Result<(), ProviderError> {
        if !self.registry.is_registered(capability, name) {
            return Err(ProviderError::not_found(capability, name));
        }
        info!(%capability, provider = name, %tenant, "active provider selected");
        self.active
            .write()
            .entry(tenant.clone())
            .or_default()
            .insert(capability, name.to_string());
        Ok(())
    }

    pub fn active_provider(&self, capability: CapabilityType, tenant: &Tenant) -> Option<String> {
        self.active
            .read()
            .get(tenant)
            .and_then(|selection| selection.get(&capability))
            .cloned()
    }

    // ---- resolution ----

    /// Build a configured hotel adapter
    ///
    /// `name` wins over the tenant's active selection. Fails before any I/O
    /// when the name is unknown or the adapter is not fully configured.
    pub fn get_hotel_provider(
        &self,
        name: Option<&str>,
        tenant: &Tenant,
    ) -> Result<Box<dyn HotelProvider>, ProviderError> {
        let name = self.resolve_name(CapabilityType::Hotel, name, tenant)?;
        let mut provider = self
            .registry
            .create_hotel(&name)
            .ok_or_else(|| ProviderError::not_found(CapabilityType::Hotel, &name))?;
        self.prepare(provider.as_mut(), &name)?;
        Ok(provider)
    }

    /// Build a configured flight adapter
    pub fn get_flight_provider(
        &self,
        name: Option<&str>,
        tenant: &Tenant,
    ) -> Result<Box<dyn FlightProvider>, ProviderError> {
        let name = self.resolve_name(CapabilityType::Flight, name, tenant)?;
        let mut provider = self
            .registry
            .create_flight(&name)
            .ok_or_else(|| ProviderError::not_found(CapabilityType::Flight, &name))?;
        self.prepare(provider.as_mut(), &name)?;
        Ok(provider)
    }

    /// Build a configured activity adapter
    pub fn get_activity_provider(
        &self,
        name: Option<&str>,
        tenant: &Tenant,
    ) -> Result<Box<dyn ActivityProvider>, ProviderError> {
        let name = self.resolve_name(CapabilityType::Activity, name, tenant)?;
        let mut provider = self
            .registry
            .create_activity(&name)
            .ok_or_else(|| ProviderError::not_found(CapabilityType::Activity, &name))?;
        self.prepare(provider.as_mut(), &name)?;
        Ok(provider)
    }

    /// Resolve and probe a provider; never fails
    ///
    /// Resolution errors are logged and reported as `false`. The outcome
    /// updates the advisory verified state, unless the config was replaced
    /// while the test was running.
    pub async fn test_provider(&self, capability: CapabilityType, name: &str) -> bool {
        let tenant = Tenant::Default;
        let tested = self.provider_config(name);
        let reachable = match capability {
            CapabilityType::Hotel => probe(self.get_hotel_provider(Some(name), &tenant)).await,
            CapabilityType::Flight => probe(self.get_flight_provider(Some(name), &tenant)).await,
            CapabilityType::Activity => {
                probe(self.get_activity_provider(Some(name), &tenant)).await
            }
        };

        let key = (capability, name.to_string());
        // Config writers clear `verified` only after this guard drops.
        let mut verified = self.verified.write();
        if self.configs.read().get(name) != tested.as_ref() {
            debug!(%capability, provider = name, "config changed during connection test");
            verified.remove(&key);
        } else if reachable {
            verified.insert(key);
        } else {
            warn!(%capability, provider = name, "connection test failed");
            verified.remove(&key);
        }
        reachable
    }

    // ---- inspection ----

    /// Where `name` stands in the registered/configured/verified lifecycle
    pub fn provider_state(&self, capability: CapabilityType, name: &str) -> ProviderState {
        if !self.registry.is_registered(capability, name) {
            return ProviderState::Unregistered;
        }
        if self.verified.read().contains(&(capability, name.to_string())) {
            return ProviderState::Verified;
        }
        match self.inspect(capability, name) {
            Some((true, _, _)) => ProviderState::Configured,
            _ => ProviderState::Registered,
        }
    }

    /// Descriptions of every provider registered for one capability, sorted by name
    pub fn available_providers(&self, capability: CapabilityType) -> Vec<ProviderDescription> {
        self.registry
            .provider_names(capability)
            .into_iter()
            .filter_map(|name| self.describe(capability, &name))
            .collect()
    }

    /// Describe `name` under the first capability it is registered for
    pub fn describe_provider(&self, name: &str) -> Option<ProviderDescription> {
        let capability = self.registry.capabilities_of(name).into_iter().next()?;
        self.describe(capability, name)
    }

    // ---- persistence ----

    /// Replace all configs and the tenant's selection with the stored blob
    ///
    /// Returns `false` without touching any state when nothing is stored.
    pub async fn load_configurations(&self, tenant: &Tenant) -> Result<bool, StoreError> {
        let key = store_key(tenant);
        let Some(blob) = self.store.load(&key).await? else {
            debug!(%tenant, "no stored configuration");
            return Ok(false);
        };
        let blob: ConfigBlob =
            serde_json::from_str(&blob).map_err(|source| StoreError::Json { key, source })?;

        let mut selection = HashMap::new();
        for (capability, name) in blob.active {
            match capability.parse::<CapabilityType>() {
                Ok(capability) => {
                    selection.insert(capability, name);
                }
                Err(e) => warn!(%tenant, error = %e, "ignoring stored selection"),
            }
        }

        info!(%tenant, providers = blob.providers.len(), "configuration loaded");
        *self.configs.write() = blob.providers.into_iter().collect();
        self.verified.write().clear();
        self.active.write().insert(tenant.clone(), selection);
        Ok(true)
    }

    /// Write all configs and the tenant's selection to the store
    pub async fn save_configurations(&self, tenant: &Tenant) -> Result<(), StoreError> {
        let key = store_key(tenant);
        let blob = ConfigBlob {
            providers: self
                .configs
                .read()
                .iter()
                .map(|(name, config)| (name.clone(), config.clone()))
                .collect(),
            active: self
                .active
                .read()
                .get(tenant)
                .map(|selection| {
                    selection
                        .iter()
                        .map(|(capability, name)| (capability.to_string(), name.clone()))
                        .collect()
                })
                .unwrap_or_default(),
        };
        let json = serde_json::to_string_pretty(&blob).map_err(|source| StoreError::Json {
            key: key.clone(),
            source,
        })?;

        self.store.save(&key, &json).await?;
        info!(%tenant, providers = blob.providers.len(), "configuration saved");
        Ok(())
    }

    // ---- helpers ----

    fn resolve_name(
        &self,
        capability: CapabilityType,
        name: Option<&str>,
        tenant: &Tenant,
    ) -> Result<String, ProviderError> {
        let name = match name {
            Some(name) => name.to_string(),
            None => self
                .active_provider(capability, tenant)
                .ok_or(ProviderError::NoActiveProvider { capability })?,
        };
        debug!(%capability, provider = %name, %tenant, "resolving provider");
        Ok(name)
    }

    /// Stored config with factory defaults filled into unset settings
    fn effective_config(&self, name: &str) -> Option<ProviderConfig> {
        let mut config = self.provider_config(name)?;
        if config.settings.timeout.is_none() {
            config.settings.timeout = self.defaults.timeout;
        }
        if config.settings.retry_attempts.is_none() {
            config.settings.retry_attempts = self.defaults.retry_attempts;
        }
        Some(config)
    }

    fn prepare<P: Provider + ?Sized>(&self, provider: &mut P, name: &str) -> Result<(), ProviderError> {
        if let Some(config) = self.effective_config(name) {
            provider.configure(config);
        }
        provider.ensure_configured()?;
        Ok(())
    }

    /// (configured, enabled, missing credentials) of a fresh adapter
    fn inspect(&self, capability: CapabilityType, name: &str) -> Option<(bool, bool, Vec<String>)> {
        fn read<P: Provider + ?Sized>(
            factory: &ProviderFactory,
            mut provider: Box<P>,
            name: &str,
        ) -> (bool, bool, Vec<String>) {
            if let Some(config) = factory.effective_config(name) {
                provider.configure(config);
            }
            (
                provider.is_configured(),
                provider.config().is_some_and(|c| c.enabled),
                provider.missing_credentials(),
            )
        }

        match capability {
            CapabilityType::Hotel => self.registry.create_hotel(name).map(|p| read(self, p, name)),
            CapabilityType::Flight => self.registry.create_flight(name).map(|p| read(self, p, name)),
            CapabilityType::Activity => {
                self.registry.create_activity(name).map(|p| read(self, p, name))
            }
        }
    }

    fn describe(&self, capability: CapabilityType, name: &str) -> Option<ProviderDescription> {
        let (configured, enabled, missing_credentials) = self.inspect(capability, name)?;
        Some(ProviderDescription {
            name: name.to_string(),
            capability,
            definition: self.registry.definition(name).cloned(),
            state: self.provider_state(capability, name),
            configured,
            enabled,
            missing_credentials,
        })
    }
}

fn store_key(tenant: &Tenant) -> String {
    format!("{}:{}", STORE_KEY_PREFIX, tenant.storage_key())
}

async fn probe<P: Provider + ?Sized>(provider: Result<Box<P>, ProviderError>) -> bool {
    match provider {
        Ok(provider) => provider.test_connection().await,
        Err(e) => {
            debug!(error = %e, "provider could not be resolved for testing");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{HotelSearchCriteria, ProviderResponse, StandardizedHotel};
    use crate::error::ConfigurationError;
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use tokio::sync::Notify;

    /// Hotel adapter that echoes its config instead of calling out
    struct AcmeHotel {
        config: Option<ProviderConfig>,
    }

    #[async_trait]
    impl Provider for AcmeHotel {
        fn name(&self) -> &'static str {
            "acme-hotel"
        }

        fn configure(&mut self, config: ProviderConfig) {
            self.config = Some(config);
        }

        fn config(&self) -> Option<&ProviderConfig> {
            self.config.as_ref()
        }

        fn required_credentials(&self) -> &'static [&'static str] {
            &["apiKey", "endpoint"]
        }

        async fn test_connection(&self) -> bool {
            self.config
                .as_ref()
                .and_then(|c| c.credential("endpoint"))
                .is_some_and(|e| e.starts_with("https://"))
        }
    }

    #[async_trait]
    impl HotelProvider for AcmeHotel {
        async fn search(
            &self,
            criteria: &HotelSearchCriteria,
        ) -> Result<ProviderResponse<StandardizedHotel>, ProviderError> {
            self.ensure_configured()?;
            let api_key = self
                .config
                .as_ref()
                .and_then(|c| c.credential("apiKey"))
                .unwrap_or_default();
            let hotel = StandardizedHotel {
                id: api_key.to_string(),
                name: criteria.destination.clone(),
                description: None,
                cost: None,
                currency: None,
                provider: self.name().to_string(),
                rate_type: None,
                valid_from: criteria.check_in,
                valid_to: criteria.check_out,
                details: Default::default(),
            };
            Ok(ProviderResponse::new(self.name(), vec![hotel], 1))
        }
    }

    fn factory() -> ProviderFactory {
        let mut registry = ProviderRegistry::with_defaults();
        registry.register_hotel_provider("acme-hotel", || Box::new(AcmeHotel { config: None }));
        ProviderFactory::new(registry, Arc::new(MemoryStore::new()))
    }

    fn acme_config(api_key: &str) -> ProviderConfig {
        ProviderConfig::new("acme-hotel")
            .with_credential("apiKey", api_key)
            .with_credential("endpoint", "https://acme.test")
    }

    #[test]
    fn test_missing_endpoint_is_named() {
        let factory = factory();
        factory.set_provider_config(
            "acme-hotel",
            ProviderConfig::new("acme-hotel").with_credential("apiKey", "k"),
        );

        let err = factory
            .get_hotel_provider(Some("acme-hotel"), &Tenant::Default)
            .err()
            .unwrap();
        match err {
            ProviderError::Configuration(ConfigurationError::MissingCredentials {
                provider,
                missing,
            }) => {
                assert_eq!(provider, "acme-hotel");
                assert_eq!(missing, vec!["endpoint".to_string()]);
            }
            other => panic!("unexpected error: {}", other),
        }

        factory.set_provider_config("acme-hotel", acme_config("k"));
        let provider = factory
            .get_hotel_provider(Some("acme-hotel"), &Tenant::Default)
            .unwrap();
        assert!(provider.is_configured());
    }

    #[test]
    fn test_unregistered_name_is_not_found() {
        let factory = factory();
        let err = factory
            .get_flight_provider(Some("acme-hotel"), &Tenant::Default)
            .err()
            .unwrap();
        assert!(matches!(err, ProviderError::NotFound { .. }));
        assert!(err.is_configuration());

        let err = factory
            .set_active_provider(CapabilityType::Activity, "nope", &Tenant::Default)
            .unwrap_err();
        assert_eq!(err.to_string(), "activity provider 'nope' is not registered");
    }

    #[test]
    fn test_no_active_provider() {
        let factory = factory();
        let err = factory
            .get_hotel_provider(None, &Tenant::Default)
            .err()
            .unwrap();
        assert!(matches!(
            err,
            ProviderError::NoActiveProvider {
                capability: CapabilityType::Hotel
            }
        ));
    }

    #[test]
    fn test_active_provider_is_per_tenant_and_capability() {
        let factory = factory();
        let alice = Tenant::user("alice");
        factory
            .set_active_provider(CapabilityType::Hotel, "acme-hotel", &alice)
            .unwrap();

        assert_eq!(
            factory.active_provider(CapabilityType::Hotel, &alice).as_deref(),
            Some("acme-hotel")
        );
        assert_eq!(factory.active_provider(CapabilityType::Hotel, &Tenant::Default), None);
        assert_eq!(factory.active_provider(CapabilityType::Flight, &alice), None);

        factory.set_provider_config("acme-hotel", acme_config("k"));
        let provider = factory.get_hotel_provider(None, &alice).unwrap();
        assert_eq!(provider.name(), "acme-hotel");
    }

    #[tokio::test]
    async fn test_no_stale_adapter_instances() {
        let factory = factory();
        let criteria = HotelSearchCriteria::new(
            "PMI",
            "2025-06-01".parse().unwrap(),
            "2025-06-05".parse().unwrap(),
        );

        factory.set_provider_config("acme-hotel", acme_config("first"));
        let first = factory
            .get_hotel_provider(Some("acme-hotel"), &Tenant::Default)
            .unwrap();

        factory.set_provider_config("acme-hotel", acme_config("second"));
        let second = factory
            .get_hotel_provider(Some("acme-hotel"), &Tenant::Default)
            .unwrap();

        assert_eq!(first.search(&criteria).await.unwrap().data[0].id, "first");
        assert_eq!(second.search(&criteria).await.unwrap().data[0].id, "second");
    }

    #[test]
    fn test_default_settings_fill_gaps() {
        let factory = factory().with_default_settings(ProviderSettings {
            timeout: Some(12),
            retry_attempts: Some(3),
            ..Default::default()
        });
        let mut config = acme_config("k");
        config.settings.timeout = Some(5);
        factory.set_provider_config("acme-hotel", config);

        let provider = factory
            .get_hotel_provider(Some("acme-hotel"), &Tenant::Default)
            .unwrap();
        let applied = provider.config().unwrap();
        assert_eq!(applied.settings.timeout, Some(5));
        assert_eq!(applied.settings.retry_attempts, Some(3));
        assert_eq!(
            factory.provider_config("acme-hotel").unwrap().settings.retry_attempts,
            None
        );
    }

    #[tokio::test]
    async fn test_provider_never_fails_and_tracks_state() {
        let factory = factory();
        assert!(!factory.test_provider(CapabilityType::Hotel, "unknown").await);
        assert!(!factory.test_provider(CapabilityType::Hotel, "acme-hotel").await);
        assert_eq!(
            factory.provider_state(CapabilityType::Hotel, "acme-hotel"),
            ProviderState::Registered
        );

        factory.set_provider_config("acme-hotel", acme_config("k"));
        assert_eq!(
            factory.provider_state(CapabilityType::Hotel, "acme-hotel"),
            ProviderState::Configured
        );
        assert!(factory.test_provider(CapabilityType::Hotel, "acme-hotel").await);
        assert_eq!(
            factory.provider_state(CapabilityType::Hotel, "acme-hotel"),
            ProviderState::Verified
        );

        // Replacing the config clears verification
        factory.set_provider_config("acme-hotel", acme_config("k2"));
        assert_eq!(
            factory.provider_state(CapabilityType::Hotel, "acme-hotel"),
            ProviderState::Configured
        );
        assert_eq!(
            factory.provider_state(CapabilityType::Flight, "acme-hotel"),
            ProviderState::Unregistered
        );
    }

    /// Hotel adapter whose connection test waits until released
    struct GatedHotel {
        config: Option<ProviderConfig>,
        started: Arc<Notify>,
        release: Arc<Notify>,
    }

    #[async_trait]
    impl Provider for GatedHotel {
        fn name(&self) -> &'static str {
            "gated-hotel"
        }

        fn configure(&mut self, config: ProviderConfig) {
            self.config = Some(config);
        }

        fn config(&self) -> Option<&ProviderConfig> {
            self.config.as_ref()
        }

        fn required_credentials(&self) -> &'static [&'static str] {
            &["apiKey"]
        }

        async fn test_connection(&self) -> bool {
            self.started.notify_one();
            self.release.notified().await;
            true
        }
    }

    #[async_trait]
    impl HotelProvider for GatedHotel {
        async fn search(
            &self,
            _criteria: &HotelSearchCriteria,
        ) -> Result<ProviderResponse<StandardizedHotel>, ProviderError> {
            Ok(ProviderResponse::new(self.name(), Vec::new(), 0))
        }
    }

    #[tokio::test]
    async fn test_config_replaced_during_test_is_not_verified() {
        let started = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let mut registry = ProviderRegistry::new();
        let (s, r) = (started.clone(), release.clone());
        registry.register_hotel_provider("gated-hotel", move || {
            Box::new(GatedHotel {
                config: None,
                started: s.clone(),
                release: r.clone(),
            })
        });
        let factory = ProviderFactory::new(registry, Arc::new(MemoryStore::new()));
        let config = |key: &str| ProviderConfig::new("gated-hotel").with_credential("apiKey", key);
        factory.set_provider_config("gated-hotel", config("old"));

        let (reachable, ()) = tokio::join!(
            factory.test_provider(CapabilityType::Hotel, "gated-hotel"),
            async {
                started.notified().await;
                factory.set_provider_config("gated-hotel", config("new"));
                release.notify_one();
            }
        );
        assert!(reachable);
        assert_eq!(
            factory.provider_state(CapabilityType::Hotel, "gated-hotel"),
            ProviderState::Configured
        );

        // Testing the current config does verify it
        release.notify_one();
        assert!(factory.test_provider(CapabilityType::Hotel, "gated-hotel").await);
        assert_eq!(
            factory.provider_state(CapabilityType::Hotel, "gated-hotel"),
            ProviderState::Verified
        );
    }

    #[test]
    fn test_describe_provider() {
        let factory = factory();
        factory.set_provider_config(
            "duffel",
            ProviderConfig::new("duffel")
                .with_enabled(false)
                .with_credential("apiToken", "t"),
        );

        let description = factory.describe_provider("duffel").unwrap();
        assert_eq!(description.capability, CapabilityType::Flight);
        assert!(!description.configured);
        assert!(!description.enabled);
        assert!(description.missing_credentials.is_empty());
        assert_eq!(description.definition.unwrap().display_name, "Duffel");

        let acme = factory.describe_provider("acme-hotel").unwrap();
        assert!(acme.definition.is_none());
        assert_eq!(acme.missing_credentials, vec!["apiKey", "endpoint"]);
        assert!(factory.describe_provider("nope").is_none());

        let hotels: Vec<_> = factory
            .available_providers(CapabilityType::Hotel)
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(hotels, vec!["acme-hotel", "hotelbeds"]);
    }

    #[tokio::test]
    async fn test_save_load_roundtrip_overwrites() {
        let store = Arc::new(MemoryStore::new());
        let alice = Tenant::user("alice");

        let factory = ProviderFactory::new(ProviderRegistry::with_defaults(), store.clone());
        factory.set_provider_config("duffel", ProviderConfig::new("duffel").with_credential("apiToken", "t"));
        factory
            .set_active_provider(CapabilityType::Flight, "duffel", &alice)
            .unwrap();
        factory.save_configurations(&alice).await.unwrap();

        let restored = ProviderFactory::new(ProviderRegistry::with_defaults(), store.clone());
        restored.set_provider_config("viator", ProviderConfig::new("viator"));
        restored
            .set_active_provider(CapabilityType::Hotel, "hotelbeds", &alice)
            .unwrap();

        assert!(restored.load_configurations(&alice).await.unwrap());
        assert_eq!(restored.provider_config("duffel"), factory.provider_config("duffel"));
        assert_eq!(restored.provider_config("viator"), None);
        assert_eq!(
            restored.active_provider(CapabilityType::Flight, &alice).as_deref(),
            Some("duffel")
        );
        assert_eq!(restored.active_provider(CapabilityType::Hotel, &alice), None);

        // Other tenants have nothing stored
        assert!(!restored.load_configurations(&Tenant::Default).await.unwrap());
        assert!(restored.provider_config("duffel").is_some());
    }

    #[tokio::test]
    async fn test_saved_blob_shape() {
        let store = Arc::new(MemoryStore::new());
        let factory = ProviderFactory::new(ProviderRegistry::with_defaults(), store.clone());
        factory.set_provider_config("viator", ProviderConfig::new("viator").with_credential("apiKey", "k"));
        factory
            .set_active_provider(CapabilityType::Activity, "viator", &Tenant::Default)
            .unwrap();
        factory.save_configurations(&Tenant::Default).await.unwrap();

        let raw = store.load("provider-config:default").await.unwrap().unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["providers"]["viator"]["credentials"]["apiKey"], "k");
        assert_eq!(json["providers"]["viator"]["enabled"], true);
        assert_eq!(json["active"]["activity"], "viator");
    }

    #[tokio::test]
    async fn test_user_named_default_is_isolated_from_default_tenant() {
        let store = Arc::new(MemoryStore::new());
        let impostor = Tenant::user("default");

        let factory = ProviderFactory::new(ProviderRegistry::with_defaults(), store.clone());
        factory
            .set_active_provider(CapabilityType::Flight, "duffel", &impostor)
            .unwrap();
        factory.save_configurations(&impostor).await.unwrap();
        assert!(store.load("provider-config:user:default").await.unwrap().is_some());

        let restored = ProviderFactory::new(ProviderRegistry::with_defaults(), store);
        assert!(!restored.load_configurations(&Tenant::Default).await.unwrap());
        assert_eq!(restored.active_provider(CapabilityType::Flight, &Tenant::Default), None);
        assert!(restored.load_configurations(&impostor).await.unwrap());
        assert_eq!(
            restored.active_provider(CapabilityType::Flight, &impostor).as_deref(),
            Some("duffel")
        );
    }

    #[tokio::test]
    async fn test_load_rejects_invalid_json() {
        let store = Arc::new(MemoryStore::new());
        store.save("provider-config:default", "not json").await.unwrap();
        let factory = ProviderFactory::new(ProviderRegistry::with_defaults(), store);
        let err = factory.load_configurations(&Tenant::Default).await.unwrap_err();
        assert!(matches!(err, StoreError::Json { .. }));
    }
}
