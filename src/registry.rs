//! Provider registry
//!
//! Maps a provider name to a zero-argument constructor per capability type,
//! plus the static definition used by configuration screens. Registration is
//! explicit and happens once at startup; the registry holds no other state.

use crate::domain::{CapabilityType, CredentialField, InputType, ProviderDefinition};
use crate::providers::{
    ActivityProvider, DuffelAdapter, FlightProvider, HotelProvider, HotelbedsAdapter,
    ViatorAdapter,
};
use std::collections::HashMap;
use std::sync::Arc;

/// Builds a fresh, unconfigured hotel adapter
pub type HotelConstructor = Arc<dyn Fn() -> Box<dyn HotelProvider> + Send + Sync>;

/// Builds a fresh, unconfigured flight adapter
pub type FlightConstructor = Arc<dyn Fn() -> Box<dyn FlightProvider> + Send + Sync>;

/// Builds a fresh, unconfigured activity adapter
pub type ActivityConstructor = Arc<dyn Fn() -> Box<dyn ActivityProvider> + Send + Sync>;

/// Registry of known providers
#[derive(Default)]
pub struct ProviderRegistry {
    hotels: HashMap<String, HotelConstructor>,
    flights: HashMap<String, FlightConstructor>,
    activities: HashMap<String, ActivityConstructor>,
    definitions: HashMap<String, ProviderDefinition>,
}

impl ProviderRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in adapters and their definitions
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        registry.register_hotel_provider("hotelbeds", || Box::new(HotelbedsAdapter::new()));
        registry.register_definition(ProviderDefinition {
            name: "hotelbeds",
            display_name: "Hotelbeds",
            description: "Hotel availability from the Hotelbeds APItude booking API",
            capability: CapabilityType::Hotel,
            credential_fields: vec![
                CredentialField::required("apiKey", "API Key", InputType::Text),
                CredentialField::required("secret", "Shared Secret", InputType::Password),
                endpoint_field("https://api.hotelbeds.com"),
            ],
        });

        registry.register_flight_provider("duffel", || Box::new(DuffelAdapter::new()));
        registry.register_definition(ProviderDefinition {
            name: "duffel",
            display_name: "Duffel",
            description: "Flight offers from the Duffel air API",
            capability: CapabilityType::Flight,
            credential_fields: vec![
                CredentialField::required("apiToken", "Access Token", InputType::Password)
                    .with_placeholder("duffel_test_..."),
                endpoint_field("https://api.duffel.com"),
            ],
        });

        registry.register_activity_provider("viator", || Box::new(ViatorAdapter::new()));
        registry.register_definition(ProviderDefinition {
            name: "viator",
            display_name: "Viator",
            description: "Tours and activities from the Viator Partner API",
            capability: CapabilityType::Activity,
            credential_fields: vec![
                CredentialField::required("apiKey", "API Key", InputType::Password),
                endpoint_field("https://api.viator.com"),
            ],
        });

        registry
    }

    /// Register a hotel adapter constructor under `name`
    ///
    /// Registering the same name again replaces the previous constructor.
    pub fn register_hotel_provider<F>(&mut self, name: impl Into<String>, constructor: F)
    where
        F: Fn() -> Box<dyn HotelProvider> + Send + Sync + 'static,
    {
        self.hotels.insert(name.into(), Arc::new(constructor));
    }

    /// Register a flight adapter constructor under `name`
    pub fn register_flight_provider<F>(&mut self, name: impl Into<String>, constructor: F)
    where
        F: Fn() -> Box<dyn FlightProvider> + Send + Sync + 'static,
    {
        self.flights.insert(name.into(), Arc::new(constructor));
    }

    /// Register an activity adapter constructor under `name`
    pub fn register_activity_provider<F>(&mut self, name: impl Into<String>, constructor: F)
    where
        F: Fn() -> Box<dyn ActivityProvider> + Send + Sync + 'static,
    {
        self.activities.insert(name.into(), Arc::new(constructor));
    }

    /// Register the static description of a provider
    pub fn register_definition(&mut self, definition: ProviderDefinition) {
        self.definitions
            .insert(definition.name.to_string(), definition);
    }

    pub fn definition(&self, name: &str) -> Option<&ProviderDefinition> {
        self.definitions.get(name)
    }

    /// Definitions of one capability type, sorted by name
    pub fn definitions_by_type(&self, capability: CapabilityType) -> Vec<&ProviderDefinition> {
        let mut definitions: Vec<_> = self
            .definitions
            .values()
            .filter(|d| d.capability == capability)
            .collect();
        definitions.sort_by_key(|d| d.name);
        definitions
    }

    /// Registered provider names of one capability type, sorted
    pub fn provider_names(&self, capability: CapabilityType) -> Vec<String> {
        let mut names: Vec<String> = match capability {
            CapabilityType::Hotel => self.hotels.keys().cloned().collect(),
            CapabilityType::Flight => self.flights.keys().cloned().collect(),
            CapabilityType::Activity => self.activities.keys().cloned().collect(),
        };
        names.sort();
        names
    }

    pub fn is_registered(&self, capability: CapabilityType, name: &str) -> bool {
        match capability {
            CapabilityType::Hotel => self.hotels.contains_key(name),
            CapabilityType::Flight => self.flights.contains_key(name),
            CapabilityType::Activity => self.activities.contains_key(name),
        }
    }

    /// Capability types under which `name` is registered
    pub fn capabilities_of(&self, name: &str) -> Vec<CapabilityType> {
        CapabilityType::all()
            .iter()
            .copied()
            .filter(|capability| self.is_registered(*capability, name))
            .collect()
    }

    pub(crate) fn create_hotel(&self, name: &str) -> Option<Box<dyn HotelProvider>> {
        self.hotels.get(name).map(|construct| construct())
    }

    pub(crate) fn create_flight(&self, name: &str) -> Option<Box<dyn FlightProvider>> {
        self.flights.get(name).map(|construct| construct())
    }

    pub(crate) fn create_activity(&self, name: &str) -> Option<Box<dyn ActivityProvider>> {
        self.activities.get(name).map(|construct| construct())
    }
}

/// Optional base URL override shared by every built-in adapter
fn endpoint_field(default: &'static str) -> CredentialField {
    CredentialField::optional("endpoint", "API Endpoint", InputType::Url).with_placeholder(default)
}
