//! Core domain models shared by every provider
//!
//! This module contains:
//! - Capability types (hotel, flight, activity)
//! - Provider configuration and tenant scoping
//! - Static provider definitions for configuration screens
//! - Canonical search criteria and result records
//! - The response envelope returned by every search

mod activity;
mod capability;
mod config;
mod definition;
mod flight;
mod hotel;
mod response;

pub use activity::{ActivitySearchCriteria, StandardizedActivity};
pub use capability::CapabilityType;
pub use config::{ProviderConfig, ProviderSettings, Tenant};
pub use definition::{CredentialField, InputType, ProviderDefinition};
pub use flight::{
    CabinClass, FlightPlace, FlightSearchCriteria, FlightSegment, FlightSlice,
    StandardizedFlight, TripDates, MAX_TRAVELERS,
};
pub use hotel::{HotelSearchCriteria, StandardizedHotel};
pub use response::{ProviderResponse, ResponseMetadata};
