//! Pulsa Store Gateway Clients
//!
//! HTTP clients for the two external parties the storefront talks to:
//!
//! - The upstream fulfillment provider that delivers automatic packages
//! - The WhatsApp relay that alerts the operator about manual orders
//!
//! Both implement traits from pulsa-core so the settlement service never
//! depends on reqwest directly.

pub mod fulfillment;
pub mod notifier;

pub use fulfillment::HttpFulfillmentGateway;
pub use notifier::WhatsAppNotifier;
