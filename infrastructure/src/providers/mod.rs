//! Provider gateway adapters.
//!
//! - [`CommandProviderGateway`]: runs a configured program per turn
//! - [`EchoProviderGateway`]: deterministic offline backend
//! - [`RoutingProviderGateway`]: dispatches by `participant.provider`

pub mod command;
pub mod echo;
pub mod routing;

pub use command::CommandProviderGateway;
pub use echo::EchoProviderGateway;
pub use routing::RoutingProviderGateway;
