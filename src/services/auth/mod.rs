pub mod credentials;
pub mod factory;
pub mod gate;
pub mod revocation;
pub mod token;

#[cfg(test)]
pub mod testing;

pub use credentials::Credentials;
pub use factory::build_auth_gate;
pub use gate::{AuthError, AuthGate, Authenticated};
