pub mod assist;
pub mod auth;
pub mod entry;
pub mod insights;
pub mod profile;
pub mod quote;

pub use assist::*;
pub use auth::*;
pub use entry::*;
pub use insights::*;
pub use profile::*;
pub use quote::*;

#[cfg(test)]
mod tests;
