pub mod analysis;
pub mod compliance;
pub mod intake;
pub mod provider;
pub mod source;
