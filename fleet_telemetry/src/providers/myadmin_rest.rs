//! Client for the MyAdmin capability lookup (`MinedVehicleData/ByVins`).

pub mod provider;
pub mod response;

pub use provider::MyAdminClient;
