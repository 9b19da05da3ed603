use thiserror::Error;

/// Returned when an environment tag does not name a known deployment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown environment type \"{0}\" (expected mainnet, testnet, devnet, tilt or localhost)")]
pub struct UnknownEnvType(pub String);
