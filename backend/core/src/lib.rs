pub mod error;
pub mod traits;
pub mod types;
pub mod value;

pub use error::UnknownEnvType;
pub use traits::{constructor_fn, Plugin, PluginConstructor};
pub use types::{CommonEnv, EnvType};
pub use value::{ConfigMap, ConfigValue, PluginConfig};

// Plugins receive their logger through the constructor; re-export it so a
// plugin crate only needs to depend on this one.
pub use relayer_logging::{scope, Logger};
