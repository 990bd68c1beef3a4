pub mod cli;
pub mod config;
pub mod env;
pub mod ids;
pub mod output;
pub mod resolver;
pub mod scripts;

// Convenience re-exports (optional, but nice)
pub use config::Config;
pub use env::DeployEnv;
pub use ids::CanisterConfig;
pub use resolver::{LookupError, Mode, ResolvedIds};
pub use scripts::{DeployPlan, RenderedScript};
