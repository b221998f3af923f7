pub mod domain;
pub mod frameworks;
pub mod interface_adapters;
pub mod use_cases;

pub use frameworks::config::{load_tuning, relay_port, relay_url};
pub use frameworks::server::{relay_client, run, run_with_config};
