// Interface adapters: wire protocol, relay endpoints and the relay client.

pub mod clients;
pub mod http;
pub mod net;
pub mod protocol;
pub mod state;
pub mod utils;
