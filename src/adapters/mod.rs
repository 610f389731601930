// Adapters layer: concrete implementations for external systems (upstream http, storage).

pub mod storage;
pub mod tcmb_client;
