pub mod fangraphs_fetch;
pub mod fetch_cache;
pub mod filters;
pub mod http_client;
pub mod lookup_fetch;
pub mod metrics;
pub mod pitch_mix;
pub mod report_export;
pub mod state;
pub mod statcast_fetch;
