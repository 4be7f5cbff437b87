pub mod api_client;
pub mod assignment;
pub mod cache;
pub mod configuration;
pub mod domain;
pub mod floor_view;
pub mod live;
pub mod notifier;
pub mod startup;
pub mod telemetry;
pub mod utils;
