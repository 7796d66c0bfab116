pub mod config;
pub mod form;
pub mod http_client;
pub mod logging;
pub mod model;
pub mod predict;
pub mod seed;
pub mod state;
pub mod ui;
pub mod worker;
