pub mod crawl_config;
pub mod properties;
