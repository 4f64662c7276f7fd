pub mod dom;
pub mod driver;
pub mod session;
pub mod snapshot_driver;
