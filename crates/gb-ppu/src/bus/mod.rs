#[allow(clippy::module_inception)]
pub mod bus;

pub use bus::Bus;
