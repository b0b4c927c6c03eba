pub mod manager;
pub mod toggle;

pub use manager::PinSetManager;
pub use toggle::PinToggle;
