pub mod chart;
pub mod coin;
pub mod detail;
pub mod pin;
pub mod settings;
