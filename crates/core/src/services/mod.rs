pub mod catalog_service;
pub mod detail_service;
pub mod live_report;
