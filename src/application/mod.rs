// Application layer - Use cases driving the dashboard
pub mod dashboard_controller;
pub mod day_history;
pub mod speedtest_api;
