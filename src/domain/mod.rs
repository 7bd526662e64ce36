// Domain layer - Pure types and transforms, no I/O
pub mod brush;
pub mod chart;
pub mod dashboard;
pub mod format;
pub mod logs;
pub mod sample;
pub mod status;
pub mod viewport;
