// Presentation layer - Terminal UI
pub mod input;
pub mod terminal;
pub mod view;
