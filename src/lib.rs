pub mod draw;
pub mod lesson;
pub mod logging;
pub mod settings;
