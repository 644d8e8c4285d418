mod app;
mod cli;
mod effects;
mod logging;
mod persistence;
mod render;

pub use app::run;
pub use cli::Cli;
pub use logging::initialize as initialize_logging;
