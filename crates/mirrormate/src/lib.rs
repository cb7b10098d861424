pub mod clients;
pub mod command;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod prompt;
pub mod state;

pub use orchestrator::{TurnOrchestrator, TurnSettings};
pub use state::{AnalysisStatus, GameSnapshot, Notice};
