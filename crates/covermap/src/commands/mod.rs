pub mod completion;
pub mod config;
pub mod export;
pub mod zones;
