pub mod api;
pub mod config;
pub mod db;
pub mod domain;
pub mod engine;
pub mod error;

pub use config::Config;
pub use db::{init_db, Repository};
pub use domain::{
    Decimal, Email, Instrument, InstrumentId, Investor, InvestorId, MovementEvent, Sample, Symbol,
};
pub use engine::FeeError;
pub use error::AppError;
