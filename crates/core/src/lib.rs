pub mod config;
pub mod domain;
pub mod errors;
pub mod redistribution;

pub use config::{AppConfig, ConfigError, LoadOptions, RedistributionConfig};
pub use domain::stock::{CommodityId, LocationId, StockPosition};
pub use domain::suggestion::{Priority, SuggestionId, TransferSuggestion};
pub use domain::transfer::{ExecutionParams, RedistributionOrder, TransferExecution};
pub use errors::{
    ApplicationError, CollaboratorError, DomainError, InterfaceError, RedistributionError,
};
pub use redistribution::{
    RedistributionOrderSink, StockPositionProvider, TransferSuggestionEngine,
};
