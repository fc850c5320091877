mod ocean;
mod rivers;
mod settlements;

pub use ocean::OceanFillStage;
pub use rivers::RiverStage;
pub use settlements::SettlementStage;
