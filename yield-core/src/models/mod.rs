pub mod position;
pub mod price;
pub mod transfer;
pub mod vault;

pub use position::{CombinedResult, Position, PositionKind, VaultYieldResult};
pub use price::{PriceSeries, PriceSnapshot};
pub use transfer::{Direction, RawTransfer};
pub use vault::{PLUS_VAULT, USD_VAULT, VaultConfig, VaultId};
