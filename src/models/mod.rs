pub mod account;
pub mod alert;
pub mod order;
pub mod quote;

pub use account::{AccountBalances, AccountDetails, AccountRef, BrokerPosition, Instrument};
pub use alert::Alert;
pub use order::{OrderAction, PendingOrder};
pub use quote::{MoverItem, Quote};
