mod booking;
mod listing;
mod payment;
mod provider;
mod user;

pub use booking::*;
pub use listing::*;
pub use payment::*;
pub use provider::*;
pub use user::*;
