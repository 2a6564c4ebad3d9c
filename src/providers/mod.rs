pub mod frankfurter;
pub mod open_er;
pub mod util;

pub use frankfurter::FrankfurterProvider;
pub use open_er::OpenExchangeRateProvider;
