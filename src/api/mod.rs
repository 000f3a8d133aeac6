// External service clients

pub mod alpaca;
pub mod feargreed;
pub mod news;

pub use alpaca::AlpacaClient;
pub use feargreed::FearGreedClient;
pub use news::NewsClient;
