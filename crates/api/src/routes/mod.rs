pub mod health;
pub mod meows;
pub mod metrics;
pub mod search;
