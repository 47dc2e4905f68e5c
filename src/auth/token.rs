//! Access token records handed over by the code exchange.

pub mod record;
pub mod secret;
