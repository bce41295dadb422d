// Models module - request-scoped data types

pub mod card;
pub mod credentials;
