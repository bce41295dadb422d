// Services module - portal login and card scraping

pub mod authenticator;
pub mod card_extractor;
pub mod portal;
