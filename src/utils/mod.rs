pub mod content_negotiation;
pub mod path;
