pub mod audit;
pub mod document;
pub mod message;
pub mod signature;
pub mod submission;
pub mod user;
