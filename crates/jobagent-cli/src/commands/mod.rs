pub mod migrate;
pub mod token_key;
