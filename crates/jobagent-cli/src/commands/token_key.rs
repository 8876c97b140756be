//! Token key generation

use jobagent_store::TokenCipher;

pub fn execute() -> Result<(), Box<dyn std::error::Error>> {
    let key = TokenCipher::generate_key()?;
    println!("{}", key.expose());
    Ok(())
}
