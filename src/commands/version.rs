use anyhow::Result;

pub fn execute() -> Result<()> {
    println!("ietlv version {}", env!("CARGO_PKG_VERSION"));
    Ok(())
}
