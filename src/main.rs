fn main() -> anyhow::Result<()> {
    gaia_lib::run()?;
    Ok(())
}
