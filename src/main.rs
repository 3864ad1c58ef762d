use anyhow::Result;

fn main() -> Result<()> {
    choromap::run()
}
