use anyhow::Result;

fn main() -> Result<()> {
    svcmon::run()
}
