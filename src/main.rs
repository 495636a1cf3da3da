use anyhow::Result;

fn main() -> Result<()> {
    cogwright::logging::init();
    cogwright::cli::run()
}
