use anyhow::Result;

fn main() -> Result<()> {
    siren_tui::cli::run()
}
