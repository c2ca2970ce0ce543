use floating_showcase::{ShowcaseConfig, run_showcase};

fn main() -> anyhow::Result<()> {
    run_showcase(ShowcaseConfig::default())
}
