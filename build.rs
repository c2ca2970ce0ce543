use anyhow::*;
use fs_extra::copy_items;
use fs_extra::dir::CopyOptions;
use std::env;
use std::path::PathBuf;

const REQUIRED_ASSETS: [&str; 2] = [
    "textures/matcaps/8.png",
    "fonts/helvetiker_regular.typeface.json",
];

fn main() -> Result<()> {
    // This tells Cargo to rerun this script if something in /assets/ changes.
    println!("cargo:rerun-if-changed=assets/");

    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    let assets_src = manifest_dir.join("assets");

    for asset in REQUIRED_ASSETS {
        if !assets_src.join(asset).exists() {
            println!(
                "cargo:warning=assets/{} is missing and will fail to load at runtime, see assets/README.md",
                asset
            );
        }
    }

    if assets_src.exists() {
        let out_dir = env::var("OUT_DIR")?;
        let mut copy_options = CopyOptions::new();
        copy_options.overwrite = true;
        copy_items(&[assets_src], out_dir, &copy_options)?;
    }

    Ok(())
}
