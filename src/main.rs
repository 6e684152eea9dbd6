use anyhow::Context;
use clap::Parser;
use packmap::{MapPacker, args::Cli, logging::setup_logger, map::ArrayWalk};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let Some((system_root, maps)) = cli.system_root_and_maps() else {
        // Nothing to pack is not an error.
        println!("{}", Cli::usage());
        return Ok(());
    };

    setup_logger();

    let mut packer = MapPacker::new(
        system_root,
        &cli.assets_dir,
        ArrayWalk::from(cli.walk_arrays),
    );
    let report = packer
        .run(maps)
        .with_context(|| format!("Failed to pack maps into {:?}", system_root))?;

    if !report.write_failures.is_empty() {
        log::warn!(
            "{} of the maps couldn't be saved",
            report.write_failures.len()
        );
    }

    Ok(())
}
