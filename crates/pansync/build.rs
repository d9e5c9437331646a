use std::fs;
use std::io;
use std::path::Path;

use clap::CommandFactory;

// cli.rs only needs clap + clap_complete, both build-dependencies.
#[allow(dead_code)]
#[path = "src/cli.rs"]
mod cli;

fn main() -> io::Result<()> {
    println!("cargo::rerun-if-changed=src/cli.rs");

    let out_dir = std::env::var_os("OUT_DIR")
        .ok_or_else(|| io::Error::other("OUT_DIR not set by Cargo"))?;
    let man_dir = Path::new(&out_dir).join("man");
    fs::create_dir_all(&man_dir)?;

    write_manpages(&cli::Cli::command(), &man_dir)
}

/// One page per visible command, named `pansync-<sub>.1` for subcommands.
fn write_manpages(cmd: &clap::Command, dir: &Path) -> io::Result<()> {
    let name = cmd.get_name().to_owned();

    let mut page = Vec::new();
    clap_mangen::Man::new(cmd.clone()).render(&mut page)?;
    fs::write(dir.join(format!("{name}.1")), page)?;

    for sub in cmd.get_subcommands().filter(|s| !s.is_hide_set()) {
        let sub = sub.clone().name(format!("{name}-{}", sub.get_name()));
        write_manpages(&sub, dir)?;
    }
    Ok(())
}
