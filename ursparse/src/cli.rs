use clap::{ArgGroup, Parser};
use ursparse_format::BlockSize;

#[derive(Debug, Parser)]
#[command(
    name = "ursparse",
    about = "Encode sparse files to the ursparse format and decode them back.",
    version,
    group(ArgGroup::new("mode").args(["map", "ursparse", "sparse"])),
    after_help = "\
Input is always read from stdin and output written to stdout.

\x1b[1m\x1b[4mExamples:\x1b[0m
  ursparse --sparse < disk.img > disk.ursparse
  ursparse < disk.ursparse > disk.img
  ursparse --map --json < disk.img")]
pub struct Cli {
    /// Show the map of data extents of a sparse input file
    #[arg(short = 'm', long)]
    pub map: bool,

    /// Read ursparse input and write a sparse file (default)
    #[arg(short = 'u', long)]
    pub ursparse: bool,

    /// Read a sparse input file and write ursparse
    #[arg(short = 's', long)]
    pub sparse: bool,

    /// Block size in bytes for reading ursparse input
    #[arg(
        short = 'b',
        long = "blocksize",
        value_name = "SIZE",
        default_value_t = BlockSize::DEFAULT
    )]
    pub block_size: BlockSize,

    /// Print the extent map as JSON
    #[arg(long, requires = "map")]
    pub json: bool,

    /// Show verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Decode,
    Encode,
    Map,
}

impl Cli {
    pub fn mode(&self) -> Mode {
        if self.map {
            Mode::Map
        } else if self.sparse {
            Mode::Encode
        } else {
            Mode::Decode
        }
    }
}
