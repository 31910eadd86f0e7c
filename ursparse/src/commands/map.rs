use std::io::Write;

use ursparse_format::{extents, Extent};

use crate::error::{Error, Result};
use crate::util::stdin_file;

pub fn run(json: bool) -> Result<()> {
    let input = stdin_file().map_err(|source| Error::OpenInput { source })?;
    let scan = extents(&input).map_err(|source| Error::Map { source })?;

    let stdout = std::io::stdout();
    let mut out = std::io::BufWriter::new(stdout.lock());

    if json {
        let all = scan
            .collect::<ursparse_format::Result<Vec<Extent>>>()
            .map_err(|source| Error::Map { source })?;
        serde_json::to_writer(&mut out, &all)
            .map_err(|e| Error::WriteMap { source: e.into() })?;
        writeln!(out).map_err(|source| Error::WriteMap { source })?;
    } else {
        for extent in scan {
            let extent = extent.map_err(|source| Error::Map { source })?;
            writeln!(out, "{} {}", extent.offset, extent.length)
                .map_err(|source| Error::WriteMap { source })?;
        }
    }

    out.flush().map_err(|source| Error::WriteMap { source })
}
