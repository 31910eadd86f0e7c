use ursparse_format::{BlockSize, Decoder};

use crate::error::{Error, Result};
use crate::util::{format_size, stdin_file, stdout_file};

pub fn run(block_size: BlockSize) -> Result<()> {
    let input = stdin_file().map_err(|source| Error::OpenInput { source })?;
    let output = stdout_file().map_err(|source| Error::OpenOutput { source })?;

    tracing::debug!(%block_size, "decoding ursparse from stdin");

    let stats = Decoder::new(block_size)
        .decode(&input, &mut &output)
        .map_err(|source| Error::Decode { source })?;

    tracing::info!(
        "Restored {} from {} records ({} of data)",
        format_size(stats.output_len),
        stats.records,
        format_size(stats.meat_bytes),
    );

    Ok(())
}
