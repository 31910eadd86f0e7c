use crate::error::{Error, Result};
use crate::util::{format_size, stdin_file, stdout_file};

pub fn run() -> Result<()> {
    let input = stdin_file().map_err(|source| Error::OpenInput { source })?;
    let output = stdout_file().map_err(|source| Error::OpenOutput { source })?;

    let stats =
        ursparse_format::encode(&input, &output).map_err(|source| Error::Encode { source })?;

    tracing::info!(
        "Encoded {} extents ({} of data, {} written)",
        stats.extents,
        format_size(stats.meat_bytes),
        format_size(stats.output_bytes),
    );

    Ok(())
}
