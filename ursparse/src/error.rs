use miette::Diagnostic;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error, Diagnostic)]
pub enum Error {
    #[error("Cannot open standard input")]
    OpenInput {
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot open standard output")]
    OpenOutput {
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot decode ursparse stream ({})", .source.kind())]
    #[diagnostic(help(
        "Is the input an ursparse stream? Output must be redirected to a regular file."
    ))]
    Decode {
        #[source]
        source: ursparse_format::Error,
    },

    #[error("Cannot encode sparse file ({})", .source.kind())]
    #[diagnostic(help("Input must be redirected from a regular file, e.g. `< disk.img`."))]
    Encode {
        #[source]
        source: ursparse_format::Error,
    },

    #[error("Cannot map sparse file ({})", .source.kind())]
    #[diagnostic(help("Input must be redirected from a regular file, e.g. `< disk.img`."))]
    Map {
        #[source]
        source: ursparse_format::Error,
    },

    #[error("Cannot write extent map")]
    WriteMap {
        #[source]
        source: std::io::Error,
    },
}
