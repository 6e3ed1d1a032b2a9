use arcstr::ArcStr;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    #[error("device `{device}` has no port named `{port}`")]
    MissingPort { device: ArcStr, port: ArcStr },
    #[error("mirror line through ({x}, {y}) needs two distinct points")]
    DegenerateMirror { x: i64, y: i64 },
}
