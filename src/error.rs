use thiserror::Error;

/// Failures the pipeline distinguishes. Per-file problems are recoverable for
/// rail inputs (skip and continue) and fatal for the single bus table;
/// [`PipelineError::NoUsableData`] always aborts the run.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("cannot read {path}: {source}")]
    FileUnreadable {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("malformed table {path}: {source}")]
    MalformedTable {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("table {path} has no recognizable {field} column")]
    MissingRequiredColumn { path: String, field: &'static str },

    #[error("no usable rail data: every input table failed or lacked required columns")]
    NoUsableData,
}
