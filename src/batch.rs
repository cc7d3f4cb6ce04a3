pub mod io;
pub mod pipeline;

pub use io::{FolderScan, FsHost, HostIo};
pub use pipeline::{
    BatchExportPipeline, BatchJob, BatchProgress, BatchReport, BatchState, CancelToken,
};
