//! Design x mockup batch export.
//!
//! Mockups form the outer loop so each full-resolution export stage is built once and dropped
//! before the next mockup is decoded. Designs go through the shared texture cache, so a design
//! that is also on the preview is not decoded twice and is not freed from under it.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::{
    assets::{
        decode::decode_image,
        store::{TextureCache, TextureHandle, source_key},
    },
    batch::io::{HostIo, file_stem},
    encode::{png::encode_png, resize::resize_image},
    foundation::error::{MockupError, MockupResult},
    render::{
        mesh::MeshGrid,
        stage::{CompositorStage, DesignLayer},
    },
    settings::{ExportPreset, RenderSettings},
    transform::TransformEngine,
};

/// Pause between pairs so an embedding UI can repaint.
pub const DEFAULT_YIELD_DELAY: Duration = Duration::from_millis(50);

/// Cooperative cancellation flag shared with the host.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BatchState {
    Idle,
    Running,
}

/// One batch request. The placement is applied to every design with the same fractions.
#[derive(Clone, Debug)]
pub struct BatchJob {
    pub mockups: Vec<PathBuf>,
    pub designs: Vec<PathBuf>,
    pub output_dir: PathBuf,
    pub placement: TransformEngine,
    pub settings: RenderSettings,
    pub mesh_grid: MeshGrid,
    pub yield_delay: Duration,
}

impl BatchJob {
    pub fn new(
        mockups: Vec<PathBuf>,
        designs: Vec<PathBuf>,
        output_dir: impl Into<PathBuf>,
        placement: TransformEngine,
        settings: RenderSettings,
    ) -> Self {
        Self {
            mockups,
            designs,
            output_dir: output_dir.into(),
            placement,
            settings,
            mesh_grid: MeshGrid::EXPORT,
            yield_delay: DEFAULT_YIELD_DELAY,
        }
    }

    pub fn total_pairs(&self) -> usize {
        self.mockups.len() * self.designs.len()
    }

    /// `{design_stem}_{mockup_stem}.{ext}` inside the output directory.
    pub fn output_path(&self, design: &Path, mockup: &Path) -> PathBuf {
        self.output_dir.join(format!(
            "{}_{}.{}",
            file_stem(design),
            file_stem(mockup),
            self.settings.export_format.extension()
        ))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchProgress {
    pub completed: usize,
    pub total: usize,
    pub design: PathBuf,
    pub mockup: PathBuf,
}

impl BatchProgress {
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedPair {
    pub design: PathBuf,
    pub mockup: PathBuf,
    pub reason: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub total: usize,
    /// Pairs handled, written or skipped.
    pub completed: usize,
    pub written: Vec<PathBuf>,
    pub skipped: Vec<SkippedPair>,
    pub cancelled: bool,
}

#[derive(Debug)]
pub struct BatchExportPipeline {
    state: BatchState,
    cancel: CancelToken,
}

impl Default for BatchExportPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchExportPipeline {
    pub fn new() -> Self {
        Self {
            state: BatchState::Idle,
            cancel: CancelToken::new(),
        }
    }

    pub fn state(&self) -> BatchState {
        self.state
    }

    /// Token that stops the current (or next) run between pairs.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Run a batch. Input problems skip the affected pair or mockup; any other failure ends
    /// the batch and is returned. Export resources are released on every path.
    #[tracing::instrument(
        skip_all,
        fields(mockups = job.mockups.len(), designs = job.designs.len())
    )]
    pub fn run<H, P>(
        &mut self,
        job: &BatchJob,
        host: &mut H,
        cache: &mut TextureCache,
        mut progress: P,
    ) -> MockupResult<BatchReport>
    where
        H: HostIo + ?Sized,
        P: FnMut(&BatchProgress),
    {
        if self.state == BatchState::Running {
            return Err(MockupError::validation("a batch is already running"));
        }
        job.settings.validate()?;

        self.state = BatchState::Running;
        info!(total = job.total_pairs(), out = %job.output_dir.display(), "batch started");
        let result = self.run_mockups(job, host, cache, &mut progress);
        self.state = BatchState::Idle;
        self.cancel.reset();

        match &result {
            Ok(report) => info!(
                written = report.written.len(),
                skipped = report.skipped.len(),
                cancelled = report.cancelled,
                "batch finished"
            ),
            Err(e) => warn!(error = %e, "batch aborted"),
        }
        result
    }

    fn run_mockups<H, P>(
        &self,
        job: &BatchJob,
        host: &mut H,
        cache: &mut TextureCache,
        progress: &mut P,
    ) -> MockupResult<BatchReport>
    where
        H: HostIo + ?Sized,
        P: FnMut(&BatchProgress),
    {
        let mut report = BatchReport {
            total: job.total_pairs(),
            ..BatchReport::default()
        };

        for mockup_path in &job.mockups {
            if self.cancel.is_cancelled() {
                report.cancelled = true;
                break;
            }

            let stage = match load_export_stage(job, host, mockup_path) {
                Ok(stage) => stage,
                Err(e) => {
                    warn!(mockup = %mockup_path.display(), error = %e, "skipping mockup");
                    for design in &job.designs {
                        report.skipped.push(SkippedPair {
                            design: design.clone(),
                            mockup: mockup_path.clone(),
                            reason: e.to_string(),
                        });
                        report.completed += 1;
                        progress(&BatchProgress {
                            completed: report.completed,
                            total: report.total,
                            design: design.clone(),
                            mockup: mockup_path.clone(),
                        });
                    }
                    continue;
                }
            };

            for design_path in &job.designs {
                if self.cancel.is_cancelled() {
                    report.cancelled = true;
                    break;
                }

                match export_pair(job, host, cache, &stage, design_path, mockup_path) {
                    Ok(out) => report.written.push(out),
                    Err(PairError::Skip(e)) => {
                        warn!(
                            design = %design_path.display(),
                            mockup = %mockup_path.display(),
                            error = %e,
                            "skipping pair"
                        );
                        report.skipped.push(SkippedPair {
                            design: design_path.clone(),
                            mockup: mockup_path.clone(),
                            reason: e.to_string(),
                        });
                    }
                    Err(PairError::Fatal(e)) => return Err(e),
                }

                report.completed += 1;
                progress(&BatchProgress {
                    completed: report.completed,
                    total: report.total,
                    design: design_path.clone(),
                    mockup: mockup_path.clone(),
                });

                if report.completed < report.total && !job.yield_delay.is_zero() {
                    std::thread::sleep(job.yield_delay);
                }
            }

            drop(stage);
            debug!(mockup = %mockup_path.display(), "export stage released");
            if report.cancelled {
                break;
            }
        }
        Ok(report)
    }
}

enum PairError {
    Skip(MockupError),
    Fatal(MockupError),
}

fn load_export_stage<H>(job: &BatchJob, host: &mut H, mockup_path: &Path) -> MockupResult<CompositorStage>
where
    H: HostIo + ?Sized,
{
    let bytes = host.load_file_bytes(mockup_path)?;
    let mockup = decode_image(&bytes)?;
    debug!(
        mockup = %mockup_path.display(),
        w = mockup.width,
        h = mockup.height,
        "export stage setup"
    );
    Ok(CompositorStage::export(&mockup, &job.settings)?.with_grid(job.mesh_grid))
}

fn export_pair<H>(
    job: &BatchJob,
    host: &mut H,
    cache: &mut TextureCache,
    stage: &CompositorStage,
    design_path: &Path,
    mockup_path: &Path,
) -> Result<PathBuf, PairError>
where
    H: HostIo + ?Sized,
{
    let handle = cache
        .acquire(&source_key(design_path), || {
            let bytes = host.load_file_bytes(design_path)?;
            decode_image(&bytes)
        })
        .map_err(|e| {
            if e.is_input_error() {
                PairError::Skip(e)
            } else {
                PairError::Fatal(e)
            }
        })?;

    let result = write_pair(job, host, stage, &handle, design_path, mockup_path);
    let release = cache.release(handle);
    debug!(design = %design_path.display(), ?release, "design texture released");
    result.map_err(PairError::Fatal)
}

fn write_pair<H>(
    job: &BatchJob,
    host: &mut H,
    stage: &CompositorStage,
    handle: &TextureHandle,
    design_path: &Path,
    mockup_path: &Path,
) -> MockupResult<PathBuf>
where
    H: HostIo + ?Sized,
{
    let texture = handle.image();
    let mut placement = job.placement.clone();
    placement.reapply_design(texture.width, texture.height);

    let surface = stage.render(Some(DesignLayer {
        texture,
        placement: &placement,
    }))?;
    let intermediate = encode_png(&surface)?;
    let custom_width = (job.settings.export_preset == ExportPreset::Custom)
        .then_some(job.settings.custom_export_width);
    let bytes = resize_image(
        &intermediate,
        job.settings.export_preset,
        custom_width,
        job.settings.export_format,
    )?;

    let out = job.output_path(design_path, mockup_path);
    host.write_image_bytes(&out, &bytes)?;
    debug!(out = %out.display(), "pair written");
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/batch/pipeline.rs"]
mod tests;
