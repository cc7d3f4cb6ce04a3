//! In-process application core: the active mockup and design, their placement, the preview
//! stage and the batch entry point.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::{
    assets::{
        PreparedImage,
        decode::decode_image,
        store::{TextureCache, TextureHandle, source_key},
    },
    batch::{
        io::{HostIo, file_stem},
        pipeline::{BatchExportPipeline, BatchJob, BatchProgress, BatchReport, CancelToken},
    },
    foundation::{
        core::Canvas,
        error::{MockupError, MockupResult},
    },
    interaction::controller::{InteractionController, PointerEvent},
    render::{
        stage::{CompositorStage, DesignLayer},
        surface::Surface,
    },
    settings::{RenderSettings, SettingsStore},
    transform::TransformEngine,
};

/// Largest preview canvas used when the host does not pick one.
pub const DEFAULT_PREVIEW_MAX: Canvas = Canvas {
    width: 800,
    height: 800,
};

/// A decoded mockup photo.
#[derive(Clone, Debug)]
pub struct MockupImage {
    pub image: PreparedImage,
    pub name: String,
    pub path: Option<PathBuf>,
}

impl MockupImage {
    pub fn canvas(&self) -> MockupResult<Canvas> {
        Canvas::new(self.image.width, self.image.height)
    }
}

/// The design currently on the preview. Its crop lives in the [`TransformEngine`].
#[derive(Debug)]
pub struct DesignImage {
    pub handle: TextureHandle,
    pub name: String,
    pub path: Option<PathBuf>,
}

impl DesignImage {
    pub fn image(&self) -> &PreparedImage {
        self.handle.image()
    }
}

pub struct Studio {
    settings: SettingsStore,
    cache: TextureCache,
    engine: TransformEngine,
    controller: InteractionController,
    active_mockup: Option<MockupImage>,
    mockup_queue: Vec<PathBuf>,
    design: Option<DesignImage>,
    preview: Option<CompositorStage>,
    preview_max: Canvas,
    pipeline: BatchExportPipeline,
}

impl Default for Studio {
    fn default() -> Self {
        Self::new(SettingsStore::default(), DEFAULT_PREVIEW_MAX)
    }
}

impl Studio {
    pub fn new(settings: SettingsStore, preview_max: Canvas) -> Self {
        Self {
            settings,
            cache: TextureCache::new(),
            engine: TransformEngine::new(),
            controller: InteractionController::new(),
            active_mockup: None,
            mockup_queue: Vec::new(),
            design: None,
            preview: None,
            preview_max,
            pipeline: BatchExportPipeline::new(),
        }
    }

    pub fn settings(&self) -> RenderSettings {
        self.settings.snapshot()
    }

    pub fn settings_store(&self) -> &SettingsStore {
        &self.settings
    }

    pub fn engine(&self) -> &TransformEngine {
        &self.engine
    }

    /// Direct placement edits (sliders, wheel, keyboard). The preview picks them up on the
    /// next render.
    pub fn engine_mut(&mut self) -> &mut TransformEngine {
        &mut self.engine
    }

    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    pub fn cache(&self) -> &TextureCache {
        &self.cache
    }

    pub fn active_mockup(&self) -> Option<&MockupImage> {
        self.active_mockup.as_ref()
    }

    pub fn design(&self) -> Option<&DesignImage> {
        self.design.as_ref()
    }

    pub fn mockup_queue(&self) -> &[PathBuf] {
        &self.mockup_queue
    }

    pub fn preview_stage(&self) -> Option<&CompositorStage> {
        self.preview.as_ref()
    }

    /// Canvas the preview renders at (the mockup fitted into the preview bounds).
    pub fn preview_canvas(&self) -> Option<Canvas> {
        self.preview.as_ref().map(CompositorStage::canvas)
    }

    /// Make `bytes` the active mockup and rebuild the preview stage around it.
    pub fn load_mockup_bytes(
        &mut self,
        name: impl Into<String>,
        path: Option<PathBuf>,
        bytes: &[u8],
    ) -> MockupResult<()> {
        let image = decode_image(bytes)?;
        let mockup = MockupImage {
            image,
            name: name.into(),
            path,
        };
        self.install_mockup(mockup)
    }

    pub fn load_mockup_file<H: HostIo + ?Sized>(
        &mut self,
        host: &mut H,
        path: &Path,
    ) -> MockupResult<()> {
        let bytes = host.load_file_bytes(path)?;
        self.load_mockup_bytes(file_stem(path), Some(path.to_path_buf()), &bytes)
    }

    /// Build the preview stage for `mockup`; state is only replaced once the stage exists.
    /// The design keeps its placement across the mockup change.
    fn install_mockup(&mut self, mockup: MockupImage) -> MockupResult<()> {
        let bounds = Canvas::new(self.preview_max.width, self.preview_max.height)?;
        let canvas = mockup.canvas()?.fit_within(bounds.width, bounds.height);
        let stage = CompositorStage::preview(&mockup.image, &self.settings.snapshot(), canvas)?;
        info!(
            mockup = %mockup.name,
            w = mockup.image.width,
            h = mockup.image.height,
            preview_w = canvas.width,
            preview_h = canvas.height,
            "mockup loaded"
        );
        self.preview = Some(stage);
        self.active_mockup = Some(mockup);
        self.reapply_design();
        Ok(())
    }

    /// Change the preview bounds (host window resized); rebuilds the preview stage.
    ///
    /// On failure the previous bounds, mockup and preview stage stay in place.
    pub fn set_preview_max(&mut self, preview_max: Canvas) -> MockupResult<()> {
        let previous = std::mem::replace(&mut self.preview_max, preview_max);
        let Some(mockup) = self.active_mockup.clone() else {
            return Ok(());
        };
        if let Err(e) = self.install_mockup(mockup) {
            self.preview_max = previous;
            return Err(e);
        }
        Ok(())
    }

    /// Replace the pending batch mockups.
    pub fn set_mockup_queue(&mut self, paths: Vec<PathBuf>) {
        self.mockup_queue = paths;
    }

    pub fn queue_mockup(&mut self, path: impl Into<PathBuf>) {
        self.mockup_queue.push(path.into());
    }

    pub fn clear_mockup_queue(&mut self) {
        self.mockup_queue.clear();
    }

    /// Load a design through the texture cache. Every load is a new design: placement and
    /// crop reset. A file that is already cached shares its decoded texture.
    pub fn load_design<H: HostIo + ?Sized>(
        &mut self,
        host: &mut H,
        path: &Path,
    ) -> MockupResult<()> {
        let handle = self.cache.acquire(&source_key(path), || {
            let bytes = host.load_file_bytes(path)?;
            decode_image(&bytes)
        })?;
        self.install_design(handle, file_stem(path), Some(path.to_path_buf()));
        Ok(())
    }

    /// Load a design that has no backing file (pasted or generated).
    pub fn load_design_bytes(&mut self, name: impl Into<String>, bytes: &[u8]) -> MockupResult<()> {
        let name = name.into();
        let handle = self.cache.adopt(decode_image(bytes)?);
        self.install_design(handle, name, None);
        Ok(())
    }

    fn install_design(&mut self, handle: TextureHandle, name: String, path: Option<PathBuf>) {
        let (w, h) = (handle.image().width, handle.image().height);
        self.engine.reset_for_new_design(w, h);
        self.controller.select_new_design();
        if let Some(old) = self.design.take() {
            let release = self.cache.release(old.handle);
            debug!(?release, "previous design released");
        }
        debug!(design = %name, w, h, "design loaded");
        self.design = Some(DesignImage { handle, name, path });
    }

    /// Re-apply the active design (after a mockup change): placement and crop are kept.
    pub fn reapply_design(&mut self) {
        if let Some(design) = &self.design {
            let image = design.image();
            self.engine.reapply_design(image.width, image.height);
        }
    }

    pub fn clear_design(&mut self) {
        if let Some(old) = self.design.take() {
            self.cache.release(old.handle);
        }
        self.engine.clear_design();
        self.controller.reset();
    }

    /// Apply a settings edit and push it into the preview stage.
    pub fn update_settings<F>(&mut self, edit: F) -> MockupResult<RenderSettings>
    where
        F: FnOnce(&mut RenderSettings),
    {
        let next = self.settings.update(edit)?;
        if let Some(stage) = self.preview.as_mut() {
            stage.update_settings(&next)?;
        }
        Ok(next)
    }

    /// Route a preview pointer event. Returns whether the placement changed.
    pub fn pointer(&mut self, event: PointerEvent) -> MockupResult<bool> {
        let Some(canvas) = self.preview_canvas() else {
            return Ok(false);
        };
        if self.design.is_none() {
            return Ok(false);
        }
        self.controller.handle(event, &mut self.engine, canvas)
    }

    /// Keyboard nudge by whole pixels of the full-resolution mockup.
    pub fn nudge(&mut self, dx_px: i32, dy_px: i32) -> MockupResult<()> {
        if self.design.is_none() {
            return Ok(());
        }
        let mockup = self
            .active_mockup
            .as_ref()
            .ok_or_else(|| MockupError::validation("no mockup loaded"))?;
        let canvas = mockup.canvas()?;
        self.engine.nudge(dx_px, dy_px, canvas);
        Ok(())
    }

    pub fn render_preview(&self) -> MockupResult<Surface> {
        let stage = self
            .preview
            .as_ref()
            .ok_or_else(|| MockupError::validation("no mockup loaded"))?;
        let design = self.design.as_ref().map(|d| DesignLayer {
            texture: d.image(),
            placement: &self.engine,
        });
        stage.render(design)
    }

    /// Batch request for `designs` against the queued mockups, or the active mockup alone when
    /// the queue is empty.
    pub fn batch_job(
        &self,
        designs: Vec<PathBuf>,
        output_dir: impl Into<PathBuf>,
    ) -> MockupResult<BatchJob> {
        let mockups = if self.mockup_queue.is_empty() {
            let path = self
                .active_mockup
                .as_ref()
                .and_then(|m| m.path.clone())
                .ok_or_else(|| {
                    MockupError::validation("batch needs queued mockups or a file-backed mockup")
                })?;
            vec![path]
        } else {
            self.mockup_queue.clone()
        };
        if designs.is_empty() {
            return Err(MockupError::validation("batch needs at least one design"));
        }
        Ok(BatchJob::new(
            mockups,
            designs,
            output_dir,
            self.engine.clone(),
            self.settings.snapshot(),
        ))
    }

    pub fn run_batch<H, P>(
        &mut self,
        host: &mut H,
        job: &BatchJob,
        progress: P,
    ) -> MockupResult<BatchReport>
    where
        H: HostIo + ?Sized,
        P: FnMut(&BatchProgress),
    {
        self.pipeline.run(job, host, &mut self.cache, progress)
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.pipeline.cancel_token()
    }
}

#[cfg(test)]
#[path = "../tests/unit/studio.rs"]
mod tests;
