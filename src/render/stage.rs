//! Layer stack construction and rendering, shared by the preview and export paths.

use crate::{
    assets::PreparedImage,
    effects::{
        blend::{BlendMode, composite_over, tint_in_place},
        displacement::{Displacement, VolumeMap},
        realism::RealismLayerStack,
    },
    foundation::{
        core::{Canvas, RgbColor},
        error::{MockupError, MockupResult},
    },
    render::{
        mesh::{MeshDraw, MeshGrid, draw_textured_mesh},
        surface::{Surface, resample_image},
    },
    settings::RenderSettings,
    transform::TransformEngine,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StageKind {
    /// Screen-sized stage that lives as long as the active mockup.
    Preview,
    /// Full-resolution stage that lives for one mockup of one batch.
    Export,
}

/// Layers in z-order, bottom to top.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LayerRole {
    Background,
    /// Volume map; read by the design container's filter, never drawn.
    Displacement,
    DesignContainer,
    Shadow,
    Grain,
    Highlight,
}

impl LayerRole {
    pub const Z_ORDER: [Self; 6] = [
        Self::Background,
        Self::Displacement,
        Self::DesignContainer,
        Self::Shadow,
        Self::Grain,
        Self::Highlight,
    ];

    pub fn is_drawn(self) -> bool {
        !matches!(self, Self::Displacement)
    }
}

/// Everything derived from one mockup at one target size.
#[derive(Clone, Debug)]
pub struct LayerStack {
    pub canvas: Canvas,
    /// Mockup resampled to `canvas`, before tint.
    pub mockup: Surface,
    /// Tinted mockup, drawn first.
    pub background: Surface,
    pub volume_map: VolumeMap,
    pub displacement: Displacement,
    pub design_alpha: f32,
    pub realism: RealismLayerStack,
    tint: RgbColor,
}

impl LayerStack {
    pub fn roles(&self) -> [LayerRole; 6] {
        LayerRole::Z_ORDER
    }

    pub fn tint(&self) -> RgbColor {
        self.tint
    }
}

/// Build the layer stack for `mockup` at `target`.
///
/// Every size in the stack is a fraction of `target`, so preview and export stacks differ only
/// in resolution.
#[tracing::instrument(level = "debug", skip(mockup, settings), fields(w = target.width, h = target.height))]
pub fn build_layer_stack(
    mockup: &PreparedImage,
    settings: &RenderSettings,
    target: Canvas,
) -> MockupResult<LayerStack> {
    settings.validate()?;
    let resampled = resample_image(mockup, target)?;

    let mut background = resampled.clone();
    tint_in_place(&mut background.data, settings.mockup_color);

    let volume_map = VolumeMap::from_surface(&resampled)?;
    let realism =
        RealismLayerStack::build(&resampled, settings.texture_strength, settings.show_overlay)?;

    Ok(LayerStack {
        canvas: target,
        mockup: resampled,
        background,
        volume_map,
        displacement: Displacement::new(settings.warp_strength as f32),
        design_alpha: settings.design_alpha(),
        realism,
        tint: settings.mockup_color,
    })
}

/// The design to draw into the container: a texture placed by a transform engine.
#[derive(Clone, Copy, Debug)]
pub struct DesignLayer<'a> {
    pub texture: &'a PreparedImage,
    pub placement: &'a TransformEngine,
}

/// A built layer stack plus the parameters needed to render it.
#[derive(Clone, Debug)]
pub struct CompositorStage {
    kind: StageKind,
    grid: MeshGrid,
    settings: RenderSettings,
    stack: LayerStack,
}

impl CompositorStage {
    pub fn preview(
        mockup: &PreparedImage,
        settings: &RenderSettings,
        canvas: Canvas,
    ) -> MockupResult<Self> {
        Ok(Self {
            kind: StageKind::Preview,
            grid: MeshGrid::PREVIEW,
            settings: *settings,
            stack: build_layer_stack(mockup, settings, canvas)?,
        })
    }

    /// Stage at the mockup's own resolution.
    pub fn export(mockup: &PreparedImage, settings: &RenderSettings) -> MockupResult<Self> {
        let canvas = Canvas::new(mockup.width, mockup.height)?;
        Ok(Self {
            kind: StageKind::Export,
            grid: MeshGrid::EXPORT,
            settings: *settings,
            stack: build_layer_stack(mockup, settings, canvas)?,
        })
    }

    pub fn with_grid(mut self, grid: MeshGrid) -> Self {
        self.grid = grid;
        self
    }

    pub fn kind(&self) -> StageKind {
        self.kind
    }

    pub fn canvas(&self) -> Canvas {
        self.stack.canvas
    }

    pub fn grid(&self) -> MeshGrid {
        self.grid
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    pub fn stack(&self) -> &LayerStack {
        &self.stack
    }

    /// Apply new settings without re-resampling the mockup.
    pub fn update_settings(&mut self, settings: &RenderSettings) -> MockupResult<()> {
        settings.validate()?;
        if settings.mockup_color != self.stack.tint {
            let mut background = self.stack.mockup.clone();
            tint_in_place(&mut background.data, settings.mockup_color);
            self.stack.background = background;
            self.stack.tint = settings.mockup_color;
        }
        self.stack.displacement = Displacement::new(settings.warp_strength as f32);
        self.stack.design_alpha = settings.design_alpha();
        self.stack
            .realism
            .update(settings.texture_strength, settings.show_overlay);
        self.settings = *settings;
        Ok(())
    }

    /// Composite the stack, with the design container when `design` is given.
    pub fn render(&self, design: Option<DesignLayer<'_>>) -> MockupResult<Surface> {
        let stack = &self.stack;
        let mut out = stack.background.clone();

        if let Some(design) = design {
            let container = self.draw_design_container(design)?;
            let warped = stack.displacement.apply(&stack.volume_map, &container)?;
            composite_over(&mut out.data, &warped.data, 1.0, BlendMode::Normal)?;
        }

        stack.realism.composite_onto(&mut out)?;
        Ok(out)
    }

    fn draw_design_container(&self, design: DesignLayer<'_>) -> MockupResult<Surface> {
        let canvas = self.canvas();
        let geometry = design.placement.apply_transform(canvas)?;
        if geometry.texture_width as u32 != design.texture.width
            || geometry.texture_height as u32 != design.texture.height
        {
            return Err(MockupError::render(
                "transform was set up for a different design size",
            ));
        }
        let mask = design
            .placement
            .mask_bounds()
            .ok_or_else(|| MockupError::render("no design loaded in the transform engine"))?;

        let mut container = Surface::new(canvas)?;
        let alpha = self.stack.design_alpha * design.placement.transform().opacity as f32;
        draw_textured_mesh(
            &mut container,
            self.grid,
            &MeshDraw {
                texture: design.texture,
                local_to_canvas: geometry.local_to_canvas(),
                mask,
                opacity: alpha,
            },
        )?;
        Ok(container)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/stage.rs"]
mod tests;
