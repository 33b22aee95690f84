use winit::event::WindowEvent;
use winit::window::Window;

use crate::core::FlightState;

/// What the status overlay shows this frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HudStatus {
    pub view: String,
    pub flight: Option<FlightState>,
    pub progress: f64,
    pub fps: f32,
}

impl HudStatus {
    pub fn flight_label(&self) -> &'static str {
        match self.flight {
            Some(FlightState::Idle) => "idle",
            Some(FlightState::Active) => "flying",
            Some(FlightState::Completed) => "arrived",
            None => "-",
        }
    }
}

/// egui overlay drawn on top of the tunnel
pub struct Hud {
    ctx: egui::Context,
    state: egui_winit::State,
    renderer: egui_wgpu::Renderer,
}

impl Hud {
    pub fn new(window: &Window, device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let ctx = egui::Context::default();
        let state = egui_winit::State::new(
            ctx.clone(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let renderer = egui_wgpu::Renderer::new(device, format, egui_wgpu::RendererOptions::default());

        Self {
            ctx,
            state,
            renderer,
        }
    }

    /// Returns true when egui consumed the event
    pub fn handle_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        self.state.on_window_event(window, event).consumed
    }

    #[allow(clippy::too_many_arguments)]
    pub fn draw(
        &mut self,
        window: &Window,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        size_in_pixels: [u32; 2],
        status: &HudStatus,
    ) {
        let raw_input = self.state.take_egui_input(window);
        let full_output = self.ctx.run(raw_input, |ctx| {
            egui::Window::new("Status")
                .title_bar(false)
                .resizable(false)
                .fixed_pos(egui::pos2(10.0, 10.0))
                .frame(egui::Frame::NONE)
                .show(ctx, |ui| {
                    ui.label(
                        egui::RichText::new(status.view.to_uppercase())
                            .size(18.0)
                            .monospace()
                            .color(egui::Color32::from_rgb(0, 163, 255)),
                    );
                    ui.label(
                        egui::RichText::new(format!(
                            "{}  {:>5.1}%",
                            status.flight_label(),
                            status.progress * 100.0
                        ))
                        .size(12.0)
                        .monospace()
                        .color(egui::Color32::from_rgb(0, 255, 170)),
                    );
                    ui.label(
                        egui::RichText::new(format!("{:.0} FPS", status.fps))
                            .size(12.0)
                            .color(egui::Color32::GRAY),
                    );
                });
        });

        self.state
            .handle_platform_output(window, full_output.platform_output);

        // the surface may be smaller than the window when the pixel ratio is clamped
        let surface_scale = size_in_pixels[0] as f32 / window.inner_size().width.max(1) as f32;
        let tris = self
            .ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point * surface_scale);
        for (id, image_delta) in &full_output.textures_delta.set {
            self.renderer.update_texture(device, queue, *id, image_delta);
        }

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels,
            pixels_per_point: full_output.pixels_per_point * surface_scale,
        };
        self.renderer
            .update_buffers(device, queue, encoder, &tris, &screen_descriptor);

        {
            let render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("HUD Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            let mut render_pass = render_pass.forget_lifetime();
            self.renderer
                .render(&mut render_pass, &tris, &screen_descriptor);
        }

        for id in &full_output.textures_delta.free {
            self.renderer.free_texture(id);
        }
    }
}
