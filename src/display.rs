//! Display binding and frame presentation.
//!
//! Windowed mode drives a fullscreen borderless window and blits the CPU
//! raster to the screen through a wgpu surface each frame. Offscreen mode
//! renders the same scenes headless and writes raw raster dumps instead.
//! Failure to acquire the display is fatal: the error propagates out of
//! [`run`] and there is no retry path.

use std::io::Write;
use std::sync::Arc;

use anyhow::Context as _;
use tracing::{error, info};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Fullscreen, Window, WindowId},
};

use crate::canvas::Canvas;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::fontset::FontSet;

/// One frame's worth of drawing.
///
/// The scene calls [`Canvas::begin_frame`] itself; the driver presents the
/// raster afterwards and reports presentation errors to the caller.
pub trait Scene {
    /// Render frame number `frame_no` onto `canvas`.
    ///
    /// # Errors
    /// Any error aborts the run and is reported by the driver.
    fn frame(&mut self, canvas: &mut Canvas, fonts: &FontSet, frame_no: u64) -> anyhow::Result<()>;
}

/// Run a scene against the platform display until the window closes or a
/// key (Escape/Q) exits.
///
/// # Errors
/// Returns a fatal error if the display, surface, or device cannot be
/// acquired, or if presentation fails mid-run.
pub fn run(cfg: &Config, fonts: FontSet, scene: Box<dyn Scene>) -> Result<()> {
    let event_loop = EventLoop::new().map_err(|e| Error::Render(e.into()))?;
    let mut app = App {
        capture: cfg.surface.capture,
        fonts,
        scene,
        window: None,
        gpu: None,
        canvas: None,
        frame_no: 0,
        failure: None,
    };
    event_loop
        .run_app(&mut app)
        .map_err(|e| Error::Render(e.into()))?;
    match app.failure {
        Some(err) => Err(Error::Render(err)),
        None => Ok(()),
    }
}

/// Render `frames` frames headless at the configured surface size, writing
/// each frame's raster dump (`width * height * 4` bytes, bottom-to-top) to
/// `out` as one contiguous write.
///
/// # Errors
/// Propagates scene and write errors; never touches the platform display.
pub fn run_offscreen(
    cfg: &Config,
    fonts: &FontSet,
    scene: &mut dyn Scene,
    frames: u64,
    out: &mut dyn Write,
) -> Result<()> {
    let mut canvas = Canvas::new(cfg.surface.width, cfg.surface.height)?;
    info!(
        width = cfg.surface.width,
        height = cfg.surface.height,
        frames,
        "rendering offscreen"
    );
    for frame_no in 0..frames {
        scene
            .frame(&mut canvas, fonts, frame_no)
            .map_err(Error::Render)?;
        out.write_all(&canvas.raster_dump())?;
    }
    out.flush()?;
    Ok(())
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct Vertex {
    pos: [f32; 2],
    uv: [f32; 2],
}

const QUAD: [Vertex; 4] = [
    //   NDC pos         UV
    Vertex {
        pos: [-1.0, -1.0],
        uv: [0.0, 1.0],
    }, // bottom-left
    Vertex {
        pos: [1.0, -1.0],
        uv: [1.0, 1.0],
    }, // bottom-right
    Vertex {
        pos: [-1.0, 1.0],
        uv: [0.0, 0.0],
    }, // top-left
    Vertex {
        pos: [1.0, 1.0],
        uv: [1.0, 0.0],
    }, // top-right
];

struct Gpu {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    pipeline: wgpu::RenderPipeline,
    bind_layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
    sampler: wgpu::Sampler,
    vbuf: wgpu::Buffer,
    tex: wgpu::Texture,
    tex_size: (u32, u32),
}

struct App {
    capture: bool,
    fonts: FontSet,
    scene: Box<dyn Scene>,
    window: Option<Arc<Window>>,
    gpu: Option<Gpu>,
    canvas: Option<Canvas>,
    frame_no: u64,
    failure: Option<anyhow::Error>,
}

impl App {
    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        error!("display failure: {err:#}");
        self.failure = Some(err);
        event_loop.exit();
    }

    fn redraw(&mut self) -> anyhow::Result<()> {
        let (Some(gpu), Some(canvas)) = (self.gpu.as_mut(), self.canvas.as_mut()) else {
            return Ok(());
        };

        self.scene
            .frame(canvas, &self.fonts, self.frame_no)
            .with_context(|| format!("rendering frame {}", self.frame_no))?;
        self.frame_no += 1;

        if self.capture {
            // Dump the raster before presenting, one contiguous write.
            let mut out = std::io::stdout().lock();
            out.write_all(&canvas.raster_dump())
                .context("writing raster dump")?;
        }

        // Upload the raster, re-creating the texture if the surface size
        // changed since the last frame.
        let (w, h) = (canvas.width(), canvas.height());
        if gpu.tex_size != (w, h) {
            gpu.tex = make_texture(&gpu.device, w, h);
            gpu.tex_size = (w, h);
            gpu.bind_group = make_bind_group(
                &gpu.device,
                &gpu.bind_layout,
                &gpu.tex.create_view(&wgpu::TextureViewDescriptor::default()),
                &gpu.sampler,
            );
        }
        gpu.queue.write_texture(
            gpu.tex.as_image_copy(),
            &canvas.rgba_top_down(),
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * w),
                rows_per_image: Some(h),
            },
            wgpu::Extent3d {
                width: w,
                height: h,
                depth_or_array_layers: 1,
            },
        );

        let frame = gpu
            .surface
            .get_current_texture()
            .context("acquiring surface frame")?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("encoder"),
            });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("rpass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            rpass.set_pipeline(&gpu.pipeline);
            rpass.set_bind_group(0, &gpu.bind_group, &[]);
            rpass.set_vertex_buffer(0, gpu.vbuf.slice(..));
            rpass.draw(0..4, 0..1);
        }
        gpu.queue.submit([encoder.finish()]);
        frame.present();
        Ok(())
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let attrs = Window::default_attributes().with_title("shapecanvas");
        let window = match event_loop.create_window(attrs) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                self.fail(event_loop, anyhow::Error::new(e).context("creating window"));
                return;
            }
        };
        let monitor = window.current_monitor();
        window.set_fullscreen(Some(Fullscreen::Borderless(monitor)));
        window.set_cursor_visible(false);
        self.window = Some(window.clone());

        let PhysicalSize { width, height } = window.inner_size();
        let (width, height) = (width.max(1), height.max(1));
        info!(width, height, "display acquired");

        match Canvas::new(width, height).map_err(anyhow::Error::new) {
            Ok(canvas) => self.canvas = Some(canvas),
            Err(e) => {
                self.fail(event_loop, e);
                return;
            }
        }

        match pollster::block_on(init_gpu(window, width, height)) {
            Ok(gpu) => self.gpu = Some(gpu),
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(win) = &self.window else { return };
        if win.id() != window_id {
            return;
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Released {
                    use winit::keyboard::{KeyCode, PhysicalKey};
                    if let PhysicalKey::Code(KeyCode::Escape | KeyCode::KeyQ) = event.physical_key {
                        event_loop.exit();
                    }
                }
            }
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                if width == 0 || height == 0 {
                    return;
                }
                if let Some(gpu) = &mut self.gpu {
                    gpu.config.width = width;
                    gpu.config.height = height;
                    gpu.surface.configure(&gpu.device, &gpu.config);
                }
                match Canvas::new(width, height).map_err(anyhow::Error::new) {
                    Ok(canvas) => self.canvas = Some(canvas),
                    Err(e) => self.fail(event_loop, e),
                }
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.redraw() {
                    self.fail(event_loop, e);
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(win) = &self.window {
            win.request_redraw();
        }
    }
}

async fn init_gpu(window: Arc<Window>, width: u32, height: u32) -> anyhow::Result<Gpu> {
    let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::default());
    let surface = instance
        .create_surface(window)
        .context("creating surface")?;

    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        })
        .await
        .context("no compatible GPU adapter found")?;

    let (device, queue) = adapter
        .request_device(
            &wgpu::DeviceDescriptor {
                label: Some("device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
            },
            None,
        )
        .await?;

    let caps = surface.get_capabilities(&adapter);
    let format = caps
        .formats
        .iter()
        .copied()
        .find(wgpu::TextureFormat::is_srgb)
        .unwrap_or(caps.formats[0]);
    let config = wgpu::SurfaceConfiguration {
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        format,
        width,
        height,
        present_mode: wgpu::PresentMode::AutoVsync,
        alpha_mode: caps.alpha_modes[0],
        view_formats: vec![],
        desired_maximum_frame_latency: 1,
    };
    surface.configure(&device, &config);

    let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("sampler"),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Nearest,
        ..Default::default()
    });

    let vbuf = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("quad"),
        size: std::mem::size_of_val(&QUAD) as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    queue.write_buffer(&vbuf, 0, bytemuck::cast_slice(&QUAD));

    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("shaders/blit.wgsl").into()),
    });

    let bind_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("bind_layout"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    });

    let tex = make_texture(&device, width, height);
    let bind_group = make_bind_group(
        &device,
        &bind_layout,
        &tex.create_view(&wgpu::TextureViewDescriptor::default()),
        &sampler,
    );

    let vlayout = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2],
    };

    let pip_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("pipe_layout"),
        bind_group_layouts: &[&bind_layout],
        push_constant_ranges: &[],
    });

    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("pipeline"),
        layout: Some(&pip_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: "vs_main",
            buffers: &[vlayout],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: "fs_main",
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleStrip,
            strip_index_format: None,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
    });

    Ok(Gpu {
        surface,
        device,
        queue,
        config,
        pipeline,
        bind_layout,
        bind_group,
        sampler,
        vbuf,
        tex,
        tex_size: (width, height),
    })
}

fn make_texture(device: &wgpu::Device, w: u32, h: u32) -> wgpu::Texture {
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some("frame"),
        size: wgpu::Extent3d {
            width: w,
            height: h,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    })
}

fn make_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    view: &wgpu::TextureView,
    sampler: &wgpu::Sampler,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("bind_group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}
