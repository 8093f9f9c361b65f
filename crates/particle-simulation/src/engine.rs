//! GPU execution strategy and its host/device exchange protocol

use particle_physics::{BoxBounds, ParticleSystem, PhysicsEngine, StepError};
use wgpu::util::DeviceExt;

use crate::{GpuError, StepParams};

/// Pairwise stepper running as a compute kernel on the GPU.
///
/// The host keeps the authoritative state. Every step uploads the current
/// positions and velocities, dispatches one kernel pass over all
/// particles, then downloads the next-state buffers back into the host
/// copies. Each phase blocks until the device is done, so a completed
/// step always leaves host and device in agreement. The kernel only reads
/// the current buffers and only writes the next buffers; within a step
/// every particle works from the same snapshot.
pub struct GpuEngine {
    device: wgpu::Device,
    queue: wgpu::Queue,

    // Device buffers
    current_pos_buffer: wgpu::Buffer,
    current_vel_buffer: wgpu::Buffer,
    next_pos_buffer: wgpu::Buffer,
    next_vel_buffer: wgpu::Buffer,
    params_buffer: wgpu::Buffer,
    pos_staging_buffer: wgpu::Buffer,
    vel_staging_buffer: wgpu::Buffer,

    pipeline: wgpu::ComputePipeline,
    bind_group: wgpu::BindGroup,

    // Host copies of the current state, refreshed after every step
    current_positions: Vec<f32>,
    current_velocities: Vec<f32>,

    bounds: BoxBounds,
    damping: f32,
    particle_count: u32,
}

impl GpuEngine {
    pub fn new(
        device: wgpu::Device,
        queue: wgpu::Queue,
        system: ParticleSystem,
        damping: f32,
    ) -> Result<Self, GpuError> {
        let particle_count = system.len() as u32;
        let bounds = system.bounds();
        log::info!("Initializing GpuEngine for {} particles...", particle_count);

        let current_positions = system.positions_flat();
        let current_velocities = system.velocities_flat();

        // Zero-size buffers cannot back a storage binding; an empty
        // population keeps one slot of capacity, matching the max(1)
        // dispatch clamp in step().
        let slot_count = (particle_count as usize).max(1);
        let buffer_size = (slot_count * 2 * std::mem::size_of::<f32>()) as u64;

        let current_pos_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Current Position Buffer"),
            size: buffer_size,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let current_vel_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Current Velocity Buffer"),
            size: buffer_size,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let next_pos_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Next Position Buffer"),
            size: buffer_size,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });

        let next_vel_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Next Velocity Buffer"),
            size: buffer_size,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });

        let params = StepParams::new(particle_count, bounds, damping, 0.0);
        let params_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Step Params Buffer"),
            contents: bytemuck::cast_slice(&[params]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let pos_staging_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Position Staging Buffer"),
            size: buffer_size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let vel_staging_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Velocity Staging Buffer"),
            size: buffer_size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        log::info!("Buffers created");

        // A kernel that fails to compile is fatal; capture the compiler
        // output instead of letting the uncaptured-error handler abort.
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Physics Kernel"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/step.wgsl").into()),
        });

        let bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Physics Bind Group Layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::COMPUTE,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Storage { read_only: true },
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::COMPUTE,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Storage { read_only: true },
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 2,
                        visibility: wgpu::ShaderStages::COMPUTE,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Storage { read_only: false },
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 3,
                        visibility: wgpu::ShaderStages::COMPUTE,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Storage { read_only: false },
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 4,
                        visibility: wgpu::ShaderStages::COMPUTE,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                ],
            });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Physics Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Physics Pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some("physics"),
            compilation_options: Default::default(),
            cache: None,
        });

        if let Some(error) = pollster::block_on(device.pop_error_scope()) {
            return Err(GpuError::KernelCompile(error.to_string()));
        }
        log::info!("Physics kernel compiled");

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Physics Bind Group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: current_pos_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: current_vel_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: next_pos_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: next_vel_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: params_buffer.as_entire_binding(),
                },
            ],
        });

        log::info!("Pipeline and bind group created");

        Ok(Self {
            device,
            queue,
            current_pos_buffer,
            current_vel_buffer,
            next_pos_buffer,
            next_vel_buffer,
            params_buffer,
            pos_staging_buffer,
            vel_staging_buffer,
            pipeline,
            bind_group,
            current_positions,
            current_velocities,
            bounds,
            damping,
            particle_count,
        })
    }

    fn wait_for_device(&self) -> Result<(), GpuError> {
        self.device
            .poll(wgpu::PollType::Wait {
                submission_index: None,
                timeout: None,
            })
            .map_err(|e| GpuError::DeviceWait(e.to_string()))?;
        Ok(())
    }

    /// Phase 1: push the host state and this step's parameters to the
    /// device.
    fn upload_state(&self, delta_ms: f32) -> Result<(), GpuError> {
        let params = StepParams::new(self.particle_count, self.bounds, self.damping, delta_ms);
        self.queue
            .write_buffer(&self.params_buffer, 0, bytemuck::cast_slice(&[params]));
        self.queue.write_buffer(
            &self.current_pos_buffer,
            0,
            bytemuck::cast_slice(&self.current_positions),
        );
        self.queue.write_buffer(
            &self.current_vel_buffer,
            0,
            bytemuck::cast_slice(&self.current_velocities),
        );

        // Empty submission flushes the queued writes.
        self.queue.submit(std::iter::empty());
        self.wait_for_device()
    }

    /// Phase 2: run the kernel once over every particle.
    fn dispatch_kernel(&self) -> Result<(), GpuError> {
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Step Encoder"),
            });

        // 256 threads per workgroup; a dispatch of zero groups is
        // invalid, so an empty population still dispatches one.
        let workgroup_count = (self.particle_count.max(1) + 255) / 256;

        {
            let mut compute_pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("Physics Pass"),
                timestamp_writes: None,
            });
            compute_pass.set_pipeline(&self.pipeline);
            compute_pass.set_bind_group(0, &self.bind_group, &[]);
            compute_pass.dispatch_workgroups(workgroup_count, 1, 1);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        self.wait_for_device()
    }

    /// Phase 3: pull the next-state buffers back into the host copies.
    fn download_state(&mut self) -> Result<(), GpuError> {
        let data_size = (self.current_positions.len() * std::mem::size_of::<f32>()) as u64;

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Readback Encoder"),
            });
        encoder.copy_buffer_to_buffer(&self.next_pos_buffer, 0, &self.pos_staging_buffer, 0, data_size);
        encoder.copy_buffer_to_buffer(&self.next_vel_buffer, 0, &self.vel_staging_buffer, 0, data_size);
        self.queue.submit(std::iter::once(encoder.finish()));

        let pos_slice = self.pos_staging_buffer.slice(..);
        let (pos_tx, pos_rx) = std::sync::mpsc::channel();
        pos_slice.map_async(wgpu::MapMode::Read, move |r| {
            let _ = pos_tx.send(r);
        });

        let vel_slice = self.vel_staging_buffer.slice(..);
        let (vel_tx, vel_rx) = std::sync::mpsc::channel();
        vel_slice.map_async(wgpu::MapMode::Read, move |r| {
            let _ = vel_tx.send(r);
        });

        self.wait_for_device()?;

        pos_rx
            .recv()
            .map_err(|_| GpuError::Readback("position map callback never ran".to_string()))?
            .map_err(|e| GpuError::BufferMapping(e.to_string()))?;
        vel_rx
            .recv()
            .map_err(|_| GpuError::Readback("velocity map callback never ran".to_string()))?
            .map_err(|e| GpuError::BufferMapping(e.to_string()))?;

        let len = self.current_positions.len();
        {
            let mapped = pos_slice.get_mapped_range();
            let data: &[f32] = bytemuck::cast_slice(&mapped);
            self.current_positions.copy_from_slice(&data[..len]);
        }
        self.pos_staging_buffer.unmap();

        {
            let mapped = vel_slice.get_mapped_range();
            let data: &[f32] = bytemuck::cast_slice(&mapped);
            self.current_velocities.copy_from_slice(&data[..len]);
        }
        self.vel_staging_buffer.unmap();

        Ok(())
    }
}

impl PhysicsEngine for GpuEngine {
    fn step(&mut self, delta_ms: f32) -> Result<(), StepError> {
        self.upload_state(delta_ms)?;
        self.dispatch_kernel()?;
        self.download_state()?;
        Ok(())
    }

    fn positions(&self) -> &[f32] {
        &self.current_positions
    }

    fn velocities(&self) -> &[f32] {
        &self.current_velocities
    }

    fn particle_count(&self) -> u32 {
        self.particle_count
    }
}

/// Device and queue for compute-only use, without a window surface.
pub fn create_headless_device() -> Result<(wgpu::Device, wgpu::Queue), GpuError> {
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::PRIMARY,
        ..Default::default()
    });

    let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
        power_preference: wgpu::PowerPreference::HighPerformance,
        compatible_surface: None,
        force_fallback_adapter: false,
    }))?;

    let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
        label: Some("Compute Device"),
        required_features: wgpu::Features::empty(),
        required_limits: wgpu::Limits::default(),
        memory_hints: wgpu::MemoryHints::default(),
        experimental_features: wgpu::ExperimentalFeatures::default(),
        trace: wgpu::Trace::Off,
    }))?;

    Ok((device, queue))
}
