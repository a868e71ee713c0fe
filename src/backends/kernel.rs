//! Compiled-kernel backend: bid models executed as a compute module behind a
//! foreign device boundary.
//!
//! The ensemble's weights are baked into a generated WGSL module at build
//! time, one named entry point per model (`nn_forward_model0` ..). Each
//! invocation marshals the input into a fixed-capacity f32 region that is
//! fully overwritten before every call, dispatches all entry points, and
//! reads the per-model scalars back for reduction. Device arithmetic is f32,
//! like the compiled kernels this backend stands in for.

use std::time::Instant;

use pollster::FutureExt;
use wgpu::util::DeviceExt;

use crate::activation::Activation;
use crate::backends::{Fixture, InitTiming, ScoreBackend};
use crate::ensemble::{Ensemble, ScoreReduction};
use crate::errors::{BackendError, BackendResult, EvaluationError};

/// Fixed capacity (in f32 elements) of the shared input region.
pub const KERNEL_INPUT_CAPACITY: usize = 200;

/// Naming scheme of the generated entry points.
fn entry_point_name(model: usize) -> String {
    format!("nn_forward_model{}", model)
}

/// Backend handle owning the device, the compiled module, and the shared
/// input region for the duration of a benchmark run.
pub struct KernelBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    pipelines: Vec<wgpu::ComputePipeline>,
    bind_group: wgpu::BindGroup,
    input_buffer: wgpu::Buffer,
    result_buffer: wgpu::Buffer,
    staging_buffer: wgpu::Buffer,
    capacity: usize,
    input_len: usize,
    model_count: usize,
    reduction: ScoreReduction,
    init: InitTiming,
}

impl KernelBackend {
    /// Compiles the ensemble into a kernel module with the default input
    /// capacity.
    pub fn new(ensemble: &Ensemble) -> BackendResult<Self> {
        Self::with_capacity(ensemble, KERNEL_INPUT_CAPACITY)
    }

    /// Compiles the ensemble into a kernel module with an explicit input
    /// region capacity.
    ///
    /// Initialization is the pipeline's only suspension point: device
    /// acquisition is awaited to completion here, before any warm-up or
    /// measurement can start. Failures are not retried.
    pub fn with_capacity(ensemble: &Ensemble, capacity: usize) -> BackendResult<Self> {
        let input_len = ensemble.input_size();
        if input_len > capacity {
            return Err(BackendError::InputCapacityExceeded {
                len: input_len,
                capacity,
            });
        }
        validate_shared_shapes(ensemble)?;

        let instantiate_start = Instant::now();
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions::default())
            .block_on()
            .ok_or_else(|| BackendError::DeviceNotAvailable {
                message: "no compatible adapter found".to_string(),
            })?;
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor::default(), None)
            .block_on()
            .map_err(|e| BackendError::DeviceNotAvailable {
                message: e.to_string(),
            })?;
        let instantiate = instantiate_start.elapsed();

        let compile_start = Instant::now();
        let source = compose_kernel_source(ensemble, capacity);
        let packed_weights = pack_weights(ensemble);
        let model_count = ensemble.models().len();

        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Bid Kernel Module"),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        let weights_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Weights Buffer"),
            contents: bytemuck::cast_slice(&packed_weights),
            usage: wgpu::BufferUsages::STORAGE,
        });

        let input_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Input Buffer"),
            size: (capacity * std::mem::size_of::<f32>()) as u64,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let result_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Result Buffer"),
            size: (model_count * std::mem::size_of::<f32>()) as u64,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });

        let staging_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Staging Buffer"),
            size: (model_count * std::mem::size_of::<f32>()) as u64,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Kernel Bind Group Layout"),
            entries: &[
                storage_entry(0, true),
                storage_entry(1, true),
                storage_entry(2, false),
            ],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Kernel Bind Group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: weights_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: input_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: result_buffer.as_entire_binding(),
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Kernel Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipelines = (0..model_count)
            .map(|i| {
                device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                    label: Some("Kernel Pipeline"),
                    layout: Some(&pipeline_layout),
                    module: &shader,
                    entry_point: Some(&entry_point_name(i)),
                    compilation_options: Default::default(),
                    cache: None,
                })
            })
            .collect();

        if let Some(error) = device.pop_error_scope().block_on() {
            return Err(BackendError::KernelCompilationFailed {
                message: error.to_string(),
            });
        }
        let compile = compile_start.elapsed();

        Ok(Self {
            device,
            queue,
            pipelines,
            bind_group,
            input_buffer,
            result_buffer,
            staging_buffer,
            capacity,
            input_len,
            model_count,
            reduction: ensemble.reduction(),
            init: InitTiming {
                compile,
                instantiate,
            },
        })
    }

    /// Invokes every entry point against the current input region contents
    /// and reads back the per-model scalars.
    fn invoke(&mut self, input: &[f64]) -> BackendResult<Vec<f32>> {
        if input.len() != self.input_len {
            return Err(BackendError::Evaluation(
                EvaluationError::InputSizeMismatch {
                    expected: self.input_len,
                    actual: input.len(),
                },
            ));
        }

        // The region is reused across iterations: overwrite all of it so no
        // stale elements leak between calls.
        let mut marshalled = vec![0.0f32; self.capacity];
        for (slot, &value) in marshalled.iter_mut().zip(input.iter()) {
            *slot = value as f32;
        }
        self.queue
            .write_buffer(&self.input_buffer, 0, bytemuck::cast_slice(&marshalled));

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor::default());
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor::default());
            pass.set_bind_group(0, &self.bind_group, &[]);
            for pipeline in &self.pipelines {
                pass.set_pipeline(pipeline);
                pass.dispatch_workgroups(1, 1, 1);
            }
        }
        encoder.copy_buffer_to_buffer(
            &self.result_buffer,
            0,
            &self.staging_buffer,
            0,
            (self.model_count * std::mem::size_of::<f32>()) as u64,
        );
        self.queue.submit(Some(encoder.finish()));

        let slice = self.staging_buffer.slice(..);
        slice.map_async(wgpu::MapMode::Read, |_| {});
        self.device.poll(wgpu::Maintain::Wait);

        let data = slice.get_mapped_range();
        let results: Vec<f32> = bytemuck::cast_slice(&data).to_vec();
        drop(data);
        self.staging_buffer.unmap();

        Ok(results)
    }
}

impl ScoreBackend for KernelBackend {
    fn label(&self) -> &str {
        "kernel"
    }

    fn score(&mut self, fixture: &Fixture) -> BackendResult<f64> {
        let results = self.invoke(&fixture.input)?;
        let outputs: Vec<f64> = results.iter().map(|&r| r as f64).collect();
        Ok(self.reduction.reduce(&outputs))
    }

    fn init_timing(&self) -> Option<InitTiming> {
        Some(self.init)
    }
}

fn storage_entry(binding: u32, read_only: bool) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

/// All models in a kernel ensemble must share layer shapes and activations,
/// since they compile into one forward function parameterized only by the
/// weight offset.
fn validate_shared_shapes(ensemble: &Ensemble) -> BackendResult<()> {
    let reference = ensemble.models()[0].layers();
    for (i, model) in ensemble.models().iter().enumerate().skip(1) {
        let layers = model.layers();
        let matches = layers.len() == reference.len()
            && layers.iter().zip(reference.iter()).all(|(a, b)| {
                a.input_size() == b.input_size()
                    && a.output_size() == b.output_size()
                    && a.activation() == b.activation()
            });
        if !matches {
            return Err(BackendError::KernelShapeMismatch { model: i });
        }
    }
    Ok(())
}

/// Flattens every model's weights (model-major, layer-major, row-major) into
/// the f32 layout the generated module indexes into.
fn pack_weights(ensemble: &Ensemble) -> Vec<f32> {
    let mut packed = Vec::new();
    for model in ensemble.models() {
        for layer in model.layers() {
            for row in layer.weights() {
                packed.extend(row.iter().map(|&w| w as f32));
            }
        }
    }
    packed
}

/// Generates the WGSL module: one shared forward function with the layer
/// loop bounds baked in as literals, plus one entry point per model that
/// passes that model's weight offset.
fn compose_kernel_source(ensemble: &Ensemble, capacity: usize) -> String {
    let model = &ensemble.models()[0];
    let scratch = model
        .layers()
        .iter()
        .map(|l| l.input_size().max(l.output_size()))
        .max()
        .unwrap_or(capacity)
        .max(capacity);

    let mut body = String::new();
    let mut src = "x";
    let mut dst = "y";
    for layer in model.layers() {
        let rows = layer.output_size();
        let cols = layer.input_size();
        let store = match layer.activation() {
            Activation::Relu => "max(sum, 0.0)",
            Activation::Identity => "sum",
        };
        body.push_str(&format!(
            r#"    for (var i = 0u; i < {rows}u; i = i + 1u) {{
        var sum = 0.0;
        for (var j = 0u; j < {cols}u; j = j + 1u) {{
            sum = sum + weights[offset + i * {cols}u + j] * {src}[j];
        }}
        {dst}[i] = {store};
    }}
    offset = offset + {size}u;
"#,
            rows = rows,
            cols = cols,
            src = src,
            dst = dst,
            store = store,
            size = rows * cols,
        ));
        std::mem::swap(&mut src, &mut dst);
    }

    let mut entry_points = String::new();
    let per_model_len: usize = model
        .layers()
        .iter()
        .map(|l| l.input_size() * l.output_size())
        .sum();
    for i in 0..ensemble.models().len() {
        entry_points.push_str(&format!(
            r#"
@compute @workgroup_size(1)
fn {name}() {{
    results[{index}u] = nn_forward({offset}u);
}}
"#,
            name = entry_point_name(i),
            index = i,
            offset = i * per_model_len,
        ));
    }

    format!(
        r#"// Bid forward-pass kernels, generated from the ensemble weights.

@group(0) @binding(0) var<storage, read> weights: array<f32>;
@group(0) @binding(1) var<storage, read> input_region: array<f32>;
@group(0) @binding(2) var<storage, read_write> results: array<f32>;

fn nn_forward(base: u32) -> f32 {{
    var x: array<f32, {scratch}>;
    var y: array<f32, {scratch}>;
    for (var i = 0u; i < {input_len}u; i = i + 1u) {{
        x[i] = input_region[i];
    }}
    var offset = base;
{body}    return {result}[0];
}}
{entry_points}"#,
        scratch = scratch,
        input_len = model.input_size(),
        body = body,
        result = src,
        entry_points = entry_points,
    )
}
