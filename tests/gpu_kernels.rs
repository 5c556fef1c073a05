//! Kernels run against a real device. Every test returns early when no
//! adapter is available so the suite still passes on GPU-less machines.

use gpu_life::config::{ConfigError, LifeConfig};
use gpu_life::error::{LifeError, SHADER_FAILURE_EXIT_CODE, STARTUP_FAILURE_EXIT_CODE};
use gpu_life::gfx::presenter::create_present_pipeline;
use gpu_life::gfx::GpuContext;
use gpu_life::simulation::{EdgePolicy, GridExtent, LifeSimulation, Role, Rule};
use gpu_life::wgpu_utils::{ShaderKind, ShaderSource};

fn gpu() -> Option<GpuContext> {
    match GpuContext::headless() {
        Ok(gpu) => Some(gpu),
        Err(err) => {
            eprintln!("skipping: no GPU available ({err})");
            None
        }
    }
}

fn config(width: u32, height: u32, edges: EdgePolicy) -> LifeConfig {
    LifeConfig {
        grid: GridExtent::new(width, height),
        edges,
        ..LifeConfig::default()
    }
}

fn failure(result: Result<LifeSimulation, LifeError>) -> LifeError {
    match result {
        Ok(_) => panic!("simulation built despite bad input"),
        Err(err) => err,
    }
}

fn pattern(extent: GridExtent, live: &[(u32, u32)]) -> Vec<i32> {
    let mut cells = vec![0; extent.cell_count()];
    for &(x, y) in live {
        cells[extent.index(x, y)] = 1;
    }
    cells
}

fn live_cells(extent: GridExtent, cells: &[i32]) -> Vec<(u32, u32)> {
    let mut live = Vec::new();
    for y in 0..extent.height {
        for x in 0..extent.width {
            if cells[extent.index(x, y)] != 0 {
                live.push((x, y));
            }
        }
    }
    live
}

#[test]
fn test_blinker_oscillates() {
    let Some(gpu) = gpu() else { return };
    let config = config(16, 16, EdgePolicy::Wrap);
    let extent = config.grid;
    let horizontal = [(6, 7), (7, 7), (8, 7)];
    let vertical = [(7, 6), (7, 7), (7, 8)];

    let mut simulation =
        LifeSimulation::from_cells(&gpu, &config, &pattern(extent, &horizontal)).unwrap();

    simulation.step();
    let cells = simulation.read_current().unwrap();
    assert_eq!(live_cells(extent, &cells), vertical.to_vec());

    simulation.step();
    let cells = simulation.read_current().unwrap();
    assert_eq!(live_cells(extent, &cells), horizontal.to_vec());
    assert_eq!(simulation.generation(), 2);
}

#[test]
fn test_blinker_wraps_across_edges() {
    let Some(gpu) = gpu() else { return };
    let config = config(16, 16, EdgePolicy::Wrap);
    let extent = config.grid;
    // straddles the left/right seam
    let horizontal = [(15, 4), (0, 4), (1, 4)];

    let mut simulation =
        LifeSimulation::from_cells(&gpu, &config, &pattern(extent, &horizontal)).unwrap();
    simulation.step();

    let cells = simulation.read_current().unwrap();
    assert_eq!(live_cells(extent, &cells), vec![(0, 3), (0, 4), (0, 5)]);
}

#[test]
fn test_dead_edges_clip_blinker() {
    let Some(gpu) = gpu() else { return };
    let config = config(16, 16, EdgePolicy::Dead);
    let extent = config.grid;
    // vertical blinker in the leftmost column
    let vertical = [(0, 5), (0, 6), (0, 7)];

    let mut simulation =
        LifeSimulation::from_cells(&gpu, &config, &pattern(extent, &vertical)).unwrap();
    simulation.step();

    // nothing is born beyond the left border
    let cells = simulation.read_current().unwrap();
    assert_eq!(live_cells(extent, &cells), vec![(0, 6), (1, 6)]);
}

#[test]
fn test_block_is_still_life() {
    let Some(gpu) = gpu() else { return };
    let config = config(16, 16, EdgePolicy::Wrap);
    let extent = config.grid;
    let block = [(3, 3), (4, 3), (3, 4), (4, 4)];

    let mut simulation =
        LifeSimulation::from_cells(&gpu, &config, &pattern(extent, &block)).unwrap();
    for _ in 0..5 {
        simulation.step();
    }

    let cells = simulation.read_current().unwrap();
    assert_eq!(live_cells(extent, &cells), block.to_vec());
}

#[test]
fn test_lonely_cell_dies_and_three_give_birth() {
    let Some(gpu) = gpu() else { return };
    let config = config(16, 16, EdgePolicy::Wrap);
    let extent = config.grid;
    // an L of three cells becomes a block; the far cell starves
    let live = [(2, 2), (3, 2), (2, 3), (10, 10)];

    let mut simulation =
        LifeSimulation::from_cells(&gpu, &config, &pattern(extent, &live)).unwrap();
    simulation.step();

    let cells = simulation.read_current().unwrap();
    assert_eq!(
        live_cells(extent, &cells),
        vec![(2, 2), (3, 2), (2, 3), (3, 3)]
    );
}

#[test]
fn test_partial_tiles_cover_every_cell() {
    let Some(gpu) = gpu() else { return };
    // neither side is a multiple of the 8x8 tile
    let config = config(10, 6, EdgePolicy::Wrap);
    let extent = config.grid;

    let mut simulation =
        LifeSimulation::from_cells(&gpu, &config, &pattern(extent, &[])).unwrap();

    // fill the output side with values the kernel never writes
    let garbage = vec![7; extent.cell_count()];
    simulation
        .pair()
        .bind(Role::Output)
        .write_cells(gpu.queue(), &garbage)
        .unwrap();

    simulation.step();
    let cells = simulation.read_current().unwrap();
    assert!(cells.iter().all(|&cell| cell == 0), "{cells:?}");
}

#[test]
fn test_highlife_replicator_birth_on_six() {
    let Some(gpu) = gpu() else { return };
    let mut config = config(16, 16, EdgePolicy::Dead);
    config.rule = Rule::highlife();
    let extent = config.grid;
    // (5, 5) has exactly six live neighbors
    let live = [(4, 4), (5, 4), (6, 4), (4, 5), (6, 5), (5, 6)];

    let mut simulation =
        LifeSimulation::from_cells(&gpu, &config, &pattern(extent, &live)).unwrap();
    simulation.step();

    let cells = simulation.read_current().unwrap();
    assert_eq!(cells[extent.index(5, 5)], 1);

    // Conway's rule leaves it empty
    let conway = Rule::conway();
    assert!(!conway.next_state(false, 6));
}

#[test]
fn test_randomizer_density() {
    let Some(gpu) = gpu() else { return };
    for density in [0.25_f32, 0.5, 0.75] {
        let mut config = config(128, 128, EdgePolicy::Wrap);
        config.seed = Some(1234);
        config.density = density;

        let simulation = LifeSimulation::new(&gpu, &config).unwrap();
        let cells = simulation.read_current().unwrap();

        assert!(cells.iter().all(|&cell| cell == 0 || cell == 1));
        let live = cells.iter().filter(|&&cell| cell != 0).count();
        let observed = live as f32 / cells.len() as f32;
        assert!(
            (observed - density).abs() < 0.05,
            "density {density}: observed {observed}"
        );
    }
}

#[test]
fn test_randomizer_seed_is_reproducible() {
    let Some(gpu) = gpu() else { return };
    let mut config = config(32, 32, EdgePolicy::Wrap);
    config.seed = Some(99);

    let first = LifeSimulation::new(&gpu, &config)
        .unwrap()
        .read_current()
        .unwrap();
    let second = LifeSimulation::new(&gpu, &config)
        .unwrap()
        .read_current()
        .unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_roles_alternate_each_step() {
    let Some(gpu) = gpu() else { return };
    let config = config(16, 16, EdgePolicy::Wrap);
    let mut simulation =
        LifeSimulation::from_cells(&gpu, &config, &pattern(config.grid, &[])).unwrap();

    let first_input = simulation.pair().binding_index(Role::Input);
    for generation in 1..=4u64 {
        simulation.step();
        let input = simulation.pair().binding_index(Role::Input);
        let output = simulation.pair().binding_index(Role::Output);
        assert_ne!(input, output);
        assert_eq!(input == first_input, generation % 2 == 0);
        assert_eq!(simulation.generation(), generation);
    }
}

#[test]
fn test_broken_kernel_source_is_fatal() {
    let Some(gpu) = gpu() else { return };
    let dir = std::env::temp_dir().join(format!("gpu_life_broken_shaders_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join(ShaderKind::Transition.file_name()),
        "@compute @workgroup_size(8, 8, 1)\nfn main() { let x: i32 = undefined_value; }\n",
    )
    .unwrap();

    let mut config = config(16, 16, EdgePolicy::Wrap);
    config.shader_dir = Some(dir.clone());
    let err = failure(LifeSimulation::new(&gpu, &config));
    std::fs::remove_dir_all(&dir).unwrap();

    assert!(matches!(err, LifeError::ShaderCompile { .. }), "{err}");
    assert_eq!(err.exit_code(), SHADER_FAILURE_EXIT_CODE);
}

#[test]
fn test_present_pipeline_builds_for_common_formats() {
    let Some(gpu) = gpu() else { return };
    let source = ShaderSource::embedded(ShaderKind::Present)
        .specialize(GridExtent::new(1504, 1024), EdgePolicy::Wrap);

    for format in [
        wgpu::TextureFormat::Bgra8Unorm,
        wgpu::TextureFormat::Rgba8Unorm,
    ] {
        if let Err(err) = create_present_pipeline(gpu.device(), &source, format) {
            panic!("{format:?}: {err}");
        }
    }
}

#[test]
fn test_pattern_of_wrong_size_is_rejected() {
    let Some(gpu) = gpu() else { return };
    let config = config(16, 16, EdgePolicy::Wrap);

    let err = failure(LifeSimulation::from_cells(&gpu, &config, &[1, 0, 1]));
    assert!(matches!(
        err,
        LifeError::PatternSize {
            expected: 256,
            actual: 3
        }
    ));
}

#[test]
fn test_empty_grid_is_a_config_error() {
    let Some(gpu) = gpu() else { return };
    let config = config(0, 16, EdgePolicy::Wrap);

    let err = failure(LifeSimulation::new(&gpu, &config));
    assert!(matches!(
        err,
        LifeError::Config(ConfigError::EmptyGrid(0, 16))
    ));
    assert_eq!(err.exit_code(), STARTUP_FAILURE_EXIT_CODE);
}
