use criterion::{black_box, criterion_group, criterion_main, Criterion};

use vdagstream::chunkgen::ChunkGenerator;
use vdagstream::coord::ChunkCoord;
use vdagstream::graph::{ExecContext, GraphExecutor, NodeRegistry};
use vdagstream::region::cache::{RegionCache, RegionOutputs};
use vdagstream::svdag::{SvdagBuilder, VoxelGrid};

fn sphere_grid(size: u32, radius: f32) -> VoxelGrid {
    let mut grid = VoxelGrid::empty();
    let center = size as f32 / 2.0;
    for z in 0..size {
        for y in 0..size {
            for x in 0..size {
                let dx = x as f32 - center;
                let dy = y as f32 - center;
                let dz = z as f32 - center;
                if (dx * dx + dy * dy + dz * dz).sqrt() <= radius {
                    grid.set(x, y, z, 1);
                }
            }
        }
    }
    grid
}

fn bench_svdag_build_sphere(c: &mut Criterion) {
    let grid = sphere_grid(32, 14.0);
    c.bench_function("svdag_build_sphere_32", |b| {
        b.iter(|| SvdagBuilder::new().build(black_box(&grid)));
    });
}

fn bench_svdag_build_solid(c: &mut Criterion) {
    let grid = VoxelGrid::filled(7);
    c.bench_function("svdag_build_solid_32", |b| {
        b.iter(|| SvdagBuilder::new().build(black_box(&grid)));
    });
}

fn bench_chunk_generate(c: &mut Criterion) {
    let size = 512u32;
    let count = (size * size) as usize;
    let region = RegionOutputs {
        heightmap: vec![4.0; count],
        moisture: vec![0.5; count],
        temperature: vec![0.5; count],
        biome_ids: vec![1.0; count],
        size,
    };

    c.bench_function("chunk_generate", |b| {
        b.iter(|| ChunkGenerator::generate(black_box(ChunkCoord::new(0, 0, 0)), (0, 0), &region));
    });
}

fn bench_graph_execute(c: &mut Criterion) {
    use std::collections::HashMap;
    use vdagstream::graph::{Connection, GraphDef, NodeDef};

    let mut noise_params = HashMap::new();
    noise_params.insert("frequency".to_string(), 0.02);
    noise_params.insert("octaves".to_string(), 4.0);

    let graph = GraphDef {
        nodes: vec![
            NodeDef { id: "n".to_string(), node_type: "PerlinNoise".to_string(), params: noise_params, is_output: false },
            NodeDef { id: "h".to_string(), node_type: "HeightmapOutput".to_string(), params: HashMap::new(), is_output: true },
        ],
        connections: vec![Connection {
            from: "n".to_string(),
            from_output: "value".to_string(),
            to: "h".to_string(),
            to_input: "value".to_string(),
        }],
        outputs: None,
    };

    let ctx = ExecContext { width: 512, height: 512, origin_x: 0.0, origin_z: 0.0, cell_size: 1.0, seed: 7 };

    c.bench_function("graph_execute_noise_region", |b| {
        b.iter_batched(
            || GraphExecutor::new(NodeRegistry::with_builtins()),
            |mut executor| {
                executor.execute(black_box(&graph), black_box(&ctx)).unwrap();
            },
            criterion::BatchSize::SmallInput,
        );
    });
}

fn bench_region_cache_hit(c: &mut Criterion) {
    use vdagstream::core::config::RegionCacheConfig;
    use std::collections::HashMap;
    use vdagstream::graph::{GraphDef, NodeDef};

    let mut params = HashMap::new();
    params.insert("value".to_string(), 5.0);
    let graph = GraphDef {
        nodes: vec![NodeDef { id: "h".to_string(), node_type: "ConstantOutput".to_string(), params, is_output: false }],
        connections: vec![],
        outputs: Some(HashMap::from([("heightmap".to_string(), "h".to_string())])),
    };

    let mut cache = RegionCache::new(RegionCacheConfig::default());
    let mut executor = GraphExecutor::with_builtins();
    cache.get(&mut executor, 0, 0, &graph, 1).unwrap();

    c.bench_function("region_cache_hit", |b| {
        b.iter(|| cache.get(&mut executor, black_box(0), black_box(0), &graph, 1).unwrap());
    });
}

criterion_group!(
    benches,
    bench_svdag_build_sphere,
    bench_svdag_build_solid,
    bench_chunk_generate,
    bench_graph_execute,
    bench_region_cache_hit
);
criterion_main!(benches);
