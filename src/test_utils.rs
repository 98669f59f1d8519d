use std::path::{Path, PathBuf};

use crate::record::{ExperimentRecord, SchedulePolicy, ScheduleRecord};

/// Scratch directory under the system temp dir, removed on drop.
pub struct TestDir {
    path: PathBuf,
}

impl TestDir {
    pub fn new<P>(name: P) -> Self
    where
        P: AsRef<Path>,
    {
        let path = std::env::temp_dir()
            .join(format!("kmeans_perf_{}", std::process::id()))
            .join(name);
        if path.exists() {
            std::fs::remove_dir_all(&path).unwrap();
        }
        std::fs::create_dir_all(&path).unwrap();
        Self { path }
    }
}

impl Drop for TestDir {
    fn drop(&mut self) {
        std::fs::remove_dir_all(&self.path).unwrap();
    }
}

impl AsRef<Path> for TestDir {
    fn as_ref(&self) -> &Path {
        self.path.as_ref()
    }
}

pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

pub fn experiment(points: u64, clusters: u32, threads: u32, time: f64) -> ExperimentRecord {
    ExperimentRecord {
        point_count: points,
        cluster_count: clusters,
        thread_count: threads,
        elapsed_time: time,
        is_serial_marker: false,
    }
}

pub fn schedule(policy: SchedulePolicy, chunk_size: u32, seconds: f64) -> ScheduleRecord {
    ScheduleRecord {
        point_count: 1_000_000,
        cluster_count: 16,
        schedule_policy: policy,
        thread_count: 32,
        chunk_size,
        elapsed_time_ms: seconds * 1000.0,
        elapsed_time_s: seconds,
        iterations: None,
        sse: None,
        silhouette: None,
    }
}

/// Two dataset sizes swept over 1..8 threads, header padded the way the driver writes it.
pub const SAMPLE_CSV: &str = "n_pontos, n_centroids, n_threads, tempo, serial_omp
10000,4,1,120.0,True
10000,4,2,65.0,False
10000,4,4,35.0,False
10000,4,8,22.0,False
100000,8,1,1200.0,True
100000,8,2,610.0,False
100000,8,4,320.0,False
100000,8,8,180.0,False
";

/// Static and dynamic sweeps over chunk sizes 0, 10 and 100 at 32 threads.
pub const SAMPLE_LOG: &str = "=== Iniciando testes de schedule ===
TESTANDO: 1000000 pontos, 16 clusters, Schedule: static, Threads: 32 Chunk Sizes: 0
OpenMP habilitado com 32 threads configuradas.
Threads efetivamente utilizadas: 32
K-means 1D (naive)
N=1000000 K=16 max_iter=50 eps=0.0001
Iterações: 21 | SSE final: 81234.567890 | Tempo: 132.0 ms
Tempo medido com omp_get_wtime(): 0.132000 segundos
Coeficiente silhouette médio: 0.701234

TESTANDO: 1000000 pontos, 16 clusters, Schedule: static, Threads: 32 Chunk Sizes: 10
OpenMP habilitado com 32 threads configuradas.
Iterações: 21 | SSE final: 81234.567890 | Tempo: 129.0 ms
Tempo medido com omp_get_wtime(): 0.129000 segundos

TESTANDO: 1000000 pontos, 16 clusters, Schedule: static, Threads: 32 Chunk Sizes: 100
Iterações: 21 | SSE final: 81234.567890 | Tempo: 135.0 ms
Tempo medido com omp_get_wtime(): 0.135000 segundos

TESTANDO: 1000000 pontos, 16 clusters, Schedule: dynamic, Threads: 32 Chunk Sizes: 0
Iterações: 21 | SSE final: 81234.567890 | Tempo: 141.0 ms
Tempo medido com omp_get_wtime(): 0.141000 segundos

TESTANDO: 1000000 pontos, 16 clusters, Schedule: dynamic, Threads: 32 Chunk Sizes: 10
Iterações: 21 | SSE final: 81234.567890 | Tempo: 125.0 ms
Tempo medido com omp_get_wtime(): 0.125000 segundos

TESTANDO: 1000000 pontos, 16 clusters, Schedule: dynamic, Threads: 32 Chunk Sizes: 100
Iterações: 21 | SSE final: 81234.567890 | Tempo: 130.0 ms
Tempo medido com omp_get_wtime(): 0.130000 segundos
";
