//! Shared test utilities for the deploy integration suites.
//!
//! Import via `mod common;` from any test file.

#![allow(dead_code)]

use parking_lot::Mutex;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use strata_concurrency::LocalLockTable;
use strata_core::{
    ChunkTransport, CopyDatabaseChunk, ExportRequest, NodeId, SnapshotError, SnapshotSource,
    TransportError,
};
use strata_durability::DeployConfig;
use strata_engine::DeployContext;
use tempfile::TempDir;

// ============================================================================
// Fake database
// ============================================================================

/// How the fake exporter behaves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportMode {
    /// Write the configured contents
    Succeed,
    /// Fail after freezing
    Fail,
    /// Panic after freezing
    Panic,
}

/// In-memory database whose export writes fixed bytes
pub struct FakeDatabase {
    name: String,
    contents: Vec<u8>,
    mode: ExportMode,
    hold: Option<Arc<Barrier>>,
    pub freezes: AtomicUsize,
    pub releases: AtomicUsize,
    pub exports: AtomicUsize,
}

impl FakeDatabase {
    pub fn new(name: &str, contents: Vec<u8>) -> Self {
        FakeDatabase {
            name: name.to_string(),
            contents,
            mode: ExportMode::Succeed,
            hold: None,
            freezes: AtomicUsize::new(0),
            releases: AtomicUsize::new(0),
            exports: AtomicUsize::new(0),
        }
    }

    pub fn with_mode(mut self, mode: ExportMode) -> Self {
        self.mode = mode;
        self
    }

    /// Park inside export: wait on `hold` once on entry and once to resume
    pub fn with_hold(mut self, hold: Arc<Barrier>) -> Self {
        self.hold = Some(hold);
        self
    }

    pub fn contents(&self) -> &[u8] {
        &self.contents
    }

    pub fn freezes(&self) -> usize {
        self.freezes.load(Ordering::SeqCst)
    }

    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }
}

impl SnapshotSource for FakeDatabase {
    fn name(&self) -> &str {
        &self.name
    }

    fn freeze(&self) -> Result<(), SnapshotError> {
        self.freezes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn release(&self) {
        self.releases.fetch_add(1, Ordering::SeqCst);
    }

    fn export(&self, request: &ExportRequest<'_>) -> Result<(), SnapshotError> {
        self.exports.fetch_add(1, Ordering::SeqCst);
        // Leave scratch files behind, as a real exporter would
        std::fs::write(request.workspace.join("export.tmp"), b"scratch")?;
        if let Some(hold) = &self.hold {
            hold.wait();
            hold.wait();
            std::fs::write(request.workspace.join(format!("{}.tmp", self.name)), b"late")?;
        }
        match self.mode {
            ExportMode::Succeed => {
                std::fs::write(request.target, &self.contents)?;
                Ok(())
            }
            ExportMode::Fail => Err(SnapshotError::Export("out of disk space".to_string())),
            ExportMode::Panic => panic!("exporter crashed"),
        }
    }
}

// ============================================================================
// Recording transport
// ============================================================================

/// Transport that records every chunk and answers from a script
///
/// Once the script is exhausted every chunk is acknowledged. Acknowledged
/// chunks are appended to `received`, the way a destination applies them.
#[derive(Default)]
pub struct RecordingTransport {
    script: Mutex<VecDeque<Result<bool, TransportError>>>,
    pub sent: Mutex<Vec<(NodeId, Vec<u8>)>>,
    pub received: Mutex<Vec<u8>>,
    gate: Option<Arc<Barrier>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_script(script: Vec<Result<bool, TransportError>>) -> Self {
        RecordingTransport {
            script: Mutex::new(script.into()),
            ..Default::default()
        }
    }

    /// Block the first chunk on `gate` so an attempt stays in flight
    pub fn gated(gate: Arc<Barrier>) -> Self {
        RecordingTransport {
            gate: Some(gate),
            ..Default::default()
        }
    }

    pub fn sizes(&self) -> Vec<usize> {
        self.sent.lock().iter().map(|(_, bytes)| bytes.len()).collect()
    }

    pub fn received(&self) -> Vec<u8> {
        self.received.lock().clone()
    }
}

impl ChunkTransport for RecordingTransport {
    fn apply_chunk(
        &self,
        destination: &NodeId,
        chunk: &CopyDatabaseChunk,
    ) -> Result<bool, TransportError> {
        let first = {
            let mut sent = self.sent.lock();
            sent.push((destination.clone(), chunk.bytes().to_vec()));
            sent.len() == 1
        };
        if first {
            if let Some(gate) = &self.gate {
                gate.wait();
            }
        }
        let answer = self.script.lock().pop_front().unwrap_or(Ok(true));
        if let Ok(true) = answer {
            self.received.lock().extend_from_slice(chunk.bytes());
        }
        answer
    }
}

// ============================================================================
// Context helpers
// ============================================================================

/// A deploy context rooted in a fresh temp directory
pub struct TestNode {
    pub dir: TempDir,
    pub locks: Arc<LocalLockTable>,
    pub transport: Arc<RecordingTransport>,
    pub ctx: DeployContext,
}

impl TestNode {
    pub fn new(transport: RecordingTransport) -> Self {
        Self::with_config(transport, |config| config)
    }

    pub fn with_config(
        transport: RecordingTransport,
        configure: impl FnOnce(DeployConfig) -> DeployConfig,
    ) -> Self {
        let dir = TempDir::new().unwrap();
        let locks = Arc::new(LocalLockTable::new());
        let transport = Arc::new(transport);
        let config = configure(DeployConfig::default().with_working_root(dir.path()));
        let ctx = DeployContext::new(
            config,
            NodeId::new("node-a"),
            locks.clone(),
            transport.clone(),
        )
        .unwrap();
        TestNode {
            dir,
            locks,
            transport,
            ctx,
        }
    }
}

/// Deterministic pseudo-random bytes
pub fn random_bytes(len: usize, seed: u64) -> Vec<u8> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    let mut bytes = vec![0u8; len];
    rng.fill(bytes.as_mut_slice());
    bytes
}
