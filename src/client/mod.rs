//! Stream client: connection lifecycle, read loop, and latest-value access
//!
//! One client per device stream. The motion and video streams differ only in
//! framing strategy, decoder, and output type, so both are instances of the
//! same `StreamClient<T>` with a different pipeline wired in.

mod cancel;
mod latest;
mod stats;

pub use cancel::CancelToken;
pub use latest::{LatestCache, SampleHandler};
pub use stats::{ClientStats, StatsSnapshot};

use crate::buffer::StreamBuffer;
use crate::config::Config;
use crate::decode::{Decoder, MotionDecoder, VideoDecoder};
use crate::error::{Error, Result};
use crate::sync::{FixedPacketSync, FrameSync, GravityWindow, Plausibility, ScanSync, SignatureSync};
use crate::transport::{Connector, TcpConnector, Transport};
use crate::types::{ConnectionState, MotionSample, VideoFrame};

use parking_lot::Mutex;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Consumer-supplied state-change handler (runs on the worker thread)
pub type StateHandler = Box<dyn Fn(ConnectionState) + Send + Sync>;

/// Bounded wait for the worker to acknowledge a stop request. Must exceed
/// the read timeout plus one reconnect delay slice.
const STOP_JOIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Socket read chunk for the motion stream (samples are tiny)
const MOTION_READ_CHUNK: usize = 4096;

/// Socket read chunk for the video stream (packets are ~190 KB)
const VIDEO_READ_CHUNK: usize = 65_536;

/// Callbacks registered at construction
///
/// Both run on the worker thread and must not block; panics are caught and
/// logged, never propagated into the read loop.
pub struct Handlers<T> {
    pub on_sample: Option<SampleHandler<T>>,
    pub on_state_change: Option<StateHandler>,
}

// Not derived: that would require T: Default
impl<T> Default for Handlers<T> {
    fn default() -> Self {
        Self {
            on_sample: None,
            on_state_change: None,
        }
    }
}

/// Worker limits and timing for one pipeline
pub struct PipelineConfig {
    /// Accumulator size limit before lossy resync
    pub buffer_cap: usize,
    /// Trailing bytes kept on resync
    pub buffer_tail: usize,
    /// Socket read chunk size
    pub read_chunk: usize,
    /// Fixed delay between reconnect attempts
    pub reconnect_delay: Duration,
    /// Reconnect after transient failures
    pub auto_reconnect: bool,
}

/// State shared between the worker thread and API callers
struct Shared<T> {
    name: &'static str,
    cache: LatestCache<T>,
    state: Mutex<ConnectionState>,
    on_state_change: Option<StateHandler>,
    stats: ClientStats,
}

impl<T: Clone> Shared<T> {
    /// Transition the connection state; duplicate transitions are no-ops
    fn set_state(&self, next: ConnectionState) {
        {
            let mut state = self.state.lock();
            if *state == next {
                return;
            }
            *state = next;
        }

        log::info!("{}: connection state: {}", self.name, next);
        if let Some(ref callback) = self.on_state_change {
            if catch_unwind(AssertUnwindSafe(|| callback(next))).is_err() {
                log::error!("{}: state callback panicked (ignored)", self.name);
            }
        }
    }
}

/// Everything the worker thread owns exclusively
struct Worker<T> {
    connector: Box<dyn Connector>,
    sync: Box<dyn FrameSync>,
    decoder: Box<dyn Decoder<Output = T>>,
    buffer: StreamBuffer,
    read_chunk: usize,
    reconnect_delay: Duration,
    auto_reconnect: bool,
    shared: Arc<Shared<T>>,
    cancel: CancelToken,
}

impl<T: Clone> Worker<T> {
    /// Main loop: ensure connected, read with timeout, append, drain frames
    fn run(mut self) {
        log::info!(
            "{}: worker started ({})",
            self.shared.name,
            self.connector.endpoint()
        );

        let mut transport: Option<Box<dyn Transport>> = None;
        let mut chunk = vec![0u8; self.read_chunk];

        while !self.cancel.is_cancelled() {
            if transport.is_none() {
                self.shared.set_state(ConnectionState::Connecting);
                match self.connector.connect() {
                    Ok(t) => {
                        self.shared.set_state(ConnectionState::Connected);
                        transport = Some(t);
                    }
                    Err(e) => {
                        log::warn!(
                            "{}: connect to {} failed: {}",
                            self.shared.name,
                            self.connector.endpoint(),
                            e
                        );
                        self.shared.stats.connect_failures.fetch_add(1, Ordering::Relaxed);
                        self.shared.set_state(ConnectionState::Error);
                        if !self.auto_reconnect || !e.is_transient() {
                            log::info!("{}: not retrying, giving up", self.shared.name);
                            break;
                        }
                        self.cancel.sleep(self.reconnect_delay);
                    }
                }
                continue;
            }

            let Some(stream) = transport.as_mut() else {
                continue;
            };
            match stream.read(&mut chunk) {
                Ok(0) => {
                    // Read timeout with no data; loop re-checks the stop flag
                }
                Ok(n) => {
                    self.shared
                        .stats
                        .bytes_received
                        .fetch_add(n as u64, Ordering::Relaxed);
                    self.buffer.append(&chunk[..n]);
                    self.drain_frames();
                    self.shared
                        .stats
                        .resyncs
                        .store(self.buffer.resync_count(), Ordering::Relaxed);
                }
                Err(e) => {
                    log::warn!("{}: stream error: {}", self.shared.name, e);
                    self.shared.stats.disconnects.fetch_add(1, Ordering::Relaxed);
                    transport = None;
                    self.buffer.clear();
                    self.shared.set_state(ConnectionState::Disconnected);
                    // Reconnect is attempted immediately; the fixed delay
                    // only applies after failed connect attempts
                }
            }
        }

        // Close the socket before reporting the terminal state
        drop(transport);
        self.shared.set_state(ConnectionState::Disconnected);
        log::info!("{}: worker exiting", self.shared.name);
    }

    /// Extract every decodable frame currently in the buffer, in order
    fn drain_frames(&mut self) {
        while !self.cancel.is_cancelled() {
            let span = match self.sync.find_frame(self.buffer.as_slice()) {
                Some(span) => span,
                None => break,
            };

            let decoded = {
                let frame = &self.buffer.as_slice()[span.start..span.end()];
                self.decoder.decode(frame)
            };
            // Consumed either way: a rejected frame is noise to skip, and
            // leaving it in place would find the same span forever
            self.buffer.consume(span.end());

            match decoded {
                Some(sample) => {
                    self.shared.stats.samples_decoded.fetch_add(1, Ordering::Relaxed);
                    self.shared.cache.update(sample);
                }
                None => {
                    log::debug!(
                        "{}: synchronizer frame rejected by decoder",
                        self.shared.name
                    );
                }
            }
        }
    }
}

/// Resilient streaming client for one device stream
///
/// Owns a single worker thread running the connect/read/decode loop and
/// exposes the latest decoded sample through a non-blocking accessor.
/// `stop()` is terminal: a stopped client cannot be restarted.
pub struct StreamClient<T> {
    shared: Arc<Shared<T>>,
    cancel: CancelToken,
    worker: Option<(thread::JoinHandle<()>, crossbeam_channel::Receiver<()>)>,
    pipeline: Option<Worker<T>>,
}

impl<T: Clone + Send + 'static> StreamClient<T> {
    /// Assemble a client from a custom pipeline
    ///
    /// The `motion`/`video` constructors cover the known device streams;
    /// this is the seam for alternate devices and for tests, which plug in
    /// a scripted connector.
    pub fn from_parts(
        name: &'static str,
        connector: Box<dyn Connector>,
        sync: Box<dyn FrameSync>,
        decoder: Box<dyn Decoder<Output = T>>,
        pipeline: PipelineConfig,
        handlers: Handlers<T>,
    ) -> Self {
        let shared = Arc::new(Shared {
            name,
            cache: LatestCache::new(name, handlers.on_sample),
            state: Mutex::new(ConnectionState::Disconnected),
            on_state_change: handlers.on_state_change,
            stats: ClientStats::default(),
        });
        let cancel = CancelToken::new();

        let worker = Worker {
            connector,
            sync,
            decoder,
            buffer: StreamBuffer::new(pipeline.buffer_cap, pipeline.buffer_tail),
            read_chunk: pipeline.read_chunk,
            reconnect_delay: pipeline.reconnect_delay,
            auto_reconnect: pipeline.auto_reconnect,
            shared: Arc::clone(&shared),
            cancel: cancel.clone(),
        };

        Self {
            shared,
            cancel,
            worker: None,
            pipeline: Some(worker),
        }
    }

    /// Start the worker thread. Idempotent while running; a stopped client
    /// cannot be started again.
    pub fn start(&mut self) -> Result<()> {
        if self.worker.is_some() {
            log::warn!("{}: client already running", self.shared.name);
            return Ok(());
        }
        let worker = self.pipeline.take().ok_or_else(|| {
            Error::Other(format!("{} client cannot be restarted after stop", self.shared.name))
        })?;

        let (done_tx, done_rx) = crossbeam_channel::bounded::<()>(0);
        let handle = thread::Builder::new()
            .name(format!("netra-{}", self.shared.name))
            .spawn(move || {
                worker.run();
                drop(done_tx);
            })
            .map_err(|e| Error::Other(format!("failed to spawn worker: {}", e)))?;

        self.worker = Some((handle, done_rx));
        Ok(())
    }

    /// Request shutdown and wait (bounded) for the worker to exit, closing
    /// the socket. Safe to call from any thread context and idempotent.
    pub fn stop(&mut self) {
        self.cancel.cancel();
        if let Some((handle, done)) = self.worker.take() {
            match done.recv_timeout(STOP_JOIN_TIMEOUT) {
                // Sender dropped = worker finished its loop
                Ok(()) | Err(crossbeam_channel::RecvTimeoutError::Disconnected) => {
                    let _ = handle.join();
                }
                Err(crossbeam_channel::RecvTimeoutError::Timeout) => {
                    log::error!(
                        "{}: worker did not exit within {:?}, detaching",
                        self.shared.name,
                        STOP_JOIN_TIMEOUT
                    );
                }
            }
        }
    }

    /// Latest decoded sample, or None before the first decode. Never blocks
    /// the worker.
    pub fn get_latest(&self) -> Option<T> {
        self.shared.cache.get()
    }

    /// Current connection state
    pub fn state(&self) -> ConnectionState {
        *self.shared.state.lock()
    }

    /// Whether the worker thread is running
    pub fn is_running(&self) -> bool {
        self.worker
            .as_ref()
            .map(|(handle, _)| !handle.is_finished())
            .unwrap_or(false)
    }

    /// Counter snapshot
    pub fn stats(&self) -> StatsSnapshot {
        self.shared.stats.snapshot()
    }

    /// Cancellation token, for wiring into external shutdown paths
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }
}

impl<T> Drop for StreamClient<T> {
    fn drop(&mut self) {
        self.cancel.cancel();
        if let Some((handle, done)) = self.worker.take() {
            let _ = done.recv_timeout(STOP_JOIN_TIMEOUT);
            let _ = handle.join();
        }
    }
}

impl StreamClient<MotionSample> {
    /// Client for the motion telemetry stream
    ///
    /// Uses the content scan as the primary synchronizer: the declared
    /// envelope markers are not reliable enough to frame on.
    pub fn motion(config: &Config, handlers: Handlers<MotionSample>) -> Result<Self> {
        config.validate()?;
        let predicate: Arc<dyn Plausibility> =
            Arc::new(GravityWindow::from_config(&config.motion));

        let sync = Box::new(ScanSync::new(
            Arc::clone(&predicate),
            config.motion.fast_path_offsets.clone(),
        ));
        let decoder = Box::new(MotionDecoder::new(
            predicate,
            config.motion.fast_path_offsets.clone(),
        ));

        Ok(Self::from_parts(
            "motion",
            Box::new(motion_connector(config)),
            sync,
            decoder,
            PipelineConfig {
                buffer_cap: config.motion.buffer_cap,
                buffer_tail: config.motion.resync_tail,
                read_chunk: MOTION_READ_CHUNK,
                reconnect_delay: config.network.reconnect_delay(),
                auto_reconnect: config.network.auto_reconnect,
            },
            handlers,
        ))
    }

    /// Motion client framed on the configured header/footer signatures
    ///
    /// For firmware revisions where the markers have been verified; the
    /// decoder still scans within each framed message, so a shifted payload
    /// degrades to the content heuristic instead of failing.
    pub fn motion_signature(
        config: &Config,
        handlers: Handlers<MotionSample>,
    ) -> Result<Self> {
        config.validate()?;
        let predicate: Arc<dyn Plausibility> =
            Arc::new(GravityWindow::from_config(&config.motion));

        let sync = Box::new(SignatureSync::new(
            config.motion_headers()?,
            config.motion_footer()?,
        )?);
        let decoder = Box::new(MotionDecoder::new(
            predicate,
            config.motion.fast_path_offsets.clone(),
        ));

        Ok(Self::from_parts(
            "motion",
            Box::new(motion_connector(config)),
            sync,
            decoder,
            PipelineConfig {
                buffer_cap: config.motion.buffer_cap,
                buffer_tail: config.motion.resync_tail,
                read_chunk: MOTION_READ_CHUNK,
                reconnect_delay: config.network.reconnect_delay(),
                auto_reconnect: config.network.auto_reconnect,
            },
            handlers,
        ))
    }
}

impl StreamClient<VideoFrame> {
    /// Client for the fixed-packet video stream
    ///
    /// Buffer cap is two packets with a one-packet tail: the drain loop
    /// extracts whole packets each read, so the cap only bites if decoding
    /// stalls, and the tail then preserves an intact packet boundary.
    pub fn video(config: &Config, handlers: Handlers<VideoFrame>) -> Result<Self> {
        config.validate()?;
        let packet = config.video.packet_size;

        Ok(Self::from_parts(
            "video",
            Box::new(TcpConnector::new(
                &config.network.host,
                config.network.video_port,
                config.network.connect_timeout(),
                config.network.read_timeout(),
            )),
            Box::new(FixedPacketSync::new(packet)),
            Box::new(VideoDecoder::new(&config.video)),
            PipelineConfig {
                buffer_cap: packet * 2,
                buffer_tail: packet,
                read_chunk: VIDEO_READ_CHUNK,
                reconnect_delay: config.network.reconnect_delay(),
                auto_reconnect: config.network.auto_reconnect,
            },
            handlers,
        ))
    }
}

fn motion_connector(config: &Config) -> TcpConnector {
    TcpConnector::new(
        &config.network.host,
        config.network.motion_port,
        config.network.connect_timeout(),
        config.network.read_timeout(),
    )
}
