use std::collections::VecDeque;
use std::fs::File;
use std::io::Cursor;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, TryRecvError};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use cpal::Sample;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use symphonia::core::audio::{SampleBuffer, SignalSpec};
use symphonia::core::codecs::{CODEC_TYPE_NULL, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader, SeekMode, SeekTo};
use symphonia::core::io::{MediaSource as SymphoniaSource, MediaSourceStream};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::units::Time;

use crate::events::types::AppEvent;
use crate::player::commands::{PlaybackStatus, PlayerCommand};
use crate::player::engine::{EngineState, MediaSource};

type EngineResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

const POSITION_UPDATE_INTERVAL: Duration = Duration::from_millis(100);

struct AudioOutput {
    ring_buffer: Arc<Mutex<VecDeque<f32>>>,
    spec: SignalSpec,
    _stream: cpal::Stream,
    paused: Arc<AtomicBool>,
}

impl AudioOutput {
    fn new(spec: SignalSpec, state: Arc<EngineState>) -> EngineResult<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or("No output device available")?;

        let config = cpal::StreamConfig {
            channels: spec.channels.count() as u16,
            sample_rate: cpal::SampleRate(spec.rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let buffer_capacity = spec.rate as usize * spec.channels.count() * 5;
        let ring_buffer = Arc::new(Mutex::new(VecDeque::with_capacity(buffer_capacity)));
        let ring_buffer_clone = ring_buffer.clone();
        // Output starts silent; the engine unpauses it once playback is requested.
        let paused = Arc::new(AtomicBool::new(true));
        let paused_clone = paused.clone();

        let stream = device.build_output_stream(
            &config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                let Ok(mut buffer) = ring_buffer_clone.lock() else {
                    data.fill(Sample::EQUILIBRIUM);
                    return;
                };
                let volume = state.volume();
                for sample in data.iter_mut() {
                    if paused_clone.load(Ordering::Relaxed) {
                        *sample = Sample::EQUILIBRIUM;
                    } else {
                        *sample = buffer.pop_front().unwrap_or(Sample::EQUILIBRIUM) * volume;
                    }
                }
            },
            |err| tracing::warn!("audio stream error: {err}"),
            None,
        )?;

        stream.play()?;

        Ok(AudioOutput {
            ring_buffer,
            spec,
            _stream: stream,
            paused,
        })
    }

    fn write_samples(&self, samples: &[f32]) {
        if let Ok(mut buffer) = self.ring_buffer.lock() {
            buffer.extend(samples.iter().copied());
        }
    }

    fn buffer_len(&self) -> usize {
        self.ring_buffer.lock().map(|b| b.len()).unwrap_or(0)
    }

    fn set_paused(&self, paused: bool) {
        self.paused.store(paused, Ordering::Relaxed);
    }

    fn clear_buffer(&self) {
        if let Ok(mut buffer) = self.ring_buffer.lock() {
            buffer.clear();
        }
    }

    fn channels(&self) -> usize {
        self.spec.channels.count()
    }
}

/// Where the decoder stands relative to the end of the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tail {
    Decoding,
    /// Decoder exhausted; the output buffer is still playing out.
    Draining,
    Ended,
}

impl Tail {
    /// Returns true exactly once: when a drain completes with nothing left buffered.
    fn poll(&mut self, buffered_samples: usize) -> bool {
        if *self == Tail::Draining && buffered_samples == 0 {
            *self = Tail::Ended;
            return true;
        }
        false
    }
}

struct PlaybackContext {
    format: Box<dyn FormatReader>,
    decoder: Box<dyn symphonia::core::codecs::Decoder>,
    track_id: u32,
    audio_output: AudioOutput,
    sample_buf: SampleBuffer<f32>,
    total_frames_decoded: u64,
    total_duration: Option<Duration>,
    tail: Tail,
}

impl PlaybackContext {
    /// Position of the sample currently leaving the speakers, not the decoder head.
    fn played_position(&self) -> Duration {
        let buffered_frames =
            (self.audio_output.buffer_len() / self.audio_output.channels()) as u64;
        let frames = self.total_frames_decoded.saturating_sub(buffered_frames);
        Duration::from_secs_f64(frames as f64 / self.audio_output.spec.rate as f64)
    }

    fn seek(&mut self, position: Duration) -> EngineResult<Duration> {
        let position = match self.total_duration {
            Some(total) => position.min(total),
            None => position,
        };

        self.audio_output.clear_buffer();

        let seek_to = SeekTo::Time {
            time: Time::from(position.as_secs_f64()),
            track_id: Some(self.track_id),
        };
        self.format.seek(SeekMode::Accurate, seek_to)?;
        self.decoder.reset();
        self.total_frames_decoded =
            (position.as_secs_f64() * self.audio_output.spec.rate as f64) as u64;
        self.tail = Tail::Decoding;

        Ok(position)
    }
}

/// Runs the decoder loop. Every state change is mirrored into `state` and
/// announced on `event_tx`; the UI thread never touches decoder internals.
pub fn spawn(
    cmd_rx: mpsc::Receiver<PlayerCommand>,
    state: Arc<EngineState>,
    event_tx: mpsc::Sender<AppEvent>,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        let mut ctx: Option<PlaybackContext> = None;
        let mut is_paused = true;
        let mut last_position_update = Instant::now();

        let set_status = |status: PlaybackStatus| {
            state.set_status(status);
            let _ = event_tx.send(AppEvent::StatusChanged(status));
        };

        loop {
            match cmd_rx.try_recv() {
                Ok(cmd) => match cmd {
                    PlayerCommand::Load(source) => {
                        ctx = None;
                        is_paused = true;
                        state.set_position(Duration::ZERO);
                        state.set_duration(None);
                        set_status(PlaybackStatus::Unknown);

                        tracing::info!(source = ?source, "loading media");

                        match load_media(&source, state.clone()) {
                            Ok(new_ctx) => {
                                state.set_duration(new_ctx.total_duration);
                                ctx = Some(new_ctx);
                                set_status(PlaybackStatus::Ready);

                                // Autoplay once ready.
                                if let Some(ref c) = ctx {
                                    c.audio_output.set_paused(false);
                                    is_paused = false;
                                    set_status(PlaybackStatus::Playing);
                                }
                            }
                            Err(e) => {
                                tracing::warn!("failed to load {}: {e}", source.display_name());
                                set_status(PlaybackStatus::Halted);
                                let _ = event_tx.send(AppEvent::LoadFailed(e.to_string()));
                            }
                        }
                    }

                    PlayerCommand::Play => {
                        if let Some(ref mut c) = ctx {
                            if c.tail == Tail::Ended {
                                if let Err(e) = c.seek(Duration::ZERO) {
                                    tracing::warn!("rewind failed: {e}");
                                }
                                state.set_position(Duration::ZERO);
                            }
                            c.audio_output.set_paused(false);
                            is_paused = false;
                            set_status(PlaybackStatus::Playing);
                        }
                    }

                    PlayerCommand::Pause => {
                        if let Some(ref c) = ctx {
                            c.audio_output.set_paused(true);
                            is_paused = true;
                            set_status(PlaybackStatus::Paused);
                        }
                    }

                    PlayerCommand::Stop => {
                        if let Some(ref mut c) = ctx {
                            c.audio_output.set_paused(true);
                            is_paused = true;
                            if let Err(e) = c.seek(Duration::ZERO) {
                                tracing::warn!("rewind on stop failed: {e}");
                            }
                            state.set_position(Duration::ZERO);
                            set_status(PlaybackStatus::Stopped);
                            let _ = event_tx.send(AppEvent::CurrentTimeChanged(Duration::ZERO));
                        }
                    }

                    PlayerCommand::Seek(position) => {
                        if let Some(ref mut c) = ctx {
                            match c.seek(position) {
                                Ok(position) => {
                                    state.set_position(position);
                                    let _ = event_tx.send(AppEvent::CurrentTimeChanged(position));
                                }
                                Err(e) => {
                                    let _ = event_tx
                                        .send(AppEvent::EngineError(format!("Seek error: {}", e)));
                                }
                            }
                        }
                    }

                    PlayerCommand::SetVolume(volume) => {
                        state.set_volume(volume);
                    }
                },

                Err(TryRecvError::Empty) => {}

                Err(TryRecvError::Disconnected) => {
                    tracing::debug!("command channel closed, engine exiting");
                    break;
                }
            }

            let Some(ref mut c) = ctx else {
                std::thread::sleep(Duration::from_millis(50));
                continue;
            };

            // Seek, Stop and Load all leave `Draining`, so finishing here means
            // the tail played out untouched.
            if c.tail.poll(c.audio_output.buffer_len()) {
                if let Some(total) = c.total_duration {
                    state.set_position(total);
                    let _ = event_tx.send(AppEvent::CurrentTimeChanged(total));
                }
                tracing::info!("end of media");
                let _ = event_tx.send(AppEvent::EndOfMedia);
                continue;
            }

            if is_paused || c.tail == Tail::Ended {
                std::thread::sleep(Duration::from_millis(20));
                continue;
            }

            // Throttle if buffer is full
            let max_buffer = c.audio_output.spec.rate as usize * c.audio_output.channels() * 3;
            if c.tail == Tail::Draining || c.audio_output.buffer_len() > max_buffer {
                std::thread::sleep(Duration::from_millis(10));
            } else {
                match c.format.next_packet() {
                    Ok(packet) => {
                        if packet.track_id() != c.track_id {
                            continue;
                        }

                        match c.decoder.decode(&packet) {
                            Ok(decoded) => {
                                c.sample_buf.copy_interleaved_ref(decoded);
                                c.total_frames_decoded +=
                                    c.sample_buf.len() as u64 / c.audio_output.channels() as u64;
                                c.audio_output.write_samples(c.sample_buf.samples());
                            }
                            Err(SymphoniaError::DecodeError(e)) => {
                                tracing::debug!("skipping undecodable packet: {e}");
                            }
                            Err(e) => {
                                let _ = event_tx
                                    .send(AppEvent::EngineError(format!("Decode error: {}", e)));
                            }
                        }
                    }

                    Err(SymphoniaError::IoError(e))
                        if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                    {
                        tracing::debug!("decoder exhausted, draining output");
                        c.tail = Tail::Draining;
                    }

                    Err(e) => {
                        tracing::error!("read error, halting playback: {e}");
                        ctx = None;
                        let _ = event_tx.send(AppEvent::EngineError(format!("Read error: {}", e)));
                        set_status(PlaybackStatus::Halted);
                        continue;
                    }
                }
            }

            if last_position_update.elapsed() >= POSITION_UPDATE_INTERVAL {
                let position = c.played_position();
                state.set_position(position);
                let _ = event_tx.send(AppEvent::CurrentTimeChanged(position));
                last_position_update = Instant::now();
            }
        }
    })
}

fn open_source(source: &MediaSource) -> EngineResult<Box<dyn SymphoniaSource>> {
    match source {
        MediaSource::File(path) => Ok(Box::new(File::open(path)?)),
        MediaSource::Remote(url) => {
            let bytes = reqwest::blocking::get(url.clone())?
                .error_for_status()?
                .bytes()?;
            tracing::debug!(bytes = bytes.len(), "fetched remote media");
            Ok(Box::new(Cursor::new(bytes.to_vec())))
        }
    }
}

fn load_media(source: &MediaSource, state: Arc<EngineState>) -> EngineResult<PlaybackContext> {
    let codecs = symphonia::default::get_codecs();
    let probe = symphonia::default::get_probe();

    let mss = MediaSourceStream::new(open_source(source)?, Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = source.extension() {
        hint.with_extension(&ext);
    }

    let probed = probe.format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or("No audio track found")?;

    let track_id = track.id;
    let codec_params = track.codec_params.clone();

    let total_duration = codec_params.time_base.and_then(|tb| {
        codec_params.n_frames.map(|frames| {
            let time = tb.calc_time(frames);
            Duration::from_secs_f64(time.seconds as f64 + time.frac)
        })
    });

    let mut decoder = codecs.make(&codec_params, &DecoderOptions::default())?;

    // Decode packets until we get valid audio (handles decoder warm-up)
    let (spec, first_samples) = loop {
        let packet = format.next_packet()?;

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                let mut sample_buf = SampleBuffer::new(decoded.capacity() as u64, spec);
                sample_buf.copy_interleaved_ref(decoded);
                break (spec, sample_buf);
            }
            Err(SymphoniaError::DecodeError(_)) => continue,
            Err(e) => return Err(e.into()),
        }
    };

    let audio_output = AudioOutput::new(spec, state)?;
    audio_output.write_samples(first_samples.samples());

    let initial_frames = first_samples.len() as u64 / spec.channels.count() as u64;
    let sample_buf = SampleBuffer::new(first_samples.len() as u64, spec);

    Ok(PlaybackContext {
        format,
        decoder,
        track_id,
        audio_output,
        sample_buf,
        total_frames_decoded: initial_frames,
        total_duration,
        tail: Tail::Decoding,
    })
}
