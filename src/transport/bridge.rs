//! Audio Engine Bridge
//!
//! The listener the engine calls from its real-time thread. Callbacks only
//! touch atomics and `try_send` a small `Copy` signal into a bounded queue;
//! the UI side drains the queue through `next_notification`.
//!
//! Rate changes, new block notices, sound activation crossings and checkpoint
//! failures can arrive at any frequency, so each is coalesced: at most one
//! signal of each kind is outstanding and its payload accumulates in atomics
//! until drained. Lifecycle notifications (start, stop, commit) are queued
//! individually and keep the order the engine issued them in.
//!
//! A signal that finds the queue full is deferred, not dropped: it is counted
//! in a per-kind atomic and delivered once the queue has been drained. While
//! anything is deferred, new signals are deferred too, so queued signals are
//! always delivered before deferred ones.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};

use crate::config::MIN_NOTIFICATION_QUEUE_CAPACITY;
use crate::engine::AudioIoListener;
use crate::tracks::Track;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Signal {
    Rate,
    StartRecording,
    StopRecording,
    NewBlocks,
    CommitRecording,
    SoundActivation,
    CheckpointFailure,
}

impl Signal {
    const COUNT: usize = 7;

    /// Delivery order of deferred signals: a session's start, its data, then
    /// its end.
    const DEFERRED_ORDER: [Signal; Signal::COUNT] = [
        Signal::Rate,
        Signal::StartRecording,
        Signal::NewBlocks,
        Signal::SoundActivation,
        Signal::CheckpointFailure,
        Signal::StopRecording,
        Signal::CommitRecording,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

/// A drained engine notification, with any coalesced payload resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineNotification {
    RateChanged { rate: u32 },
    StartRecording,
    StopRecording,
    /// Blocks arrived; `all_capture_blocks` counts the notices that named no
    /// particular track and so apply to every capture track.
    NewBlocks { all_capture_blocks: u64 },
    CommitRecording,
    /// Number of threshold crossings since the last drain.
    SoundActivation { crossings: u32 },
    CheckpointFailure,
}

#[derive(Debug)]
pub struct AudioEngineBridge {
    sender: Sender<Signal>,
    receiver: Receiver<Signal>,

    displayed_rate: AtomicU32,
    rate_queued: AtomicBool,
    blocks_queued: AtomicBool,
    pending_all_blocks: AtomicU64,
    activation_queued: AtomicBool,
    activation_crossings: AtomicU32,
    checkpoint_queued: AtomicBool,

    deferred: [AtomicU32; Signal::COUNT],
    deferred_total: AtomicU32,

    timer_record_cancelled: AtomicBool,
    overflowed: AtomicU64,
}

impl AudioEngineBridge {
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) =
            crossbeam_channel::bounded(capacity.max(MIN_NOTIFICATION_QUEUE_CAPACITY));
        Self {
            sender,
            receiver,
            displayed_rate: AtomicU32::new(0),
            rate_queued: AtomicBool::new(false),
            blocks_queued: AtomicBool::new(false),
            pending_all_blocks: AtomicU64::new(0),
            activation_queued: AtomicBool::new(false),
            activation_crossings: AtomicU32::new(0),
            checkpoint_queued: AtomicBool::new(false),
            deferred: std::array::from_fn(|_| AtomicU32::new(0)),
            deferred_total: AtomicU32::new(0),
            timer_record_cancelled: AtomicBool::new(false),
            overflowed: AtomicU64::new(0),
        }
    }

    fn send(&self, signal: Signal) {
        if self.deferred_total.load(Ordering::Acquire) == 0
            && self.sender.try_send(signal).is_ok()
        {
            return;
        }
        self.deferred[signal.index()].fetch_add(1, Ordering::AcqRel);
        self.deferred_total.fetch_add(1, Ordering::AcqRel);
        self.overflowed.fetch_add(1, Ordering::Relaxed);
    }

    /// Send `signal` unless one of its kind is already outstanding.
    fn send_coalesced(&self, queued: &AtomicBool, signal: Signal) {
        if !queued.swap(true, Ordering::AcqRel) {
            self.send(signal);
        }
    }

    fn take_deferred(&self) -> Option<Signal> {
        if self.deferred_total.load(Ordering::Acquire) == 0 {
            return None;
        }
        let signal = Signal::DEFERRED_ORDER.into_iter().find(|signal| {
            self.deferred[signal.index()]
                .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
                .is_ok()
        })?;
        self.deferred_total.fetch_sub(1, Ordering::AcqRel);
        Some(signal)
    }

    /// Take the next notification, resolving coalesced payloads. Queued
    /// signals come first, then deferred ones.
    pub fn next_notification(&self) -> Option<EngineNotification> {
        let signal = match self.receiver.try_recv() {
            Ok(signal) => signal,
            Err(_) => self.take_deferred()?,
        };
        let notification = match signal {
            Signal::Rate => {
                self.rate_queued.store(false, Ordering::Release);
                EngineNotification::RateChanged {
                    rate: self.displayed_rate(),
                }
            }
            Signal::StartRecording => EngineNotification::StartRecording,
            Signal::StopRecording => EngineNotification::StopRecording,
            Signal::NewBlocks => {
                self.blocks_queued.store(false, Ordering::Release);
                EngineNotification::NewBlocks {
                    all_capture_blocks: self.pending_all_blocks.swap(0, Ordering::AcqRel),
                }
            }
            Signal::CommitRecording => EngineNotification::CommitRecording,
            Signal::SoundActivation => {
                self.activation_queued.store(false, Ordering::Release);
                EngineNotification::SoundActivation {
                    crossings: self.activation_crossings.swap(0, Ordering::AcqRel),
                }
            }
            Signal::CheckpointFailure => {
                self.checkpoint_queued.store(false, Ordering::Release);
                EngineNotification::CheckpointFailure
            }
        };
        Some(notification)
    }

    /// Notifications waiting to be drained, queued or deferred.
    pub fn pending(&self) -> usize {
        self.receiver.len() + self.deferred_total.load(Ordering::Acquire) as usize
    }

    /// Last rate reported by the engine; zero before any stream started.
    pub fn displayed_rate(&self) -> u32 {
        self.displayed_rate.load(Ordering::Acquire)
    }

    /// Number of notifications deferred by a full queue since the last call.
    pub fn take_overflow_count(&self) -> u64 {
        self.overflowed.swap(0, Ordering::AcqRel)
    }

    /// The engine failed to checkpoint captured audio. Non-blocking.
    pub fn report_checkpoint_failure(&self) {
        self.send_coalesced(&self.checkpoint_queued, Signal::CheckpointFailure);
    }

    // ========================================================================
    // Timer record cancellation
    // ========================================================================

    pub fn is_timer_record_cancelled(&self) -> bool {
        self.timer_record_cancelled.load(Ordering::Acquire)
    }

    pub fn set_timer_record_cancelled(&self) {
        self.timer_record_cancelled.store(true, Ordering::Release);
    }

    pub fn reset_timer_record_cancelled(&self) {
        self.timer_record_cancelled.store(false, Ordering::Release);
    }
}

impl AudioIoListener for AudioEngineBridge {
    fn on_audio_io_rate(&self, rate: u32) {
        self.displayed_rate.store(rate, Ordering::Release);
        self.send_coalesced(&self.rate_queued, Signal::Rate);
    }

    fn on_audio_io_start_recording(&self) {
        self.send(Signal::StartRecording);
    }

    fn on_audio_io_stop_recording(&self) {
        self.send(Signal::StopRecording);
    }

    fn on_audio_io_new_blocks(&self, tracks: Option<&[Arc<Track>]>) {
        match tracks {
            Some(tracks) => {
                for track in tracks {
                    track.append_captured_block();
                }
            }
            None => {
                self.pending_all_blocks.fetch_add(1, Ordering::AcqRel);
            }
        }
        self.send_coalesced(&self.blocks_queued, Signal::NewBlocks);
    }

    fn on_commit_recording(&self) {
        self.send(Signal::CommitRecording);
    }

    fn on_sound_activation_threshold(&self) {
        self.activation_crossings.fetch_add(1, Ordering::AcqRel);
        self.send_coalesced(&self.activation_queued, Signal::SoundActivation);
    }
}
