use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::{Duration, Instant},
};

use anyhow::{Result, anyhow};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TrySendError};
use nokhwa::{
    Camera,
    pixel_format::RgbFormat,
    utils::{CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType},
};
use rayon::prelude::*;

use super::{CAPTURE_RETRY_DELAY, FrameSource};
use crate::{error::CaptureError, types::Frame, ui::render_util};

const READ_TIMEOUT: Duration = Duration::from_millis(500);

// MJPEG first: many built-in cameras reject YUYV at 640x480.
const PREFERRED_PIXEL_FORMATS: &[FrameFormat] = &[
    FrameFormat::MJPEG,
    FrameFormat::NV12,
    FrameFormat::RAWRGB,
    FrameFormat::RAWBGR,
];

fn requested_formats(width: u32, height: u32) -> [RequestedFormat<'static>; 3] {
    [
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(CameraFormat::new_from(
            width,
            height,
            FrameFormat::MJPEG,
            30,
        ))),
        RequestedFormat::with_formats(
            RequestedFormatType::AbsoluteHighestFrameRate,
            PREFERRED_PIXEL_FORMATS,
        ),
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::None),
    ]
}

#[derive(Clone, Copy, Debug)]
pub struct CameraSettings {
    pub index: u32,
    pub width: u32,
    pub height: u32,
    pub mirror: bool,
}

fn build_camera(settings: &CameraSettings) -> Result<Camera> {
    let mut last_err = None;

    for requested in requested_formats(settings.width, settings.height) {
        match Camera::new(CameraIndex::Index(settings.index), requested) {
            Ok(mut camera) => match camera.open_stream() {
                Ok(()) => return Ok(camera),
                Err(err) => last_err = Some(err.into()),
            },
            Err(err) => last_err = Some(err.into()),
        }
    }

    Err(last_err.unwrap_or_else(|| anyhow!("failed to open camera with any supported format")))
}

/// Webcam read on a background thread. The channel holds only the newest
/// frame; older ones are discarded when the game loop falls behind.
#[derive(Debug)]
pub struct CameraStream {
    frames: Receiver<Frame>,
    stop: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl CameraStream {
    pub fn start(settings: CameraSettings) -> Result<Self> {
        // Fail fast before spawning the capture thread.
        drop(build_camera(&settings)?);

        let (tx, rx) = crossbeam_channel::bounded(1);
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = stop.clone();
        let stale = rx.clone();

        let handle = thread::spawn(move || capture_loop(settings, tx, stale, stop_flag));
        log::info!(
            "camera {} opened (mirror: {})",
            settings.index,
            settings.mirror
        );

        Ok(Self {
            frames: rx,
            stop,
            handle: Some(handle),
        })
    }
}

impl FrameSource for CameraStream {
    fn acquire_frame(&mut self) -> Result<Frame, CaptureError> {
        match self.frames.recv_timeout(READ_TIMEOUT) {
            Ok(frame) => Ok(frame),
            Err(RecvTimeoutError::Timeout) => Err(CaptureError::Transient(format!(
                "no frame within {} ms",
                READ_TIMEOUT.as_millis()
            ))),
            Err(RecvTimeoutError::Disconnected) => Err(CaptureError::Closed),
        }
    }
}

impl Drop for CameraStream {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn capture_loop(
    settings: CameraSettings,
    frame_tx: Sender<Frame>,
    stale: Receiver<Frame>,
    stop: Arc<AtomicBool>,
) {
    let mut camera = match build_camera(&settings) {
        Ok(cam) => cam,
        Err(err) => {
            log::error!("failed to open camera: {err:?}");
            return;
        }
    };

    while !stop.load(Ordering::Relaxed) {
        let frame = match camera.frame() {
            Ok(frame) => frame,
            Err(err) => {
                log::warn!("camera frame read failed: {err:?}");
                thread::sleep(CAPTURE_RETRY_DELAY);
                continue;
            }
        };

        let decoded = match frame.decode_image::<RgbFormat>() {
            Ok(img) => img,
            Err(err) => {
                log::warn!("failed to decode camera frame: {err:?}");
                continue;
            }
        };

        let (width, height) = decoded.dimensions();
        let rgb = decoded.into_raw();
        if rgb.is_empty() {
            continue;
        }

        let pixel_count = rgb.len() / 3;
        let mut rgba = vec![0u8; pixel_count * 4];
        rgba.par_chunks_mut(4)
            .zip(rgb.par_chunks_exact(3))
            .for_each(|(dst, src)| {
                dst[..3].copy_from_slice(src);
                dst[3] = 255;
            });

        let mut frame = Frame {
            rgba,
            width,
            height,
            timestamp: Instant::now(),
        };
        if settings.mirror {
            render_util::mirror_horizontally(&mut frame);
        }

        if let Err(TrySendError::Disconnected(_)) = publish_latest(&frame_tx, &stale, frame) {
            break;
        }
    }
}

/// Replaces whatever frame is still waiting with `frame`.
fn publish_latest<T>(tx: &Sender<T>, stale: &Receiver<T>, item: T) -> Result<(), TrySendError<T>> {
    let _ = stale.try_recv();
    tx.try_send(item)
}
