//! Camera capture with a bounded ladder of progressively relaxed constraints.
//!
//! A stream is owned by a [`StreamGuard`]; dropping the guard stops every
//! track, so closing, switching cameras, failing and tearing the session
//! down all release the device.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::DeviceError;
use crate::gps::GpsFix;
use crate::photo::FieldPhoto;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facing {
    /// Front camera.
    User,
    /// Back camera.
    Environment,
}

impl Facing {
    pub fn flipped(self) -> Facing {
        match self {
            Facing::User => Facing::Environment,
            Facing::Environment => Facing::User,
        }
    }
}

/// One `getUserMedia` video constraint set. `None` means "don't care".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConstraintProfile {
    pub facing: Option<Facing>,
    pub ideal_width: Option<u32>,
    pub ideal_height: Option<u32>,
}

pub trait MediaStream {
    fn capture_jpeg(&mut self) -> Result<Vec<u8>, DeviceError>;
    /// Stops every track of the stream.
    fn stop(&mut self);
}

pub trait CameraDevice {
    type Stream: MediaStream;

    fn open(&mut self, profile: &ConstraintProfile) -> Result<Self::Stream, DeviceError>;
}

pub struct StreamGuard<S: MediaStream> {
    stream: S,
}

impl<S: MediaStream> StreamGuard<S> {
    pub fn new(stream: S) -> StreamGuard<S> {
        StreamGuard { stream }
    }

    pub fn stream_mut(&mut self) -> &mut S {
        &mut self.stream
    }
}

impl<S: MediaStream> Drop for StreamGuard<S> {
    fn drop(&mut self) {
        debug!("camera stream stopped");
        self.stream.stop();
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ConstraintLadder {
    profiles: Vec<ConstraintProfile>,
    max_attempts: usize,
}

impl ConstraintLadder {
    pub fn new(profiles: Vec<ConstraintProfile>, max_attempts: usize) -> ConstraintLadder {
        ConstraintLadder {
            profiles,
            max_attempts,
        }
    }

    /// Full HD, then HD, then any resolution, then any camera at all.
    pub fn standard(facing: Facing, max_attempts: usize) -> ConstraintLadder {
        let sized = |w, h| ConstraintProfile {
            facing: Some(facing),
            ideal_width: Some(w),
            ideal_height: Some(h),
        };
        ConstraintLadder::new(
            vec![
                sized(1920, 1080),
                sized(1280, 720),
                ConstraintProfile {
                    facing: Some(facing),
                    ideal_width: None,
                    ideal_height: None,
                },
                ConstraintProfile {
                    facing: None,
                    ideal_width: None,
                    ideal_height: None,
                },
            ],
            max_attempts,
        )
    }

    /// Profile for the given 0-based attempt; the last one repeats.
    pub fn profile(&self, attempt: usize) -> Option<&ConstraintProfile> {
        self.profiles
            .get(attempt)
            .or_else(|| self.profiles.last())
    }

    /// Tries profiles in order. Permanent errors stop at once; transient ones
    /// move down the ladder until `max_attempts` is spent.
    pub fn acquire<D: CameraDevice>(
        &self,
        device: &mut D,
    ) -> Result<(D::Stream, ConstraintProfile), Failure> {
        let mut last = DeviceError::NotFound;
        for attempt in 0..self.max_attempts {
            let Some(profile) = self.profile(attempt) else {
                break;
            };
            match device.open(profile) {
                Ok(stream) => {
                    info!(attempt, ?profile, "camera opened");
                    return Ok((stream, *profile));
                }
                Err(err) if err.is_transient() => {
                    warn!(attempt, %err, "camera busy, relaxing constraints");
                    last = err;
                }
                Err(err) => {
                    warn!(attempt, %err, "camera unavailable");
                    return Err(Failure {
                        error: err,
                        attempts: attempt + 1,
                    });
                }
            }
        }
        Err(Failure {
            error: last,
            attempts: self.max_attempts,
        })
    }
}

/// Terminal state of an acquisition; the user can still retry by hand.
#[derive(Clone, Debug, PartialEq)]
pub struct Failure {
    pub error: DeviceError,
    pub attempts: usize,
}

impl Failure {
    pub fn user_message(&self) -> String {
        self.error.user_message()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum CameraState {
    Closed,
    Streaming(ConstraintProfile),
    Failed(Failure),
}

pub struct CameraSession<D: CameraDevice> {
    device: D,
    facing: Facing,
    max_attempts: usize,
    stream: Option<StreamGuard<D::Stream>>,
    state: CameraState,
}

impl<D: CameraDevice> CameraSession<D> {
    pub fn new(device: D, facing: Facing, max_attempts: usize) -> CameraSession<D> {
        CameraSession {
            device,
            facing,
            max_attempts,
            stream: None,
            state: CameraState::Closed,
        }
    }

    pub fn state(&self) -> &CameraState {
        &self.state
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn is_streaming(&self) -> bool {
        self.stream.is_some()
    }

    pub fn open(&mut self) -> Result<(), Failure> {
        self.release();
        let ladder = ConstraintLadder::standard(self.facing, self.max_attempts);
        match ladder.acquire(&mut self.device) {
            Ok((stream, profile)) => {
                self.stream = Some(StreamGuard::new(stream));
                self.state = CameraState::Streaming(profile);
                Ok(())
            }
            Err(failure) => {
                self.state = CameraState::Failed(failure.clone());
                Err(failure)
            }
        }
    }

    /// Manual retry after a failure.
    pub fn retry(&mut self) -> Result<(), Failure> {
        self.open()
    }

    pub fn close(&mut self) {
        self.release();
        self.state = CameraState::Closed;
    }

    /// Releases the current camera before opening the other one.
    pub fn switch_facing(&mut self) -> Result<(), Failure> {
        self.release();
        self.facing = self.facing.flipped();
        self.open()
    }

    pub fn capture(
        &mut self,
        id: String,
        timestamp_ms: i64,
        gps: Option<GpsFix>,
        linked_feature_id: Option<String>,
    ) -> Result<FieldPhoto, DeviceError> {
        let guard = self.stream.as_mut().ok_or(DeviceError::NotFound)?;
        match guard.stream_mut().capture_jpeg() {
            Ok(jpeg) => Ok(FieldPhoto::from_jpeg(
                id,
                &jpeg,
                timestamp_ms,
                gps,
                linked_feature_id,
            )),
            Err(err) => {
                self.release();
                self.state = CameraState::Failed(Failure {
                    error: err.clone(),
                    attempts: 1,
                });
                Err(err)
            }
        }
    }

    fn release(&mut self) {
        self.stream = None;
    }
}
