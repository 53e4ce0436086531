//! Integration tests for stream acquisition and release.

use camshot_capture::{
    CameraBackend, CaptureError, MediaConstraints, StreamHandle, SyntheticAccess,
    SyntheticCameraBackend, TrackKind, TrackState,
};

#[test]
fn stream_lifecycle_tests_release_stops_every_track() {
    let backend = SyntheticCameraBackend::new();
    let probe = backend.probe();

    let handle = StreamHandle::acquire(&backend, &MediaConstraints::video_only(0))
        .expect("acquire should succeed");
    let tracks = handle.tracks();
    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].kind, TrackKind::Video);
    assert_eq!(tracks[0].state, TrackState::Live);

    assert_eq!(handle.release(), 1);
    assert_eq!(probe.acquisitions(), 1);
    assert_eq!(probe.stopped_tracks(), 1);
}

#[test]
fn stream_lifecycle_tests_denied_access_yields_no_stream() {
    let backend = SyntheticCameraBackend::new()
        .with_access(SyntheticAccess::Denied("NotAllowedError".to_string()));
    let probe = backend.probe();

    let result = StreamHandle::acquire(&backend, &MediaConstraints::video_only(0));
    assert!(matches!(result, Err(CaptureError::PermissionDenied(_))));
    assert_eq!(probe.acquisitions(), 0);
}

#[test]
fn stream_lifecycle_tests_unknown_device_is_reported() {
    let backend = SyntheticCameraBackend::new();
    let result = backend.acquire(&MediaConstraints::video_only(3));
    assert!(matches!(result, Err(CaptureError::DeviceNotFound(3))));
}

#[test]
fn stream_lifecycle_tests_audio_requests_are_rejected_before_backend() {
    let backend = SyntheticCameraBackend::new();
    let probe = backend.probe();
    let constraints = MediaConstraints {
        video: true,
        audio: true,
        device_index: 0,
    };

    let result = StreamHandle::acquire(&backend, &constraints);
    assert!(matches!(result, Err(CaptureError::InvalidConstraints(_))));
    assert_eq!(probe.acquisitions(), 0);
}
