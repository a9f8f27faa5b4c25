// Galleria - Capture Coordinator
// Turns one shutter press into one durable image row: camera -> relocation ->
// store insert -> captured signal.

pub mod relocate;

use serde::{Deserialize, Serialize};

use crate::error::{GalleriaError, Result};
use crate::store::{GeoFix, ImageRepository};

pub use relocate::FsRelocator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Granted,
    Denied,
}

/// Handle to an image the camera wrote somewhere temporary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransientImage {
    pub uri: String,
}

/// Which lens the shutter uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraFacing {
    #[default]
    Back,
    Front,
}

impl CameraFacing {
    pub fn flipped(self) -> Self {
        match self {
            CameraFacing::Back => CameraFacing::Front,
            CameraFacing::Front => CameraFacing::Back,
        }
    }
}

pub trait CameraDevice {
    fn request_permission(&mut self) -> Permission;
    fn capture(&mut self, facing: CameraFacing) -> Result<TransientImage>;
}

pub trait LocationProvider {
    fn request_permission(&mut self) -> Permission;
    /// None when no fix is available. Not an error.
    fn current_fix(&mut self) -> Option<GeoFix>;
}

pub trait FileRelocator {
    /// Move the transient image somewhere durable and return its new uri.
    fn move_to_permanent_storage(&self, transient: &TransientImage) -> Result<String>;
}

/// What to do with a capture taken without a location fix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingLocation {
    /// Persist with null coordinates.
    #[default]
    Store,
    /// Drop the capture without writing a row.
    Skip,
}

/// Sent to subscribers after a row was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureEvent {
    pub id: i64,
    pub uri: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    Saved(CaptureEvent),
    /// No fix and the policy is `Skip`; nothing was written.
    Skipped,
}

/// A photo taken but not yet persisted. Only one exists at a time.
#[derive(Debug)]
#[must_use = "a pending capture must be completed or abandoned"]
pub struct PendingCapture {
    transient: TransientImage,
    fix: Option<GeoFix>,
}

impl PendingCapture {
    pub fn transient(&self) -> &TransientImage {
        &self.transient
    }
}

type Subscriber = Box<dyn FnMut(&CaptureEvent)>;

pub struct CaptureCoordinator<C, L, F> {
    camera: C,
    location: L,
    relocator: F,
    camera_permission: Permission,
    facing: CameraFacing,
    fix: Option<GeoFix>,
    missing_location: MissingLocation,
    tag: Option<String>,
    album: Option<String>,
    in_flight: bool,
    subscribers: Vec<Subscriber>,
}

impl<C, L, F> CaptureCoordinator<C, L, F>
where
    C: CameraDevice,
    L: LocationProvider,
    F: FileRelocator,
{
    pub fn new(camera: C, location: L, relocator: F) -> Self {
        Self {
            camera,
            location,
            relocator,
            camera_permission: Permission::Denied,
            facing: CameraFacing::default(),
            fix: None,
            missing_location: MissingLocation::default(),
            tag: None,
            album: None,
            in_flight: false,
            subscribers: Vec::new(),
        }
    }

    pub fn missing_location(mut self, policy: MissingLocation) -> Self {
        self.missing_location = policy;
        self
    }

    /// Labels stored with every following capture.
    pub fn set_labels(&mut self, tag: Option<String>, album: Option<String>) {
        self.tag = tag;
        self.album = album;
    }

    pub fn on_captured(&mut self, subscriber: impl FnMut(&CaptureEvent) + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    pub fn facing(&self) -> CameraFacing {
        self.facing
    }

    /// Switch between the back and front camera. Returns the new facing.
    pub fn toggle_facing(&mut self) -> CameraFacing {
        self.facing = self.facing.flipped();
        log::debug!("Camera facing switched to {:?}", self.facing);
        self.facing
    }

    pub fn fix(&self) -> Option<GeoFix> {
        self.fix
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// The capture surface became active: ask for permissions and take one
    /// location fix. Returns the camera permission.
    pub fn activate(&mut self) -> Permission {
        self.camera_permission = self.camera.request_permission();

        if self.location.request_permission() == Permission::Granted {
            self.fix = self.location.current_fix();
            if self.fix.is_none() {
                log::warn!("Location permission granted but no fix available");
            }
        } else {
            log::info!("Location permission denied; captures will have no coordinates");
        }

        self.camera_permission
    }

    /// Take the photo. Fails while another capture is pending.
    pub fn begin(&mut self) -> Result<PendingCapture> {
        if self.in_flight {
            log::warn!("Capture ignored: another capture is still in flight");
            return Err(GalleriaError::CaptureInFlight);
        }
        if self.camera_permission != Permission::Granted {
            log::error!("Error capturing photo: camera permission not granted");
            return Err(GalleriaError::Capture("camera permission not granted".to_string()));
        }

        let transient = self.camera.capture(self.facing).map_err(|e| {
            log::error!("Error capturing photo: {}", e);
            e
        })?;

        self.in_flight = true;
        Ok(PendingCapture {
            transient,
            fix: self.fix,
        })
    }

    /// Persist a pending capture. The coordinator is idle again afterwards,
    /// whatever the result.
    pub fn complete<R: ImageRepository>(
        &mut self,
        pending: PendingCapture,
        repo: &R,
    ) -> Result<CaptureOutcome> {
        let result = self.persist(pending, repo);
        self.in_flight = false;

        match &result {
            Ok(CaptureOutcome::Saved(event)) => {
                for subscriber in self.subscribers.iter_mut() {
                    subscriber(event);
                }
            }
            Ok(CaptureOutcome::Skipped) => {}
            Err(e) => log::error!("Error saving captured photo: {}", e),
        }
        result
    }

    /// Drop a pending capture without writing anything.
    pub fn abandon(&mut self, pending: PendingCapture) {
        log::debug!("Capture of {} abandoned", pending.transient.uri);
        self.in_flight = false;
    }

    /// `begin` followed by `complete`.
    pub fn capture<R: ImageRepository>(&mut self, repo: &R) -> Result<CaptureOutcome> {
        let pending = self.begin()?;
        self.complete(pending, repo)
    }

    fn persist<R: ImageRepository>(
        &self,
        pending: PendingCapture,
        repo: &R,
    ) -> Result<CaptureOutcome> {
        if pending.fix.is_none() && self.missing_location == MissingLocation::Skip {
            log::warn!("No location fix; capture {} not saved", pending.transient.uri);
            return Ok(CaptureOutcome::Skipped);
        }

        let uri = match self.relocator.move_to_permanent_storage(&pending.transient) {
            Ok(uri) => uri,
            Err(e) => {
                log::warn!(
                    "Could not move {} to permanent storage, keeping original: {}",
                    pending.transient.uri,
                    e
                );
                pending.transient.uri.clone()
            }
        };

        let id = repo.insert(&uri, pending.fix, self.tag.as_deref(), self.album.as_deref())?;
        Ok(CaptureOutcome::Saved(CaptureEvent { id, uri }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryRepository;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct FakeCamera {
        permission: Permission,
        shots: usize,
        fail: bool,
        used: Vec<CameraFacing>,
    }

    impl CameraDevice for FakeCamera {
        fn request_permission(&mut self) -> Permission {
            self.permission
        }

        fn capture(&mut self, facing: CameraFacing) -> Result<TransientImage> {
            self.used.push(facing);
            if self.fail {
                return Err(GalleriaError::Capture("shutter jammed".to_string()));
            }
            self.shots += 1;
            Ok(TransientImage { uri: format!("file:///cache/shot{}.jpg", self.shots) })
        }
    }

    struct FakeLocation(Permission, Option<GeoFix>);

    impl LocationProvider for FakeLocation {
        fn request_permission(&mut self) -> Permission {
            self.0
        }

        fn current_fix(&mut self) -> Option<GeoFix> {
            self.1
        }
    }

    /// Prefixes the uri, or fails when asked to.
    struct FakeRelocator {
        fail: bool,
    }

    impl FileRelocator for FakeRelocator {
        fn move_to_permanent_storage(&self, transient: &TransientImage) -> Result<String> {
            if self.fail {
                return Err(GalleriaError::Io(std::io::Error::other("disk full")));
            }
            Ok(transient.uri.replace("/cache/", "/photos/"))
        }
    }

    const FIX: GeoFix = GeoFix { latitude: 51.5, longitude: -0.12 };

    fn coordinator(
        fix: Option<GeoFix>,
        relocation_fails: bool,
    ) -> CaptureCoordinator<FakeCamera, FakeLocation, FakeRelocator> {
        let mut coordinator = CaptureCoordinator::new(
            FakeCamera { permission: Permission::Granted, shots: 0, fail: false, used: Vec::new() },
            FakeLocation(Permission::Granted, fix),
            FakeRelocator { fail: relocation_fails },
        );
        coordinator.activate();
        coordinator
    }

    #[test]
    fn test_capture_saves_relocated_uri_with_fix() {
        let repo = MemoryRepository::new();
        let mut coordinator = coordinator(Some(FIX), false);
        coordinator.set_labels(Some("park".to_string()), Some("Walks".to_string()));

        let outcome = coordinator.capture(&repo).unwrap();

        let CaptureOutcome::Saved(event) = outcome else {
            panic!("expected a saved capture");
        };
        assert_eq!(event.uri, "file:///photos/shot1.jpg");
        let row = repo.fetch_by_id(event.id).unwrap().unwrap();
        assert_eq!(row.latitude, Some(51.5));
        assert_eq!(row.album.as_deref(), Some("Walks"));
        assert!(!coordinator.is_in_flight());
    }

    #[test]
    fn test_missing_fix_stores_null_coordinates_by_default() {
        let repo = MemoryRepository::new();
        let mut coordinator = coordinator(None, false);

        let outcome = coordinator.capture(&repo).unwrap();

        assert!(matches!(outcome, CaptureOutcome::Saved(_)));
        let row = &repo.fetch_all().unwrap()[0];
        assert_eq!(row.coordinates(), None);
    }

    #[test]
    fn test_missing_fix_with_skip_policy_writes_nothing() {
        let repo = MemoryRepository::new();
        let mut coordinator = coordinator(None, false).missing_location(MissingLocation::Skip);

        assert_eq!(coordinator.capture(&repo).unwrap(), CaptureOutcome::Skipped);
        assert_eq!(repo.len(), 0);
        assert!(!coordinator.is_in_flight());
    }

    #[test]
    fn test_location_permission_denied_means_no_fix() {
        let mut coordinator = CaptureCoordinator::new(
            FakeCamera { permission: Permission::Granted, shots: 0, fail: false, used: Vec::new() },
            FakeLocation(Permission::Denied, Some(FIX)),
            FakeRelocator { fail: false },
        );
        coordinator.activate();
        assert_eq!(coordinator.fix(), None);
    }

    #[test]
    fn test_camera_permission_denied_is_capture_error() {
        let repo = MemoryRepository::new();
        let mut coordinator = CaptureCoordinator::new(
            FakeCamera { permission: Permission::Denied, shots: 0, fail: false, used: Vec::new() },
            FakeLocation(Permission::Granted, Some(FIX)),
            FakeRelocator { fail: false },
        );
        assert_eq!(coordinator.activate(), Permission::Denied);

        let err = coordinator.capture(&repo).unwrap_err();
        assert!(matches!(err, GalleriaError::Capture(_)));
        assert_eq!(repo.len(), 0);
    }

    #[test]
    fn test_camera_failure_returns_to_idle() {
        let repo = MemoryRepository::new();
        let mut coordinator = coordinator(Some(FIX), false);
        coordinator.camera.fail = true;

        assert!(coordinator.capture(&repo).is_err());
        assert!(!coordinator.is_in_flight());

        coordinator.camera.fail = false;
        assert!(coordinator.capture(&repo).is_ok());
    }

    #[test]
    fn test_relocation_failure_keeps_original_reference() {
        let repo = MemoryRepository::new();
        let mut coordinator = coordinator(Some(FIX), true);

        let CaptureOutcome::Saved(event) = coordinator.capture(&repo).unwrap() else {
            panic!("expected a saved capture");
        };
        assert_eq!(event.uri, "file:///cache/shot1.jpg");
    }

    #[test]
    fn test_second_capture_while_in_flight_is_rejected() {
        let repo = MemoryRepository::new();
        let mut coordinator = coordinator(Some(FIX), false);

        let pending = coordinator.begin().unwrap();
        let err = coordinator.begin().unwrap_err();
        assert!(matches!(err, GalleriaError::CaptureInFlight));

        coordinator.complete(pending, &repo).unwrap();
        assert_eq!(repo.len(), 1, "only one row for the double press");

        let pending = coordinator.begin().unwrap();
        coordinator.abandon(pending);
        assert_eq!(repo.len(), 1);
        assert!(!coordinator.is_in_flight());
    }

    #[test]
    fn test_store_failure_is_reported_and_idle() {
        let repo = MemoryRepository::new();
        repo.fail_writes.set(true);
        let mut coordinator = coordinator(Some(FIX), false);

        let err = coordinator.capture(&repo).unwrap_err();
        assert!(matches!(err, GalleriaError::StoreWrite(_)));
        assert!(!coordinator.is_in_flight());
    }

    #[test]
    fn test_subscribers_hear_saved_captures_only() {
        let repo = MemoryRepository::new();
        let heard = Rc::new(RefCell::new(Vec::new()));
        let mut coordinator = coordinator(None, false).missing_location(MissingLocation::Skip);
        let sink = Rc::clone(&heard);
        coordinator.on_captured(move |event| sink.borrow_mut().push(event.id));

        coordinator.capture(&repo).unwrap();
        assert!(heard.borrow().is_empty());

        coordinator.missing_location = MissingLocation::Store;
        coordinator.capture(&repo).unwrap();
        assert_eq!(heard.borrow().as_slice(), &[1]);
    }

    #[test]
    fn test_facing_defaults_to_back_and_toggles() {
        let repo = MemoryRepository::new();
        let mut coordinator = coordinator(Some(FIX), false);
        assert_eq!(coordinator.facing(), CameraFacing::Back);

        coordinator.capture(&repo).unwrap();
        assert_eq!(coordinator.toggle_facing(), CameraFacing::Front);
        coordinator.capture(&repo).unwrap();
        assert_eq!(coordinator.toggle_facing(), CameraFacing::Back);

        assert_eq!(coordinator.camera.used, vec![CameraFacing::Back, CameraFacing::Front]);
    }
}
