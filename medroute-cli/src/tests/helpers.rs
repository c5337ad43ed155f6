//! Test helpers for building facility snapshots and request files.

use camino::{Utf8Path, Utf8PathBuf};
use geo::Coord;
use medroute_core::{
    Capacity, DispatchRequest, Facility, LiveValue, SpecialistKind,
    test_support::{kilometres_north, stocked_facility},
};
use std::fs;
use tempfile::TempDir;

pub(super) const ORIGIN: Coord<f64> = Coord { x: 78.4867, y: 17.3850 };

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent directories");
    }
    fs::write(path, contents).expect("write file");
}

/// A temporary directory holding a snapshot and a request file.
#[derive(Debug)]
pub(super) struct Workspace {
    _tmp: TempDir,
    pub(super) root: Utf8PathBuf,
    pub(super) snapshot: Utf8PathBuf,
    pub(super) request: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let tmp = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 workspace");
        Self {
            snapshot: root.join("facilities.json"),
            request: root.join("request.json"),
            root,
            _tmp: tmp,
        }
    }

    pub(super) fn write_snapshot(&self, facilities: &[Facility]) {
        let payload = serde_json::to_vec_pretty(facilities).expect("serialise snapshot");
        write_utf8(&self.snapshot, &payload);
    }

    pub(super) fn write_request(&self, request: &DispatchRequest) {
        let payload = serde_json::to_vec_pretty(request).expect("serialise request");
        write_utf8(&self.request, &payload);
    }

    pub(super) fn read_snapshot(&self) -> Vec<Facility> {
        let payload = fs::read(&self.snapshot).expect("read snapshot");
        serde_json::from_slice(&payload).expect("decode snapshot")
    }
}

/// Twelve stocked facilities 1..=12 km north of [`ORIGIN`], the nearest of
/// which has one free cardiologist and no oxygen.
pub(super) fn city_facilities() -> Vec<Facility> {
    (1_u32..=12)
        .map(|km| {
            let facility = stocked_facility(&format!("h-{km}"), kilometres_north(ORIGIN, f64::from(km)));
            if km == 1 {
                facility
                    .with_specialist(SpecialistKind::Cardiologist, Capacity::new(2, 1))
                    .with_oxygen(LiveValue::Live(5))
            } else {
                facility
            }
        })
        .collect()
}
