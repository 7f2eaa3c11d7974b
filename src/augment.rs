//! Rotation-based dataset augmentation.
//!
//! Both the acceleration and the angular-rate triple of every record are
//! rotated by the same elementary rotation (`v' = R·v`). Each rotation yields
//! one new file whose name and `Augmentation:` header record the axis and the
//! signed angle in degrees.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::{info, warn};
use nalgebra::{Rotation3, Vector3};

use crate::errors::DatasetError;
use crate::naming::{SampleName, EXTENSION};
use crate::record::{Record, RecordFile};

/// Angles generated when none are requested: -10…-90 and 10…80 degrees.
pub const DEFAULT_ANGLES: [i32; 17] = [
    -10, -20, -30, -40, -50, -60, -70, -80, -90, 10, 20, 30, 40, 50, 60, 70, 80,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl FromStr for Axis {
    type Err = DatasetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "x" => Ok(Axis::X),
            "y" => Ok(Axis::Y),
            "z" => Ok(Axis::Z),
            _ => Err(DatasetError::InvalidAxis(s.to_string())),
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        })
    }
}

/// Rotation about one coordinate axis by a whole number of degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rotation {
    pub axis: Axis,
    pub degrees: i32,
}

impl Rotation {
    pub fn new(axis: Axis, degrees: i32) -> Self {
        Self { axis, degrees }
    }

    /// Right-handed rotation about the unit vector of `axis`.
    pub fn rotation3(&self) -> Rotation3<f64> {
        let axis = match self.axis {
            Axis::X => Vector3::x_axis(),
            Axis::Y => Vector3::y_axis(),
            Axis::Z => Vector3::z_axis(),
        };
        Rotation3::from_axis_angle(&axis, (self.degrees as f64).to_radians())
    }

    pub fn apply(&self, v: [f64; 3]) -> [f64; 3] {
        (self.rotation3() * Vector3::from(v)).into()
    }
}

/// `x+10`, `z-45`, ...
impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:+}", self.axis, self.degrees)
    }
}

/// Every `(axis, angle)` combination, axis-major.
pub fn rotations(axes: &[Axis], angles: &[i32]) -> Vec<Rotation> {
    axes.iter()
        .flat_map(|&axis| angles.iter().map(move |&deg| Rotation::new(axis, deg)))
        .collect()
}

/// Rotated copy of `file` with its header marked.
pub fn augment(file: &RecordFile, rotation: Rotation) -> RecordFile {
    let mut out = RecordFile {
        header: file.header.clone(),
        records: file
            .records
            .iter()
            .map(|r| Record {
                label: r.label,
                accel: rotation.apply(r.accel),
                gyro: rotation.apply(r.gyro),
            })
            .collect(),
    };
    out.mark_augmented(rotation);
    out
}

/// Write one augmented file per rotation into `output_dir`.
///
/// Returns the paths written, in rotation order.
pub fn augment_file(
    path: &Path,
    output_dir: &Path,
    rotations: &[Rotation],
) -> Result<Vec<PathBuf>, DatasetError> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| DatasetError::InvalidName(path.display().to_string()))?;
    let name = SampleName::parse(file_name)?;
    let source = RecordFile::load(path)?;

    let mut written = Vec::with_capacity(rotations.len());
    for &rotation in rotations {
        let out_name = name.augmented(rotation)?;
        let out_path = output_dir.join(out_name.to_string());
        augment(&source, rotation).save(&out_path)?;
        info!("saved {}", out_path.display());
        written.push(out_path);
    }
    Ok(written)
}

/// Outcome of [`augment_directory`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AugmentReport {
    pub files: usize,
    pub generated: usize,
    pub failed: Vec<PathBuf>,
}

/// Augment every `*.csv` file in `input_dir`.
///
/// A file that cannot be processed is logged and skipped; the batch continues.
pub fn augment_directory(
    input_dir: &Path,
    output_dir: &Path,
    rotations: &[Rotation],
) -> Result<AugmentReport, DatasetError> {
    fs::create_dir_all(output_dir)?;

    let mut inputs: Vec<PathBuf> = fs::read_dir(input_dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.is_file()
                && p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.ends_with(EXTENSION))
        })
        .collect();
    inputs.sort();
    info!("found {} CSV files in {}", inputs.len(), input_dir.display());

    let mut report = AugmentReport {
        files: inputs.len(),
        ..AugmentReport::default()
    };
    for path in inputs {
        match augment_file(&path, output_dir, rotations) {
            Ok(written) => {
                info!(
                    "{}: {} augmented files generated",
                    path.display(),
                    written.len()
                );
                report.generated += written.len();
            }
            Err(e) => {
                warn!("error processing {}: {}", path.display(), e);
                report.failed.push(path);
            }
        }
    }
    Ok(report)
}
