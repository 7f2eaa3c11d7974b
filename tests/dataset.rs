//! Capture files flowing through the offline augmentation stage.

use std::fs;
use std::path::PathBuf;

use airchar::augment::{self, Axis, Rotation};
use airchar::capture::CaptureFile;
use airchar::naming::SampleName;
use airchar::record::RecordFile;
use airchar::DatasetError;

fn temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("airchar-it-{}-{}", tag, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn close(a: [f64; 3], b: [f64; 3]) -> bool {
    a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < 1e-9)
}

#[test]
fn batch_augments_captures_and_skips_bad_files() {
    let input = temp_dir("aug-in");
    let output = input.with_file_name(format!("airchar-it-aug-out-{}", std::process::id()));
    let _ = fs::remove_dir_all(&output);

    let name = SampleName::raw("A", 1, 1, 1);
    let mut capture = CaptureFile::create(&input, &name, "LSM9DS1").unwrap();
    capture
        .append(65, "0.000000;1.000000;0.000000;0.000000;0.000000;2.000000")
        .unwrap();
    capture
        .append(65, "1.000000;0.000000;0.000000;0.500000;0.000000;0.000000")
        .unwrap();
    drop(capture);

    fs::write(input.join("notes.csv"), "not a sample\n").unwrap();
    fs::write(input.join("readme.txt"), "ignored\n").unwrap();

    let rotations = [Rotation::new(Axis::X, -90), Rotation::new(Axis::X, 90)];
    let report = augment::augment_directory(&input, &output, &rotations).unwrap();
    assert_eq!(report.files, 2);
    assert_eq!(report.generated, 2);
    assert_eq!(report.failed, vec![input.join("notes.csv")]);

    let rotated = RecordFile::load(&output.join("A_s01v01n0001p0ax-90f0.csv")).unwrap();
    assert!(rotated
        .header
        .iter()
        .any(|l| l == "Augmentation: Yes (x-90)"));
    assert!(rotated
        .header
        .iter()
        .any(|l| l == "FileName: A_s01v01n0001p0a0f0.csv"));
    assert_eq!(rotated.records.len(), 2);
    assert_eq!(rotated.records[0].label, 65);
    assert!(close(rotated.records[0].accel, [0.0, 0.0, -1.0]));
    assert!(close(rotated.records[0].gyro, [0.0, 2.0, 0.0]));
    assert!(close(rotated.records[1].accel, [1.0, 0.0, 0.0]));
    assert!(close(rotated.records[1].gyro, [0.5, 0.0, 0.0]));

    assert!(output.join("A_s01v01n0001p0ax+90f0.csv").is_file());

    let _ = fs::remove_dir_all(&input);
    let _ = fs::remove_dir_all(&output);
}

#[test]
fn augmented_files_are_not_augmented_again() {
    let dir = temp_dir("aug-twice");
    let name = SampleName::raw("b", 2, 1, 7)
        .augmented(Rotation::new(Axis::Z, 10))
        .unwrap();
    let path = dir.join(name.to_string());
    fs::write(&path, "Augmentation: Yes (z+10)\n98;1;2;3;4;5;6\n").unwrap();

    let err = augment::augment_file(&path, &dir, &[Rotation::new(Axis::X, 10)]).unwrap_err();
    assert!(matches!(err, DatasetError::AlreadyAugmented(_)));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn filtering_marks_name_and_header() {
    let name = SampleName::parse("A_s01v01n0001p0a0f0.csv").unwrap();
    let mut file =
        RecordFile::parse("Preprocessing Filter: No\nLabel;accX\n65;1;2;3;4;5;6\n").unwrap();
    file.mark_filtered();

    assert_eq!(name.filtered().to_string(), "A_s01v01n0001p1a0f0.csv");
    assert_eq!(file.header[0], "Preprocessing Filter: Yes");
    assert_eq!(file.records.len(), 1);
}
