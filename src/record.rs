//! Captured record files: metadata header followed by `;`-separated records.
//!
//! The header is every line before the first one that starts with a number
//! followed by `;`. Header lines are kept verbatim (minus a leading BOM) so
//! that the offline stages can rewrite individual metadata fields.

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::augment::Rotation;
use crate::errors::DatasetError;

const FILTER_KEY: &str = "preprocessing filter:";
const AUGMENTATION_KEY: &str = "augmentation:";

/// One labelled 6-axis record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Record {
    pub label: i64,
    pub accel: [f64; 3],
    pub gyro: [f64; 3],
}

impl Record {
    fn parse(line: &str, line_no: usize) -> Result<Self, DatasetError> {
        let malformed = |reason: String| DatasetError::MalformedRecord {
            line: line_no,
            reason,
        };

        let fields: Vec<&str> = line.split(';').map(str::trim).collect();
        if fields.len() != 7 {
            return Err(malformed(format!("expected 7 fields, found {}", fields.len())));
        }
        let label = fields[0]
            .parse::<i64>()
            .map_err(|e| malformed(format!("label {:?}: {e}", fields[0])))?;
        let mut values = [0.0f64; 6];
        for (value, field) in values.iter_mut().zip(&fields[1..]) {
            *value = field
                .parse()
                .map_err(|e| malformed(format!("value {:?}: {e}", field)))?;
        }

        Ok(Self {
            label,
            accel: [values[0], values[1], values[2]],
            gyro: [values[3], values[4], values[5]],
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordFile {
    pub header: Vec<String>,
    pub records: Vec<Record>,
}

impl RecordFile {
    pub fn parse(text: &str) -> Result<Self, DatasetError> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let lines: Vec<&str> = text.lines().collect();

        let data_start = lines
            .iter()
            .position(|l| is_data_line(l))
            .ok_or(DatasetError::MissingDataSection)?;

        let header = lines[..data_start]
            .iter()
            .map(|l| l.trim().to_string())
            .collect();
        let records = lines[data_start..]
            .iter()
            .enumerate()
            .filter(|(_, l)| !l.trim().is_empty())
            .map(|(i, l)| Record::parse(l, data_start + i + 1))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { header, records })
    }

    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        let bytes = fs::read(path)?;
        Self::parse(&String::from_utf8_lossy(&bytes))
    }

    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for line in &self.header {
            writeln!(out, "{}", line)?;
        }
        for r in &self.records {
            writeln!(
                out,
                "{};{};{};{};{};{};{}",
                r.label, r.accel[0], r.accel[1], r.accel[2], r.gyro[0], r.gyro[1], r.gyro[2]
            )?;
        }
        out.flush()
    }

    pub fn save(&self, path: &Path) -> Result<(), DatasetError> {
        let mut out = BufWriter::new(fs::File::create(path)?);
        self.write_to(&mut out)?;
        Ok(())
    }

    /// Set `Preprocessing Filter: Yes`.
    pub fn mark_filtered(&mut self) {
        self.replace_field(FILTER_KEY, "Preprocessing Filter: Yes".to_string());
    }

    /// Set `Augmentation: Yes (<axis><±angle>)`.
    pub fn mark_augmented(&mut self, rotation: Rotation) {
        self.replace_field(AUGMENTATION_KEY, format!("Augmentation: Yes ({})", rotation));
    }

    fn replace_field(&mut self, key: &str, replacement: String) {
        for line in self
            .header
            .iter_mut()
            .filter(|l| l.to_ascii_lowercase().starts_with(key))
        {
            *line = replacement.clone();
        }
    }
}

/// `^\s*-?\d+(\.\d+)?\s*;`
fn is_data_line(line: &str) -> bool {
    let rest = line.trim_start();
    let rest = rest.strip_prefix('-').unwrap_or(rest);

    let int_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if int_len == 0 {
        return false;
    }
    let mut rest = &rest[int_len..];

    if let Some(frac) = rest.strip_prefix('.') {
        let frac_len = frac.bytes().take_while(u8::is_ascii_digit).count();
        if frac_len > 0 {
            rest = &frac[frac_len..];
        }
    }

    rest.trim_start().starts_with(';')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::augment::Axis;

    const SAMPLE: &str = "\u{feff}AirChar - The in-the-Air Handwritten Dataset\n\
        #\n\
        Preprocessing Filter: No\n\
        Augmentation: No\n\
        #\n\
        Label;accX;accY;accZ;gyrX;gyrY;gyrZ\n\
        65;0.010000;-0.020000;1.000000;0.500000;-0.250000;3.000000\n\
        65;0.5;0.5;0.5;-1;-2;-3\n\
        \n";

    #[test]
    fn detects_numeric_record_lines() {
        assert!(is_data_line("65;1;2"));
        assert!(is_data_line("  -3.5 ;x"));
        assert!(is_data_line("22;"));
        assert!(!is_data_line("Label;accX"));
        assert!(!is_data_line("Size: ???"));
        assert!(!is_data_line("#"));
        assert!(!is_data_line("12"));
        assert!(!is_data_line("-;1"));
    }

    #[test]
    fn splits_header_and_records() {
        let file = RecordFile::parse(SAMPLE).unwrap();
        assert_eq!(file.header.len(), 6);
        assert_eq!(file.header[0], "AirChar - The in-the-Air Handwritten Dataset");
        assert_eq!(file.header[5], "Label;accX;accY;accZ;gyrX;gyrY;gyrZ");
        assert_eq!(file.records.len(), 2);
        assert_eq!(
            file.records[0],
            Record {
                label: 65,
                accel: [0.01, -0.02, 1.0],
                gyro: [0.5, -0.25, 3.0],
            }
        );
    }

    #[test]
    fn header_only_file_has_no_data_section() {
        let text = "AirChar\n#\nLabel;accX;accY;accZ;gyrX;gyrY;gyrZ\n";
        assert!(matches!(
            RecordFile::parse(text),
            Err(DatasetError::MissingDataSection)
        ));
    }

    #[test]
    fn malformed_record_reports_line() {
        let text = "Label;accX\n65;1;2;3;4;5;6\n65;1;2;3\n";
        match RecordFile::parse(text) {
            Err(DatasetError::MalformedRecord { line, .. }) => assert_eq!(line, 3),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn marks_rewrite_only_their_field() {
        let mut file = RecordFile::parse(SAMPLE).unwrap();
        file.mark_filtered();
        file.mark_augmented(Rotation::new(Axis::X, -30));
        assert_eq!(file.header[2], "Preprocessing Filter: Yes");
        assert_eq!(file.header[3], "Augmentation: Yes (x-30)");
        assert_eq!(file.header[1], "#");
    }

    #[test]
    fn written_file_parses_back() {
        let file = RecordFile::parse(SAMPLE).unwrap();
        let mut out = Vec::new();
        file.write_to(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("\n65;0.5;0.5;0.5;-1;-2;-3\n"));
        assert_eq!(RecordFile::parse(&text).unwrap(), file);
    }
}
