//! Text serialization of buffered samples.

use std::io::{self, Write};

use crate::buffer::Sample;

/// Separator between fields of a record.
pub const FIELD_DELIMITER: char = ';';

/// Digits after the decimal point for every field.
pub const PRECISION: usize = 6;

/// Render one sample as `ax;ay;az;gx;gy;gz` without a line terminator.
pub fn format_record(sample: &Sample) -> String {
    let mut line = String::with_capacity(6 * 12);
    for (i, value) in sample.channels().iter().enumerate() {
        if i > 0 {
            line.push(FIELD_DELIMITER);
        }
        line.push_str(&format!("{:.*}", PRECISION, value));
    }
    line
}

/// Write one line per sample and return the number of lines written.
///
/// Every line is fully formatted before it is handed to the writer.
pub fn write_samples<W: Write + ?Sized>(out: &mut W, samples: &[Sample]) -> io::Result<usize> {
    for sample in samples {
        let mut line = format_record(sample);
        line.push('\n');
        out.write_all(line.as_bytes())?;
    }
    out.flush()?;
    Ok(samples.len())
}
