//! Positional sample file names.
//!
//! `<Char>_s<SS>v<VV>n<NNNN>p<filter>a<augmentation>f<features>.csv`, e.g.
//! `A_s01v02n0003p0a0f0.csv` for a raw capture or `A_s01v02n0003p1ax-30f0.csv`
//! once it has been filtered and rotated -30° about x.

use std::fmt;

use crate::augment::{Axis, Rotation};
use crate::errors::DatasetError;

pub const EXTENSION: &str = ".csv";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleName {
    pub character: String,
    pub subject: u8,
    pub version: u8,
    pub sample: u32,
    pub filtered: bool,
    pub augmentation: Option<Rotation>,
    pub features: bool,
}

impl SampleName {
    /// Name of a fresh capture: unfiltered, not augmented, no features.
    pub fn raw(character: impl Into<String>, subject: u8, version: u8, sample: u32) -> Self {
        Self {
            character: character.into(),
            subject,
            version,
            sample,
            filtered: false,
            augmentation: None,
            features: false,
        }
    }

    /// Same sample with the next sample number.
    pub fn next_sample(&self) -> Self {
        Self {
            sample: self.sample + 1,
            ..self.clone()
        }
    }

    /// `p0` becomes `p1`.
    pub fn filtered(&self) -> Self {
        Self {
            filtered: true,
            ..self.clone()
        }
    }

    /// `a0` becomes `a<axis><±angle>`.
    pub fn augmented(&self, rotation: Rotation) -> Result<Self, DatasetError> {
        if self.augmentation.is_some() {
            return Err(DatasetError::AlreadyAugmented(self.to_string()));
        }
        Ok(Self {
            augmentation: Some(rotation),
            ..self.clone()
        })
    }

    pub fn parse(file_name: &str) -> Result<Self, DatasetError> {
        let invalid = || DatasetError::InvalidName(file_name.to_string());

        let stem = file_name.strip_suffix(EXTENSION).ok_or_else(invalid)?;
        let split = stem.rfind("_s").ok_or_else(invalid)?;
        let character = &stem[..split];
        if character.is_empty() {
            return Err(invalid());
        }

        let mut rest = &stem[split + 2..];
        let subject = take_number(&mut rest).ok_or_else(invalid)?;
        expect(&mut rest, 'v').ok_or_else(invalid)?;
        let version = take_number(&mut rest).ok_or_else(invalid)?;
        expect(&mut rest, 'n').ok_or_else(invalid)?;
        let sample = take_number(&mut rest).ok_or_else(invalid)?;
        expect(&mut rest, 'p').ok_or_else(invalid)?;
        let filtered = take_flag(&mut rest).ok_or_else(invalid)?;
        expect(&mut rest, 'a').ok_or_else(invalid)?;
        let augmentation = take_augmentation(&mut rest).ok_or_else(invalid)?;
        expect(&mut rest, 'f').ok_or_else(invalid)?;
        let features = take_flag(&mut rest).ok_or_else(invalid)?;
        if !rest.is_empty() {
            return Err(invalid());
        }

        Ok(Self {
            character: character.to_string(),
            subject: u8::try_from(subject).map_err(|_| invalid())?,
            version: u8::try_from(version).map_err(|_| invalid())?,
            sample,
            filtered,
            augmentation,
            features,
        })
    }
}

impl fmt::Display for SampleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_s{:02}v{:02}n{:04}p{}a",
            self.character,
            self.subject,
            self.version,
            self.sample,
            u8::from(self.filtered)
        )?;
        match &self.augmentation {
            Some(rotation) => write!(f, "{}", rotation)?,
            None => write!(f, "0")?,
        }
        write!(f, "f{}{}", u8::from(self.features), EXTENSION)
    }
}

fn take_number(rest: &mut &str) -> Option<u32> {
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if end == 0 {
        return None;
    }
    let value = rest[..end].parse().ok()?;
    *rest = &rest[end..];
    Some(value)
}

fn expect(rest: &mut &str, c: char) -> Option<()> {
    *rest = rest.strip_prefix(c)?;
    Some(())
}

fn take_flag(rest: &mut &str) -> Option<bool> {
    let flag = match rest.chars().next()? {
        '0' => false,
        '1' => true,
        _ => return None,
    };
    *rest = &rest[1..];
    Some(flag)
}

fn take_augmentation(rest: &mut &str) -> Option<Option<Rotation>> {
    if let Some(after) = rest.strip_prefix('0') {
        *rest = after;
        return Some(None);
    }
    let axis: Axis = rest.get(..1)?.parse().ok()?;
    let mut after = &rest[1..];
    let negative = match after.chars().next()? {
        '+' => false,
        '-' => true,
        _ => return None,
    };
    after = &after[1..];
    let magnitude = take_number(&mut after)? as i32;
    *rest = after;
    Some(Some(Rotation::new(
        axis,
        if negative { -magnitude } else { magnitude },
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_name_is_zero_padded() {
        let name = SampleName::raw("A", 1, 2, 3);
        assert_eq!(name.to_string(), "A_s01v02n0003p0a0f0.csv");
        assert_eq!(
            SampleName::raw("enter", 12, 3, 12345).to_string(),
            "enter_s12v03n12345p0a0f0.csv"
        );
    }

    #[test]
    fn parse_inverts_display() {
        for text in [
            "A_s01v02n0003p0a0f0.csv",
            "backspace_s10v01n0042p1a0f0.csv",
            "z_s01v01n0001p1ax-30f0.csv",
            "__s07v07n0100p0ay+80f1.csv",
        ] {
            let name = SampleName::parse(text).unwrap();
            assert_eq!(name.to_string(), text);
        }
    }

    #[test]
    fn filtering_and_augmentation_rewrite_flags() {
        let name = SampleName::parse("A_s01v01n0001p0a0f0.csv").unwrap();
        assert_eq!(name.filtered().to_string(), "A_s01v01n0001p1a0f0.csv");

        let rotated = name.augmented(Rotation::new(Axis::X, -10)).unwrap();
        assert_eq!(rotated.to_string(), "A_s01v01n0001p0ax-10f0.csv");
        assert!(matches!(
            rotated.augmented(Rotation::new(Axis::Y, 10)),
            Err(DatasetError::AlreadyAugmented(_))
        ));
    }

    #[test]
    fn next_sample_increments_number_only() {
        let name = SampleName::raw("b", 3, 4, 9).next_sample();
        assert_eq!(name.to_string(), "b_s03v04n0010p0a0f0.csv");
    }

    #[test]
    fn rejects_malformed_names() {
        for text in [
            "A_s01v01n0001p0a0f0.txt",
            "_s01v01n0001p0a0f0.csv",
            "A_s01v01n0001p2a0f0.csv",
            "A_s01v01n0001p0aw+10f0.csv",
            "A_s01v01n0001p0ax10f0.csv",
            "A_s01v01n0001p0a0f0extra.csv",
            "A_s999v01n0001p0a0f0.csv",
            "notes.csv",
        ] {
            assert!(
                matches!(SampleName::parse(text), Err(DatasetError::InvalidName(_))),
                "{text} should be rejected"
            );
        }
    }
}
