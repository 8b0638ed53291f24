use parking_lot::Mutex;
use crate::core::{FileResultRecord, ImageId, InputFile, OutputArtifact};
use crate::utils::{ConvertError, ConvertResult};

/// Per-chunk mapping from decoded image to its result record.
///
/// Records are created when an image is decoded, only ever grow while the
/// chunk encodes, and are dropped all at once when the chunk ends. Entries
/// keep their insertion order for rendering.
#[derive(Debug, Default)]
pub struct ResultAggregator {
    records: Mutex<Vec<(ImageId, FileResultRecord)>>,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the record for a freshly decoded image.
    pub fn insert(&self, id: ImageId, record: FileResultRecord) -> ConvertResult<()> {
        let mut records = self.records.lock();
        if records.iter().any(|(existing, _)| *existing == id) {
            return Err(ConvertError::pool(format!("Image {} already has a result record", id.0)));
        }
        records.push((id, record));
        Ok(())
    }

    pub fn append_output(&self, id: ImageId, artifact: OutputArtifact) -> ConvertResult<()> {
        let mut records = self.records.lock();
        let (_, record) = records
            .iter_mut()
            .find(|(existing, _)| *existing == id)
            .ok_or_else(|| ConvertError::pool(format!("No result record for image {}", id.0)))?;
        record.outputs.push(artifact);
        Ok(())
    }

    pub fn file_of(&self, id: ImageId) -> Option<InputFile> {
        self.records
            .lock()
            .iter()
            .find(|(existing, _)| *existing == id)
            .map(|(_, record)| record.file.clone())
    }

    /// Copies out the records in insertion order.
    pub fn snapshot(&self) -> Vec<FileResultRecord> {
        self.records.lock().iter().map(|(_, r)| r.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    pub fn clear(&self) {
        self.records.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::EncoderKind;

    fn artifact(size: u64) -> OutputArtifact {
        OutputArtifact {
            encoder: EncoderKind::WebP,
            extension: "webp".into(),
            size,
            info_text: None,
            output_file: "out/a.webp".into(),
        }
    }

    #[test]
    fn outputs_accumulate_per_image() {
        let results = ResultAggregator::new();
        results.insert(ImageId(1), FileResultRecord::new(InputFile::new("b.png"), 10)).unwrap();
        results.insert(ImageId(0), FileResultRecord::new(InputFile::new("a.png"), 20)).unwrap();

        results.append_output(ImageId(0), artifact(5)).unwrap();
        results.append_output(ImageId(0), artifact(6)).unwrap();

        let snapshot = results.snapshot();
        assert_eq!(snapshot[0].file, InputFile::new("b.png"));
        assert!(snapshot[0].outputs.is_empty());
        assert_eq!(snapshot[1].outputs.len(), 2);
        assert_eq!(results.file_of(ImageId(0)), Some(InputFile::new("a.png")));
    }

    #[test]
    fn one_record_per_image() {
        let results = ResultAggregator::new();
        results.insert(ImageId(0), FileResultRecord::new(InputFile::new("a.png"), 1)).unwrap();
        assert!(results.insert(ImageId(0), FileResultRecord::new(InputFile::new("a.png"), 1)).is_err());
        assert!(results.append_output(ImageId(9), artifact(1)).is_err());
    }

    #[test]
    fn clear_drops_everything() {
        let results = ResultAggregator::new();
        results.insert(ImageId(0), FileResultRecord::new(InputFile::new("a.png"), 1)).unwrap();
        assert_eq!(results.len(), 1);
        results.clear();
        assert!(results.is_empty());
    }
}
