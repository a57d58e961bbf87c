//! Final report assembly and reference document publication

use std::fs;
use std::path::Path;

use crate::model::{
    ClassificationResult, DiagnosisNarrative, FinalReport, GasReading, ReferenceEntry, RequestMeta,
};
use crate::retriever::RetrievedDocument;

/// Copy each retrieved document's backing source file into the public docs
/// directory and build the reference list.
///
/// The copy is idempotent: an already-published file is left untouched.
/// Documents whose source is missing or whose copy fails are logged and
/// omitted; entry indexes keep the original retrieval rank.
pub fn copy_references(documents: &[RetrievedDocument], docs_dir: &Path) -> Vec<ReferenceEntry> {
    if let Err(e) = fs::create_dir_all(docs_dir) {
        tracing::warn!(error = %e, dir = %docs_dir.display(), "Failed to create docs directory");
    }

    let mut entries = Vec::new();

    for (rank, doc) in documents.iter().enumerate() {
        let rank = rank + 1;

        let Some(source) = doc.metadata.source.as_deref() else {
            tracing::debug!(rank = rank, "Retrieved document carries no source path, skipping");
            continue;
        };

        let source_path = Path::new(source);
        if !source_path.exists() {
            tracing::debug!(source = %source, "Reference source file missing, skipping");
            continue;
        }

        let Some(file_name) = source_path.file_name().and_then(|n| n.to_str()) else {
            tracing::debug!(source = %source, "Reference source has no usable file name, skipping");
            continue;
        };

        let dest_path = docs_dir.join(file_name);
        if !dest_path.exists() {
            if let Err(e) = fs::copy(source_path, &dest_path) {
                tracing::warn!(error = %e, file = %file_name, "Failed to copy reference document");
                continue;
            }
            tracing::debug!(file = %file_name, "Published reference document");
        }

        entries.push(ReferenceEntry {
            index: rank,
            source: file_name.to_string(),
            url: format!("/docs/{}", file_name),
        });
    }

    entries
}

/// Merge the pipeline outputs into the immutable final report record.
pub fn assemble(
    meta: RequestMeta,
    readings: Vec<GasReading>,
    classifications: Vec<ClassificationResult>,
    narrative: DiagnosisNarrative,
    documents: &[RetrievedDocument],
    docs_dir: &Path,
) -> FinalReport {
    let references = copy_references(documents, docs_dir);

    FinalReport {
        meta,
        readings,
        classifications,
        narrative,
        references,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retriever::DocumentMetadata;
    use std::fs;

    fn doc_with_source(source: Option<String>) -> RetrievedDocument {
        RetrievedDocument {
            content: "reference content".to_string(),
            metadata: DocumentMetadata { source, page: None },
        }
    }

    #[test]
    fn copies_once_and_skips_existing_destination() {
        let source_dir = tempfile::tempdir().unwrap();
        let docs_dir = tempfile::tempdir().unwrap();

        let source = source_dir.path().join("ieee-c57.pdf");
        fs::write(&source, b"original").unwrap();
        let docs = vec![doc_with_source(Some(source.to_string_lossy().into_owned()))];

        let first = copy_references(&docs, docs_dir.path());
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].index, 1);
        assert_eq!(first[0].source, "ieee-c57.pdf");
        assert_eq!(first[0].url, "/docs/ieee-c57.pdf");

        let dest = docs_dir.path().join("ieee-c57.pdf");
        assert_eq!(fs::read(&dest).unwrap(), b"original");

        // Overwrite the destination; the second call must not clobber it
        fs::write(&dest, b"already published").unwrap();
        let second = copy_references(&docs, docs_dir.path());
        assert_eq!(second.len(), 1);
        assert_eq!(fs::read(&dest).unwrap(), b"already published");
    }

    #[test]
    fn missing_source_is_omitted_but_ranks_are_kept() {
        let source_dir = tempfile::tempdir().unwrap();
        let docs_dir = tempfile::tempdir().unwrap();

        let present = source_dir.path().join("guide.pdf");
        fs::write(&present, b"guide").unwrap();

        let docs = vec![
            doc_with_source(Some("/nonexistent/gone.pdf".to_string())),
            doc_with_source(Some(present.to_string_lossy().into_owned())),
            doc_with_source(None),
        ];

        let entries = copy_references(&docs, docs_dir.path());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].index, 2);
        assert_eq!(entries[0].source, "guide.pdf");
    }

    #[test]
    fn assemble_carries_all_sections() {
        let docs_dir = tempfile::tempdir().unwrap();

        let report = assemble(
            RequestMeta::default(),
            vec![GasReading {
                gas_name: "H2".to_string(),
                ppm: "14".to_string(),
            }],
            vec![],
            DiagnosisNarrative::missing(),
            &[],
            docs_dir.path(),
        );

        assert_eq!(report.readings.len(), 1);
        assert!(report.references.is_empty());
        assert_eq!(report.narrative, DiagnosisNarrative::missing());
    }
}
