//! Diagnosis pipeline orchestration
//!
//! One request runs synchronously end-to-end: extraction, classification,
//! query building, similarity search, narrative generation, assembly.
//! Terminal conditions short-circuit before any later external call.

use std::path::PathBuf;
use std::sync::Arc;

use crate::model::{
    CapacityClass, ClassificationResult, DiagnosisNarrative, FinalReport, OilParameter,
    RequestMeta,
};
use crate::retriever::{RetrieverError, SimilaritySearch};
use crate::service::classification::{self, ClassificationError};
use crate::service::extraction::GasDataExtractor;
use crate::service::generation::NarrativeGenerator;
use crate::service::query::build_query;
use crate::service::report;
use crate::service::DiagnosisCache;

/// Parameters that identify the transformer rather than describe the oil;
/// they enter the retrieval query but are never classified.
const IDENTITY_STEMS: &[&str] = &["transformerid", "capacity"];

#[derive(Debug, thiserror::Error)]
pub enum DiagnosisError {
    #[error("No gas data found")]
    NoGasData,

    #[error("No similar records found")]
    NoSimilarRecords,

    #[error(transparent)]
    InvalidParameter(#[from] ClassificationError),

    #[error("Similarity search failed: {0}")]
    Retriever(#[from] RetrieverError),
}

/// Input of one diagnosis run
#[derive(Debug, Clone)]
pub struct DiagnosisInput {
    /// Concatenated text of all pages of the uploaded lab report
    pub document_text: String,
    /// User-entered oil parameters, in form order
    pub parameters: Vec<OilParameter>,
    pub meta: RequestMeta,
}

/// Orchestrates the diagnosis pipeline
pub struct DiagnosisService {
    extractor: GasDataExtractor,
    retriever: Arc<dyn SimilaritySearch>,
    generator: Arc<dyn NarrativeGenerator>,
    cache: Option<DiagnosisCache>,
    top_k: usize,
    docs_dir: PathBuf,
}

impl DiagnosisService {
    pub fn new(
        retriever: Arc<dyn SimilaritySearch>,
        generator: Arc<dyn NarrativeGenerator>,
        cache: Option<DiagnosisCache>,
        top_k: usize,
        docs_dir: PathBuf,
    ) -> Self {
        Self {
            extractor: GasDataExtractor::new(),
            retriever,
            generator,
            cache,
            top_k,
            docs_dir,
        }
    }

    /// Run the full pipeline for one request.
    pub async fn diagnose(&self, input: DiagnosisInput) -> Result<FinalReport, DiagnosisError> {
        let readings = self.extractor.extract(&input.document_text);
        if readings.is_empty() {
            tracing::info!("No gas rows matched in document text");
            return Err(DiagnosisError::NoGasData);
        }

        // One table for the whole report, chosen once from capacity
        let capacity_class = CapacityClass::from_capacity(&input.meta.capacity);
        let classifications = self.classify_parameters(&input.parameters, capacity_class)?;

        let query = build_query(&readings, &input.parameters);
        tracing::debug!(query = %query, "Built retrieval query");

        let documents = self.retriever.search(&query, self.top_k).await?;
        if documents.is_empty() {
            tracing::info!("Similarity search returned no documents");
            return Err(DiagnosisError::NoSimilarRecords);
        }
        tracing::info!(count = documents.len(), "Fetched similar reference documents");

        let narrative = self.narrative_for(&documents, &query).await;

        Ok(report::assemble(
            input.meta,
            readings,
            classifications,
            narrative,
            &documents,
            &self.docs_dir,
        ))
    }

    fn classify_parameters(
        &self,
        parameters: &[OilParameter],
        capacity_class: CapacityClass,
    ) -> Result<Vec<ClassificationResult>, ClassificationError> {
        parameters
            .iter()
            .filter(|p| {
                let stem = classification::normalize_key(&p.key);
                !IDENTITY_STEMS.contains(&stem.as_str())
            })
            .map(|p| {
                let status = classification::classify(&p.key, &p.value, capacity_class)?;
                Ok(ClassificationResult {
                    parameter_key: p.key.clone(),
                    raw_value: p.value.clone(),
                    status,
                })
            })
            .collect()
    }

    /// Produce the narrative, consulting the cache keyed by the query string.
    async fn narrative_for(
        &self,
        documents: &[crate::retriever::RetrievedDocument],
        query: &str,
    ) -> DiagnosisNarrative {
        if let Some(cache) = &self.cache {
            match cache.get_narrative(query).await {
                Ok(narrative) => {
                    tracing::debug!("Narrative cache hit");
                    return narrative;
                }
                Err(e) => tracing::debug!(reason = %e, "Narrative cache miss"),
            }
        }

        let context = documents
            .iter()
            .map(|d| d.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        let narrative = self.generator.generate(&context, query).await;

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.set_narrative(query, &narrative).await {
                tracing::debug!(error = %e, "Failed to cache narrative");
            }
        }

        narrative
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OilStatus;
    use crate::retriever::{DocumentMetadata, RetrievedDocument};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedRetriever {
        documents: Vec<RetrievedDocument>,
        calls: AtomicUsize,
    }

    impl FixedRetriever {
        fn with_documents(documents: Vec<RetrievedDocument>) -> Arc<Self> {
            Arc::new(Self {
                documents,
                calls: AtomicUsize::new(0),
            })
        }

        fn empty() -> Arc<Self> {
            Self::with_documents(Vec::new())
        }
    }

    #[async_trait]
    impl SimilaritySearch for FixedRetriever {
        async fn search(
            &self,
            _query: &str,
            _k: usize,
        ) -> Result<Vec<RetrievedDocument>, RetrieverError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.documents.clone())
        }
    }

    struct FixedGenerator {
        calls: AtomicUsize,
    }

    impl FixedGenerator {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl NarrativeGenerator for FixedGenerator {
        async fn generate(&self, _context: &str, _query: &str) -> DiagnosisNarrative {
            self.calls.fetch_add(1, Ordering::SeqCst);
            DiagnosisNarrative {
                remarks: "Gas levels are satisfactory".to_string(),
                preventive_steps: "Resample in 6 months".to_string(),
            }
        }
    }

    fn reference_document() -> RetrievedDocument {
        RetrievedDocument {
            content: "Historical DGA case with comparable hydrogen levels".to_string(),
            metadata: DocumentMetadata::default(),
        }
    }

    fn service(
        retriever: Arc<FixedRetriever>,
        generator: Arc<FixedGenerator>,
        docs_dir: &std::path::Path,
    ) -> DiagnosisService {
        DiagnosisService::new(retriever, generator, None, 3, docs_dir.to_path_buf())
    }

    fn input_with(document_text: &str, capacity: &str, parameters: Vec<OilParameter>) -> DiagnosisInput {
        DiagnosisInput {
            document_text: document_text.to_string(),
            parameters,
            meta: RequestMeta {
                capacity: capacity.to_string(),
                ..RequestMeta::default()
            },
        }
    }

    #[tokio::test]
    async fn empty_extraction_halts_before_retrieval() {
        let docs_dir = tempfile::tempdir().unwrap();
        let retriever = FixedRetriever::with_documents(vec![reference_document()]);
        let generator = FixedGenerator::new();
        let service = service(Arc::clone(&retriever), Arc::clone(&generator), docs_dir.path());

        let result = service
            .diagnose(input_with("no tabular rows here", "100", vec![]))
            .await;

        assert!(matches!(result, Err(DiagnosisError::NoGasData)));
        assert_eq!(retriever.calls.load(Ordering::SeqCst), 0);
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn empty_retrieval_halts_before_generation() {
        let docs_dir = tempfile::tempdir().unwrap();
        let retriever = FixedRetriever::empty();
        let generator = FixedGenerator::new();
        let service = service(Arc::clone(&retriever), Arc::clone(&generator), docs_dir.path());

        let result = service
            .diagnose(input_with("2.150 1 BB +I 1.2E+01 - H2", "100", vec![]))
            .await;

        assert!(matches!(result, Err(DiagnosisError::NoSimilarRecords)));
        assert_eq!(retriever.calls.load(Ordering::SeqCst), 1);
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn full_run_classifies_and_assembles() {
        let docs_dir = tempfile::tempdir().unwrap();
        let retriever = FixedRetriever::with_documents(vec![reference_document()]);
        let generator = FixedGenerator::new();
        let service = service(Arc::clone(&retriever), Arc::clone(&generator), docs_dir.path());

        let parameters = vec![
            OilParameter::new("Appearance & Colour", "Pale Yellow"),
            OilParameter::new("Water Content", "25"),
            OilParameter::new("TRANSFORMER_ID", "TR7"),
            OilParameter::new("Capacity", "100"),
        ];

        let report = service
            .diagnose(input_with("2.150 1 BB +I 1.2E+01 - H2", "100", parameters))
            .await
            .unwrap();

        assert_eq!(report.readings.len(), 1);
        assert_eq!(report.readings[0].gas_name, "H2");

        // Identity parameters are excluded from classification
        assert_eq!(report.classifications.len(), 2);
        assert_eq!(report.classifications[0].status, OilStatus::Unclassified);
        assert_eq!(report.classifications[1].parameter_key, "Water Content");
        assert_eq!(report.classifications[1].status, OilStatus::Fair);

        assert_eq!(report.narrative.remarks, "Gas levels are satisfactory");
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn high_capacity_uses_type_one_table() {
        let docs_dir = tempfile::tempdir().unwrap();
        let retriever = FixedRetriever::with_documents(vec![reference_document()]);
        let generator = FixedGenerator::new();
        let service = service(retriever, generator, docs_dir.path());

        let parameters = vec![OilParameter::new("B.D.V @ 61.8Hz with stirrer", "65")];

        let report = service
            .diagnose(input_with("2.150 1 BB +I 1.2E+01 - H2", "200", parameters))
            .await
            .unwrap();

        assert_eq!(report.classifications[0].status, OilStatus::Good);
    }

    #[tokio::test]
    async fn non_numeric_classifiable_value_fails_the_request() {
        let docs_dir = tempfile::tempdir().unwrap();
        let retriever = FixedRetriever::with_documents(vec![reference_document()]);
        let generator = FixedGenerator::new();
        let service = service(retriever, Arc::clone(&generator), docs_dir.path());

        let parameters = vec![OilParameter::new("Water Content", "not-a-number")];

        let result = service
            .diagnose(input_with("2.150 1 BB +I 1.2E+01 - H2", "100", parameters))
            .await;

        assert!(matches!(result, Err(DiagnosisError::InvalidParameter(_))));
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }
}
