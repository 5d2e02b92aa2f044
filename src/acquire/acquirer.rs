use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::PipelineConfig;
use crate::error::{FailureClass, PipelineError};
use crate::providers::{
    ContentExtractor, DocumentIngestor, DocumentKind, ExtractMode, ProviderError, ScriptGenerator,
    SearchHit, SearchProvider,
};

use super::chunker::split_text;
use super::types::{InputSource, SourceDocument, SourceOrigin};

/// Resolves the caller's input into a non-empty ordered document set, or
/// fails the job with `AcquisitionFailed`. Individual fetch/extract
/// failures are survivable; an empty surviving set is not.
pub struct SourceAcquirer {
    search: Arc<dyn SearchProvider>,
    extractor: Arc<dyn ContentExtractor>,
    ingestor: Arc<dyn DocumentIngestor>,
    generator: Arc<dyn ScriptGenerator>,
    config: PipelineConfig,
}

impl SourceAcquirer {
    pub fn new(
        search: Arc<dyn SearchProvider>,
        extractor: Arc<dyn ContentExtractor>,
        ingestor: Arc<dyn DocumentIngestor>,
        generator: Arc<dyn ScriptGenerator>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            search,
            extractor,
            ingestor,
            generator,
            config,
        }
    }

    pub async fn acquire(&self, input: &InputSource) -> Result<Vec<SourceDocument>, PipelineError> {
        let mut documents = match input {
            InputSource::Topic(topic) => self.acquire_topic(topic).await?,
            InputSource::Url(url) => self.acquire_url(url).await?,
            InputSource::Document { name, bytes } => {
                let text = self
                    .ingestor
                    .ingest(bytes, DocumentKind::Pdf)
                    .await
                    .map_err(|e| acquisition_failed(&e))?;
                self.split_into_documents(name, text)?
            }
            InputSource::Text(text) => self.split_into_documents("uploaded text", text.clone())?,
        };

        // A thin corpus gets supplementary search passes; topic inputs did
        // their own searching already and are enriched inside acquire_topic.
        if !matches!(input, InputSource::Topic(_)) {
            self.enrich_if_thin(&mut documents).await;
        }

        if documents.is_empty() {
            return Err(PipelineError::AcquisitionFailed {
                reason: "no usable source material".to_string(),
                class: FailureClass::Permanent,
            });
        }
        info!(
            kind = input.kind(),
            documents = documents.len(),
            chars = documents.iter().map(SourceDocument::char_len).sum::<usize>(),
            "source acquisition complete"
        );
        Ok(documents)
    }

    async fn acquire_topic(&self, topic: &str) -> Result<Vec<SourceDocument>, PipelineError> {
        let hits = self
            .search
            .search(topic, self.config.search_count)
            .await
            .map_err(|e| acquisition_failed(&e))?;

        let mut documents = Vec::new();
        for hit in &hits {
            if let Some(doc) = self.document_from_hit(hit).await {
                documents.push(doc);
            }
        }
        self.enrich_if_thin(&mut documents).await;
        Ok(documents)
    }

    /// Fetch one search hit. Extraction failure or a near-empty body falls
    /// back to the hit's snippet when the snippet is substantial; otherwise
    /// the hit is dropped.
    async fn document_from_hit(&self, hit: &SearchHit) -> Option<SourceDocument> {
        match self.extractor.extract(&hit.url, ExtractMode::Static).await {
            Ok(text) if text.chars().count() >= self.config.min_extract_chars => Some(
                SourceDocument::new(SourceOrigin::SearchResult, &hit.title, Some(&hit.url), text),
            ),
            Ok(_) | Err(_) if hit.snippet.chars().count() >= self.config.min_snippet_chars => {
                debug!(url = %hit.url, "extraction thin, using snippet");
                Some(SourceDocument::new(
                    SourceOrigin::SearchResult,
                    &hit.title,
                    Some(&hit.url),
                    hit.snippet.clone(),
                ))
            }
            Ok(_) => None,
            Err(e) => {
                warn!(url = %hit.url, error = %e, "skipping unextractable result");
                None
            }
        }
    }

    async fn acquire_url(&self, url: &str) -> Result<Vec<SourceDocument>, PipelineError> {
        let text = match self.extractor.extract(url, ExtractMode::Static).await {
            Ok(text) if text.chars().count() >= self.config.min_extract_chars => text,
            first => {
                // Script-built pages come back near-empty from a static
                // fetch; rendered mode is the second and last attempt.
                if let Err(e) = &first {
                    warn!(url, error = %e, "static extraction failed, trying rendered");
                } else {
                    warn!(url, "static extraction near-empty, trying rendered");
                }
                self.extractor
                    .extract(url, ExtractMode::Rendered)
                    .await
                    .map_err(|e| acquisition_failed(&e))?
            }
        };
        if text.trim().is_empty() {
            return Err(PipelineError::AcquisitionFailed {
                reason: format!("no text extractable from {url}"),
                class: FailureClass::Permanent,
            });
        }
        Ok(vec![SourceDocument::new(
            SourceOrigin::FetchedUrl,
            url,
            Some(url),
            text,
        )])
    }

    /// Ingested text is budgeted: chunks of at most `min_doc_chars`, and at
    /// most `context_budget_chars` total. Dropped overflow is annotated on
    /// the last kept chunk so the script model knows the source continues.
    fn split_into_documents(
        &self,
        name: &str,
        text: String,
    ) -> Result<Vec<SourceDocument>, PipelineError> {
        if text.trim().is_empty() {
            return Err(PipelineError::AcquisitionFailed {
                reason: "ingested document is empty".to_string(),
                class: FailureClass::Permanent,
            });
        }
        let total_chars = text.chars().count();
        let chunk_limit = self.config.min_doc_chars.max(1);
        let max_chunks = (self.config.context_budget_chars / chunk_limit).max(1);

        let mut chunks = split_text(&text, chunk_limit);
        if chunks.len() > max_chunks {
            warn!(
                kept = max_chunks,
                dropped = chunks.len() - max_chunks,
                "document over context budget, truncating"
            );
            chunks.truncate(max_chunks);
            if let Some(last) = chunks.last_mut() {
                last.push_str(&format!(
                    "\n...[content truncated, source is {total_chars} chars in total]"
                ));
            }
        }

        let many = chunks.len() > 1;
        Ok(chunks
            .into_iter()
            .enumerate()
            .map(|(i, chunk)| {
                let title = if many {
                    format!("{} (part {})", name, i + 1)
                } else {
                    name.to_string()
                };
                SourceDocument::new(SourceOrigin::UploadedFile, &title, None, chunk)
            })
            .collect())
    }

    /// Supplementary search passes for a thin corpus: ask the script model
    /// to refine a follow-up query from a content sample, search again, and
    /// append the hits' snippets as non-primary documents. Bounded by
    /// `max_extra_queries`; every failure here is survivable.
    async fn enrich_if_thin(&self, documents: &mut Vec<SourceDocument>) {
        if documents.is_empty() || self.config.max_extra_queries == 0 {
            return;
        }
        let mut extra_queries = 0;
        while extra_queries < self.config.max_extra_queries {
            let corpus_chars: usize = documents.iter().map(SourceDocument::char_len).sum();
            if corpus_chars >= self.config.min_corpus_chars {
                return;
            }
            extra_queries += 1;

            let sample: String = documents
                .iter()
                .flat_map(|d| d.text.chars())
                .take(1000)
                .collect();
            let query = match self.refine_query(&sample).await {
                Ok(q) => q,
                Err(e) => {
                    warn!(error = %e, "query refinement failed, skipping enrichment");
                    return;
                }
            };
            info!(query = %query, pass = extra_queries, "supplementary search");

            let hits = match self
                .search
                .search(&query, self.config.supplementary_results)
                .await
            {
                Ok(hits) => hits,
                Err(e) => {
                    warn!(error = %e, "supplementary search failed");
                    return;
                }
            };
            let before = documents.len();
            for hit in hits {
                if hit.snippet.chars().count() >= self.config.min_snippet_chars {
                    documents.push(
                        SourceDocument::new(
                            SourceOrigin::SearchResult,
                            &hit.title,
                            Some(&hit.url),
                            hit.snippet,
                        )
                        .supplementary(),
                    );
                }
            }
            if documents.len() == before {
                // Nothing new surfaced; further passes would repeat.
                return;
            }
        }
    }

    async fn refine_query(&self, content_sample: &str) -> Result<String, ProviderError> {
        let prompt = format!(
            "Given the following content sample, produce one concise web search \
query that would surface additional material on the same subject. Output the \
query alone, with no explanation or quotes.\n\n{content_sample}"
        );
        let raw = self.generator.generate(&prompt, 100, 0.3).await?;
        let query: String = raw
            .trim()
            .trim_matches(|c| c == '"' || c == '\'')
            .lines()
            .next()
            .unwrap_or("")
            .trim()
            .to_string();
        if query.is_empty() {
            return Err(ProviderError::GenerationUnavailable(
                "empty refined query".to_string(),
            ));
        }
        Ok(query)
    }
}

fn acquisition_failed(e: &ProviderError) -> PipelineError {
    PipelineError::AcquisitionFailed {
        reason: e.to_string(),
        class: if e.is_transient() {
            FailureClass::Transient
        } else {
            FailureClass::Permanent
        },
    }
}
